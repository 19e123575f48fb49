//! Domain entities mirrored from the content store.

use serde::{Deserialize, Serialize};

use crate::domain::types::FieldType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomField {
    pub id: i64,
    pub name: String,
    pub name_key: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub id: i64,
    pub custom_field_id: i64,
    pub content_id: i64,
    pub value: Option<String>,
}

/// A content item as loaded for facet extraction: id, parent, tags and field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub parent_id: i64,
    pub tags: Vec<TagRecord>,
    pub field_values: Vec<CustomFieldValue>,
}

/// The restricted column projection returned by paginated listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub id: i64,
    pub parent_id: i64,
    pub url: String,
    pub title: String,
    pub content: Option<String>,
    pub content_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: i64,
    pub title: String,
    pub content_type: String,
    pub subtype: String,
    pub is_shop: bool,
}

impl PageRecord {
    /// Dynamic, non-shop pages host blog listings.
    pub fn is_blog_root(&self) -> bool {
        self.content_type == "page" && self.subtype == "dynamic" && !self.is_shop
    }
}
