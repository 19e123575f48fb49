//! Validated, read-only snapshot of pages, custom fields and content items.

use std::collections::{HashMap, HashSet};

use crate::domain::entities::{
    CategoryRecord, ContentItem, ContentSummary, CustomField, CustomFieldValue, PageRecord,
    TagRecord,
};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredContent {
    pub summary: ContentSummary,
    pub tags: Vec<TagRecord>,
    pub categories: Vec<CategoryRecord>,
    pub field_values: Vec<CustomFieldValue>,
}

impl StoredContent {
    pub fn in_any_category(&self, category_ids: &[i64]) -> bool {
        self.categories
            .iter()
            .any(|category| category_ids.contains(&category.id))
    }

    pub fn to_item(&self) -> ContentItem {
        ContentItem {
            id: self.summary.id,
            parent_id: self.summary.parent_id,
            tags: self.tags.clone(),
            field_values: self.field_values.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    pages: Vec<PageRecord>,
    fields: HashMap<i64, CustomField>,
    contents: Vec<StoredContent>,
}

impl ContentCatalog {
    pub fn build(
        pages: Vec<PageRecord>,
        fields: Vec<CustomField>,
        contents: Vec<StoredContent>,
    ) -> Result<Self, DomainError> {
        let mut page_ids = HashSet::new();
        for page in &pages {
            if !page_ids.insert(page.id) {
                return Err(DomainError::duplicate("page", page.id));
            }
        }

        let mut field_map = HashMap::with_capacity(fields.len());
        for field in fields {
            validate_name_key(&field.name_key)?;
            let id = field.id;
            if field_map.insert(id, field).is_some() {
                return Err(DomainError::duplicate("custom field", id));
            }
        }

        let mut content_ids = HashSet::new();
        let mut value_ids = HashSet::new();
        for content in &contents {
            let content_id = content.summary.id;
            if !content_ids.insert(content_id) {
                return Err(DomainError::duplicate("content", content_id));
            }
            for value in &content.field_values {
                if !value_ids.insert(value.id) {
                    return Err(DomainError::duplicate("custom field value", value.id));
                }
                if !field_map.contains_key(&value.custom_field_id) {
                    return Err(DomainError::dangling(
                        "custom field value",
                        value.id,
                        "custom field",
                        value.custom_field_id,
                    ));
                }
                if value.content_id != content_id {
                    return Err(DomainError::dangling(
                        "custom field value",
                        value.id,
                        "content",
                        value.content_id,
                    ));
                }
            }
        }

        Ok(Self {
            pages,
            fields: field_map,
            contents,
        })
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn field(&self, id: i64) -> Option<&CustomField> {
        self.fields.get(&id)
    }

    pub fn contents(&self) -> &[StoredContent] {
        &self.contents
    }

    /// Children of `parent_id` in storage order.
    pub fn children_of(&self, parent_id: i64) -> impl Iterator<Item = &StoredContent> {
        self.contents
            .iter()
            .filter(move |content| content.summary.parent_id == parent_id)
    }

    /// Raw values stored on `content` for every field whose key is `name_key`.
    pub fn values_for_key<'a>(
        &'a self,
        content: &'a StoredContent,
        name_key: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        content.field_values.iter().filter_map(move |value| {
            let field = self.fields.get(&value.custom_field_id)?;
            if field.name_key == name_key {
                value.value.as_deref()
            } else {
                None
            }
        })
    }
}

fn validate_name_key(name_key: &str) -> Result<(), DomainError> {
    if name_key.is_empty() {
        return Err(DomainError::invalid_field_key(name_key, "must not be empty"));
    }
    if let Some(ch) = name_key
        .chars()
        .find(|ch| !(ch.is_alphanumeric() || *ch == '_' || *ch == '-'))
    {
        return Err(DomainError::invalid_field_key(
            name_key,
            format!("unsupported character `{ch}`"),
        ));
    }
    Ok(())
}
