//! Shared domain enumerations for custom fields and filter controls.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage type of a custom field as declared by the content editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Price,
    Date,
    #[serde(untagged)]
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Price => "price",
            FieldType::Date => "date",
            FieldType::Other(value) => value.as_str(),
        }
    }
}

/// Widget used to present a facet, configured per field by the module admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    #[default]
    Checkbox,
    Price,
    DateRange,
}

impl ControlType {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlType::Checkbox => "checkbox",
            ControlType::Price => "price",
            ControlType::DateRange => "date_range",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownControlType(pub String);

impl std::fmt::Display for UnknownControlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown control type `{}`", self.0)
    }
}

impl std::error::Error for UnknownControlType {}

impl FromStr for ControlType {
    type Err = UnknownControlType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "checkbox" => Ok(ControlType::Checkbox),
            "price" => Ok(ControlType::Price),
            "date_range" => Ok(ControlType::DateRange),
            other => Err(UnknownControlType(other.to_string())),
        }
    }
}

/// When the client widget submits the filter form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilteringWhen {
    #[default]
    Automatically,
    OnSubmit,
}

impl FilteringWhen {
    pub fn as_str(self) -> &'static str {
        match self {
            FilteringWhen::Automatically => "automatically",
            FilteringWhen::OnSubmit => "on_submit",
        }
    }

    /// Unrecognised values fall back to automatic filtering.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim() {
            "on_submit" | "submit" => FilteringWhen::OnSubmit,
            _ => FilteringWhen::Automatically,
        }
    }
}
