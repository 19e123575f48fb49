//! Facet aggregation and presentation types.
//!
//! [`AggregationResult`] is the cacheable output of facet extraction. A
//! [`Facet`] is built per request from an aggregation and is discarded once the
//! response has been rendered.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::entities::{CustomField, CustomFieldValue, TagRecord};
use crate::domain::types::{ControlType, FieldType};

/// Distinct values observed for one custom field under a main page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAggregation {
    pub field: CustomField,
    pub values: Vec<CustomFieldValue>,
}

impl FieldAggregation {
    pub fn new(field: CustomField) -> Self {
        Self {
            field,
            values: Vec::new(),
        }
    }

    /// Append `value` unless an equal raw value is already present.
    ///
    /// Returns `false` for null values and duplicates.
    pub fn push_distinct(&mut self, value: &CustomFieldValue) -> bool {
        let Some(raw) = value.value.as_deref() else {
            return false;
        };
        if self
            .values
            .iter()
            .any(|existing| existing.value.as_deref() == Some(raw))
        {
            return false;
        }
        self.values.push(value.clone());
        true
    }

    pub fn raw_values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(|value| value.value.as_deref())
    }
}

/// Cached aggregate for a (main page, module) pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregationResult {
    #[serde(rename = "allCustomFieldsForResults")]
    pub custom_fields: Vec<FieldAggregation>,
    #[serde(rename = "allTagsForResults")]
    pub tags: Vec<TagRecord>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.custom_fields.is_empty() && self.tags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetValueView {
    pub value: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_price: i64,
    pub max_price: i64,
    pub from_price: f64,
    pub to_price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from_date: String,
    pub to_date: String,
}

/// Control-specific presentation data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "controlType", rename_all = "snake_case")]
pub enum FacetControl {
    Checkbox,
    Price(PriceRange),
    DateRange(DateRange),
}

impl FacetControl {
    pub fn control_type(&self) -> ControlType {
        match self {
            FacetControl::Checkbox => ControlType::Checkbox,
            FacetControl::Price(_) => ControlType::Price,
            FacetControl::DateRange(_) => ControlType::DateRange,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facet {
    pub name_key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub position: usize,
    pub is_first: bool,
    pub options: Vec<FacetValueView>,
    #[serde(flatten)]
    pub control: FacetControl,
}

impl Facet {
    pub fn active_values(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .filter(|option| option.active)
            .map(|option| option.value.as_str())
    }
}

/// Selected values of one facet, for an "active filters" summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilter {
    pub name_key: String,
    pub name: String,
    pub values: Vec<String>,
}

/// Renumber facets so positions are dense and only the first is flagged.
pub fn assign_positions(facets: &mut [Facet]) {
    for (index, facet) in facets.iter_mut().enumerate() {
        facet.position = index;
        facet.is_first = index == 0;
    }
}

/// Presentation payload handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterPayload {
    #[serde(serialize_with = "serialize_facets_by_key")]
    pub filters: Vec<Facet>,
    #[serde(rename = "moduleId")]
    pub module_id: String,
}

impl FilterPayload {
    pub fn facet(&self, name_key: &str) -> Option<&Facet> {
        self.filters.iter().find(|facet| facet.name_key == name_key)
    }

    /// Facets with at least one active option, in presentation order.
    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        self.filters
            .iter()
            .filter_map(|facet| {
                let values: Vec<String> = facet.active_values().map(str::to_string).collect();
                (!values.is_empty()).then(|| ActiveFilter {
                    name_key: facet.name_key.clone(),
                    name: facet.name.clone(),
                    values,
                })
            })
            .collect()
    }
}

fn serialize_facets_by_key<S>(facets: &[Facet], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(facets.len()))?;
    for facet in facets {
        map.serialize_entry(&facet.name_key, facet)?;
    }
    map.end()
}
