//! Facet extraction: distinct field values and tags across a main page's children.

use std::collections::{HashMap, HashSet};

use crate::application::options::ModuleOptions;
use crate::application::repos::FacetSource;
use crate::domain::facets::{AggregationResult, FieldAggregation};

/// Aggregate every enabled custom field and every tag observed on `source`.
///
/// Fields keep the order in which they are first observed; values keep the
/// first occurrence of each raw value. Fields left without values are omitted.
pub fn extract(source: &FacetSource, options: &ModuleOptions) -> AggregationResult {
    let mut custom_fields: Vec<FieldAggregation> = Vec::new();
    let mut slots: HashMap<i64, usize> = HashMap::new();
    let mut tags = Vec::new();
    let mut seen_tags = HashSet::new();

    for item in &source.items {
        for tag in &item.tags {
            if seen_tags.insert(tag.id) {
                tags.push(tag.clone());
            }
        }

        for value in &item.field_values {
            if value.value.is_none() {
                continue;
            }
            let Some(field) = source.field(value.custom_field_id) else {
                continue;
            };
            if !options.is_field_enabled(&field.name_key) {
                continue;
            }

            let slot = *slots.entry(field.id).or_insert_with(|| {
                custom_fields.push(FieldAggregation::new(field.clone()));
                custom_fields.len() - 1
            });
            custom_fields[slot].push_distinct(value);
        }
    }

    custom_fields.retain(|aggregation| !aggregation.values.is_empty());

    AggregationResult { custom_fields, tags }
}
