//! Marks the facet values selected by the current request.

use crate::application::request::FilterRequest;
use crate::domain::entities::CustomField;
use crate::domain::facets::{AggregationResult, FacetValueView};

/// One aggregated field with per-request activation flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivatedField {
    pub field: CustomField,
    pub options: Vec<FacetValueView>,
}

/// A value is active iff the request selects it under the field's `name_key`.
///
/// Selections for keys without a matching field are ignored.
pub fn mark_active(aggregation: &AggregationResult, request: &FilterRequest) -> Vec<ActivatedField> {
    aggregation
        .custom_fields
        .iter()
        .map(|aggregated| {
            let selected = request.selected(&aggregated.field.name_key);
            let options = aggregated
                .raw_values()
                .map(|raw| FacetValueView {
                    value: raw.to_string(),
                    active: selected.iter().any(|choice| choice == raw),
                })
                .collect();
            ActivatedField {
                field: aggregated.field.clone(),
                options,
            }
        })
        .collect()
}
