//! Typed view of the per-module option table.
//!
//! Recognised keys:
//!
//! | key | effect |
//! |-----|--------|
//! | `filtering_the_results` | `"1"` enables facet computation |
//! | `disable_filter` | truthy hides the filter widget |
//! | `filtering_show_picked_first` | truthy moves selected values to the front |
//! | `filtering_by_custom_fields_<name_key>` | `"1"` enables that field as a facet |
//! | `filtering_by_custom_fields_control_type_<name_key>` | widget for that field |
//! | `filtering_by_custom_fields_order` | comma separated field keys, authoritative order |
//! | `filtering_when` | client submit mode |
//! | `content_from_id` | main page id whose children are listed |
//! | `limit` | page size |

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::types::{ControlType, FilteringWhen};

const FILTERING_THE_RESULTS: &str = "filtering_the_results";
const DISABLE_FILTER: &str = "disable_filter";
const SHOW_PICKED_FIRST: &str = "filtering_show_picked_first";
const FIELD_PREFIX: &str = "filtering_by_custom_fields_";
const CONTROL_TYPE_PREFIX: &str = "filtering_by_custom_fields_control_type_";
const FIELD_ORDER: &str = "filtering_by_custom_fields_order";
const FILTERING_WHEN: &str = "filtering_when";
const CONTENT_FROM_ID: &str = "content_from_id";
const LIMIT: &str = "limit";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModuleOptions {
    pub module_id: String,
    pub filtering_enabled: bool,
    pub widget_disabled: bool,
    pub show_picked_first: bool,
    pub enabled_fields: HashSet<String>,
    pub control_types: HashMap<String, ControlType>,
    pub field_order: Option<Vec<String>>,
    pub filtering_when: FilteringWhen,
    pub content_from_id: Option<i64>,
    pub limit: Option<u32>,
}

impl ModuleOptions {
    pub fn from_raw(module_id: impl Into<String>, raw: &HashMap<String, String>) -> Self {
        let mut options = Self {
            module_id: module_id.into(),
            ..Self::default()
        };

        for (key, value) in raw {
            match key.as_str() {
                FILTERING_THE_RESULTS => options.filtering_enabled = value.trim() == "1",
                DISABLE_FILTER => options.widget_disabled = is_truthy(value),
                SHOW_PICKED_FIRST => options.show_picked_first = is_truthy(value),
                FIELD_ORDER => options.field_order = parse_field_order(value),
                FILTERING_WHEN => options.filtering_when = FilteringWhen::parse_lossy(value),
                CONTENT_FROM_ID => {
                    options.content_from_id =
                        value.trim().parse::<i64>().ok().filter(|id| *id > 0)
                }
                LIMIT => options.limit = value.trim().parse::<u32>().ok().filter(|n| *n > 0),
                other => {
                    if let Some(name_key) = other.strip_prefix(CONTROL_TYPE_PREFIX) {
                        match value.parse::<ControlType>() {
                            Ok(control) => {
                                options.control_types.insert(name_key.to_string(), control);
                            }
                            Err(_) if value.trim().is_empty() => {}
                            Err(err) => {
                                debug!(
                                    module_id = %options.module_id,
                                    name_key,
                                    error = %err,
                                    "falling back to checkbox control"
                                );
                            }
                        }
                    } else if let Some(name_key) = other.strip_prefix(FIELD_PREFIX) {
                        if value.trim() == "1" {
                            options.enabled_fields.insert(name_key.to_string());
                        }
                    }
                }
            }
        }

        options
    }

    pub fn is_field_enabled(&self, name_key: &str) -> bool {
        self.enabled_fields.contains(name_key)
    }

    pub fn control_type(&self, name_key: &str) -> ControlType {
        self.control_types
            .get(name_key)
            .copied()
            .unwrap_or_default()
    }

    /// Field keys whose widget is `control`.
    pub fn fields_with_control(&self, control: ControlType) -> Vec<String> {
        let mut keys: Vec<String> = self
            .control_types
            .iter()
            .filter(|(_, configured)| **configured == control)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Facets are shown when filtering runs and the widget is not hidden.
    pub fn shows_widget(&self) -> bool {
        self.filtering_enabled && !self.widget_disabled
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim(), "" | "0" | "false" | "n" | "no" | "off")
}

fn parse_field_order(value: &str) -> Option<Vec<String>> {
    let mut seen = HashSet::new();
    let keys: Vec<String> = value
        .split([',', '&', '|'])
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .filter(|key| seen.insert(key.to_string()))
        .map(str::to_string)
        .collect();
    (!keys.is_empty()).then_some(keys)
}
