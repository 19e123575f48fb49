//! Incoming listing request parsed from a raw query string.
//!
//! Filter selections use bracket notation (`filters[color][]=red`). An
//! `ajax_filter` parameter carries a second URL-encoded query string whose
//! top-level keys replace the outer ones, so the client can re-filter
//! without a page reload.

use std::collections::{BTreeMap, HashMap, HashSet};

use url::form_urlencoded;

use crate::util::scalar::leading_number;

const AJAX_FILTER: &str = "ajax_filter";
const FILTERS: &str = "filters";

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterParam {
    Values(Vec<String>),
    Scalar(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pairs: Vec<(String, String)>,
    params: HashMap<String, String>,
    filters: BTreeMap<String, FilterParam>,
}

impl FilterRequest {
    pub fn from_query(raw: &str) -> Self {
        let outer = parse_pairs(raw);

        let ajax = outer
            .iter()
            .rev()
            .find(|(key, _)| key == AJAX_FILTER)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(parse_pairs)
            .unwrap_or_default();

        let overridden: HashSet<String> = ajax
            .iter()
            .map(|(key, _)| top_level_key(key).to_string())
            .collect();

        let pairs: Vec<(String, String)> = outer
            .into_iter()
            .filter(|(key, _)| {
                let top = top_level_key(key);
                top != AJAX_FILTER && !overridden.contains(top)
            })
            .chain(
                ajax.into_iter()
                    .filter(|(key, _)| top_level_key(key) != AJAX_FILTER),
            )
            .collect();

        let mut request = Self {
            pairs,
            ..Self::default()
        };
        request.index();
        request
    }

    fn index(&mut self) {
        for (key, value) in &self.pairs {
            let Some((top, segments)) = split_brackets(key) else {
                if key == FILTERS {
                    // A bare `filters=...` replaces any mapping seen so far.
                    self.filters.clear();
                }
                self.params.insert(key.clone(), value.clone());
                continue;
            };

            if top != FILTERS {
                // Nested parameters other than `filters` are not consumed.
                continue;
            }
            // A later bracketed entry turns `filters` back into a mapping.
            self.params.remove(FILTERS);

            match segments.as_slice() {
                [name] => {
                    self.filters
                        .insert(name.clone(), FilterParam::Scalar(value.clone()));
                }
                [name, _] => match self.filters.get_mut(name) {
                    Some(FilterParam::Values(values)) => values.push(value.clone()),
                    _ => {
                        self.filters
                            .insert(name.clone(), FilterParam::Values(vec![value.clone()]));
                    }
                },
                // Deeper nesting cannot match a scalar field value.
                _ => {}
            }
        }
    }

    /// Top-level scalar parameter; empty values count as absent.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Values selected for `name_key`. Anything that is not a list yields nothing.
    pub fn selected(&self, name_key: &str) -> &[String] {
        match self.filters.get(name_key) {
            Some(FilterParam::Values(values)) => values,
            _ => &[],
        }
    }

    /// Every field key with at least one selected value, in key order.
    pub fn selections(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.filters.iter().filter_map(|(key, param)| match param {
            FilterParam::Values(values) if !values.is_empty() => {
                Some((key.as_str(), values.as_slice()))
            }
            _ => None,
        })
    }

    pub fn filter_scalar(&self, key: &str) -> Option<&str> {
        match self.filters.get(key) {
            Some(FilterParam::Scalar(value)) if !value.trim().is_empty() => Some(value.trim()),
            _ => None,
        }
    }

    pub fn from_date(&self) -> Option<&str> {
        self.filter_scalar("from_date")
            .or_else(|| self.param("from_date"))
    }

    pub fn to_date(&self) -> Option<&str> {
        self.filter_scalar("to_date").or_else(|| self.param("to_date"))
    }

    /// Lower price bound; a bare `0` counts as unset.
    pub fn min_price(&self) -> Option<f64> {
        self.price_param("min_price")
    }

    /// Upper price bound; a bare `0` counts as unset.
    pub fn max_price(&self) -> Option<f64> {
        self.price_param("max_price")
    }

    fn price_param(&self, key: &str) -> Option<f64> {
        self.param(key)
            .filter(|raw| *raw != "0")
            .and_then(leading_number)
    }

    pub fn page(&self) -> Option<&str> {
        self.param("page")
    }

    /// Effective query string after the `ajax_filter` merge, without `ajax_filter` itself.
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

fn parse_pairs(raw: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(raw.trim_start_matches('?').as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn top_level_key(key: &str) -> &str {
    match split_brackets(key) {
        Some((top, _)) => top,
        None => key,
    }
}

/// Split `a[b][c]` into `("a", ["b", "c"])`; `None` when the key has no well-formed brackets.
fn split_brackets(key: &str) -> Option<(&str, Vec<String>)> {
    let open = key.find('[')?;
    if open == 0 {
        return None;
    }
    let (top, mut rest) = key.split_at(open);
    let mut segments = Vec::new();
    while let Some(stripped) = rest.strip_prefix('[') {
        let close = stripped.find(']')?;
        segments.push(stripped[..close].to_string());
        rest = &stripped[close + 1..];
    }
    if !rest.is_empty() {
        return None;
    }
    Some((top, segments))
}
