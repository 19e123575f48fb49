//! Grouping, ordering and control decoration of facets.

use std::collections::HashMap;

use crate::application::filter::activation::ActivatedField;
use crate::application::options::ModuleOptions;
use crate::application::request::FilterRequest;
use crate::domain::facets::{
    DateRange, Facet, FacetControl, FacetValueView, PriceRange, assign_positions,
};
use crate::domain::types::ControlType;
use crate::util::natural::natural_sort;
use crate::util::scalar::rounded_price;

/// Turn activated fields into the final, positioned facet sequence.
pub fn order_facets(
    fields: Vec<ActivatedField>,
    options: &ModuleOptions,
    request: &FilterRequest,
) -> Vec<Facet> {
    let mut facets = group_by_key(fields, options, request);

    if options.show_picked_first {
        for facet in &mut facets {
            promote_active(&mut facet.options);
        }
    }
    assign_positions(&mut facets);

    if let Some(order) = &options.field_order {
        facets = apply_explicit_order(facets, order);
        assign_positions(&mut facets);
    }

    facets
}

/// Merge fields sharing a `name_key` in first-observed order.
///
/// The first field supplies the display metadata; duplicate raw values keep
/// their first occurrence.
fn group_by_key(
    fields: Vec<ActivatedField>,
    options: &ModuleOptions,
    request: &FilterRequest,
) -> Vec<Facet> {
    let mut groups: Vec<ActivatedField> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for activated in fields {
        match slots.get(&activated.field.name_key) {
            Some(&slot) => {
                let group = &mut groups[slot];
                for option in activated.options {
                    if !group.options.iter().any(|existing| existing.value == option.value) {
                        group.options.push(option);
                    }
                }
            }
            None => {
                slots.insert(activated.field.name_key.clone(), groups.len());
                groups.push(activated);
            }
        }
    }

    groups
        .into_iter()
        .filter(|group| !group.options.is_empty())
        .map(|group| {
            let control = control_for(
                options.control_type(&group.field.name_key),
                &group.options,
                request,
            );
            Facet {
                name_key: group.field.name_key,
                name: group.field.name,
                field_type: group.field.field_type,
                position: 0,
                is_first: false,
                options: group.options,
                control,
            }
        })
        .collect()
}

/// Stable partition: active values first, relative order otherwise kept.
fn promote_active(options: &mut Vec<FacetValueView>) {
    let (mut active, inactive): (Vec<_>, Vec<_>) =
        options.drain(..).partition(|option| option.active);
    active.extend(inactive);
    *options = active;
}

fn control_for(
    control: ControlType,
    options: &[FacetValueView],
    request: &FilterRequest,
) -> FacetControl {
    match control {
        ControlType::Checkbox => FacetControl::Checkbox,
        ControlType::Price => FacetControl::Price(price_range(options, request)),
        ControlType::DateRange => FacetControl::DateRange(DateRange {
            from_date: request.from_date().unwrap_or_default().to_string(),
            to_date: request.to_date().unwrap_or_default().to_string(),
        }),
    }
}

/// Bounds come from the naturally sorted raw values; request bounds only move the handles.
fn price_range(options: &[FacetValueView], request: &FilterRequest) -> PriceRange {
    let mut prices: Vec<&str> = options.iter().map(|option| option.value.as_str()).collect();
    natural_sort(&mut prices);

    let min_price = prices.first().map_or(0, |raw| rounded_price(raw));
    let max_price = prices.last().map_or(0, |raw| rounded_price(raw));

    PriceRange {
        min_price,
        max_price,
        from_price: request.min_price().unwrap_or(min_price as f64),
        to_price: request.max_price().unwrap_or(max_price as f64),
    }
}

/// Re-sequence to match `order` exactly; unnamed facets and unknown keys drop out.
fn apply_explicit_order(facets: Vec<Facet>, order: &[String]) -> Vec<Facet> {
    let mut by_key: HashMap<String, Facet> = facets
        .into_iter()
        .map(|facet| (facet.name_key.clone(), facet))
        .collect();
    order.iter().filter_map(|key| by_key.remove(key)).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::entities::CustomField;
    use crate::domain::types::FieldType;

    fn activated(id: i64, key: &str, values: &[(&str, bool)]) -> ActivatedField {
        ActivatedField {
            field: CustomField {
                id,
                name: key.to_uppercase(),
                name_key: key.to_string(),
                field_type: FieldType::Text,
            },
            options: values
                .iter()
                .map(|(value, active)| FacetValueView {
                    value: value.to_string(),
                    active: *active,
                })
                .collect(),
        }
    }

    fn options(pairs: &[(&str, &str)]) -> ModuleOptions {
        let raw: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ModuleOptions::from_raw("m1", &raw)
    }

    fn keys(facets: &[Facet]) -> Vec<&str> {
        facets.iter().map(|facet| facet.name_key.as_str()).collect()
    }

    fn values(facet: &Facet) -> Vec<&str> {
        facet.options.iter().map(|option| option.value.as_str()).collect()
    }

    #[test]
    fn groups_keep_first_observed_order_and_positions() {
        let facets = order_facets(
            vec![
                activated(1, "size", &[("M", false)]),
                activated(2, "color", &[("red", false)]),
                activated(3, "size", &[("L", false), ("M", true)]),
            ],
            &options(&[]),
            &FilterRequest::default(),
        );

        assert_eq!(keys(&facets), ["size", "color"]);
        assert_eq!(values(&facets[0]), ["M", "L"]);
        assert!(!facets[0].options[0].active);
        assert_eq!((facets[0].position, facets[0].is_first), (0, true));
        assert_eq!((facets[1].position, facets[1].is_first), (1, false));
    }

    #[test]
    fn picked_first_is_a_stable_partition_per_facet() {
        let fields = vec![
            activated(1, "color", &[("red", false), ("blue", true), ("green", false), ("black", true)]),
            activated(2, "size", &[("S", false), ("M", false)]),
        ];
        let picked = order_facets(
            fields.clone(),
            &options(&[("filtering_show_picked_first", "1")]),
            &FilterRequest::default(),
        );
        let plain = order_facets(fields, &options(&[]), &FilterRequest::default());

        assert_eq!(values(&picked[0]), ["blue", "black", "red", "green"]);
        assert_eq!(values(&picked[1]), ["S", "M"]);
        assert_eq!(keys(&picked), keys(&plain));
        assert_eq!(values(&plain[0]), ["red", "blue", "green", "black"]);
    }

    #[test]
    fn explicit_order_is_authoritative() {
        let facets = order_facets(
            vec![
                activated(1, "a", &[("1", false)]),
                activated(2, "b", &[("2", false)]),
                activated(3, "c", &[("3", false)]),
            ],
            &options(&[("filtering_by_custom_fields_order", "b,missing,a")]),
            &FilterRequest::default(),
        );

        assert_eq!(keys(&facets), ["b", "a"]);
        assert_eq!((facets[0].position, facets[0].is_first), (0, true));
        assert_eq!((facets[1].position, facets[1].is_first), (1, false));
    }

    #[test]
    fn price_bounds_use_natural_order() {
        let fields = vec![activated(1, "price", &[("10", false), ("2", false), ("100", false)])];
        let config = options(&[("filtering_by_custom_fields_control_type_price", "price")]);

        let facets = order_facets(fields.clone(), &config, &FilterRequest::default());
        assert_eq!(
            facets[0].control,
            FacetControl::Price(PriceRange {
                min_price: 2,
                max_price: 100,
                from_price: 2.0,
                to_price: 100.0,
            })
        );
        assert_eq!(values(&facets[0]), ["10", "2", "100"]);

        let overridden = order_facets(fields, &config, &FilterRequest::from_query("min_price=5"));
        assert_eq!(
            overridden[0].control,
            FacetControl::Price(PriceRange {
                min_price: 2,
                max_price: 100,
                from_price: 5.0,
                to_price: 100.0,
            })
        );
    }

    #[test]
    fn zero_price_bounds_keep_the_handles_at_the_extremes() {
        let facets = order_facets(
            vec![activated(1, "price", &[("10", false), ("40", false)])],
            &options(&[("filtering_by_custom_fields_control_type_price", "price")]),
            &FilterRequest::from_query("min_price=0&max_price=0"),
        );
        let FacetControl::Price(range) = &facets[0].control else {
            panic!("expected price control");
        };
        assert_eq!((range.from_price, range.to_price), (10.0, 40.0));
    }

    #[test]
    fn price_bounds_round_decimals() {
        let facets = order_facets(
            vec![activated(1, "price", &[("9.6", false), ("19.4", false)])],
            &options(&[("filtering_by_custom_fields_control_type_price", "price")]),
            &FilterRequest::default(),
        );
        let FacetControl::Price(range) = &facets[0].control else {
            panic!("expected price control");
        };
        assert_eq!((range.min_price, range.max_price), (10, 19));
    }

    #[test]
    fn date_range_reads_request_bounds() {
        let fields = vec![activated(1, "published", &[("2024-01-05", false)])];
        let config = options(&[("filtering_by_custom_fields_control_type_published", "date_range")]);

        let empty = order_facets(fields.clone(), &config, &FilterRequest::default());
        assert_eq!(empty[0].control, FacetControl::DateRange(DateRange::default()));

        let bounded = order_facets(
            fields,
            &config,
            &FilterRequest::from_query("filters[from_date]=2024-01-01&to_date=2024-02-01"),
        );
        assert_eq!(
            bounded[0].control,
            FacetControl::DateRange(DateRange {
                from_date: "2024-01-01".to_string(),
                to_date: "2024-02-01".to_string(),
            })
        );
    }

    #[test]
    fn no_fields_produce_no_facets() {
        assert!(order_facets(Vec::new(), &options(&[]), &FilterRequest::default()).is_empty());
    }
}
