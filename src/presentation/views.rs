use crate::application::error::HttpError;
use crate::domain::facets::{ActiveFilter, Facet, FacetControl, FilterPayload};
use crate::domain::types::FilteringWhen;
use askama::{Error as AskamaError, Template};
use axum::http::StatusCode;
use thiserror::Error;

/// Template id of the built-in filter form.
pub const FILTER_WIDGET_TEMPLATE: &str = "filters/widget";

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

#[derive(Debug, Error)]
pub enum FiltersRenderError {
    #[error("unknown filter template `{0}`")]
    UnknownTemplate(String),
    #[error(transparent)]
    Template(#[from] TemplateRenderError),
}

impl From<FiltersRenderError> for HttpError {
    fn from(err: FiltersRenderError) -> Self {
        match err {
            FiltersRenderError::Template(err) => err.into(),
            FiltersRenderError::UnknownTemplate(id) => HttpError::new(
                "presentation::views::render_filters",
                StatusCode::NOT_FOUND,
                "Unknown filter template",
                format!("unknown filter template `{id}`"),
            ),
        }
    }
}

/// Output of [`render_filters`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedFilters {
    Markup(String),
    Data(FilterPayload),
}

/// Render `payload` with the template named `template`, or hand it back untouched.
pub fn render_filters(
    payload: FilterPayload,
    filtering_when: FilteringWhen,
    template: Option<&str>,
) -> Result<RenderedFilters, FiltersRenderError> {
    let Some(template) = template else {
        return Ok(RenderedFilters::Data(payload));
    };

    match template {
        FILTER_WIDGET_TEMPLATE => {
            let view = FilterWidgetView::new(&payload, filtering_when);
            let markup = FilterWidgetTemplate { view }.render().map_err(|err| {
                TemplateRenderError::new(
                    "presentation::views::render_filters",
                    "Filter widget rendering failed",
                    err,
                )
            })?;
            Ok(RenderedFilters::Markup(markup))
        }
        other => Err(FiltersRenderError::UnknownTemplate(other.to_string())),
    }
}

pub struct FilterWidgetView {
    pub module_id: String,
    pub filtering_when: &'static str,
    pub facets: Vec<FacetView>,
    pub active: Vec<ActiveFilter>,
}

impl FilterWidgetView {
    pub fn new(payload: &FilterPayload, filtering_when: FilteringWhen) -> Self {
        Self {
            module_id: payload.module_id.clone(),
            filtering_when: filtering_when.as_str(),
            facets: payload.filters.iter().map(FacetView::from).collect(),
            active: payload.active_filters(),
        }
    }
}

pub struct FacetView {
    pub name_key: String,
    pub name: String,
    pub control: &'static str,
    pub position: usize,
    pub is_first: bool,
    pub checkboxes: Vec<CheckboxView>,
    pub inputs: Vec<RangeInputView>,
}

pub struct CheckboxView {
    pub input_name: String,
    pub value: String,
    pub checked: bool,
}

pub struct RangeInputView {
    pub label: &'static str,
    pub input_type: &'static str,
    pub input_name: &'static str,
    pub value: String,
    pub min: String,
    pub max: String,
}

impl From<&Facet> for FacetView {
    fn from(facet: &Facet) -> Self {
        let mut checkboxes = Vec::new();
        let mut inputs = Vec::new();

        match &facet.control {
            FacetControl::Checkbox => {
                let input_name = format!("filters[{}][]", facet.name_key);
                checkboxes = facet
                    .options
                    .iter()
                    .map(|option| CheckboxView {
                        input_name: input_name.clone(),
                        value: option.value.clone(),
                        checked: option.active,
                    })
                    .collect();
            }
            FacetControl::Price(range) => {
                let (min, max) = (range.min_price.to_string(), range.max_price.to_string());
                inputs.push(RangeInputView {
                    label: "From",
                    input_type: "number",
                    input_name: "min_price",
                    value: range.from_price.to_string(),
                    min: min.clone(),
                    max: max.clone(),
                });
                inputs.push(RangeInputView {
                    label: "To",
                    input_type: "number",
                    input_name: "max_price",
                    value: range.to_price.to_string(),
                    min,
                    max,
                });
            }
            FacetControl::DateRange(range) => {
                inputs.push(RangeInputView {
                    label: "From",
                    input_type: "date",
                    input_name: "filters[from_date]",
                    value: range.from_date.clone(),
                    min: String::new(),
                    max: String::new(),
                });
                inputs.push(RangeInputView {
                    label: "To",
                    input_type: "date",
                    input_name: "filters[to_date]",
                    value: range.to_date.clone(),
                    min: String::new(),
                    max: String::new(),
                });
            }
        }

        Self {
            name_key: facet.name_key.clone(),
            name: facet.name.clone(),
            control: facet.control.control_type().as_str(),
            position: facet.position,
            is_first: facet.is_first,
            checkboxes,
            inputs,
        }
    }
}

#[derive(Template)]
#[template(path = "filters/widget.html")]
pub struct FilterWidgetTemplate {
    pub view: FilterWidgetView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facets::{DateRange, FacetValueView, PriceRange};
    use crate::domain::types::FieldType;

    fn facet(key: &str, position: usize, control: FacetControl, values: &[(&str, bool)]) -> Facet {
        Facet {
            name_key: key.to_string(),
            name: key.to_uppercase(),
            field_type: FieldType::Text,
            position,
            is_first: position == 0,
            options: values
                .iter()
                .map(|(value, active)| FacetValueView {
                    value: value.to_string(),
                    active: *active,
                })
                .collect(),
            control,
        }
    }

    fn payload() -> FilterPayload {
        FilterPayload {
            filters: vec![
                facet(
                    "color",
                    0,
                    FacetControl::Checkbox,
                    &[("red", true), ("<blue>", false)],
                ),
                facet(
                    "price",
                    1,
                    FacetControl::Price(PriceRange {
                        min_price: 2,
                        max_price: 100,
                        from_price: 5.0,
                        to_price: 100.0,
                    }),
                    &[("2", false), ("100", false)],
                ),
                facet(
                    "published",
                    2,
                    FacetControl::DateRange(DateRange {
                        from_date: "2024-01-01".to_string(),
                        to_date: String::new(),
                    }),
                    &[],
                ),
            ],
            module_id: "blog".to_string(),
        }
    }

    #[test]
    fn without_template_payload_is_returned() {
        let rendered =
            render_filters(payload(), FilteringWhen::Automatically, None).expect("render");
        assert_eq!(rendered, RenderedFilters::Data(payload()));
    }

    #[test]
    fn unknown_template_is_rejected() {
        let err = render_filters(payload(), FilteringWhen::Automatically, Some("nope"))
            .expect_err("unknown template");
        assert!(matches!(err, FiltersRenderError::UnknownTemplate(id) if id == "nope"));
    }

    #[test]
    fn widget_markup_reflects_facets() {
        let rendered = render_filters(
            payload(),
            FilteringWhen::OnSubmit,
            Some(FILTER_WIDGET_TEMPLATE),
        )
        .expect("render");
        let RenderedFilters::Markup(html) = rendered else {
            panic!("expected markup");
        };

        assert!(html.contains(r#"data-module-id="blog""#));
        assert!(html.contains(r#"data-filtering-when="on_submit""#));
        assert!(html.contains(r#"value="red" checked"#));
        assert!(!html.contains("<blue>"));
        assert!(html.contains(r#"name="min_price""#));
        assert!(html.contains(r#"value="5""#));
        assert!(html.contains(r#"name="filters[from_date]""#));
        assert!(html.contains(r#"<li data-field="color">COLOR: red</li>"#));

        let color = html.find(r#"data-field="color""#).expect("color facet");
        let price = html.find(r#"data-field="price""#).expect("price facet");
        assert!(color < price);
    }
}
