//! Statically registered query constraints applied before pagination.

use crate::application::options::ModuleOptions;
use crate::application::repos::{
    ContentQuery, DateRangePredicate, FieldValuePredicate, NumericRangePredicate, SortDirection,
    SortKey, SortOrder,
};
use crate::application::request::FilterRequest;
use crate::domain::types::ControlType;
use crate::util::scalar::parse_date;

/// Everything a constraint may consult while narrowing a query.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintContext<'a> {
    pub request: &'a FilterRequest,
    pub options: &'a ModuleOptions,
}

/// A query extension point with a fixed contract: take a query, return a narrower one.
pub trait QueryConstraint: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, query: ContentQuery, ctx: &ConstraintContext<'_>) -> ContentQuery;
}

/// The built-in constraints, in application order.
pub fn default_constraints() -> Vec<Box<dyn QueryConstraint>> {
    vec![
        Box::new(TagsConstraint),
        Box::new(CategoriesConstraint),
        Box::new(SearchConstraint),
        Box::new(CustomFieldsConstraint),
        Box::new(PriceRangeConstraint),
        Box::new(DateRangeConstraint),
        Box::new(SortConstraint),
    ]
}

/// `tags=slug,slug`: keep items carrying any of the listed tags.
#[derive(Debug, Clone, Copy)]
pub struct TagsConstraint;

impl QueryConstraint for TagsConstraint {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn apply(&self, mut query: ContentQuery, ctx: &ConstraintContext<'_>) -> ContentQuery {
        if let Some(raw) = ctx.request.param("tags") {
            for slug in raw.split(',').map(str::trim).filter(|slug| !slug.is_empty()) {
                if !query.tag_slugs.iter().any(|existing| existing == slug) {
                    query.tag_slugs.push(slug.to_string());
                }
            }
        }
        query
    }
}

/// `categories=id,id`: keep items filed under any of the listed categories.
///
/// Entries that are not integers are skipped.
#[derive(Debug, Clone, Copy)]
pub struct CategoriesConstraint;

impl QueryConstraint for CategoriesConstraint {
    fn name(&self) -> &'static str {
        "categories"
    }

    fn apply(&self, mut query: ContentQuery, ctx: &ConstraintContext<'_>) -> ContentQuery {
        let Some(raw) = ctx.request.param("categories") else {
            return query;
        };
        for id in raw.split(',').filter_map(|entry| entry.trim().parse::<i64>().ok()) {
            if !query.category_ids.contains(&id) {
                query.category_ids.push(id);
            }
        }
        query
    }
}

/// `search=text`: case-insensitive match on title or body.
#[derive(Debug, Clone, Copy)]
pub struct SearchConstraint;

impl QueryConstraint for SearchConstraint {
    fn name(&self) -> &'static str {
        "search"
    }

    fn apply(&self, mut query: ContentQuery, ctx: &ConstraintContext<'_>) -> ContentQuery {
        if let Some(term) = ctx.request.param("search") {
            query.search = Some(term.to_string());
        }
        query
    }
}

/// `filters[key][]=value` for enabled checkbox fields.
#[derive(Debug, Clone, Copy)]
pub struct CustomFieldsConstraint;

impl QueryConstraint for CustomFieldsConstraint {
    fn name(&self) -> &'static str {
        "custom_fields"
    }

    fn apply(&self, mut query: ContentQuery, ctx: &ConstraintContext<'_>) -> ContentQuery {
        if !ctx.options.filtering_enabled {
            return query;
        }
        for (name_key, values) in ctx.request.selections() {
            if !ctx.options.is_field_enabled(name_key)
                || ctx.options.control_type(name_key) != ControlType::Checkbox
            {
                continue;
            }
            query.field_values.push(FieldValuePredicate {
                name_key: name_key.to_string(),
                values: values.to_vec(),
            });
        }
        query
    }
}

/// `min_price` / `max_price` against every price-controlled field.
#[derive(Debug, Clone, Copy)]
pub struct PriceRangeConstraint;

impl QueryConstraint for PriceRangeConstraint {
    fn name(&self) -> &'static str {
        "price_range"
    }

    fn apply(&self, mut query: ContentQuery, ctx: &ConstraintContext<'_>) -> ContentQuery {
        if !ctx.options.filtering_enabled {
            return query;
        }
        let (min, max) = (ctx.request.min_price(), ctx.request.max_price());
        if min.is_none() && max.is_none() {
            return query;
        }
        let name_keys = enabled_with_control(ctx.options, ControlType::Price);
        if !name_keys.is_empty() {
            query
                .numeric_ranges
                .push(NumericRangePredicate { name_keys, min, max });
        }
        query
    }
}

/// `from_date` / `to_date` against every date-range-controlled field.
#[derive(Debug, Clone, Copy)]
pub struct DateRangeConstraint;

impl QueryConstraint for DateRangeConstraint {
    fn name(&self) -> &'static str {
        "date_range"
    }

    fn apply(&self, mut query: ContentQuery, ctx: &ConstraintContext<'_>) -> ContentQuery {
        if !ctx.options.filtering_enabled {
            return query;
        }
        let from = ctx.request.from_date().and_then(parse_date);
        let to = ctx.request.to_date().and_then(parse_date);
        if from.is_none() && to.is_none() {
            return query;
        }
        let name_keys = enabled_with_control(ctx.options, ControlType::DateRange);
        if !name_keys.is_empty() {
            query
                .date_ranges
                .push(DateRangePredicate { name_keys, from, to });
        }
        query
    }
}

/// `sort=title|id` with `order=asc|desc`.
#[derive(Debug, Clone, Copy)]
pub struct SortConstraint;

impl QueryConstraint for SortConstraint {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn apply(&self, mut query: ContentQuery, ctx: &ConstraintContext<'_>) -> ContentQuery {
        let key = match ctx.request.param("sort") {
            Some("title") => SortKey::Title,
            Some("id") => SortKey::Id,
            _ => return query,
        };
        let direction = match ctx.request.param("order") {
            Some(order) if order.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        query.sort = Some(SortOrder { key, direction });
        query
    }
}

fn enabled_with_control(options: &ModuleOptions, control: ControlType) -> Vec<String> {
    options
        .fields_with_control(control)
        .into_iter()
        .filter(|key| options.is_field_enabled(key))
        .collect()
}
