//! Query predicates over shop records
//!
//! A [`Filter`] is plain data: it can be evaluated against a record in memory
//! with [`Filter::matches`] or compiled by a store into its own query language.
//! Building a filter never touches a store.

use thiserror::Error;

use crate::models::shop::{Shop, ShopField};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Search query must not be empty")]
    EmptyQuery,
}

/// A composable predicate over [`Shop`] records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Matches every record
    All,

    /// Exact, case-sensitive equality. For list fields any element may match.
    Equals { field: ShopField, value: String },

    /// Case-insensitive substring match against at least one of `fields`.
    ///
    /// `needle` is kept lowercased.
    ContainsAny {
        fields: Vec<ShopField>,
        needle: String,
    },

    /// Every inner filter must match
    And(Vec<Filter>),
}

impl Filter {
    pub fn equals(field: ShopField, value: impl Into<String>) -> Self {
        Self::Equals {
            field,
            value: value.into(),
        }
    }

    pub fn contains_any(fields: &[ShopField], needle: &str) -> Self {
        Self::ContainsAny {
            fields: fields.to_vec(),
            needle: needle.to_lowercase(),
        }
    }

    /// Combine with `other`, both must match
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), f) => {
                left.push(f);
                Filter::And(left)
            }
            (f, Filter::And(mut right)) => {
                right.insert(0, f);
                Filter::And(right)
            }
            (left, right) => Filter::And(vec![left, right]),
        }
    }

    /// Evaluate the predicate against a record
    pub fn matches(&self, shop: &Shop) -> bool {
        match self {
            Filter::All => true,
            Filter::Equals { field, value } => {
                shop.texts(*field).into_iter().any(|text| text == value)
            }
            Filter::ContainsAny { fields, needle } => fields.iter().any(|field| {
                shop.texts(*field)
                    .into_iter()
                    .any(|text| text.to_lowercase().contains(needle.as_str()))
            }),
            Filter::And(filters) => filters.iter().all(|f| f.matches(shop)),
        }
    }
}

/// Records whose `category` is exactly `category`
pub fn category_filter(category: &str) -> Filter {
    Filter::equals(ShopField::Category, category)
}

/// Records where `query` appears, ignoring case, in the name, a tag, a service,
/// the type or the description; restricted to `category` when one is given.
///
/// A blank query is rejected rather than turned into a match-nothing or
/// match-everything filter.
pub fn text_search_filter(query: &str, category: Option<&str>) -> Result<Filter, FilterError> {
    if query.trim().is_empty() {
        return Err(FilterError::EmptyQuery);
    }

    let text = Filter::contains_any(&ShopField::SEARCHABLE, query);

    Ok(match category {
        Some(category) => text.and(category_filter(category)),
        None => text,
    })
}
