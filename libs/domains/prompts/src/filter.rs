//! Pure mapping from optional request parameters to filter conditions.

use crate::models::{FilterCondition, FilterParams};

/// The literal category value that disables category filtering.
const CATEGORY_ALL: &str = "all";

/// Build the filter-condition list for a set of optional parameters.
///
/// Total and pure: always returns a list, possibly empty. Callers must
/// translate an empty list into "no filter" rather than an empty AND
/// filter (see [`crate::models::VectorSearch::filter`]).
pub fn build_filter(params: &FilterParams) -> Vec<FilterCondition> {
    let mut conditions = Vec::new();

    if let Some(category) = &params.category {
        if category != CATEGORY_ALL {
            conditions.push(FilterCondition::Keyword {
                key: "category",
                value: category.clone(),
            });
        }
    }

    if let Some(tags) = &params.tags {
        if !tags.is_empty() {
            conditions.push(FilterCondition::AnyKeyword {
                key: "tags",
                values: tags.clone(),
            });
        }
    }

    if let Some(difficulty) = &params.difficulty {
        conditions.push(FilterCondition::Keyword {
            key: "difficulty",
            value: difficulty.clone(),
        });
    }

    // Tri-state: Some(false) filters for unfeatured prompts, None filters
    // nothing.
    if let Some(featured) = params.featured {
        conditions.push(FilterCondition::Flag {
            key: "featured",
            value: featured,
        });
    }

    if let Some(contributor) = &params.contributor {
        conditions.push(FilterCondition::Keyword {
            key: "contributor",
            value: contributor.clone(),
        });
    }

    conditions
}
