//! Category domain model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier for a category row.
pub type CategoryId = i64;

/// Question category, e.g. "Science" or "History".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Serialized as `type` to match the wire schema.
    #[serde(rename = "type")]
    pub label: String,
}

impl Category {
    pub fn new(id: CategoryId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Builds the `{id: label}` lookup used by list responses.
///
/// Keys are ordered by id so serialized output is deterministic.
pub fn category_labels(categories: &[Category]) -> BTreeMap<CategoryId, String> {
    categories
        .iter()
        .map(|category| (category.id, category.label.clone()))
        .collect()
}
