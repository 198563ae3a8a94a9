//! Project entity
//!
//! A `Project` is a logical container optionally referenced by memories,
//! identified by a stable slug derived from an origin path (§6).

use serde::{Deserialize, Serialize};

/// Logical project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Stable, lower-cased slug derived from the origin path.
    pub slug: String,
    /// The origin path this project was resolved from, for diagnostics.
    pub origin_path: Option<String>,
}

impl Project {
    /// Construct a project from an already-derived slug.
    #[must_use]
    pub fn from_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            origin_path: None,
        }
    }
}
