//! # Infrastructure Layer
//!
//! Configuration loading, the explicit composition root, and the ingress
//! message model from §6. This is the only crate that knows about every
//! other crate in the workspace at once; nothing downstream of
//! [`composition::AppContext`] depends on a concrete provider type.
//!
//! | Component | Module |
//! |-----------|--------|
//! | Configuration (§11.4) | [`config`] |
//! | Composition root (§9) | [`composition::AppContext`] |
//! | Ingress message model (§6) | [`ingress`] |

/// Layered configuration loading (defaults → TOML → `MNEMOLITE_*` env).
pub mod config;

/// The explicit composition root assembling every provider and use case.
pub mod composition;

/// Ingress message model and tool-result filtering rule from §6.
pub mod ingress;

pub use composition::AppContext;
pub use config::{ConfigError, EmbeddingMode, Settings};
