//! # Server
//!
//! Thin binary surface over the rest of the workspace: a `clap` CLI for the
//! operation surface named in §6 (`index`, `purge`, `search`, `neighbors`,
//! plus the supplemented `reconcile`), and an Axum router exposing only
//! liveness, readiness, and metrics — the tool/resource protocol server
//! itself stays out of scope (§1's Non-goals).
//!
//! | Component | Module |
//! |-----------|--------|
//! | CLI command handlers | [`commands`] |
//! | Liveness/readiness/metrics router | [`http`] |

/// CLI command handlers, each built over a [`mnemolite_infrastructure::AppContext`].
pub mod commands;

/// Liveness (`/healthz`), readiness (`/readyz`), and metrics (`/metrics`) router.
pub mod http;
