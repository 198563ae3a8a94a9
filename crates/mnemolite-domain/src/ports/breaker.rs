//! Circuit Breaker port (C3)
//!
//! A three-state machine per named dependency (embedding, store, lexical,
//! vector). This trait is the explicit, process-wide service replacing the
//! module-level singleton pattern flagged in §9: the composition root
//! constructs one instance per dependency and hands it to whichever
//! component calls that dependency.

use async_trait::async_trait;

use crate::error::Result;

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Normal operation; failures are being counted toward the threshold.
    Closed,
    /// Short-circuiting all calls until the cool-off window elapses.
    Open,
    /// Admitting a single probe call to decide whether to close or reopen.
    HalfOpen,
}

/// Per-dependency circuit breaker.
///
/// `call` is the only entry point: it inspects state, rejects with
/// `Error::BreakerOpen` while Open, and otherwise runs `f`, recording the
/// outcome. This keeps the state-transition logic in one place rather than
/// scattered across call sites.
#[async_trait]
pub trait CircuitBreaker: Send + Sync {
    /// The dependency name this breaker instance guards.
    fn dependency(&self) -> &str;

    /// Current state, for readiness reporting.
    fn state(&self) -> BreakerState;

    /// Record a successful call, potentially transitioning `HalfOpen -> Closed`.
    fn record_success(&self);

    /// Record a failed call, potentially transitioning `Closed -> Open` or
    /// `HalfOpen -> Open`.
    fn record_failure(&self);

    /// Whether a call is currently admitted (`Closed`, or `HalfOpen` for at
    /// most one concurrent probe).
    fn try_acquire(&self) -> Result<BreakerPermit>;
}

/// A permit to make one call through the breaker. Dropping it without
/// calling `record_success`/`record_failure` is treated as a failure by
/// implementations that track in-flight probes.
pub struct BreakerPermit {
    /// Whether this permit represents the single admitted `HalfOpen` probe.
    pub is_probe: bool,
}
