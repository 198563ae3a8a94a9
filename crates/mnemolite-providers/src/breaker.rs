//! Circuit Breaker (C3) implementation.
//!
//! A process-wide, per-dependency three-state machine (§4.3). State lives
//! behind a `Mutex<Inner>` rather than a set of independent atomics because
//! the Closed→Open and HalfOpen→{Closed,Open} transitions must be decided
//! and applied as one step — two independent atomics could race and admit
//! two concurrent probes.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mnemolite_domain::error::{Error, Result};
use mnemolite_domain::ports::{BreakerPermit, BreakerState, CircuitBreaker};
use tracing::info;

struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// In-process circuit breaker for one named dependency.
pub struct ProcessCircuitBreaker {
    dependency: String,
    failure_threshold: u32,
    cooloff: Duration,
    inner: Mutex<Inner>,
}

impl ProcessCircuitBreaker {
    /// Build a breaker for `dependency`, tripping after `failure_threshold`
    /// consecutive failures and cooling off for `cooloff` before probing.
    #[must_use]
    pub fn new(dependency: impl Into<String>, failure_threshold: u32, cooloff: Duration) -> Self {
        Self {
            dependency: dependency.into(),
            failure_threshold,
            cooloff,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    fn transition(&self, inner: &mut Inner, to: BreakerState) {
        if inner.state == to {
            return;
        }
        info!(
            dependency = %self.dependency,
            from_state = ?inner.state,
            to_state = ?to,
            "circuit breaker transition"
        );
        inner.state = to;
    }
}

#[async_trait]
impl CircuitBreaker for ProcessCircuitBreaker {
    fn dependency(&self) -> &str {
        &self.dependency
    }

    fn state(&self) -> BreakerState {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if inner.state == BreakerState::Open {
            if let Some(opened_at) = inner.opened_at {
                if opened_at.elapsed() >= self.cooloff {
                    self.transition(&mut inner, BreakerState::HalfOpen);
                }
            }
        }
        inner.state
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.consecutive_failures = 0;
        inner.probe_in_flight = false;
        if inner.state != BreakerState::Closed {
            self.transition(&mut inner, BreakerState::Closed);
        }
    }

    fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.probe_in_flight = false;
        inner.consecutive_failures += 1;
        match inner.state {
            BreakerState::Closed if inner.consecutive_failures >= self.failure_threshold => {
                inner.opened_at = Some(Instant::now());
                self.transition(&mut inner, BreakerState::Open);
            }
            BreakerState::HalfOpen => {
                inner.opened_at = Some(Instant::now());
                self.transition(&mut inner, BreakerState::Open);
            }
            _ => {}
        }
    }

    fn try_acquire(&self) -> Result<BreakerPermit> {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if inner.state == BreakerState::Open {
            if let Some(opened_at) = inner.opened_at {
                if opened_at.elapsed() >= self.cooloff {
                    self.transition(&mut inner, BreakerState::HalfOpen);
                }
            }
        }
        match inner.state {
            BreakerState::Closed => Ok(BreakerPermit { is_probe: false }),
            BreakerState::HalfOpen if !inner.probe_in_flight => {
                inner.probe_in_flight = true;
                Ok(BreakerPermit { is_probe: true })
            }
            _ => Err(Error::breaker_open(self.dependency.clone())),
        }
    }
}
