//! Liveness, readiness, and metrics surface (§6, §11.6)
//!
//! Deliberately minimal: the tool/resource protocol server that would sit
//! in front of the operation surface is out of scope (§1's Non-goals), so
//! this router exposes only what a process supervisor and a metrics
//! scraper need.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use mnemolite_domain::ports::BreakerState;
use mnemolite_infrastructure::AppContext;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct AppState {
    ctx: Arc<AppContext>,
    metrics: PrometheusHandle,
}

/// Build the router: `GET /healthz`, `GET /readyz`, `GET /metrics`.
#[must_use]
pub fn build_router(ctx: Arc<AppContext>, metrics: PrometheusHandle) -> Router {
    let state = AppState { ctx, metrics };
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/healthz", get(liveness))
        .route("/readyz", get(readiness))
        .route("/metrics", get(metrics_text))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness: the process is up and serving requests. Never inspects a
/// dependency — that's readiness's job.
async fn liveness() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}

#[derive(Serialize)]
struct ReadinessBody {
    ready: bool,
    store: DependencyStatus,
    breakers: Vec<BreakerStatus>,
}

#[derive(Serialize)]
struct DependencyStatus {
    reachable: bool,
}

#[derive(Serialize)]
struct BreakerStatus {
    dependency: String,
    state: &'static str,
}

/// Readiness: store reachability plus every named breaker's current state
/// (§6's "readiness (store reachable, embedding channel status, breaker
/// states)" — the embedding channel is itself guarded by the `embedding`
/// breaker, so its state is reported through the same list).
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let store_reachable = state.ctx.store.migrate().await.is_ok();

    let mut breakers: Vec<BreakerStatus> = state
        .ctx
        .breakers
        .iter()
        .map(|(name, breaker)| BreakerStatus {
            dependency: (*name).to_string(),
            state: breaker_state_str(breaker.state()),
        })
        .collect();
    breakers.sort_by(|a, b| a.dependency.cmp(&b.dependency));

    let any_open = breakers.iter().any(|b| b.state == "open");
    let ready = store_reachable && !any_open;

    let body = ReadinessBody {
        ready,
        store: DependencyStatus { reachable: store_reachable },
        breakers,
    };

    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(body))
}

fn breaker_state_str(state: BreakerState) -> &'static str {
    match state {
        BreakerState::Closed => "closed",
        BreakerState::Open => "open",
        BreakerState::HalfOpen => "half_open",
    }
}

/// Prometheus text exposition of every counter/gauge/histogram recorded
/// through the `metrics` facade (indexing outcomes, breaker transitions,
/// search channel statuses — §11.6).
async fn metrics_text(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_state_names_match_readiness_vocabulary() {
        assert_eq!(breaker_state_str(BreakerState::Closed), "closed");
        assert_eq!(breaker_state_str(BreakerState::Open), "open");
        assert_eq!(breaker_state_str(BreakerState::HalfOpen), "half_open");
    }

    #[test]
    fn readiness_is_not_ready_when_any_breaker_is_open() {
        let breakers = vec![
            BreakerStatus { dependency: "embedding".to_string(), state: "closed" },
            BreakerStatus { dependency: "store".to_string(), state: "open" },
        ];
        let any_open = breakers.iter().any(|b| b.state == "open");
        assert!(any_open);
    }
}
