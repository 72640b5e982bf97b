//! HTTP API — axum router, authentication middleware and handlers.
//!
//! Handlers validate path input, delegate to the application services and
//! render their results; they never talk to the cluster directly.

pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use podstat_common::ServerConfig;
use tower_http::trace::TraceLayer;

use crate::application::ports::{AuthInfoParser, IdentityProvider};
use crate::application::services::{InstanceAggregator, TerminationWatcher};

pub use error::ApiErrorResponse;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: InstanceAggregator,
    pub watcher: TerminationWatcher,
    pub auth_parser: Arc<dyn AuthInfoParser>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub config: Arc<ServerConfig>,
}

/// Build the application router.
///
/// - `/`, `/v3` → API info (no authentication)
/// - `/whoami` → caller identity
/// - `/v3/spaces/{space}/apps/{app}/processes/{type}/stats` → per-slot stats
/// - `/v3/spaces/{space}/apps/{app}/termination` → block until no instance remains
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::api_info))
        .route("/v3", get(handlers::api_info))
        .route("/whoami", get(handlers::whoami))
        .route(
            "/v3/spaces/{space_guid}/apps/{app_guid}/processes/{process_type}/stats",
            get(handlers::process_stats),
        )
        .route(
            "/v3/spaces/{space_guid}/apps/{app_guid}/termination",
            get(handlers::await_termination),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
