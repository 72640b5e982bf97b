//! Route handlers.

use axum::Extension;
use axum::Json;
use axum::extract::{Path, Query, State};
use http::StatusCode;
use podstat_common::{
    ApiInfo, StatsResponse, WhoAmIResponse, validate_label_value, validate_namespace,
};
use serde::Deserialize;

use crate::api::{ApiErrorResponse, AppState};
use crate::application::services::StatsQuery;
use crate::domain::{Identity, TerminationError};

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    /// Desired instance count of the process, at most `max_desired_instances`.
    pub instances: u32,
}

#[derive(Debug, Deserialize)]
pub struct TerminationParams {
    /// Requested wait; clamped to the configured maximum.
    pub timeout_secs: Option<u64>,
}

pub async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn whoami(Extension(identity): Extension<Identity>) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        name: identity.name,
        kind: identity.kind,
    })
}

pub async fn process_stats(
    State(state): State<AppState>,
    Path((space_guid, app_guid, process_type)): Path<(String, String, String)>,
    Query(params): Query<StatsParams>,
) -> Result<Json<StatsResponse>, ApiErrorResponse> {
    validate_namespace(&space_guid)?;
    validate_label_value("app_guid", &app_guid)?;
    validate_label_value("process_type", &process_type)?;
    if params.instances > state.config.max_desired_instances {
        return Err(ApiErrorResponse::unprocessable(format!(
            "instances must be at most {}",
            state.config.max_desired_instances
        )));
    }

    let query = StatsQuery {
        namespace: space_guid,
        app_guid,
        process_type,
        desired_instances: params.instances,
    };
    let resources = state.aggregator.fetch_stats(&query).await?;
    Ok(Json(StatsResponse { resources }))
}

/// Long-poll until the application has no instances left.
///
/// Responds `204` once terminated and `504` when the wait expires first.
/// A client disconnect drops the watch, which stops it.
pub async fn await_termination(
    State(state): State<AppState>,
    Path((space_guid, app_guid)): Path<(String, String)>,
    Query(params): Query<TerminationParams>,
) -> Result<StatusCode, ApiErrorResponse> {
    validate_namespace(&space_guid)?;
    validate_label_value("app_guid", &app_guid)?;

    let wait = state.config.termination_wait(params.timeout_secs);
    let watch = state.watcher.spawn(&space_guid, &app_guid);
    let cancel = watch.cancellation_token();

    let result = tokio::select! {
        result = watch.wait() => result,
        () = tokio::time::sleep(wait) => {
            cancel.cancel();
            Err(TerminationError::Cancelled)
        }
    };

    result?;
    Ok(StatusCode::NO_CONTENT)
}
