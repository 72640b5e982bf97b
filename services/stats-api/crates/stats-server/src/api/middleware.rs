//! Authentication middleware.
//!
//! Every request outside [`UNAUTHENTICATED_PATHS`] must carry credentials
//! that parse and resolve to an identity. The parsed [`AuthInfo`] and the
//! resolved [`Identity`] are attached to the request extensions.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::AUTHORIZATION;

use crate::api::{ApiErrorResponse, AppState};
use crate::domain::{AuthError, AuthInfo, Identity};

/// Paths served without authentication.
pub const UNAUTHENTICATED_PATHS: &[&str] = &["/", "/v3"];

pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if UNAUTHENTICATED_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let auth_info = match parse_auth_info(&state, &request) {
        Ok(info) => info,
        Err(AuthError::NotAuthenticated) => {
            return ApiErrorResponse::not_authenticated().into_response();
        }
        Err(AuthError::InvalidAuth) => return ApiErrorResponse::invalid_auth().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to parse auth info");
            return ApiErrorResponse::unknown().into_response();
        }
    };

    let identity: Identity = match state.identity_provider.get_identity(&auth_info).await {
        Ok(identity) => identity,
        Err(AuthError::InvalidAuth) => return ApiErrorResponse::invalid_auth().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to get identity");
            return ApiErrorResponse::unknown().into_response();
        }
    };

    tracing::debug!(identity = %identity.name, path = %request.uri().path(), "authenticated");
    request.extensions_mut().insert(auth_info);
    request.extensions_mut().insert(identity);
    next.run(request).await
}

fn parse_auth_info(state: &AppState, request: &Request) -> Result<AuthInfo, AuthError> {
    let header = match request.headers().get(AUTHORIZATION) {
        None => "",
        Some(value) => value.to_str().map_err(|_| AuthError::InvalidAuth)?,
    };
    state.auth_parser.parse(header)
}
