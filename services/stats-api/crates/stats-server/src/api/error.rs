//! Error responses in the `{"errors": [...]}` envelope.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use podstat_common::{ApiErrorBody, LabelError};

use crate::domain::{ListError, TerminationError};

/// An HTTP status paired with an error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, code: u32, title: &str, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody::single(code, title, detail),
        }
    }

    #[must_use]
    pub fn not_authenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            10002,
            "CF-NotAuthenticated",
            "Authentication error",
        )
    }

    #[must_use]
    pub fn invalid_auth() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            1000,
            "CF-InvalidAuthToken",
            "Invalid Auth Token",
        )
    }

    #[must_use]
    pub fn unknown() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            10001,
            "UnknownError",
            "An unknown error occurred.",
        )
    }

    #[must_use]
    pub fn not_authorized() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            10003,
            "CF-NotAuthorized",
            "You are not authorized to perform the requested action",
        )
    }

    #[must_use]
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            10008,
            "CF-UnprocessableEntity",
            detail,
        )
    }

    #[must_use]
    pub fn cluster_unavailable(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            10015,
            "CF-ClusterUnavailable",
            detail,
        )
    }

    #[must_use]
    pub fn termination_timeout() -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            10016,
            "CF-TerminationTimeout",
            "Instances were still present when the wait expired",
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<LabelError> for ApiErrorResponse {
    fn from(err: LabelError) -> Self {
        Self::unprocessable(err.to_string())
    }
}

impl From<ListError> for ApiErrorResponse {
    fn from(err: ListError) -> Self {
        if err.is_forbidden() {
            Self::not_authorized()
        } else {
            tracing::error!(error = %err, "instance listing failed");
            Self::cluster_unavailable(err.to_string())
        }
    }
}

impl From<TerminationError> for ApiErrorResponse {
    fn from(err: TerminationError) -> Self {
        match err {
            TerminationError::List(list) => list.into(),
            TerminationError::Cancelled => Self::termination_timeout(),
            TerminationError::Watch(_) | TerminationError::Task(_) => {
                tracing::error!(error = %err, "termination watch failed");
                Self::cluster_unavailable(err.to_string())
            }
        }
    }
}
