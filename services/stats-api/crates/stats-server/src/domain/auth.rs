//! Caller credentials and resolved identities.

use podstat_common::IdentityKind;
use thiserror::Error;

/// Credentials extracted from a request's `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthInfo {
    Token(String),
}

impl std::fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}

/// Principal the cluster resolved the credentials to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub kind: IdentityKind,
}

/// Username prefix the cluster uses for service-account principals.
const SERVICE_ACCOUNT_PREFIX: &str = "system:serviceaccount:";

impl Identity {
    /// Classify a cluster username.
    #[must_use]
    pub fn from_username(username: &str) -> Self {
        let kind = if username.starts_with(SERVICE_ACCOUNT_PREFIX) {
            IdentityKind::ServiceAccount
        } else {
            IdentityKind::User
        };
        Self {
            name: username.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No credentials were supplied.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Credentials were supplied but are malformed or rejected.
    #[error("invalid authentication credentials")]
    InvalidAuth,

    #[error("authentication failed: {0}")]
    Unknown(String),
}
