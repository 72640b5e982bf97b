//! `Authorization` header parsing.

use crate::application::ports::AuthInfoParser;
use crate::domain::{AuthError, AuthInfo};

const BEARER_SCHEME: &str = "bearer";

/// Accepts `Bearer <token>` headers; the scheme is case-insensitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct BearerTokenParser;

impl AuthInfoParser for BearerTokenParser {
    fn parse(&self, auth_header: &str) -> Result<AuthInfo, AuthError> {
        let header = auth_header.trim();
        if header.is_empty() {
            return Err(AuthError::NotAuthenticated);
        }

        let Some((scheme, value)) = header.split_once(' ') else {
            return Err(AuthError::InvalidAuth);
        };
        if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
            return Err(AuthError::InvalidAuth);
        }

        let token = value.trim();
        if token.is_empty() || token.contains(char::is_whitespace) {
            return Err(AuthError::InvalidAuth);
        }
        Ok(AuthInfo::Token(token.to_string()))
    }
}
