//! Identity resolution through the cluster's `TokenReview` API.

use async_trait::async_trait;
use k8s_openapi::api::authentication::v1::{TokenReview, TokenReviewSpec};
use kube::api::PostParams;
use kube::{Api, Client};

use crate::application::ports::IdentityProvider;
use crate::domain::{AuthError, AuthInfo, Identity};

/// Asks the API server who a bearer token belongs to.
#[derive(Clone)]
pub struct TokenReviewIdentityProvider {
    client: Client,
}

impl TokenReviewIdentityProvider {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityProvider for TokenReviewIdentityProvider {
    async fn get_identity(&self, auth_info: &AuthInfo) -> Result<Identity, AuthError> {
        let AuthInfo::Token(token) = auth_info;
        let review = TokenReview {
            spec: TokenReviewSpec {
                token: Some(token.clone()),
                ..TokenReviewSpec::default()
            },
            ..TokenReview::default()
        };

        let reviewed = Api::<TokenReview>::all(self.client.clone())
            .create(&PostParams::default(), &review)
            .await
            .map_err(|e| AuthError::Unknown(format!("token review failed: {e}")))?;

        let status = reviewed
            .status
            .ok_or_else(|| AuthError::Unknown("token review returned no status".to_string()))?;

        if status.authenticated != Some(true) {
            if let Some(reason) = status.error {
                tracing::debug!(%reason, "token rejected");
            }
            return Err(AuthError::InvalidAuth);
        }

        let username = status
            .user
            .and_then(|user| user.username)
            .filter(|name| !name.is_empty())
            .ok_or(AuthError::InvalidAuth)?;

        Ok(Identity::from_username(&username))
    }
}
