//! Infrastructure layer — concrete implementations of application port traits.
//!
//! All cluster I/O lives here. Imports from `crate::domain` and
//! `crate::application::ports` are allowed; imports from `crate::api` are not.

pub mod auth_header;
pub mod kube_cluster;
pub mod token_review;

pub use auth_header::BearerTokenParser;
pub use kube_cluster::KubeClusterReader;
pub use token_review::TokenReviewIdentityProvider;
