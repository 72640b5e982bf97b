//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::{
    AuthError, AuthInfo, ChangeEvent, ClusterError, Identity, InstanceList, InstanceSelector,
    SnapshotVersion,
};

/// Stream of change notifications for one subscription, in delivery order.
///
/// Dropping the stream releases the subscription.
pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, ClusterError>>;

// ── Cluster Ports ─────────────────────────────────────────────────────────────

/// Point-in-time enumeration of instances.
#[async_trait]
pub trait InstanceLister: Send + Sync {
    /// List instances in `namespace` matching `selector`, together with the
    /// snapshot version the listing reflects.
    async fn list(
        &self,
        namespace: &str,
        selector: &InstanceSelector,
    ) -> Result<InstanceList, ClusterError>;
}

/// Continuous change notifications for instances.
#[async_trait]
pub trait InstanceSubscriber: Send + Sync {
    /// Subscribe to changes of matching instances that happened after `from`.
    ///
    /// Implementations must deliver every change after the snapshot, including
    /// ones that occurred before this call was made.
    async fn subscribe(
        &self,
        namespace: &str,
        selector: &InstanceSelector,
        from: &SnapshotVersion,
    ) -> Result<ChangeStream, ClusterError>;
}

/// Composite trait — read-only cluster access used by the services.
pub trait ClusterReader: InstanceLister + InstanceSubscriber {}

/// Blanket implementation: anything that can list and subscribe is a `ClusterReader`.
impl<T> ClusterReader for T where T: InstanceLister + InstanceSubscriber {}

// ── Authentication Ports ──────────────────────────────────────────────────────

/// Turns a raw `Authorization` header value into credentials.
pub trait AuthInfoParser: Send + Sync {
    /// An empty header yields [`AuthError::NotAuthenticated`]; a malformed one
    /// yields [`AuthError::InvalidAuth`].
    fn parse(&self, auth_header: &str) -> Result<AuthInfo, AuthError>;
}

/// Resolves credentials to the principal they belong to.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_identity(&self, auth_info: &AuthInfo) -> Result<Identity, AuthError>;
}
