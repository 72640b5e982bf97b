//! Typed error enums for cluster reads, listings and termination watches.
//!
//! All failures are single-shot: nothing here is retried internally.

use thiserror::Error;

// ── Cluster errors ────────────────────────────────────────────────────────────

/// Failure reported by the cluster read capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The snapshot a subscription was anchored at is no longer available.
    #[error("snapshot expired: {0}")]
    Expired(String),

    #[error("cluster request failed: {0}")]
    Request(String),
}

// ── Aggregation errors ────────────────────────────────────────────────────────

/// The instance listing behind a stats query or a watch failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to list instances: {0}")]
pub struct ListError(#[from] pub ClusterError);

impl ListError {
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self.0, ClusterError::Forbidden(_))
    }
}

// ── Watch errors ──────────────────────────────────────────────────────────────

/// The change subscription failed or ended while instances remained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WatchError {
    #[error("failed to open instance subscription: {0}")]
    Subscribe(ClusterError),

    #[error("instance subscription failed: {0}")]
    Stream(ClusterError),

    #[error("instance subscription closed with {remaining} instance(s) still present")]
    Closed { remaining: usize },
}

/// Every way a termination wait can end other than success.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TerminationError {
    #[error(transparent)]
    List(#[from] ListError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    /// The caller cancelled (or its deadline fired) before all instances were gone.
    #[error("termination wait cancelled")]
    Cancelled,

    #[error("termination watch task failed: {0}")]
    Task(String),
}

impl TerminationError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
