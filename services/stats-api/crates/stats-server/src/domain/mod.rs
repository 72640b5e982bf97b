//! Domain layer — instance model, state derivation and error taxonomy.
//!
//! This module has zero imports from `crate::infra`, `crate::api`,
//! `crate::application`, `tokio`, or `kube`. All functions are synchronous
//! and take data in, returning data out.

pub mod auth;
pub mod error;
pub mod instance;

pub use auth::{AuthError, AuthInfo, Identity};
pub use error::{ClusterError, ListError, TerminationError, WatchError};
pub use instance::{
    ChangeEvent, ChangeKind, ContainerStatus, InstanceList, InstancePhase, InstanceSelector,
    RawInstance, SnapshotVersion, aggregate, derive_state, parse_index,
};
