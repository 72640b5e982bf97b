//! Application layer — port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` — never on `crate::infra`
//! or `crate::api`.

pub mod ports;
pub mod services;

pub use ports::{
    AuthInfoParser, ChangeStream, ClusterReader, IdentityProvider, InstanceLister,
    InstanceSubscriber,
};
