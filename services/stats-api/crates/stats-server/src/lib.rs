//! Instance stats and termination watch service — exposes modules for integration testing.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod api;
pub mod application;
pub mod domain;
pub mod infra;
