//! Application services — use-case orchestration.
//!
//! Each service composes domain logic with port trait calls and holds its
//! cluster capability as an explicit dependency handed in at construction.

pub mod instance_stats;
pub mod termination_watch;

pub use instance_stats::{InstanceAggregator, StatsQuery};
pub use termination_watch::{TerminationWatch, TerminationWatcher};
