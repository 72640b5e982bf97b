pub mod config;
pub mod labels;
pub mod types;

pub use config::{MAX_TERMINATION_WAIT_SECS, ServerConfig, WATCH_TIMEOUT_SECS};
pub use labels::{LabelError, app_selector, env, keys, validate_label_value, validate_namespace};
pub use types::*;
