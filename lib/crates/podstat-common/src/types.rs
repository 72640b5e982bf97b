use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state reported for one desired instance slot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    /// At least one container is running and ready.
    Running,
    /// The instance exists and reported container status, but is not serving.
    /// Crashing instances land here too.
    Starting,
    /// No instance exists for the slot, or it has not reported any container status.
    Down,
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "RUNNING",
            Self::Starting => "STARTING",
            Self::Down => "DOWN",
        };
        f.write_str(label)
    }
}

/// Status of a single desired instance slot of a process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct InstanceStatsRecord {
    /// Process type the slot belongs to (e.g. "web").
    #[serde(rename = "type")]
    pub process_type: String,
    /// Zero-based slot number.
    pub index: u32,
    pub state: InstanceState,
}

/// Body of the process stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub resources: Vec<InstanceStatsRecord>,
}

/// Kind of principal behind an authenticated request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    User,
    ServiceAccount,
}

/// Body of the whoami endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhoAmIResponse {
    pub name: String,
    pub kind: IdentityKind,
}

/// Body of the unauthenticated root endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiInfo {
    pub name: String,
    pub version: String,
}

/// One entry of an error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub code: u32,
    pub title: String,
    pub detail: String,
}

/// Error response envelope: `{"errors": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub errors: Vec<ApiError>,
}

impl ApiErrorBody {
    #[must_use]
    pub fn single(code: u32, title: &str, detail: impl Into<String>) -> Self {
        Self {
            errors: vec![ApiError {
                code,
                title: title.to_string(),
                detail: detail.into(),
            }],
        }
    }
}
