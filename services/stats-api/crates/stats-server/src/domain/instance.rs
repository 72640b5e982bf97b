//! Instance model and the pure status derivation rules.
//!
//! A [`RawInstance`] is the read-only projection of one cluster workload unit
//! (a pod). Aggregation maps a desired slot count onto the discovered set,
//! which may be incomplete, duplicated or carry garbage indices.

use std::collections::HashMap;

use podstat_common::{InstanceState, InstanceStatsRecord, app_selector};

// ── Types ─────────────────────────────────────────────────────────────────────

/// Coarse lifecycle phase reported by the platform for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstancePhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[default]
    Unknown,
}

impl InstancePhase {
    /// Map the platform's phase string; anything unrecognised is `Unknown`.
    #[must_use]
    pub fn from_phase(phase: &str) -> Self {
        match phase {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Run state of one container inside an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerStatus {
    /// Readiness probe verdict.
    pub ready: bool,
    /// Whether the container is currently in the running state.
    pub running: bool,
}

/// Low-level facts about one discovered instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawInstance {
    /// Cluster object name, unique within its namespace.
    pub name: String,
    /// Declared slot number, verbatim. `None` when not declared.
    pub index: Option<String>,
    pub phase: InstancePhase,
    pub container_statuses: Vec<ContainerStatus>,
}

/// Filter identifying every instance of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSelector {
    pub app_guid: String,
}

impl InstanceSelector {
    #[must_use]
    pub fn for_app(app_guid: &str) -> Self {
        Self {
            app_guid: app_guid.to_string(),
        }
    }

    /// Label selector string understood by the cluster.
    #[must_use]
    pub fn label_selector(&self) -> String {
        app_selector(&self.app_guid)
    }
}

/// Opaque cluster marker for "state as of this listing".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotVersion(pub String);

impl SnapshotVersion {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of a point-in-time listing.
#[derive(Debug, Clone, Default)]
pub struct InstanceList {
    pub items: Vec<RawInstance>,
    /// Marker to resume watching from, so nothing after the listing is missed.
    pub snapshot: SnapshotVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// One notification delivered by a change subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub instance: RawInstance,
}

// ── Pure functions ────────────────────────────────────────────────────────────

/// Parse a declared slot number. Signs, whitespace and overflow are rejected.
#[must_use]
pub fn parse_index(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Derive the state of one slot from the instance occupying it, if any.
///
/// Rules, first match wins:
/// 1. no instance → `Down`
/// 2. no container status reported yet → `Down`
/// 3. any container running and ready → `Running`
/// 4. otherwise → `Starting`
#[must_use]
pub fn derive_state(instance: Option<&RawInstance>) -> InstanceState {
    let Some(instance) = instance else {
        return InstanceState::Down;
    };
    if instance.container_statuses.is_empty() {
        return InstanceState::Down;
    }
    if instance
        .container_statuses
        .iter()
        .any(|c| c.running && c.ready)
    {
        InstanceState::Running
    } else {
        InstanceState::Starting
    }
}

/// Produce exactly one record per slot in `0..desired`, sorted by index.
///
/// Instances without a parsable index, or with one outside the desired
/// range, are skipped. When two instances claim the same index the one
/// listed last wins.
#[must_use]
pub fn aggregate(
    process_type: &str,
    desired: u32,
    instances: Vec<RawInstance>,
) -> Vec<InstanceStatsRecord> {
    let mut by_index: HashMap<u32, RawInstance> = HashMap::with_capacity(instances.len());
    for instance in instances {
        let Some(index) = instance.index.as_deref().and_then(parse_index) else {
            tracing::warn!(
                instance = %instance.name,
                index = ?instance.index,
                "skipping instance without a valid index",
            );
            continue;
        };
        if index >= desired {
            tracing::debug!(
                instance = %instance.name,
                index,
                desired,
                "skipping instance outside desired range",
            );
            continue;
        }
        if let Some(previous) = by_index.insert(index, instance) {
            tracing::debug!(
                replaced = %previous.name,
                index,
                "duplicate instance index, keeping the later one",
            );
        }
    }

    (0..desired)
        .map(|index| InstanceStatsRecord {
            process_type: process_type.to_string(),
            index,
            state: derive_state(by_index.get(&index)),
        })
        .collect()
}
