//! Application service — per-slot instance stats for one process.

use std::sync::Arc;

use podstat_common::InstanceStatsRecord;

use crate::application::ports::InstanceLister;
use crate::domain::{InstanceSelector, ListError, aggregate};

/// Parameters of a stats query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub namespace: String,
    pub app_guid: String,
    pub process_type: String,
    /// Number of slots the caller expects; not derived from cluster state.
    pub desired_instances: u32,
}

/// Reports one status record per desired instance slot.
#[derive(Clone)]
pub struct InstanceAggregator {
    lister: Arc<dyn InstanceLister>,
}

impl InstanceAggregator {
    #[must_use]
    pub fn new(lister: Arc<dyn InstanceLister>) -> Self {
        Self { lister }
    }

    /// Fetch exactly `desired_instances` records, sorted by index.
    ///
    /// One listing is issued. A listing failure is returned as-is and no
    /// partial result is produced.
    pub async fn fetch_stats(
        &self,
        query: &StatsQuery,
    ) -> Result<Vec<InstanceStatsRecord>, ListError> {
        let selector = InstanceSelector::for_app(&query.app_guid);
        let listing = self.lister.list(&query.namespace, &selector).await?;

        tracing::debug!(
            namespace = %query.namespace,
            app_guid = %query.app_guid,
            process_type = %query.process_type,
            desired = query.desired_instances,
            found = listing.items.len(),
            "aggregating instance stats",
        );

        Ok(aggregate(
            &query.process_type,
            query.desired_instances,
            listing.items,
        ))
    }
}
