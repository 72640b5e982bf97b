//! Application service — wait until every instance of an application is gone.
//!
//! Uses list-then-watch: the initial listing captures a snapshot version and
//! the subscription is anchored at it, so a deletion landing between the two
//! calls is still delivered. The wait races "next change" against the
//! caller's cancellation token; nothing is polled.

use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ChangeStream, ClusterReader};
use crate::domain::{
    ChangeEvent, ChangeKind, InstanceSelector, ListError, TerminationError, WatchError,
};

/// Blocks callers until no instance of an application remains.
#[derive(Clone)]
pub struct TerminationWatcher {
    cluster: Arc<dyn ClusterReader>,
}

impl TerminationWatcher {
    #[must_use]
    pub fn new(cluster: Arc<dyn ClusterReader>) -> Self {
        Self { cluster }
    }

    /// Wait until zero instances match (`namespace`, `app_guid`).
    ///
    /// Returns immediately, without subscribing, when the initial listing is
    /// empty. Instances that appear while waiting are tracked as well: any
    /// live matching instance keeps the wait going.
    ///
    /// # Errors
    ///
    /// - [`TerminationError::Cancelled`] once `cancel` fires, whichever step is pending
    /// - [`TerminationError::List`] when the initial listing fails
    /// - [`TerminationError::Watch`] when the subscription fails or ends early
    pub async fn await_termination(
        &self,
        cancel: &CancellationToken,
        namespace: &str,
        app_guid: &str,
    ) -> Result<(), TerminationError> {
        let selector = InstanceSelector::for_app(app_guid);

        let listing = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TerminationError::Cancelled),
            listing = self.cluster.list(namespace, &selector) => listing.map_err(ListError::from)?,
        };

        let mut live: HashSet<String> = listing.items.into_iter().map(|i| i.name).collect();
        if live.is_empty() {
            tracing::debug!(%namespace, %app_guid, "no instances present");
            return Ok(());
        }

        tracing::debug!(
            %namespace,
            %app_guid,
            remaining = live.len(),
            snapshot = %listing.snapshot.as_str(),
            "watching for instance termination",
        );

        let changes = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TerminationError::Cancelled),
            changes = self.cluster.subscribe(namespace, &selector, &listing.snapshot) => {
                changes.map_err(WatchError::Subscribe)?
            }
        };

        let result = drain(changes, &mut live, cancel).await;
        match &result {
            Ok(()) => tracing::info!(%namespace, %app_guid, "all instances terminated"),
            Err(TerminationError::Cancelled) => tracing::info!(
                %namespace,
                %app_guid,
                remaining = live.len(),
                "termination wait cancelled",
            ),
            Err(e) => tracing::warn!(%namespace, %app_guid, error = %e, "termination watch failed"),
        }
        result
    }

    /// Run [`Self::await_termination`] as a background task.
    ///
    /// The returned handle owns the task's cancellation token; dropping the
    /// handle stops the task and releases its subscription.
    #[must_use]
    pub fn spawn(&self, namespace: &str, app_guid: &str) -> TerminationWatch {
        let cancel = CancellationToken::new();
        let watcher = self.clone();
        let token = cancel.clone();
        let namespace = namespace.to_string();
        let app_guid = app_guid.to_string();
        let task = tokio::spawn(async move {
            watcher
                .await_termination(&token, &namespace, &app_guid)
                .await
        });
        TerminationWatch { cancel, task }
    }
}

/// Consume changes until the tracked set drains or the wait is abandoned.
///
/// The stream is dropped on every exit path, which closes the subscription.
async fn drain(
    mut changes: ChangeStream,
    live: &mut HashSet<String>,
    cancel: &CancellationToken,
) -> Result<(), TerminationError> {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TerminationError::Cancelled),
            change = changes.next() => match change {
                Some(Ok(change)) => {
                    track(live, change);
                    if live.is_empty() {
                        return Ok(());
                    }
                }
                Some(Err(e)) => return Err(WatchError::Stream(e).into()),
                None => return Err(WatchError::Closed { remaining: live.len() }.into()),
            },
        }
    }
}

fn track(live: &mut HashSet<String>, change: ChangeEvent) {
    let name = change.instance.name;
    match change.kind {
        ChangeKind::Created | ChangeKind::Updated => {
            if live.insert(name) {
                tracing::debug!(remaining = live.len(), "new instance appeared while waiting");
            }
        }
        ChangeKind::Deleted => {
            if live.remove(&name) {
                tracing::debug!(instance = %name, remaining = live.len(), "instance deleted");
            }
        }
    }
}

/// Handle to a termination wait running on its own task.
pub struct TerminationWatch {
    cancel: CancellationToken,
    task: JoinHandle<Result<(), TerminationError>>,
}

impl TerminationWatch {
    /// Ask the task to stop; [`Self::wait`] then yields `Cancelled`
    /// unless termination had already been observed.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Token that stops this watch when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the single result of the watch.
    pub async fn wait(mut self) -> Result<(), TerminationError> {
        match (&mut self.task).await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(TerminationError::Cancelled),
            Err(e) => Err(TerminationError::Task(e.to_string())),
        }
    }
}

impl Drop for TerminationWatch {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
