//! Kubernetes implementation of the cluster read ports.
//!
//! Instances are pods labelled with the application GUID. Listings carry the
//! list `resourceVersion`, which anchors the subsequent watch.

use async_trait::async_trait;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, WatchEvent, WatchParams};
use kube::{Api, Client};
use podstat_common::{WATCH_TIMEOUT_SECS, env};

use crate::application::ports::{ChangeStream, InstanceLister, InstanceSubscriber};
use crate::domain::{
    ChangeEvent, ChangeKind, ClusterError, ContainerStatus, InstanceList, InstancePhase,
    InstanceSelector, RawInstance, SnapshotVersion,
};

/// Read-only pod access shared by every request.
#[derive(Clone)]
pub struct KubeClusterReader {
    client: Client,
}

impl KubeClusterReader {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl InstanceLister for KubeClusterReader {
    async fn list(
        &self,
        namespace: &str,
        selector: &InstanceSelector,
    ) -> Result<InstanceList, ClusterError> {
        let params = ListParams::default().labels(&selector.label_selector());
        let pods = self
            .pods(namespace)
            .list(&params)
            .await
            .map_err(map_kube_error)?;

        Ok(InstanceList {
            snapshot: SnapshotVersion(pods.metadata.resource_version.unwrap_or_default()),
            items: pods.items.iter().map(to_raw_instance).collect(),
        })
    }
}

#[async_trait]
impl InstanceSubscriber for KubeClusterReader {
    async fn subscribe(
        &self,
        namespace: &str,
        selector: &InstanceSelector,
        from: &SnapshotVersion,
    ) -> Result<ChangeStream, ClusterError> {
        let api = self.pods(namespace);
        let params = WatchParams::default()
            .labels(&selector.label_selector())
            .timeout(WATCH_TIMEOUT_SECS);
        let version = from.as_str().to_string();

        // The watch request is issued on first poll; a failure to open it
        // surfaces as the first stream item.
        let stream = async_stream::stream! {
            let events = match api.watch(&params, &version).await {
                Ok(events) => events,
                Err(e) => {
                    yield Err(map_kube_error(e));
                    return;
                }
            };
            futures::pin_mut!(events);
            while let Some(event) = events.next().await {
                match event {
                    Ok(WatchEvent::Added(pod)) => {
                        yield Ok(change(ChangeKind::Created, &pod));
                    }
                    Ok(WatchEvent::Modified(pod)) => {
                        yield Ok(change(ChangeKind::Updated, &pod));
                    }
                    Ok(WatchEvent::Deleted(pod)) => {
                        yield Ok(change(ChangeKind::Deleted, &pod));
                    }
                    Ok(WatchEvent::Bookmark(_)) => {}
                    Ok(WatchEvent::Error(status)) => {
                        yield Err(map_status(status.code, status.message));
                        return;
                    }
                    Err(e) => {
                        yield Err(map_kube_error(e));
                        return;
                    }
                }
            }
        };

        Ok(stream.boxed())
    }
}

fn change(kind: ChangeKind, pod: &Pod) -> ChangeEvent {
    ChangeEvent {
        kind,
        instance: to_raw_instance(pod),
    }
}

/// Project the fields the domain cares about out of a pod.
pub fn to_raw_instance(pod: &Pod) -> RawInstance {
    let name = pod.metadata.name.clone().unwrap_or_default();

    let index = pod.spec.as_ref().and_then(|spec| {
        spec.containers
            .iter()
            .filter_map(|c| c.env.as_ref())
            .flatten()
            .find(|var| var.name == env::INSTANCE_INDEX)
            .and_then(|var| var.value.clone())
    });

    let status = pod.status.as_ref();
    let phase = status
        .and_then(|s| s.phase.as_deref())
        .map_or(InstancePhase::Unknown, InstancePhase::from_phase);
    let container_statuses = status
        .and_then(|s| s.container_statuses.as_ref())
        .map(|statuses| {
            statuses
                .iter()
                .map(|c| ContainerStatus {
                    ready: c.ready,
                    running: c.state.as_ref().is_some_and(|s| s.running.is_some()),
                })
                .collect()
        })
        .unwrap_or_default();

    RawInstance {
        name,
        index,
        phase,
        container_statuses,
    }
}

fn map_kube_error(err: kube::Error) -> ClusterError {
    match err {
        kube::Error::Api(response) => map_status(response.code, response.message),
        other => ClusterError::Request(other.to_string()),
    }
}

fn map_status(code: u16, message: String) -> ClusterError {
    match code {
        401 | 403 => ClusterError::Forbidden(message),
        404 => ClusterError::NotFound(message),
        410 => ClusterError::Expired(message),
        _ => ClusterError::Request(format!("{code}: {message}")),
    }
}
