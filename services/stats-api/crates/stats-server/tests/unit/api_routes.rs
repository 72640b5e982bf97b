//! Router tests: authentication middleware, whoami, stats and termination
//! endpoints, driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::expect_used)]

use std::sync::Arc;

use axum::body::Body;
use http::header::AUTHORIZATION;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use podstat_common::{
    ApiErrorBody, ApiInfo, IdentityKind, InstanceState, ServerConfig, StatsResponse,
    WhoAmIResponse,
};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use stats_server::api::{self, AppState};
use stats_server::application::services::{InstanceAggregator, TerminationWatcher};
use stats_server::domain::ClusterError;
use stats_server::infra::BearerTokenParser;

use crate::fakes::{APP_GUID, FakeCluster, FakeIdentityProvider, SPACE, pending_pod, running_pod};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn app_state(cluster: &Arc<FakeCluster>) -> AppState {
    AppState {
        aggregator: InstanceAggregator::new(cluster.clone()),
        watcher: TerminationWatcher::new(cluster.clone()),
        auth_parser: Arc::new(BearerTokenParser),
        identity_provider: Arc::new(FakeIdentityProvider),
        config: Arc::new(ServerConfig::default()),
    }
}

async fn get(cluster: &Arc<FakeCluster>, uri: &str, auth: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().uri(uri);
    if let Some(auth) = auth {
        request = request.header(AUTHORIZATION, auth);
    }
    let request = request.body(Body::empty()).expect("request");

    let response = api::router(app_state(cluster))
        .oneshot(request)
        .await
        .expect("infallible");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec();
    (status, body)
}

fn json<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).expect("json body")
}

fn error_code(body: &[u8]) -> u32 {
    json::<ApiErrorBody>(body).errors[0].code
}

const STATS_URI: &str = "/v3/spaces/space-guid/apps/the-app-guid/processes/web/stats?instances=3";

// ── Unauthenticated endpoints ─────────────────────────────────────────────────

#[tokio::test]
async fn root_endpoints_do_not_require_auth() {
    let cluster = FakeCluster::new();
    for uri in ["/", "/v3"] {
        let (status, body) = get(&cluster, uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json::<ApiInfo>(&body).name, "stats-server");
    }
}

// ── Authentication middleware ─────────────────────────────────────────────────

#[tokio::test]
async fn missing_header_is_not_authenticated() {
    let (status, body) = get(&FakeCluster::new(), "/whoami", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 10002);
}

#[tokio::test]
async fn malformed_header_is_invalid_auth() {
    let (status, body) = get(&FakeCluster::new(), "/whoami", Some("Basic dXNlcjpwYXNz")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 1000);
}

#[tokio::test]
async fn rejected_token_is_invalid_auth() {
    let (status, body) = get(&FakeCluster::new(), "/whoami", Some("Bearer nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 1000);
}

#[tokio::test]
async fn identity_backend_failure_is_unknown_error() {
    let (status, body) = get(&FakeCluster::new(), "/whoami", Some("Bearer broken-token")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_code(&body), 10001);
}

#[tokio::test]
async fn protected_routes_require_auth() {
    let cluster = FakeCluster::new();
    let (status, _) = get(&cluster, STATS_URI, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(cluster.list_calls(), 0, "cluster must not be queried");
}

// ── whoami ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn whoami_reports_user() {
    let (status, body) = get(&FakeCluster::new(), "/whoami", Some("Bearer good-token")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json::<WhoAmIResponse>(&body),
        WhoAmIResponse {
            name: "alice".to_string(),
            kind: IdentityKind::User,
        }
    );
}

#[tokio::test]
async fn whoami_reports_service_account() {
    let (status, body) = get(&FakeCluster::new(), "/whoami", Some("Bearer sa-token")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json::<WhoAmIResponse>(&body).kind, IdentityKind::ServiceAccount);
}

// ── Stats ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_reports_every_desired_slot() {
    let cluster = FakeCluster::new();
    cluster.create(SPACE, APP_GUID, running_pod("some-pod-1", "0"));
    cluster.create(SPACE, APP_GUID, pending_pod("some-pod-4", "2"));

    let (status, body) = get(&cluster, STATS_URI, Some("Bearer good-token")).await;

    assert_eq!(status, StatusCode::OK);
    let states: Vec<(u32, InstanceState)> = json::<StatsResponse>(&body)
        .resources
        .into_iter()
        .map(|r| (r.index, r.state))
        .collect();
    assert_eq!(
        states,
        vec![
            (0, InstanceState::Running),
            (1, InstanceState::Down),
            (2, InstanceState::Starting),
        ]
    );
}

#[tokio::test]
async fn stats_rejects_selector_injection() {
    let cluster = FakeCluster::new();
    let uri = "/v3/spaces/space-guid/apps/a,b/processes/web/stats?instances=1";

    let (status, body) = get(&cluster, uri, Some("Bearer good-token")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), 10008);
    assert_eq!(cluster.list_calls(), 0);
}

#[tokio::test]
async fn stats_rejects_desired_count_above_the_limit() {
    let cluster = FakeCluster::new();
    let uri = "/v3/spaces/space-guid/apps/the-app-guid/processes/web/stats?instances=4294967295";

    let (status, body) = get(&cluster, uri, Some("Bearer good-token")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), 10008);
    assert_eq!(cluster.list_calls(), 0, "cluster must not be queried");
}

#[tokio::test]
async fn stats_accepts_desired_count_at_the_limit() {
    let cluster = FakeCluster::new();
    let limit = ServerConfig::default().max_desired_instances;
    let uri = format!(
        "/v3/spaces/space-guid/apps/the-app-guid/processes/web/stats?instances={limit}"
    );

    let (status, body) = get(&cluster, &uri, Some("Bearer good-token")).await;

    assert_eq!(status, StatusCode::OK);
    let records = json::<StatsResponse>(&body).resources;
    assert_eq!(records.len(), usize::try_from(limit).expect("limit fits"));
}

#[tokio::test]
async fn stats_forbidden_listing_maps_to_403() {
    let cluster = FakeCluster::new();
    cluster.fail_next_list(ClusterError::Forbidden("pods is forbidden".to_string()));

    let (status, body) = get(&cluster, STATS_URI, Some("Bearer good-token")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), 10003);
}

#[tokio::test]
async fn stats_cluster_failure_maps_to_502() {
    let cluster = FakeCluster::new();
    cluster.fail_next_list(ClusterError::Request("connection refused".to_string()));

    let (status, _) = get(&cluster, STATS_URI, Some("Bearer good-token")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

// ── Termination ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn termination_without_instances_is_no_content() {
    let cluster = FakeCluster::new();
    let uri = "/v3/spaces/space-guid/apps/the-app-guid/termination";

    let (status, body) = get(&cluster, uri, Some("Bearer good-token")).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[tokio::test]
async fn termination_deadline_is_gateway_timeout() {
    let cluster = FakeCluster::new();
    cluster.create(SPACE, APP_GUID, running_pod("some-pod-1", "0"));
    let uri = "/v3/spaces/space-guid/apps/the-app-guid/termination?timeout_secs=1";

    let (status, body) = get(&cluster, uri, Some("Bearer good-token")).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(error_code(&body), 10016);
    cluster.wait_for_release().await;
}

#[tokio::test]
async fn termination_completes_when_instances_go_away() {
    let cluster = FakeCluster::new();
    cluster.create(SPACE, APP_GUID, running_pod("some-pod-1", "0"));
    let deleter = {
        let cluster = cluster.clone();
        tokio::spawn(async move {
            cluster.wait_for_subscriptions(1).await;
            cluster.delete(SPACE, "some-pod-1");
        })
    };
    let uri = "/v3/spaces/space-guid/apps/the-app-guid/termination?timeout_secs=5";

    let (status, _) = get(&cluster, uri, Some("Bearer good-token")).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    deleter.await.expect("deleter task");
}
