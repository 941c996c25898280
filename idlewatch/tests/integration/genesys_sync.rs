//! Token exchange, pagination and error mapping against a mock Genesys API

use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{
    basic_auth, bearer_token, body_string, header, method, path, path_regex, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use idlewatch::agents::{EfficiencyTable, RoutingStatus};
use idlewatch::genesys::{AgentSource, GenesysClient, SyncError};

use crate::support::{self, CLIENT_ID, CLIENT_SECRET, TOKEN};

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(basic_auth(CLIENT_ID, CLIENT_SECRET))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("grant_type=client_credentials"))
        .and(header("cache-control", "no-store"))
        .and(header("pragma", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::token_body()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_three_pages_accumulate_in_order() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    for (number, prefix, count) in [("1", "a", 100), ("2", "b", 100), ("3", "c", 37)] {
        Mock::given(method("GET"))
            .and(path("/api/v2/users"))
            .and(bearer_token(TOKEN))
            .and(query_param("pageSize", "100"))
            .and(query_param("pageNumber", number))
            .and(query_param("expand", "presence,routingStatus"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(support::page(support::users(prefix, count), 3)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let agents = support::client()
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap();

    assert_eq!(agents.len(), 237);
    assert_eq!(agents[0].id, "a-0");
    assert_eq!(agents[99].id, "a-99");
    assert_eq!(agents[100].id, "b-0");
    assert_eq!(agents[236].id, "c-36");

    // Every page request carries a cache buster
    let requests = server.received_requests().await.unwrap();
    let pages: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/api/v2/users")
        .collect();
    assert_eq!(pages.len(), 3);
    assert!(pages
        .iter()
        .all(|r| r.url.query_pairs().any(|(k, _)| k == "_t")));
}

#[tokio::test]
async fn test_missing_page_count_means_single_page() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "entities": support::users("a", 2) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let agents = support::client()
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap();
    assert_eq!(agents.len(), 2);
}

#[tokio::test]
async fn test_null_entities_page_counts_as_empty() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .and(query_param("pageNumber", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "entities": null, "pageCount": 2 })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .and(query_param("pageNumber", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::page(support::users("b", 4), 2)))
        .expect(1)
        .mount(&server)
        .await;

    let agents = support::client()
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap();
    assert_eq!(agents.len(), 4);
    assert_eq!(agents[0].id, "b-0");
}

#[tokio::test]
async fn test_page_ceiling_stops_at_one_hundred_requests() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::page(support::users("x", 1), 1000)))
        .expect(100)
        .mount(&server)
        .await;

    let agents = support::client()
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap();
    assert_eq!(agents.len(), 100);
}

#[tokio::test]
async fn test_normalization_of_fetched_users() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let now = Utc::now();
    let entities = vec![
        support::user("idle", "On Queue", "IDLE", now - Duration::minutes(10) - Duration::seconds(5)),
        support::user("busy", "On Queue", "INTERACTING", now - Duration::minutes(30)),
        support::user("odd", "Available", "ON_BREAK", now),
        json!({ "id": "bare" }),
    ];
    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::page(entities, 1)))
        .mount(&server)
        .await;

    let agents = support::client()
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap();

    assert_eq!(agents[0].routing_status, RoutingStatus::Idle);
    assert_eq!(agents[0].idle_minutes, 10);
    assert_eq!(agents[0].efficiency_score, 40);
    assert_eq!(agents[0].queue, "Support");

    assert_eq!(agents[1].idle_minutes, 0);
    assert_eq!(agents[1].efficiency_score, 100);

    assert_eq!(agents[2].routing_status, RoutingStatus::OffLine);

    assert_eq!(agents[3].name, "Unknown Agent");
    assert_eq!(agents[3].presence, "Offline");
    assert_eq!(agents[3].queue, "General Floor");
    assert_eq!(agents[3].routing_status, RoutingStatus::OffLine);
}

#[tokio::test]
async fn test_token_rejection_surfaces_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error_description": "invalid_client" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = support::client()
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::AuthenticationFailed(_)));
    assert!(err.to_string().contains("invalid_client"));
}

#[tokio::test]
async fn test_token_rejection_without_body_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = support::client()
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Authentication failed: HTTP 403");
}

#[tokio::test]
async fn test_missing_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "bearer" })))
        .mount(&server)
        .await;

    let err = support::client()
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::AuthenticationFailed(ref d) if d == "no token"));
}

#[tokio::test]
async fn test_whitespace_credentials_make_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::token_body()))
        .expect(0)
        .mount(&server)
        .await;

    let mut profile = support::profile_for(&server.uri());
    profile.client_secret = " \t ".to_string();

    let err = support::client().fetch_agents(&profile).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingCredentials));
}

#[tokio::test]
async fn test_failed_page_fails_whole_sync() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .and(query_param("pageNumber", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::page(support::users("a", 100), 3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .and(query_param("pageNumber", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .and(query_param("pageNumber", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::page(vec![], 3)))
        .expect(0)
        .mount(&server)
        .await;

    let err = support::client()
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap_err();

    match err {
        SyncError::FetchFailed { page, status, ref body } => {
            assert_eq!(page, 2);
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected FetchFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_page_timeout_is_data_fetch_failure() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(support::page(support::users("a", 1), 1))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = GenesysClient::new(std::time::Duration::from_millis(300), EfficiencyTable::default())
        .unwrap();
    let err = client
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap_err();

    match err {
        SyncError::PageUnreachable { page, ref reason } => {
            assert_eq!(page, 1);
            assert_eq!(reason, "request timed out");
        }
        other => panic!("expected PageUnreachable, got {:?}", other),
    }
    assert!(err.to_string().starts_with("Data fetch failed"));
}

#[tokio::test]
async fn test_undecodable_page_is_invalid_response() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = support::client()
        .fetch_agents(&support::profile_for(&server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_proxy_prefix_applies_to_every_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/proxy/http:/+login\.test/oauth/token$"))
        .and(basic_auth(CLIENT_ID, CLIENT_SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::token_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/proxy/http:/+api\.test/api/v2/users$"))
        .and(query_param("pageNumber", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::page(support::users("p", 3), 1)))
        .expect(1)
        .mount(&server)
        .await;

    let mut profile = support::profile_for("http://unused.test");
    profile.login_host = "http://login.test/".to_string();
    profile.api_host = "http://api.test".to_string();
    profile.cors_proxy = Some(format!("{}/proxy/", server.uri()));

    let agents = support::client().fetch_agents(&profile).await.unwrap();
    assert_eq!(agents.len(), 3);
}

#[tokio::test]
async fn test_unreachable_host_is_connection_blocked() {
    // Bind then release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = support::client()
        .fetch_agents(&support::profile_for(&format!("http://{}", addr)))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::ConnectionBlocked(_)));
    assert!(err.to_string().starts_with("Connection failed"));
}
