//! Sync and analysis through a full session

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use idlewatch::dashboard::{SyncOutcome, Tab};
use idlewatch::insight::OllamaBackend;
use idlewatch::profiles::{MemoryStore, ProfileStore};
use idlewatch::render;
use idlewatch::session::Session;

use crate::support;

async fn genesys_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::token_body()))
        .mount(&server)
        .await;

    let now = chrono::Utc::now();
    let entities = vec![
        support::user("1", "On Queue", "IDLE", now - chrono::Duration::minutes(6)),
        support::user("2", "On Queue", "COMMUNICATING", now),
        support::user("3", "Away", "OFF_LINE", now),
    ];
    Mock::given(method("GET"))
        .and(path("/api/v2/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(support::page(entities, 1)))
        .mount(&server)
        .await;
    server
}

async fn ollama_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {
                "role": "assistant",
                "content": r#"{"summary":"Quiet floor","recommendations":["Rebalance"],"bottlenecks":[]}"#
            }
        })))
        .mount(&server)
        .await;
    server
}

async fn session(genesys: &MockServer, ollama: &MockServer) -> Session<MemoryStore> {
    let mut profiles = ProfileStore::load(MemoryStore::new()).unwrap();
    profiles.upsert(support::profile_for(&genesys.uri())).unwrap();
    profiles.set_active("test").unwrap();

    Session::new(
        profiles,
        Box::new(support::client()),
        Box::new(OllamaBackend::new(reqwest::Client::new(), &ollama.uri(), "llama3.1:8b")),
    )
}

#[tokio::test]
async fn test_sync_then_analyze() {
    let genesys = genesys_server().await;
    let ollama = ollama_server().await;
    let mut session = session(&genesys, &ollama).await;

    assert_eq!(session.sync().await, SyncOutcome::Applied { agents: 3 });
    assert!(session.active_profile().last_synced_at.is_some());

    let state = session.state();
    let stats = state.stats();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.idle_count, 1);
    assert_eq!(stats.max_idle_minutes, 6);
    let snapshot = state.history().latest().unwrap();
    assert_eq!((snapshot.idle_count, snapshot.active_count), (1, 1));

    assert!(session.analyze().await);
    assert_eq!(session.state().tab(), Tab::Reports);
    assert_eq!(session.state().analysis().unwrap().summary, "Quiet floor");

    let view = render::render_view(
        session.state(),
        session.profiles().profiles(),
        session.profiles().active_id(),
    );
    assert!(view.contains("Quiet floor"));
}

#[tokio::test]
async fn test_switch_to_unconfigured_profile() {
    let genesys = genesys_server().await;
    let ollama = ollama_server().await;
    let mut session = session(&genesys, &ollama).await;

    session.sync().await;
    session.sync().await;
    assert_eq!(session.state().history().len(), 2);

    // The built-in example profile has no credentials
    session.switch_profile("examp-001").unwrap();
    assert!(session.state().agents().is_empty());
    assert!(session.state().history().is_empty());

    assert_eq!(session.sync().await, SyncOutcome::Failed);
    assert!(session
        .state()
        .sync_error()
        .unwrap()
        .starts_with("Missing credentials"));
    assert!(!session.analyze().await);
}
