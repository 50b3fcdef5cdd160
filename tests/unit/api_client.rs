use anyhow::Result;
use mockito::Matcher;
use serde_json::json;
use smtp2go_usage::api::{
    Smtp2GoClient, API_KEY_HEADER, EMAIL_HISTORY_ENDPOINT, SMTP_USERS_ENDPOINT,
};
use smtp2go_usage::errors::FetchError;
use smtp2go_usage::observer::{NullObserver, RecordingObserver, ReportEvent};
use smtp2go_usage::types::{Identity, TrafficRecord};
use std::sync::Arc;

use crate::common::{api_config, february_2025, history_response, users_response, TEST_API_KEY};

/// Tests for the SMTP2GO API client against a local mock server
///
/// Every query must degrade to an empty result rather than an error.

fn client(base_url: &str, observer: Arc<RecordingObserver>) -> Result<Smtp2GoClient> {
    Ok(Smtp2GoClient::new(api_config(base_url), observer)?)
}

#[tokio::test]
async fn test_list_identities_sends_key_and_empty_body() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", SMTP_USERS_ENDPOINT)
        .match_header(API_KEY_HEADER, TEST_API_KEY)
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(users_response().to_string())
        .create_async()
        .await;

    let observer = Arc::new(RecordingObserver::new());
    let identities = client(&server.url(), observer.clone())?
        .list_identities()
        .await;

    mock.assert_async().await;
    assert_eq!(
        identities,
        vec![
            Identity::new("mailer", "Mailer Service", "mailer@example.com"),
            Identity::new("crm", "CRM relay", ""),
            Identity::new("idle", "Idle Account", ""),
        ]
    );
    assert!(observer.events().contains(&ReportEvent::ShapeMatched {
        endpoint: SMTP_USERS_ENDPOINT.to_string(),
        shape: "data.results",
        records: 3,
    }));
    Ok(())
}

#[tokio::test]
async fn test_list_identities_accepts_alternate_envelopes() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", SMTP_USERS_ENDPOINT)
        .with_status(200)
        .with_body(json!({"data": {"users": [{"username": "legacy"}]}}).to_string())
        .create_async()
        .await;

    let identities = Smtp2GoClient::new(api_config(&server.url()), Arc::new(NullObserver))?
        .list_identities()
        .await;

    assert_eq!(identities, vec![Identity::new("legacy", "legacy", "")]);
    Ok(())
}

#[tokio::test]
async fn test_get_traffic_payload_and_decoding() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", EMAIL_HISTORY_ENDPOINT)
        .match_header(API_KEY_HEADER, TEST_API_KEY)
        .match_body(Matcher::Json(json!({
            "group_by": "username",
            "start_date": "2025-02-01T00:00:00+0000",
            "end_date": "2025-02-28T23:59:59+0000",
        })))
        .with_status(200)
        .with_body(history_response().to_string())
        .create_async()
        .await;

    let observer = Arc::new(RecordingObserver::new());
    let traffic = client(&server.url(), observer)?
        .get_traffic(&february_2025())
        .await;

    mock.assert_async().await;
    assert_eq!(
        traffic,
        vec![
            TrafficRecord::new("crm", 250, 5, 0),
            TrafficRecord::new("mailer", 1200, 12, 3),
            TrafficRecord::new("ghost", 10, 0, 1),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_get_traffic_top_level_history() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", EMAIL_HISTORY_ENDPOINT)
        .with_status(200)
        .with_body(json!({"history": [{"used": 7}]}).to_string())
        .create_async()
        .await;

    let traffic = Smtp2GoClient::new(api_config(&server.url()), Arc::new(NullObserver))?
        .get_traffic(&february_2025())
        .await;

    assert_eq!(traffic, vec![TrafficRecord::new("Unknown", 7, 0, 0)]);
    Ok(())
}

#[tokio::test]
async fn test_server_errors_are_retried_then_empty() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    // one attempt plus two retries
    let mock = server
        .mock("POST", EMAIL_HISTORY_ENDPOINT)
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let observer = Arc::new(RecordingObserver::new());
    let traffic = client(&server.url(), observer.clone())?
        .get_traffic(&february_2025())
        .await;

    mock.assert_async().await;
    assert!(traffic.is_empty());

    let events = observer.events();
    let retries = events
        .iter()
        .filter(|e| matches!(e, ReportEvent::RetryScheduled { .. }))
        .count();
    assert_eq!(retries, 2);
    assert!(events.iter().any(|e| matches!(
        e,
        ReportEvent::FetchFailed {
            error: FetchError::MaxRetriesExceeded { .. }
        }
    )));
    Ok(())
}

#[tokio::test]
async fn test_client_errors_are_not_retried() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", SMTP_USERS_ENDPOINT)
        .with_status(401)
        .with_body(json!({"data": {"error": "Invalid API key"}}).to_string())
        .expect(1)
        .create_async()
        .await;

    let observer = Arc::new(RecordingObserver::new());
    let identities = client(&server.url(), observer.clone())?
        .list_identities()
        .await;

    mock.assert_async().await;
    assert!(identities.is_empty());
    assert!(observer.events().contains(&ReportEvent::FetchFailed {
        error: FetchError::Status {
            endpoint: SMTP_USERS_ENDPOINT.to_string(),
            status: 401,
        }
    }));
    Ok(())
}

#[tokio::test]
async fn test_garbage_body_yields_empty() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", EMAIL_HISTORY_ENDPOINT)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let observer = Arc::new(RecordingObserver::new());
    let traffic = client(&server.url(), observer.clone())?
        .get_traffic(&february_2025())
        .await;

    assert!(traffic.is_empty());
    assert!(observer.events().iter().any(|e| matches!(
        e,
        ReportEvent::FetchFailed {
            error: FetchError::Decode { .. }
        }
    )));
    Ok(())
}

#[tokio::test]
async fn test_unrecognised_envelope_yields_empty() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", EMAIL_HISTORY_ENDPOINT)
        .with_status(200)
        .with_body(json!({"data": {"stats": [{"used": 1}]}}).to_string())
        .create_async()
        .await;

    let observer = Arc::new(RecordingObserver::new());
    let traffic = client(&server.url(), observer.clone())?
        .get_traffic(&february_2025())
        .await;

    assert!(traffic.is_empty());
    assert!(observer.events().contains(&ReportEvent::ShapeUnmatched {
        endpoint: EMAIL_HISTORY_ENDPOINT.to_string(),
        keys: vec!["data".to_string()],
    }));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_yields_empty() -> Result<()> {
    // Port 1 on loopback refuses connections
    let observer = Arc::new(RecordingObserver::new());
    let identities = client("http://127.0.0.1:1", observer.clone())?
        .list_identities()
        .await;

    assert!(identities.is_empty());
    assert!(observer
        .events()
        .iter()
        .any(|e| matches!(e, ReportEvent::FetchFailed { .. })));
    Ok(())
}
