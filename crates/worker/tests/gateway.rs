//! HTTP device gateway against a mocked machine.

use std::time::Duration;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use studio_worker::device::gateway::HttpDeviceGateway;
use studio_worker::device::{AttendanceDevice, DeviceError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> HttpDeviceGateway {
    HttpDeviceGateway::new(server.uri(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn fetches_punches_since_local_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/punches"))
        .and(query_param("since", "2026-10-14T17:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "punches": [
                {"pin": "1001", "timestamp": "2026-10-15T07:58:12", "verify_mode": "fingerprint"},
                {"pin": "1002", "timestamp": "2026-10-15T08:20:00"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let since = NaiveDate::from_ymd_opt(2026, 10, 14)
        .unwrap()
        .and_hms_opt(17, 0, 0)
        .unwrap();
    let punches = gateway(&server).fetch_punches(Some(since)).await.unwrap();

    assert_eq!(punches.len(), 2);
    assert_eq!(punches[0].pin, "1001");
    assert_eq!(punches[0].verify_mode.as_deref(), Some("fingerprint"));
    assert_eq!(
        punches[1].timestamp,
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap().and_hms_opt(8, 20, 0).unwrap()
    );
    assert!(punches[1].verify_mode.is_none());
}

#[tokio::test]
async fn first_sync_sends_no_since_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/punches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"punches": []})))
        .mount(&server)
        .await;

    let punches = gateway(&server).fetch_punches(None).await.unwrap();
    assert!(punches.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query().is_none());
}

#[tokio::test]
async fn server_error_maps_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/punches"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = gateway(&server).fetch_punches(None).await.unwrap_err();
    assert_matches!(err, DeviceError::HttpStatus(503));
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/punches"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = gateway(&server).fetch_punches(None).await.unwrap_err();
    assert_matches!(err, DeviceError::InvalidResponse(_));
}
