//! Integration tests for the device search endpoint using wiremock.
//!
//! Verifies the three required headers, the `Devices` envelope, the empty
//! and 204 cases, and error propagation.

use ws1_sync::client::MdmClient;
use ws1_sync::devices::search_devices;
use ws1_sync::error::SyncError;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper: creates an MdmClient pointed at the given wiremock server.
fn mock_client(server: &MockServer) -> MdmClient {
    MdmClient::new(
        reqwest::Client::new(),
        &format!("{}/api", server.uri()),
        "tenant-code",
        "mock-token".to_string(),
    )
}

#[tokio::test]
async fn search_sends_required_headers_and_returns_devices() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/mdm/devices/search"))
        .and(header("accept", "application/json"))
        .and(header("authorization", "Bearer mock-token"))
        .and(header("aw-tenant-code", "tenant-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Devices": [
                {
                    "SerialNumber": "SN-1",
                    "Platform": "WinRT",
                    "LastSeen": "2024-01-10 08:00:00",
                    "CompromisedStatus": false
                },
                {
                    "SerialNumber": "SN-2",
                    "Platform": "Apple",
                    "LastSeen": "2024-01-11 09:30:00"
                }
            ],
            "Page": 0,
            "PageSize": 500,
            "Total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let devices = search_devices(&mock_client(&server), None).await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].serial_number.as_deref(), Some("SN-1"));
    assert_eq!(devices[0].compromised_status.as_deref(), Some("false"));
    assert_eq!(devices[1].platform.as_deref(), Some("Apple"));
}

#[tokio::test]
async fn search_passes_platform_query_when_asked() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/mdm/devices/search"))
        .and(query_param("platform", "WinRT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Devices": [{"SerialNumber": "SN-1", "Platform": "WinRT"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let devices = search_devices(&mock_client(&server), Some("WinRT"))
        .await
        .unwrap();
    assert_eq!(devices.len(), 1);
}

#[tokio::test]
async fn empty_devices_array_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/mdm/devices/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Devices": []
        })))
        .mount(&server)
        .await;

    let devices = search_devices(&mock_client(&server), None).await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn no_content_yields_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/mdm/devices/search"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let devices = search_devices(&mock_client(&server), None).await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn missing_devices_field_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/mdm/devices/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Page": 0,
            "Total": 0
        })))
        .mount(&server)
        .await;

    let err = search_devices(&mock_client(&server), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_json_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/mdm/devices/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"Devices\": [ "))
        .mount(&server)
        .await;

    let err = search_devices(&mock_client(&server), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn non_success_status_is_api_error_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/mdm/devices/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "errorCode": 1000,
            "message": "User is not authorized"
        })))
        .mount(&server)
        .await;

    let err = search_devices(&mock_client(&server), None)
        .await
        .unwrap_err();
    match err {
        SyncError::Api { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("User is not authorized"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
