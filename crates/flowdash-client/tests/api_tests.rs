//! Integration tests for the backend API client against a mock server

use chrono::{TimeZone, Utc};
use flowdash_client::{AlarmQuery, ApiClient, ExportFormat, ReadingsQuery};
use flowdash_core::types::{DeviceCreate, DeviceType, DrumRefill, UserRole};
use flowdash_core::Error;
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn device_json(client_id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 7,
        "client_id": client_id,
        "device_name": "Vehari SMS",
        "device_type": "SMS",
        "location": "Vehari",
        "latitude": 30.03,
        "longitude": 72.35,
        "is_active": true,
        "last_seen": "2025-06-01T12:00:00Z",
        "latest_reading": null
    })
}

#[tokio::test]
async fn login_attaches_bearer_token_to_later_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_string_contains("username=operator"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "jwt-token",
            "token_type": "bearer",
            "user": {"id": 1, "username": "operator", "email": "op@example.com", "role": "operator"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/devices/"))
        .and(header("authorization", "Bearer jwt-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([device_json("SMS-II-023")])),
        )
        .mount(&server)
        .await;

    let mut client = ApiClient::new(server.uri());
    let token = client.login("operator", "secret123").await.unwrap();
    assert_eq!(token.access_token, "jwt-token");
    assert!(client.has_token());

    let devices = client.list_devices().await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].client_id, "SMS-II-023");
}

#[tokio::test]
async fn login_failure_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"detail": "Incorrect username or password"})),
        )
        .mount(&server)
        .await;

    let mut client = ApiClient::new(server.uri());
    let error = client.login("operator", "wrong").await.unwrap_err();

    match error {
        Error::Authentication(message) => {
            assert_eq!(message, "Incorrect username or password");
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
    assert!(!client.has_token());
}

#[tokio::test]
async fn me_resolves_identity_for_preissued_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer preissued"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 4,
            "username": "monitor",
            "email": "monitor@example.com",
            "role": "viewer"
        })))
        .mount(&server)
        .await;

    // No login happened: the token came from configuration
    let client = ApiClient::new(server.uri()).with_token("preissued");
    let user = client.me().await.unwrap();

    assert_eq!(user.username, "monitor");
    assert_eq!(user.role, UserRole::Viewer);
}

#[tokio::test]
async fn me_without_valid_token_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"detail": "Not authenticated"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let error = client.me().await.unwrap_err();
    assert!(matches!(error, Error::Authentication(_)));
}

#[tokio::test]
async fn unknown_device_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/devices/SMS-IX-999"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "Device not found"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let error = client.get_device("SMS-IX-999").await.unwrap_err();

    match error {
        Error::NotFound { resource } => assert!(resource.contains("SMS-IX-999")),
        other => panic!("expected not-found error, got {other:?}"),
    }
}

#[tokio::test]
async fn backend_error_carries_status_and_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/odorant/drums/update-consumption"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({"detail": "Error updating odorant consumption"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let error = client.update_consumption().await.unwrap_err();

    match error {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Error updating odorant consumption");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_device_payload_fails_before_any_request() {
    // No mock mounted: a request reaching the server would 404
    let server = MockServer::start().await;
    let client = ApiClient::new(server.uri());

    let payload = DeviceCreate {
        client_id: "SMS II 023".to_string(), // spaces are rejected
        device_name: "Station".to_string(),
        device_type: DeviceType::Sms,
        location: "Somewhere".to_string(),
        latitude: 0.0,
        longitude: 0.0,
    };

    let error = client.create_device(&payload).await.unwrap_err();
    match error {
        Error::Validation { field, .. } => assert_eq!(field, "client_id"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn readings_query_paginates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/analytics/readings"))
        .and(query_param("client_id", "SMS-I-003"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total": 120,
            "page": 2,
            "page_size": 50,
            "total_pages": 3,
            "data": [{
                "id": 991,
                "device_id": 7,
                "client_id": "SMS-I-003",
                "timestamp": "2025-06-01T12:00:00Z",
                "temperature": 74.2,
                "total_volume_flow": 812.5
            }]
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let query = ReadingsQuery {
        client_id: Some("SMS-I-003".to_string()),
        page: Some(2),
        page_size: Some(50),
        ..ReadingsQuery::default()
    };

    let page = client.readings(&query).await.unwrap();
    assert_eq!(page.total, 120);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.data[0].reading.temperature, Some(74.2));
}

#[tokio::test]
async fn csv_export_downloads_and_parses() {
    let server = MockServer::start().await;

    let body = "Device ID,Temperature,Static Pressure,Differential Pressure,Volume,Total Volume Flow,Timestamp\n\
                7,74.2,450.0,55.0,1200.5,812.5,2025-06-01 12:00:00\n\
                7,73.8,449.1,,1201.0,810.0,2025-06-01 11:00:00\n";

    Mock::given(method("GET"))
        .and(path("/analytics/readings/export/csv"))
        .and(query_param("device_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let rows = client.export_readings_csv(Some(7), None, None).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].device_id, 7);
    assert_eq!(rows[1].differential_pressure, None);
    assert!(rows[0].parsed_timestamp().is_ok());
}

#[tokio::test]
async fn device_export_downloads_excel_bytes() {
    let server = MockServer::start().await;

    // An xlsx body is an opaque zip container; only the bytes matter
    let workbook = b"PK\x03\x04fake-workbook".to_vec();

    Mock::given(method("GET"))
        .and(path("/export/device/7"))
        .and(query_param("format", "excel"))
        .and(query_param("start", "2025-06-01T00:00:00+00:00"))
        .and(query_param("end", "2025-06-30T00:00:00+00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(workbook.clone()))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();

    let bytes = client
        .export_device(7, start, end, ExportFormat::Excel)
        .await
        .unwrap();
    assert_eq!(bytes, workbook);
}

#[tokio::test]
async fn section_and_fleet_exports_download_csv() {
    let server = MockServer::start().await;
    let body = "Device,Timestamp,Flow\nSMS-II-023,2025-06-01 12:00:00,812.5\n";

    Mock::given(method("GET"))
        .and(path("/export/section/II"))
        .and(query_param("format", "csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/export/all"))
        .and(query_param("format", "csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();

    let section = client
        .export_section("II", start, end, ExportFormat::Csv)
        .await
        .unwrap();
    assert_eq!(section, body.as_bytes());

    let fleet = client.export_all(start, end, ExportFormat::Csv).await.unwrap();
    assert_eq!(fleet, body.as_bytes());
}

#[tokio::test]
async fn alarm_acknowledge_and_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alarms/"))
        .and(query_param("acknowledged", "false"))
        .and(query_param("severity", "high"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "id": 3,
            "device_id": 7,
            "client_id": "SMS-II-023",
            "parameter": "static_pressure",
            "value": 950.0,
            "threshold_type": "high",
            "severity": "high",
            "is_acknowledged": false,
            "acknowledged_by": null,
            "acknowledged_at": null,
            "triggered_at": "2025-06-01T12:00:00Z",
            "resolved_at": null
        }])))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/alarms/3/acknowledge"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"message": "Alarm acknowledged successfully"})),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let query = AlarmQuery {
        acknowledged: Some(false),
        severity: Some(flowdash_core::types::AlarmSeverity::High),
        limit: None,
    };

    let alarms = client.list_alarms(&query).await.unwrap();
    assert_eq!(alarms.len(), 1);
    assert!(!alarms[0].is_acknowledged);

    let response = client.acknowledge_alarm(3).await.unwrap();
    assert_eq!(response.message, "Alarm acknowledged successfully");
}

#[tokio::test]
async fn drum_refill_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/odorant/drums/refill"))
        .and(body_string_contains("\"drum_id\":9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Odorant drum refilled successfully",
            "previous_level": 42.5,
            "refilled_amount": 100.0,
            "new_level": 142.5
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let payload = DrumRefill {
        drum_id: 9,
        refilled_amount: 100.0,
        notes: Some("monthly top-up".to_string()),
    };

    let outcome = client.refill_drum(&payload).await.unwrap();
    assert!((outcome.new_level - 142.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn section_stats_parse_named_sections() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sections/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sections": [
                {"section_id": "I", "section_name": "Section I - Multan/BWP/Sahiwal",
                 "sms_count": 12, "active_sms": 10, "cumulative_volume_flow": 8123.45, "unit": "MCF/day"},
                {"section_id": "OTHER", "section_name": "Other Devices",
                 "sms_count": 1, "active_sms": 1, "cumulative_volume_flow": 5.0, "unit": "MCF/day"}
            ],
            "all_sms": {"section_id": "ALL", "section_name": "All SMS",
                        "sms_count": 13, "active_sms": 11, "cumulative_volume_flow": 8128.45, "unit": "MCF/day"},
            "timestamp": "2025-06-01T12:00:00.000000"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let stats = client.section_stats().await.unwrap();

    assert_eq!(stats.sections.len(), 2);
    assert_eq!(stats.all_sms.sms_count, 13);
    assert_eq!(stats.sections[1].section_id, "OTHER");
}

#[tokio::test]
async fn monitoring_toggle_reports_new_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/alarms/monitoring/toggle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "enabled": true,
            "message": "Alarm monitoring started"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let status = client.toggle_monitoring().await.unwrap();
    assert!(status.enabled);
    assert_eq!(status.message.as_deref(), Some("Alarm monitoring started"));
}
