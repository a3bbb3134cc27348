//! `HttpBackend` against a mock HTTP server.

use eventticket_client::providers::{Backend, HttpBackend};
use eventticket_client::{ClientError, IdentityAssertion, ResourceId};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(format!("{}/api", server.uri()))
}

#[tokio::test]
async fn test_list_events_accepts_numeric_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "events": [{
                "id": 12,
                "name": "Jazz on the Lawn",
                "description": "Open air",
                "date": "2025-12-05T18:00:00.000Z",
                "venue": "Kirstenbosch",
                "price": 150.5,
                "total_tickets": 100,
                "available_tickets": 0,
                "created_at": "2025-01-01T00:00:00.000Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = backend_for(&server).await.list_events().await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, ResourceId::new("12"));
    assert!(events[0].is_sold_out());
    assert_eq!(events[0].price_label(), "R 150.50");
}

#[tokio::test]
async fn test_loose_dates_do_not_drop_the_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "events": [
                {
                    "id": 1,
                    "name": "Naive timestamp",
                    "date": "2025-12-05T18:00:00",
                    "price": "150.00",
                    "total_tickets": 100,
                    "available_tickets": 3
                },
                {
                    "id": 2,
                    "name": "No date yet",
                    "date": null,
                    "price": 80,
                    "total_tickets": 50,
                    "available_tickets": 50
                }
            ]
        })))
        .mount(&server)
        .await;

    let events = backend_for(&server).await.list_events().await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].date.map(|d| d.to_rfc3339()),
        Some("2025-12-05T18:00:00+00:00".to_string())
    );
    assert_eq!(events[0].price_label(), "R 150.00");
    assert_eq!(events[1].date, None);
    assert_eq!(events[1].name, "No date yet");
}

#[tokio::test]
async fn test_list_tickets_reads_nested_event() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tickets/user/u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "tickets": [{
                "id": "tkt-1",
                "user_id": "u-1",
                "events": {
                    "name": "Jazz on the Lawn",
                    "date": "2025-12-05T18:00:00+00:00",
                    "venue": "Kirstenbosch"
                },
                "qrCodeImage": "data:image/png;base64,AAAA",
                "is_validated": true,
                "validated_at": "2025-12-05T17:30:00+00:00"
            }]
        })))
        .mount(&server)
        .await;

    let tickets = backend_for(&server)
        .await
        .list_tickets(&"u-1".into())
        .await
        .unwrap();

    assert_eq!(tickets[0].event_name(), "Jazz on the Lawn");
    assert!(tickets[0].is_validated);
    assert!(tickets[0].validated_at.is_some());
    assert_eq!(
        tickets[0].qr_code_image.as_deref(),
        Some("data:image/png;base64,AAAA")
    );
}

#[tokio::test]
async fn test_authenticate_posts_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/google"))
        .and(body_json(json!({
            "email": "thandi@example.com",
            "name": "Thandi",
            "googleId": "1098"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": {
                "id": "u-1",
                "name": "Thandi",
                "email": "thandi@example.com",
                "is_admin": true
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = backend_for(&server)
        .await
        .authenticate(&IdentityAssertion::new("thandi@example.com", "Thandi", "1098"))
        .await
        .unwrap();

    assert_eq!(session.id, ResourceId::new("u-1"));
    assert!(session.is_admin);
}

#[tokio::test]
async fn test_purchase_sends_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tickets/purchase"))
        .and(body_json(json!({ "userId": "u-1", "eventId": "evt-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server)
        .await
        .purchase(&"u-1".into(), &"evt-1".into())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_error_status_with_envelope_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tickets/purchase"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "success": false, "error": "Sold out" })),
        )
        .mount(&server)
        .await;

    let error = backend_for(&server)
        .await
        .purchase(&"u-1".into(), &"evt-1".into())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ClientError::Rejected {
            reason: Some("Sold out".to_string())
        }
    );
}

#[tokio::test]
async fn test_cancel_sends_ticket_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tickets/cancel"))
        .and(body_json(json!({ "ticketId": "tkt-1", "userId": "u-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .expect(1)
        .mount(&server)
        .await;

    let error = backend_for(&server)
        .await
        .cancel(&"u-1".into(), &"tkt-1".into())
        .await
        .unwrap_err();

    assert_eq!(error, ClientError::Rejected { reason: None });
}

#[tokio::test]
async fn test_non_json_body_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let error = backend_for(&server).await.list_events().await.unwrap_err();

    assert!(matches!(error, ClientError::Transport(ref message) if message.contains("502")));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_failure() {
    // nothing listens on port 9 (discard) on a test machine
    let backend = HttpBackend::new("http://127.0.0.1:9/api");

    let error = backend.list_events().await.unwrap_err();

    assert!(matches!(error, ClientError::Transport(_)));
}
