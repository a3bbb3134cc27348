//! Integration tests for the purchase controller.

use eventticket_client::mocks::{
    FixedConfirmation, MemorySessionSlot, MockBackend, sample_event,
};
use eventticket_client::{
    ClientEnvironment, ClientError, IdentityAssertion, NotificationKind, ResourceId, Session,
    TicketClient,
};
use eventticket_testing::test_clock;
use std::sync::Arc;

type TestClient = TicketClient<MockBackend, MemorySessionSlot, FixedConfirmation>;

fn create_test_client(backend: MockBackend) -> TestClient {
    TicketClient::new(
        ClientEnvironment::new(backend, MemorySessionSlot::new(), FixedConfirmation::accept())
            .with_clock(Arc::new(test_clock())),
    )
}

fn backend() -> MockBackend {
    MockBackend::new()
        .with_events(vec![
            sample_event("evt-1", 10),
            sample_event("evt-2", 3),
            sample_event("evt-3", 0),
        ])
        .with_session(Session {
            id: "u-1".into(),
            name: "Thandi".to_string(),
            email: "thandi@example.com".to_string(),
            is_admin: false,
        })
}

async fn logged_in(backend: &MockBackend) -> TestClient {
    let client = create_test_client(backend.clone());
    client
        .login(IdentityAssertion::new("thandi@example.com", "Thandi", "1098"))
        .await
        .unwrap()
        .wait()
        .await;
    client
}

#[tokio::test]
async fn test_purchase_without_session_sends_nothing() {
    let backend = backend();
    let client = create_test_client(backend.clone());

    client.purchase("evt-1").await.unwrap().wait().await;

    let state = client.snapshot().await;
    assert_eq!(backend.purchase_calls(), 0);
    assert!(backend.calls().is_empty());
    assert_eq!(
        state.notification.message,
        "Please login first to purchase tickets"
    );
    assert_eq!(state.notification.kind, NotificationKind::Error);
}

#[tokio::test]
async fn test_second_purchase_while_in_flight_is_rejected() {
    let backend = backend().holding_purchases();
    let client = logged_in(&backend).await;

    let mut first = client.purchase("evt-1").await.unwrap();
    assert!(client.state(|s| s.is_purchasing(&"evt-1".into())).await);

    // same event and a different one: both rejected before any request
    client.purchase("evt-1").await.unwrap().wait().await;
    client.purchase("evt-2").await.unwrap().wait().await;

    backend.release_purchase();
    first.wait().await;

    assert_eq!(backend.purchase_calls(), 1);
    assert!(client.state(|s| s.purchase.is_idle()).await);
}

#[tokio::test]
async fn test_success_refreshes_each_view_model_once() {
    let backend = backend();
    let client = logged_in(&backend).await;
    let events_before = backend.event_list_calls();
    let tickets_before = backend.ticket_list_calls();

    client.purchase("evt-1").await.unwrap().wait().await;

    assert_eq!(backend.event_list_calls(), events_before + 1);
    assert_eq!(backend.ticket_list_calls(), tickets_before + 1);

    let state = client.snapshot().await;
    assert_eq!(state.notification.kind, NotificationKind::Success);
    assert_eq!(
        state.notification.message,
        "Ticket purchased successfully! Check \"My Tickets\" to view your QR code."
    );
    // the new count comes from the backend, not from local arithmetic
    assert_eq!(state.event(&"evt-1".into()).unwrap().available_tickets, 9);
    assert_eq!(state.tickets.len(), 1);
}

#[tokio::test]
async fn test_backend_sold_out_reason_is_shown_verbatim() {
    let backend = backend();
    let client = logged_in(&backend).await;
    backend.fail_next_purchase(ClientError::Rejected {
        reason: Some("Sold out".to_string()),
    });
    let events_before = backend.event_list_calls();

    client.purchase("evt-2").await.unwrap().wait().await;

    let state = client.snapshot().await;
    assert_eq!(state.notification.message, "Sold out");
    assert_eq!(state.notification.kind, NotificationKind::Error);
    assert!(state.purchase.is_idle());
    assert_eq!(backend.event_list_calls(), events_before);
}

#[tokio::test]
async fn test_last_seen_sold_out_is_blocked_locally() {
    let backend = backend();
    let client = logged_in(&backend).await;

    client.purchase("evt-3").await.unwrap().wait().await;

    assert_eq!(backend.purchase_calls(), 0);
    assert_eq!(
        client.state(|s| s.notification.message.clone()).await,
        "This event is sold out"
    );
}

#[tokio::test]
async fn test_transport_failure_returns_to_idle() {
    let backend = backend();
    let client = logged_in(&backend).await;
    backend.fail_next_purchase(ClientError::Transport("connection reset".to_string()));

    client.purchase("evt-1").await.unwrap().wait().await;

    let state = client.snapshot().await;
    assert!(state.purchase.is_idle());
    assert_eq!(
        state.notification.message,
        "Failed to purchase ticket. Please try again."
    );

    // no retry happened, and a new attempt is accepted
    assert_eq!(backend.purchase_calls(), 1);
    client.purchase("evt-1").await.unwrap().wait().await;
    assert_eq!(backend.purchase_calls(), 2);
    assert!(client.state(|s| s.can_purchase(&ResourceId::new("evt-1"))).await);
}
