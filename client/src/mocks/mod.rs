//! Mock provider implementations for testing.
//!
//! In-memory, deterministic versions of every provider trait, plus sample
//! data builders.

pub mod backend;
pub mod confirmation;
pub mod slot;

pub use backend::{BackendCall, MockBackend};
pub use confirmation::FixedConfirmation;
pub use slot::MemorySessionSlot;

use crate::types::{Event, ResourceId, Ticket, TicketEvent};
use chrono::{TimeZone, Utc};

/// An event priced at R 150.00 with 100 seats, `available` of them left.
#[must_use]
pub fn sample_event(id: &str, available: u32) -> Event {
    Event {
        id: ResourceId::new(id),
        name: format!("Event {id}"),
        description: "Live music under the stars".to_string(),
        date: Utc.with_ymd_and_hms(2025, 12, 5, 18, 0, 0).single(),
        venue: "Kirstenbosch Gardens".to_string(),
        price: 150.0,
        total_tickets: 100,
        available_tickets: available,
    }
}

/// An unvalidated ticket with a placeholder QR image.
#[must_use]
pub fn sample_ticket(id: &str) -> Ticket {
    Ticket {
        id: ResourceId::new(id),
        user_id: None,
        event: Some(TicketEvent {
            name: "Jazz on the Lawn".to_string(),
            date: None,
            venue: "Kirstenbosch Gardens".to_string(),
        }),
        qr_code_image: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
        is_validated: false,
        validated_at: None,
    }
}

/// The reducer over the mock providers.
#[cfg(test)]
pub(crate) type TestReducer =
    crate::reducers::AppReducer<MockBackend, MemorySessionSlot, FixedConfirmation>;

/// Mocks wired into an environment with a fixed clock.
#[cfg(test)]
pub(crate) fn test_environment()
-> crate::environment::ClientEnvironment<MockBackend, MemorySessionSlot, FixedConfirmation> {
    crate::environment::ClientEnvironment::new(
        MockBackend::new(),
        MemorySessionSlot::new(),
        FixedConfirmation::accept(),
    )
    .with_clock(std::sync::Arc::new(eventticket_testing::test_clock()))
}
