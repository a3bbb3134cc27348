//! # EventTicket Client
//!
//! Headless client for the EventTicket backend: browse events, log in with
//! a Google identity, buy and cancel tickets, and show the tickets' QR
//! images. Inventory, payment, ticket issuance and QR generation all live in
//! the backend; this crate owns the session, the in-flight state of purchases
//! and cancellations, and the notification shown to the user.
//!
//! ## Architecture
//!
//! ```text
//! TicketClient ─▶ Store ─▶ AppReducer ─▶ (AppState, Effects)
//!                   ▲                          │
//!                   └──── completion actions ◀─┘  Backend / SessionSlot / Confirmation
//! ```
//!
//! - [`AppState`]: session, catalog and ticket view-models, operation status, notification
//! - [`AppAction`]: user intents and backend completions
//! - [`AppReducer`]: all client logic, no I/O of its own
//! - [`ClientEnvironment`]: injected backend, session slot, confirmation gate, clock
//!
//! ## Example
//!
//! ```no_run
//! use eventticket_client::mocks::{MemorySessionSlot, FixedConfirmation, MockBackend, sample_event};
//! use eventticket_client::{ClientEnvironment, IdentityAssertion, Session, TicketClient};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MockBackend::new()
//!     .with_events(vec![sample_event("evt-1", 10)])
//!     .with_session(Session { id: "u-1".into(), ..Session::default() });
//! let client = TicketClient::new(ClientEnvironment::new(
//!     backend,
//!     MemorySessionSlot::new(),
//!     FixedConfirmation::accept(),
//! ));
//!
//! client
//!     .login(IdentityAssertion::new("t@example.com", "Thandi", "1098"))
//!     .await?
//!     .wait()
//!     .await;
//! client.purchase("evt-1").await?.wait().await;
//! assert_eq!(client.state(|s| s.tickets.len()).await, 1);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod api;
pub mod client;
pub mod config;
pub mod environment;
pub mod error;
pub mod messages;
pub mod providers;
pub mod reducers;
pub mod state;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use actions::AppAction;
pub use client::{ClientStore, TicketClient};
pub use config::Config;
pub use environment::ClientEnvironment;
pub use error::{ClientError, Result};
pub use reducers::{AppReducer, NOTIFICATION_TIMER};
pub use state::{AppState, OperationStatus};
pub use types::{
    Event, IdentityAssertion, Notification, NotificationKind, ResourceId, Session, Ticket,
    TicketEvent, View,
};
