//! Client environment.
//!
//! Everything the reducer needs from the outside world, injected so that
//! the same reducer runs against HTTP in production and mocks in tests.

use crate::providers::{Backend, Confirmation, SessionSlot};
use eventticket_core::environment::{Clock, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// How long a notification stays up when nothing dismisses it.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Client environment.
///
/// # Type Parameters
///
/// - `B`: backend
/// - `S`: durable session slot
/// - `C`: confirmation gate
#[derive(Clone)]
pub struct ClientEnvironment<B, S, C>
where
    B: Backend + Clone,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    /// The EventTicket backend.
    pub backend: B,

    /// Durable session record.
    pub session_slot: S,

    /// Yes/no gate for cancellation.
    pub confirmation: C,

    /// Timestamps for notifications.
    pub clock: Arc<dyn Clock>,

    /// Auto-hide window for notifications.
    pub notification_ttl: Duration,
}

impl<B, S, C> ClientEnvironment<B, S, C>
where
    B: Backend + Clone,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    /// Environment with the system clock and the default notification window.
    #[must_use]
    pub fn new(backend: B, session_slot: S, confirmation: C) -> Self {
        Self {
            backend,
            session_slot,
            confirmation,
            clock: Arc::new(SystemClock),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the notification window.
    #[must_use]
    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = ttl;
        self
    }
}
