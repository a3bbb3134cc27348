//! Client actions.
//!
//! Every input to the reducer: user intents coming from the front end, and
//! the results of backend calls coming back from effects.

use crate::error::Result;
use crate::types::{Event, IdentityAssertion, NotificationKind, ResourceId, Session, Ticket, View};

/// Client action.
///
/// Intents (`Login`, `Purchase`, `Cancel`, ...) are sent by the
/// [`TicketClient`](crate::TicketClient); completions (`LoginCompleted`,
/// `PurchaseCompleted`, ...) are produced by effects and fed back by the
/// store.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Session
    // ═══════════════════════════════════════════════════════════════════════
    /// Read the durable session slot at startup.
    Restore,

    /// Exchange a verified identity for a session.
    Login {
        /// Identity handed over by the identity provider.
        identity: IdentityAssertion,
    },

    /// The auth exchange settled.
    LoginCompleted {
        /// Session on success.
        result: Result<Session>,
    },

    /// The identity provider failed before any exchange took place.
    IdentityProviderFailed,

    /// Drop the session and everything derived from it.
    Logout,

    // ═══════════════════════════════════════════════════════════════════════
    // View-models
    // ═══════════════════════════════════════════════════════════════════════
    /// Refresh the catalog and the ticket list.
    RefreshAll,

    /// Refresh the catalog.
    RefreshCatalog,

    /// A catalog snapshot arrived.
    CatalogLoaded {
        /// Snapshot or failure.
        result: Result<Vec<Event>>,
    },

    /// Refresh the current user's tickets.
    RefreshTickets,

    /// A ticket snapshot arrived.
    TicketsLoaded {
        /// User the snapshot was requested for.
        user_id: ResourceId,
        /// Snapshot or failure.
        result: Result<Vec<Ticket>>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Purchase / cancel
    // ═══════════════════════════════════════════════════════════════════════
    /// Buy a ticket.
    Purchase {
        /// Event to buy for.
        event_id: ResourceId,
    },

    /// The purchase request settled.
    PurchaseCompleted {
        /// Event the purchase was for.
        event_id: ResourceId,
        /// Outcome.
        result: Result<()>,
    },

    /// Cancel a ticket (after confirmation).
    Cancel {
        /// Ticket to cancel.
        ticket_id: ResourceId,
    },

    /// The user answered the cancellation question.
    CancelConfirmation {
        /// Ticket the question was about.
        ticket_id: ResourceId,
        /// The answer.
        confirmed: bool,
    },

    /// The cancel request settled.
    CancelCompleted {
        /// Ticket the cancellation was for.
        ticket_id: ResourceId,
        /// Outcome.
        result: Result<()>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Notification
    // ═══════════════════════════════════════════════════════════════════════
    /// Show a message, replacing the current one.
    ShowNotification {
        /// Text.
        message: String,
        /// Severity.
        kind: NotificationKind,
    },

    /// Hide the current message now.
    DismissNotification,

    /// The auto-hide window of a notification elapsed.
    NotificationExpired {
        /// Generation the timer was armed for.
        generation: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Navigation
    // ═══════════════════════════════════════════════════════════════════════
    /// Switch listing.
    SelectView {
        /// Listing to show.
        view: View,
    },
}

impl AppAction {
    /// True for actions that settle a backend request.
    #[must_use]
    pub const fn is_completion(&self) -> bool {
        matches!(
            self,
            Self::LoginCompleted { .. }
                | Self::CatalogLoaded { .. }
                | Self::TicketsLoaded { .. }
                | Self::PurchaseCompleted { .. }
                | Self::CancelCompleted { .. }
        )
    }
}
