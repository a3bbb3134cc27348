//! Client state.
//!
//! Everything the front end renders lives in one [`AppState`] value owned by
//! the store. The reducer is its only writer.

use crate::types::{Event, Notification, ResourceId, Session, Ticket, View};

/// Progress of one operation kind (purchase or cancel).
///
/// At most one target is in progress per kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationStatus {
    /// Nothing in progress.
    #[default]
    Idle,

    /// Waiting for the user to confirm (cancel only).
    AwaitingConfirmation {
        /// The ticket the question is about.
        target: ResourceId,
    },

    /// Request sent, response pending.
    InFlight {
        /// Event or ticket the request is for.
        target: ResourceId,
    },
}

impl OperationStatus {
    /// True when a new operation of this kind may start.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The entity this operation is busy with.
    #[must_use]
    pub const fn target(&self) -> Option<&ResourceId> {
        match self {
            Self::Idle => None,
            Self::AwaitingConfirmation { target } | Self::InFlight { target } => Some(target),
        }
    }

    /// True while a request for `id` is pending.
    #[must_use]
    pub fn is_in_flight_for(&self, id: &ResourceId) -> bool {
        matches!(self, Self::InFlight { target } if target == id)
    }
}

/// Client state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    /// The logged-in user, if any.
    pub session: Option<Session>,

    /// True while the auth exchange is pending.
    pub authenticating: bool,

    /// Catalog view-model.
    pub catalog: Vec<Event>,

    /// Ticket view-model for the current user.
    pub tickets: Vec<Ticket>,

    /// Purchase controller.
    pub purchase: OperationStatus,

    /// Cancel controller.
    pub cancel: OperationStatus,

    /// The single notification.
    pub notification: Notification,

    /// Current listing.
    pub view: View,
}

impl AppState {
    /// Id of the logged-in user.
    #[must_use]
    pub fn user_id(&self) -> Option<&ResourceId> {
        self.session
            .as_ref()
            .filter(|session| session.is_authenticated())
            .map(|session| &session.id)
    }

    /// True with a session that identifies a user.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.user_id().is_some()
    }

    /// True for admin sessions.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.is_admin)
    }

    /// Look up an event in the catalog.
    #[must_use]
    pub fn event(&self, id: &ResourceId) -> Option<&Event> {
        self.catalog.iter().find(|event| &event.id == id)
    }

    /// Look up one of the user's tickets.
    #[must_use]
    pub fn ticket(&self, id: &ResourceId) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| &ticket.id == id)
    }

    /// Whether the "Get Ticket" affordance for `event_id` is enabled.
    #[must_use]
    pub fn can_purchase(&self, event_id: &ResourceId) -> bool {
        self.is_logged_in()
            && self.purchase.is_idle()
            && self.event(event_id).is_some_and(|event| !event.is_sold_out())
    }

    /// True while a purchase for `event_id` is pending.
    #[must_use]
    pub fn is_purchasing(&self, event_id: &ResourceId) -> bool {
        self.purchase.is_in_flight_for(event_id)
    }

    /// True while a cancellation for `ticket_id` is pending.
    #[must_use]
    pub fn is_cancelling(&self, ticket_id: &ResourceId) -> bool {
        self.cancel.is_in_flight_for(ticket_id)
    }
}
