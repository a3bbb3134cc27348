//! Wire format of the EventTicket backend.
//!
//! Every response is an envelope with a `success` flag. A `success: false`
//! envelope becomes [`ClientError::Rejected`] carrying the backend's `error`
//! text; everything else the backend sends is opaque to the client.

use crate::error::{ClientError, Result};
use crate::types::{Event, ResourceId, Session, Ticket};
use serde::{Deserialize, Serialize};

/// `GET /events`
#[derive(Debug, Deserialize)]
pub struct EventsEnvelope {
    /// Whether the backend served the request.
    #[serde(default)]
    pub success: bool,

    /// The catalog snapshot.
    #[serde(default)]
    pub events: Vec<Event>,

    /// Failure reason.
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /tickets/user/{userId}`
#[derive(Debug, Deserialize)]
pub struct TicketsEnvelope {
    /// Whether the backend served the request.
    #[serde(default)]
    pub success: bool,

    /// The user's tickets.
    #[serde(default)]
    pub tickets: Vec<Ticket>,

    /// Failure reason.
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /auth/google`
#[derive(Debug, Deserialize)]
pub struct AuthEnvelope {
    /// Whether the identity was accepted.
    #[serde(default)]
    pub success: bool,

    /// The authenticated user.
    #[serde(default)]
    pub user: Option<Session>,

    /// Failure reason.
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /tickets/purchase` and `POST /tickets/cancel`
#[derive(Debug, Deserialize)]
pub struct MutationEnvelope {
    /// Whether the mutation was applied.
    #[serde(default)]
    pub success: bool,

    /// Failure reason.
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /tickets/purchase`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest<'a> {
    /// Buyer.
    pub user_id: &'a ResourceId,
    /// Event to buy a ticket for.
    pub event_id: &'a ResourceId,
}

/// Body of `POST /tickets/cancel`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest<'a> {
    /// Ticket to cancel.
    pub ticket_id: &'a ResourceId,
    /// Owner.
    pub user_id: &'a ResourceId,
}

fn rejected(error: Option<String>) -> ClientError {
    ClientError::Rejected { reason: error }
}

impl EventsEnvelope {
    /// Unwrap the catalog.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] when `success` is false.
    pub fn into_result(self) -> Result<Vec<Event>> {
        if self.success {
            Ok(self.events)
        } else {
            Err(rejected(self.error))
        }
    }
}

impl TicketsEnvelope {
    /// Unwrap the ticket list.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] when `success` is false.
    pub fn into_result(self) -> Result<Vec<Ticket>> {
        if self.success {
            Ok(self.tickets)
        } else {
            Err(rejected(self.error))
        }
    }
}

impl AuthEnvelope {
    /// Unwrap the session.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] when `success` is false, and
    /// [`ClientError::Transport`] when a successful answer carries no user.
    pub fn into_result(self) -> Result<Session> {
        if !self.success {
            return Err(rejected(self.error));
        }
        self.user
            .ok_or_else(|| ClientError::Transport("auth response carried no user".to_string()))
    }
}

impl MutationEnvelope {
    /// Unwrap the outcome.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] when `success` is false.
    pub fn into_result(self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(rejected(self.error))
        }
    }
}
