//! Collaborators the reducer reaches through its environment.
//!
//! Providers are interfaces. Production wires in [`HttpBackend`],
//! [`FileSessionSlot`] and [`PromptConfirmation`]; tests use the in-memory
//! versions from [`crate::mocks`].

use crate::error::Result;
use crate::types::{Event, IdentityAssertion, ResourceId, Session, Ticket};
use std::future::Future;

pub mod file_slot;
pub mod http;
pub mod prompt;

pub use file_slot::FileSessionSlot;
pub use http::HttpBackend;
pub use prompt::PromptConfirmation;

/// Key of the single durable record.
pub const SESSION_KEY: &str = "user";

/// The EventTicket backend.
///
/// Every method is one HTTP request. Implementations do not retry.
pub trait Backend: Send + Sync {
    /// `GET /events`
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`](crate::ClientError::Transport) or
    /// [`ClientError::Rejected`](crate::ClientError::Rejected).
    fn list_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send;

    /// `GET /tickets/user/{user_id}`
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`](crate::ClientError::Transport) or
    /// [`ClientError::Rejected`](crate::ClientError::Rejected).
    fn list_tickets(&self, user_id: &ResourceId)
    -> impl Future<Output = Result<Vec<Ticket>>> + Send;

    /// `POST /auth/google`
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`](crate::ClientError::Rejected) if the
    /// backend refused the identity, otherwise transport failures.
    fn authenticate(
        &self,
        identity: &IdentityAssertion,
    ) -> impl Future<Output = Result<Session>> + Send;

    /// `POST /tickets/purchase`
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`](crate::ClientError::Rejected) with the
    /// backend's reason (e.g. `Sold out`), otherwise transport failures.
    fn purchase(
        &self,
        user_id: &ResourceId,
        event_id: &ResourceId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// `POST /tickets/cancel`
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`](crate::ClientError::Rejected) with the
    /// backend's reason, otherwise transport failures.
    fn cancel(
        &self,
        user_id: &ResourceId,
        ticket_id: &ResourceId,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// The durable key-value slot holding the serialized session.
///
/// Access is synchronous: session writes are mirrored to the slot inside the
/// reducer, in the same step that changes in-memory state.
pub trait SessionSlot: Send + Sync {
    /// Read the raw record, `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// [`ClientError::Storage`](crate::ClientError::Storage) if the slot exists but cannot be read.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the record.
    ///
    /// # Errors
    ///
    /// [`ClientError::Storage`](crate::ClientError::Storage) if the write did not happen.
    fn store(&self, record: &str) -> Result<()>;

    /// Remove the record. Clearing an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// [`ClientError::Storage`](crate::ClientError::Storage) if the record could not be removed.
    fn clear(&self) -> Result<()>;
}

/// Yes/no gate asked before destructive operations.
pub trait Confirmation: Send + Sync {
    /// Ask `question`; resolves to `true` only on an explicit yes.
    fn confirm(&self, question: &str) -> impl Future<Output = bool> + Send;
}
