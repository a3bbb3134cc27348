//! `reqwest` implementation of [`Backend`].

use crate::api::{
    AuthEnvelope, CancelRequest, EventsEnvelope, MutationEnvelope, PurchaseRequest,
    TicketsEnvelope,
};
use crate::error::{ClientError, Result};
use crate::providers::Backend;
use crate::types::{Event, IdentityAssertion, ResourceId, Session, Ticket};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Default backend location.
pub const DEFAULT_API_URL: &str = "https://kwazikode-backend.onrender.com/api";

/// HTTP client for the EventTicket backend.
///
/// Non-2xx responses are still read: the backend reports refusals such as
/// `Sold out` with an error status and a JSON envelope. Only a body that is
/// not the expected JSON counts as a transport failure.
///
/// # Example
///
/// ```no_run
/// use eventticket_client::providers::{Backend, HttpBackend};
///
/// # async fn demo() -> eventticket_client::Result<()> {
/// let backend = HttpBackend::new("http://localhost:5000/api");
/// let events = backend.list_events().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend rooted at `base_url` (e.g. `https://host/api`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a backend with a preconfigured `reqwest` client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Decode an envelope from any response status.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;

    serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(%status, error = %e, "Backend response is not a JSON envelope");
        ClientError::Transport(format!("unreadable response (HTTP {status}): {e}"))
    })
}

impl Backend for HttpBackend {
    fn list_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send {
        let request = self.client.get(self.url("/events"));

        async move {
            let response = request.send().await?;
            read_envelope::<EventsEnvelope>(response).await?.into_result()
        }
    }

    fn list_tickets(
        &self,
        user_id: &ResourceId,
    ) -> impl Future<Output = Result<Vec<Ticket>>> + Send {
        let request = self
            .client
            .get(self.url(&format!("/tickets/user/{user_id}")));

        async move {
            let response = request.send().await?;
            read_envelope::<TicketsEnvelope>(response).await?.into_result()
        }
    }

    fn authenticate(
        &self,
        identity: &IdentityAssertion,
    ) -> impl Future<Output = Result<Session>> + Send {
        let request = self.client.post(self.url("/auth/google")).json(identity);

        async move {
            let response = request.send().await?;
            read_envelope::<AuthEnvelope>(response).await?.into_result()
        }
    }

    fn purchase(
        &self,
        user_id: &ResourceId,
        event_id: &ResourceId,
    ) -> impl Future<Output = Result<()>> + Send {
        let request = self
            .client
            .post(self.url("/tickets/purchase"))
            .json(&PurchaseRequest { user_id, event_id });

        async move {
            let response = request.send().await?;
            read_envelope::<MutationEnvelope>(response).await?.into_result()
        }
    }

    fn cancel(
        &self,
        user_id: &ResourceId,
        ticket_id: &ResourceId,
    ) -> impl Future<Output = Result<()>> + Send {
        let request = self
            .client
            .post(self.url("/tickets/cancel"))
            .json(&CancelRequest { ticket_id, user_id });

        async move {
            let response = request.send().await?;
            read_envelope::<MutationEnvelope>(response).await?.into_result()
        }
    }
}
