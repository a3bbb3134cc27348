//! [`TicketClient`]: the handle front ends talk to.

use crate::actions::AppAction;
use crate::config::DEFAULT_ADMIN_DASHBOARD_URL;
use crate::environment::ClientEnvironment;
use crate::messages;
use crate::providers::{Backend, Confirmation, SessionSlot};
use crate::reducers::AppReducer;
use crate::state::AppState;
use crate::types::{IdentityAssertion, NotificationKind, ResourceId, View};
use eventticket_runtime::{EffectHandle, Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// The store type behind a [`TicketClient`].
pub type ClientStore<B, S, C> =
    Store<AppState, AppAction, ClientEnvironment<B, S, C>, AppReducer<B, S, C>>;

/// Session, catalog, and purchase/cancel controller.
///
/// Every mutating call returns an [`EffectHandle`]; awaiting it waits for the
/// whole cascade the call started (request, completion, follow-up refreshes),
/// but not for the notification timer.
///
/// # Example
///
/// ```no_run
/// use eventticket_client::{TicketClient, ClientEnvironment};
/// use eventticket_client::providers::{FileSessionSlot, HttpBackend, PromptConfirmation};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let env = ClientEnvironment::new(
///     HttpBackend::new("http://localhost:5000/api"),
///     FileSessionSlot::new(".eventticket"),
///     PromptConfirmation::new(),
/// );
/// let client = TicketClient::new(env);
///
/// client.restore().await?.wait().await;
/// let events = client.state(|s| s.catalog.len()).await;
/// # Ok(())
/// # }
/// ```
pub struct TicketClient<B, S, C>
where
    B: Backend + Clone + 'static,
    S: SessionSlot + 'static,
    C: Confirmation + Clone + 'static,
{
    store: ClientStore<B, S, C>,
    admin_dashboard_url: Arc<str>,
}

impl<B, S, C> Clone for TicketClient<B, S, C>
where
    B: Backend + Clone + 'static,
    S: SessionSlot + 'static,
    C: Confirmation + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            admin_dashboard_url: Arc::clone(&self.admin_dashboard_url),
        }
    }
}

impl<B, S, C> TicketClient<B, S, C>
where
    B: Backend + Clone + 'static,
    S: SessionSlot + 'static,
    C: Confirmation + Clone + 'static,
{
    /// Client with an empty state. Call [`TicketClient::restore`] to pick up
    /// a stored session.
    #[must_use]
    pub fn new(environment: ClientEnvironment<B, S, C>) -> Self {
        Self {
            store: Store::with_broadcast_capacity(
                AppState::default(),
                AppReducer::new(),
                environment,
                64,
            ),
            admin_dashboard_url: Arc::from(DEFAULT_ADMIN_DASHBOARD_URL),
        }
    }

    /// Set the link offered to admin sessions.
    #[must_use]
    pub fn with_admin_dashboard_url(mut self, url: impl Into<String>) -> Self {
        self.admin_dashboard_url = Arc::from(url.into());
        self
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &ClientStore<B, S, C> {
        &self.store
    }

    /// Pick up the stored session and, if there is one, refresh both listings.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`TicketClient::shutdown`].
    pub async fn restore(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(AppAction::Restore).await
    }

    /// Log in with an identity the identity provider has verified.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`TicketClient::shutdown`].
    pub async fn login(&self, identity: IdentityAssertion) -> Result<EffectHandle, StoreError> {
        self.store.send(AppAction::Login { identity }).await
    }

    /// Log in with the credential (ID-token) handed over by Google sign-in.
    ///
    /// A credential that cannot be decoded is reported as a failed login.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`TicketClient::shutdown`].
    pub async fn login_with_google_credential(
        &self,
        credential: &str,
    ) -> Result<EffectHandle, StoreError> {
        match IdentityAssertion::from_google_credential(credential) {
            Ok(identity) => self.login(identity).await,
            Err(error) => {
                tracing::warn!(error = %error, "Rejected identity credential");
                self.store
                    .send(AppAction::ShowNotification {
                        message: messages::LOGIN_FAILED.to_string(),
                        kind: NotificationKind::Error,
                    })
                    .await
            },
        }
    }

    /// The identity provider failed before handing over a credential.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`TicketClient::shutdown`].
    pub async fn report_identity_provider_failure(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(AppAction::IdentityProviderFailed).await
    }

    /// Log out.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`TicketClient::shutdown`].
    pub async fn logout(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(AppAction::Logout).await
    }

    /// Reload the catalog and the ticket list.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`TicketClient::shutdown`].
    pub async fn refresh(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(AppAction::RefreshAll).await
    }

    /// Buy a ticket for `event_id`.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`TicketClient::shutdown`].
    pub async fn purchase(
        &self,
        event_id: impl Into<ResourceId>,
    ) -> Result<EffectHandle, StoreError> {
        self.store
            .send(AppAction::Purchase {
                event_id: event_id.into(),
            })
            .await
    }

    /// Ask for confirmation, then cancel `ticket_id`.
    ///
    /// The returned handle completes only after the question is answered.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`TicketClient::shutdown`].
    pub async fn cancel(
        &self,
        ticket_id: impl Into<ResourceId>,
    ) -> Result<EffectHandle, StoreError> {
        self.store
            .send(AppAction::Cancel {
                ticket_id: ticket_id.into(),
            })
            .await
    }

    /// Hide the current notification.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`TicketClient::shutdown`].
    pub async fn dismiss_notification(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(AppAction::DismissNotification).await
    }

    /// Switch between the events and tickets listing.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`TicketClient::shutdown`].
    pub async fn select_view(&self, view: View) -> Result<EffectHandle, StoreError> {
        self.store.send(AppAction::SelectView { view }).await
    }

    /// A copy of the whole state.
    pub async fn snapshot(&self) -> AppState {
        self.store.state(Clone::clone).await
    }

    /// Read part of the state.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&AppState) -> T,
    {
        self.store.state(f).await
    }

    /// Every action produced by effects (completions, confirmations, expiries),
    /// after it has been reduced.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppAction> {
        self.store.subscribe_actions()
    }

    /// Dashboard link for admin sessions, `None` otherwise.
    pub async fn admin_dashboard_url(&self) -> Option<String> {
        let url = Arc::clone(&self.admin_dashboard_url);
        self.store
            .state(move |state| state.is_admin().then(|| url.to_string()))
            .await
    }

    /// Stop accepting calls and wait for running requests.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownTimeout`] if requests are still running after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}
