//! The client reducer.
//!
//! One reducer owns the whole [`AppState`]. Its handlers are split by concern:
//!
//! - [`session`]: restore, login, logout
//! - [`catalog`]: catalog and ticket view-model refreshes
//! - [`operations`]: the purchase and cancel controllers
//! - [`notification`]: show, dismiss, auto-hide
//!
//! # Flow
//!
//! ```text
//! Purchase ─▶ guards ─▶ InFlight ─▶ POST /tickets/purchase
//!                                         │
//! PurchaseCompleted ◀─────────────────────┘
//!     ├─ Ok  ─▶ Idle, success notification, refresh catalog ∥ tickets
//!     └─ Err ─▶ Idle, error notification
//! ```

use crate::actions::AppAction;
use crate::environment::ClientEnvironment;
use crate::providers::{Backend, Confirmation, SessionSlot};
use crate::state::AppState;
use eventticket_core::effect::{Effect, EffectId};
use eventticket_core::reducer::Reducer;
use eventticket_core::SmallVec;
use std::marker::PhantomData;

mod catalog;
mod notification;
mod operations;
mod session;

/// Registration key of the notification auto-hide timer.
pub const NOTIFICATION_TIMER: EffectId = EffectId::new("notification-timer");

type Effects = SmallVec<[Effect<AppAction>; 4]>;

/// Reducer for the whole client.
///
/// Stateless: everything lives in [`AppState`], collaborators come from the
/// [`ClientEnvironment`].
pub struct AppReducer<B, S, C> {
    _environment: PhantomData<fn() -> (B, S, C)>,
}

impl<B, S, C> AppReducer<B, S, C> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _environment: PhantomData,
        }
    }
}

impl<B, S, C> Default for AppReducer<B, S, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, S, C> Clone for AppReducer<B, S, C> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<B, S, C> std::fmt::Debug for AppReducer<B, S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppReducer").finish()
    }
}

impl<B, S, C> Reducer for AppReducer<B, S, C>
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone + 'static,
{
    type State = AppState;
    type Action = AppAction;
    type Environment = ClientEnvironment<B, S, C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            // Session
            AppAction::Restore => session::restore(state, env),
            AppAction::Login { identity } => session::login(state, identity, env),
            AppAction::LoginCompleted { result } => session::login_completed(state, result, env),
            AppAction::IdentityProviderFailed => session::identity_provider_failed(state, env),
            AppAction::Logout => session::logout(state, env),

            // View-models
            AppAction::RefreshAll => catalog::refresh_all(state, env),
            AppAction::RefreshCatalog => catalog::refresh_catalog(state, env),
            AppAction::CatalogLoaded { result } => catalog::catalog_loaded(state, result),
            AppAction::RefreshTickets => catalog::refresh_tickets(state, env),
            AppAction::TicketsLoaded { user_id, result } => {
                catalog::tickets_loaded(state, &user_id, result)
            },

            // Purchase / cancel
            AppAction::Purchase { event_id } => operations::purchase(state, event_id, env),
            AppAction::PurchaseCompleted { event_id, result } => {
                operations::purchase_completed(state, &event_id, result, env)
            },
            AppAction::Cancel { ticket_id } => operations::cancel(state, ticket_id, env),
            AppAction::CancelConfirmation {
                ticket_id,
                confirmed,
            } => operations::cancel_confirmation(state, ticket_id, confirmed, env),
            AppAction::CancelCompleted { ticket_id, result } => {
                operations::cancel_completed(state, &ticket_id, result, env)
            },

            // Notification
            AppAction::ShowNotification { message, kind } => {
                eventticket_core::smallvec![notification::show(state, message, kind, env)]
            },
            AppAction::DismissNotification => notification::dismiss(state),
            AppAction::NotificationExpired { generation } => {
                notification::expire(state, generation)
            },

            // Navigation
            AppAction::SelectView { view } => {
                state.view = view;
                eventticket_core::smallvec![Effect::None]
            },
        }
    }
}
