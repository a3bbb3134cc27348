//! Catalog and ticket view-models.
//!
//! Refreshes replace the whole collection with the backend's snapshot and
//! may overlap; the last response to arrive wins. Failures keep the previous
//! collection.

use super::Effects;
use crate::actions::AppAction;
use crate::environment::ClientEnvironment;
use crate::error::Result;
use crate::providers::{Backend, Confirmation, SessionSlot};
use crate::state::AppState;
use crate::types::{Event, ResourceId, Ticket};
use eventticket_core::effect::Effect;
use eventticket_core::smallvec;

fn load_catalog<B: Backend + Clone + 'static>(backend: &B) -> Effect<AppAction> {
    let backend = backend.clone();
    Effect::future(async move {
        let result = backend.list_events().await;
        Some(AppAction::CatalogLoaded { result })
    })
}

fn load_tickets<B: Backend + Clone + 'static>(
    backend: &B,
    user_id: ResourceId,
) -> Effect<AppAction> {
    let backend = backend.clone();
    Effect::future(async move {
        let result = backend.list_tickets(&user_id).await;
        Some(AppAction::TicketsLoaded { user_id, result })
    })
}

/// Both view-model refreshes, run concurrently. Nothing without a session.
pub(super) fn refresh_effect<B, S, C>(
    state: &AppState,
    env: &ClientEnvironment<B, S, C>,
) -> Effect<AppAction>
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    match state.user_id() {
        Some(user_id) => Effect::merge(vec![
            load_catalog(&env.backend),
            load_tickets(&env.backend, user_id.clone()),
        ]),
        None => Effect::None,
    }
}

pub(super) fn refresh_all<B, S, C>(state: &AppState, env: &ClientEnvironment<B, S, C>) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    if !state.is_logged_in() {
        tracing::debug!("Refresh skipped: not logged in");
        return smallvec![Effect::None];
    }
    smallvec![refresh_effect(state, env)]
}

pub(super) fn refresh_catalog<B, S, C>(
    state: &AppState,
    env: &ClientEnvironment<B, S, C>,
) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    if !state.is_logged_in() {
        tracing::debug!("Catalog refresh skipped: not logged in");
        return smallvec![Effect::None];
    }
    smallvec![load_catalog(&env.backend)]
}

pub(super) fn refresh_tickets<B, S, C>(
    state: &AppState,
    env: &ClientEnvironment<B, S, C>,
) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    let Some(user_id) = state.user_id() else {
        tracing::debug!("Ticket refresh skipped: not logged in");
        return smallvec![Effect::None];
    };
    smallvec![load_tickets(&env.backend, user_id.clone())]
}

pub(super) fn catalog_loaded(state: &mut AppState, result: Result<Vec<Event>>) -> Effects {
    if !state.is_logged_in() {
        tracing::debug!("Discarding catalog snapshot that arrived after logout");
        return smallvec![Effect::None];
    }

    match result {
        Ok(events) => {
            tracing::debug!(count = events.len(), "Catalog refreshed");
            state.catalog = events;
        },
        Err(error) => tracing::warn!(error = %error, "Catalog refresh failed"),
    }
    smallvec![Effect::None]
}

pub(super) fn tickets_loaded(
    state: &mut AppState,
    user_id: &ResourceId,
    result: Result<Vec<Ticket>>,
) -> Effects {
    if state.user_id() != Some(user_id) {
        tracing::debug!(%user_id, "Discarding ticket snapshot for a session that has ended");
        return smallvec![Effect::None];
    }

    match result {
        Ok(tickets) => {
            tracing::debug!(count = tickets.len(), "Tickets refreshed");
            state.tickets = tickets;
        },
        Err(error) => tracing::warn!(error = %error, "Ticket refresh failed"),
    }
    smallvec![Effect::None]
}
