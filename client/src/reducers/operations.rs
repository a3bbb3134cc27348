//! Purchase and cancel controllers.
//!
//! ```text
//! Purchase:  Idle ─▶ InFlight ─▶ Idle
//! Cancel:    Idle ─▶ AwaitingConfirmation ─▶ InFlight ─▶ Idle
//!                              └─ declined ─▶ Idle
//! ```
//!
//! A trigger is rejected before any request is sent when there is no
//! session, when the same kind of operation is already busy, or (purchase)
//! when the event was last seen sold out. Nothing is retried or queued.

use super::{Effects, catalog, notification};
use crate::actions::AppAction;
use crate::environment::ClientEnvironment;
use crate::error::{ClientError, Result};
use crate::messages;
use crate::providers::{Backend, Confirmation, SessionSlot};
use crate::state::{AppState, OperationStatus};
use crate::types::{NotificationKind, ResourceId};
use eventticket_core::effect::Effect;
use eventticket_core::smallvec;

/// Error text for a settled mutation: the backend's reason when it gave
/// one, a generic refusal otherwise, and a retry hint for transport failures.
fn failure_message(error: &ClientError, refused: &str, retry: &str) -> String {
    match error {
        ClientError::Rejected { .. } => error.backend_reason().unwrap_or(refused).to_string(),
        _ => retry.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Purchase
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn purchase<B, S, C>(
    state: &mut AppState,
    event_id: ResourceId,
    env: &ClientEnvironment<B, S, C>,
) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    let Some(user_id) = state.user_id().cloned() else {
        return smallvec![notification::show(
            state,
            messages::LOGIN_TO_PURCHASE,
            NotificationKind::Error,
            env,
        )];
    };

    if let Some(busy) = state.purchase.target() {
        tracing::debug!(%event_id, %busy, "Purchase rejected: another purchase is in flight");
        return smallvec![Effect::None];
    }

    if state.event(&event_id).is_some_and(|event| event.is_sold_out()) {
        return smallvec![notification::show(
            state,
            messages::SOLD_OUT,
            NotificationKind::Error,
            env,
        )];
    }

    state.purchase = OperationStatus::InFlight {
        target: event_id.clone(),
    };
    tracing::info!(%event_id, "Purchasing ticket");

    let backend = env.backend.clone();
    smallvec![Effect::future(async move {
        let result = backend.purchase(&user_id, &event_id).await;
        Some(AppAction::PurchaseCompleted { event_id, result })
    })]
}

pub(super) fn purchase_completed<B, S, C>(
    state: &mut AppState,
    event_id: &ResourceId,
    result: Result<()>,
    env: &ClientEnvironment<B, S, C>,
) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    if !state.purchase.is_in_flight_for(event_id) {
        tracing::warn!(%event_id, "Ignoring completion of a purchase that is not in flight");
        return smallvec![Effect::None];
    }
    state.purchase = OperationStatus::Idle;

    match result {
        Ok(()) => {
            tracing::info!(%event_id, "Ticket purchased");
            smallvec![
                notification::show(
                    state,
                    messages::PURCHASE_SUCCESS,
                    NotificationKind::Success,
                    env,
                ),
                catalog::refresh_effect(state, env),
            ]
        },
        Err(error) => {
            tracing::info!(%event_id, error = %error, "Purchase failed");
            let message =
                failure_message(&error, messages::PURCHASE_FAILED, messages::PURCHASE_RETRY);
            smallvec![notification::show(
                state,
                message,
                NotificationKind::Error,
                env,
            )]
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Cancel
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn cancel<B, S, C>(
    state: &mut AppState,
    ticket_id: ResourceId,
    env: &ClientEnvironment<B, S, C>,
) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone + 'static,
{
    if !state.is_logged_in() {
        return smallvec![notification::show(
            state,
            messages::LOGIN_TO_CANCEL,
            NotificationKind::Error,
            env,
        )];
    }

    if let Some(busy) = state.cancel.target() {
        tracing::debug!(%ticket_id, %busy, "Cancel rejected: another cancellation is in progress");
        return smallvec![Effect::None];
    }

    state.cancel = OperationStatus::AwaitingConfirmation {
        target: ticket_id.clone(),
    };

    let confirmation = env.confirmation.clone();
    smallvec![Effect::future(async move {
        let confirmed = confirmation.confirm(messages::CONFIRM_CANCEL).await;
        Some(AppAction::CancelConfirmation {
            ticket_id,
            confirmed,
        })
    })]
}

pub(super) fn cancel_confirmation<B, S, C>(
    state: &mut AppState,
    ticket_id: ResourceId,
    confirmed: bool,
    env: &ClientEnvironment<B, S, C>,
) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    let awaiting = OperationStatus::AwaitingConfirmation {
        target: ticket_id.clone(),
    };
    if state.cancel != awaiting {
        tracing::warn!(%ticket_id, "Ignoring an answer to a question that is no longer open");
        return smallvec![Effect::None];
    }

    if !confirmed {
        state.cancel = OperationStatus::Idle;
        tracing::debug!(%ticket_id, "Cancellation declined");
        return smallvec![notification::show(
            state,
            messages::CANCEL_ABORTED,
            NotificationKind::Info,
            env,
        )];
    }

    // the session may have ended while the question was open
    let Some(user_id) = state.user_id().cloned() else {
        state.cancel = OperationStatus::Idle;
        return smallvec![notification::show(
            state,
            messages::LOGIN_TO_CANCEL,
            NotificationKind::Error,
            env,
        )];
    };

    state.cancel = OperationStatus::InFlight {
        target: ticket_id.clone(),
    };
    tracing::info!(%ticket_id, "Cancelling ticket");

    let backend = env.backend.clone();
    smallvec![Effect::future(async move {
        let result = backend.cancel(&user_id, &ticket_id).await;
        Some(AppAction::CancelCompleted { ticket_id, result })
    })]
}

pub(super) fn cancel_completed<B, S, C>(
    state: &mut AppState,
    ticket_id: &ResourceId,
    result: Result<()>,
    env: &ClientEnvironment<B, S, C>,
) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    if !state.cancel.is_in_flight_for(ticket_id) {
        tracing::warn!(%ticket_id, "Ignoring completion of a cancellation that is not in flight");
        return smallvec![Effect::None];
    }
    state.cancel = OperationStatus::Idle;

    match result {
        Ok(()) => {
            tracing::info!(%ticket_id, "Ticket cancelled");
            state.tickets.retain(|ticket| &ticket.id != ticket_id);
            smallvec![
                notification::show(
                    state,
                    messages::CANCEL_SUCCESS,
                    NotificationKind::Success,
                    env,
                ),
                catalog::refresh_effect(state, env),
            ]
        },
        Err(error) => {
            tracing::info!(%ticket_id, error = %error, "Cancellation failed");
            let message = failure_message(&error, messages::CANCEL_FAILED, messages::CANCEL_RETRY);
            smallvec![notification::show(
                state,
                message,
                NotificationKind::Error,
                env,
            )]
        },
    }
}
