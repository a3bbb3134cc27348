//! Notification channel: one message at a time, auto-hidden after the
//! configured window.

use super::{Effects, NOTIFICATION_TIMER};
use crate::actions::AppAction;
use crate::environment::ClientEnvironment;
use crate::providers::{Backend, Confirmation, SessionSlot};
use crate::state::AppState;
use crate::types::NotificationKind;
use eventticket_core::effect::Effect;
use eventticket_core::smallvec;

/// Replace the current notification and (re)arm the auto-hide timer.
///
/// The returned effect must reach the runtime: registering it under
/// [`NOTIFICATION_TIMER`] aborts the previous countdown.
pub(super) fn show<B, S, C>(
    state: &mut AppState,
    message: impl Into<String>,
    kind: NotificationKind,
    env: &ClientEnvironment<B, S, C>,
) -> Effect<AppAction>
where
    B: Backend + Clone,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    let notification = &mut state.notification;
    notification.generation += 1;
    notification.message = message.into();
    notification.kind = kind;
    notification.visible = true;
    notification.shown_at = Some(env.clock.now());

    tracing::debug!(
        generation = notification.generation,
        kind = %kind,
        message = %notification.message,
        "Notification shown"
    );

    Effect::Delay {
        duration: env.notification_ttl,
        action: Box::new(AppAction::NotificationExpired {
            generation: notification.generation,
        }),
    }
    .cancellable(NOTIFICATION_TIMER)
}

pub(super) fn dismiss(state: &mut AppState) -> Effects {
    state.notification.visible = false;
    smallvec![Effect::Cancel(NOTIFICATION_TIMER)]
}

pub(super) fn expire(state: &mut AppState, generation: u64) -> Effects {
    if generation == state.notification.generation {
        state.notification.visible = false;
    } else {
        // a newer notification re-armed the timer after this expiry was queued
        tracing::debug!(
            generation,
            current = state.notification.generation,
            "Ignoring stale notification expiry"
        );
    }
    smallvec![Effect::None]
}
