//! Session lifecycle: restore, login, logout.
//!
//! Session writes are mirrored to the durable slot in the same reducer step
//! that changes memory. If the slot write fails, memory is left untouched.

use super::{Effects, catalog, notification};
use crate::actions::AppAction;
use crate::environment::ClientEnvironment;
use crate::error::{ClientError, Result};
use crate::messages;
use crate::providers::{Backend, Confirmation, SessionSlot};
use crate::state::{AppState, OperationStatus};
use crate::types::{IdentityAssertion, NotificationKind, Session, View};
use eventticket_core::effect::Effect;
use eventticket_core::smallvec;

/// Read the durable record. Anything unreadable counts as "no session".
pub(super) fn restore<B, S, C>(state: &mut AppState, env: &ClientEnvironment<B, S, C>) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    if state.is_logged_in() {
        tracing::debug!("Restore skipped: already logged in");
        return smallvec![Effect::None];
    }

    let record = match env.session_slot.load() {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::debug!("No stored session");
            return smallvec![Effect::None];
        },
        Err(e) => {
            tracing::warn!(error = %e, "Could not read stored session");
            return smallvec![Effect::None];
        },
    };

    match serde_json::from_str::<Session>(&record) {
        Ok(session) if session.is_authenticated() => {
            tracing::info!(user_id = %session.id, "Session restored");
            state.session = Some(session);
            smallvec![catalog::refresh_effect(state, env)]
        },
        Ok(_) => {
            tracing::warn!("Stored session has no user id, treating as logged out");
            smallvec![Effect::None]
        },
        Err(e) => {
            tracing::warn!(error = %e, "Stored session is unreadable, treating as logged out");
            smallvec![Effect::None]
        },
    }
}

pub(super) fn login<B, S, C>(
    state: &mut AppState,
    identity: IdentityAssertion,
    env: &ClientEnvironment<B, S, C>,
) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    if state.is_logged_in() {
        tracing::debug!("Login ignored: already logged in");
        return smallvec![Effect::None];
    }
    if state.authenticating {
        tracing::debug!("Login ignored: authentication already in progress");
        return smallvec![Effect::None];
    }

    state.authenticating = true;
    tracing::info!(email = %identity.email, "Authenticating");

    let backend = env.backend.clone();
    smallvec![Effect::future(async move {
        let result = backend.authenticate(&identity).await;
        Some(AppAction::LoginCompleted { result })
    })]
}

pub(super) fn login_completed<B, S, C>(
    state: &mut AppState,
    result: Result<Session>,
    env: &ClientEnvironment<B, S, C>,
) -> Effects
where
    B: Backend + Clone + 'static,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    state.authenticating = false;

    let session = match result {
        Ok(session) if session.is_authenticated() => session,
        Ok(_) => {
            tracing::warn!("Backend accepted the login but returned no user id");
            return smallvec![notification::show(
                state,
                messages::LOGIN_FAILED,
                NotificationKind::Error,
                env,
            )];
        },
        Err(error @ ClientError::Rejected { .. }) => {
            tracing::info!(error = %error, "Login rejected");
            let message = messages::authentication_failed(error.backend_reason());
            return smallvec![notification::show(
                state,
                message,
                NotificationKind::Error,
                env,
            )];
        },
        Err(error) => {
            tracing::warn!(error = %error, "Login failed");
            return smallvec![notification::show(
                state,
                messages::LOGIN_FAILED,
                NotificationKind::Error,
                env,
            )];
        },
    };

    if let Err(error) = persist(&session, &env.session_slot) {
        tracing::warn!(error = %error, "Could not store session, login abandoned");
        return smallvec![notification::show(
            state,
            messages::LOGIN_FAILED,
            NotificationKind::Error,
            env,
        )];
    }

    tracing::info!(user_id = %session.id, admin = session.is_admin, "Logged in");
    let (message, kind) = if session.is_admin {
        (messages::WELCOME_ADMIN, NotificationKind::Info)
    } else {
        (messages::LOGIN_SUCCESS, NotificationKind::Success)
    };
    state.session = Some(session);

    smallvec![
        notification::show(state, message, kind, env),
        catalog::refresh_effect(state, env),
    ]
}

fn persist<S: SessionSlot>(session: &Session, slot: &S) -> Result<()> {
    let record = serde_json::to_string(session)
        .map_err(|e| ClientError::Storage(format!("cannot serialize session: {e}")))?;
    slot.store(&record)
}

pub(super) fn identity_provider_failed<B, S, C>(
    state: &mut AppState,
    env: &ClientEnvironment<B, S, C>,
) -> Effects
where
    B: Backend + Clone,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    tracing::info!("Identity provider reported a failure");
    smallvec![notification::show(
        state,
        messages::IDENTITY_PROVIDER_FAILED,
        NotificationKind::Error,
        env,
    )]
}

pub(super) fn logout<B, S, C>(state: &mut AppState, env: &ClientEnvironment<B, S, C>) -> Effects
where
    B: Backend + Clone,
    S: SessionSlot,
    C: Confirmation + Clone,
{
    let Some(session) = state.session.take() else {
        tracing::debug!("Logout ignored: not logged in");
        return smallvec![Effect::None];
    };

    if let Err(error) = env.session_slot.clear() {
        tracing::warn!(error = %error, "Could not clear stored session");
    }

    state.catalog.clear();
    state.tickets.clear();
    state.view = View::Events;
    // completions of requests still in flight are dropped when they settle
    state.purchase = OperationStatus::Idle;
    state.cancel = OperationStatus::Idle;
    tracing::info!(user_id = %session.id, "Logged out");

    smallvec![notification::show(
        state,
        messages::LOGGED_OUT,
        NotificationKind::Info,
        env,
    )]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use crate::actions::AppAction;
    use crate::error::ClientError;
    use crate::mocks::{MemorySessionSlot, TestReducer, test_environment};
    use crate::state::AppState;
    use crate::types::{IdentityAssertion, NotificationKind, Session, View};
    use eventticket_testing::{ReducerTest, assertions};

    fn user(admin: bool) -> Session {
        Session {
            id: "u-1".into(),
            name: "Thandi".to_string(),
            email: "t@example.com".to_string(),
            is_admin: admin,
        }
    }

    fn identity() -> IdentityAssertion {
        IdentityAssertion::new("t@example.com", "Thandi", "1098")
    }

    #[test]
    fn test_login_starts_exchange() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_environment())
            .given_state(AppState::default())
            .when_action(AppAction::Login {
                identity: identity(),
            })
            .then_state(|state| {
                assert!(state.authenticating);
                assert!(state.session.is_none());
            })
            .then_effects(|effects| assertions::assert_future_count(effects, 1))
            .run();
    }

    #[test]
    fn test_login_while_authenticating_is_ignored() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_environment())
            .given_state(AppState {
                authenticating: true,
                ..AppState::default()
            })
            .when_action(AppAction::Login {
                identity: identity(),
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_login_success_persists_and_refreshes() {
        let env = test_environment();
        let slot = env.session_slot.clone();

        ReducerTest::new(TestReducer::new())
            .with_env(env)
            .given_state(AppState {
                authenticating: true,
                ..AppState::default()
            })
            .when_action(AppAction::LoginCompleted {
                result: Ok(user(false)),
            })
            .then_state(|state| {
                assert!(!state.authenticating);
                assert_eq!(state.session, Some(user(false)));
                assert_eq!(state.notification.kind, NotificationKind::Success);
                assert_eq!(
                    state.notification.message,
                    "Login successful! Welcome to EventTicket."
                );
            })
            .then_effects(|effects| assertions::assert_future_count(effects, 2))
            .run();

        let stored: Session = serde_json::from_str(&slot.record().unwrap()).unwrap();
        assert_eq!(stored, user(false));
    }

    #[test]
    fn test_admin_login_gets_info_welcome() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_environment())
            .given_state(AppState::default())
            .when_action(AppAction::LoginCompleted {
                result: Ok(user(true)),
            })
            .then_state(|state| {
                assert!(state.is_admin());
                assert_eq!(state.notification.kind, NotificationKind::Info);
                assert_eq!(
                    state.notification.message,
                    "Welcome Admin! You can access the admin dashboard."
                );
            })
            .run();
    }

    #[test]
    fn test_rejected_login_surfaces_reason() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_environment())
            .given_state(AppState::default())
            .when_action(AppAction::LoginCompleted {
                result: Err(ClientError::Rejected {
                    reason: Some("Account disabled".to_string()),
                }),
            })
            .then_state(|state| {
                assert!(state.session.is_none());
                assert_eq!(state.notification.kind, NotificationKind::Error);
                assert_eq!(
                    state.notification.message,
                    "Authentication failed: Account disabled"
                );
            })
            .run();
    }

    #[test]
    fn test_failed_slot_write_leaves_session_unset() {
        let mut env = test_environment();
        env.session_slot = MemorySessionSlot::new().fail_writes();

        ReducerTest::new(TestReducer::new())
            .with_env(env)
            .given_state(AppState::default())
            .when_action(AppAction::LoginCompleted {
                result: Ok(user(false)),
            })
            .then_state(|state| {
                assert!(state.session.is_none());
                assert_eq!(state.notification.message, "Login failed. Please try again.");
            })
            .then_effects(|effects| assertions::assert_future_count(effects, 0))
            .run();
    }

    #[test]
    fn test_restore_ignores_garbage() {
        let mut env = test_environment();
        env.session_slot = MemorySessionSlot::with_record("{not json");

        ReducerTest::new(TestReducer::new())
            .with_env(env)
            .given_state(AppState::default())
            .when_action(AppAction::Restore)
            .then_state(|state| assert!(state.session.is_none()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_restore_refreshes_view_models() {
        let mut env = test_environment();
        env.session_slot =
            MemorySessionSlot::with_record(&serde_json::to_string(&user(false)).unwrap());

        ReducerTest::new(TestReducer::new())
            .with_env(env)
            .given_state(AppState::default())
            .when_action(AppAction::Restore)
            .then_state(|state| assert_eq!(state.session, Some(user(false))))
            .then_effects(|effects| assertions::assert_future_count(effects, 2))
            .run();
    }

    #[test]
    fn test_logout_clears_everything() {
        let env = test_environment();
        let slot = env.session_slot.clone();

        ReducerTest::new(TestReducer::new())
            .with_env(env)
            .given_state(AppState {
                view: View::Tickets,
                ..AppState::default()
            })
            .given_actions([AppAction::LoginCompleted {
                result: Ok(user(false)),
            }])
            .when_action(AppAction::Logout)
            .then_state(|state| {
                assert!(state.session.is_none());
                assert!(state.catalog.is_empty());
                assert!(state.tickets.is_empty());
                assert_eq!(state.view, View::Events);
                assert_eq!(state.notification.message, "Logged out successfully");
                assert_eq!(state.notification.kind, NotificationKind::Info);
            })
            .run();

        assert_eq!(slot.record(), None);
    }

    #[test]
    fn test_purchase_settling_after_logout_is_dropped() {
        ReducerTest::new(TestReducer::new())
            .with_env(test_environment())
            .given_state(AppState::default())
            .given_actions([
                AppAction::LoginCompleted {
                    result: Ok(user(false)),
                },
                AppAction::Purchase {
                    event_id: "evt-1".into(),
                },
                AppAction::Cancel {
                    ticket_id: "tkt-1".into(),
                },
                AppAction::Logout,
            ])
            .when_action(AppAction::PurchaseCompleted {
                event_id: "evt-1".into(),
                result: Ok(()),
            })
            .then_state(|state| {
                assert!(state.purchase.is_idle());
                assert!(state.cancel.is_idle());
                assert_eq!(state.notification.message, "Logged out successfully");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
