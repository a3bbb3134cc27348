//! Property: however a session was reached, logging out leaves nothing behind.

use eventticket_client::mocks::{
    FixedConfirmation, MemorySessionSlot, MockBackend, sample_event, sample_ticket,
};
use eventticket_client::{AppAction, AppReducer, AppState, ClientEnvironment, ClientError, Session};
use eventticket_core::reducer::Reducer;
use eventticket_testing::test_clock;
use proptest::prelude::*;
use std::sync::Arc;

type TestEnvironment = ClientEnvironment<MockBackend, MemorySessionSlot, FixedConfirmation>;

fn create_test_env(slot: MemorySessionSlot) -> TestEnvironment {
    ClientEnvironment::new(MockBackend::new(), slot, FixedConfirmation::accept())
        .with_clock(Arc::new(test_clock()))
}

fn session_strategy() -> impl Strategy<Value = Session> {
    ("[a-z0-9]{1,8}", "[A-Za-z ]{0,12}", any::<bool>()).prop_map(|(id, name, is_admin)| {
        Session {
            id: id.as_str().into(),
            email: format!("{id}@example.com"),
            name,
            is_admin,
        }
    })
}

/// Actions a user session can go through before logging out.
fn action_strategy() -> impl Strategy<Value = AppAction> {
    prop_oneof![
        session_strategy().prop_map(|s| AppAction::LoginCompleted { result: Ok(s) }),
        Just(AppAction::LoginCompleted {
            result: Err(ClientError::Rejected { reason: None })
        }),
        Just(AppAction::Logout),
        Just(AppAction::RefreshAll),
        (0u32..5).prop_map(|n| AppAction::CatalogLoaded {
            result: Ok((0..n).map(|i| sample_event(&format!("evt-{i}"), i)).collect()),
        }),
        "[a-z0-9]{1,8}".prop_map(|user| AppAction::TicketsLoaded {
            user_id: user.as_str().into(),
            result: Ok(vec![sample_ticket("tkt-1")]),
        }),
        "[a-z0-9]{1,4}".prop_map(|event| AppAction::Purchase {
            event_id: event.as_str().into()
        }),
        Just(AppAction::DismissNotification),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn login_then_logout_leaves_nothing_behind(
        history in prop::collection::vec(action_strategy(), 0..24),
        session in session_strategy(),
    ) {
        let slot = MemorySessionSlot::new();
        let env = create_test_env(slot.clone());
        let reducer: AppReducer<MockBackend, MemorySessionSlot, FixedConfirmation> =
            AppReducer::new();
        let mut state = AppState::default();

        for action in history {
            let _ = reducer.reduce(&mut state, action, &env);
        }
        // the login only lands if nobody is logged in yet
        let _ = reducer.reduce(&mut state, AppAction::Logout, &env);
        let _ = reducer.reduce(
            &mut state,
            AppAction::LoginCompleted { result: Ok(session.clone()) },
            &env,
        );
        prop_assert_eq!(state.session.as_ref(), Some(&session));
        prop_assert!(slot.record().is_some());

        let _ = reducer.reduce(
            &mut state,
            AppAction::TicketsLoaded {
                user_id: session.id.clone(),
                result: Ok(vec![sample_ticket("tkt-9")]),
            },
            &env,
        );
        let _ = reducer.reduce(&mut state, AppAction::Logout, &env);

        prop_assert!(state.session.is_none());
        prop_assert!(state.catalog.is_empty());
        prop_assert!(state.tickets.is_empty());
        prop_assert_eq!(slot.record(), None);
    }
}
