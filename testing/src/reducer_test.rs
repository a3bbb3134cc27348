//! Given-When-Then harness for reducers
//!
//! Runs a reducer synchronously against a state value, so reducer logic can
//! be tested without a runtime, timers, or network.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use eventticket_core::{effect::Effect, reducer::Reducer};

type StateAssertion<S> = Box<dyn FnOnce(&S)>;

type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers
///
/// `given_actions` replays actions to build the starting state (their
/// effects are discarded); only the effects of `when_action` are asserted.
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(AppReducer::new())
///     .with_env(test_environment())
///     .given_state(AppState::default())
///     .when_action(AppAction::Purchase { event_id: "evt-1".into() })
///     .then_state(|state| {
///         assert!(state.purchase.is_idle());
///         assert_eq!(
///             state.notification.message,
///             "Please login first to purchase tickets"
///         );
///     })
///     .then_effects(|effects| assertions::assert_future_count(effects, 0))
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    history: Vec<A>,
    action: Option<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            history: Vec::new(),
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Replay actions on top of the initial state before the action under test (Given)
    #[must_use]
    pub fn given_actions(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.history.extend(actions);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of the action under test (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if the initial state, action, or environment is not set,
    /// or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");
        let action = self.action.expect("Action must be set with when_action()");
        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        for earlier in self.history {
            let _ = self.reducer.reduce(&mut state, earlier, &env);
        }

        let effects = self.reducer.reduce(&mut state, action, &env);

        for assertion in self.state_assertions {
            assertion(&state);
        }
        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use eventticket_core::effect::{Effect, EffectId};

    fn walk<A>(effects: &[Effect<A>], visit: &mut dyn FnMut(&Effect<A>)) {
        for effect in effects {
            visit(effect);
            match effect {
                Effect::Parallel(children) => walk(children, visit),
                Effect::Cancellable { effect, .. } => walk(std::slice::from_ref(&**effect), visit),
                _ => {},
            }
        }
    }

    /// Number of `Future` effects, including those nested in `Parallel`
    /// and `Cancellable`
    #[must_use]
    pub fn count_futures<A>(effects: &[Effect<A>]) -> usize {
        let mut count = 0;
        walk(effects, &mut |effect| {
            if matches!(effect, Effect::Future(_)) {
                count += 1;
            }
        });
        count
    }

    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if any effect other than `Effect::None` is present.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert how many `Future` effects (HTTP calls, confirmation prompts) were returned
    ///
    /// # Panics
    ///
    /// Panics if the count differs.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_future_count<A>(effects: &[Effect<A>], expected: usize) {
        let found = count_futures(effects);
        assert_eq!(
            found, expected,
            "Expected {expected} future effects, but found {found}"
        );
    }

    /// Assert that an effect is registered as cancellable under `id`
    ///
    /// # Panics
    ///
    /// Panics if no such effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_arms<A>(effects: &[Effect<A>], id: EffectId) {
        let mut found = false;
        walk(effects, &mut |effect| {
            if matches!(effect, Effect::Cancellable { id: armed, .. } if *armed == id) {
                found = true;
            }
        });
        assert!(found, "Expected a cancellable effect registered as {id}");
    }

    /// Assert that the effects cancel `id`
    ///
    /// # Panics
    ///
    /// Panics if no `Effect::Cancel(id)` is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_cancels<A>(effects: &[Effect<A>], id: EffectId) {
        let mut found = false;
        walk(effects, &mut |effect| {
            if matches!(effect, Effect::Cancel(cancelled) if *cancelled == id) {
                found = true;
            }
        });
        assert!(found, "Expected effects to cancel {id}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventticket_core::effect::EffectId;
    use eventticket_core::{SmallVec, smallvec};
    use std::time::Duration;

    const BLINK: EffectId = EffectId::new("blink");

    #[derive(Debug, Default)]
    struct LampState {
        on: bool,
        switches: u32,
    }

    #[derive(Debug)]
    enum LampAction {
        Toggle,
        Blink,
        Off,
    }

    struct LampReducer;

    impl Reducer for LampReducer {
        type State = LampState;
        type Action = LampAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut LampState,
            action: LampAction,
            _env: &(),
        ) -> SmallVec<[Effect<LampAction>; 4]> {
            match action {
                LampAction::Toggle => {
                    state.on = !state.on;
                    state.switches += 1;
                    smallvec![Effect::None]
                },
                LampAction::Blink => smallvec![Effect::merge(vec![
                    Effect::future(async { Some(LampAction::Toggle) }),
                    Effect::Delay {
                        duration: Duration::from_millis(500),
                        action: Box::new(LampAction::Toggle),
                    }
                    .cancellable(BLINK),
                ])],
                LampAction::Off => {
                    state.on = false;
                    smallvec![Effect::Cancel(BLINK)]
                },
            }
        }
    }

    #[test]
    fn test_given_actions_build_state() {
        ReducerTest::new(LampReducer)
            .with_env(())
            .given_state(LampState::default())
            .given_actions([LampAction::Toggle, LampAction::Toggle])
            .when_action(LampAction::Toggle)
            .then_state(|state| {
                assert!(state.on);
                assert_eq!(state.switches, 3);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_nested_effects_are_found() {
        ReducerTest::new(LampReducer)
            .with_env(())
            .given_state(LampState::default())
            .when_action(LampAction::Blink)
            .then_effects(|effects| {
                assertions::assert_future_count(effects, 1);
                assertions::assert_arms(effects, BLINK);
            })
            .run();
    }

    #[test]
    fn test_cancel_is_found() {
        ReducerTest::new(LampReducer)
            .with_env(())
            .given_state(LampState { on: true, switches: 1 })
            .when_action(LampAction::Off)
            .then_state(|state| assert!(!state.on))
            .then_effects(|effects| assertions::assert_cancels(effects, BLINK))
            .run();
    }
}
