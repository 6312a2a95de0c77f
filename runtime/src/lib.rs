//! # Todolist Runtime
//!
//! Runtime implementation for the todolist architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Event Loop**: Manages the action → reducer → effects → action feedback
//!   loop
//!
//! ## Execution Model
//!
//! The store is strictly serialized: `send` runs the reducer under the state
//! write lock, then drives every returned effect to completion - in order -
//! before returning. Actions produced by effects are fed back through the
//! reducer within the same `send` call. One operation always runs to
//! completion before the next event is processed; there is no background
//! execution and nothing to cancel.
//!
//! ## Example
//!
//! ```ignore
//! use todolist_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action; returns once all effects have completed
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::collections::VecDeque;

use todolist_core::{effect::Effect, reducer::Reducer};
use tokio::sync::RwLock;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// The action feedback loop exceeded the safety limit
        ///
        /// A reducer and its effects fed actions back to each other without
        /// converging. This points at a logic error; the store stops
        /// processing rather than spinning forever.
        #[error("action feedback loop exceeded {0} actions")]
        FeedbackLimit(usize),
    }
}

pub use error::StoreError;

/// Upper bound on actions processed by a single `send` call, counting
/// feedback from effects. A well-formed reducer stays far below this.
const FEEDBACK_LIMIT: usize = 1024;

/// The Store - owns state and drives the action/effect loop
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type (injected dependencies)
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: RwLock<S>,
    reducer: R,
    environment: E,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new store with initial state, reducer, and environment
    ///
    /// # Arguments
    ///
    /// - `initial_state`: The starting state for the store
    /// - `reducer`: The reducer implementation (business logic)
    /// - `environment`: Injected dependencies
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: RwLock::new(initial_state),
            reducer,
            environment,
        }
    }

    /// Send an action to the store
    ///
    /// This is the primary way to interact with the store:
    /// 1. Acquires the write lock on state
    /// 2. Calls the reducer with (state, action, environment)
    /// 3. Executes returned effects to completion, in order
    /// 4. Feeds actions produced by effects back into the reducer
    ///
    /// `send` returns only once the action and everything it triggered have
    /// finished, so callers observe fully settled state afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::FeedbackLimit`] if effects keep producing
    /// actions without converging.
    ///
    /// # Panics
    ///
    /// If the reducer panics, the panic propagates. Reducers should be pure
    /// functions that do not panic.
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: A) -> Result<(), StoreError> {
        let mut pending = VecDeque::from([action]);
        let mut processed = 0_usize;

        while let Some(action) = pending.pop_front() {
            processed += 1;
            if processed > FEEDBACK_LIMIT {
                tracing::error!(
                    limit = FEEDBACK_LIMIT,
                    "action feedback loop did not converge"
                );
                return Err(StoreError::FeedbackLimit(FEEDBACK_LIMIT));
            }

            tracing::debug!("processing action");

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("acquired write lock on state");
                self.reducer.reduce(&mut state, action, &self.environment)
            };

            tracing::trace!("reducer completed, returned {} effects", effects.len());

            // Flatten effect groups into one ordered worklist. Parallel and
            // Sequential both drain in order here: the serialized store never
            // overlaps execution.
            let mut queue: VecDeque<Effect<A>> = effects.into_iter().collect();
            while let Some(effect) = queue.pop_front() {
                match effect {
                    Effect::None => {
                        tracing::trace!("executing Effect::None (no-op)");
                    },
                    Effect::Parallel(group) | Effect::Sequential(group) => {
                        tracing::trace!("expanding effect group of {}", group.len());
                        for effect in group.into_iter().rev() {
                            queue.push_front(effect);
                        }
                    },
                    Effect::Future(fut) => {
                        tracing::trace!("executing Effect::Future");
                        if let Some(next) = fut.await {
                            tracing::trace!("Effect::Future produced an action");
                            pending.push_back(next);
                        }
                    },
                }
            }
        }

        Ok(())
    }

    /// Read current state via a closure
    ///
    /// Access state through a closure to ensure the lock is released
    /// promptly:
    ///
    /// ```ignore
    /// let task_count = store.state(|s| s.tasks.len()).await;
    /// ```
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todolist_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct TestState {
        count: i32,
        log: Vec<&'static str>,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Bump,
        BumpViaEffect,
        Record(&'static str),
        RecordPair,
        Cycle,
    }

    struct TestReducer;

    struct TestEnv;

    fn record(label: &'static str) -> Effect<TestAction> {
        Effect::Future(Box::pin(async move { Some(TestAction::Record(label)) }))
    }

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Bump => {
                    state.count += 1;
                    SmallVec::new()
                },
                TestAction::BumpViaEffect => {
                    smallvec![Effect::Future(Box::pin(async { Some(TestAction::Bump) }))]
                },
                TestAction::Record(label) => {
                    state.log.push(label);
                    SmallVec::new()
                },
                TestAction::RecordPair => {
                    smallvec![Effect::chain(vec![record("first"), record("second")])]
                },
                TestAction::Cycle => {
                    smallvec![Effect::Future(Box::pin(async { Some(TestAction::Cycle) }))]
                },
            }
        }
    }

    fn test_store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState::default(), TestReducer, TestEnv)
    }

    #[tokio::test]
    async fn send_applies_reducer() {
        let store = test_store();

        store.send(TestAction::Bump).await.unwrap();

        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn effect_actions_feed_back_before_send_returns() {
        let store = test_store();

        store.send(TestAction::BumpViaEffect).await.unwrap();

        assert_eq!(store.state(|s| s.count).await, 1);
    }

    #[tokio::test]
    async fn chained_effects_run_in_order() {
        let store = test_store();

        store.send(TestAction::RecordPair).await.unwrap();

        assert_eq!(
            store.state(|s| s.log.clone()).await,
            vec!["first", "second"]
        );
    }

    #[tokio::test]
    async fn runaway_feedback_is_stopped() {
        let store = test_store();

        let result = store.send(TestAction::Cycle).await;

        assert!(matches!(result, Err(StoreError::FeedbackLimit(_))));
    }

    #[tokio::test]
    async fn state_reads_through_closure() {
        let store = test_store();

        store.send(TestAction::Bump).await.unwrap();
        store.send(TestAction::Bump).await.unwrap();

        let (count, log_len) = store.state(|s| (s.count, s.log.len())).await;
        assert_eq!(count, 2);
        assert_eq!(log_len, 0);
    }
}
