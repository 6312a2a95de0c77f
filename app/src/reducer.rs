//! Reducer logic for the todo list.
//!
//! Every user-facing operation follows the same shape: ask through the
//! injected prompter, mutate the in-memory list, then return one persist
//! effect that overwrites the snapshot. A declined dialog or empty input is
//! a normal no-op, not an error.

use std::sync::Arc;

use chrono::Duration;
use todolist_core::{
    SmallVec,
    effect::Effect,
    environment::{Clock, Prompter},
    reducer::Reducer,
    smallvec,
};

use crate::storage::{COOKIE_TTL_DAYS, SnapshotStore};
use crate::types::{TodoAction, TodoState};

/// Prompt shown when the user adds a task
pub const ADD_TASK_PROMPT: &str = "Enter your new task:";

/// Confirmation shown before clearing the whole list
pub const CLEAR_ALL_PROMPT: &str = "Are you sure you want to clear all tasks?";

/// Confirmation shown before removing one task, quoting its text
#[must_use]
pub fn remove_task_prompt(text: &str) -> String {
    format!("Are you sure you want to remove this task?\n\n\"{text}\"")
}

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for stamping the snapshot expiry
    pub clock: Arc<dyn Clock>,
    /// User dialogs (add prompt, remove/clear confirmations)
    pub prompts: Arc<dyn Prompter>,
    /// Persisted snapshot of the task list
    pub snapshots: Arc<dyn SnapshotStore>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        prompts: Arc<dyn Prompter>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            clock,
            prompts,
            snapshots,
        }
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Effect that reads the persisted snapshot and feeds it back
    ///
    /// Decode failure is the one recoverable error in the system: it is
    /// logged here and masked by an empty list.
    fn load(env: &TodoEnvironment) -> SmallVec<[Effect<TodoAction>; 4]> {
        let snapshots = Arc::clone(&env.snapshots);
        smallvec![Effect::Future(Box::pin(async move {
            let tasks = match snapshots.load() {
                Ok(tasks) => tasks,
                Err(error) => {
                    tracing::error!(%error, "error parsing todos from cookie, starting empty");
                    Vec::new()
                },
            };
            Some(TodoAction::SnapshotLoaded { tasks })
        }))]
    }

    /// Effect that overwrites the snapshot with the current list
    ///
    /// A failed write is logged and swallowed; the in-memory list stays
    /// authoritative either way.
    fn persist(state: &TodoState, env: &TodoEnvironment) -> SmallVec<[Effect<TodoAction>; 4]> {
        let tasks = state.tasks.clone();
        let snapshots = Arc::clone(&env.snapshots);
        let expires_at = env.clock.now() + Duration::days(COOKIE_TTL_DAYS);
        smallvec![Effect::Future(Box::pin(async move {
            if let Err(error) = snapshots.save(&tasks, expires_at) {
                tracing::error!(%error, "failed to persist todos");
            }
            None
        }))]
    }

    /// Drop entries that violate the list invariant
    ///
    /// A snapshot written by this program never contains them, but the jar
    /// file is plain text and may have been edited by hand.
    fn sanitize(tasks: Vec<String>) -> Vec<String> {
        tasks
            .into_iter()
            .map(|task| task.trim().to_owned())
            .filter(|task| !task.is_empty())
            .collect()
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::Initialize => Self::load(env),

            TodoAction::SnapshotLoaded { tasks } => {
                state.tasks = Self::sanitize(tasks);
                tracing::info!(count = state.count(), "todo list loaded");
                SmallVec::new()
            },

            TodoAction::AddTask => {
                let Some(input) = env.prompts.request_text(ADD_TASK_PROMPT) else {
                    return SmallVec::new();
                };
                let text = input.trim();
                if text.is_empty() {
                    tracing::debug!("ignoring empty task input");
                    return SmallVec::new();
                }

                state.add_front(text.to_owned());
                Self::persist(state, env)
            },

            TodoAction::RemoveTask { index } => {
                let Some(text) = state.get(index) else {
                    tracing::debug!(index, "remove target no longer exists");
                    return SmallVec::new();
                };
                if !env.prompts.confirm(&remove_task_prompt(text)) {
                    return SmallVec::new();
                }

                state.remove(index);
                Self::persist(state, env)
            },

            TodoAction::ClearAll => {
                if !env.prompts.confirm(CLEAR_ALL_PROMPT) {
                    return SmallVec::new();
                }

                state.clear();
                Self::persist(state, env)
            },
        }
    }
}
