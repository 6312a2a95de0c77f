//! Pure view projection of the todo list.
//!
//! The view is derived from state on every render; it is never rebuilt from
//! previously displayed output. The counter is part of the same projection,
//! so the displayed count can never drift from the rendered list.

use crate::types::TodoState;

/// Placeholder shown in the list container when there are no tasks
pub const EMPTY_MESSAGE: &str = "No tasks yet. Press n to add your first task!";

/// Snapshot of what the UI should display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskListView {
    /// One entry per task, display order (newest first)
    pub items: Vec<String>,
    /// Number of tasks (the counter display)
    pub count: usize,
}

impl TaskListView {
    /// Project the current state into a view
    #[must_use]
    pub fn project(state: &TodoState) -> Self {
        Self {
            items: state.tasks.clone(),
            count: state.count(),
        }
    }

    /// Whether the placeholder replaces the entries
    #[must_use]
    pub fn shows_placeholder(&self) -> bool {
        self.items.is_empty()
    }

    /// Renderable lines for the list container
    ///
    /// Entries are numbered so the user can pick one to remove.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        if self.shows_placeholder() {
            vec![EMPTY_MESSAGE.to_owned()]
        } else {
            self.items
                .iter()
                .enumerate()
                .map(|(i, text)| format!("{:>3}. {text}", i + 1))
                .collect()
        }
    }

    /// Renderable line for the counter display
    #[must_use]
    pub fn counter_line(&self) -> String {
        format!("Tasks: {}", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(texts: &[&str]) -> TodoState {
        TodoState {
            tasks: texts.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    #[test]
    fn projection_preserves_order() {
        let view = TaskListView::project(&state_with(&["write report", "buy milk"]));

        assert_eq!(view.items, vec!["write report", "buy milk"]);
        assert_eq!(view.count, 2);
        assert!(!view.shows_placeholder());
    }

    #[test]
    fn empty_state_shows_placeholder() {
        let view = TaskListView::project(&TodoState::new());

        assert!(view.shows_placeholder());
        assert_eq!(view.lines(), vec![EMPTY_MESSAGE.to_owned()]);
        assert_eq!(view.count, 0);
    }

    #[test]
    fn lines_are_numbered_from_one() {
        let view = TaskListView::project(&state_with(&["newest", "oldest"]));

        assert_eq!(view.lines(), vec!["  1. newest", "  2. oldest"]);
    }

    #[test]
    fn projection_is_stable_without_mutation() {
        let state = state_with(&["a"]);

        let first = TaskListView::project(&state);
        let second = TaskListView::project(&state);

        assert_eq!(first, second);
        assert_eq!(first.counter_line(), "Tasks: 1");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // The counter always equals the number of rendered entries
            #[test]
            fn count_matches_rendered_entries(
                texts in proptest::collection::vec(".+", 0..16)
            ) {
                let state = TodoState { tasks: texts };
                let view = TaskListView::project(&state);

                prop_assert_eq!(view.count, view.items.len());
                if view.shows_placeholder() {
                    prop_assert_eq!(view.lines().len(), 1);
                } else {
                    prop_assert_eq!(view.lines().len(), view.count);
                }
            }
        }
    }
}
