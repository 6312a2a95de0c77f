//! Todo list application with cookie-style persistence.
//!
//! The whole program is one feature built on the todolist architecture:
//!
//! - An ordered list of task texts is the single source of truth
//! - Every input is a [`TodoAction`] run through [`TodoReducer`]
//! - User dialogs, the clock, and the snapshot store are injected
//!   capabilities, so every behavior is testable without a terminal
//! - The persisted snapshot is a `todos` cookie holding the URL-encoded
//!   JSON array of tasks, rewritten after every mutation
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todolist_app::{
//!     FileCookieStore, StdinPrompter, TodoAction, TodoEnvironment, TodoReducer, TodoState,
//! };
//! use todolist_core::environment::SystemClock;
//! use todolist_runtime::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let clock: Arc<dyn todolist_core::environment::Clock> = Arc::new(SystemClock);
//! let env = TodoEnvironment::new(
//!     Arc::clone(&clock),
//!     Arc::new(StdinPrompter),
//!     Arc::new(FileCookieStore::new("todos.cookie", clock)),
//! );
//! let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//! // Load whatever the last session left behind
//! store.send(TodoAction::Initialize).await?;
//!
//! // Prompt the user and add a task
//! store.send(TodoAction::AddTask).await?;
//!
//! let count = store.state(|s| s.count()).await;
//! println!("Total tasks: {count}");
//! # Ok(())
//! # }
//! ```

pub mod prompt;
pub mod reducer;
pub mod storage;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use prompt::StdinPrompter;
pub use reducer::{TodoEnvironment, TodoReducer};
pub use storage::{FileCookieStore, MemoryCookieStore, SnapshotError, SnapshotStore};
pub use types::{TodoAction, TodoState};
pub use view::TaskListView;
