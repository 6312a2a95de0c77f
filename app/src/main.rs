//! Interactive shell for the todo list.
//!
//! Reads one command per line: `n` (or Ctrl+N) adds a task, a list number
//! removes that task, `c` clears the list, `q` quits. Every command runs to
//! completion - including its prompts and the snapshot write - before the
//! next one is read.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use todolist_app::{
    FileCookieStore, StdinPrompter, TaskListView, TodoAction, TodoEnvironment, TodoReducer,
    TodoState,
};
use todolist_core::environment::SystemClock;
use todolist_runtime::Store;
use tracing_subscriber::EnvFilter;

/// Jar file used when no path is given on the command line
const DEFAULT_JAR_PATH: &str = "todos.cookie";

/// Ctrl+N as the raw control character a terminal in raw mode delivers
const CTRL_N: &str = "\u{000e}";

type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let jar_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_JAR_PATH.to_owned());

    let clock: Arc<dyn todolist_core::environment::Clock> = Arc::new(SystemClock);
    let env = TodoEnvironment::new(
        Arc::clone(&clock),
        Arc::new(StdinPrompter),
        Arc::new(FileCookieStore::new(jar_path, clock)),
    );
    let store = Store::new(TodoState::new(), TodoReducer::new(), env);

    store.send(TodoAction::Initialize).await?;
    tracing::info!("todo list loaded");
    tracing::info!("commands: n = new task (Ctrl+N), <number> = remove, c = clear all, q = quit");

    render(&store).await;

    let stdin = io::stdin();
    loop {
        print!("? ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = line.trim();
        match command {
            "" => continue,
            "q" | "quit" => break,
            "n" | "new" | CTRL_N => store.send(TodoAction::AddTask).await?,
            "c" | "clear" => store.send(TodoAction::ClearAll).await?,
            other => match other.parse::<usize>() {
                Ok(number) if number >= 1 => {
                    store
                        .send(TodoAction::RemoveTask { index: number - 1 })
                        .await?;
                },
                _ => {
                    println!("unknown command: {other}");
                    continue;
                },
            },
        }

        render(&store).await;
    }

    Ok(())
}

/// Project the current state and print the list and counter
async fn render(store: &TodoStore) {
    let view = store.state(TaskListView::project).await;
    println!();
    for line in view.lines() {
        println!("{line}");
    }
    println!("{}", view.counter_line());
    println!();
}
