//! Blocking stdin prompts.

use std::io::{self, BufRead, Write};

use todolist_core::environment::Prompter;

/// Prompter backed by stdin/stdout
///
/// `request_text` blocks for one line of input; end-of-input counts as a
/// cancelled dialog. `confirm` accepts `y`/`yes` in any case and treats
/// everything else, including end-of-input, as a decline.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    fn read_line() -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_owned()),
            Err(error) => {
                tracing::warn!(%error, "failed to read from stdin");
                None
            },
        }
    }
}

impl Prompter for StdinPrompter {
    fn request_text(&self, message: &str) -> Option<String> {
        println!("{message}");
        print!("> ");
        let _ = io::stdout().flush();
        Self::read_line()
    }

    fn confirm(&self, message: &str) -> bool {
        println!("{message}");
        print!("[y/N] ");
        let _ = io::stdout().flush();
        Self::read_line().is_some_and(|reply| {
            let reply = reply.trim().to_ascii_lowercase();
            reply == "y" || reply == "yes"
        })
    }
}
