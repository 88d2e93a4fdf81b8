//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::config::ReplConfig;
use dbchat_application::{ChatController, Reply};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::Path;
use tracing::debug;

/// Interactive chat REPL
pub struct ChatRepl {
    controller: ChatController,
    config: ReplConfig,
    model: String,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(controller: ChatController, model: impl Into<String>) -> Self {
        Self {
            controller,
            config: ReplConfig::default(),
            model: model.into(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL until `/exit` or end of input
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.config.history_path();
        if let Some(ref path) = history_path {
            ensure_history_dir(path);
            if rl.load_history(path).is_err() {
                debug!("No history loaded from {}", path.display());
            }
        }

        println!("{}", ConsoleFormatter::welcome(&self.model));

        let mut exiting = false;
        if let Some(line) = self.config.startup_line.take() {
            exiting = self.process_line(&line).await;
        }

        while !exiting {
            match rl.readline(&self.prompt()) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.trim());
                    }
                    exiting = self.process_line(&line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C (type /exit or press Ctrl-D to quit)");
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        self.controller.shutdown().await;

        if let Some(ref path) = history_path
            && let Err(e) = rl.save_history(path)
        {
            debug!("Failed to save history to {}: {}", path.display(), e);
        }

        Ok(())
    }

    /// Handle one line. Returns true if the REPL should exit.
    async fn process_line(&mut self, line: &str) -> bool {
        let reply = self.controller.handle_line(line).await;
        if let Some(output) = ConsoleFormatter::format(&reply) {
            println!("{}", output);
            println!();
        }
        matches!(reply, Reply::Exit)
    }

    fn prompt(&self) -> String {
        match self.controller.session().connection_uri() {
            Some(uri) => format!("dbchat [{}]> ", uri.database_name()),
            None => "dbchat> ".to_string(),
        }
    }
}

/// Create the directory holding the history file. Returns false (and logs)
/// when it cannot be created; the REPL then runs without saved history.
fn ensure_history_dir(path: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return true;
    };
    match std::fs::create_dir_all(parent) {
        Ok(()) => true,
        Err(e) => {
            debug!("Cannot create history directory {}: {}", parent.display(), e);
            false
        }
    }
}
