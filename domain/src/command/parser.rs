//! Parsing of raw input lines into commands

use crate::analytics::report::AnalyticsKind;
use crate::core::string::split_first_word;

/// A parsed user line. Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank input
    Empty,
    Connect(String),
    Query(String),
    Analyze { request: String, kind: AnalyticsKind },
    /// `/analytics` with no request
    AnalyticsHelp,
    Schema,
    Session,
    History(Option<usize>),
    Clear,
    Export(Option<String>),
    Help,
    Exit,
    /// A known verb missing its required argument
    Usage { verb: String, usage: &'static str },
    Unknown(String),
    FreeText(String),
}

impl Command {
    /// Parse one input line.
    ///
    /// Slash verbs are case-insensitive; the argument is the trimmed rest of
    /// the line. Anything not starting with `/` is free text, except the bare
    /// words `exit` and `quit`.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return Command::Exit;
        }
        if !line.starts_with('/') {
            return Command::FreeText(line.to_string());
        }

        let (verb, arg) = split_first_word(line);
        let verb = verb.to_ascii_lowercase();

        match verb.as_str() {
            "/connect" => require_arg(&verb, arg, "/connect <uri>", Command::Connect),
            "/query" => require_arg(&verb, arg, "/query <question>", Command::Query),
            "/analytics" | "/analyze" => {
                if arg.is_empty() {
                    Command::AnalyticsHelp
                } else {
                    let (kind, request) = AnalyticsKind::split_request(arg);
                    if request.is_empty() {
                        Command::AnalyticsHelp
                    } else {
                        Command::Analyze {
                            request: request.to_string(),
                            kind,
                        }
                    }
                }
            }
            "/dashboard" => {
                if arg.is_empty() {
                    Command::AnalyticsHelp
                } else {
                    Command::Analyze {
                        request: arg.to_string(),
                        kind: AnalyticsKind::Dashboard,
                    }
                }
            }
            "/schema" => Command::Schema,
            "/session" => Command::Session,
            "/history" => Command::History(arg.parse().ok().filter(|n| *n > 0)),
            "/clear" => Command::Clear,
            "/export" => Command::Export(if arg.is_empty() {
                None
            } else {
                Some(arg.to_string())
            }),
            "/help" | "/h" | "/?" => Command::Help,
            "/exit" | "/quit" | "/q" => Command::Exit,
            _ => Command::Unknown(line.to_string()),
        }
    }

    /// Whether the raw input of this command is recorded in the conversation
    /// log. View commands are not, so `/clear` then `/history` shows nothing.
    pub fn is_conversational(&self) -> bool {
        matches!(
            self,
            Command::Connect(_)
                | Command::Query(_)
                | Command::Analyze { .. }
                | Command::AnalyticsHelp
                | Command::Schema
                | Command::Usage { .. }
                | Command::Unknown(_)
                | Command::FreeText(_)
        )
    }
}

fn require_arg(
    verb: &str,
    arg: &str,
    usage: &'static str,
    build: impl FnOnce(String) -> Command,
) -> Command {
    if arg.is_empty() {
        Command::Usage {
            verb: verb.to_string(),
            usage,
        }
    } else {
        build(arg.to_string())
    }
}

/// Commands listed by `/help`, with descriptions
pub const COMMAND_HELP: &[(&str, &str)] = &[
    ("/help", "Show this help message"),
    ("/connect <uri>", "Connect to a database (sqlite, postgres, mysql)"),
    ("/query <question>", "Ask a question about the current database"),
    ("/schema", "Show the cached database schema"),
    ("/session", "Show current database session info"),
    ("/analytics [kind] <request>", "Analyze data (kind: dashboard, summary, table, correlation)"),
    ("/analyze <request>", "Alias of /analytics"),
    ("/dashboard <request>", "Create an analytics dashboard"),
    ("/history [n]", "Show the last n conversation entries (default 10)"),
    ("/clear", "Clear the chat history"),
    ("/export [path]", "Export the conversation (.txt, .md or .jsonl)"),
    ("/exit or /quit", "Exit the application"),
];

/// Verbs offered for tab completion
pub const COMMAND_VERBS: &[&str] = &[
    "/help",
    "/connect",
    "/query",
    "/schema",
    "/session",
    "/analytics",
    "/analyze",
    "/dashboard",
    "/history",
    "/clear",
    "/export",
    "/exit",
    "/quit",
];
