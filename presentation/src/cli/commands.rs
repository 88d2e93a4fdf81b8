//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for dbchat
#[derive(Parser, Debug)]
#[command(name = "dbchat")]
#[command(author, version, about = "Chat with your database in natural language")]
#[command(long_about = r#"
dbchat is an interactive assistant for relational databases. Connect with a
URI, then ask questions in plain language; a model translates them into SQL,
runs them, and summarizes the result.

REPL commands:
  /connect <uri>        Connect (sqlite:///path.db, postgresql://..., mysql://...)
  /query <question>     Ask a question about the data
  /analytics <request>  Dashboards, distributions, correlations
  /schema  /session  /history [n]  /clear  /export [path]  /help  /exit

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./dbchat.toml       Project-level config
3. ~/.config/dbchat/config.toml   Global config

Example:
  dbchat --connect sqlite:///shop.db
  dbchat -m gpt-4o --no-sandbox
"#)]
pub struct Cli {
    /// Model used to interpret questions
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Attempts per request before giving up
    #[arg(long, value_name = "N")]
    pub max_steps: Option<usize>,

    /// Allow statements that modify data
    #[arg(long)]
    pub no_sandbox: bool,

    /// Connect to this database on startup
    #[arg(long, value_name = "URI")]
    pub connect: Option<String>,

    /// Directory for /export files
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Append a JSONL transcript of delegate activity to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "dbchat",
            "-m",
            "gpt-4o",
            "--max-steps",
            "5",
            "--no-sandbox",
            "--connect",
            "sqlite:///shop.db",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cli.max_steps, Some(5));
        assert!(cli.no_sandbox);
        assert_eq!(cli.connect.as_deref(), Some("sqlite:///shop.db"));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dbchat"]).unwrap();
        assert!(cli.model.is_none());
        assert!(!cli.no_sandbox);
        assert!(cli.export_dir.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_rejects_non_numeric_steps() {
        assert!(Cli::try_parse_from(["dbchat", "--max-steps", "many"]).is_err());
    }
}
