//! CLI entrypoint for dbchat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use dbchat_application::{
    AgentDispatcher, ChatController, ConversationLogger, ExportSettings, LlmInterpreter,
    NoConversationLogger, NoProgress, ProgressNotifier, expand_home,
};
use dbchat_infrastructure::{
    ConfigLoader, FileConfig, FileConversationExporter, JsonlConversationLogger,
    OpenAiLlmGateway, OpenAiSettings, SqlxConnector,
};
use dbchat_presentation::{ChatRepl, Cli, ProgressReporter, ReplConfig, SimpleProgress};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    apply_cli_overrides(&mut config, &cli);

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(&cli, config.logging.file.as_deref())?;

    info!("Starting dbchat");

    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("Config: {}", issue.error);
    }
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.error.to_string())
        .collect();
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }

    let openai = &config.providers.openai;
    let Some(api_key) = openai.resolve_api_key() else {
        bail!(
            "No API key found. Set {} or providers.openai.api_key in the config file.",
            openai.api_key_env
        );
    };

    // === Dependency Injection ===
    let gateway = Arc::new(OpenAiLlmGateway::new(
        api_key,
        OpenAiSettings {
            base_url: openai.base_url.clone(),
            temperature: config.model.temperature,
            max_tokens: Some(openai.max_tokens),
            timeout: Duration::from_secs(openai.timeout_seconds),
            history_turns: config.model.history_turns,
        },
    )?);
    let model = config.model.name.clone();
    let interpreter = Arc::new(LlmInterpreter::new(gateway, model.clone()));

    let transcript: Arc<dyn ConversationLogger> = match config.logging.transcript.as_deref() {
        Some(path) => match JsonlConversationLogger::open(expand_home(path)) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoConversationLogger),
        },
        None => Arc::new(NoConversationLogger),
    };

    let params = config.agent.to_params();
    info!(
        "Model: {}, max steps: {}, sandbox: {}",
        model, params.max_steps, params.sandbox
    );
    let connector = SqlxConnector::new().read_only(params.sandbox);
    let dispatcher = AgentDispatcher::new(Arc::new(connector), interpreter.clone(), params)
        .with_conversation_logger(transcript);

    let progress: Arc<dyn ProgressNotifier> = if !config.repl.show_progress || cli.quiet {
        Arc::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(SimpleProgress)
    };

    let controller = ChatController::new(
        dispatcher,
        interpreter,
        Arc::new(FileConversationExporter::new()),
    )
    .with_classifier(config.routing.parse_classifier().0)
    .with_progress(progress)
    .with_export_settings(ExportSettings {
        directory: expand_home(&config.export.directory),
        format: config.export.parse_format().0,
    })
    .with_history_display(config.repl.history_display);

    let repl_config = ReplConfig {
        history_file: config.repl.history_file.as_deref().map(expand_home),
        startup_line: cli.connect.as_ref().map(|uri| format!("/connect {}", uri)),
    };

    let mut repl = ChatRepl::new(controller, model.to_string()).with_config(repl_config);
    repl.run().await?;

    Ok(())
}

/// Command-line flags take precedence over every config source
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.model.name = model.parse().unwrap_or_default();
    }
    if let Some(steps) = cli.max_steps {
        config.agent.max_steps = steps;
    }
    if cli.no_sandbox {
        config.agent.sandbox = false;
    }
    if let Some(dir) = &cli.export_dir {
        config.export.directory = dir.display().to_string();
    }
    if let Some(path) = &cli.transcript {
        config.logging.transcript = Some(path.display().to_string());
    }
}

/// Log to stderr, or to a daily-rolling file when one is configured.
/// `RUST_LOG` wins over the `-v` count.
fn init_logging(cli: &Cli, file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let Some(file) = file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let path = expand_home(file);
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let prefix = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dbchat.log".to_string());
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

    let appender = tracing_appender::rolling::daily(directory, prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}
