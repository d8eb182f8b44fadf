#![forbid(unsafe_code)]

mod cmd;
mod intent;
mod output;
mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tasklist_core::config::{self, Config, ConfigError};
use tasklist_core::error::ErrorCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "todo: a single-screen terminal to-do list",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read configuration from this file instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Open the to-do list (default)",
        long_about = "Open the full-screen to-do list. Tasks live in memory until you quit.",
        after_help = "KEYS:\n    enter      add task / save edit\n    tab        switch between input and list\n    space, x   toggle done\n    e          edit title in place\n    esc        cancel edit\n    d          delete task\n    q          quit"
    )]
    Ui,

    #[command(
        about = "Apply a script of intents and print the resulting list",
        long_about = "Read one intent per line from a file or stdin, apply them to an empty list, and print the final tasks and any notices.",
        after_help = "EXAMPLES:\n    # Replay a script\n    printf 'add Buy milk\\ntoggle 1\\n' | todo replay\n\n    # Emit machine-readable output\n    todo replay --file script.txt --format json"
    )]
    Replay(cmd::replay::ReplayArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    todo completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

impl Commands {
    /// The TUI owns the terminal, so its logs go to a file.
    const fn logs_to_file(&self) -> bool {
        matches!(self, Self::Ui)
    }

    fn output_mode(&self) -> OutputMode {
        match self {
            Self::Replay(args) => output::resolve_output_mode(args.format, args.json),
            Self::Ui | Self::Completions(_) => OutputMode::Pretty,
        }
    }
}

fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env("TASKLIST_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "tasklist=debug,tasklist_core=debug,tasklist_cli=debug,info"
        } else {
            "tasklist_core=info,tasklist_cli=info,warn"
        })
    })
}

fn log_file() -> Option<fs::File> {
    let dir = dirs::state_dir().or_else(dirs::cache_dir)?.join("tasklist");
    fs::create_dir_all(&dir).ok()?;
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tasklist.log"))
        .ok()
}

fn init_tracing(verbose: bool, to_file: bool) {
    let filter = log_filter(verbose);
    let format = env::var("TASKLIST_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    if to_file {
        // No log file: stay silent rather than draw over the TUI.
        let Some(file) = log_file() else {
            return;
        };
        let writer = Mutex::new(file);
        match format.as_str() {
            "json" => registry
                .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                .init(),
            _ => registry
                .with(fmt::layer().compact().with_ansi(false).with_writer(writer))
                .init(),
        }
        return;
    }

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Map a command failure onto the structured error shown to the user.
fn cli_error(err: &anyhow::Error) -> CliError {
    if let Some(replay) = err.downcast_ref::<cmd::replay::ReplayError>() {
        return CliError::with_code(replay.to_string(), ErrorCode::InvalidReplayLine);
    }
    if let Some(config) = err.downcast_ref::<ConfigError>() {
        return CliError::with_code(config.to_string(), config.code());
    }
    if err.downcast_ref::<std::io::Error>().is_some() {
        return CliError::with_code(format!("{err:#}"), ErrorCode::TerminalIo);
    }
    CliError::new(format!("{err:#}"))
}

fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::Ui => tui::run_ui(config),
        Commands::Replay(args) => cmd::replay::run_replay(&args, config),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ui);
    init_tracing(cli.verbose, command.logs_to_file());

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let mode = command.output_mode();
    let result = config::load_config(cli.config.as_deref())
        .map_err(anyhow::Error::from)
        .and_then(|config| run(command, &config));

    if let Err(err) = result {
        tracing::debug!(error = ?err, "command failed");
        let stderr = std::io::stderr();
        output::render_error(&mut stderr.lock(), mode, &cli_error(&err))?;
        std::process::exit(1);
    }
    Ok(())
}
