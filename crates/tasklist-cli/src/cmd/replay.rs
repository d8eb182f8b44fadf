//! `todo replay`: apply a script of intents to a fresh list, headless.
//!
//! One intent per line:
//!
//! ```text
//! add <title>
//! toggle <id>
//! remove <id>
//! edit <id>
//! draft <id> <text>
//! cancel <id>
//! commit <id> [title]
//! ```
//!
//! `commit` without a title saves the row's current draft. Blank lines and
//! lines starting with `#` are skipped. Intents go through the same page
//! controller the TUI uses, so notices and edit-mode rules behave identically.

use crate::intent::Intent;
use crate::output::{self, OutputMode};
use crate::tui::app::{App, Notice, counter_text};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tasklist_core::config::Config;
use tasklist_core::{Task, TaskId};

/// Arguments for `todo replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Read intents from this file instead of stdin.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, hide = true)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: '{command}' expects {expected}")]
    MissingArgument {
        line: usize,
        command: String,
        expected: &'static str,
    },
    #[error("line {line}: invalid task id '{value}'")]
    InvalidId { line: usize, value: String },
}

/// Final state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub count: usize,
    pub tasks: Vec<Task>,
    pub notices: Vec<Notice>,
}

/// Parse one script line. `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// Returns [`ReplayError`] naming `line_no` for an unknown command, a missing
/// argument, or a malformed id.
pub fn parse_line(line_no: usize, raw: &str) -> Result<Option<Intent>, ReplayError> {
    let line = raw.trim_start();
    if line.trim_end().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (command, rest) = line.split_once(' ').unwrap_or((line.trim_end(), ""));
    let id = |value: &str| -> Result<TaskId, ReplayError> {
        if value.is_empty() {
            return Err(ReplayError::MissingArgument {
                line: line_no,
                command: command.to_string(),
                expected: "a task id",
            });
        }
        value.parse::<TaskId>().map_err(|_| ReplayError::InvalidId {
            line: line_no,
            value: value.to_string(),
        })
    };
    let id_and_text = |rest: &str| -> Result<(TaskId, String), ReplayError> {
        let (head, text) = rest.split_once(' ').unwrap_or((rest.trim_end(), ""));
        Ok((id(head)?, text.to_string()))
    };

    let intent = match command {
        "add" => Intent::Add(rest.to_string()),
        "toggle" => Intent::Toggle(id(rest.trim())?),
        "remove" => Intent::Remove(id(rest.trim())?),
        "edit" => Intent::StartEdit(id(rest.trim())?),
        "cancel" => Intent::CancelEdit(id(rest.trim())?),
        "draft" => {
            let (id, text) = id_and_text(rest)?;
            Intent::SetDraft(id, text)
        }
        "commit" => {
            let (id, text) = id_and_text(rest)?;
            Intent::CommitEdit(id, (!text.is_empty()).then_some(text))
        }
        other => {
            return Err(ReplayError::UnknownCommand {
                line: line_no,
                command: other.to_string(),
            });
        }
    };
    Ok(Some(intent))
}

/// Parse a whole script, stopping at the first bad line.
///
/// # Errors
///
/// Returns the first [`ReplayError`] encountered.
pub fn parse_script(script: &str) -> Result<Vec<Intent>, ReplayError> {
    script
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_line(idx + 1, line).transpose())
        .collect()
}

/// Apply intents to a fresh controller, collecting notices as they are raised.
pub fn replay(intents: Vec<Intent>, config: &Config) -> ReplayReport {
    let mut app = App::new(config);
    let mut notices = Vec::new();
    for intent in intents {
        app.apply(intent);
        if let Some(notice) = app.dismiss_notice() {
            tracing::info!(title = %notice.title, "notice raised");
            notices.push(notice);
        }
    }
    ReplayReport {
        count: app.task_count(),
        tasks: app.tasks().to_vec(),
        notices,
    }
}

/// Run `todo replay`.
///
/// # Errors
///
/// Returns an error if the script cannot be read or parsed, or output fails.
pub fn run_replay(args: &ReplayArgs, config: &Config) -> Result<()> {
    let script = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let intents = parse_script(&script)?;
    tracing::debug!(intents = intents.len(), "script parsed");
    let report = replay(intents, config);

    let mode = output::resolve_output_mode(args.format, args.json);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::render_mode(&mut out, mode, &report, render_text, render_pretty)
}

fn render_text(report: &ReplayReport, w: &mut dyn Write) -> io::Result<()> {
    for task in &report.tasks {
        writeln!(w, "{}\t{}\t{}", task.id, u8::from(task.done), task.title)?;
    }
    for notice in &report.notices {
        writeln!(w, "notice\t{}\t{}", notice.title, notice.message)?;
    }
    Ok(())
}

fn render_pretty(report: &ReplayReport, w: &mut dyn Write) -> io::Result<()> {
    output::pretty_section(w, &counter_text(report.count))?;
    for task in &report.tasks {
        let marker = if task.done { "[✓]" } else { "[ ]" };
        writeln!(w, "{marker} {:>3}  {}", task.id, task.title)?;
    }
    if !report.notices.is_empty() {
        writeln!(w)?;
        for notice in &report.notices {
            writeln!(w, "! {}: {}", notice.title, notice.message)?;
        }
    }
    Ok(())
}
