// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel wiring component state, messages, and
//! commands.
//!
//! Batches run strictly sequentially: each completed file's message
//! enqueues the next file, so one document is open at a time and a failed
//! file never stops the rest of the batch.

use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::Context;

use crate::logic::redact::redact_file;
use crate::models::keywords::Keywords;
use crate::ui::components::files::{self, FilesCommand, FilesModel, FilesMsg};
use crate::ui::components::keywords::{self, KeywordsEventKind, KeywordsModel, KeywordsMsg};
use crate::ui::components::log::LogModel;

/// Top-level application state.
pub struct AppModel {
    /// Keyword editor state.
    pub keywords: KeywordsModel,
    /// Selected input files.
    pub files: FilesModel,
    /// Append-only log panel contents.
    pub log: LogModel,
    /// Folder redacted copies are written into.
    pub output_dir: PathBuf,
    /// Progress of the running batch, if any.
    pub batch: Option<BatchState>,
    /// Blocking modal notice to display.
    pub notice: Option<Notice>,
    /// Latest status message for the status bar.
    pub status: Option<String>,
    /// Count of queued background commands.
    pub pending_commands: usize,
}

impl Default for AppModel {
    fn default() -> Self {
        Self {
            keywords: KeywordsModel::default(),
            files: FilesModel::default(),
            log: LogModel::default(),
            // The working directory at startup is the default destination.
            output_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            batch: None,
            notice: None,
            status: None,
            pending_commands: 0,
        }
    }
}

/// State of a batch in flight. The keyword list and output folder are
/// snapshotted when processing starts, so edits made meanwhile do not
/// affect files still in the queue.
pub struct BatchState {
    queue: VecDeque<PathBuf>,
    keywords: Vec<String>,
    output_dir: PathBuf,
    total: usize,
    succeeded: usize,
    failed: usize,
}

/// A blocking modal message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub message: String,
}

/// Application messages routed through the update function.
pub enum Msg {
    Keywords(KeywordsMsg),
    Files(FilesMsg),
    OutputDirRequested,
    OutputDirPicked(Option<PathBuf>),
    OpenOutputDirRequested,
    OutputDirOpened(Result<(), String>),
    ProcessRequested,
    FileRedacted {
        input: PathBuf,
        result: Result<PathBuf, String>,
    },
    DismissNotice,
}

/// Commands represent side-effects executed between frames.
pub enum Command {
    PickFiles,
    PickOutputDir,
    Redact {
        input: PathBuf,
        keywords: Vec<String>,
        output_dir: PathBuf,
    },
    RevealDir(PathBuf),
}

/// Update the application model and enqueue commands.
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::Keywords(m) => {
            for event in keywords::update(&mut model.keywords, m) {
                match event.kind {
                    KeywordsEventKind::Log => surface_log(model, event.message),
                    KeywordsEventKind::Info => surface_notice(model, "Info", event.message),
                    KeywordsEventKind::Warning => surface_notice(model, "Warning", event.message),
                }
            }
        }
        Msg::Files(m) => {
            let mut file_cmds = Vec::new();
            let lines = files::update(&mut model.files, m, &mut file_cmds);
            if let Some(first) = lines.first() {
                model.status = Some(first.clone());
            }
            for line in lines {
                model.log.push(line);
            }
            for c in file_cmds {
                match c {
                    FilesCommand::PickFiles => cmds.push(Command::PickFiles),
                }
            }
        }
        Msg::OutputDirRequested => cmds.push(Command::PickOutputDir),
        Msg::OutputDirPicked(Some(dir)) => {
            let line = format!("Output folder: {}", dir.display());
            model.output_dir = dir;
            surface_log(model, line);
        }
        Msg::OutputDirPicked(None) => {}
        Msg::OpenOutputDirRequested => cmds.push(Command::RevealDir(model.output_dir.clone())),
        Msg::OutputDirOpened(Ok(())) => {}
        Msg::OutputDirOpened(Err(err)) => {
            surface_log(model, format!("Failed to open output folder: {err}"));
        }
        Msg::ProcessRequested => start_batch(model, cmds),
        Msg::FileRedacted { input: _, result } => {
            match result {
                Ok(path) => {
                    if let Some(batch) = model.batch.as_mut() {
                        batch.succeeded += 1;
                    }
                    surface_log(
                        model,
                        format!("Completed: output saved as {}", path.display()),
                    );
                }
                Err(message) => {
                    if let Some(batch) = model.batch.as_mut() {
                        batch.failed += 1;
                    }
                    surface_log(model, message);
                }
            }
            advance_batch(model, cmds);
        }
        Msg::DismissNotice => model.notice = None,
    }
}

/// Execute a command on a worker thread and return the resulting message.
pub fn run_command(cmd: Command) -> Msg {
    match cmd {
        Command::PickFiles => {
            let picked = rfd::FileDialog::new()
                .set_title("Select PDF files")
                .add_filter("PDF Files", &["pdf"])
                .pick_files()
                .unwrap_or_default();
            Msg::Files(FilesMsg::Picked(picked))
        }
        Command::PickOutputDir => {
            let dir = rfd::FileDialog::new()
                .set_title("Select output folder")
                .pick_folder();
            Msg::OutputDirPicked(dir)
        }
        Command::Redact {
            input,
            keywords,
            output_dir,
        } => {
            let result = redact_file(&input, &keywords, &output_dir)
                .with_context(|| format!("Error processing {:?}", input))
                .map_err(|err| format!("{err:#}"));
            Msg::FileRedacted { input, result }
        }
        Command::RevealDir(path) => {
            Msg::OutputDirOpened(open::that(&path).map_err(|err| err.to_string()))
        }
    }
}

/// Check the Process preconditions and enqueue the first file.
fn start_batch(model: &mut AppModel, cmds: &mut Vec<Command>) {
    if model.batch.is_some() {
        return;
    }
    if model.files.is_empty() {
        surface_notice(model, "Warning", "Please select at least one PDF file.".into());
        return;
    }
    if model.keywords.is_empty() {
        surface_notice(
            model,
            "Warning",
            "Please add at least one keyword to redact.".into(),
        );
        return;
    }

    let keywords = Keywords::new(model.keywords.keywords().to_vec()).into_vec();
    let mut queue: VecDeque<PathBuf> = model.files.files().to_vec().into();
    let total = queue.len();
    surface_log(model, format!("Starting processing of {total} file(s)…"));

    if let Some(input) = queue.pop_front() {
        model.log.push(format!("Processing: {}", input.display()));
        cmds.push(Command::Redact {
            input,
            keywords: keywords.clone(),
            output_dir: model.output_dir.clone(),
        });
    }
    model.batch = Some(BatchState {
        queue,
        keywords,
        output_dir: model.output_dir.clone(),
        total,
        succeeded: 0,
        failed: 0,
    });
}

/// Enqueue the next file of the running batch, or finish it.
fn advance_batch(model: &mut AppModel, cmds: &mut Vec<Command>) {
    let Some(mut batch) = model.batch.take() else {
        return;
    };
    if let Some(input) = batch.queue.pop_front() {
        model.log.push(format!("Processing: {}", input.display()));
        cmds.push(Command::Redact {
            input,
            keywords: batch.keywords.clone(),
            output_dir: batch.output_dir.clone(),
        });
        model.batch = Some(batch);
    } else {
        surface_log(model, "All files have been processed!");
        model.notice = Some(Notice {
            title: "Done",
            message: format!(
                "Processed {} file(s): {} succeeded, {} failed.",
                batch.total, batch.succeeded, batch.failed
            ),
        });
    }
}

/// Append to the log panel and mirror into the status bar.
fn surface_log(model: &mut AppModel, message: impl Into<String>) {
    let message = message.into();
    model.status = Some(message.clone());
    model.log.push(message);
}

/// Raise a blocking modal and mirror into the status bar.
fn surface_notice(model: &mut AppModel, title: &'static str, message: String) {
    model.status = Some(message.clone());
    model.notice = Some(Notice { title, message });
}
