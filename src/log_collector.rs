//! Decoupled logging pipeline for build runs.
//!
//! Every `log::*` call is forwarded to a background writer thread over an
//! unbounded channel, so the build never blocks on disk I/O.
//!
//! ```text
//! log::info!() ... [LogCollector] --(crossbeam channel)--> [writer thread]
//!        |                                                    |        |
//!     stderr echo                       logs/full/<ts>_full.log   logs/parsed/<ts>_parsed.log
//! ```
//!
//! Records with `target: "parsed"` are milestones: they go to both files.

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Internal log line or special marker
enum LogMessage {
    Line(LogLine),
    /// Flush marker with channel sender to signal completion
    Flush(std::sync::mpsc::Sender<()>),
}

/// Logs directory for a project: `<project_root>/logs`
pub fn get_global_logs_path(project_root: &Path) -> PathBuf {
    project_root.join("logs")
}

/// A log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub message: String,
    /// Log type: "full" or "parsed"
    pub log_type: String,
    pub timestamp: String,
}

impl LogLine {
    pub fn new(message: String) -> Self {
        LogLine {
            message,
            log_type: "full".to_string(),
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    pub fn parsed(message: String) -> Self {
        LogLine {
            log_type: "parsed".to_string(),
            ..LogLine::new(message)
        }
    }

    fn formatted(&self) -> String {
        format!("[{}] {}\n", self.timestamp, self.message)
    }
}

/// Unified logger writing session files and echoing to stderr
#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    full_log_path: PathBuf,
    parsed_log_path: PathBuf,
    /// Most verbose level echoed to stderr
    echo_level: LevelFilter,
}

impl LogCollector {
    /// Create a collector with a fresh session log pair under `log_dir`
    pub fn new(log_dir: PathBuf, echo_level: LevelFilter) -> Result<Self, String> {
        let full_log_dir = log_dir.join("full");
        let parsed_log_dir = log_dir.join("parsed");
        std::fs::create_dir_all(&full_log_dir)
            .map_err(|e| format!("Failed to create full log dir: {}", e))?;
        std::fs::create_dir_all(&parsed_log_dir)
            .map_err(|e| format!("Failed to create parsed log dir: {}", e))?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let full_log_path = full_log_dir.join(format!("{}_full.log", stamp));
        let parsed_log_path = parsed_log_dir.join(format!("{}_parsed.log", stamp));

        let mut full_file = open_append(&full_log_path)?;
        let mut parsed_file = open_append(&parsed_log_path)?;

        let (tx, rx) = unbounded::<LogMessage>();

        // Plain OS thread: independent of whichever runtime the caller uses
        std::thread::spawn(move || {
            while let Ok(msg) = rx.recv() {
                match msg {
                    LogMessage::Line(line) => {
                        let formatted = line.formatted();
                        let _ = full_file.write_all(formatted.as_bytes());
                        if line.log_type == "parsed" {
                            let _ = parsed_file.write_all(formatted.as_bytes());
                        }
                    }
                    LogMessage::Flush(done) => {
                        let _ = full_file.flush();
                        let _ = parsed_file.flush();
                        let _ = done.send(());
                    }
                }
            }
        });

        Ok(LogCollector {
            tx,
            full_log_path,
            parsed_log_path,
            echo_level,
        })
    }

    pub fn full_log_path(&self) -> &Path {
        &self.full_log_path
    }

    pub fn parsed_log_path(&self) -> &Path {
        &self.parsed_log_path
    }

    /// Send a log line (non-blocking)
    pub fn log_line(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    /// Send a simple string log
    pub fn log_str(&self, message: impl Into<String>) {
        self.log_line(LogLine::new(message.into()));
    }

    /// Send a parsed (high-level) log
    pub fn log_parsed(&self, message: impl Into<String>) {
        self.log_line(LogLine::parsed(message.into()));
    }

    /// Wait for all pending logs to be written to disk
    ///
    /// Sends a flush marker down the channel and blocks until the writer
    /// thread has processed it.
    pub fn wait_for_empty(&self) -> Result<(), String> {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        rx.recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))?;
        Ok(())
    }

    /// Register as the global `log` backend.
    pub fn install(self, max_level: LevelFilter) -> Result<(), String> {
        log::set_boxed_logger(Box::new(self))
            .map(|()| log::set_max_level(max_level))
            .map_err(|e| format!("Failed to set global logger: {}", e))
    }
}

fn open_append(path: &Path) -> Result<File, String> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))
}

/// Wires all log::info!(), log::warn!(), log::error!() calls into LogCollector
impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = format!("[{}] {}", record.level(), record.args());

        if record.level() <= self.echo_level {
            eprintln!("{}", message);
        }

        if record.target() == "parsed" {
            self.log_parsed(message);
        } else {
            self.log_str(message);
        }
    }

    fn flush(&self) {
        let _ = self.wait_for_empty();
    }
}
