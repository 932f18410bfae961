/// System module: host facts and external tool execution

use crate::error::{AppError, PreflightError};
use crate::models::InterpreterVersion;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

static PYTHON_VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Python\s+(\d+)\.(\d+)(?:\.(\d+))?").expect("valid python version regex")
});

/// Milestone logging, routed to the parsed session log by target.
#[macro_export]
macro_rules! log_parsed {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        // Use target="parsed" for high-level events
        $crate::log::info!(target: "parsed", "{}", msg);
    }}
}

/// Operating system of the running build host (`std::env::consts::OS`).
pub fn host_os() -> &'static str {
    std::env::consts::OS
}

/// Extract the version from `python --version` output ("Python 3.11.4").
pub fn parse_interpreter_version(output: &str) -> Option<InterpreterVersion> {
    let caps = PYTHON_VERSION_REGEX.captures(output)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = caps
        .get(3)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some(InterpreterVersion::new(major, minor, patch))
}

/// Ask the configured interpreter for its version.
pub fn query_interpreter_version(
    runner: &dyn ToolRunner,
    interpreter: &str,
) -> Result<InterpreterVersion, PreflightError> {
    let invocation = ToolInvocation::new(interpreter).arg("--version");
    let output = runner
        .run(&invocation)
        .map_err(|e| PreflightError::InterpreterUnavailable(e.user_message()))?;

    if !output.success() {
        return Err(PreflightError::InterpreterUnavailable(format!(
            "{} exited with {}",
            invocation,
            output.describe_status()
        )));
    }

    // Older interpreters print the banner on stderr
    let combined = format!("{}\n{}", output.stdout, output.stderr);
    parse_interpreter_version(&combined).ok_or_else(|| {
        PreflightError::InterpreterUnavailable(format!(
            "Could not parse interpreter version from: {}",
            combined.trim()
        ))
    })
}

/// A single external command line.
///
/// Arguments are passed to the OS individually, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub current_dir: Option<PathBuf>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ToolInvocation {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Arguments as lossy strings, for logging and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn describe_status(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "termination by signal".to_string(),
        }
    }
}

/// Runs external tools to completion.
///
/// The production implementation spawns processes; tests substitute a
/// recorder so tool sequencing can be checked without the SDK installed.
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, AppError>;
}

/// Default production implementation of ToolRunner
///
/// Blocks until the child exits and captures its output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        ProcessRunner
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, AppError> {
        if invocation.program.as_os_str().is_empty() {
            return Err(AppError::InvalidInput("empty program name".to_string()));
        }

        log::debug!("[System] Running: {}", invocation);

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|e| AppError::OsCommand {
            cmd: invocation.to_string(),
            reason: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !stdout.trim().is_empty() {
            log::info!("[{}] stdout: {}", invocation.program.display(), stdout.trim_end());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stderr.trim().is_empty() {
            log::info!("[{}] stderr: {}", invocation.program.display(), stderr.trim_end());
        }

        Ok(ToolOutput {
            code: output.status.code(),
            stdout,
            stderr,
        })
    }
}
