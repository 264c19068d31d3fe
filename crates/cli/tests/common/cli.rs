//! CLI command execution helpers with automatic timing
//!
//! This module provides a wrapper around the `pacer` binary that measures
//! execution time and provides convenient assertion methods.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// CLI command builder with timing
pub struct PacerCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    stdin_data: Option<String>,
}

impl PacerCommand {
    /// Create a new command in the given working directory
    ///
    /// `PACER_CONFIG` points inside the working directory so the user's own
    /// config file never leaks into a test.
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        let working_dir = working_dir.as_ref().to_path_buf();
        let mut env = HashMap::new();
        env.insert(
            "PACER_CONFIG".to_string(),
            working_dir.join("pacer.toml").display().to_string(),
        );
        env.insert("RUST_LOG".to_string(), "warn".to_string());

        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_pacer")),
            working_dir,
            args: Vec::new(),
            env,
            stdin_data: None,
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Provide stdin data
    pub fn stdin(&mut self, data: &str) -> &mut Self {
        self.stdin_data = Some(data.to_string());
        self
    }

    /// Execute command and return result with timing
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let mut child = Command::new(&self.binary_path)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn pacer")?;

        // Dropping stdin closes it, so the demo sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            if let Some(data) = &self.stdin_data {
                write_stdin(&mut stdin, data)?;
            }
        }

        let output = child
            .wait_with_output()
            .context("Failed to wait for pacer")?;
        let elapsed = start.elapsed();

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: elapsed,
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stdout contains text
    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }

    /// Values shown by the demo label, in order
    pub fn label_values(&self) -> Vec<String> {
        self.stdout
            .lines()
            .filter_map(extract_label_value)
            .collect()
    }
}

/// Feed stdin to the child
///
/// A child that exits before reading (bad arguments, invalid config) closes
/// the pipe; that is reported through its exit status, not here.
fn write_stdin(stdin: &mut impl Write, data: &str) -> io::Result<()> {
    match stdin.write_all(data.as_bytes()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Extract the value from a `Last updated value is {v}.` line
pub fn extract_label_value(line: &str) -> Option<String> {
    line.trim()
        .strip_prefix("Last updated value is ")?
        .strip_suffix('.')
        .map(str::to_string)
}

/// Macro for convenient command construction
///
/// Usage:
/// ```ignore
/// pacer!(dir, "demo", "--fire-on-first").stdin("1\n2\n").assert_success()?;
/// ```
#[macro_export]
macro_rules! pacer {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::PacerCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_value_extraction() {
        assert_eq!(
            extract_label_value("Last updated value is 42."),
            Some("42".to_string())
        );
        assert_eq!(extract_label_value("something else"), None);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_stdin_tolerates_early_exit() {
        assert!(write_stdin(&mut ClosedPipe, "1\n2\n").is_ok());
    }

    #[test]
    fn test_label_values_in_order() {
        let result = CommandResult {
            stdout: "Last updated value is 1.\nLast updated value is 3.\n".to_string(),
            stderr: String::new(),
            exit_code: 0,
            duration: Duration::from_millis(10),
        };

        assert_eq!(result.label_values(), vec!["1", "3"]);
    }
}
