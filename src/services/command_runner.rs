use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::{CommandOutput, CommandSpec};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{command}' timed out after {timeout_secs}s")]
    TimedOut { command: String, timeout_secs: u64 },
    #[error("'{command}' was cancelled")]
    Cancelled { command: String },
}

/// Runs external processes. Deployment tools depend on this, not on tokio.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, spec: &CommandSpec, cancel: &CancellationToken) -> Result<CommandOutput, CommandError>;
}

#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandExecutor for CommandRunner {
    /// The child is killed when the timeout elapses or the token fires.
    async fn run(&self, spec: &CommandSpec, cancel: &CancellationToken) -> Result<CommandOutput, CommandError> {
        let line = spec.display_line();
        debug!("Running {} [{}]", spec.name, line);

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        let started = Instant::now();
        let child = command.spawn().map_err(|source| CommandError::Spawn {
            command: line.clone(),
            source,
        })?;

        // Dropping the pending future drops the child, and kill_on_drop reaps it.
        let output = tokio::select! {
            result = child.wait_with_output() => result.map_err(|source| CommandError::Spawn {
                command: line.clone(),
                source,
            })?,
            _ = tokio::time::sleep(self.timeout) => {
                warn!("{} timed out after {:?}", line, self.timeout);
                return Err(CommandError::TimedOut {
                    command: line,
                    timeout_secs: self.timeout.as_secs(),
                });
            }
            _ = cancel.cancelled() => {
                warn!("{} cancelled", line);
                return Err(CommandError::Cancelled { command: line });
            }
        };

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            "{} exited with {} in {}ms",
            line, result.exit_code, result.duration_ms
        );
        Ok(result)
    }
}
