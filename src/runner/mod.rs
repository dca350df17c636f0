//! Runner process management
//!
//! One [`RunnerProcess`] is spawned per accepted chat request as
//! `<binary> run <model> <prompt>`. Its stdout is relayed line by line, its
//! stderr is drained by a background task on every path, and the process is
//! reaped when the output ends. Dropping a `RunnerProcess` early (caller went
//! away) kills the child; tokio reaps it in the background.

use axum::body::Bytes;
use futures::stream::{self, Stream};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::chat::Prompt;
use crate::config::RunnerConfig;
use crate::errors::GatewayError;
use crate::logger::{self, LogTag};

/// Subcommand passed to the runner before the model id
pub const RUN_SUBCOMMAND: &str = "run";

/// Exit code reported when the runner was terminated by a signal
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Build the argument vector (without the binary)
pub fn runner_args<'a>(config: &'a RunnerConfig, prompt: &'a Prompt) -> [&'a str; 3] {
    [RUN_SUBCOMMAND, config.model.as_str(), prompt.as_str()]
}

/// Spawn the runner for one prompt
///
/// The prompt is a single argv entry; no shell is involved.
pub fn spawn_runner(config: &RunnerConfig, prompt: &Prompt) -> Result<RunnerProcess, GatewayError> {
    let mut command = Command::new(&config.binary);
    command
        .args(runner_args(config, prompt))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| {
        logger::error(
            LogTag::Runner,
            &format!("Failed to start runner '{}': {}", config.binary, e),
        );
        GatewayError::RunnerNotFound {
            binary: config.binary.clone(),
        }
    })?;

    logger::debug(
        LogTag::Runner,
        &format!(
            "Spawned runner '{}' (pid {}) model={} prompt_chars={}",
            config.binary,
            child
                .id()
                .map(|pid| pid.to_string())
                .unwrap_or_else(|| "?".to_string()),
            config.model,
            prompt.char_len()
        ),
    );

    let stdout = child.stdout.take().map(BufReader::new);
    let stderr_task = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        })
    });

    Ok(RunnerProcess {
        binary: config.binary.clone(),
        child,
        stdout,
        stderr_task,
        finished: false,
    })
}

/// A running inference process owned by exactly one request
pub struct RunnerProcess {
    binary: String,
    child: Child,
    stdout: Option<BufReader<ChildStdout>>,
    stderr_task: Option<JoinHandle<std::io::Result<String>>>,
    finished: bool,
}

impl RunnerProcess {
    /// Next stdout line, including its terminator
    ///
    /// At end of output the process is waited on: `None` means it exited
    /// successfully, `Some(Err(RunnerFailed))` carries the exit code and
    /// stderr. Every call after that returns `None`.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes, GatewayError>> {
        if self.finished {
            return None;
        }

        let Some(stdout) = self.stdout.as_mut() else {
            self.finished = true;
            return self.finish().await.err().map(Err);
        };

        let mut line = Vec::new();
        let read = stdout.read_until(b'\n', &mut line).await;
        match read {
            Ok(0) => {
                // Close our end before waiting, like a pipe reader would
                self.stdout = None;
                self.finished = true;
                self.finish().await.err().map(Err)
            }
            Ok(_) => {
                logger::verbose(
                    LogTag::Runner,
                    &format!("Runner produced {} bytes", line.len()),
                );
                Some(Ok(Bytes::from(line)))
            }
            Err(e) => {
                self.finished = true;
                logger::error(
                    LogTag::Runner,
                    &format!("Failed reading runner output: {}", e),
                );
                let _ = self.child.start_kill();
                let _ = self.child.wait().await;
                Some(Err(GatewayError::RunnerIo(e)))
            }
        }
    }

    /// Wait for exit and turn a non-zero status into `RunnerFailed`
    async fn finish(&mut self) -> Result<(), GatewayError> {
        let status = self.child.wait().await?;
        let stderr = self.collect_stderr().await;

        if status.success() {
            logger::debug(
                LogTag::Runner,
                &format!("Runner '{}' exited successfully", self.binary),
            );
            if !stderr.trim().is_empty() {
                logger::verbose(LogTag::Runner, &format!("Runner stderr: {}", stderr.trim_end()));
            }
            return Ok(());
        }

        let code = status.code().unwrap_or(SIGNAL_EXIT_CODE);
        logger::error(
            LogTag::Runner,
            &format!(
                "Runner '{}' exited with code {}: {}",
                self.binary,
                code,
                stderr.trim_end()
            ),
        );

        // Only trailing whitespace is dropped; the rest of stderr is verbatim
        Err(GatewayError::RunnerFailed {
            code,
            stderr: stderr.trim_end().to_string(),
        })
    }

    async fn collect_stderr(&mut self) -> String {
        let Some(task) = self.stderr_task.take() else {
            return String::new();
        };

        match task.await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                logger::warning(LogTag::Runner, &format!("Failed reading runner stderr: {}", e));
                String::new()
            }
            Err(e) => {
                logger::warning(LogTag::Runner, &format!("Runner stderr task failed: {}", e));
                String::new()
            }
        }
    }

    /// Turn the remaining output into a stream of body chunks
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, GatewayError>> + Send + 'static {
        stream::unfold(self, |mut process| async move {
            process.next_chunk().await.map(|item| (item, process))
        })
    }
}

impl Drop for RunnerProcess {
    fn drop(&mut self) {
        if !self.finished {
            logger::debug(
                LogTag::Runner,
                &format!(
                    "Runner '{}' dropped before completion, killing it",
                    self.binary
                ),
            );
        }
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
    }
}
