//! Block execution through a shell.
//!
//! A block's code is written to a temp file named with its runner's extension,
//! the runner's command template is rendered with that path, and the command
//! line is sent to a shell wrapped in a `{ ... }` group so the whole block runs
//! as a single unit. Shell output is forwarded line by line to a channel.
//!
//! With reuse enabled the same shell session serves every run. It is created
//! on first use and replaced once it has exited.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, RwLock};

use tempfile::TempPath;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, Mutex};

use crate::blocks::Block;
use crate::runners::RunnerDef;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("no runner configured for language '{0}'")]
    UnknownRunner(String),

    #[error("failed to write block to {path}: {source}")]
    TempFile { path: PathBuf, source: io::Error },

    #[error("failed to start shell '{shell}': {source}")]
    Spawn { shell: String, source: io::Error },

    #[error("failed to send command to shell: {0}")]
    Write(#[source] io::Error),

    #[error("shell input is closed")]
    Closed,
}

/// Which pipe a line of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// One line printed by the shell or the programs it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: Stream,
    pub text: String,
}

pub type OutputSender = mpsc::UnboundedSender<OutputLine>;

/// Where a session's output currently goes. Shared with its forwarding tasks.
type OutputTarget = Arc<RwLock<OutputSender>>;

/// A running shell reading commands from a pipe.
#[derive(Debug)]
pub struct ShellSession {
    child: Child,
    stdin: Option<ChildStdin>,
    output: OutputTarget,
}

impl ShellSession {
    /// Start `shell`, forwarding its output to `output`.
    pub fn spawn(shell: &str, cwd: Option<&Path>, output: OutputSender) -> Result<Self, ExecError> {
        let mut command = Command::new(shell);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            shell: shell.to_string(),
            source,
        })?;

        let output = Arc::new(RwLock::new(output));
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, Stream::Stdout, Arc::clone(&output)));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, Stream::Stderr, Arc::clone(&output)));
        }

        tracing::info!(shell, pid = child.id(), "started shell session");
        Ok(Self {
            stdin: child.stdin.take(),
            child,
            output,
        })
    }

    /// Send further output to `output` instead.
    pub fn redirect_output(&self, output: OutputSender) {
        let mut target = self.output.write().unwrap_or_else(|e| e.into_inner());
        *target = output;
    }

    /// True while the shell is running and still accepts input.
    pub fn is_alive(&mut self) -> bool {
        self.stdin.is_some() && matches!(self.child.try_wait(), Ok(None))
    }

    /// Write a script to the shell's input.
    pub async fn send(&mut self, script: &str) -> Result<(), ExecError> {
        let stdin = self.stdin.as_mut().ok_or(ExecError::Closed)?;
        stdin
            .write_all(script.as_bytes())
            .await
            .map_err(ExecError::Write)?;
        stdin.flush().await.map_err(ExecError::Write)
    }

    /// Close the shell's input and wait for it to finish what it was sent.
    pub async fn finish(mut self) -> io::Result<ExitStatus> {
        drop(self.stdin.take());
        self.child.wait().await
    }
}

async fn forward_lines<R>(reader: R, stream: Stream, output: OutputTarget)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(text)) = lines.next_line().await {
        let sender = output.read().unwrap_or_else(|e| e.into_inner()).clone();
        // A closed receiver drops the line; the session may be redirected later.
        let _ = sender.send(OutputLine { stream, text });
    }
}

/// How a run is carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub shell: String,
    pub reuse: bool,
    /// Working directory for newly started shells.
    pub cwd: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            reuse: true,
            cwd: None,
        }
    }
}

/// What was sent to the shell for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Temp file holding the block's code.
    pub path: PathBuf,
    /// Rendered runner command.
    pub command: String,
    /// True when an existing shell session was reused.
    pub reused: bool,
}

/// Runs blocks, owning the reusable shell session.
#[derive(Debug)]
pub struct Executor {
    session: Mutex<Option<ShellSession>>,
    temp_dir: PathBuf,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("runlens"))
    }
}

impl Executor {
    /// Executor writing block files under `temp_dir`.
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            session: Mutex::new(None),
            temp_dir: temp_dir.into(),
        }
    }

    /// Run `block` with `runner`.
    ///
    /// Returns once the command has been handed to the shell; the block's
    /// output arrives on `output`. A reused session is redirected to `output`,
    /// so output still pending from earlier runs lands there too.
    pub async fn run(
        &self,
        block: &Block,
        runner: &RunnerDef,
        options: &RunOptions,
        output: OutputSender,
    ) -> Result<Run, ExecError> {
        // Removed again if the block never reaches a shell.
        let temp = self.write_block(block, runner)?;
        let path = temp.to_path_buf();
        let quoted = shell_quote(&path.to_string_lossy());
        let command = runner.render(&quoted);
        let script = format!("{{ {command}\n}}; rm -f {quoted}\n");

        let reused = if options.reuse {
            let mut slot = self.session.lock().await;
            let reused = match slot.as_mut() {
                Some(session) => session.is_alive(),
                None => false,
            };
            if reused {
                if let Some(session) = slot.as_ref() {
                    session.redirect_output(output);
                }
            } else {
                *slot = Some(ShellSession::spawn(
                    &options.shell,
                    options.cwd.as_deref(),
                    output,
                )?);
            }
            match slot.as_mut() {
                Some(session) => session.send(&script).await?,
                None => return Err(ExecError::Closed),
            }
            reused
        } else {
            let mut session =
                ShellSession::spawn(&options.shell, options.cwd.as_deref(), output)?;
            session.send(&script).await?;
            tokio::spawn(async move {
                match session.finish().await {
                    Ok(status) => tracing::debug!(%status, "one-shot shell finished"),
                    Err(e) => tracing::warn!("failed to wait for shell: {e}"),
                }
            });
            false
        };

        // The shell deletes the file once the group has run.
        temp.keep().map_err(|e| ExecError::TempFile {
            path: path.clone(),
            source: e.error,
        })?;

        tracing::debug!(
            language = %block.language_id,
            start = block.start_line,
            end = block.end_line,
            reused,
            %command,
            "sent block to shell"
        );
        Ok(Run {
            path,
            command,
            reused,
        })
    }

    /// True when a reusable session exists and is still running.
    pub async fn has_live_session(&self) -> bool {
        self.session
            .lock()
            .await
            .as_mut()
            .is_some_and(|session| session.is_alive())
    }

    /// Drop the reusable session, killing its shell.
    pub async fn reset(&self) {
        if self.session.lock().await.take().is_some() {
            tracing::info!("closed shell session");
        }
    }

    /// Write the block's code to a fresh, uniquely named file under `temp_dir`.
    fn write_block(&self, block: &Block, runner: &RunnerDef) -> Result<TempPath, ExecError> {
        let write = || -> io::Result<TempPath> {
            std::fs::create_dir_all(&self.temp_dir)?;
            let mut file = tempfile::Builder::new()
                .prefix("block-")
                .suffix(&runner.extension)
                .tempfile_in(&self.temp_dir)?;
            file.write_all(block.code.as_bytes())?;
            file.write_all(b"\n")?;
            file.flush()?;
            Ok(file.into_temp_path())
        };
        write().map_err(|source| ExecError::TempFile {
            path: self.temp_dir.clone(),
            source,
        })
    }
}

/// Quote `s` for a POSIX shell unless it is made only of safe characters.
fn shell_quote(s: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "/._-+:,@%=".contains(c);
    if !s.is_empty() && s.chars().all(safe) {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
