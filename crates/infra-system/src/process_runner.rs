// Process runner implementation
// reason: tokio::process for async child management, select! for interleaved pipe reads
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use repoinf_core::port::{
    CommandResult, Encoding, OutputBuffers, ProcessRunner, RunError, RunOptions, TimeProvider,
};

/// Pipe read size
const READ_CHUNK_SIZE: usize = 8192;

/// Process runner backed by `tokio::process`
///
/// Spawns one child per call, collects stdout and stderr separately and
/// interleaved, and waits for exit. No timeout unless `RunOptions::timeout` is set.
pub struct TokioProcessRunner {
    time_provider: Arc<dyn TimeProvider>,
    env_allowlist: Option<Vec<String>>,
}

impl TokioProcessRunner {
    /// Create a new process runner
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let runner = TokioProcessRunner::new(Arc::new(SystemTimeProvider))
    ///     .with_env_allowlist(vec!["LANG".to_string()]);
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            time_provider,
            env_allowlist: None,
        }
    }

    /// Only pass `RunOptions::env` entries whose names are listed
    pub fn with_env_allowlist(mut self, allowlist: Vec<String>) -> Self {
        self.env_allowlist = Some(allowlist);
        self
    }

    /// Filter extra environment variables through the allowlist
    fn filter_env(&self, env: &HashMap<String, String>) -> HashMap<String, String> {
        env.iter()
            .filter(|(k, _)| {
                self.env_allowlist
                    .as_ref()
                    .map_or(true, |allowlist| allowlist.contains(k))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn build_command(&self, program: &str, args: &[String], options: &RunOptions) -> Command {
        let mut command = Command::new(program);
        command
            .args(args)
            .envs(self.filter_env(&options.env))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &options.current_dir {
            command.current_dir(dir);
        }
        command
    }

    /// Drain both pipes in arrival order, then reap the child
    async fn collect_output(
        child: &mut Child,
        buffers: &mut OutputBuffers,
    ) -> io::Result<ExitStatus> {
        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();
        let mut out_chunk = [0u8; READ_CHUNK_SIZE];
        let mut err_chunk = [0u8; READ_CHUNK_SIZE];

        while stdout.is_some() || stderr.is_some() {
            tokio::select! {
                read = read_chunk(&mut stdout, &mut out_chunk), if stdout.is_some() => match read? {
                    0 => stdout = None,
                    n => buffers.push_stdout(&out_chunk[..n]),
                },
                read = read_chunk(&mut stderr, &mut err_chunk), if stderr.is_some() => match read? {
                    0 => stderr = None,
                    n => buffers.push_stderr(&err_chunk[..n]),
                },
            }
        }

        child.wait().await
    }
}

async fn read_chunk<R: AsyncRead + Unpin>(
    pipe: &mut Option<R>,
    chunk: &mut [u8],
) -> io::Result<usize> {
    match pipe {
        Some(pipe) => pipe.read(chunk).await,
        None => Ok(0),
    }
}

/// Name of the signal that terminated the process, if any
#[cfg(unix)]
fn signal_name(status: &ExitStatus) -> Option<String> {
    use nix::sys::signal::Signal;
    use std::os::unix::process::ExitStatusExt;

    status.signal().map(|raw| {
        Signal::try_from(raw)
            .map(|signal| signal.as_str().to_string())
            .unwrap_or_else(|_| raw.to_string())
    })
}

#[cfg(not(unix))]
fn signal_name(_status: &ExitStatus) -> Option<String> {
    None
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        command: &[String],
        encoding: Option<Encoding>,
        options: &RunOptions,
    ) -> Result<CommandResult, RunError> {
        let (program, args) = command.split_first().ok_or(RunError::EmptyCommand)?;
        let start_time = self.time_provider.now_millis();

        debug!(
            program = %program,
            args = ?args,
            timeout_ms = ?options.timeout.map(|t| t.as_millis()),
            "Starting process"
        );

        let mut buffers = OutputBuffers::default();
        let mut child = match self.build_command(program, args, options).spawn() {
            Ok(child) => child,
            Err(source) => {
                warn!(program = %program, error = %source, "Failed to spawn process");
                return Err(RunError::Spawn {
                    program: program.clone(),
                    partial: buffers.to_result(None, None, encoding),
                    source,
                });
            }
        };

        // None: the timeout elapsed
        let collected = match options.timeout {
            Some(limit) => {
                tokio::time::timeout(limit, Self::collect_output(&mut child, &mut buffers))
                    .await
                    .ok()
            }
            None => Some(Self::collect_output(&mut child, &mut buffers).await),
        };

        let status = match collected {
            Some(Ok(status)) => status,
            Some(Err(source)) => {
                return Err(RunError::Io {
                    program: program.clone(),
                    partial: buffers.to_result(None, None, encoding),
                    source,
                });
            }
            None => {
                let timeout_ms = options
                    .timeout
                    .map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
                warn!(program = %program, timeout_ms = %timeout_ms, "Process timed out, killing");
                if let Err(e) = child.kill().await {
                    warn!(program = %program, error = %e, "Failed to kill timed out process");
                }
                return Err(RunError::Timeout {
                    program: program.clone(),
                    partial: buffers.to_result(None, None, encoding),
                    timeout_ms,
                });
            }
        };

        let result = buffers.to_result(status.code(), signal_name(&status), encoding);
        let duration_ms = self.time_provider.now_millis() - start_time;

        info!(
            program = %program,
            duration_ms = %duration_ms,
            exit_code = ?result.code,
            signal = ?result.signal,
            "Process completed"
        );

        Ok(result)
    }
}
