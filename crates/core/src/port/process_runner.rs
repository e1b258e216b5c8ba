// Process Runner Port
// Abstraction for running one external command and collecting its output

use async_trait::async_trait;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Text decoding applied to collected output bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8, invalid sequences replaced with U+FFFD
    Utf8,
    /// ISO-8859-1, one char per byte
    Latin1,
}

impl Encoding {
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

/// Collected stream contents, raw or decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamData {
    Bytes(Vec<u8>),
    Text(String),
}

impl StreamData {
    pub fn new(bytes: Vec<u8>, encoding: Option<Encoding>) -> Self {
        match encoding {
            Some(encoding) => StreamData::Text(encoding.decode(&bytes)),
            None => StreamData::Bytes(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            StreamData::Bytes(bytes) => bytes,
            StreamData::Text(text) => text.as_bytes(),
        }
    }

    /// Text view; raw bytes are decoded lossily as UTF-8
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            StreamData::Bytes(bytes) => String::from_utf8_lossy(bytes),
            StreamData::Text(text) => Cow::Borrowed(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl Default for StreamData {
    fn default() -> Self {
        StreamData::Bytes(Vec::new())
    }
}

/// Outcome of a process that ran to termination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code; `None` when terminated by a signal
    pub code: Option<i32>,
    /// Terminating signal name (e.g. `SIGKILL`)
    pub signal: Option<String>,
    pub stdout: StreamData,
    pub stderr: StreamData,
    /// Every chunk of stdout and stderr in arrival order
    pub stdall: StreamData,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Accumulates output chunks for one process
#[derive(Debug, Default)]
pub struct OutputBuffers {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    stdall: Vec<u8>,
}

impl OutputBuffers {
    pub fn push_stdout(&mut self, chunk: &[u8]) {
        self.stdout.extend_from_slice(chunk);
        self.stdall.extend_from_slice(chunk);
    }

    pub fn push_stderr(&mut self, chunk: &[u8]) {
        self.stderr.extend_from_slice(chunk);
        self.stdall.extend_from_slice(chunk);
    }

    /// Snapshot the buffers into a result
    pub fn to_result(
        &self,
        code: Option<i32>,
        signal: Option<String>,
        encoding: Option<Encoding>,
    ) -> CommandResult {
        CommandResult {
            code,
            signal,
            stdout: StreamData::new(self.stdout.clone(), encoding),
            stderr: StreamData::new(self.stderr.clone(), encoding),
            stdall: StreamData::new(self.stdall.clone(), encoding),
        }
    }
}

/// Per-invocation options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub current_dir: Option<PathBuf>,
    /// Extra environment variables (subject to the runner's allowlist)
    pub env: HashMap<String, String>,
    /// Kill the process after this long; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

/// Runner-level failures (distinct from a nonzero exit code)
///
/// Every variant produced after spawning carries the output collected so far.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Spawn failed for '{program}': {source}")]
    Spawn {
        program: String,
        partial: CommandResult,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error while running '{program}': {source}")]
    Io {
        program: String,
        partial: CommandResult,
        #[source]
        source: std::io::Error,
    },

    #[error("Process '{program}' timed out after {timeout_ms}ms")]
    Timeout {
        program: String,
        partial: CommandResult,
        timeout_ms: u64,
    },
}

impl RunError {
    /// Output collected before the failure
    pub fn partial(&self) -> Option<&CommandResult> {
        match self {
            RunError::EmptyCommand => None,
            RunError::Spawn { partial, .. }
            | RunError::Io { partial, .. }
            | RunError::Timeout { partial, .. } => Some(partial),
        }
    }
}

/// Process Runner trait
///
/// Implementations:
/// - TokioProcessRunner: spawns a real child process
/// - MockProcessRunner: scripted responses for tests
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `command[0]` with `command[1..]` as arguments and wait for it to exit
    ///
    /// Output is decoded with `encoding`, or kept as raw bytes when `None`.
    ///
    /// # Errors
    /// - RunError::EmptyCommand if `command` is empty
    /// - RunError::Spawn if the process cannot be started
    /// - RunError::Io if reading its output fails
    /// - RunError::Timeout if `options.timeout` elapses
    async fn run(
        &self,
        command: &[String],
        encoding: Option<Encoding>,
        options: &RunOptions,
    ) -> Result<CommandResult, RunError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scripted process behavior
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        /// Process exits with the given code and output
        Exit {
            code: i32,
            stdout: String,
            stderr: String,
        },
        /// Process cannot be spawned
        SpawnError(String),
    }

    impl MockResponse {
        pub fn ok(stdout: impl Into<String>) -> Self {
            MockResponse::Exit {
                code: 0,
                stdout: stdout.into(),
                stderr: String::new(),
            }
        }

        pub fn fail(code: i32, stderr: impl Into<String>) -> Self {
            MockResponse::Exit {
                code,
                stdout: String::new(),
                stderr: stderr.into(),
            }
        }
    }

    /// Mock ProcessRunner matching on the trailing arguments of a command
    ///
    /// Unmatched commands exit with code 1.
    #[derive(Default)]
    pub struct MockProcessRunner {
        responses: Vec<(Vec<String>, MockResponse)>,
        calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl MockProcessRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Respond to any command ending in `args` (space separated)
        pub fn on(mut self, args: &str, response: MockResponse) -> Self {
            let suffix = args.split(' ').map(str::to_string).collect();
            self.responses.push((suffix, response));
            self
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockProcessRunner {
        async fn run(
            &self,
            command: &[String],
            encoding: Option<Encoding>,
            _options: &RunOptions,
        ) -> Result<CommandResult, RunError> {
            let program = command.first().ok_or(RunError::EmptyCommand)?;
            self.calls.lock().unwrap().push(command.to_vec());

            let response = self
                .responses
                .iter()
                .find(|(suffix, _)| command.ends_with(suffix))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| MockResponse::fail(1, "unknown command"));

            let mut buffers = OutputBuffers::default();
            match response {
                MockResponse::Exit {
                    code,
                    stdout,
                    stderr,
                } => {
                    buffers.push_stdout(stdout.as_bytes());
                    buffers.push_stderr(stderr.as_bytes());
                    Ok(buffers.to_result(Some(code), None, encoding))
                }
                MockResponse::SpawnError(message) => Err(RunError::Spawn {
                    program: program.clone(),
                    partial: buffers.to_result(None, None, encoding),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, message),
                }),
            }
        }
    }
}
