// Repository Inspector - runs the command table against a control directory
use futures::future::join_all;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::constants::{
    BRANCH, COMMITS, DEFAULT_GIT_BINARY, DESCRIBE_BRANCH_PREFIX, GIT_DIR_FLAG, HASH, HASH_FULL,
    LAST_COMMIT, VERSION, VERSION_DASHED,
};
use super::formatter::{derivation, format_output, Derivations};
use crate::domain::repository::{
    empty_result_set, CONTROL_DIR_NAME, HEAD_FILE, INDEX_FILE, RESERVED_KEYS,
};
use crate::domain::value::field_text;
use crate::domain::{
    parse_head_branch, CommandTable, FieldValue, GitCommand, Record, RepositoryInfo, Transform,
};
use crate::error::{AppError, Result};
use crate::port::{Encoding, FileAccess, ProcessRunner, RunError, RunOptions};

/// What to do when a command cannot be run at all (binary missing, spawn error)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnFailurePolicy {
    /// Fail the whole inspection once every command has finished
    #[default]
    AbortBatch,
    /// Record the failed command as `null` and keep the other results
    NullField,
}

impl FromStr for SpawnFailurePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "abort" => Ok(SpawnFailurePolicy::AbortBatch),
            "null" => Ok(SpawnFailurePolicy::NullField),
            other => Err(AppError::Config(format!(
                "Unknown spawn failure policy '{}' (expected 'abort' or 'null')",
                other
            ))),
        }
    }
}

/// Default command table: branch, hash, hashFull, commits, lastCommit
pub fn default_commands() -> CommandTable {
    CommandTable::new()
        .with(
            GitCommand::new(BRANCH, "describe --all")
                .with_transform(Transform::replace(DESCRIBE_BRANCH_PREFIX, "")),
        )
        .with(GitCommand::new(HASH, "rev-parse --short HEAD"))
        .with(GitCommand::new(HASH_FULL, "rev-parse HEAD"))
        .with(
            GitCommand::new(COMMITS, "rev-list HEAD --count")
                .with_transform(Transform::Integer),
        )
        .with(
            GitCommand::new(LAST_COMMIT, "log -n 1 --date=rfc2822 --pretty=format:%cd")
                .with_transform(Transform::Rfc2822Date),
        )
}

/// Default derivations: `versionDashed` and `version`
pub fn default_repo_derivations() -> Derivations {
    let mut derivations = Derivations::new();
    derivations.insert(
        VERSION_DASHED.to_string(),
        derivation(|r| {
            format!(
                "{}-{}-{}",
                field_text(r, BRANCH),
                field_text(r, COMMITS),
                field_text(r, HASH)
            )
            .into()
        }),
    );
    derivations.insert(
        VERSION.to_string(),
        derivation(|r| {
            format!(
                "{}-{} [{}]",
                field_text(r, BRANCH),
                field_text(r, COMMITS),
                field_text(r, HASH)
            )
            .into()
        }),
    );
    derivations
}

/// Repository Inspector configuration
#[derive(Clone)]
pub struct RepoInspectorConfig {
    /// `true`: the inspected path contains `.git`; `false`: it is the control directory
    pub is_container: bool,
    pub git_binary: String,
    pub commands: CommandTable,
    pub derivations: Derivations,
    pub spawn_failure: SpawnFailurePolicy,
    pub run_options: RunOptions,
}

impl Default for RepoInspectorConfig {
    fn default() -> Self {
        Self {
            is_container: true,
            git_binary: DEFAULT_GIT_BINARY.to_string(),
            commands: default_commands(),
            derivations: default_repo_derivations(),
            spawn_failure: SpawnFailurePolicy::default(),
            run_options: RunOptions::default(),
        }
    }
}

impl fmt::Debug for RepoInspectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoInspectorConfig")
            .field("is_container", &self.is_container)
            .field("git_binary", &self.git_binary)
            .field("commands", &self.commands)
            .field("derivations", &self.derivations.keys().collect::<Vec<_>>())
            .field("spawn_failure", &self.spawn_failure)
            .field("run_options", &self.run_options)
            .finish()
    }
}

impl RepoInspectorConfig {
    /// Reject configurations whose output keys would be ambiguous
    pub fn validate(&self) -> Result<()> {
        if self.git_binary.trim().is_empty() {
            return Err(AppError::Config("Git binary must not be empty".to_string()));
        }

        for command in self.commands.iter() {
            if command.args().is_empty() {
                return Err(AppError::Config(format!(
                    "Command '{}' has an empty template",
                    command.name
                )));
            }
            if RESERVED_KEYS.contains(&command.name.as_str()) {
                return Err(AppError::Config(format!(
                    "Command name '{}' is reserved",
                    command.name
                )));
            }
        }

        let sentinels = empty_result_set();
        for name in self.derivations.keys() {
            if RESERVED_KEYS.contains(&name.as_str()) {
                return Err(AppError::Config(format!(
                    "Derived field name '{}' is reserved",
                    name
                )));
            }
            if self.commands.get(name).is_some() {
                return Err(AppError::Config(format!(
                    "Derived field '{}' collides with a command of the same name",
                    name
                )));
            }
            // A repository without history always carries these raw keys
            if name == BRANCH || sentinels.contains_key(name) {
                return Err(AppError::Config(format!(
                    "Derived field '{}' collides with a field of repositories without commits",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Per-command outcome of the fan-out
#[derive(Debug)]
enum CommandOutcome {
    Value(FieldValue),
    /// Nonzero exit or killed by a signal
    Skipped,
    Fault(RunError),
}

/// Repository Inspector
///
/// Detects repository and history presence, then queries the repository
/// through the configured command table.
pub struct RepositoryInspector {
    runner: Arc<dyn ProcessRunner>,
    files: Arc<dyn FileAccess>,
    config: RepoInspectorConfig,
}

impl RepositoryInspector {
    /// Create a new repository inspector
    ///
    /// # Errors
    /// AppError::Config if `config` fails validation
    ///
    /// # Example
    /// ```ignore
    /// let inspector = RepositoryInspector::new(
    ///     Arc::new(TokioProcessRunner::new(Arc::new(SystemTimeProvider))),
    ///     Arc::new(LocalFileAccess::new()),
    ///     RepoInspectorConfig::default(),
    /// )?;
    /// let info = inspector.inspect(Path::new(".")).await?;
    /// ```
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        files: Arc<dyn FileAccess>,
        config: RepoInspectorConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            runner,
            files,
            config,
        })
    }

    pub fn config(&self) -> &RepoInspectorConfig {
        &self.config
    }

    /// Control directory for a given inspected path
    pub fn control_dir(&self, repo_root: &Path) -> PathBuf {
        if self.config.is_container {
            repo_root.join(CONTROL_DIR_NAME)
        } else {
            repo_root.to_path_buf()
        }
    }

    /// Inspect the repository at `repo_root`
    ///
    /// Algorithm:
    /// 1. No `HEAD` in the control directory: `{isRepo: false, hasCommits: false}`
    /// 2. `HEAD` but no `index`: sentinels plus the branch named by `HEAD`
    /// 3. Both: run every command concurrently, nonzero exits become `null`
    ///
    /// Derived fields are computed in cases 2 and 3.
    ///
    /// # Errors
    /// - AppError::Io on filesystem faults other than "not found" / "permission denied"
    /// - AppError::Domain if `HEAD` names no branch in case 2
    /// - AppError::Process if a command could not run under `SpawnFailurePolicy::AbortBatch`
    pub async fn inspect(&self, repo_root: &Path) -> Result<RepositoryInfo> {
        let control_dir = self.control_dir(repo_root);

        info!(
            repo_root = %repo_root.display(),
            control_dir = %control_dir.display(),
            "Inspecting repository"
        );

        let is_repo = self.files.exists(&control_dir.join(HEAD_FILE)).await?;
        let has_commits = self.files.exists(&control_dir.join(INDEX_FILE)).await?;

        if !is_repo {
            info!(repo_root = %repo_root.display(), "No repository found");
            return Ok(RepositoryInfo::not_a_repo());
        }

        let fields = if has_commits {
            self.run_commands(&control_dir).await?
        } else {
            self.empty_fields(&control_dir).await?
        };
        let formatted = format_output(Some(&fields), &self.config.derivations);

        info!(
            repo_root = %repo_root.display(),
            has_commits = %has_commits,
            fields = fields.len(),
            "Repository inspection complete"
        );

        Ok(RepositoryInfo {
            is_repo,
            has_commits,
            fields,
            formatted,
        })
    }

    /// Record for a repository without history
    async fn empty_fields(&self, control_dir: &Path) -> Result<Record> {
        let mut fields: Record = self
            .config
            .commands
            .names()
            .map(|name| (name.to_string(), FieldValue::Null))
            .collect();
        fields.extend(empty_result_set());

        let head = self
            .files
            .read_to_string(&control_dir.join(HEAD_FILE))
            .await?;
        let branch = parse_head_branch(&head)?;
        debug!(branch = %branch, "Branch read from HEAD of empty repository");
        fields.insert(BRANCH.to_string(), FieldValue::Text(branch));

        Ok(fields)
    }

    /// Full argument vector for one command
    fn command_line(&self, control_dir: &Path, command: &GitCommand) -> Vec<String> {
        let mut line = vec![
            self.config.git_binary.clone(),
            GIT_DIR_FLAG.to_string(),
            control_dir.to_string_lossy().into_owned(),
        ];
        line.extend(command.args());
        line
    }

    async fn run_one(&self, control_dir: &Path, command: &GitCommand) -> CommandOutcome {
        let line = self.command_line(control_dir, command);
        match self
            .runner
            .run(&line, Some(Encoding::Utf8), &self.config.run_options)
            .await
        {
            Ok(result) if result.success() => {
                CommandOutcome::Value(command.process(&result.stdout.to_text()))
            }
            Ok(result) => {
                debug!(
                    command = %command.name,
                    exit_code = ?result.code,
                    signal = ?result.signal,
                    stderr = %result.stderr.to_text().trim(),
                    "Command exited unsuccessfully, using null"
                );
                CommandOutcome::Skipped
            }
            Err(err) => CommandOutcome::Fault(err),
        }
    }

    /// Fan out every command and join before assembling the record
    async fn run_commands(&self, control_dir: &Path) -> Result<Record> {
        let tasks = self.config.commands.iter().map(|command| async move {
            let outcome = self.run_one(control_dir, command).await;
            (command.name.clone(), outcome)
        });
        let outcomes = join_all(tasks).await;

        let mut fields = Record::with_capacity(outcomes.len());
        for (name, outcome) in outcomes {
            let value = match outcome {
                CommandOutcome::Value(value) => value,
                CommandOutcome::Skipped => FieldValue::Null,
                CommandOutcome::Fault(err) => match self.config.spawn_failure {
                    SpawnFailurePolicy::AbortBatch => {
                        warn!(
                            command = %name,
                            error = %err,
                            "Command failed to run, aborting inspection"
                        );
                        return Err(err.into());
                    }
                    SpawnFailurePolicy::NullField => {
                        warn!(
                            command = %name,
                            error = %err,
                            "Command failed to run, using null"
                        );
                        FieldValue::Null
                    }
                },
            };
            fields.insert(name, value);
        }

        Ok(fields)
    }
}
