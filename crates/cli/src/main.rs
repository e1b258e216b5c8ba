//! repoinf CLI - repository and platform information for banners and diagnostics

mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use output::OutputFormat;
use repoinf_core::application::constants::DEFAULT_GIT_BINARY;
use repoinf_core::application::{
    PlatformInspector, PlatformInspectorConfig, RepoInspectorConfig, RepositoryInspector,
    SpawnFailurePolicy,
};
use repoinf_core::domain::{HostFact, PlatformInfo, RepositoryInfo};
use repoinf_core::port::time_provider::SystemTimeProvider;
use repoinf_core::port::RunOptions;
use repoinf_infra_system::{LocalFileAccess, SystemHostInfo, TokioProcessRunner};

#[derive(Parser)]
#[command(name = "repoinf")]
#[command(about = "Repository and platform information", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(
        long,
        value_enum,
        global = true,
        env = "REPOINF_FORMAT",
        default_value_t = OutputFormat::Json
    )]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Show repository information
    Repo(RepoArgs),

    /// Show platform information
    Platform {
        /// Host fact to collect (repeatable)
        ///
        /// Defaults to version, uptime, platform, type, release, hostname and arch.
        #[arg(long = "fact")]
        facts: Vec<String>,
    },

    /// Show repository and platform information together
    All(RepoArgs),

    /// Print a single repository field (e.g. `version` or `isRepo`)
    Field {
        /// Field name
        name: String,

        #[command(flatten)]
        repo: RepoArgs,
    },
}

#[derive(Args)]
struct RepoArgs {
    /// Directory containing `.git` (or the control directory itself with --git-dir)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Treat PATH as the control directory
    #[arg(long)]
    git_dir: bool,

    /// Git binary
    #[arg(
        long = "git",
        env = "REPOINF_GIT_BIN",
        default_value = DEFAULT_GIT_BINARY
    )]
    git_binary: String,

    /// Kill each git command after this many milliseconds
    #[arg(long, env = "REPOINF_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// What to do when git cannot be run at all
    #[arg(
        long,
        value_enum,
        env = "REPOINF_ON_SPAWN_FAILURE",
        default_value_t = SpawnFailureArg::Abort
    )]
    on_spawn_failure: SpawnFailureArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SpawnFailureArg {
    /// Fail the whole inspection
    Abort,
    /// Report the affected fields as null
    Null,
}

impl From<SpawnFailureArg> for SpawnFailurePolicy {
    fn from(arg: SpawnFailureArg) -> Self {
        match arg {
            SpawnFailureArg::Abort => SpawnFailurePolicy::AbortBatch,
            SpawnFailureArg::Null => SpawnFailurePolicy::NullField,
        }
    }
}

impl RepoArgs {
    fn config(&self) -> RepoInspectorConfig {
        RepoInspectorConfig {
            is_container: !self.git_dir,
            git_binary: self.git_binary.clone(),
            spawn_failure: self.on_spawn_failure.into(),
            run_options: RunOptions {
                timeout: self.timeout_ms.map(Duration::from_millis),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

async fn inspect_repo(args: &RepoArgs) -> Result<RepositoryInfo> {
    let config = args.config();
    debug!(config = ?config, "Repository inspector configured");

    // DI wiring
    let time_provider = Arc::new(SystemTimeProvider);
    let inspector = RepositoryInspector::new(
        Arc::new(TokioProcessRunner::new(time_provider)),
        Arc::new(LocalFileAccess::new()),
        config,
    )
    .context("Invalid repository configuration")?;

    inspector
        .inspect(Path::new(&args.path))
        .await
        .with_context(|| format!("Failed to inspect repository at {}", args.path.display()))
}

fn inspect_platform(facts: &[String]) -> Result<PlatformInfo> {
    let mut config = PlatformInspectorConfig::new(Arc::new(SystemTimeProvider));
    if !facts.is_empty() {
        let facts = facts
            .iter()
            .map(|name| name.parse::<HostFact>())
            .collect::<Result<Vec<_>, _>>()?;
        config = config.with_facts(facts);
    }

    let inspector = PlatformInspector::new(Arc::new(SystemHostInfo::new()), config)
        .context("Invalid platform configuration")?;
    Ok(inspector.inspect())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging()?;

    let cli = Cli::parse();

    let rendered = match &cli.command {
        Commands::Repo(args) => output::render_repo(&inspect_repo(args).await?, cli.format)?,
        Commands::Platform { facts } => {
            output::render_platform(&inspect_platform(facts)?, cli.format)?
        }
        Commands::All(args) => {
            let repo = inspect_repo(args).await?;
            let platform = inspect_platform(&[])?;
            output::render_all(&repo, &platform, cli.format)?
        }
        Commands::Field { name, repo } => {
            let info = inspect_repo(repo).await?;
            info.lookup(name)
                .map(|value| value.to_string())
                .with_context(|| format!("No field '{}' in repository info", name))?
        }
    };

    println!("{}", rendered);
    Ok(())
}
