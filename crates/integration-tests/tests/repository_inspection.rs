//! Repository inspection end to end
//!
//! Real filesystem and process adapters, with a shell script standing in for git
//! so results are deterministic.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use chrono::{Datelike, Timelike};
use repoinf_core::application::{RepoInspectorConfig, RepositoryInspector, SpawnFailurePolicy};
use repoinf_core::domain::{FieldValue, RepositoryInfo};
use repoinf_core::port::time_provider::SystemTimeProvider;
use repoinf_core::port::RunError;
use repoinf_core::AppError;
use repoinf_infra_system::{LocalFileAccess, TokioProcessRunner};

const FAKE_GIT: &str = r#"#!/bin/sh
[ "$1" = "--git-dir" ] || { echo "expected --git-dir" >&2; exit 129; }
[ -f "$2/HEAD" ] || { echo "fatal: not a git repository: $2" >&2; exit 128; }
shift 2
case "$*" in
  "describe --all") echo "heads/main" ;;
  "rev-parse --short HEAD") echo "abc1234" ;;
  "rev-parse HEAD") echo "abc1234def5678abc1234def5678abc1234def56" ;;
  "rev-list HEAD --count") echo "42" ;;
  "log -n 1 --date=rfc2822 --pretty=format:%cd") printf "Mon, 19 Oct 2026 10:30:00 +0200" ;;
  *) echo "unknown subcommand: $*" >&2; exit 1 ;;
esac
"#;

const FAKE_GIT_NO_TAGS: &str = r#"#!/bin/sh
shift 2
case "$*" in
  "describe --all") echo "fatal: No names found, cannot describe anything." >&2; exit 128 ;;
  "rev-parse --short HEAD") echo "fff0000" ;;
  "rev-list HEAD --count") echo "1" ;;
  *) exit 1 ;;
esac
"#;

struct FakeGits {
    ok: PathBuf,
    no_tags: PathBuf,
}

/// Scripts are written once, before any test in this binary spawns a process,
/// so no forked child can inherit an open write handle to them.
fn fake_gits() -> &'static FakeGits {
    static SCRIPTS: OnceLock<FakeGits> = OnceLock::new();
    SCRIPTS.get_or_init(|| {
        let dir = Path::new(env!("CARGO_TARGET_TMPDIR"))
            .join(format!("repoinf-fake-git-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        FakeGits {
            ok: write_script(&dir.join("git-ok"), FAKE_GIT),
            no_tags: write_script(&dir.join("git-no-tags"), FAKE_GIT_NO_TAGS),
        }
    })
}

fn write_script(path: &Path, content: &str) -> PathBuf {
    std::fs::write(path, content).unwrap();
    let executable = std::fs::Permissions::from_mode(0o755);
    std::fs::set_permissions(path, executable).unwrap();
    path.to_path_buf()
}

fn make_repo(root: &Path, with_commits: bool) {
    let control = root.join(".git");
    std::fs::create_dir_all(&control).unwrap();
    let head = "ref: refs/heads/main\n";
    std::fs::write(control.join("HEAD"), head).unwrap();
    if with_commits {
        std::fs::write(control.join("index"), b"DIRC").unwrap();
    }
}

fn inspector(git: &Path, config: RepoInspectorConfig) -> RepositoryInspector {
    RepositoryInspector::new(
        Arc::new(TokioProcessRunner::new(Arc::new(SystemTimeProvider))),
        Arc::new(LocalFileAccess::new()),
        RepoInspectorConfig {
            git_binary: git.to_string_lossy().into_owned(),
            ..config
        },
    )
    .unwrap()
}

#[tokio::test]
async fn test_directory_without_control_dir() {
    let dir = tempfile::tempdir().unwrap();

    let info = inspector(&fake_gits().ok, RepoInspectorConfig::default())
        .inspect(dir.path())
        .await
        .unwrap();

    assert_eq!(info, RepositoryInfo::not_a_repo());
    assert_eq!(
        serde_json::to_value(&info).unwrap(),
        serde_json::json!({"isRepo": false, "hasCommits": false})
    );
}

#[tokio::test]
async fn test_repository_without_commits() {
    let dir = tempfile::tempdir().unwrap();
    make_repo(dir.path(), false);

    let info = inspector(&fake_gits().ok, RepoInspectorConfig::default())
        .inspect(dir.path())
        .await
        .unwrap();

    assert!(info.is_repo);
    assert!(!info.has_commits);
    assert_eq!(info.branch(), Some("main"));
    assert_eq!(info.commits(), Some(0));
    assert_eq!(info.hash(), Some("0000000"));
    assert_eq!(info.fields["hashFull"], FieldValue::Text("0".repeat(40)));
    assert_eq!(info.version(), Some("main-0 [0000000]"));
}

#[tokio::test]
async fn test_repository_with_commits() {
    let dir = tempfile::tempdir().unwrap();
    make_repo(dir.path(), true);

    let info = inspector(&fake_gits().ok, RepoInspectorConfig::default())
        .inspect(dir.path())
        .await
        .unwrap();

    assert!(info.has_commits);
    assert_eq!(info.branch(), Some("main"));
    assert_eq!(info.hash(), Some("abc1234"));
    assert_eq!(
        info.fields["hashFull"],
        FieldValue::Text("abc1234def5678abc1234def5678abc1234def56".into())
    );
    assert_eq!(info.commits(), Some(42));

    let last = info.fields["lastCommit"].as_timestamp().unwrap();
    assert_eq!((last.year(), last.month(), last.day()), (2026, 10, 19));
    assert_eq!(last.hour(), 10);

    assert_eq!(info.version(), Some("main-42 [abc1234]"));
    assert_eq!(
        info.get("versionDashed"),
        Some(&FieldValue::Text("main-42-abc1234".into()))
    );
}

#[tokio::test]
async fn test_path_with_spaces_is_one_argument() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("my project");
    make_repo(&root, true);

    let info = inspector(&fake_gits().ok, RepoInspectorConfig::default())
        .inspect(&root)
        .await
        .unwrap();

    // The script exits 128 if the --git-dir value does not hold a HEAD file
    assert_eq!(info.hash(), Some("abc1234"));
}

#[tokio::test]
async fn test_control_dir_passed_directly() {
    let dir = tempfile::tempdir().unwrap();
    make_repo(dir.path(), true);
    let config = RepoInspectorConfig {
        is_container: false,
        ..Default::default()
    };

    let info = inspector(&fake_gits().ok, config)
        .inspect(&dir.path().join(".git"))
        .await
        .unwrap();

    assert_eq!(info.commits(), Some(42));
}

#[tokio::test]
async fn test_failing_commands_become_null() {
    let dir = tempfile::tempdir().unwrap();
    make_repo(dir.path(), true);

    let info = inspector(&fake_gits().no_tags, RepoInspectorConfig::default())
        .inspect(dir.path())
        .await
        .unwrap();

    assert_eq!(info.fields["branch"], FieldValue::Null);
    assert_eq!(info.fields["hashFull"], FieldValue::Null);
    assert_eq!(info.fields["lastCommit"], FieldValue::Null);
    assert_eq!(info.hash(), Some("fff0000"));
    assert_eq!(info.commits(), Some(1));
    assert_eq!(info.version(), Some("null-1 [fff0000]"));
}

#[tokio::test]
async fn test_missing_binary_aborts_inspection() {
    let dir = tempfile::tempdir().unwrap();
    make_repo(dir.path(), true);

    let result = inspector(
        Path::new("/nonexistent/repoinf/git"),
        RepoInspectorConfig::default(),
    )
    .inspect(dir.path())
    .await;

    assert!(matches!(
        result,
        Err(AppError::Process(RunError::Spawn { .. }))
    ));
}

#[tokio::test]
async fn test_missing_binary_with_null_policy() {
    let dir = tempfile::tempdir().unwrap();
    make_repo(dir.path(), true);
    let config = RepoInspectorConfig {
        spawn_failure: SpawnFailurePolicy::NullField,
        ..Default::default()
    };

    let info = inspector(Path::new("/nonexistent/repoinf/git"), config)
        .inspect(dir.path())
        .await
        .unwrap();

    assert!(info.fields.values().all(FieldValue::is_null));
    assert_eq!(info.version(), Some("null-null [null]"));
}

#[tokio::test]
async fn test_detached_head_without_commits_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let control = dir.path().join(".git");
    std::fs::create_dir_all(&control).unwrap();
    let detached = "abc1234def5678abc1234def5678abc1234def56\n";
    std::fs::write(control.join("HEAD"), detached).unwrap();

    let result = inspector(&fake_gits().ok, RepoInspectorConfig::default())
        .inspect(dir.path())
        .await;

    assert!(matches!(result, Err(AppError::Domain(_))));
}

#[tokio::test]
async fn test_concurrent_inspections_are_independent() {
    let with_commits = tempfile::tempdir().unwrap();
    let without_commits = tempfile::tempdir().unwrap();
    make_repo(with_commits.path(), true);
    make_repo(without_commits.path(), false);

    let inspector = Arc::new(inspector(&fake_gits().ok, RepoInspectorConfig::default()));
    let (a, b) = tokio::join!(
        inspector.inspect(with_commits.path()),
        inspector.inspect(without_commits.path())
    );

    assert_eq!(a.unwrap().commits(), Some(42));
    assert_eq!(b.unwrap().commits(), Some(0));
}
