// Inspection constants (no magic values)

/// Binary invoked for repository queries when none is configured
pub const DEFAULT_GIT_BINARY: &str = "git";

/// Flag pointing the binary at the control directory
pub const GIT_DIR_FLAG: &str = "--git-dir";

// Default command names
pub const BRANCH: &str = "branch";
pub const HASH: &str = "hash";
pub const HASH_FULL: &str = "hashFull";
pub const COMMITS: &str = "commits";
pub const LAST_COMMIT: &str = "lastCommit";

// Default derived field names
pub const VERSION_DASHED: &str = "versionDashed";
pub const VERSION: &str = "version";
pub const BOOT_TIME: &str = "bootTime";

/// Prefix `git describe --all` puts before local branch names
pub const DESCRIBE_BRANCH_PREFIX: &str = "heads/";
