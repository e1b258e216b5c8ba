// Filesystem access port
// reason: async-trait so adapters can move blocking syscalls off the runtime
use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Access level to test for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Exists,
    Read,
    Write,
}

/// Map the outcome of an access attempt to a boolean
///
/// "Not found" and "permission denied" become `Ok(false)`; any other error propagates.
pub fn recover_access(outcome: io::Result<()>) -> io::Result<bool> {
    match outcome {
        Ok(()) => Ok(true),
        Err(err) if is_absent_or_denied(&err) => Ok(false),
        Err(err) => Err(err),
    }
}

fn is_absent_or_denied(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    )
}

/// Access Checker port
#[async_trait]
pub trait FileAccess: Send + Sync {
    /// Check whether `level` access applies to `path`
    ///
    /// # Errors
    /// Any failure other than "not found" / "permission denied"
    async fn check_access(&self, path: &Path, level: AccessLevel) -> io::Result<bool>;

    /// Read a whole file as UTF-8 text
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        self.check_access(path, AccessLevel::Exists).await
    }

    async fn is_readable(&self, path: &Path) -> io::Result<bool> {
        self.check_access(path, AccessLevel::Read).await
    }

    async fn is_writable(&self, path: &Path) -> io::Result<bool> {
        self.check_access(path, AccessLevel::Write).await
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// In-memory FileAccess
    ///
    /// Files listed with `with_file` exist and are readable and writable.
    /// Paths listed with `with_fault` fail with the given error kind.
    #[derive(Default)]
    pub struct MockFileAccess {
        files: HashMap<PathBuf, String>,
        faults: HashMap<PathBuf, io::ErrorKind>,
        checks: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl MockFileAccess {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
            self.files.insert(path.into(), content.into());
            self
        }

        pub fn with_fault(mut self, path: impl Into<PathBuf>, kind: io::ErrorKind) -> Self {
            self.faults.insert(path.into(), kind);
            self
        }

        /// Paths passed to `check_access`, in call order
        pub fn checked_paths(&self) -> Vec<PathBuf> {
            self.checks.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FileAccess for MockFileAccess {
        async fn check_access(&self, path: &Path, _level: AccessLevel) -> io::Result<bool> {
            self.checks.lock().unwrap().push(path.to_path_buf());

            if let Some(kind) = self.faults.get(path) {
                return recover_access(Err(io::Error::from(*kind)));
            }
            if self.files.contains_key(path) {
                Ok(true)
            } else {
                recover_access(Err(io::Error::from(io::ErrorKind::NotFound)))
            }
        }

        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            if let Some(kind) = self.faults.get(path) {
                return Err(io::Error::from(*kind));
            }
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }
}
