// Local filesystem access checker
// reason: access(2) answers the question directly instead of opening the file
use async_trait::async_trait;
use std::io;
use std::path::Path;
use tracing::debug;

use repoinf_core::port::{recover_access, AccessLevel, FileAccess};

/// FileAccess over the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileAccess;

impl LocalFileAccess {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
async fn access(path: &Path, level: AccessLevel) -> io::Result<()> {
    use nix::unistd::AccessFlags;

    let flags = match level {
        AccessLevel::Exists => AccessFlags::F_OK,
        AccessLevel::Read => AccessFlags::R_OK,
        AccessLevel::Write => AccessFlags::W_OK,
    };
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || nix::unistd::access(&path, flags))
        .await
        .map_err(io::Error::other)?
        .map_err(io::Error::from)
}

#[cfg(not(unix))]
async fn access(path: &Path, level: AccessLevel) -> io::Result<()> {
    let metadata = tokio::fs::metadata(path).await?;
    if level == AccessLevel::Write && metadata.permissions().readonly() {
        return Err(io::Error::from(io::ErrorKind::PermissionDenied));
    }
    Ok(())
}

#[async_trait]
impl FileAccess for LocalFileAccess {
    async fn check_access(&self, path: &Path, level: AccessLevel) -> io::Result<bool> {
        let granted = recover_access(access(path, level).await)?;
        debug!(path = %path.display(), level = ?level, granted = %granted, "Access check");
        Ok(granted)
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}
