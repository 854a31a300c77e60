//! Disposable per-job working directories.

use std::path::Path;

use tempfile::TempDir;

use crate::error::{JobError, Result};

/// Filesystem area owned exclusively by one job run.
///
/// The underlying directory is unique across concurrent callers and removed
/// on drop; nothing may rely on its contents surviving the job.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: TempDir,
}

impl JobWorkspace {
    /// Allocate a fresh workspace. Failure is a recoverable, job-scoped
    /// condition.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("modsplit")
            .tempdir()
            .map_err(JobError::Workspace)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspaces_are_unique() {
        let a = JobWorkspace::create().unwrap();
        let b = JobWorkspace::create().unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().is_dir());
        assert!(b.path().is_dir());
    }

    #[test]
    fn test_workspace_removed_on_drop() {
        let ws = JobWorkspace::create().unwrap();
        let path = ws.path().to_path_buf();
        drop(ws);
        assert!(!path.exists());
    }
}
