//! External collaborator seams: the version-control client and the
//! splitting engine.
//!
//! Both are opaque blocking capabilities whose only contract is success or
//! failure with descriptive error text. Production implementations shell
//! out; tests inject fakes through the traits.

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::context::RunContext;
use crate::error::{JobError, Result};

/// Fetches a single branch of a repository into a local workspace.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Shallow, single-branch clone of `url` at `branch` into `dest`.
    async fn fetch(&self, url: &str, branch: &str, dest: &Path) -> Result<()>;
}

/// Invokes the external splitting engine with a persisted configuration.
#[async_trait]
pub trait SplitEngine: Send + Sync {
    /// Run the engine against the configuration at `config_file`.
    async fn run(&self, config_file: &Path, ctx: &RunContext) -> Result<()>;
}

/// Production fetcher shelling out to the `git` CLI.
pub struct GitCliFetcher;

#[async_trait]
impl SourceFetcher for GitCliFetcher {
    async fn fetch(&self, url: &str, branch: &str, dest: &Path) -> Result<()> {
        debug!(url = %url, branch = %branch, dest = %dest.display(), "cloning source repository");
        let output = Command::new("git")
            .args(["clone", "--depth", "1", "--single-branch", "--branch", branch, url])
            .arg(dest)
            .output()
            .await
            .map_err(|e| JobError::Clone(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            return Err(JobError::Clone(failure_detail("git clone", &output)));
        }
        Ok(())
    }
}

/// Production engine adapter shelling out to the `modularise` CLI.
pub struct ModulariseEngine {
    program: PathBuf,
}

impl ModulariseEngine {
    /// Use an engine binary at an explicit path instead of `$PATH` lookup.
    pub fn with_program(program: PathBuf) -> Self {
        Self { program }
    }
}

impl Default for ModulariseEngine {
    fn default() -> Self {
        Self {
            program: PathBuf::from("modularise"),
        }
    }
}

#[async_trait]
impl SplitEngine for ModulariseEngine {
    async fn run(&self, config_file: &Path, ctx: &RunContext) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("split").arg("--config").arg(config_file);
        if ctx.dry_run {
            cmd.arg("--dry-run");
        }
        if ctx.verbose {
            cmd.arg("--verbose");
        }

        debug!(config = %config_file.display(), "invoking split engine");
        let output = cmd
            .output()
            .await
            .map_err(|e| JobError::Engine(format!("failed to run {}: {e}", self.program.display())))?;

        if !output.status.success() {
            return Err(JobError::Engine(failure_detail("split engine", &output)));
        }
        Ok(())
    }
}

fn failure_detail(what: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let excerpt = stderr.trim();
    match output.status.code() {
        Some(code) if excerpt.is_empty() => format!("{what} exited with code {code}"),
        Some(code) => format!("{what} exited with code {code}: {excerpt}"),
        None => format!("{what} terminated by signal: {excerpt}"),
    }
}
