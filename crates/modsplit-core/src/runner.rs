//! Per-job pipeline execution.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::catalog::JobDefinition;
use crate::config::synthesize;
use crate::context::RunContext;
use crate::engine::{SourceFetcher, SplitEngine};
use crate::error::JobError;
use crate::workspace::JobWorkspace;

/// Classified result of one job execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every pipeline step completed.
    Succeeded,

    /// The job failed before engine invocation; siblings are unaffected.
    FailedRecoverable,

    /// The engine invocation failed; the batch must exit non-zero once
    /// in-flight jobs drain.
    FailedFatal,
}

/// Runs one job at a time through the fixed pipeline:
/// workspace, clone, configure, validate, engine. The first failing step
/// short-circuits the rest; no step is retried.
pub struct JobRunner {
    fetcher: Arc<dyn SourceFetcher>,
    engine: Arc<dyn SplitEngine>,
    ctx: RunContext,
}

impl JobRunner {
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        engine: Arc<dyn SplitEngine>,
        ctx: RunContext,
    ) -> Self {
        Self {
            fetcher,
            engine,
            ctx,
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Execute `job` to completion, translating any pipeline error into a
    /// classified outcome. Errors never propagate past this boundary.
    pub async fn run_job(&self, job: &JobDefinition) -> RunOutcome {
        info!(job = %job.name, "starting split job");
        match self.execute(job).await {
            Ok(()) => {
                info!(job = %job.name, "split job finished");
                RunOutcome::Succeeded
            }
            Err(e) if e.is_fatal() => {
                error!(job = %job.name, step = e.step(), error = %e, "split job failed");
                RunOutcome::FailedFatal
            }
            Err(e) => {
                error!(job = %job.name, step = e.step(), error = %e, "split job failed");
                RunOutcome::FailedRecoverable
            }
        }
    }

    async fn execute(&self, job: &JobDefinition) -> Result<(), JobError> {
        let workspace = JobWorkspace::create()?;

        self.fetcher
            .fetch(&job.source_url, &job.source_branch, workspace.path())
            .await?;

        let config = synthesize(job, &self.ctx);
        let config_path = config.write_to(workspace.path())?;
        config.validate(self.ctx.mode())?;
        debug!(job = %job.name, config = %config_path.display(), "engine configuration ready");

        self.engine.run(&config_path, &self.ctx).await?;

        // Workspace dropped here; the engine must not depend on it afterwards.
        Ok(())
    }
}
