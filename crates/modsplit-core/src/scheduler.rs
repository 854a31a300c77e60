//! Bounded-concurrency batch scheduler.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::context::RunContext;
use crate::engine::{SourceFetcher, SplitEngine};
use crate::runner::{JobRunner, RunOutcome};

/// Outcome of one dispatched job.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: String,
    pub outcome: RunOutcome,
}

/// Aggregate result of a whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub reports: Vec<JobReport>,
}

impl BatchReport {
    /// Whether any job reached a fatal outcome.
    pub fn fatal(&self) -> bool {
        self.reports
            .iter()
            .any(|r| r.outcome == RunOutcome::FailedFatal)
    }

    pub fn succeeded(&self) -> usize {
        self.count(RunOutcome::Succeeded)
    }

    pub fn recoverable_failures(&self) -> usize {
        self.count(RunOutcome::FailedRecoverable)
    }

    /// Process exit status for automation: non-zero only when a fatal
    /// outcome occurred somewhere in the batch.
    pub fn exit_code(&self) -> u8 {
        u8::from(self.fatal())
    }

    fn count(&self, outcome: RunOutcome) -> usize {
        self.reports.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Number of jobs allowed to run at once: never more than the machine
/// offers or the catalog holds, and exactly one when verbose.
pub fn worker_budget(catalog_len: usize, verbose: bool) -> usize {
    if verbose {
        // Verbose logs from parallel jobs interleave into noise.
        return 1;
    }
    let cores = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    cores.min(catalog_len).max(1)
}

/// Dispatches every catalog job across a bounded worker pool and collects
/// classified outcomes. Once dispatched, a job always runs to completion;
/// a fatal outcome never cancels siblings, it only shapes the exit status.
pub struct Scheduler {
    runner: Arc<JobRunner>,
    worker_limit: Option<usize>,
}

impl Scheduler {
    pub fn new(
        ctx: RunContext,
        fetcher: Arc<dyn SourceFetcher>,
        engine: Arc<dyn SplitEngine>,
    ) -> Self {
        Self {
            runner: Arc::new(JobRunner::new(fetcher, engine, ctx)),
            worker_limit: None,
        }
    }

    /// Cap the worker pool below the machine-derived budget. Verbose runs
    /// stay serial regardless.
    pub fn with_worker_limit(mut self, limit: usize) -> Self {
        self.worker_limit = Some(limit.max(1));
        self
    }

    /// Run every job in `catalog` exactly once and return the aggregate
    /// report. Blocks until the last dispatched job has finished.
    pub async fn run(&self, catalog: &Catalog) -> BatchReport {
        let mut workers = worker_budget(catalog.len(), self.runner.context().verbose);
        if let Some(limit) = self.worker_limit {
            workers = workers.min(limit);
        }
        info!(jobs = catalog.len(), workers, "starting split job batch");

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();
        for job in catalog.jobs() {
            let job = job.clone();
            let runner = Arc::clone(&self.runner);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = runner.run_job(&job).await;
                JobReport {
                    job: job.name,
                    outcome,
                }
            });
        }

        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(job_report) => report.reports.push(job_report),
                Err(e) => warn!(error = %e, "split job task panicked"),
            }
        }

        info!(
            succeeded = report.succeeded(),
            recoverable = report.recoverable_failures(),
            fatal = report.fatal(),
            "finished split job batch"
        );
        report
    }
}
