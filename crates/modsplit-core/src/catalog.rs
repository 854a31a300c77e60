//! Static catalog of split job definitions.
//!
//! Jobs are authored in code and fixed for the lifetime of the process.
//! Adding a job means appending a definition to [`Catalog::builtin`].

use std::collections::{BTreeMap, HashSet};

use crate::config::SplitSpec;

/// A single split job: which repository to clone and how to carve it up.
#[derive(Debug, Clone)]
pub struct JobDefinition {
    /// Unique human-readable job identifier.
    pub name: String,

    /// Upstream repository to clone.
    pub source_url: String,

    /// Branch to fetch (shallow, single-branch).
    pub source_branch: String,

    /// Named splits to derive from the source tree.
    pub splits: BTreeMap<String, SplitSpec>,
}

/// Errors detected while assembling a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate job name: {0}")]
    DuplicateName(String),
}

/// Ordered, immutable registry of job definitions with unique names.
#[derive(Debug, Clone)]
pub struct Catalog {
    jobs: Vec<JobDefinition>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate job names.
    pub fn new(jobs: Vec<JobDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for job in &jobs {
            if !seen.insert(job.name.as_str()) {
                return Err(CatalogError::DuplicateName(job.name.clone()));
            }
        }
        Ok(Self { jobs })
    }

    /// The production job set.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(vec![prometheus_job()])
    }

    pub fn jobs(&self) -> &[JobDefinition] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

fn split(
    module_path: &str,
    url: &str,
    branch: &str,
    includes: &[&str],
    excludes: &[&str],
) -> SplitSpec {
    SplitSpec {
        module_path: module_path.to_string(),
        url: url.to_string(),
        branch: branch.to_string(),
        includes: includes.iter().map(|s| s.to_string()).collect(),
        excludes: excludes.iter().map(|s| s.to_string()).collect(),
    }
}

fn prometheus_job() -> JobDefinition {
    let mut splits = BTreeMap::new();
    splits.insert(
        "tsdb".to_string(),
        split(
            "github.com/modularise/prometheus-tsdb",
            "https://github.com/modularise/prometheus-tsdb",
            "master",
            &["pkg/labels", "storage", "tsdb"],
            &["storage/fanout", "storage/remote"],
        ),
    );
    splits.insert(
        "promql".to_string(),
        split(
            "github.com/modularise/prometheus-promql",
            "https://github.com/modularise/prometheus-promql",
            "master",
            &["promql", "util/stats"],
            &[],
        ),
    );
    splits.insert(
        "discovery".to_string(),
        split(
            "github.com/modularise/prometheus-discovery",
            "https://github.com/modularise/prometheus-discovery",
            "master",
            &["discovery", "util/treecache"],
            &[],
        ),
    );

    JobDefinition {
        name: "prometheus".to_string(),
        source_url: "https://github.com/prometheus/prometheus".to_string(),
        source_branch: "master".to_string(),
        splits,
    }
}
