//! modsplit-core - Orchestration engine for scheduled repository split jobs
//!
//! Provides a batch runner that:
//! - Holds a static catalog of split job definitions
//! - Runs each job through a fixed pipeline (workspace, clone, configure, engine)
//! - Bounds job parallelism to the machine and forces serial runs when verbose
//! - Classifies failures as recoverable (job-scoped) or fatal (batch-scoped)
//!
//! The splitting engine itself and the version-control client are external
//! collaborators behind the [`engine::SplitEngine`] and [`engine::SourceFetcher`]
//! traits.

pub mod catalog;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod runner;
pub mod scheduler;
pub mod workspace;

// Re-export key types
pub use catalog::{Catalog, CatalogError, JobDefinition};
pub use config::{synthesize, Credentials, RunConfiguration, RunMode, SplitSpec, ENGINE_CONFIG_FILE};
pub use context::RunContext;
pub use engine::{GitCliFetcher, ModulariseEngine, SourceFetcher, SplitEngine};
pub use error::JobError;
pub use runner::{JobRunner, RunOutcome};
pub use scheduler::{BatchReport, JobReport, Scheduler};
pub use workspace::JobWorkspace;
