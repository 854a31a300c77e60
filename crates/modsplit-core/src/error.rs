//! Job-level error taxonomy.

/// Errors raised while executing a single split job.
///
/// Every pipeline step up to and including configuration validation is
/// isolated to its job; a failed engine invocation poisons the whole batch
/// because the target repositories may be left in a partially-modified state.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("failed to create job workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("failed to clone source repository: {0}")]
    Clone(String),

    #[error("failed to write engine configuration: {0}")]
    ConfigWrite(String),

    #[error("engine configuration rejected: {0}")]
    ConfigValidation(String),

    #[error("split engine invocation failed: {0}")]
    Engine(String),
}

impl JobError {
    /// Whether this error must take the whole batch down once in-flight
    /// jobs have drained.
    pub fn is_fatal(&self) -> bool {
        matches!(self, JobError::Engine(_))
    }

    /// The pipeline step this error belongs to, as a structured log field.
    pub fn step(&self) -> &'static str {
        match self {
            JobError::Workspace(_) => "workspace",
            JobError::Clone(_) => "clone",
            JobError::ConfigWrite(_) => "config_write",
            JobError::ConfigValidation(_) => "config_validation",
            JobError::Engine(_) => "engine",
        }
    }
}

/// Result type for job pipeline operations.
pub type Result<T> = std::result::Result<T, JobError>;
