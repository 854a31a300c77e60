//! Run-wide execution context.

use std::path::PathBuf;

use crate::config::RunMode;

/// Immutable run-wide settings, constructed once at startup and shared by
/// every job in the batch. Nothing here is mutated after the scheduler
/// starts, so it is freely cloneable across worker tasks.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Run every job but never push to remote repositories.
    pub dry_run: bool,

    /// Raise log verbosity. Verbose output from parallel jobs interleaves
    /// into noise, so this also forces serial execution.
    pub verbose: bool,

    /// Path to the private key used for SSH push authentication.
    /// Required unless `dry_run` is set.
    pub key_path: Option<PathBuf>,
}

impl RunContext {
    /// The credential-handling mode this context implies.
    pub fn mode(&self) -> RunMode {
        if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_follows_dry_run_flag() {
        let ctx = RunContext {
            dry_run: true,
            ..Default::default()
        };
        assert_eq!(ctx.mode(), RunMode::DryRun);

        let ctx = RunContext::default();
        assert_eq!(ctx.mode(), RunMode::Live);
    }
}
