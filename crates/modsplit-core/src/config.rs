//! Engine configuration model and the dry-run/live synthesis policy.
//!
//! The YAML written from [`RunConfiguration`] is consumed by the external
//! splitting engine; field names and nesting are a compatibility surface
//! and must stay loadable by it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::JobDefinition;
use crate::context::RunContext;
use crate::error::JobError;

/// File name the external engine expects inside the job workspace.
pub const ENGINE_CONFIG_FILE: &str = "modularise.yaml";

const BROWSE_URL_PREFIX: &str = "https://github.com/";
const PUSH_URL_PREFIX: &str = "git@github.com:";

/// Credential-handling mode for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// All credentials stripped, destination URLs left unauthenticated.
    DryRun,

    /// Destination URLs rewritten to the SSH push form, private key attached.
    Live,
}

/// Reference to the key material the engine uses for pushes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Path to the private key for SSH authentication. The field name is
    /// the engine's, not ours.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubkey: Option<PathBuf>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.pubkey.is_none()
    }
}

/// One named split: the slice of the source tree to extract and where the
/// derived repository lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitSpec {
    /// Module path of the derived repository.
    pub module_path: String,

    /// Destination repository URL.
    pub url: String,

    /// Destination branch.
    pub branch: String,

    /// Source directories to keep.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    /// Directories to remove from the included set. Only meaningful as
    /// subtractions from `includes`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

/// Concrete per-run engine configuration, synthesized fresh for every job
/// execution and discarded once the engine invocation returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunConfiguration {
    #[serde(default, skip_serializing_if = "Credentials::is_empty")]
    pub credentials: Credentials,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub splits: BTreeMap<String, SplitSpec>,
}

/// Derive the mode-specific engine configuration for one job.
///
/// Pure given its inputs: no I/O, no shared mutable state. Dry-run strips
/// credentials and leaves destination URLs untouched; live rewrites every
/// destination URL from the HTTPS browse form to the SSH push form and
/// attaches the run-wide key path.
pub fn synthesize(job: &JobDefinition, ctx: &RunContext) -> RunConfiguration {
    let mut splits = job.splits.clone();
    let credentials = match ctx.mode() {
        RunMode::DryRun => Credentials::default(),
        RunMode::Live => {
            for spec in splits.values_mut() {
                spec.url = spec.url.replacen(BROWSE_URL_PREFIX, PUSH_URL_PREFIX, 1);
            }
            Credentials {
                pubkey: ctx.key_path.clone(),
            }
        }
    };

    RunConfiguration {
        credentials,
        splits,
    }
}

impl RunConfiguration {
    /// Check that this configuration is internally consistent and safe to
    /// hand to the engine for the given mode.
    pub fn validate(&self, mode: RunMode) -> Result<(), JobError> {
        if self.splits.is_empty() {
            return Err(JobError::ConfigValidation(
                "configuration contains no splits".to_string(),
            ));
        }

        for (name, spec) in &self.splits {
            if spec.module_path.is_empty() {
                return Err(JobError::ConfigValidation(format!(
                    "split {name:?} has no module path"
                )));
            }
            if spec.url.is_empty() {
                return Err(JobError::ConfigValidation(format!(
                    "split {name:?} has no destination URL"
                )));
            }
            if spec.includes.is_empty() {
                return Err(JobError::ConfigValidation(format!(
                    "split {name:?} includes no source directories"
                )));
            }
        }

        match mode {
            RunMode::DryRun => {
                if !self.credentials.is_empty() {
                    return Err(JobError::ConfigValidation(
                        "dry-run configuration carries credentials".to_string(),
                    ));
                }
                if let Some(name) = self
                    .splits
                    .iter()
                    .find(|(_, s)| s.url.starts_with(PUSH_URL_PREFIX))
                    .map(|(name, _)| name)
                {
                    return Err(JobError::ConfigValidation(format!(
                        "split {name:?} uses an authenticated URL in dry-run"
                    )));
                }
                Ok(())
            }
            RunMode::Live if self.credentials.is_empty() => Err(JobError::ConfigValidation(
                "live configuration is missing push credentials".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Serialize this configuration into `dir` under the file name the
    /// engine expects, returning the written path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, JobError> {
        let rendered = serde_yaml::to_string(self)
            .map_err(|e| JobError::ConfigWrite(format!("serialization failed: {e}")))?;
        let path = dir.join(ENGINE_CONFIG_FILE);
        fs::write(&path, rendered)
            .map_err(|e| JobError::ConfigWrite(format!("{}: {e}", path.display())))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn live_ctx() -> RunContext {
        RunContext {
            dry_run: false,
            verbose: false,
            key_path: Some(PathBuf::from("/keys/deploy")),
        }
    }

    fn dry_ctx() -> RunContext {
        RunContext {
            dry_run: true,
            ..Default::default()
        }
    }

    fn sample_job() -> JobDefinition {
        Catalog::builtin().unwrap().jobs()[0].clone()
    }

    #[test]
    fn test_dry_run_strips_credentials() {
        let config = synthesize(&sample_job(), &dry_ctx());
        assert!(config.credentials.is_empty());
        for spec in config.splits.values() {
            assert!(
                spec.url.starts_with("https://"),
                "dry-run must leave URLs unauthenticated: {}",
                spec.url
            );
        }
    }

    #[test]
    fn test_live_rewrites_urls_and_attaches_key() {
        let config = synthesize(&sample_job(), &live_ctx());
        assert_eq!(config.credentials.pubkey, Some(PathBuf::from("/keys/deploy")));
        for spec in config.splits.values() {
            assert!(
                spec.url.starts_with("git@github.com:"),
                "live must rewrite URLs to the push form: {}",
                spec.url
            );
        }
    }

    #[test]
    fn test_synthesize_is_idempotent() {
        let job = sample_job();
        assert_eq!(synthesize(&job, &live_ctx()), synthesize(&job, &live_ctx()));
        assert_eq!(synthesize(&job, &dry_ctx()), synthesize(&job, &dry_ctx()));
    }

    #[test]
    fn test_validate_rejects_empty_splits() {
        let config = RunConfiguration::default();
        let err = config.validate(RunMode::DryRun).unwrap_err();
        assert!(matches!(err, JobError::ConfigValidation(_)));
    }

    #[test]
    fn test_validate_rejects_split_without_includes() {
        let mut config = synthesize(&sample_job(), &dry_ctx());
        config.splits.values_mut().next().unwrap().includes.clear();
        let err = config.validate(RunMode::DryRun).unwrap_err();
        assert!(matches!(err, JobError::ConfigValidation(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_validate_enforces_mode_credentials() {
        let job = sample_job();

        let mut leaked = synthesize(&job, &dry_ctx());
        leaked.credentials.pubkey = Some(PathBuf::from("/keys/deploy"));
        assert!(leaked.validate(RunMode::DryRun).is_err());

        let mut authed = synthesize(&job, &dry_ctx());
        authed.splits.values_mut().next().unwrap().url =
            "git@github.com:modularise/prometheus-tsdb".to_string();
        assert!(authed.validate(RunMode::DryRun).is_err());

        let missing = synthesize(
            &job,
            &RunContext {
                dry_run: false,
                verbose: false,
                key_path: None,
            },
        );
        assert!(missing.validate(RunMode::Live).is_err());

        assert!(synthesize(&job, &dry_ctx()).validate(RunMode::DryRun).is_ok());
        assert!(synthesize(&job, &live_ctx()).validate(RunMode::Live).is_ok());
    }

    #[test]
    fn test_written_config_round_trips_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let config = synthesize(&sample_job(), &dry_ctx());

        let path = config.write_to(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), ENGINE_CONFIG_FILE);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("pubkey"), "dry-run artifact leaked credentials");

        let reloaded: RunConfiguration = serde_yaml::from_str(&raw).unwrap();
        assert_eq!(reloaded, config);
    }
}
