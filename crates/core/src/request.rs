//! Deployment request resolution
//!
//! Turns partially filled flags into a complete [`DeploymentRequest`]. Missing
//! values are taken from the config file defaults or asked for, then region
//! and bucket name are validated in a bounded loop until valid or cancelled.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::prompt::{BucketNameAction, Prompter, RegionAction, choose};
use crate::validate::{ValidationOutcome, validate_bucket_name, validate_region};

/// Upper bound on validation rounds before resolution gives up
pub const MAX_RESOLVE_ROUNDS: usize = 10;

/// Upper bound on consecutive empty answers to a required prompt
pub const MAX_EMPTY_ANSWERS: usize = 3;

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct DeploymentFlags {
    pub app_name: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub dist_dir: Option<String>,
}

/// A complete, validated deployment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentRequest {
    pub app_name: String,
    pub bucket: String,
    pub region: String,
    pub dist_dir: PathBuf,
}

/// Outcome of a successful resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    pub request: DeploymentRequest,

    /// Regions the user asked never to be questioned about again
    pub remembered_regions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ResolveState {
    Resolving,
    Valid,
    Cancelled(String),
}

struct Resolver {
    app_name: String,
    bucket: String,
    region: String,
    dist_dir: String,
    region_settled: bool,
    remembered_regions: Vec<String>,
}

/// Resolve flags into a validated request, prompting where needed
pub fn resolve(
    flags: DeploymentFlags,
    config: &Config,
    prompter: &dyn Prompter,
) -> Result<Resolution> {
    let app_name = match non_empty(flags.app_name) {
        Some(name) => name,
        None => prompt_required(prompter, "Enter App Name", "App name")?,
    };
    let bucket = match non_empty(flags.bucket) {
        Some(bucket) => bucket,
        None => prompt_required(prompter, "Enter S3 Bucket Name", "Bucket name")?,
    };
    let region = non_empty(flags.region).unwrap_or_else(|| config.defaults.region.clone());
    let dist_dir = non_empty(flags.dist_dir).unwrap_or_else(|| config.defaults.dist_dir.clone());

    let mut resolver = Resolver {
        region_settled: config.is_region_accepted(&region),
        app_name,
        bucket,
        region,
        dist_dir,
        remembered_regions: Vec::new(),
    };

    let mut state = ResolveState::Resolving;
    let mut rounds = 0;
    loop {
        match state {
            ResolveState::Valid => return Ok(resolver.finish()),
            ResolveState::Cancelled(reason) => return Err(Error::Cancelled(reason)),
            ResolveState::Resolving if rounds == MAX_RESOLVE_ROUNDS => {
                return Err(Error::Config(format!(
                    "no valid configuration after {MAX_RESOLVE_ROUNDS} attempts"
                )));
            }
            ResolveState::Resolving => {
                rounds += 1;
                state = resolver.step(prompter)?;
            }
        }
    }
}

impl Resolver {
    fn step(&mut self, prompter: &dyn Prompter) -> Result<ResolveState> {
        if !self.region_settled {
            if let ValidationOutcome::Invalid {
                message,
                suggestion,
            } = validate_region(&self.region)
            {
                tracing::warn!("{message}");
                let prompt = match &suggestion {
                    Some(s) => format!("Did you mean '{s}'?"),
                    None => "No similar region found.".to_string(),
                };
                let region = self.region.clone();
                let actions = RegionAction::menu(suggestion.as_deref());
                match choose(prompter, &prompt, &actions, |a| a.label(&region))? {
                    RegionAction::AcceptSuggestion(s) => self.region = s,
                    RegionAction::KeepInput => {}
                    RegionAction::KeepInputAndRemember => {
                        self.remembered_regions.push(self.region.clone());
                    }
                    RegionAction::Cancel => {
                        return Ok(ResolveState::Cancelled(format!(
                            "invalid AWS region '{}'",
                            self.region
                        )));
                    }
                }
            }
            self.region_settled = true;
        }

        match validate_bucket_name(&self.bucket) {
            ValidationOutcome::Valid => Ok(ResolveState::Valid),
            ValidationOutcome::Invalid { message, .. } => {
                tracing::warn!("Invalid S3 bucket name: {}", self.bucket);
                match choose(prompter, &message, &BucketNameAction::MENU, |a| {
                    a.label().to_string()
                })? {
                    BucketNameAction::Reenter => {
                        self.bucket =
                            prompt_required(prompter, "Enter S3 Bucket Name", "Bucket name")?;
                        Ok(ResolveState::Resolving)
                    }
                    BucketNameAction::Cancel => Ok(ResolveState::Cancelled(format!(
                        "invalid S3 bucket name '{}'",
                        self.bucket
                    ))),
                }
            }
        }
    }

    fn finish(self) -> Resolution {
        Resolution {
            request: DeploymentRequest {
                app_name: self.app_name,
                bucket: self.bucket,
                region: self.region,
                dist_dir: PathBuf::from(self.dist_dir),
            },
            remembered_regions: self.remembered_regions,
        }
    }
}

/// Ask until a non-empty answer arrives, up to [`MAX_EMPTY_ANSWERS`] times
pub fn prompt_required(prompter: &dyn Prompter, prompt: &str, field: &str) -> Result<String> {
    for _ in 0..MAX_EMPTY_ANSWERS {
        let answer = prompter.input(prompt)?;
        let answer = answer.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
        tracing::warn!("{field} cannot be empty.");
    }
    Err(Error::Config(format!("{field} must not be empty")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
