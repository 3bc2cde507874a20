//! sd-core: Core library for spa-deployer
//!
//! This crate provides everything about a deployment that does not depend on
//! a specific cloud SDK:
//! - Configuration file and request resolution
//! - Region and bucket-name validation
//! - Bucket provisioning and upload sequencing
//! - Distribution request construction
//! - The deployment orchestrator
//!
//! Cloud access goes through the provider traits, implemented by sd-aws and
//! by fakes in tests.

pub mod config;
pub mod content_type;
pub mod deploy;
pub mod distribution;
pub mod error;
pub mod prompt;
pub mod provision;
pub mod request;
pub mod traits;
pub mod upload;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, ConfigManager};
pub use deploy::{DeployFailure, DeployReport, Stage};
pub use distribution::DistributionRequest;
pub use error::{Error, Result};
pub use prompt::{BucketNameAction, Prompter, RegionAction};
pub use request::{DeploymentFlags, DeploymentRequest, Resolution, resolve};
pub use traits::{
    BucketProbe, CloudClients, CloudProvider, CreateBucketOutcome, DistributionService,
    ObjectStore, UploadProgress,
};
pub use upload::UploadItem;
pub use validate::ValidationOutcome;
