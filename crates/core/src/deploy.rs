//! Deployment orchestration
//!
//! Runs the pipeline stages strictly in order. Any stage failure ends the run;
//! nothing already applied to the cloud account is rolled back.

use std::fmt;

use serde::Serialize;

use crate::distribution::{DistributionRequest, public_url};
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::provision;
use crate::request::DeploymentRequest;
use crate::traits::{CloudClients, CloudProvider, DistributionService, UploadProgress};
use crate::upload::{collect_upload_items, upload_all};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    VerifyBuildDir,
    LoadCredentials,
    ProvisionBucket,
    UnblockPublicAccess,
    ApplyPolicy,
    ConfigureWebsite,
    UploadContents,
    ProvisionDistribution,
    ReportSuccess,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::VerifyBuildDir => "verify build folder",
            Stage::LoadCredentials => "load credentials",
            Stage::ProvisionBucket => "provision bucket",
            Stage::UnblockPublicAccess => "unblock public access",
            Stage::ApplyPolicy => "apply bucket policy",
            Stage::ConfigureWebsite => "configure website hosting",
            Stage::UploadContents => "upload contents",
            Stage::ProvisionDistribution => "create distribution",
            Stage::ReportSuccess => "report",
        };
        f.write_str(name)
    }
}

/// A deployment that stopped at `stage`
#[derive(Debug)]
pub struct DeployFailure {
    pub stage: Stage,
    pub error: Error,
}

impl fmt::Display for DeployFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for DeployFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Summary of a finished deployment
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub app_name: String,
    pub bucket: String,
    pub region: String,
    pub distribution_domain: String,
    pub url: String,
    pub files_uploaded: usize,
    pub bytes_uploaded: u64,
    pub stages: Vec<Stage>,
}

struct Pipeline {
    completed: Vec<Stage>,
}

impl Pipeline {
    fn complete(&mut self, stage: Stage) {
        tracing::debug!("Stage complete: {stage}");
        self.completed.push(stage);
    }
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, DeployFailure>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, DeployFailure> {
        self.map_err(|error| DeployFailure { stage, error })
    }
}

/// Run a full deployment
pub async fn run<P: CloudProvider>(
    provider: &P,
    request: DeploymentRequest,
    prompter: &dyn Prompter,
    progress: &dyn UploadProgress,
) -> std::result::Result<DeployReport, DeployFailure> {
    let mut pipeline = Pipeline {
        completed: Vec::new(),
    };

    if !request.dist_dir.is_dir() {
        return Err(DeployFailure {
            stage: Stage::VerifyBuildDir,
            error: Error::BuildDirNotFound(request.dist_dir.clone()),
        });
    }
    tracing::info!("Build folder found: {}", request.dist_dir.display());
    pipeline.complete(Stage::VerifyBuildDir);

    let CloudClients { store, cdn } = provider
        .connect(&request.region)
        .await
        .at(Stage::LoadCredentials)?;
    pipeline.complete(Stage::LoadCredentials);

    let bucket = provision::ensure_bucket(&store, prompter, &request.bucket, &request.region)
        .await
        .at(Stage::ProvisionBucket)?;
    pipeline.complete(Stage::ProvisionBucket);

    provision::allow_public_access(&store, &bucket)
        .await
        .at(Stage::UnblockPublicAccess)?;
    pipeline.complete(Stage::UnblockPublicAccess);

    provision::apply_public_read_policy(&store, &bucket)
        .await
        .at(Stage::ApplyPolicy)?;
    pipeline.complete(Stage::ApplyPolicy);

    provision::configure_website(&store, &bucket)
        .await
        .at(Stage::ConfigureWebsite)?;
    tracing::info!("Bucket ready");
    pipeline.complete(Stage::ConfigureWebsite);

    tracing::info!("Uploading build folder: {}", request.dist_dir.display());
    let items = collect_upload_items(&request.dist_dir).at(Stage::UploadContents)?;
    let files_uploaded = upload_all(&store, &bucket, &items, progress)
        .await
        .at(Stage::UploadContents)?;
    let bytes_uploaded = items.iter().map(|i| i.size).sum();
    tracing::info!("Files uploaded to S3 bucket");
    pipeline.complete(Stage::UploadContents);

    tracing::info!("Creating CloudFront distribution...");
    let distribution = DistributionRequest::now(&bucket, &request.region, &request.app_name);
    let domain = create_distribution(&cdn, &distribution)
        .await
        .at(Stage::ProvisionDistribution)?;
    tracing::info!("CloudFront distribution created");
    pipeline.complete(Stage::ProvisionDistribution);

    let url = public_url(&domain).at(Stage::ReportSuccess)?;
    pipeline.complete(Stage::ReportSuccess);

    Ok(DeployReport {
        app_name: request.app_name,
        bucket,
        region: request.region,
        distribution_domain: domain,
        url,
        files_uploaded,
        bytes_uploaded,
        stages: pipeline.completed,
    })
}

async fn create_distribution<C: DistributionService>(
    cdn: &C,
    request: &DistributionRequest,
) -> Result<String> {
    cdn.create_distribution(request).await.map_err(|e| match e {
        Error::Distribution(_) => e,
        other => Error::Distribution(other.to_string()),
    })
}
