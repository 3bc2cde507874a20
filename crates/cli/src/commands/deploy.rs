//! deploy command - Publish a build folder behind a CDN
//!
//! Resolves the deployment request, provisions the bucket, uploads the build
//! folder and creates a CloudFront distribution in front of it.

use clap::Args;
use sd_aws::AwsProvider;
use sd_core::{Config, ConfigManager, DeploymentFlags, Prompter, Resolution, deploy, resolve};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};
use crate::prompt::TerminalPrompter;

/// Deployment inputs; anything missing is asked for interactively
#[derive(Args, Debug, Default, Clone)]
pub struct DeployArgs {
    /// Application name, used to tag the distribution
    #[arg(long, env = "SPA_DEPLOY_APP")]
    pub app: Option<String>,

    /// S3 bucket to host the build
    #[arg(long, env = "SPA_DEPLOY_BUCKET")]
    pub bucket: Option<String>,

    /// AWS region for the bucket [default: us-east-1]
    #[arg(long, env = "SPA_DEPLOY_REGION")]
    pub region: Option<String>,

    /// Build folder to upload [default: ./dist]
    #[arg(long, env = "SPA_DEPLOY_DIST")]
    pub dist: Option<String>,
}

impl From<DeployArgs> for DeploymentFlags {
    fn from(args: DeployArgs) -> Self {
        Self {
            app_name: args.app,
            bucket: args.bucket,
            region: args.region,
            dist_dir: args.dist,
        }
    }
}

/// Execute the deploy command
pub async fn execute(args: DeployArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let config_manager = match ConfigManager::new() {
        Ok(cm) => cm,
        Err(e) => {
            formatter.error(&format!("Failed to locate config: {e}"));
            return ExitCode::GeneralError;
        }
    };
    let mut config = match config_manager.load() {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to load config: {e}"));
            return ExitCode::GeneralError;
        }
    };

    let prompter = TerminalPrompter;
    let resolution = match resolve(args.into(), &config, &prompter) {
        Ok(r) => r,
        Err(e) if e.is_cancelled() => {
            formatter.error("Deployment cancelled");
            return ExitCode::GeneralError;
        }
        Err(e) => {
            formatter.error(&format!("Invalid deployment settings: {e}"));
            return ExitCode::GeneralError;
        }
    };

    remember_regions(&formatter, &config_manager, &mut config, &resolution);

    run(resolution, &prompter, &formatter, &output_config).await
}

/// Persist "don't ask again" region choices; failure only warns
fn remember_regions(
    formatter: &Formatter,
    config_manager: &ConfigManager,
    config: &mut Config,
    resolution: &Resolution,
) {
    if !config.accept_regions(&resolution.remembered_regions) {
        return;
    }
    match config_manager.save(config) {
        Ok(()) => tracing::debug!(
            "Saved accepted regions to {}",
            config_manager.config_path().display()
        ),
        Err(e) => formatter.warning(&format!("Could not save accepted regions: {e}")),
    }
}

async fn run(
    resolution: Resolution,
    prompter: &dyn Prompter,
    formatter: &Formatter,
    output_config: &OutputConfig,
) -> ExitCode {
    let request = resolution.request;
    if !formatter.is_json() {
        formatter.println(&format!(
            "Deploying {} from {} to bucket {} in {}",
            request.app_name,
            request.dist_dir.display(),
            request.bucket,
            request.region
        ));
    }

    let progress = ProgressBar::new(output_config);
    match deploy::run(&AwsProvider::new(), request, prompter, &progress).await {
        Ok(report) => {
            formatter.report(&report);
            ExitCode::Success
        }
        Err(failure) => {
            tracing::debug!("Deployment failed at stage {:?}", failure.stage);
            formatter.error(&failure.to_string());
            ExitCode::GeneralError
        }
    }
}
