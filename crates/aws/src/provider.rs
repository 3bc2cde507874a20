//! AWS provider: region-bound clients from the default credential chain

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::ProvideCredentials;
use aws_smithy_types::error::display::DisplayErrorContext;

use sd_core::{CloudClients, CloudProvider, Error, Result};

use crate::cloudfront::CloudFrontCdn;
use crate::s3::S3Store;

/// Connects to AWS using the environment, profile and instance credentials
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsProvider;

impl AwsProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CloudProvider for AwsProvider {
    type Store = S3Store;
    type Cdn = CloudFrontCdn;

    async fn connect(&self, region: &str) -> Result<CloudClients<S3Store, CloudFrontCdn>> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        // Resolve once up front so a missing chain fails before any bucket call
        let provider = config
            .credentials_provider()
            .ok_or_else(|| Error::Credentials("no credentials provider configured".into()))?;
        provider
            .provide_credentials()
            .await
            .map_err(|e| Error::Credentials(DisplayErrorContext(&e).to_string()))?;
        tracing::info!("AWS credentials loaded for region {region}");

        Ok(CloudClients {
            store: S3Store::new(&config),
            cdn: CloudFrontCdn::new(&config),
        })
    }
}
