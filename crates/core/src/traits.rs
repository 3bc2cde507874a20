//! Provider traits
//!
//! The orchestrator talks to the object store and the CDN only through these
//! traits. The AWS SDK implementations live in sd-aws; tests use fakes.

use async_trait::async_trait;

use crate::distribution::DistributionRequest;
use crate::error::Result;
use crate::upload::UploadItem;

/// Result of probing a bucket name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketProbe {
    /// The bucket exists and the caller can access it
    Accessible,
    /// The bucket exists and belongs to another account
    OwnedByOther,
    /// No bucket with this name exists
    Missing,
}

/// Result of a bucket creation attempt that reached the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateBucketOutcome {
    Created,
    AlreadyOwnedByCaller,
    AlreadyOwnedByOther,
}

/// Object-store operations needed to host a static site
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check whether a bucket exists and who can access it
    async fn probe_bucket(&self, bucket: &str) -> Result<BucketProbe>;

    /// Create a bucket, optionally pinned to a non-default region
    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
    ) -> Result<CreateBucketOutcome>;

    /// Turn off every "block public access" setting on the bucket
    async fn allow_public_access(&self, bucket: &str) -> Result<()>;

    /// Replace the bucket policy
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()>;

    /// Enable static website hosting
    async fn configure_website(
        &self,
        bucket: &str,
        index_document: &str,
        error_document: &str,
    ) -> Result<()>;

    /// Upload one file with its content type and cache directive
    async fn upload(&self, bucket: &str, item: &UploadItem) -> Result<()>;
}

/// CDN distribution creation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DistributionService: Send + Sync {
    /// Create a distribution and return its public domain name
    async fn create_distribution(&self, request: &DistributionRequest) -> Result<String>;
}

/// Clients bound to one region and one set of credentials
pub struct CloudClients<S, C> {
    pub store: S,
    pub cdn: C,
}

/// Factory for provider clients
///
/// `connect` resolves credentials; it is the first point at which the
/// deployment touches the cloud provider.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    type Store: ObjectStore;
    type Cdn: DistributionService;

    async fn connect(&self, region: &str) -> Result<CloudClients<Self::Store, Self::Cdn>>;
}

/// Per-file upload progress callbacks
pub trait UploadProgress {
    fn begin(&self, _total: usize) {}
    fn uploaded(&self, _item: &UploadItem) {}
    fn finish(&self) {}
}
