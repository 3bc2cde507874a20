//! S3 store implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from sd-core.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CompletedMultipartUpload, CompletedPart, CreateBucketConfiguration,
    ErrorDocument, IndexDocument, PublicAccessBlockConfiguration, WebsiteConfiguration,
};
use aws_smithy_types::byte_stream::Length;

use sd_core::{BucketProbe, CreateBucketOutcome, Error, ObjectStore, Result, UploadItem};

use crate::multipart::MultipartConfig;

/// Render an SDK error with its full source chain
pub(crate) fn sdk_message<E, R>(err: &SdkError<E, R>) -> String
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    DisplayErrorContext(err).to_string()
}

/// S3 client wrapper
pub struct S3Store {
    inner: aws_sdk_s3::Client,
    multipart: MultipartConfig,
}

impl S3Store {
    /// Create a store from a loaded SDK configuration
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            inner: aws_sdk_s3::Client::new(config),
            multipart: MultipartConfig::default(),
        }
    }

    async fn put_single(&self, bucket: &str, item: &UploadItem) -> Result<()> {
        let body = ByteStream::from_path(&item.source)
            .await
            .map_err(|e| upload_error(item, e))?;

        self.inner
            .put_object()
            .bucket(bucket)
            .key(&item.key)
            .content_type(&item.content_type)
            .cache_control(&item.cache_control)
            .body(body)
            .send()
            .await
            .map_err(|e| upload_error(item, sdk_message(&e)))?;

        Ok(())
    }

    async fn put_multipart(&self, bucket: &str, item: &UploadItem) -> Result<()> {
        let created = self
            .inner
            .create_multipart_upload()
            .bucket(bucket)
            .key(&item.key)
            .content_type(&item.content_type)
            .cache_control(&item.cache_control)
            .send()
            .await
            .map_err(|e| upload_error(item, sdk_message(&e)))?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| upload_error(item, "no upload id returned"))?
            .to_string();

        match self.upload_parts(bucket, item, &upload_id).await {
            Ok(parts) => {
                let completed = CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build();
                self.inner
                    .complete_multipart_upload()
                    .bucket(bucket)
                    .key(&item.key)
                    .upload_id(&upload_id)
                    .multipart_upload(completed)
                    .send()
                    .await
                    .map_err(|e| upload_error(item, sdk_message(&e)))?;
                Ok(())
            }
            Err(e) => {
                if let Err(abort) = self
                    .inner
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(&item.key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    tracing::warn!(
                        "Failed to abort multipart upload of {}: {}",
                        item.key,
                        sdk_message(&abort)
                    );
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        item: &UploadItem,
        upload_id: &str,
    ) -> Result<Vec<CompletedPart>> {
        let plan = self.multipart.plan(item.size);
        tracing::debug!("Uploading {} in {} parts", item.key, plan.len());

        let mut parts = Vec::with_capacity(plan.len());
        for part in plan {
            let body = ByteStream::read_from()
                .path(&item.source)
                .offset(part.offset)
                .length(Length::Exact(part.length))
                .build()
                .await
                .map_err(|e| upload_error(item, e))?;

            let response = self
                .inner
                .upload_part()
                .bucket(bucket)
                .key(&item.key)
                .upload_id(upload_id)
                .part_number(part.part_number)
                .body(body)
                .send()
                .await
                .map_err(|e| upload_error(item, sdk_message(&e)))?;

            parts.push(
                CompletedPart::builder()
                    .part_number(part.part_number)
                    .set_e_tag(response.e_tag().map(str::to_string))
                    .build(),
            );
        }
        Ok(parts)
    }
}

fn upload_error(item: &UploadItem, message: impl std::fmt::Display) -> Error {
    Error::Upload {
        key: item.key.clone(),
        message: message.to_string(),
    }
}

/// Map a HeadBucket error status to a probe result
///
/// 403 means someone else owns the name. Any other answer from the service
/// (a 301 region redirect, a 400, a 404) is left for CreateBucket to classify.
pub(crate) fn classify_head_status(status: u16) -> Option<BucketProbe> {
    match status {
        403 => Some(BucketProbe::OwnedByOther),
        300..=599 => Some(BucketProbe::Missing),
        _ => None,
    }
}

/// Map a CreateBucket service error to a conflict outcome, if it is one
pub(crate) fn classify_create_error(err: &CreateBucketError) -> Option<CreateBucketOutcome> {
    if err.is_bucket_already_owned_by_you() {
        Some(CreateBucketOutcome::AlreadyOwnedByCaller)
    } else if err.is_bucket_already_exists() {
        Some(CreateBucketOutcome::AlreadyOwnedByOther)
    } else {
        None
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn probe_bucket(&self, bucket: &str) -> Result<BucketProbe> {
        match self.inner.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(BucketProbe::Accessible),
            Err(e) => {
                let status = e.raw_response().map(|r| r.status().as_u16());
                match status.and_then(classify_head_status) {
                    Some(probe) => {
                        tracing::debug!("HeadBucket {bucket} answered {status:?}: {probe:?}");
                        Ok(probe)
                    }
                    // No response at all: dispatch, timeout or transport failure
                    None => Err(Error::Provider(format!(
                        "failed to check bucket {bucket}: {}",
                        sdk_message(&e)
                    ))),
                }
            }
        }
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
    ) -> Result<CreateBucketOutcome> {
        let mut request = self.inner.create_bucket().bucket(bucket);
        if let Some(region) = location_constraint {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(CreateBucketOutcome::Created),
            Err(e) => match e.as_service_error().and_then(classify_create_error) {
                Some(outcome) => Ok(outcome),
                None => Err(Error::Provider(format!(
                    "failed to create bucket {bucket}: {}",
                    sdk_message(&e)
                ))),
            },
        }
    }

    async fn allow_public_access(&self, bucket: &str) -> Result<()> {
        let config = PublicAccessBlockConfiguration::builder()
            .block_public_acls(false)
            .ignore_public_acls(false)
            .block_public_policy(false)
            .restrict_public_buckets(false)
            .build();

        self.inner
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(config)
            .send()
            .await
            .map_err(|e| {
                Error::Provider(format!(
                    "failed to update public access block: {}",
                    sdk_message(&e)
                ))
            })?;

        Ok(())
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        self.inner
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| Error::Provider(sdk_message(&e)))?;

        Ok(())
    }

    async fn configure_website(
        &self,
        bucket: &str,
        index_document: &str,
        error_document: &str,
    ) -> Result<()> {
        let index = IndexDocument::builder()
            .suffix(index_document)
            .build()
            .map_err(|e| Error::General(e.to_string()))?;
        let error = ErrorDocument::builder()
            .key(error_document)
            .build()
            .map_err(|e| Error::General(e.to_string()))?;
        let website = WebsiteConfiguration::builder()
            .index_document(index)
            .error_document(error)
            .build();

        self.inner
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(website)
            .send()
            .await
            .map_err(|e| {
                Error::Provider(format!(
                    "failed to configure website hosting: {}",
                    sdk_message(&e)
                ))
            })?;

        Ok(())
    }

    async fn upload(&self, bucket: &str, item: &UploadItem) -> Result<()> {
        if self.multipart.use_multipart(item.size) {
            self.put_multipart(bucket, item).await
        } else {
            self.put_single(bucket, item).await
        }
    }
}
