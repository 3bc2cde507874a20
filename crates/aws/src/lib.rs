//! sd-aws: AWS SDK adapters for spa-deployer
//!
//! This crate provides the implementations of the ObjectStore and
//! DistributionService traits using aws-sdk-s3 and aws-sdk-cloudfront.
//! It is the only crate that directly depends on the AWS SDK.

pub mod cloudfront;
pub mod multipart;
pub mod provider;
pub mod s3;

pub use cloudfront::CloudFrontCdn;
pub use multipart::MultipartConfig;
pub use provider::AwsProvider;
pub use s3::S3Store;
