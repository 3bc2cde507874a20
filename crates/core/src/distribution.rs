//! CloudFront distribution request construction
//!
//! The distribution always fronts the bucket's website endpoint, never the
//! REST endpoint, so index and error documents keep working.

use serde::Serialize;

use crate::upload::ENTRY_POINT_KEY;

/// Fixed cache TTLs, in seconds
pub const MIN_TTL: i64 = 0;
pub const DEFAULT_TTL: i64 = 86_400;
pub const MAX_TTL: i64 = 31_536_000;

pub const DISTRIBUTION_COMMENT: &str = "SPA CloudFront distribution";

/// Regions whose website endpoint uses the `s3-website-<region>` form
const DASH_WEBSITE_REGIONS: &[&str] = &[
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "eu-west-1",
    "sa-east-1",
    "us-gov-west-1",
];

/// Input for creating a distribution in front of a website bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionRequest {
    pub caller_reference: String,
    pub origin_id: String,
    pub origin_domain: String,
    pub comment: String,
    pub default_root_object: String,
}

impl DistributionRequest {
    /// Build the request for `bucket`, stamping the caller reference with `unix_seconds`
    pub fn for_bucket(bucket: &str, region: &str, app_name: &str, unix_seconds: i64) -> Self {
        Self {
            caller_reference: caller_reference(app_name, unix_seconds),
            origin_id: format!("s3-website-{bucket}"),
            origin_domain: website_endpoint(bucket, region),
            comment: DISTRIBUTION_COMMENT.to_string(),
            default_root_object: ENTRY_POINT_KEY.to_string(),
        }
    }

    /// Same as [`Self::for_bucket`], using the current time
    pub fn now(bucket: &str, region: &str, app_name: &str) -> Self {
        Self::for_bucket(bucket, region, app_name, jiff::Timestamp::now().as_second())
    }
}

/// Caller reference of the form `<app>-<unix seconds>`
pub fn caller_reference(app_name: &str, unix_seconds: i64) -> String {
    format!("{app_name}-{unix_seconds}")
}

/// Static-website endpoint host name for a bucket
pub fn website_endpoint(bucket: &str, region: &str) -> String {
    let suffix = if region.starts_with("cn-") {
        "amazonaws.com.cn"
    } else {
        "amazonaws.com"
    };
    if DASH_WEBSITE_REGIONS.contains(&region) {
        format!("{bucket}.s3-website-{region}.{suffix}")
    } else {
        format!("{bucket}.s3-website.{region}.{suffix}")
    }
}

/// Public HTTPS URL for a distribution domain
pub fn public_url(domain: &str) -> crate::Result<String> {
    let url = format!("https://{domain}");
    let parsed = url::Url::parse(&url)
        .map_err(|e| crate::Error::Distribution(format!("invalid domain '{domain}': {e}")))?;
    if parsed.host_str() != Some(domain) {
        return Err(crate::Error::Distribution(format!(
            "invalid domain '{domain}'"
        )));
    }
    Ok(url)
}
