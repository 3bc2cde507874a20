//! CloudFront distribution implementation

use async_trait::async_trait;
use aws_sdk_cloudfront::error::{BuildError, DisplayErrorContext};
use aws_sdk_cloudfront::types::{
    AllowedMethods, CookiePreference, CustomOriginConfig, DefaultCacheBehavior,
    DistributionConfig, ForwardedValues, HttpVersion, ItemSelection, Method, Origin,
    OriginProtocolPolicy, Origins, PriceClass, ViewerCertificate, ViewerProtocolPolicy,
};

use sd_core::distribution::{DEFAULT_TTL, MAX_TTL, MIN_TTL};
use sd_core::{DistributionRequest, DistributionService, Error, Result};

const HTTP_PORT: i32 = 80;
const HTTPS_PORT: i32 = 443;

/// CloudFront client wrapper
pub struct CloudFrontCdn {
    inner: aws_sdk_cloudfront::Client,
}

impl CloudFrontCdn {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            inner: aws_sdk_cloudfront::Client::new(config),
        }
    }
}

/// Distribution settings for a website-endpoint origin
///
/// The origin only speaks HTTP; viewers are redirected to HTTPS and served
/// with the default CloudFront certificate.
#[allow(deprecated)]
pub fn distribution_config(
    request: &DistributionRequest,
) -> std::result::Result<DistributionConfig, BuildError> {
    let origin = Origin::builder()
        .id(&request.origin_id)
        .domain_name(&request.origin_domain)
        .custom_origin_config(
            CustomOriginConfig::builder()
                .http_port(HTTP_PORT)
                .https_port(HTTPS_PORT)
                .origin_protocol_policy(OriginProtocolPolicy::HttpOnly)
                .build()?,
        )
        .build()?;

    let origins = Origins::builder().quantity(1).items(origin).build()?;

    let allowed_methods = AllowedMethods::builder()
        .quantity(2)
        .items(Method::Get)
        .items(Method::Head)
        .build()?;

    let forwarded_values = ForwardedValues::builder()
        .query_string(false)
        .cookies(
            CookiePreference::builder()
                .forward(ItemSelection::None)
                .build()?,
        )
        .build()?;

    let cache_behavior = DefaultCacheBehavior::builder()
        .target_origin_id(&request.origin_id)
        .viewer_protocol_policy(ViewerProtocolPolicy::RedirectToHttps)
        .allowed_methods(allowed_methods)
        .forwarded_values(forwarded_values)
        .compress(true)
        .min_ttl(MIN_TTL)
        .default_ttl(DEFAULT_TTL)
        .max_ttl(MAX_TTL)
        .build()?;

    let certificate = ViewerCertificate::builder()
        .cloud_front_default_certificate(true)
        .build();

    DistributionConfig::builder()
        .caller_reference(&request.caller_reference)
        .comment(&request.comment)
        .enabled(true)
        .default_root_object(&request.default_root_object)
        .origins(origins)
        .default_cache_behavior(cache_behavior)
        .viewer_certificate(certificate)
        .price_class(PriceClass::PriceClass100)
        .http_version(HttpVersion::Http2)
        .is_ipv6_enabled(true)
        .build()
}

#[async_trait]
impl DistributionService for CloudFrontCdn {
    async fn create_distribution(&self, request: &DistributionRequest) -> Result<String> {
        let config =
            distribution_config(request).map_err(|e| Error::Distribution(e.to_string()))?;

        tracing::debug!(
            "Creating distribution {} for origin {}",
            request.caller_reference,
            request.origin_domain
        );

        let response = self
            .inner
            .create_distribution()
            .distribution_config(config)
            .send()
            .await
            .map_err(|e| Error::Distribution(DisplayErrorContext(&e).to_string()))?;

        response
            .distribution()
            .map(|d| d.domain_name().to_string())
            .filter(|domain| !domain.is_empty())
            .ok_or_else(|| Error::Distribution("response carried no domain name".into()))
    }
}
