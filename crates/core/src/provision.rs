//! Bucket provisioning
//!
//! [`ensure_bucket`] settles on a bucket the caller owns, creating one when
//! needed and asking the user how to resolve name conflicts. The remaining
//! steps open the bucket to public reads and enable website hosting.

use serde_json::json;

use crate::config::DEFAULT_REGION;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::request::prompt_required;
use crate::traits::{BucketProbe, CreateBucketOutcome, ObjectStore};
use crate::upload::ENTRY_POINT_KEY;
use crate::validate::{ValidationOutcome, validate_bucket_name};

/// Upper bound on bucket names tried before provisioning gives up
pub const MAX_PROVISION_ATTEMPTS: usize = 10;

/// Location constraint to send with CreateBucket, if any
///
/// The provider's default region rejects an explicit constraint.
pub fn location_constraint(region: &str) -> Option<&str> {
    (region != DEFAULT_REGION).then_some(region)
}

/// Public-read bucket policy granting `s3:GetObject` on every key
pub fn public_read_policy(bucket: &str) -> Result<String> {
    let policy = json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "PublicReadGetObject",
                "Effect": "Allow",
                "Principal": "*",
                "Action": "s3:GetObject",
                "Resource": format!("arn:aws:s3:::{bucket}/*"),
            }
        ]
    });
    Ok(serde_json::to_string_pretty(&policy)?)
}

/// Make sure a usable bucket exists and return its final name
pub async fn ensure_bucket<S: ObjectStore + ?Sized>(
    store: &S,
    prompter: &dyn Prompter,
    bucket: &str,
    region: &str,
) -> Result<String> {
    let mut bucket = bucket.to_string();
    // Set while the previous attempt ended in an unclassified create failure
    let mut create_failed = false;

    for _ in 0..MAX_PROVISION_ATTEMPTS {
        match store.probe_bucket(&bucket).await? {
            BucketProbe::Accessible => {
                create_failed = false;
                match offer_reuse(prompter, &bucket)? {
                    Some(name) => return Ok(name),
                    None => bucket = prompt_bucket_name(prompter)?,
                }
                continue;
            }
            BucketProbe::OwnedByOther => {
                create_failed = false;
                tracing::warn!("Bucket {bucket} already exists and is owned by another account.");
                bucket = prompt_bucket_name(prompter)?;
                continue;
            }
            BucketProbe::Missing => {}
        }

        match store
            .create_bucket(&bucket, location_constraint(region))
            .await
        {
            Ok(CreateBucketOutcome::Created) => {
                tracing::info!("Bucket {bucket} created successfully");
                return Ok(bucket);
            }
            Ok(CreateBucketOutcome::AlreadyOwnedByCaller) => {
                tracing::info!("Bucket {bucket} already exists and is owned by you");
                match offer_reuse(prompter, &bucket)? {
                    Some(name) => return Ok(name),
                    None => bucket = prompt_bucket_name(prompter)?,
                }
            }
            Ok(CreateBucketOutcome::AlreadyOwnedByOther) => {
                tracing::warn!("Bucket {bucket} already exists and is owned by another account.");
                bucket = prompt_bucket_name(prompter)?;
            }
            Err(e) if !create_failed => {
                tracing::error!("Failed to create bucket {bucket}: {e}");
                create_failed = true;
                bucket = prompt_bucket_name(prompter)?;
                continue;
            }
            Err(e) => return Err(e),
        }
        create_failed = false;
    }

    Err(Error::Provider(format!(
        "no usable bucket after {MAX_PROVISION_ATTEMPTS} attempts"
    )))
}

/// Turn off the bucket's public access block
pub async fn allow_public_access<S: ObjectStore + ?Sized>(store: &S, bucket: &str) -> Result<()> {
    tracing::info!("Configuring bucket for public access...");
    store.allow_public_access(bucket).await?;
    tracing::info!("Public access settings updated for bucket: {bucket}");
    Ok(())
}

pub async fn apply_public_read_policy<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
) -> Result<()> {
    tracing::info!("Applying public read bucket policy...");
    let policy = public_read_policy(bucket)?;
    store
        .put_bucket_policy(bucket, &policy)
        .await
        .map_err(|e| Error::Provider(format!("failed to apply bucket policy: {e}")))
}

pub async fn configure_website<S: ObjectStore + ?Sized>(store: &S, bucket: &str) -> Result<()> {
    tracing::info!("Configuring static website hosting");
    store
        .configure_website(bucket, ENTRY_POINT_KEY, ENTRY_POINT_KEY)
        .await
}

/// `Some(bucket)` if the user keeps the existing bucket, `None` to rename
fn offer_reuse(prompter: &dyn Prompter, bucket: &str) -> Result<Option<String>> {
    let reuse = prompter.confirm(&format!(
        "Bucket '{bucket}' already exists. Do you want to use it?"
    ))?;
    if reuse {
        Ok(Some(bucket.to_string()))
    } else {
        tracing::info!("Please provide a new bucket name.");
        Ok(None)
    }
}

/// Ask for a new, syntactically valid bucket name
fn prompt_bucket_name(prompter: &dyn Prompter) -> Result<String> {
    for _ in 0..MAX_PROVISION_ATTEMPTS {
        let name = prompt_required(prompter, "Enter a new bucket name", "Bucket name")?;
        match validate_bucket_name(&name) {
            ValidationOutcome::Valid => return Ok(name),
            ValidationOutcome::Invalid { message, .. } => tracing::warn!("{message}"),
        }
    }
    Err(Error::Config("no valid bucket name entered".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeStore, ScriptedPrompter};

    #[test]
    fn test_location_constraint() {
        assert_eq!(location_constraint("us-east-1"), None);
        assert_eq!(location_constraint("eu-west-1"), Some("eu-west-1"));
    }

    #[test]
    fn test_public_read_policy_embeds_bucket() {
        let policy: serde_json::Value =
            serde_json::from_str(&public_read_policy("shop-site").unwrap()).unwrap();
        let statement = &policy["Statement"][0];
        assert_eq!(policy["Version"], "2012-10-17");
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Principal"], "*");
        assert_eq!(statement["Action"], "s3:GetObject");
        assert_eq!(statement["Resource"], "arn:aws:s3:::shop-site/*");
    }

    #[tokio::test]
    async fn test_missing_bucket_is_created_with_constraint() {
        let store = FakeStore::new();
        let prompter = ScriptedPrompter::new();

        let bucket = ensure_bucket(&store, &prompter, "shop-site", "eu-west-1")
            .await
            .unwrap();
        assert_eq!(bucket, "shop-site");
        assert_eq!(
            store.calls(),
            vec![
                "probe shop-site".to_string(),
                "create shop-site in eu-west-1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_default_region_sends_no_constraint() {
        let store = FakeStore::new();
        let prompter = ScriptedPrompter::new();
        ensure_bucket(&store, &prompter, "shop-site", "us-east-1")
            .await
            .unwrap();
        assert!(store.calls().contains(&"create shop-site".to_string()));
    }

    #[tokio::test]
    async fn test_accessible_bucket_reused() {
        let store = FakeStore::new().probe("shop-site", BucketProbe::Accessible);
        let prompter = ScriptedPrompter::new().confirm(true);

        let bucket = ensure_bucket(&store, &prompter, "shop-site", "us-east-1")
            .await
            .unwrap();
        assert_eq!(bucket, "shop-site");
        assert_eq!(store.calls(), vec!["probe shop-site".to_string()]);
    }

    #[tokio::test]
    async fn test_accessible_bucket_declined_then_new_name() {
        let store = FakeStore::new().probe("shop-site", BucketProbe::Accessible);
        let prompter = ScriptedPrompter::new().confirm(false).answer("shop-site-2");

        let bucket = ensure_bucket(&store, &prompter, "shop-site", "us-east-1")
            .await
            .unwrap();
        assert_eq!(bucket, "shop-site-2");
        assert!(store.calls().contains(&"create shop-site-2".to_string()));
    }

    #[tokio::test]
    async fn test_owned_by_other_forces_rename() {
        let store = FakeStore::new().probe("taken", BucketProbe::OwnedByOther);
        let prompter = ScriptedPrompter::new().answer("mine-now");

        let bucket = ensure_bucket(&store, &prompter, "taken", "us-east-1")
            .await
            .unwrap();
        assert_eq!(bucket, "mine-now");
        assert_eq!(prompter.confirms(), 0);
    }

    #[tokio::test]
    async fn test_create_conflict_owned_by_other_forces_rename() {
        let store = FakeStore::new().create("taken", CreateBucketOutcome::AlreadyOwnedByOther);
        let prompter = ScriptedPrompter::new().answer("mine-now");

        let bucket = ensure_bucket(&store, &prompter, "taken", "us-east-1")
            .await
            .unwrap();
        assert_eq!(bucket, "mine-now");
        assert_eq!(prompter.confirms(), 0);
    }

    #[tokio::test]
    async fn test_create_conflict_owned_by_caller_offers_reuse() {
        let store = FakeStore::new().create("shop-site", CreateBucketOutcome::AlreadyOwnedByCaller);
        let prompter = ScriptedPrompter::new().confirm(true);

        let bucket = ensure_bucket(&store, &prompter, "shop-site", "us-east-1")
            .await
            .unwrap();
        assert_eq!(bucket, "shop-site");
        assert_eq!(prompter.confirms(), 1);
    }

    #[tokio::test]
    async fn test_new_name_is_validated() {
        let store = FakeStore::new().probe("taken", BucketProbe::OwnedByOther);
        let prompter = ScriptedPrompter::new().answer("Bad_Name").answer("good-name");

        let bucket = ensure_bucket(&store, &prompter, "taken", "us-east-1")
            .await
            .unwrap();
        assert_eq!(bucket, "good-name");
    }

    #[tokio::test]
    async fn test_create_failure_prompts_once_then_fatal() {
        let store = FakeStore::new()
            .fail_create("first-try")
            .fail_create("second-try");
        let prompter = ScriptedPrompter::new().answer("second-try");

        let err = ensure_bucket(&store, &prompter, "first-try", "us-east-1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_create_failure_recovers_with_new_name() {
        let store = FakeStore::new().fail_create("first-try");
        let prompter = ScriptedPrompter::new().answer("second-try");

        let bucket = ensure_bucket(&store, &prompter, "first-try", "us-east-1")
            .await
            .unwrap();
        assert_eq!(bucket, "second-try");
    }

    #[tokio::test]
    async fn test_create_failures_separated_by_conflict_each_get_a_rename() {
        let store = FakeStore::new()
            .fail_create("first-try")
            .probe("taken-one", BucketProbe::OwnedByOther)
            .fail_create("third-try");
        let prompter = ScriptedPrompter::new()
            .answer("taken-one")
            .answer("third-try")
            .answer("fourth-try");

        let bucket = ensure_bucket(&store, &prompter, "first-try", "us-east-1")
            .await
            .unwrap();
        assert_eq!(bucket, "fourth-try");
        assert_eq!(prompter.asked().len(), 3);
    }

    #[tokio::test]
    async fn test_create_failure_after_declined_reuse_gets_a_rename() {
        let store = FakeStore::new()
            .fail_create("first-try")
            .probe("mine", BucketProbe::Accessible)
            .fail_create("third-try");
        let prompter = ScriptedPrompter::new()
            .answer("mine")
            .confirm(false)
            .answer("third-try")
            .answer("fourth-try");

        let bucket = ensure_bucket(&store, &prompter, "first-try", "us-east-1")
            .await
            .unwrap();
        assert_eq!(bucket, "fourth-try");
    }

    #[tokio::test]
    async fn test_probe_error_is_fatal() {
        let store = FakeStore::new().fail_probe("shop-site");
        let prompter = ScriptedPrompter::new();

        let err = ensure_bucket(&store, &prompter, "shop-site", "us-east-1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
        assert!(prompter.asked().is_empty());
    }

    #[tokio::test]
    async fn test_publish_steps() {
        let store = FakeStore::new();
        allow_public_access(&store, "shop-site").await.unwrap();
        apply_public_read_policy(&store, "shop-site").await.unwrap();
        configure_website(&store, "shop-site").await.unwrap();
        assert_eq!(
            store.calls(),
            vec![
                "public-access shop-site".to_string(),
                "policy shop-site".to_string(),
                "website shop-site index.html index.html".to_string(),
            ]
        );
    }
}
