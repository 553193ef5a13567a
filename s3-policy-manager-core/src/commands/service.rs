//! S3 Policy Manager Service Layer
//!
//! The service holds the bucket policy client, the caller's account id, and
//! the two local stores, and provides the high-level operations (apply,
//! remove, restore, listings) the CLI dispatches to. Everything is an
//! explicitly constructed, passed-in object; there is no global client.

use crate::aws::s3_client::{AwsS3Client, BucketPolicyApi};
use crate::aws::sts::caller_account_id;
use crate::backup::{BackupInfo, BackupStore};
use crate::error::S3PolicyManagerResult;
use crate::templates::TemplateStore;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sts::Client as StsClient;

pub struct S3PolicyManagerService {
    pub(crate) api: Box<dyn BucketPolicyApi>,
    pub(crate) account_id: String,
    pub(crate) templates: TemplateStore,
    pub(crate) backups: BackupStore,
}

impl S3PolicyManagerService {
    /// Create a service instance against the real AWS APIs.
    ///
    /// Configuration is loaded using the default credential provider chain,
    /// and the caller's account id is resolved once up front.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller identity cannot be resolved.
    pub async fn new() -> S3PolicyManagerResult<Self> {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;

        let sts_client = StsClient::new(&config);
        let account_id = caller_account_id(&sts_client).await?;

        Ok(Self::with_components(
            Box::new(AwsS3Client::new(S3Client::new(&config))),
            account_id,
            TemplateStore::default(),
            BackupStore::default(),
        ))
    }

    /// Assemble a service from its parts. Used by `new()` and by tests that
    /// substitute an in-memory `BucketPolicyApi`.
    pub fn with_components(
        api: Box<dyn BucketPolicyApi>,
        account_id: String,
        templates: TemplateStore,
        backups: BackupStore,
    ) -> Self {
        Self {
            api,
            account_id,
            templates,
            backups,
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Names of all buckets in the account, for target selection.
    pub async fn list_buckets(&self) -> S3PolicyManagerResult<Vec<String>> {
        Ok(self.api.list_buckets().await?)
    }

    /// Available template names.
    pub async fn list_templates(&self) -> S3PolicyManagerResult<Vec<String>> {
        Ok(self.templates.list().await?)
    }

    /// Backups for this account, optionally restricted to one bucket.
    pub async fn list_backups(
        &self,
        bucket: Option<&str>,
    ) -> S3PolicyManagerResult<Vec<BackupInfo>> {
        Ok(self.backups.list(&self.account_id, bucket).await?)
    }

    // apply() is in apply.rs, remove() in remove.rs, restore() in restore.rs
}
