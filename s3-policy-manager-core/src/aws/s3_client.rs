//! S3 bucket policy operations behind a mockable trait.

use crate::aws::{AwsError, AwsResult};
use async_trait::async_trait;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::Client as S3Client;
use std::fmt;

const NO_SUCH_BUCKET_POLICY: &str = "NoSuchBucketPolicy";

/// The remote operations the manager needs. Implemented by [`AwsS3Client`]
/// for real use and by in-memory fakes in tests, so the merge and backup
/// orchestration is testable without network access.
#[async_trait]
pub trait BucketPolicyApi: Send + Sync {
    /// Fetch the bucket's policy as the provider's raw JSON string.
    /// `None` when no policy is configured; that is not an error.
    async fn get_policy(&self, bucket: &str) -> AwsResult<Option<String>>;

    /// Replace the bucket's policy.
    async fn put_policy(&self, bucket: &str, policy_json: &str) -> AwsResult<()>;

    /// Remove the bucket's policy entirely. Idempotent: deleting a policy
    /// that does not exist succeeds.
    async fn delete_policy(&self, bucket: &str) -> AwsResult<()>;

    /// Names of all buckets in the account.
    async fn list_buckets(&self) -> AwsResult<Vec<String>>;
}

pub struct AwsS3Client {
    client: S3Client,
}

impl AwsS3Client {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BucketPolicyApi for AwsS3Client {
    async fn get_policy(&self, bucket: &str) -> AwsResult<Option<String>> {
        match self.client.get_bucket_policy().bucket(bucket).send().await {
            Ok(output) => Ok(output.policy),
            Err(err) if is_no_such_policy(&err) => Ok(None),
            Err(err) => Err(remote("GetBucketPolicy", bucket, &err)),
        }
    }

    async fn put_policy(&self, bucket: &str, policy_json: &str) -> AwsResult<()> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy_json)
            .send()
            .await
            .map_err(|err| remote("PutBucketPolicy", bucket, &err))?;
        Ok(())
    }

    async fn delete_policy(&self, bucket: &str) -> AwsResult<()> {
        match self.client.delete_bucket_policy().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) if is_no_such_policy(&err) => Ok(()),
            Err(err) => Err(remote("DeleteBucketPolicy", bucket, &err)),
        }
    }

    async fn list_buckets(&self) -> AwsResult<Vec<String>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| remote("ListBuckets", "account", &err))?;
        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(ToString::to_string))
            .collect())
    }
}

fn is_no_such_policy<E, R>(err: &SdkError<E, R>) -> bool
where
    E: ProvideErrorMetadata,
{
    err.as_service_error().and_then(|e| e.code()) == Some(NO_SUCH_BUCKET_POLICY)
}

fn remote<E, R>(operation: &str, target: &str, err: &SdkError<E, R>) -> AwsError
where
    E: ProvideErrorMetadata + fmt::Debug,
    R: fmt::Debug,
{
    let code = err
        .as_service_error()
        .and_then(|e| e.code())
        .unwrap_or("Unknown")
        .to_string();
    AwsError::Remote {
        code,
        message: format!("{operation} failed for '{target}': {err:?}"),
    }
}
