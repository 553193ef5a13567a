//! Caller identity lookup, used to scope the backup directory per account.

use crate::aws::{AwsError, AwsResult};
use aws_sdk_sts::Client as StsClient;

pub(crate) async fn caller_account_id(client: &StsClient) -> AwsResult<String> {
    let identity = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| AwsError::ConfigError(format!("GetCallerIdentity failed: {e:?}")))?;

    identity
        .account()
        .map(ToString::to_string)
        .ok_or_else(|| AwsError::ConfigError("caller identity has no account id".to_string()))
}
