//! Restore logic: put a previously backed-up policy back on a bucket.

use crate::aws::AwsError;
use crate::backup::BackupStore;
use crate::error::S3PolicyManagerResult;
use std::path::Path;

impl super::service::S3PolicyManagerService {
    /// Restore a bucket's policy from a backup file.
    ///
    /// No backup is taken first: a restore is an explicit request to revert,
    /// and the file being restored is itself a snapshot. Errors abort
    /// immediately; there is no per-bucket loop here.
    pub async fn restore(&self, bucket: &str, backup_file: &Path) -> S3PolicyManagerResult<()> {
        let document = BackupStore::load(backup_file).await?;
        let payload = document.to_json().map_err(|e| {
            AwsError::PolicyError(format!("failed to serialize restored policy: {e}"))
        })?;
        self.api.put_policy(bucket, &payload).await?;
        Ok(())
    }
}
