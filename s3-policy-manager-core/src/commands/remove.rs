//! Remove logic: strip a statement by Sid from each target bucket's policy.

use super::apply::parse_policy;
use crate::aws::AwsError;
use crate::error::S3PolicyManagerResult;
use crate::merge::remove_by_sid;
use crate::types::{BucketOutcome, OutcomeStatus};

impl super::service::S3PolicyManagerService {
    /// Remove the statement with the given Sid from each bucket in order.
    ///
    /// A bucket with no policy at all is skipped; a policy that exists but
    /// has no such Sid is a per-bucket failure. As with `apply`, failures
    /// never abort the loop.
    pub async fn remove(&self, buckets: &[String], sid: &str, backup: bool) -> Vec<BucketOutcome> {
        let mut outcomes = Vec::with_capacity(buckets.len());
        for bucket in buckets {
            let status = match self.remove_one(bucket, sid, backup).await {
                Ok(status) => status,
                Err(e) => {
                    log::error!("remove failed for bucket '{bucket}': {e}");
                    OutcomeStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(BucketOutcome {
                bucket: bucket.clone(),
                status,
            });
        }
        outcomes
    }

    async fn remove_one(
        &self,
        bucket: &str,
        sid: &str,
        backup: bool,
    ) -> S3PolicyManagerResult<OutcomeStatus> {
        let Some(current_raw) = self.api.get_policy(bucket).await? else {
            return Ok(OutcomeStatus::Skipped {
                reason: "no policy configured".to_string(),
            });
        };

        let backup_path = if backup {
            self.backups
                .save(bucket, &self.account_id, Some(&current_raw))
                .await?
        } else {
            None
        };

        let current = parse_policy(bucket, &current_raw)?;
        let remaining = remove_by_sid(current, sid)?;

        // The provider rejects a policy with zero statements; deleting the
        // policy is the only way to express "nothing left".
        if remaining.statement.is_empty() {
            self.api.delete_policy(bucket).await?;
            return Ok(OutcomeStatus::Removed {
                backup: backup_path,
                policy_deleted: true,
            });
        }

        let payload = remaining.to_json().map_err(|e| {
            AwsError::PolicyError(format!("failed to serialize remaining policy: {e}"))
        })?;
        self.api.put_policy(bucket, &payload).await?;
        Ok(OutcomeStatus::Removed {
            backup: backup_path,
            policy_deleted: false,
        })
    }
}
