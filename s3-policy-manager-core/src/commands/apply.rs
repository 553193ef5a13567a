//! Apply logic: merge a rendered template into each target bucket's policy.

use crate::aws::AwsError;
use crate::error::S3PolicyManagerResult;
use crate::merge::merge;
use crate::types::{BucketOutcome, OutcomeStatus, PolicyDocument};

impl super::service::S3PolicyManagerService {
    /// Apply a template to each bucket in order.
    ///
    /// The template is validated once up front, so a missing or broken
    /// template aborts before any bucket is touched. After that a failure on
    /// one bucket is recorded in its outcome and processing continues with
    /// the remaining buckets.
    pub async fn apply(
        &self,
        buckets: &[String],
        template_name: &str,
        backup: bool,
    ) -> S3PolicyManagerResult<Vec<BucketOutcome>> {
        if let Some(first) = buckets.first() {
            self.templates.render(template_name, first).await?;
        }

        let mut outcomes = Vec::with_capacity(buckets.len());
        for bucket in buckets {
            let status = match self.apply_one(bucket, template_name, backup).await {
                Ok(status) => status,
                Err(e) => {
                    log::error!("apply failed for bucket '{bucket}': {e}");
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
        Ok(outcomes)
    }

    async fn apply_one(
        &self,
        bucket: &str,
        template_name: &str,
        backup: bool,
    ) -> S3PolicyManagerResult<OutcomeStatus> {
        let current_raw = self.api.get_policy(bucket).await?;

        let backup_path = if backup {
            self.backups
                .save(bucket, &self.account_id, current_raw.as_deref())
                .await?
        } else {
            None
        };

        let incoming = self.templates.render(template_name, bucket).await?;
        let current = current_raw
            .as_deref()
            .map(|raw| parse_policy(bucket, raw))
            .transpose()?;

        let merged = merge(current, incoming);
        let payload = merged.to_json().map_err(|e| {
            AwsError::PolicyError(format!("failed to serialize merged policy: {e}"))
        })?;
        self.api.put_policy(bucket, &payload).await?;

        Ok(OutcomeStatus::Applied {
            backup: backup_path,
        })
    }
}

pub(crate) fn parse_policy(bucket: &str, raw: &str) -> Result<PolicyDocument, AwsError> {
    PolicyDocument::from_json(raw).map_err(|e| {
        AwsError::PolicyError(format!(
            "bucket '{bucket}' returned an unparseable policy: {e}"
        ))
    })
}
