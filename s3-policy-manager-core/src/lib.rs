//! This crate provides the core business logic for the S3 bucket policy manager:
//! - Policy templates with `${bucket_name}` substitution
//! - Sid-keyed statement merge and removal
//! - Timestamped local policy backups
//! - Guarded S3 bucket policy operations (get/put/delete, bucket listing)
//!

mod aws;
mod backup;
pub mod commands;
mod error;
mod merge;
mod templates;
mod types;

// Re-exports for a small, focused public API
pub use aws::s3_client::{AwsS3Client, BucketPolicyApi};
pub use aws::{AwsError, AwsResult};
pub use backup::{BackupError, BackupInfo, BackupStore};
pub use commands::S3PolicyManagerService;
pub use error::{S3PolicyManagerError, S3PolicyManagerResult};
pub use merge::{merge, remove_by_sid};
pub use templates::{TemplateError, TemplateStore, BUCKET_NAME_PLACEHOLDER};
pub use types::{BucketOutcome, OutcomeStatus, PolicyDocument, Statement, POLICY_VERSION};
