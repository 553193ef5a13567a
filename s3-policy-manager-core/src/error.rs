//! Crate-level error type aggregating the per-concern errors.

use crate::aws::AwsError;
use crate::backup::BackupError;
use crate::templates::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum S3PolicyManagerError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error(transparent)]
    Aws(#[from] AwsError),

    #[error("no statement with Sid '{sid}' found in the bucket policy")]
    SidNotFound { sid: String },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}

pub type S3PolicyManagerResult<T> = Result<T, S3PolicyManagerError>;
