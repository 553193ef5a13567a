//! AWS SDK integration: S3 bucket policy client and caller identity.

pub mod s3_client;
pub(crate) mod sts;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("AWS configuration error: {0}")]
    ConfigError(String),
    #[error("remote error [{code}]: {message}")]
    Remote { code: String, message: String },
    #[error("policy document error: {0}")]
    PolicyError(String),
}

pub type AwsResult<T> = Result<T, AwsError>;
