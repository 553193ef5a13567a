//! Commands module - service layer for S3 policy manager operations

mod apply;
mod remove;
mod restore;
pub(crate) mod service;

pub use service::S3PolicyManagerService;
