//! Shared types for policy documents and per-bucket operation outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// IAM policy language version emitted when a template omits one.
pub const POLICY_VERSION: &str = "2012-10-17";

/// A bucket policy document.
///
/// Only `Version` and `Statement` are modeled; every other top-level field
/// (`Id`, ...) is preserved verbatim through the flattened map so that a
/// fetched policy survives a merge-and-put cycle untouched apart from the
/// statements themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version", default = "default_version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statement: Vec<Statement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> String {
    POLICY_VERSION.to_string()
}

impl PolicyDocument {
    /// Parse a policy document from its provider wire form.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serialize back to the provider wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A single policy statement, kept as opaque JSON.
///
/// The manager keys statements by `Sid` for merge and removal; every other
/// field passes through unexamined, so statements using provider features
/// this tool has never heard of are not disturbed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statement(Value);

impl Statement {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Statement identifier, when the statement carries one.
    pub fn sid(&self) -> Option<&str> {
        self.0.get("Sid").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Result of processing one bucket within an `apply` or `remove` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketOutcome {
    pub bucket: String,
    pub status: OutcomeStatus,
}

impl BucketOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    /// Template applied; `backup` is the snapshot written beforehand, if any.
    Applied { backup: Option<PathBuf> },
    /// Statement removed; the whole policy was deleted when nothing remained.
    Removed {
        backup: Option<PathBuf>,
        policy_deleted: bool,
    },
    /// Nothing to do for this bucket.
    Skipped { reason: String },
    /// Processing failed; the loop continued with the next bucket.
    Failed { error: String },
}
