//! Timestamped local backups of bucket policies, grouped per account.

use crate::types::PolicyDocument;
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

const BACKUP_FILE_PREFIX: &str = "bucket_policy_backup_";
const BACKUP_DIR_PREFIX: &str = "policy_backups_";

// UTC, ISO-8601 basic form with millisecond grain. Lexicographic filename
// order is recency order, and same-second invocations cannot collide.
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3fZ";

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("refusing to overwrite existing backup {path:?}")]
    WriteFailed { path: PathBuf },

    #[error("backup file {path:?} is not a valid policy document: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("backup I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One backup file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub file_name: String,
}

/// Persists policy snapshots under `policy_backups_<account_id>/`.
///
/// Backups are written before every mutating action (unless suppressed) and
/// never deleted by this tool.
#[derive(Debug, Clone)]
pub struct BackupStore {
    root: PathBuf,
}

impl Default for BackupStore {
    fn default() -> Self {
        Self::new(".")
    }
}

impl BackupStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Snapshot the bucket's current policy.
    ///
    /// A bucket with no policy has nothing to back up; that case is a no-op
    /// returning `None`. The raw provider response is written byte-for-byte,
    /// atomically (temp file + rename), so a later restore puts back exactly
    /// what was fetched.
    pub async fn save(
        &self,
        bucket: &str,
        account_id: &str,
        raw_policy: Option<&str>,
    ) -> Result<Option<PathBuf>, BackupError> {
        let Some(raw) = raw_policy else {
            return Ok(None);
        };

        let dir = self.account_dir(account_id);
        fs::create_dir_all(&dir).await.map_err(|e| BackupError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        let path = dir.join(format!("{BACKUP_FILE_PREFIX}{bucket}_{timestamp}.json"));
        if fs::try_exists(&path).await.map_err(|e| BackupError::Io {
            path: path.clone(),
            source: e,
        })? {
            return Err(BackupError::WriteFailed { path });
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw).await.map_err(|e| BackupError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &path).await.map_err(|e| BackupError::Io {
            path: path.clone(),
            source: e,
        })?;

        Ok(Some(path))
    }

    /// List backups for the account, most recent first, optionally filtered
    /// to one bucket. A missing backup directory is an empty list.
    pub async fn list(
        &self,
        account_id: &str,
        bucket: Option<&str>,
    ) -> Result<Vec<BackupInfo>, BackupError> {
        let dir = self.account_dir(account_id);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(BackupError::Io {
                    path: dir,
                    source: e,
                });
            }
        };

        let wanted_prefix = match bucket {
            Some(bucket) => format!("{BACKUP_FILE_PREFIX}{bucket}_"),
            None => BACKUP_FILE_PREFIX.to_string(),
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| BackupError::Io {
            path: dir.clone(),
            source: e,
        })? {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with(&wanted_prefix) && file_name.ends_with(".json") {
                backups.push(BackupInfo {
                    file_name: file_name.to_string(),
                    path,
                });
            }
        }

        // Timestamps sort lexicographically, so name order is time order.
        backups.sort_by(|a, b| b.file_name.cmp(&a.file_name));
        Ok(backups)
    }

    /// Read a backup file back into a policy document.
    pub async fn load(path: &Path) -> Result<PolicyDocument, BackupError> {
        let raw = fs::read_to_string(path).await.map_err(|e| BackupError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        PolicyDocument::from_json(&raw).map_err(|e| BackupError::Invalid {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn account_dir(&self, account_id: &str) -> PathBuf {
        self.root.join(format!("{BACKUP_DIR_PREFIX}{account_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ACCOUNT: &str = "123456789012";

    fn store() -> (TempDir, BackupStore) {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let store = BackupStore::new(temp_dir.path());
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let (_guard, store) = store();
        let raw = r#"{"Version":"2012-10-17","Statement":[{"Sid":"A","Effect":"Allow"}]}"#;

        let path = store
            .save("my-bucket", ACCOUNT, Some(raw))
            .await
            .expect("should save")
            .expect("should write a file");

        let loaded = BackupStore::load(&path).await.expect("should load");
        assert_eq!(loaded, PolicyDocument::from_json(raw).expect("should parse"));
    }

    #[tokio::test]
    async fn test_save_writes_provider_bytes_exactly() {
        let (_guard, store) = store();
        // Odd whitespace and key order must survive untouched.
        let raw = "{ \"Statement\" : [ {\"Sid\":\"A\"} ],\n\"Version\":\"2012-10-17\" }";

        let path = store
            .save("my-bucket", ACCOUNT, Some(raw))
            .await
            .expect("should save")
            .expect("should write a file");

        let written = fs::read_to_string(&path).await.expect("should read back");
        assert_eq!(written, raw);
    }

    #[tokio::test]
    async fn test_save_without_policy_is_a_noop() {
        let (guard, store) = store();

        let result = store
            .save("my-bucket", ACCOUNT, None)
            .await
            .expect("should succeed");

        assert_eq!(result, None);
        // No account directory should appear either.
        assert!(!guard.path().join(format!("policy_backups_{ACCOUNT}")).exists());
    }

    #[tokio::test]
    async fn test_list_filters_by_bucket_and_sorts_recent_first() {
        let (guard, store) = store();
        let dir = guard.path().join(format!("policy_backups_{ACCOUNT}"));
        fs::create_dir_all(&dir).await.expect("should create dir");
        for name in [
            "bucket_policy_backup_alpha_20250101T000000.000Z.json",
            "bucket_policy_backup_alpha_20250601T000000.000Z.json",
            "bucket_policy_backup_beta_20250301T000000.000Z.json",
            "unrelated.json",
        ] {
            fs::write(dir.join(name), "{}").await.expect("should write");
        }

        let all = store.list(ACCOUNT, None).await.expect("should list");
        assert_eq!(all.len(), 3);
        assert!(all[0].file_name.contains("20250601"));

        let alpha = store
            .list(ACCOUNT, Some("alpha"))
            .await
            .expect("should list");
        assert_eq!(alpha.len(), 2);
        assert!(alpha.iter().all(|b| b.file_name.contains("_alpha_")));
    }

    #[tokio::test]
    async fn test_list_missing_directory_is_empty() {
        let (_guard, store) = store();
        let backups = store.list(ACCOUNT, None).await.expect("should not error");
        assert!(backups.is_empty());
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_backup() {
        let (guard, _store) = store();
        let bad = guard.path().join("bad.json");
        fs::write(&bad, "not json").await.expect("should write");
        let err = BackupStore::load(&bad).await.expect_err("should fail");
        assert!(matches!(err, BackupError::Invalid { .. }));

        let empty = guard.path().join("empty.json");
        fs::write(&empty, "{}").await.expect("should write");
        let err = BackupStore::load(&empty).await.expect_err("should fail");
        assert!(matches!(err, BackupError::Invalid { .. }));
    }
}
