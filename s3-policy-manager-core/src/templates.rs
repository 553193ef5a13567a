//! Policy template store: named JSON documents with `${bucket_name}`
//! substitution.

use crate::types::PolicyDocument;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Placeholder token substituted with the target bucket name.
pub const BUCKET_NAME_PLACEHOLDER: &str = "${bucket_name}";

const DEFAULT_TEMPLATES_DIR: &str = "policy_templates";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("policy template '{name}' not found in {dir:?}")]
    NotFound { name: String, dir: PathBuf },

    #[error("invalid JSON in policy template '{name}': {source}")]
    Invalid {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read policy template directory {dir:?}: {source}")]
    Io {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads policy templates from a local directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATES_DIR)
    }
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load a template and render it for the given bucket.
    ///
    /// Substitution runs over the raw file text before parsing, so the
    /// placeholder is replaced uniformly wherever it appears, including
    /// inside key names.
    pub async fn render(
        &self,
        template_name: &str,
        bucket_name: &str,
    ) -> Result<PolicyDocument, TemplateError> {
        let path = self.template_path(template_name);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TemplateError::NotFound {
                    name: template_name.to_string(),
                    dir: self.dir.clone(),
                });
            }
            Err(e) => {
                return Err(TemplateError::Io {
                    dir: self.dir.clone(),
                    source: e,
                });
            }
        };

        let rendered = raw.replace(BUCKET_NAME_PLACEHOLDER, bucket_name);
        PolicyDocument::from_json(&rendered).map_err(|e| TemplateError::Invalid {
            name: template_name.to_string(),
            source: e,
        })
    }

    /// Template names (file stems), sorted lexicographically.
    ///
    /// An absent templates directory is an empty list, not an error.
    pub async fn list(&self) -> Result<Vec<String>, TemplateError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TemplateError::Io {
                    dir: self.dir.clone(),
                    source: e,
                });
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| TemplateError::Io {
            dir: self.dir.clone(),
            source: e,
        })? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn template_path(&self, template_name: &str) -> PathBuf {
        if Path::new(template_name).extension().and_then(|e| e.to_str()) == Some("json") {
            self.dir.join(template_name)
        } else {
            self.dir.join(format!("{template_name}.json"))
        }
    }
}
