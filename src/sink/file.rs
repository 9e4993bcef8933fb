use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::FeatureSink;
use crate::geojson::FeatureCollection;

/// Prints the collection as pretty JSON on stdout.
pub struct StdoutSink;

#[async_trait]
impl FeatureSink for StdoutSink {
    async fn submit(&self, collection: &FeatureCollection) -> Result<()> {
        let json = serde_json::to_string_pretty(collection)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{json}")?;
        out.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        "stdout".to_string()
    }
}

/// Writes the collection to a file, replacing it atomically.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeatureSink for FileSink {
    async fn submit(&self, collection: &FeatureCollection) -> Result<()> {
        let body = serde_json::to_vec(collection)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
