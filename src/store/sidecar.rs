use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::model::Status;

/// Derived, frequently-updated fields held per url in the auxiliary store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DerivedData {
    pub topics: Vec<String>,
    pub status: Status,
}

/// Auxiliary keyed store: a single JSON document mapping url -> derived data.
/// Duplicates topics/status alongside the workbook for resilience.
#[derive(Debug)]
pub struct SidecarStore {
    path: PathBuf,
    data: HashMap<String, DerivedData>,
}

impl SidecarStore {
    /// Load the document if it exists, otherwise start empty
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let data = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let data: HashMap<String, DerivedData> = serde_json::from_str(&content)
                .map_err(|e| anyhow!("Corrupt sidecar store {}: {}", path.display(), e))?;
            debug!("📁 Loaded {} sidecar entries from {}", data.len(), path.display());
            data
        } else {
            HashMap::new()
        };

        Ok(Self { path, data })
    }

    pub fn get(&self, url: &str) -> Option<&DerivedData> {
        self.data.get(url)
    }

    /// Insert or replace the derived data for a url (in memory only;
    /// call `save` to persist)
    pub fn upsert(&mut self, url: &str, topics: Vec<String>, status: Status) {
        self.data
            .insert(url.to_string(), DerivedData { topics, status });
    }

    /// Update only the status, keeping cached topics. Creates an entry with
    /// no topics if the url is unknown.
    pub fn set_status(&mut self, url: &str, status: Status) {
        self.data
            .entry(url.to_string())
            .and_modify(|d| d.status = status)
            .or_insert(DerivedData {
                topics: Vec::new(),
                status,
            });
    }

    /// Write the document to disk, pretty-printed
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json_content = serde_json::to_string_pretty(&self.data)?;
        tokio::fs::write(&self.path, json_content).await?;
        info!("💾 Saved {} sidecar entries to {}", self.data.len(), self.path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_data.json");

        let mut store = SidecarStore::load_or_default(&path).await.unwrap();
        assert!(store.is_empty());

        store.upsert(
            "https://youtu.be/dQw4w9WgXcQ",
            vec!["guard".to_string(), "sweep".to_string()],
            Status::NotStarted,
        );
        store.save().await.unwrap();

        let reloaded = SidecarStore::load_or_default(&path).await.unwrap();
        let entry = reloaded.get("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(entry.topics, vec!["guard".to_string(), "sweep".to_string()]);
        assert_eq!(entry.status, Status::NotStarted);
    }

    #[tokio::test]
    async fn test_set_status_keeps_topics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_data.json");

        let mut store = SidecarStore::load_or_default(&path).await.unwrap();
        store.upsert("url-a", vec!["rust".to_string()], Status::NotStarted);
        store.set_status("url-a", Status::Completed);

        let entry = store.get("url-a").unwrap();
        assert_eq!(entry.status, Status::Completed);
        assert_eq!(entry.topics, vec!["rust".to_string()]);
    }

    #[tokio::test]
    async fn test_set_status_on_unknown_url_creates_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_data.json");

        let mut store = SidecarStore::load_or_default(&path).await.unwrap();
        store.set_status("url-b", Status::Completed);

        let entry = store.get("url-b").unwrap();
        assert_eq!(entry.status, Status::Completed);
        assert!(entry.topics.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_data.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        assert!(SidecarStore::load_or_default(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_status_serialized_as_display_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_data.json");

        let mut store = SidecarStore::load_or_default(&path).await.unwrap();
        store.upsert("url-c", vec![], Status::NotStarted);
        store.save().await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(raw.contains("\"Not Started\""));
    }
}
