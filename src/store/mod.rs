//! Dual-store persistence: a tabular workbook for human browsing and a keyed
//! JSON sidecar for derived data, kept logically consistent by url-keyed
//! lookups.

pub mod sidecar;
pub mod workbook;

pub use sidecar::{DerivedData, SidecarStore};
pub use workbook::WorkbookStore;

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::model::{Bucket, Priority, Status, VideoRecord};
use crate::topics::TopicExtractor;
use crate::youtube::VideoProvider;

/// Consistency manager over the two redundant stores. Every mutating
/// operation persists before returning; there is no rollback, so a failure
/// between the two writes can leave the sidecar one step behind the workbook.
pub struct Library {
    workbook: WorkbookStore,
    sidecar: SidecarStore,
}

impl Library {
    /// Open both stores, creating whichever is missing
    pub async fn open<P: AsRef<Path>, Q: AsRef<Path>>(
        workbook_path: P,
        sidecar_path: Q,
    ) -> Result<Self> {
        let workbook = WorkbookStore::load_or_create(workbook_path)?;
        let sidecar = SidecarStore::load_or_default(sidecar_path).await?;
        info!(
            "📊 Library opened: {} videos tracked, {} sidecar entries",
            workbook.len(),
            sidecar.len()
        );
        Ok(Self { workbook, sidecar })
    }

    /// Append a new video row to the sheet of its duration bucket. Touches
    /// the tabular store only.
    pub fn record_video(
        &mut self,
        url: &str,
        title: &str,
        author: &str,
        duration_hours: f64,
        priority: Priority,
    ) -> Result<Bucket> {
        let record = VideoRecord {
            url: url.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            duration_hours,
            priority,
            status: Status::NotStarted,
            topics: Vec::new(),
        };
        let bucket = self.workbook.append(record)?;
        self.workbook.save()?;
        info!("🎬 Recorded '{}' in sheet '{}'", title, bucket.sheet_name());
        Ok(bucket)
    }

    /// Upsert topics and status for a url. Touches the auxiliary store only.
    pub async fn update_derived(
        &mut self,
        url: &str,
        topics: Vec<String>,
        status: Status,
    ) -> Result<()> {
        self.sidecar.upsert(url, topics, status);
        self.sidecar.save().await?;
        Ok(())
    }

    /// Flip the completion status of a video, persisting the workbook first
    /// and the sidecar second within the same logical update. Keyed by url in
    /// both stores.
    pub async fn toggle_status(&mut self, url: &str) -> Result<Status> {
        let row = self
            .workbook
            .find_mut(url)
            .ok_or_else(|| anyhow!("No tracked video with url: {}", url))?;
        let new_status = row.status.toggled();
        row.status = new_status;
        self.workbook.save()?;

        self.sidecar.set_status(url, new_status);
        self.sidecar.save().await?;

        info!("🔄 '{}' is now {}", url, new_status);
        Ok(new_status)
    }

    /// On-demand compute-and-cache for topics: return the cached list if one
    /// exists, otherwise fetch the transcript, extract keywords, and store
    /// them in the sidecar. The video's current status is preserved.
    pub async fn ensure_topics(
        &mut self,
        url: &str,
        provider: &dyn VideoProvider,
        extractor: &TopicExtractor,
        count: usize,
    ) -> Result<Vec<String>> {
        if let Some(entry) = self.sidecar.get(url) {
            if !entry.topics.is_empty() {
                return Ok(entry.topics.clone());
            }
        }

        let video_id = provider.video_id(url)?;
        let transcript = provider.fetch_transcript(&video_id).await?;
        self.ensure_topics_from(url, &transcript, extractor, count).await
    }

    /// Same compute-and-cache step for a transcript the caller already
    /// holds, avoiding a second provider round trip
    pub async fn ensure_topics_from(
        &mut self,
        url: &str,
        transcript: &str,
        extractor: &TopicExtractor,
        count: usize,
    ) -> Result<Vec<String>> {
        if let Some(entry) = self.sidecar.get(url) {
            if !entry.topics.is_empty() {
                return Ok(entry.topics.clone());
            }
        }

        let topics = extractor.extract_keywords(transcript, count);
        if topics.is_empty() {
            warn!("No topics extractable from transcript for {}", url);
        }

        let status = self.current_status(url).unwrap_or(Status::NotStarted);
        self.sidecar.upsert(url, topics.clone(), status);
        self.sidecar.save().await?;

        info!("🏷️ Cached {} topics for {}", topics.len(), url);
        Ok(topics)
    }

    /// Status for a url, preferring the workbook row over the sidecar entry
    pub fn current_status(&self, url: &str) -> Option<Status> {
        self.workbook
            .find(url)
            .map(|row| row.status)
            .or_else(|| self.sidecar.get(url).map(|entry| entry.status))
    }

    pub fn find(&self, url: &str) -> Option<&VideoRecord> {
        self.workbook.find(url)
    }

    pub fn derived(&self, url: &str) -> Option<&DerivedData> {
        self.sidecar.get(url)
    }

    /// All records with sidecar topics merged in, sorted by priority
    /// (High first), stable within a priority
    pub fn records_by_priority(&self) -> Vec<VideoRecord> {
        let mut records: Vec<VideoRecord> = self
            .workbook
            .records()
            .into_iter()
            .map(|row| {
                let mut record = row.clone();
                if let Some(entry) = self.sidecar.get(&record.url) {
                    record.topics = entry.topics.clone();
                }
                record
            })
            .collect();
        records.sort_by_key(|r| r.priority);
        records
    }

    pub fn len(&self) -> usize {
        self.workbook.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workbook.is_empty()
    }
}
