//! YouTube Learning Tracker
//!
//! Tracks videos a user intends to watch: metadata, a priority, a completion
//! status, and topic keywords derived from the transcript. Persistence is
//! split across an xlsx workbook (human browsing) and a JSON sidecar
//! (derived data), kept consistent by url-keyed lookups.

pub mod config;
pub mod model;
pub mod store;
pub mod topics;
pub mod youtube;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::model::{Bucket, Priority, Status, VideoRecord};
pub use crate::store::{DerivedData, Library, SidecarStore, WorkbookStore};
pub use crate::topics::TopicExtractor;
pub use crate::youtube::{TranscriptError, VideoDetails, VideoProvider, YtDlpProvider};
