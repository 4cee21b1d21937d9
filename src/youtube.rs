use anyhow::{anyhow, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;

/// Metadata returned for a video URL
#[derive(Debug, Clone, PartialEq)]
pub struct VideoDetails {
    pub title: String,
    pub author: String,
    pub duration_hours: f64,
}

/// Transcript fetch outcomes that are not a usable transcript
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("transcript not available for this video")]
    NotFound,
    #[error("transcript provider error: {0}")]
    Provider(String),
}

/// Seam over the metadata/transcript collaborator so the library and tests
/// don't depend on an installed yt-dlp binary
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Extract the 11-character video identifier from a URL
    fn video_id(&self, url: &str) -> Result<String>;

    /// Fetch title, author, and duration for a video URL
    async fn fetch_details(&self, url: &str) -> Result<VideoDetails>;

    /// Fetch the cleaned transcript text for a video id
    async fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError>;
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
    author_name: String,
}

/// Provider backed by the yt-dlp command line tool, with an optional oEmbed
/// HTTP fallback for metadata when the binary is unavailable
pub struct YtDlpProvider {
    config: ProviderConfig,
    client: reqwest::Client,
    id_pattern: Regex,
}

impl YtDlpProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        let id_pattern = Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})(?:[?&#/]|$)")?;

        Ok(Self {
            config,
            client,
            id_pattern,
        })
    }

    /// Check whether the yt-dlp binary can be invoked
    pub async fn is_available(&self) -> bool {
        tokio::process::Command::new(&self.config.ytdlp_binary)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Canonical watch URL for a video id
    pub fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }

    async fn ytdlp_details(&self, url: &str) -> Result<VideoDetails> {
        let output = tokio::process::Command::new(&self.config.ytdlp_binary)
            .args(["-J", "--no-warnings", "--skip-download", url])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("yt-dlp failed for {}: {}", url, stderr.trim()));
        }

        let info: serde_json::Value = serde_json::from_slice(&output.stdout)?;

        let title = info["title"].as_str().unwrap_or("Unknown Title").to_string();
        let author = info["uploader"]
            .as_str()
            .or_else(|| info["channel"].as_str())
            .unwrap_or("Unknown Author")
            .to_string();
        let duration_seconds = info["duration"].as_f64().unwrap_or(0.0);

        Ok(VideoDetails {
            title,
            author,
            duration_hours: duration_seconds / 3600.0,
        })
    }

    async fn oembed_details(&self, url: &str) -> Result<VideoDetails> {
        let response = self
            .client
            .get(&self.config.oembed_endpoint)
            .query(&[("url", url), ("format", "json")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("oEmbed request failed: {}", response.status()));
        }

        let oembed: OEmbedResponse = response.json().await?;
        warn!("⚠️ oEmbed fallback carries no duration; bucketing as Short");

        Ok(VideoDetails {
            title: oembed.title,
            author: oembed.author_name,
            duration_hours: 0.0,
        })
    }
}

#[async_trait]
impl VideoProvider for YtDlpProvider {
    fn video_id(&self, url: &str) -> Result<String> {
        url::Url::parse(url).map_err(|e| anyhow!("Invalid URL '{}': {}", url, e))?;

        self.id_pattern
            .captures(url)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| anyhow!("No video identifier found in URL: {}", url))
    }

    async fn fetch_details(&self, url: &str) -> Result<VideoDetails> {
        // Skip the doomed subprocess attempt when the binary is missing and
        // the fallback can serve instead
        if self.config.enable_oembed_fallback && !self.is_available().await {
            warn!("yt-dlp binary '{}' not available, using oEmbed", self.config.ytdlp_binary);
            return self.oembed_details(url).await;
        }

        match self.ytdlp_details(url).await {
            Ok(details) => {
                info!(
                    "📹 Fetched details: {} by {} ({:.2}h)",
                    details.title, details.author, details.duration_hours
                );
                Ok(details)
            }
            Err(e) if self.config.enable_oembed_fallback => {
                warn!("yt-dlp metadata fetch failed, trying oEmbed: {}", e);
                self.oembed_details(url).await
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError> {
        let scratch = tempfile::tempdir()
            .map_err(|e| TranscriptError::Provider(format!("temp dir: {}", e)))?;
        let outtmpl = scratch.path().join("transcript");

        let output = tokio::process::Command::new(&self.config.ytdlp_binary)
            .args([
                "--write-subs",
                "--write-auto-subs",
                "--sub-langs",
                &self.config.subtitle_lang,
                "--skip-download",
                "--no-warnings",
                "-o",
            ])
            .arg(&outtmpl)
            .arg(Self::watch_url(video_id))
            .output()
            .await
            .map_err(|e| TranscriptError::Provider(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriptError::Provider(stderr.trim().to_string()));
        }

        let subtitle_path = scratch
            .path()
            .join(format!("transcript.{}.vtt", self.config.subtitle_lang));
        if !subtitle_path.exists() {
            debug!("No subtitle track written for video {}", video_id);
            return Err(TranscriptError::NotFound);
        }

        let raw = tokio::fs::read_to_string(&subtitle_path)
            .await
            .map_err(|e| TranscriptError::Provider(e.to_string()))?;

        let transcript = clean_vtt(&raw);
        if transcript.is_empty() {
            return Err(TranscriptError::NotFound);
        }

        info!(
            "📜 Fetched transcript for {} ({} chars)",
            video_id,
            transcript.len()
        );
        Ok(transcript)
    }
}

/// Reduce a WebVTT document to plain transcript text: drop the header block,
/// cue numbers, timing lines, and inline markup; collapse the rest into one
/// line. Consecutive duplicate cues (common in auto-generated tracks) are
/// folded.
pub fn clean_vtt(content: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.contains("-->")
            || line.chars().all(|c| c.is_ascii_digit())
            || line.starts_with("WEBVTT")
            || line.starts_with("Kind:")
            || line.starts_with("Language:")
            || line.starts_with("NOTE")
            || line.starts_with("STYLE")
        {
            continue;
        }

        let stripped = strip_markup(line);
        if stripped.is_empty() {
            continue;
        }
        if lines.last().map(|prev| prev == &stripped).unwrap_or(false) {
            continue;
        }
        lines.push(stripped);
    }

    lines.join(" ")
}

/// Remove inline tags such as <c> spans and word timestamps
fn strip_markup(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}
