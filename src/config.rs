use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the YouTube learning tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Persistence locations
    pub storage: StorageConfig,

    /// Metadata/transcript provider settings
    pub provider: ProviderConfig,

    /// Topic extraction settings
    pub topics: TopicsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding both stores
    pub data_dir: PathBuf,

    /// Workbook file name inside the data directory
    pub workbook_file: String,

    /// Sidecar JSON file name inside the data directory
    pub sidecar_file: String,
}

impl StorageConfig {
    pub fn workbook_path(&self) -> PathBuf {
        self.data_dir.join(&self.workbook_file)
    }

    pub fn sidecar_path(&self) -> PathBuf {
        self.data_dir.join(&self.sidecar_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// yt-dlp binary name or path
    pub ytdlp_binary: String,

    /// Subtitle language requested for transcripts
    pub subtitle_lang: String,

    /// Timeout for HTTP requests (seconds)
    pub request_timeout_seconds: u64,

    /// Fall back to the oEmbed endpoint for metadata when yt-dlp fails
    pub enable_oembed_fallback: bool,

    /// oEmbed endpoint used by the fallback
    pub oembed_endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicsConfig {
    /// How many keywords to keep per video
    pub keyword_count: usize,

    /// Optional file with extra stop words, one per line
    pub stop_words_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the first parseable file in the search list,
    /// falling back to environment variables
    pub fn load() -> Result<Self> {
        let config_paths = [
            "yt-tracker.toml",
            "config/yt-tracker.toml",
            "~/.config/yt-tracker/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        if let Ok(config) = Self::from_env() {
            return Ok(config);
        }

        Err(anyhow!("No configuration file found"))
    }

    /// Build a config from defaults plus environment variable overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(data_dir) = std::env::var("YT_TRACKER_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(binary) = std::env::var("YT_TRACKER_YTDLP") {
            config.provider.ytdlp_binary = binary;
        }

        if let Ok(lang) = std::env::var("YT_TRACKER_SUB_LANG") {
            config.provider.subtitle_lang = lang;
        }

        if let Ok(count) = std::env::var("YT_TRACKER_KEYWORDS") {
            config.topics.keyword_count = count.parse().unwrap_or(5);
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.topics.keyword_count == 0 {
            return Err(anyhow!("keyword_count must be greater than 0"));
        }

        if self.provider.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }

        if self.provider.ytdlp_binary.trim().is_empty() {
            return Err(anyhow!("ytdlp_binary must not be empty"));
        }

        if !self.storage.data_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.storage.data_dir) {
                return Err(anyhow!("Cannot create data directory: {}", e));
            }
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "YouTube Tracker Configuration:\n\
            - Data Directory: {}\n\
            - Workbook: {}\n\
            - Sidecar: {}\n\
            - yt-dlp: {}\n\
            - Subtitle Language: {}\n\
            - Keywords per Video: {}\n\
            - oEmbed Fallback: {}",
            self.storage.data_dir.display(),
            self.storage.workbook_file,
            self.storage.sidecar_file,
            self.provider.ytdlp_binary,
            self.provider.subtitle_lang,
            self.topics.keyword_count,
            self.provider.enable_oembed_fallback,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir: PathBuf::from("learning_resources"),
                workbook_file: "video_learning_tracker.xlsx".to_string(),
                sidecar_file: "video_data.json".to_string(),
            },
            provider: ProviderConfig::default(),
            topics: TopicsConfig {
                keyword_count: 5,
                stop_words_file: None,
            },
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            ytdlp_binary: "yt-dlp".to_string(),
            subtitle_lang: "en".to_string(),
            request_timeout_seconds: 30,
            enable_oembed_fallback: false,
            oembed_endpoint: "https://www.youtube.com/oembed".to_string(),
        }
    }
}
