use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-assigned priority for a tracked video
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Row fill color for the spreadsheet, as 0xRRGGBB
    pub fn fill_rgb(&self) -> u32 {
        match self {
            Priority::High => 0xFF0000,
            Priority::Medium => 0xFFFF00,
            Priority::Low => 0x00FF00,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(anyhow!("Unknown priority: {}", other)),
        }
    }
}

/// Completion status of a tracked video
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    #[serde(rename = "Not Started")]
    NotStarted,
    Completed,
}

impl Status {
    /// The opposite status; applying twice returns the original
    pub fn toggled(&self) -> Status {
        match self {
            Status::NotStarted => Status::Completed,
            Status::Completed => Status::NotStarted,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::NotStarted => "Not Started",
            Status::Completed => "Completed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Not Started" => Ok(Status::NotStarted),
            "Completed" => Ok(Status::Completed),
            other => Err(anyhow!("Unknown status: {}", other)),
        }
    }
}

/// Duration-based category determining which sheet a video's row lives in.
/// Computed once at insertion time and never revisited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Bucket {
    Long,
    Mid,
    Short,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Long, Bucket::Mid, Bucket::Short];

    /// Categorize a duration. Boundary values fall to the lower bucket since
    /// the comparison is strict greater-than.
    pub fn for_duration_hours(hours: f64) -> Bucket {
        if hours > 4.0 {
            Bucket::Long
        } else if hours > 2.0 {
            Bucket::Mid
        } else {
            Bucket::Short
        }
    }

    /// Name of the workbook sheet holding this bucket's rows
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Bucket::Long => "Long Videos",
            Bucket::Mid => "Mid Videos",
            Bucket::Short => "Short Videos",
        }
    }
}

/// A tracked video. The url is the unique key across both stores; topics are
/// persisted in the auxiliary store and are empty on records freshly loaded
/// from the workbook until the library merges them in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    pub url: String,
    pub title: String,
    pub author: String,
    pub duration_hours: f64,
    pub priority: Priority,
    pub status: Status,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl VideoRecord {
    pub fn bucket(&self) -> Bucket {
        Bucket::for_duration_hours(self.duration_hours)
    }

    /// Duration cell text, e.g. "1.50 hours"
    pub fn duration_cell(&self) -> String {
        format_duration_hours(self.duration_hours)
    }
}

/// Format a duration for the workbook's Duration column
pub fn format_duration_hours(hours: f64) -> String {
    format!("{:.2} hours", hours)
}

/// Parse a Duration column cell back into hours
pub fn parse_duration_hours(cell: &str) -> Result<f64> {
    let trimmed = cell.trim();
    let number = trimmed.strip_suffix(" hours").unwrap_or(trimmed);
    number
        .parse::<f64>()
        .map_err(|e| anyhow!("Invalid duration cell '{}': {}", cell, e))
}
