use anyhow::{anyhow, Result};
use calamine::{open_workbook_auto, DataType, Reader};
use rust_xlsxwriter::{Color, Format, Workbook};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::model::{parse_duration_hours, Bucket, VideoRecord};

/// Column layout shared by all three bucket sheets
pub const HEADER: [&str; 6] = ["URL", "Title", "Author", "Duration", "Priority", "Status"];

/// Tabular store: an xlsx workbook with one append-only sheet per duration
/// bucket, one row per video. Rows are keyed by url.
#[derive(Debug)]
pub struct WorkbookStore {
    path: PathBuf,
    sheets: HashMap<Bucket, Vec<VideoRecord>>,
}

impl WorkbookStore {
    /// Open an existing workbook or create a fresh one with the three bucket
    /// sheets and their header rows
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut sheets: HashMap<Bucket, Vec<VideoRecord>> = HashMap::new();
        for bucket in Bucket::ALL {
            sheets.insert(bucket, Vec::new());
        }

        let mut store = Self { path, sheets };

        if store.path.exists() {
            store.load()?;
        } else {
            store.save()?;
            info!("🆕 Created workbook: {}", store.path.display());
        }

        Ok(store)
    }

    fn load(&mut self) -> Result<()> {
        let mut workbook = open_workbook_auto(&self.path)?;
        let mut row_count = 0;

        for bucket in Bucket::ALL {
            let range = match workbook.worksheet_range(bucket.sheet_name()) {
                Some(Ok(range)) => range,
                Some(Err(e)) => {
                    return Err(anyhow!(
                        "Failed to read sheet '{}': {}",
                        bucket.sheet_name(),
                        e
                    ))
                }
                // A missing sheet just means no rows in that bucket yet
                None => continue,
            };

            for (row_idx, row) in range.rows().enumerate().skip(1) {
                let cells: Vec<String> = row.iter().map(cell_to_string).collect();
                if cells.first().map(|c| c.is_empty()).unwrap_or(true) {
                    continue;
                }
                let record = parse_row(&cells).map_err(|e| {
                    anyhow!(
                        "Bad row {} in sheet '{}': {}",
                        row_idx + 1,
                        bucket.sheet_name(),
                        e
                    )
                })?;
                self.sheets
                    .get_mut(&bucket)
                    .expect("all buckets initialized")
                    .push(record);
                row_count += 1;
            }
        }

        debug!("📁 Loaded {} rows from {}", row_count, self.path.display());
        Ok(())
    }

    /// Append a record to the sheet of its duration bucket. The url must not
    /// already exist anywhere in the workbook.
    pub fn append(&mut self, record: VideoRecord) -> Result<Bucket> {
        if self.find(&record.url).is_some() {
            return Err(anyhow!("Video already tracked: {}", record.url));
        }
        let bucket = record.bucket();
        self.sheets
            .get_mut(&bucket)
            .expect("all buckets initialized")
            .push(record);
        Ok(bucket)
    }

    /// Find a row by url across all three sheets
    pub fn find(&self, url: &str) -> Option<&VideoRecord> {
        self.records().into_iter().find(|r| r.url == url)
    }

    pub fn find_mut(&mut self, url: &str) -> Option<&mut VideoRecord> {
        for bucket in Bucket::ALL {
            let rows = self.sheets.get(&bucket).expect("all buckets initialized");
            if let Some(pos) = rows.iter().position(|r| r.url == url) {
                return self
                    .sheets
                    .get_mut(&bucket)
                    .expect("all buckets initialized")
                    .get_mut(pos);
            }
        }
        None
    }

    /// All rows in bucket order (Long, Mid, Short), insertion order within a
    /// bucket
    pub fn records(&self) -> Vec<&VideoRecord> {
        Bucket::ALL
            .iter()
            .flat_map(|bucket| self.sheets[bucket].iter())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.values().map(|rows| rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the whole workbook to disk. Row background color encodes the
    /// priority.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        for bucket in Bucket::ALL {
            let worksheet = workbook.add_worksheet().set_name(bucket.sheet_name())?;

            for (col, name) in HEADER.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
            }

            for (row_idx, record) in self.sheets[&bucket].iter().enumerate() {
                let row = (row_idx + 1) as u32;
                let fill = Format::new()
                    .set_background_color(Color::RGB(record.priority.fill_rgb()));

                worksheet.write_string_with_format(row, 0, &record.url, &fill)?;
                worksheet.write_string_with_format(row, 1, &record.title, &fill)?;
                worksheet.write_string_with_format(row, 2, &record.author, &fill)?;
                worksheet.write_string_with_format(row, 3, &record.duration_cell(), &fill)?;
                worksheet.write_string_with_format(
                    row,
                    4,
                    &record.priority.to_string(),
                    &fill,
                )?;
                worksheet.write_string_with_format(row, 5, &record.status.to_string(), &fill)?;
            }
        }

        workbook.save(&self.path)?;
        debug!("💾 Saved {} rows to {}", self.len(), self.path.display());
        Ok(())
    }
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn parse_row(cells: &[String]) -> Result<VideoRecord> {
    if cells.len() < 6 {
        return Err(anyhow!("expected 6 columns, found {}", cells.len()));
    }

    Ok(VideoRecord {
        url: cells[0].clone(),
        title: cells[1].clone(),
        author: cells[2].clone(),
        duration_hours: parse_duration_hours(&cells[3])?,
        priority: cells[4].parse()?,
        status: cells[5].parse()?,
        topics: Vec::new(),
    })
}
