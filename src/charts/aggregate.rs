use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::charts::{
    entities::{ChartResult, ChartType, SongRecord},
    errors::Result,
};

/// File name prefix of the combined report
pub const DEFAULT_PREFIX: &str = "shazam_complete_data";

/// Batch level facts written at the top of the report
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReportMetadata {
    /// Date the batch ran
    pub generated_at: NaiveDate,
    /// URL list the batch read
    pub source_file: String,
    /// Number of charts in the report
    pub total_charts: usize,
}

/// One chart inside the combined report
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChartEntry {
    /// Chart page URL
    pub url: String,
    /// City or country chart
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// Country slug
    pub country: String,
    /// City slug, only for city charts
    pub city: Option<String>,
    /// Scrape date
    pub date_scraped: NaiveDate,
    /// Songs in ranking order
    pub songs: Vec<SongRecord>,
}

impl From<ChartResult> for ChartEntry {
    fn from(result: ChartResult) -> Self {
        ChartEntry {
            url: result.url,
            chart_type: result.chart_type,
            country: result.country,
            city: result.city,
            date_scraped: result.date,
            songs: result.songs,
        }
    }
}

/// One JSON document holding every chart scraped in a batch
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CombinedReport {
    /// Batch level facts
    pub metadata: ReportMetadata,
    /// Charts in URL list order
    pub charts: Vec<ChartEntry>,
}

impl CombinedReport {
    /// Empty report for a batch run on `generated_at`
    pub fn new(generated_at: NaiveDate, source_file: &str) -> Self {
        CombinedReport {
            metadata: ReportMetadata {
                generated_at,
                source_file: source_file.to_string(),
                total_charts: 0,
            },
            charts: Vec::new(),
        }
    }

    /// Append one chart and keep `total_charts` in step
    pub fn push(&mut self, result: ChartResult) {
        self.charts.push(result.into());
        self.metadata.total_charts = self.charts.len();
    }

    /// Songs across every chart
    pub fn total_songs(&self) -> usize {
        self.charts.iter().map(|c| c.songs.len()).sum()
    }

    /// `<prefix>_<date>.json`
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{prefix}_{}.json", self.metadata.generated_at.format("%Y-%m-%d"))
    }

    /// Write the report as pretty JSON into `output_dir`, replacing any earlier
    /// report for the same prefix and date.
    pub async fn write(&self, output_dir: &Path, prefix: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;
        let path = output_dir.join(self.file_name(prefix));
        tokio::fs::write(&path, serde_json::to_string_pretty(self)?).await?;
        info!("Complete JSON data saved to {}", path.display());
        info!("Total charts processed: {}", self.metadata.total_charts);
        info!("Contains: {} songs", self.total_songs());
        Ok(path)
    }
}
