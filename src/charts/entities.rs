use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Value used for any field missing from the chart markup
pub const NOT_AVAILABLE: &str = "N/A";

/// One ranked entry of a chart
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SongRecord {
    /// Ranking as displayed on the page, not parsed as a number
    pub position: String,
    /// Song title
    pub title: String,
    /// Artist name
    pub artist: String,
}

impl SongRecord {
    /// Build a record, falling back to `N/A` for every missing field
    pub fn from_parts(
        position: Option<String>,
        title: Option<String>,
        artist: Option<String>,
    ) -> Self {
        let or_na = |v: Option<String>| v.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        SongRecord {
            position: or_na(position),
            title: or_na(title),
            artist: or_na(artist),
        }
    }
}

/// Whether a chart covers a city or a whole country
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Top-50 chart of a single city
    City,
    /// Top-200 chart of a country
    Country,
}

impl ChartType {
    /// Lowercase name, also used as the output sub-directory
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::City => "city",
            ChartType::Country => "country",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart scope encoded in a chart URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// `.../top-50/<country>/<city>`
    City {
        /// Country slug
        country: String,
        /// City slug
        city: String,
    },
    /// `.../top-200/<country>`
    Country {
        /// Country slug
        country: String,
    },
}

impl Location {
    /// Chart type matching this scope
    pub fn chart_type(&self) -> ChartType {
        match self {
            Location::City { .. } => ChartType::City,
            Location::Country { .. } => ChartType::Country,
        }
    }

    /// Country slug
    pub fn country(&self) -> &str {
        match self {
            Location::City { country, .. } | Location::Country { country } => country.as_str(),
        }
    }

    /// City slug, only for city charts
    pub fn city(&self) -> Option<&str> {
        match self {
            Location::City { city, .. } => Some(city.as_str()),
            Location::Country { .. } => None,
        }
    }
}

/// Songs scraped from one chart page, with the metadata written next to them.
///
/// `city` is set exactly when `chart_type` is [`ChartType::City`]. Fields are
/// only reachable through getters, and deserializing a document that breaks
/// this rule fails.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "ChartDocument")]
pub struct ChartResult {
    pub(crate) chart_type: ChartType,
    pub(crate) country: String,
    pub(crate) city: Option<String>,
    pub(crate) date: NaiveDate,
    pub(crate) url: String,
    pub(crate) songs: Vec<SongRecord>,
}

// Serialized shape of a chart result, checked before it becomes one
#[derive(Deserialize)]
struct ChartDocument {
    chart_type: ChartType,
    country: String,
    city: Option<String>,
    date: NaiveDate,
    url: String,
    songs: Vec<SongRecord>,
}

impl TryFrom<ChartDocument> for ChartResult {
    type Error = String;

    fn try_from(doc: ChartDocument) -> Result<Self, Self::Error> {
        let location = match (doc.chart_type, doc.city) {
            (ChartType::City, Some(city)) => Location::City {
                country: doc.country,
                city,
            },
            (ChartType::Country, None) => Location::Country {
                country: doc.country,
            },
            (chart_type, city) => {
                return Err(format!("{chart_type} chart cannot have city {city:?}"));
            }
        };
        Ok(ChartResult::new(location, doc.date, &doc.url, doc.songs))
    }
}

impl ChartResult {
    /// Attach scrape metadata to the songs of one chart page
    pub fn new(location: Location, date: NaiveDate, url: &str, songs: Vec<SongRecord>) -> Self {
        let chart_type = location.chart_type();
        let (country, city) = match location {
            Location::City { country, city } => (country, Some(city)),
            Location::Country { country } => (country, None),
        };
        ChartResult {
            chart_type,
            country,
            city,
            date,
            url: url.to_string(),
            songs,
        }
    }

    /// City or country chart
    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    /// Country slug
    pub fn country(&self) -> &str {
        &self.country
    }

    /// City slug, only for city charts
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Scrape date
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Chart page URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Songs in ranking order
    pub fn songs(&self) -> &[SongRecord] {
        &self.songs
    }

    /// `<country>-<city>-<date>` for city charts, `<country>-<date>` otherwise
    pub fn file_stem(&self) -> String {
        let date = self.date.format("%Y-%m-%d");
        match &self.city {
            Some(city) => format!("{}-{}-{}", self.country, city, date),
            None => format!("{}-{}", self.country, date),
        }
    }

    /// `<root>/city` or `<root>/country`
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(self.chart_type.as_str())
    }

    /// Metadata lines shared by the txt and csv outputs
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Chart Type: {}", self.chart_type),
            format!("Country: {}", self.country),
        ];
        if let Some(city) = &self.city {
            lines.push(format!("City: {city}"));
        }
        lines.push(format!("Date: {}", self.date.format("%Y-%m-%d")));
        lines.push(format!("URL: {}", self.url));
        lines
    }
}
