use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while scraping and writing charts
#[derive(Error, Debug)]
pub enum Error {
    /// URL does not follow a known chart path shape
    #[error("Not a recognized chart URL: {0}")]
    InvalidChartUrl(String),

    /// HTTP request failed or returned an error status
    #[error("Failed to fetch chart page: {0}")]
    FetchError(#[from] reqwest::Error),

    /// Strict extraction found no chart list container on the page
    #[error("Could not find chart list container for {0}")]
    MissingChartList(String),

    /// JSON encoding or decoding failed
    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// CSV writer failed
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// File system error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// URL list file does not exist
    #[error("Input file '{}' not found", .0.display())]
    InputFileNotFound(PathBuf),

    /// Bad environment or builder value
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Command line is missing a required argument
    #[error("{0}")]
    Usage(String),
}

/// Result alias over [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
