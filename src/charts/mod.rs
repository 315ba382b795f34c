/// Aggregated report covering a whole batch of charts
pub mod aggregate;
/// Injected source of the current date
pub mod clock;
/// Data entities for songs, locations and chart results
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Song extraction from chart page markup
pub mod extractor;
/// HTTP page fetching
pub mod fetcher;
/// Chart URL to location resolution
pub mod location;
/// Per-location folder tree creation
pub mod scaffold;
/// Output file serialization
pub mod writer;

pub use aggregate::CombinedReport;
pub use clock::{Clock, FixedClock, SystemClock};
pub use entities::{ChartResult, ChartType, Location, SongRecord};
pub use extractor::ExtractMode;
pub use fetcher::{HttpFetcher, PageSource};
pub use writer::OutputFormat;
