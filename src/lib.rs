//! Rcharts - scrape Shazam music charts into flat files
//!
//! This library provides the pieces of the chart scraper: resolving chart
//! URLs to locations, extracting song rankings from chart pages, and writing
//! the results as text, CSV or JSON files.

/// Chart scraping building blocks
pub mod charts;
