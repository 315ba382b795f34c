//! Song extraction from Shazam chart pages.
//!
//! Chart pages use hashed CSS class names that change between site builds,
//! so every field is looked up on its own and degrades to `N/A` when it is
//! missing. A missing field never drops the entry or fails the page.

use log::debug;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::charts::{
    entities::SongRecord,
    errors::{Error, Result},
};

static SONG_ITEM: Lazy<Selector> = Lazy::new(|| selector("div.page_songItem__lAdHy"));
static CHART_LIST: Lazy<Selector> =
    Lazy::new(|| selector("div.ListShowMoreLess_container__t4TNB.page_chartList__aBclW"));
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| selector("li"));
static RANKING_NUMBER: Lazy<Selector> =
    Lazy::new(|| selector("span.SongItem-module_rankingNumber__3oDWK"));
static METADATA_LINE: Lazy<Selector> =
    Lazy::new(|| selector("span.SongItem-module_metadataLine__7Mm6B"));
static SONG_TITLE: Lazy<Selector> =
    Lazy::new(|| selector(r#"a[data-test-id="charts_userevent_list_songTitle"]"#));
static ARTIST_NAME: Lazy<Selector> =
    Lazy::new(|| selector(r#"a[data-test-id="charts_userevent_list_artistName"]"#));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("hard-coded selector is valid")
}

/// Which page structure a chart page is expected to follow
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// Collect every song item block on the page; none found means no data
    #[default]
    Lenient,
    /// Require the chart list container and read its list items
    Strict,
}

impl ExtractMode {
    /// Extract the songs of `markup`; `url` only labels errors
    pub fn extract(self, markup: &str, url: &str) -> Result<Vec<SongRecord>> {
        match self {
            ExtractMode::Lenient => Ok(extract(markup)),
            ExtractMode::Strict => extract_chart_list(markup, url),
        }
    }
}

/// Extract every song item on the page, in document order.
///
/// Returns an empty vector when the page holds no song items.
pub fn extract(markup: &str) -> Vec<SongRecord> {
    let document = Html::parse_document(markup);
    let songs: Vec<SongRecord> = document.select(&SONG_ITEM).map(song_record).collect();
    debug!("Extracted {} song items", songs.len());
    songs
}

/// Extract the entries of the chart list container.
///
/// Unlike [`extract`], a page without the container is an error rather than
/// an empty chart.
pub fn extract_chart_list(markup: &str, url: &str) -> Result<Vec<SongRecord>> {
    let document = Html::parse_document(markup);
    let list = document
        .select(&CHART_LIST)
        .next()
        .ok_or_else(|| Error::MissingChartList(url.to_string()))?;
    let songs: Vec<SongRecord> = list.select(&LIST_ITEM).map(song_record).collect();
    debug!("Extracted {} chart list entries", songs.len());
    Ok(songs)
}

fn song_record(item: ElementRef<'_>) -> SongRecord {
    let position = first_text(item, &RANKING_NUMBER);
    let title = item
        .select(&METADATA_LINE)
        .next()
        .and_then(|line| first_text(line, &SONG_TITLE));
    let artist = first_text(item, &ARTIST_NAME);
    SongRecord::from_parts(position, title, artist)
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}
