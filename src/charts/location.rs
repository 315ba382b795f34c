use log::debug;
use url::Url;

use crate::charts::{
    entities::Location,
    errors::{Error, Result},
};

const CITY_CHART: &str = "top-50";
const COUNTRY_CHART: &str = "top-200";

/// Resolve the chart scope encoded in a chart URL.
///
/// Two path shapes are accepted:
/// - `.../top-50/<country>/<city>` for city charts
/// - `.../top-200/<country>` for country charts
///
/// Empty path segments are ignored, so trailing slashes are fine. Anything
/// else is rejected.
pub fn resolve(url: &str) -> Result<Location> {
    let parsed =
        Url::parse(url.trim()).map_err(|_| Error::InvalidChartUrl(url.to_string()))?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    let location = match segments.as_slice() {
        [.., COUNTRY_CHART, country] => Location::Country {
            country: (*country).to_string(),
        },
        [.., CITY_CHART, country, city] => Location::City {
            country: (*country).to_string(),
            city: (*city).to_string(),
        },
        _ => return Err(Error::InvalidChartUrl(url.to_string())),
    };
    debug!("Resolved {url} to {location:?}");
    Ok(location)
}
