use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::charts::{entities::Location, errors::Result, location};

/// Default root of the folder tree
pub const DEFAULT_BASE: &str = "data/downloadedsong";

/// Outcome of a scaffold run
#[derive(Debug, Default)]
pub struct ScaffoldSummary {
    /// Folders that now exist, one per resolved URL
    pub created: Vec<PathBuf>,
    /// URLs that did not resolve to a location
    pub skipped: Vec<String>,
}

/// Folder for a chart location under `base`:
/// `cities/<country>/<city>` or `country/<country>`
pub fn folder_for(location: &Location, base: &Path) -> PathBuf {
    match location {
        Location::City { country, city } => base.join("cities").join(country).join(city),
        Location::Country { country } => base.join("country").join(country),
    }
}

/// Create one folder per chart URL. URLs that do not resolve are skipped.
pub async fn scaffold<I, S>(urls: I, base: &Path) -> Result<ScaffoldSummary>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut summary = ScaffoldSummary::default();
    for url in urls {
        let url = url.as_ref().trim();
        if url.is_empty() {
            continue;
        }
        match location::resolve(url) {
            Ok(location) => {
                let folder = folder_for(&location, base);
                tokio::fs::create_dir_all(&folder).await?;
                info!("Created: {}", folder.display());
                summary.created.push(folder);
            }
            Err(e) => {
                warn!("Skipping invalid URL: {e}");
                summary.skipped.push(url.to_string());
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_city_and_country_folders() {
        let tmp = tempfile::tempdir().unwrap();
        let urls = [
            "https://www.shazam.com/charts/top-50/united-kingdom/belfast",
            "",
            "https://www.shazam.com/charts/top-200/nigeria\n",
            "https://www.shazam.com/charts/bogus",
        ];
        let summary = scaffold(urls, tmp.path()).await.unwrap();

        assert_eq!(summary.created.len(), 2);
        assert_eq!(summary.skipped, vec!["https://www.shazam.com/charts/bogus"]);
        assert!(tmp.path().join("cities/united-kingdom/belfast").is_dir());
        assert!(tmp.path().join("country/nigeria").is_dir());
    }

    #[tokio::test]
    async fn existing_folders_are_fine() {
        let tmp = tempfile::tempdir().unwrap();
        let urls = ["https://www.shazam.com/charts/top-200/kenya"];
        scaffold(urls, tmp.path()).await.unwrap();
        let summary = scaffold(urls, tmp.path()).await.unwrap();
        assert_eq!(summary.created, vec![tmp.path().join("country").join("kenya")]);
    }
}
