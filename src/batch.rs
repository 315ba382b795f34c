use log::{debug, info, warn};
use rcharts::charts::{
    Clock, CombinedReport, ExtractMode, HttpFetcher, OutputFormat, PageSource, SystemClock,
    entities::ChartResult,
    errors::{Error, Result},
    fetcher::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT},
    location, writer,
};
use std::env::VarError;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_OUTPUT_DIR: &str = "data";

// Configuration for the Batch struct
pub struct Config<S: PageSource, C: Clock> {
    pub source: S,
    pub clock: C,
    pub output_dir: PathBuf,
    pub delay: Duration,
    pub mode: ExtractMode,
}

pub struct ConfigBuilder {
    output_dir: Option<PathBuf>,
    default_output_dir: PathBuf,
    delay: Option<Duration>,
    mode: ExtractMode,
}

// Values resolved from the builder, the environment and the defaults
#[derive(Debug, PartialEq)]
pub struct Settings {
    pub user_agent: String,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub delay: Duration,
    pub mode: ExtractMode,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            output_dir: None,
            default_output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delay: None,
            mode: ExtractMode::Lenient,
        }
    }

    pub fn output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    /// Output directory used when neither the builder nor `RCHARTS_OUTPUT_DIR` sets one
    pub fn default_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_output_dir = dir.into();
        self
    }

    pub fn delay(mut self, delay: Option<Duration>) -> Self {
        self.delay = delay;
        self
    }

    pub fn mode(mut self, mode: ExtractMode) -> Self {
        self.mode = mode;
        self
    }

    // Values set on the builder win over RCHARTS_* variables, which win over defaults
    pub fn resolve_with<F>(self, lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let user_agent =
            env_var(&lookup, "RCHARTS_USER_AGENT")?.unwrap_or_else(|| DEFAULT_USER_AGENT.into());
        let timeout = env_secs(&lookup, "RCHARTS_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT);
        let output_dir = match self.output_dir {
            Some(d) => d,
            None => env_var(&lookup, "RCHARTS_OUTPUT_DIR")?
                .map_or(self.default_output_dir, PathBuf::from),
        };
        let delay = match self.delay {
            Some(d) => d,
            None => env_secs(&lookup, "RCHARTS_DELAY_SECS")?.unwrap_or(Duration::ZERO),
        };
        Ok(Settings {
            user_agent,
            timeout,
            output_dir,
            delay,
            mode: self.mode,
        })
    }

    pub fn build(self) -> Result<Config<HttpFetcher, SystemClock>> {
        let settings = self.resolve_with(|name| std::env::var(name))?;
        debug!(
            "Using timeout {:?}, delay {:?}, output dir {:?}",
            settings.timeout, settings.delay, settings.output_dir
        );
        Ok(Config {
            source: HttpFetcher::new(&settings.user_agent, settings.timeout)?,
            clock: SystemClock,
            output_dir: settings.output_dir,
            delay: settings.delay,
            mode: settings.mode,
        })
    }
}

fn env_var<F>(lookup: &F, name: &str) -> Result<Option<String>>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    match lookup(name) {
        Ok(v) if v.trim().is_empty() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::ConfigurationError(format!("{name}: {e}"))),
    }
}

fn env_secs<F>(lookup: &F, name: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    let Some(raw) = env_var(lookup, name)? else {
        return Ok(None);
    };
    parse_secs(&raw)
        .map(Some)
        .ok_or_else(|| Error::ConfigurationError(format!("{name} must be a number of seconds, got '{raw}'")))
}

/// Non-negative, possibly fractional, number of seconds
pub fn parse_secs(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(Duration::from_secs_f64)
}

pub async fn ensure_input_exists(path: &Path) -> Result<()> {
    if tokio::fs::try_exists(path).await? {
        Ok(())
    } else {
        Err(Error::InputFileNotFound(path.to_path_buf()))
    }
}

/// Read chart URLs from a newline-delimited file, skipping blank lines
pub async fn read_urls(path: &Path) -> Result<Vec<String>> {
    ensure_input_exists(path).await?;
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub empty: usize,
    pub failed: usize,
}

// Runs the scrape for every URL, one after the other
pub struct Batch<S: PageSource, C: Clock> {
    config: Config<S, C>,
}

impl<S: PageSource, C: Clock> Batch<S, C> {
    pub fn new(config: Config<S, C>) -> Self {
        Batch { config }
    }

    /// Resolve, fetch and extract a single chart URL.
    /// `Ok(None)` means the page held no chart entries.
    ///
    /// `requests` counts the pages fetched so far; every request after the
    /// first waits for the configured delay.
    async fn scrape(&self, url: &str, requests: &mut usize) -> Result<Option<ChartResult>> {
        let location = location::resolve(url)?;
        if *requests > 0 {
            self.pause().await;
        }
        *requests += 1;
        info!("Scraping {url}...");
        let markup = self.config.source.fetch_page(url).await?;
        let songs = self.config.mode.extract(&markup, url)?;
        if songs.is_empty() {
            return Ok(None);
        }
        Ok(Some(ChartResult::new(
            location,
            self.config.clock.today(),
            url,
            songs,
        )))
    }

    async fn pause(&self) {
        // Be polite with a delay between requests
        if !self.config.delay.is_zero() {
            debug!("Waiting {:?} before the next request", self.config.delay);
            tokio::time::sleep(self.config.delay).await;
        }
    }

    /// Scrape every URL in `input` and write one file per chart
    pub async fn run(&self, input: &Path, format: OutputFormat) -> Result<BatchSummary> {
        let urls = read_urls(input).await?;
        info!("Starting scrape of {} chart URLs ...", urls.len());
        let mut summary = BatchSummary::default();
        let mut requests = 0;

        for url in &urls {
            let outcome = match self.scrape(url, &mut requests).await {
                Ok(Some(result)) => {
                    writer::write_under(&result, format, &self.config.output_dir)
                        .await
                        .map(Some)
                }
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(Some(path)) => summary.written.push(path),
                Ok(None) => {
                    warn!("No chart entries found for {url}");
                    summary.empty += 1;
                }
                Err(e) => {
                    warn!("Error scraping {url}: {e}");
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Scrape completed. Written: {}, empty: {}, failed: {}",
            summary.written.len(),
            summary.empty,
            summary.failed
        );
        Ok(summary)
    }

    /// Scrape every URL in `input` into a single combined JSON report
    /// written to the configured output directory
    pub async fn run_combined(&self, input: &Path, prefix: &str) -> Result<PathBuf> {
        let urls = read_urls(input).await?;
        info!("Building combined report from {} chart URLs ...", urls.len());
        let mut report = CombinedReport::new(self.config.clock.today(), &input.to_string_lossy());
        let mut requests = 0;

        for url in &urls {
            match self.scrape(url, &mut requests).await {
                Ok(Some(result)) => report.push(result),
                Ok(None) => warn!("No chart entries found for {url}"),
                Err(e) => warn!("Error scraping {url}: {e}"),
            }
        }

        report.write(&self.config.output_dir, prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rcharts::charts::FixedClock;
    use std::collections::HashMap;

    const BELFAST: &str = "https://www.shazam.com/charts/top-50/united-kingdom/belfast";
    const NIGERIA: &str = "https://www.shazam.com/charts/top-200/nigeria";
    const EMPTY: &str = "https://www.shazam.com/charts/top-200/iceland";
    const DOWN: &str = "https://www.shazam.com/charts/top-50/france/paris";

    struct CannedPages(HashMap<&'static str, String>);

    #[async_trait]
    impl PageSource for CannedPages {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            self.0.get(url).cloned().ok_or_else(|| {
                Error::IoError(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("no page for {url}"),
                ))
            })
        }
    }

    fn song_item(rank: &str, title: &str, artist: &str) -> String {
        format!(
            r#"<div class="page_songItem__lAdHy">
                <span class="SongItem-module_rankingNumber__3oDWK">{rank}</span>
                <span class="SongItem-module_metadataLine__7Mm6B">
                    <a data-test-id="charts_userevent_list_songTitle">{title}</a>
                </span>
                <a data-test-id="charts_userevent_list_artistName">{artist}</a>
            </div>"#
        )
    }

    fn batch(output_dir: &Path) -> Batch<CannedPages, FixedClock> {
        let mut pages = HashMap::new();
        pages.insert(
            BELFAST,
            format!(
                "<html><body>{}{}{}</body></html>",
                song_item("1", "Espresso", "Sabrina Carpenter"),
                song_item("2", "Tough", "Quavo"),
                song_item("3", "Lose Control", "Teddy Swims"),
            ),
        );
        pages.insert(
            NIGERIA,
            format!("<html><body>{}</body></html>", song_item("1", "Love Me JeJe", "Tems")),
        );
        pages.insert(EMPTY, "<html><body><p>maintenance</p></body></html>".to_string());
        Batch::new(Config {
            source: CannedPages(pages),
            clock: FixedClock(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()),
            output_dir: output_dir.to_path_buf(),
            delay: Duration::ZERO,
            mode: ExtractMode::Lenient,
        })
    }

    fn input_file(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("urls.txt");
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[tokio::test]
    async fn city_chart_written_as_json() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_file(tmp.path(), &[BELFAST]);
        let out = tmp.path().join("data");

        let summary = batch(&out).run(&input, OutputFormat::Json).await.unwrap();

        let expected = out.join("city").join("united-kingdom-belfast-2025-05-20.json");
        assert_eq!(summary.written, vec![expected.clone()]);
        let result: ChartResult =
            serde_json::from_str(&std::fs::read_to_string(expected).unwrap()).unwrap();
        assert_eq!(result.country(), "united-kingdom");
        assert_eq!(result.city(), Some("belfast"));
        assert_eq!(result.songs().len(), 3);
        assert_eq!(result.songs()[0].position, "1");
    }

    #[tokio::test]
    async fn country_chart_written_as_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_file(tmp.path(), &[NIGERIA]);
        let out = tmp.path().join("data");

        batch(&out).run(&input, OutputFormat::Csv).await.unwrap();

        let csv =
            std::fs::read_to_string(out.join("country").join("nigeria-2025-05-20.csv")).unwrap();
        assert!(csv.lines().any(|l| l == "# Chart Type: country"));
        assert!(!csv.contains("# City:"));
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_file(
            tmp.path(),
            &["", DOWN, "   ", "https://www.shazam.com/whatever", EMPTY, NIGERIA, ""],
        );
        let out = tmp.path().join("data");

        let summary = batch(&out).run(&input, OutputFormat::Txt).await.unwrap();

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.empty, 1);
        assert_eq!(
            summary.written,
            vec![out.join("country").join("nigeria-2025-05-20.txt")]
        );
        assert!(!out.join("country").join("iceland-2025-05-20.txt").exists());
    }

    #[tokio::test]
    async fn strict_mode_counts_missing_chart_list_as_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_file(tmp.path(), &[NIGERIA]);
        let mut batch = batch(&tmp.path().join("data"));
        batch.config.mode = ExtractMode::Strict;

        let summary = batch.run(&input, OutputFormat::Json).await.unwrap();
        assert_eq!(summary.failed, 1);
        assert!(summary.written.is_empty());
    }

    #[tokio::test]
    async fn missing_input_file_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = batch(tmp.path())
            .run(&tmp.path().join("nope.txt"), OutputFormat::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InputFileNotFound(_)));
    }

    #[tokio::test]
    async fn combined_report_holds_only_charts_with_songs() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_file(tmp.path(), &[BELFAST, EMPTY, DOWN, NIGERIA]);

        let path = batch(tmp.path())
            .run_combined(&input, "charts")
            .await
            .unwrap();

        assert_eq!(path, tmp.path().join("charts_2025-05-20.json"));
        let report: CombinedReport =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(report.metadata.total_charts, 2);
        assert_eq!(report.total_songs(), 4);
        assert_eq!(report.charts[0].city.as_deref(), Some("belfast"));
        assert_eq!(report.charts[1].country, "nigeria");
    }

    #[test]
    fn delay_seconds_must_be_non_negative_numbers() {
        assert_eq!(parse_secs(" 2 "), Some(Duration::from_secs(2)));
        assert_eq!(parse_secs("0.5"), Some(Duration::from_millis(500)));
        assert_eq!(parse_secs("-1"), None);
        assert_eq!(parse_secs("soon"), None);
        assert_eq!(parse_secs("inf"), None);
    }

    #[tokio::test]
    async fn read_urls_trims_and_skips_blank_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_file(tmp.path(), &["  a  ", "", "\t", "b\r"]);
        assert_eq!(read_urls(&input).await.unwrap(), vec!["a", "b"]);
    }

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> std::result::Result<String, VarError> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name: &str| vars.get(name).map(|v| (*v).to_string()).ok_or(VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_without_builder_or_env() {
        let settings = ConfigBuilder::new().resolve_with(lookup(&[])).unwrap();
        assert_eq!(
            settings,
            Settings {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout: DEFAULT_TIMEOUT,
                output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
                delay: Duration::ZERO,
                mode: ExtractMode::Lenient,
            }
        );
    }

    #[test]
    fn env_wins_over_defaults() {
        let settings = ConfigBuilder::new()
            .default_output_dir(".")
            .resolve_with(lookup(&[
                ("RCHARTS_USER_AGENT", "rcharts-test"),
                ("RCHARTS_TIMEOUT_SECS", "3"),
                ("RCHARTS_OUTPUT_DIR", "/srv/charts"),
                ("RCHARTS_DELAY_SECS", "1.5"),
            ]))
            .unwrap();
        assert_eq!(settings.user_agent, "rcharts-test");
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.output_dir, PathBuf::from("/srv/charts"));
        assert_eq!(settings.delay, Duration::from_millis(1500));
    }

    #[test]
    fn builder_wins_over_env() {
        let settings = ConfigBuilder::new()
            .output_dir(Some(PathBuf::from("out")))
            .delay(Some(Duration::from_secs(4)))
            .mode(ExtractMode::Strict)
            .resolve_with(lookup(&[
                ("RCHARTS_OUTPUT_DIR", "/srv/charts"),
                ("RCHARTS_DELAY_SECS", "1"),
            ]))
            .unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert_eq!(settings.delay, Duration::from_secs(4));
        assert_eq!(settings.mode, ExtractMode::Strict);
    }

    #[test]
    fn blank_env_values_fall_back_and_default_dir_is_configurable() {
        let settings = ConfigBuilder::new()
            .default_output_dir(".")
            .resolve_with(lookup(&[("RCHARTS_OUTPUT_DIR", "  "), ("RCHARTS_USER_AGENT", "")]))
            .unwrap();
        assert_eq!(settings.output_dir, PathBuf::from("."));
        assert_eq!(settings.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn unparseable_seconds_are_configuration_errors() {
        for name in ["RCHARTS_TIMEOUT_SECS", "RCHARTS_DELAY_SECS"] {
            let err = ConfigBuilder::new()
                .resolve_with(lookup(&[(name, "soon")]))
                .unwrap_err();
            assert!(
                matches!(&err, Error::ConfigurationError(msg) if msg.contains(name)),
                "{name}: {err}"
            );
        }
        // a builder delay means the env delay is never read
        assert!(
            ConfigBuilder::new()
                .delay(Some(Duration::ZERO))
                .resolve_with(lookup(&[("RCHARTS_DELAY_SECS", "soon")]))
                .is_ok()
        );
    }

    fn delayed(batch: Batch<CannedPages, FixedClock>, delay: Duration) -> Batch<CannedPages, FixedClock> {
        let mut batch = batch;
        batch.config.delay = delay;
        batch
    }

    #[tokio::test(start_paused = true)]
    async fn delay_only_between_requests() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_file(tmp.path(), &[BELFAST, NIGERIA]);
        let batch = delayed(batch(tmp.path()), Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        let summary = batch.run(&input, OutputFormat::Json).await.unwrap();

        assert_eq!(summary.written.len(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_urls_do_not_wait() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_file(
            tmp.path(),
            &["https://www.shazam.com/whatever", NIGERIA, "not a url"],
        );
        let batch = delayed(batch(tmp.path()), Duration::from_secs(5));

        let started = tokio::time::Instant::now();
        let summary = batch.run(&input, OutputFormat::Json).await.unwrap();

        assert_eq!(summary.failed, 2);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn combined_report_waits_between_fetches() {
        let tmp = tempfile::tempdir().unwrap();
        let input = input_file(tmp.path(), &[BELFAST, "https://www.shazam.com/x", EMPTY, NIGERIA]);
        let batch = delayed(batch(tmp.path()), Duration::from_secs(2));

        let started = tokio::time::Instant::now();
        batch.run_combined(&input, "charts").await.unwrap();

        // three fetches, two pauses
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }
}
