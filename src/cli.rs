use clap::{Args, Parser, Subcommand};
use log::info;
use rcharts::charts::{
    ExtractMode, OutputFormat,
    aggregate::DEFAULT_PREFIX,
    errors::{Error, Result},
    scaffold,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::batch;

#[derive(Parser)]
#[command(name = "rcharts")]
#[command(version, about = "Scrape Shazam city and country charts into files", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    scrape: ScrapeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one file per chart URL (default)
    Scrape(ScrapeArgs),
    /// Write every chart into a single JSON document
    Combine(CombineArgs),
    /// Only create the per-location folder tree
    Scaffold(ScaffoldArgs),
}

#[derive(Args)]
struct ScrapeArgs {
    /// Text file with one chart URL per line
    input_file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct CombineArgs {
    /// Text file with one chart URL per line
    input_file: PathBuf,

    /// File name prefix of the combined document
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct ScaffoldArgs {
    /// Text file with one chart URL per line
    input_file: PathBuf,

    /// Root of the folder tree
    #[arg(long, default_value = scaffold::DEFAULT_BASE)]
    base: PathBuf,
}

#[derive(Args)]
struct CommonArgs {
    /// Root directory for output files [env: RCHARTS_OUTPUT_DIR] [default: data, or . for combine]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Seconds to wait between requests [env: RCHARTS_DELAY_SECS]
    #[arg(long, value_parser = parse_delay)]
    delay: Option<Duration>,

    /// Fail pages that lack the chart list container instead of treating them as empty
    #[arg(long)]
    strict: bool,
}

impl CommonArgs {
    fn builder(&self) -> batch::ConfigBuilder {
        let mode = if self.strict {
            ExtractMode::Strict
        } else {
            ExtractMode::Lenient
        };
        batch::ConfigBuilder::new()
            .output_dir(self.output_dir.clone())
            .delay(self.delay)
            .mode(mode)
    }
}

fn parse_delay(raw: &str) -> std::result::Result<Duration, String> {
    batch::parse_secs(raw).ok_or_else(|| format!("'{raw}' is not a non-negative number of seconds"))
}

pub async fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Scrape(args)) => scrape_charts(args).await,
        Some(Commands::Combine(args)) => combine_charts(args).await,
        Some(Commands::Scaffold(args)) => scaffold_folders(&args.input_file, &args.base).await,
        None => scrape_charts(cli.scrape).await,
    }
}

const USAGE: &str = "Usage: rcharts <INPUT_FILE> [--format json|txt|csv]
Example: rcharts city_urls.txt --format csv";

fn require_input(input: Option<PathBuf>) -> Result<PathBuf> {
    input.ok_or_else(|| Error::Usage(USAGE.to_string()))
}

async fn scrape_charts(args: ScrapeArgs) -> Result<()> {
    let input = require_input(args.input_file)?;
    // fail on a missing input file before any network client is built
    batch::ensure_input_exists(&input).await?;
    info!("Building config ...");
    let config = args.common.builder().build()?;
    let summary = batch::Batch::new(config).run(&input, args.format).await?;
    info!("Wrote {} files", summary.written.len());
    Ok(())
}

async fn combine_charts(args: CombineArgs) -> Result<()> {
    batch::ensure_input_exists(&args.input_file).await?;
    info!("Building config ...");
    // the combined report lands in the working directory unless configured
    let config = args.common.builder().default_output_dir(".").build()?;
    batch::Batch::new(config)
        .run_combined(&args.input_file, &args.prefix)
        .await?;
    Ok(())
}

async fn scaffold_folders(input: &Path, base: &Path) -> Result<()> {
    let urls = batch::read_urls(input).await?;
    let summary = scaffold::scaffold(&urls, base).await?;
    info!(
        "Created {} folders, skipped {} URLs",
        summary.created.len(),
        summary.skipped.len()
    );
    Ok(())
}
