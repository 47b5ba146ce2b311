//! CLI parsing and orchestration. Parses args, merges config, runs the page loop, exports
//! XLSX, JSON, or CSV. Maps errors to exit codes.

use crate::config;
use crate::formats::{write_csv, write_json, FormatError, OutputFormat};
use crate::scraper::livelib::{reader_page_url, DEFAULT_BASE_URL};
use crate::scraper::{
    collect_user_rates, CatalogClient, CollectEnd, CollectOptions, ScraperError, StopSignal,
    DEFAULT_PAGE_DELAY,
};
use crate::xlsx::{write_xlsx, XlsxError};
use clap::Parser;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Reader collected when neither the command line nor the config names one.
pub const DEFAULT_USER_ID: &str = "Arlett";
/// Output file stem; the extension follows --format.
pub const DEFAULT_OUTPUT_STEM: &str = "user_book_rates";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scraper(#[from] ScraperError),

    #[error("{0}")]
    Xlsx(#[from] XlsxError),

    #[error("{0}")]
    Format(#[from] FormatError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scraper(_) => 2,
            CliRunError::Xlsx(_) | CliRunError::Format(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "livelib_rates")]
#[command(about = "Collect a LiveLib reader's read books and ratings into a spreadsheet")]
#[command(
    after_help = "Config file keys (user_id, base_url, output_dir, user_agent, page_delay_secs, timeout_secs) are read from ./livelib_rates.toml or the user config dir. CLI flags override config."
)]
pub struct Args {
    /// Reader id as it appears in /reader/{id}/ URLs. Default: config user_id, then Arlett.
    pub user_id: Option<String>,

    /// Output path. Default: ./user_book_rates.{ext} where ext depends on --format.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: xlsx, json, or csv.
    #[arg(long, default_value = "xlsx", value_parser = parse_format)]
    pub format: OutputFormat,

    /// Site root (overrides config; default https://www.livelib.ru).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Pause between pages in seconds (overrides config; default 60).
    #[arg(long)]
    pub delay: Option<u64>,

    /// Request timeout in seconds (overrides config; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// HTTP User-Agent (overrides config).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Warnings and errors only; no progress spinner.
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and the full error chain on failure.
    #[arg(long)]
    pub verbose: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
        "json" => Ok(OutputFormat::Json),
        "csv" => Ok(OutputFormat::Csv),
        _ => Err(format!(
            "Invalid --format value: '{}'. Use xlsx, json, or csv.",
            s
        )),
    }
}

/// Install the tracing subscriber. RUST_LOG wins over --quiet / --verbose.
pub fn init_logging(quiet: bool, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,livelib_rates={}", default_level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Ensure output path parent exists.
fn validate_output_path(path: &Path) -> Result<(), CliRunError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CliRunError::InvalidInput(format!(
                "Cannot write output: {}: parent directory does not exist.",
                path.display()
            )));
        }
    }
    Ok(())
}

fn default_output_path(output_dir: &Path, format: OutputFormat) -> PathBuf {
    output_dir.join(format!("{}.{}", DEFAULT_OUTPUT_STEM, format.extension()))
}

/// Entry point for the CLI. `stop` ends the run cleanly between pages; records gathered so
/// far are still exported.
pub fn run(args: &Args, stop: &StopSignal) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;

    let user_id = args
        .user_id
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.user_id.clone()))
        .unwrap_or_else(|| DEFAULT_USER_ID.to_string());
    let base_url = args
        .base_url
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    reader_page_url(&base_url, &user_id, 1).map_err(|e| CliRunError::InvalidInput(e.to_string()))?;

    let page_delay = args
        .delay
        .or_else(|| config.as_ref().and_then(|c| c.page_delay_secs))
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_PAGE_DELAY);
    let timeout_secs = args
        .timeout
        .or_else(|| config.as_ref().and_then(|c| c.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.user_agent.clone()));

    let output_path = match &args.output {
        Some(p) => p.clone(),
        None => {
            let dir = config
                .as_ref()
                .and_then(|c| c.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            default_output_path(&dir, args.format)
        }
    };
    validate_output_path(&output_path)?;

    let mut builder = CatalogClient::builder().timeout_secs(timeout_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    let mut client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    tracing::info!(
        user = %user_id,
        base = %base_url,
        delay_secs = page_delay.as_secs(),
        "collecting read books"
    );

    let spinner: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |page: u32, total: usize| {
        let mut state = spinner.borrow_mut();
        let pb = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new_spinner();
            if let Ok(style) = indicatif::ProgressStyle::default_spinner()
                .template("{spinner} {msg} ({elapsed})")
            {
                bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        pb.set_message(format!("Page {} done, {} books so far", page, total));
    };
    let progress: Option<&dyn Fn(u32, usize)> = if args.quiet { None } else { Some(&progress_cb) };

    let options = CollectOptions {
        page_delay,
        stop: Some(stop),
        progress,
    };
    let result = collect_user_rates(&mut client, &base_url, &user_id, &options);

    if let Some(pb) = spinner.borrow_mut().take() {
        pb.disable_steady_tick();
        pb.finish_and_clear();
    }
    let collection = result?;

    match collection.end {
        CollectEnd::EndOfCatalog => {}
        CollectEnd::Unconfirmed => tracing::warn!(
            pages = collection.pages_fetched,
            "last page was empty without an end-of-list marker; the list may be incomplete (throttled?). Try a longer --delay."
        ),
        CollectEnd::Stopped => tracing::warn!(
            pages = collection.pages_fetched,
            "stopped before the end of the list; exporting what was collected"
        ),
    }

    println!("{}", collection.records.len());

    match args.format {
        OutputFormat::Xlsx => write_xlsx(&collection.records, &output_path)?,
        OutputFormat::Json => write_json(&collection.records, &output_path)?,
        OutputFormat::Csv => write_csv(&collection.records, &output_path)?,
    }

    tracing::info!(path = %output_path.display(), "wrote output");
    Ok(())
}
