//! `fashion-etl` command line entry point

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use fashion_etl_lib::application::{CollectorConfig, EtlPipeline, ProductListCollector, ProductNormalizer, RunSummary};
use fashion_etl_lib::domain::PageRange;
use fashion_etl_lib::infrastructure::config::AppConfig;
use fashion_etl_lib::infrastructure::logging::{init_logging_with_config, log_system_info};
use fashion_etl_lib::infrastructure::{
    CsvSink, HttpClient, MemorySink, PostgresSink, ProductCardParser, ProductSink, SheetsSink,
};

/// Scrape the Fashion Studio catalogue and load it into CSV, PostgreSQL and Google Sheets
#[derive(Parser, Debug)]
#[command(name = "fashion-etl", version, about)]
struct Cli {
    /// First listing page to scrape
    #[arg(long)]
    start_page: Option<u32>,

    /// Last listing page to scrape (inclusive)
    #[arg(long)]
    end_page: Option<u32>,

    /// Stop once this many unique products are collected
    #[arg(long)]
    target: Option<usize>,

    /// CSV output path
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Pause between pages in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Do not write to PostgreSQL
    #[arg(long)]
    skip_db: bool,

    /// Do not upload to Google Sheets
    #[arg(long)]
    skip_sheets: bool,

    /// Run every stage but keep the result in memory only
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(start) = self.start_page {
            config.scrape.start_page = start;
        }
        if let Some(end) = self.end_page {
            config.scrape.end_page = end;
        }
        if let Some(target) = self.target {
            config.scrape.target_count = target;
        }
        if let Some(output) = &self.output {
            config.output.csv_path.clone_from(output);
        }
        if let Some(delay) = self.delay_ms {
            config.scrape.request_delay_ms = delay;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging_with_config(&config.logging) {
        eprintln!("Failed to initialize logging: {e:#}");
    }
    log_system_info();

    match run(&cli, &config).await {
        Ok(summary) => {
            for outcome in &summary.sink_results {
                match &outcome.result {
                    Ok(report) => info!(
                        "  {}: {} rows -> {}",
                        outcome.sink, report.rows_written, report.destination
                    ),
                    Err(e) => warn!("  {}: failed ({})", outcome.sink, e),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ ETL run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_env()?;
    cli.apply(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(cli: &Cli, config: &AppConfig) -> Result<RunSummary> {
    let fetcher = HttpClient::from_scrape_config(&config.scrape).context("Failed to build HTTP client")?;
    let parser = ProductCardParser::new().context("Failed to compile card selectors")?;
    let collector = ProductListCollector::new(
        Arc::new(fetcher),
        parser,
        CollectorConfig::from_scrape_config(&config.scrape),
    );

    let mut pipeline = EtlPipeline::new(
        collector,
        ProductNormalizer::from_config(&config.transform),
        PageRange::new(config.scrape.start_page, config.scrape.end_page),
        config.scrape.target_count,
    );
    for sink in build_sinks(cli, config)? {
        pipeline = pipeline.with_sink(sink);
    }
    info!("Configured sinks: {:?}", pipeline.sink_names());

    Ok(pipeline.run().await?)
}

fn build_sinks(cli: &Cli, config: &AppConfig) -> Result<Vec<Arc<dyn ProductSink>>> {
    if cli.dry_run {
        info!("Dry run: results stay in memory");
        return Ok(vec![Arc::new(MemorySink::new())]);
    }

    let mut sinks: Vec<Arc<dyn ProductSink>> = vec![Arc::new(CsvSink::new(&config.output.csv_path))];

    if cli.skip_db {
        info!("Skipping PostgreSQL sink");
    } else {
        sinks.push(Arc::new(
            PostgresSink::new(config.database.clone()).context("Invalid PostgreSQL sink settings")?,
        ));
    }

    if cli.skip_sheets {
        info!("Skipping Google Sheets sink");
    } else {
        match SheetsSink::from_config(&config.sheets).context("Failed to set up Google Sheets sink")? {
            Some(sink) => sinks.push(Arc::new(sink)),
            None => info!("No spreadsheet configured, Google Sheets sink disabled"),
        }
    }

    Ok(sinks)
}
