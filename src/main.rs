//! CLI entry point for the earthquake feed tasks.
//!
//! Each invocation performs a single run of one feed; scheduling repeated
//! runs is left to cron or whatever invokes the binary.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use quake_feeds::config::RawConfig;
use quake_feeds::feeds::{Feed, Geonet, Usgs};
use quake_feeds::fetch::{BasicClient, WithHeader};
use quake_feeds::output::append_record;
use quake_feeds::pipeline::{self, RunOptions};
use quake_feeds::sink::{FeatureSink, FileSink, S3Sink, StdoutSink};
use quake_feeds::stats::RunStats;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const USER_AGENT: &str = concat!("quake_feeds/", env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(name = "quake_feeds")]
#[command(about = "Poll earthquake feeds and emit map features", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FeedName {
    /// USGS weekly summary, filtered by magnitude
    Usgs,
    /// GeoNet New Zealand, filtered by intensity
    Geonet,
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON file of named string fields, e.g. {"Min Magnitude": "4.5"}
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Override a field, e.g. --set "Max Age Minutes=120"
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
    overrides: Vec<String>,
}

impl ConfigArgs {
    fn load(&self) -> Result<RawConfig> {
        let mut raw = match &self.config {
            Some(path) => RawConfig::load(path)?,
            None => RawConfig::new(),
        };
        for assignment in &self.overrides {
            raw.apply_override(assignment)?;
        }
        Ok(raw)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, filter and submit one feed
    Run {
        #[arg(value_enum)]
        feed: FeedName,

        #[command(flatten)]
        config: ConfigArgs,

        /// Write the feature collection to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Upload the feature collection to this S3 bucket
        #[arg(long, requires = "s3_key")]
        s3_bucket: Option<String>,

        /// Object key for the S3 upload
        #[arg(long, requires = "s3_bucket")]
        s3_key: Option<String>,

        /// Gzip the S3 upload
        #[arg(long, default_value_t = false)]
        gzip: bool,

        /// CSV file to append a run summary to
        #[arg(long)]
        run_log: Option<String>,

        /// Fail the run on the first malformed record instead of skipping it
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Validate configuration and print the parsed settings
    Check {
        #[arg(value_enum)]
        feed: FeedName,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// List feeds with their configuration fields and defaults
    Feeds,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/quake_feeds.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("quake_feeds.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            feed,
            config,
            output,
            s3_bucket,
            s3_key,
            gzip,
            run_log,
            strict,
        } => {
            let raw = config.load()?;
            let sink: Box<dyn FeatureSink> = match (s3_bucket, s3_key, output) {
                (Some(bucket), Some(key), _) => {
                    Box::new(S3Sink::from_env(&bucket, &key, gzip).await)
                }
                (_, _, Some(path)) => Box::new(FileSink::new(path)),
                _ => Box::new(StdoutSink),
            };
            let options = RunOptions { strict };

            match feed {
                FeedName::Usgs => run_feed(&Usgs, &raw, sink.as_ref(), options, run_log).await?,
                FeedName::Geonet => run_feed(&Geonet, &raw, sink.as_ref(), options, run_log).await?,
            }
        }
        Commands::Check { feed, config } => {
            let raw = config.load()?;
            match feed {
                FeedName::Usgs => check_feed(&Usgs, &raw)?,
                FeedName::Geonet => check_feed(&Geonet, &raw)?,
            }
        }
        Commands::Feeds => {
            list_fields(&Usgs);
            list_fields(&Geonet);
        }
    }

    Ok(())
}

/// Runs one feed and appends the outcome to the run log, if any.
async fn run_feed<F: Feed>(
    feed: &F,
    raw: &RawConfig,
    sink: &dyn FeatureSink,
    options: RunOptions,
    run_log: Option<String>,
) -> Result<()> {
    let client = WithHeader::user_agent(
        BasicClient::with_timeouts(Duration::from_secs(30), Duration::from_secs(10))?,
        USER_AGENT,
    )?;

    let result = pipeline::run(feed, raw, &client, sink, options).await;

    if let Some(path) = &run_log {
        let record = match &result {
            Ok(stats) => stats.clone(),
            Err(e) => RunStats::from_error(e.kind(), &e.to_string()).with_feed(feed.name()),
        };
        if let Err(e) = append_record(path, &record) {
            error!(path = %path, error = %e, "Failed to append run log");
        }
    }

    let stats = result.with_context(|| format!("{} run failed", feed.name()))?;
    info!(emitted = stats.emitted, "Run complete");
    Ok(())
}

fn check_feed<F: Feed>(feed: &F, raw: &RawConfig) -> Result<()> {
    let settings = feed.settings(raw)?;
    let report = serde_json::json!({
        "feed": feed.name(),
        "url": feed.url(&settings),
        "settings": settings,
        "criteria": feed.criteria(&settings),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn list_fields<F: Feed>(feed: &F) {
    println!("{}", feed.name());
    for field in feed.fields() {
        let default = format!("{:?}", field.default);
        println!("  {:<22} default {default:<18} {}", field.name, field.description);
    }
}
