//! One fetch → filter → transform → submit run.
//!
//! [`run`] is the whole contract: it either hands a complete
//! [`FeatureCollection`] to the sink or returns an error and submits
//! nothing. [`transform`] is the pure middle part, separated so it can be
//! exercised without a network.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::config::RawConfig;
use crate::error::{PipelineError, Result};
use crate::feeds::Feed;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::geojson::FeatureCollection;
use crate::parser::{FeedDocument, parse_feed};
use crate::sink::FeatureSink;
use crate::stats::RunStats;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Abort the run on the first record that fails to decode instead of
    /// skipping it.
    pub strict: bool,
}

/// The mapped output of a run, before submission.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub collection: FeatureCollection,
    pub stats: RunStats,
}

/// Filters and maps every record of an already-parsed document.
///
/// `now` is the reference instant for the age filter.
pub fn transform<F: Feed>(
    feed: &F,
    settings: &F::Settings,
    document: &FeedDocument,
    now: DateTime<Utc>,
    options: RunOptions,
) -> Result<RunOutput> {
    let criteria = feed.criteria(settings);
    let mut stats = RunStats::new(now).with_feed(feed.name());
    stats.fetched = document.features.len();

    let mut seen = HashSet::new();
    let mut features = Vec::new();
    let mut magnitudes = Vec::new();

    for (index, record) in document.features.iter().enumerate() {
        let event = match feed.decode(record) {
            Ok(event) => event,
            Err(e) if options.strict => {
                return Err(PipelineError::unexpected(format!(
                    "record {index} could not be decoded: {e:#}"
                )));
            }
            Err(e) => {
                warn!(index, error = %format!("{e:#}"), "Skipping malformed record");
                stats.malformed += 1;
                continue;
            }
        };

        if let Err(reason) = criteria.check(&event, now) {
            stats.record_drop(reason);
            continue;
        }

        if !seen.insert(event.id.clone()) {
            stats.duplicates += 1;
            continue;
        }

        magnitudes.push(event.magnitude);
        features.push(feed.to_feature(&event, settings));
    }

    stats.emitted = features.len();
    let stats = stats.with_magnitudes(&magnitudes);

    Ok(RunOutput {
        collection: FeatureCollection::new(features),
        stats,
    })
}

/// Runs the full pipeline once for `feed`.
///
/// Configuration is parsed before anything is fetched. Errors are logged
/// and returned; nothing is retried.
#[tracing::instrument(skip_all, fields(feed = feed.name(), sink = %sink.describe()))]
pub async fn run<F, C, S>(
    feed: &F,
    raw: &RawConfig,
    client: &C,
    sink: &S,
    options: RunOptions,
) -> Result<RunStats>
where
    F: Feed,
    C: HttpClient + ?Sized,
    S: FeatureSink + ?Sized,
{
    let result = run_inner(feed, raw, client, sink, options).await;
    if let Err(e) = &result {
        error!(error = %e, kind = e.kind(), "Run failed");
    }
    result
}

async fn run_inner<F, C, S>(
    feed: &F,
    raw: &RawConfig,
    client: &C,
    sink: &S,
    options: RunOptions,
) -> Result<RunStats>
where
    F: Feed,
    C: HttpClient + ?Sized,
    S: FeatureSink + ?Sized,
{
    let settings = feed.settings(raw)?;
    debug!(?settings, "Configuration parsed");

    let url = feed.url(&settings);
    let now = Utc::now();
    let bytes = fetch_bytes(client, &url, feed.accept()).await?;
    let document = parse_feed(&bytes)?;

    let RunOutput { collection, stats } = transform(feed, &settings, &document, now, options)?;

    if collection.is_empty() {
        debug!(fetched = stats.fetched, "No events passed the filters");
    }
    sink.submit(&collection).await.map_err(|e| {
        PipelineError::unexpected(format!("sink {} failed: {e:#}", sink.describe()))
    })?;

    info!(
        fetched = stats.fetched,
        emitted = stats.emitted,
        filtered = stats.filtered(),
        malformed = stats.malformed,
        "Features submitted"
    );
    Ok(stats)
}
