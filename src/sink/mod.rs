//! Destinations for a run's feature collection.

mod file;
mod s3;

pub use file::{FileSink, StdoutSink};
pub use s3::S3Sink;

use anyhow::Result;

use crate::geojson::FeatureCollection;

/// Receives the complete output of one run.
///
/// A submission is a single call; the pipeline never retries it.
#[async_trait::async_trait]
pub trait FeatureSink: Send + Sync {
    async fn submit(&self, collection: &FeatureCollection) -> Result<()>;

    /// Where the collection goes, for log lines.
    fn describe(&self) -> String;
}
