use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filter::DropReason;

/// Summary of one pipeline run, appended to the run log.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub timestamp: DateTime<Utc>,
    pub feed: Option<String>,

    // record counts
    pub fetched: usize,
    pub emitted: usize,
    pub below_threshold: usize,
    pub outside_region: usize,
    pub too_old: usize,
    pub wrong_event_type: usize,
    pub duplicates: usize,
    pub malformed: usize,

    // emitted magnitudes
    pub mean_magnitude: Option<f64>,
    pub max_magnitude: Option<f64>,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl RunStats {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        RunStats {
            timestamp,
            ..Default::default()
        }
    }

    pub fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::BelowThreshold => self.below_threshold += 1,
            DropReason::OutsideRegion => self.outside_region += 1,
            DropReason::TooOld => self.too_old += 1,
            DropReason::WrongEventType => self.wrong_event_type += 1,
        }
    }

    pub fn filtered(&self) -> usize {
        self.below_threshold + self.outside_region + self.too_old + self.wrong_event_type
    }

    /// Fills the magnitude summary from the emitted events.
    pub fn with_magnitudes(mut self, magnitudes: &[f64]) -> Self {
        self.mean_magnitude = mean(magnitudes);
        self.max_magnitude = magnitudes.iter().copied().reduce(f64::max);
        self
    }

    /// Create an error record with timestamp and error information
    pub fn from_error(error_type: &str, error_message: &str) -> Self {
        RunStats {
            timestamp: Utc::now(),
            error_type: Some(error_type.to_string()),
            error_message: Some(error_message.to_string()),
            ..Default::default()
        }
    }

    pub fn with_feed(mut self, feed: &str) -> Self {
        self.feed = Some(feed.to_string());
        self
    }
}

/// Arithmetic mean, `None` for empty input.
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn test_magnitude_summary() {
        let stats = RunStats::default().with_magnitudes(&[3.0, 5.0, 4.0]);
        assert_eq!(stats.mean_magnitude, Some(4.0));
        assert_eq!(stats.max_magnitude, Some(5.0));

        let empty = RunStats::default().with_magnitudes(&[]);
        assert_eq!(empty.max_magnitude, None);
    }

    #[test]
    fn test_record_drop_counts_by_reason() {
        let mut stats = RunStats::default();
        stats.record_drop(DropReason::TooOld);
        stats.record_drop(DropReason::TooOld);
        stats.record_drop(DropReason::OutsideRegion);

        assert_eq!(stats.too_old, 2);
        assert_eq!(stats.outside_region, 1);
        assert_eq!(stats.filtered(), 3);
    }

    #[test]
    fn test_from_error_with_feed() {
        let stats = RunStats::from_error("fetch_failure", "HTTP 503").with_feed("usgs");
        assert_eq!(stats.feed.as_deref(), Some("usgs"));
        assert_eq!(stats.error_type.as_deref(), Some("fetch_failure"));
        assert_eq!(stats.emitted, 0);
    }
}
