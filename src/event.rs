//! The normalized earthquake record every feed variant decodes into.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct QuakeEvent {
    /// Upstream identifier, unique within a feed document.
    pub id: String,
    pub magnitude: f64,
    pub time: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
    /// Kilometers below the surface.
    pub depth_km: Option<f64>,
    pub place: Option<String>,
    pub title: Option<String>,
    pub alert: Option<String>,
    /// Modified Mercalli intensity.
    pub intensity: Option<i32>,
    pub quality: Option<String>,
    pub event_type: Option<String>,
    pub url: Option<String>,
    pub felt: Option<u64>,
    pub tsunami: bool,
}

impl QuakeEvent {
    /// A bare event at the given position; optional fields start empty.
    pub fn new(
        id: &str,
        magnitude: f64,
        time: DateTime<Utc>,
        longitude: f64,
        latitude: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            magnitude,
            time,
            longitude,
            latitude,
            depth_km: None,
            place: None,
            title: None,
            alert: None,
            intensity: None,
            quality: None,
            event_type: None,
            url: None,
            felt: None,
            tsunami: false,
        }
    }

    pub fn depth_or_zero(&self) -> f64 {
        self.depth_km.unwrap_or(0.0)
    }

    pub fn place_or_unknown(&self) -> &str {
        self.place.as_deref().unwrap_or("Unknown location")
    }
}
