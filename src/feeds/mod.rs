//! Feed variants.
//!
//! A [`Feed`] knows its configuration fields, where to fetch from, how to
//! decode one upstream record into a [`QuakeEvent`] and how to map a
//! surviving event to an output [`Feature`]. The pipeline drives the rest.

pub mod geonet;
mod remarks;
pub mod usgs;

pub use geonet::Geonet;
pub use remarks::Remarks;
pub use usgs::Usgs;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{FieldSpec, RawConfig};
use crate::event::QuakeEvent;
use crate::filter::FilterCriteria;
use crate::geojson::Feature;

pub trait Feed: Send + Sync {
    /// Typed settings parsed from the string configuration once per run.
    type Settings: std::fmt::Debug + Serialize + Send + Sync;

    /// Short name, also the prefix of emitted feature ids.
    fn name(&self) -> &'static str;

    /// Configuration fields this variant reads, with defaults.
    fn fields(&self) -> &'static [FieldSpec];

    fn settings(&self, raw: &RawConfig) -> crate::error::Result<Self::Settings>;

    fn url(&self, settings: &Self::Settings) -> String;

    fn accept(&self) -> &'static str {
        "application/json"
    }

    fn criteria(&self, settings: &Self::Settings) -> FilterCriteria;

    /// Decodes one element of the upstream `features` array.
    fn decode(&self, record: &Value) -> Result<QuakeEvent>;

    fn to_feature(&self, event: &QuakeEvent, settings: &Self::Settings) -> Feature;
}

/// GeoJSON point geometry as served upstream.
#[derive(Debug, Deserialize)]
pub(crate) struct SourceGeometry {
    pub(crate) coordinates: Vec<f64>,
}

impl SourceGeometry {
    /// Returns `(longitude, latitude, depth)`.
    pub(crate) fn position(&self) -> Result<(f64, f64, Option<f64>)> {
        match self.coordinates.as_slice() {
            [lon, lat] => Ok((*lon, *lat, None)),
            [lon, lat, depth, ..] => Ok((*lon, *lat, Some(*depth))),
            other => bail!("expected at least 2 coordinates, got {}", other.len()),
        }
    }
}

/// Formats a magnitude the way labels and remarks show it.
pub(crate) fn magnitude_text(magnitude: f64) -> String {
    format!("{magnitude:.1}")
}
