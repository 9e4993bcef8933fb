//! GeoNet (New Zealand) quake feed, gated by shaking intensity.
//!
//! GeoNet serves depth as a property and 2-D coordinates, so emitted
//! points carry no elevation. The API has no symbol lifetime concept and
//! no alert levels, so features get neither a stale time nor a marker color.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Feed, Remarks, SourceGeometry, magnitude_text};
use crate::config::{BOUNDING_BOX, ConfigReader, FieldSpec, MAX_AGE_MINUTES, MMI, RawConfig};
use crate::event::QuakeEvent;
use crate::filter::{BoundingBox, FilterCriteria, Threshold, minutes};
use crate::geojson::{Feature, Link, Point, Properties, timestamp};
use crate::symbology::intensity_info;

pub const API_URL: &str = "https://api.geonet.org.nz/quake";
pub const QUAKE_PAGE_URL: &str = "https://www.geonet.org.nz/earthquake";

/// CoT type for a geophysical incident of unknown affiliation.
pub const COT_TYPE: &str = "a-u-X-i-g-e";

pub const MIN_MMI: i32 = -1;
pub const MAX_MMI: i32 = 8;

static FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: MMI,
        default: "3",
        description: "Minimum Modified Mercalli intensity, -1 to 8",
    },
    FieldSpec {
        name: BOUNDING_BOX,
        default: "-90,90,-180,180",
        description: "minLat,maxLat,minLon,maxLon; empty for everywhere",
    },
    FieldSpec {
        name: MAX_AGE_MINUTES,
        default: "1440",
        description: "Only include events newer than this",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeonetSettings {
    pub mmi: i32,
    pub bounding_box: Option<BoundingBox>,
    pub max_age_minutes: f64,
}

#[derive(Debug, Deserialize)]
struct GeonetRecord {
    properties: GeonetProperties,
    geometry: SourceGeometry,
}

#[derive(Debug, Deserialize)]
struct GeonetProperties {
    #[serde(rename = "publicID")]
    public_id: String,
    time: DateTime<Utc>,
    depth: Option<f64>,
    magnitude: f64,
    mmi: Option<i32>,
    locality: Option<String>,
    quality: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Geonet;

impl Feed for Geonet {
    type Settings = GeonetSettings;

    fn name(&self) -> &'static str {
        "geonet"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn settings(&self, raw: &RawConfig) -> crate::error::Result<GeonetSettings> {
        let mut r = ConfigReader::new(raw, FIELDS);
        let settings = GeonetSettings {
            mmi: r.integer_in(MMI, MIN_MMI, MAX_MMI),
            bounding_box: r.bounding_box(BOUNDING_BOX),
            max_age_minutes: r.decimal(MAX_AGE_MINUTES),
        };
        r.finish()?;
        Ok(settings)
    }

    fn url(&self, settings: &GeonetSettings) -> String {
        format!("{API_URL}?MMI={}", settings.mmi)
    }

    fn accept(&self) -> &'static str {
        "application/vnd.geo+json;version=2"
    }

    fn criteria(&self, settings: &GeonetSettings) -> FilterCriteria {
        FilterCriteria {
            threshold: Threshold::Intensity(settings.mmi),
            bounding_box: settings.bounding_box,
            max_age: minutes(settings.max_age_minutes),
            event_type: None,
        }
    }

    fn decode(&self, record: &Value) -> Result<QuakeEvent> {
        let record = GeonetRecord::deserialize(record).context("invalid GeoNet record")?;
        let (longitude, latitude, _) = record.geometry.position()?;
        let p = record.properties;

        let mut event = QuakeEvent::new(&p.public_id, p.magnitude, p.time, longitude, latitude);
        event.depth_km = p.depth;
        event.place = p.locality;
        event.intensity = p.mmi;
        event.quality = p.quality;
        event.url = Some(format!("{QUAKE_PAGE_URL}/{}", p.public_id));
        Ok(event)
    }

    fn to_feature(&self, event: &QuakeEvent, _settings: &GeonetSettings) -> Feature {
        let intensity = intensity_info(event.intensity);
        let magnitude = magnitude_text(event.magnitude);

        let intensity_line = match event.intensity {
            Some(mmi) => format!("MMI {mmi} ({})", intensity.descriptor),
            None => "Unknown".to_string(),
        };

        let remarks = Remarks::new()
            .line("Magnitude", &magnitude)
            .line("Locality", event.place_or_unknown())
            .time("Time", event.time)
            .depth(event.depth_km)
            .line("Intensity", intensity_line)
            .maybe("Quality", event.quality.as_deref())
            .build();

        let links = event
            .url
            .iter()
            .map(|url| {
                Link::web_page(&format!("geonet-{}-page", event.id), url, "GeoNet Quake Page")
            })
            .collect();

        let time = timestamp(event.time);
        Feature::new(
            format!("geonet-{}", event.id),
            Properties {
                callsign: format!("M{magnitude} {}", event.place_or_unknown()),
                cot_type: COT_TYPE.to_string(),
                icon: intensity.icon.to_string(),
                time: time.clone(),
                start: time,
                stale: None,
                marker_color: None,
                remarks,
                links,
            },
            Point::new(event.longitude, event.latitude),
        )
    }
}
