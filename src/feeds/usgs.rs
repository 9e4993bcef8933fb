//! USGS earthquake summary feed, gated by magnitude.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Feed, Remarks, SourceGeometry, magnitude_text};
use crate::config::{
    BOUNDING_BOX, COT_LIFETIME_SECONDS, ConfigReader, FieldSpec, MAX_AGE_MINUTES, MIN_MAGNITUDE,
    RawConfig,
};
use crate::event::QuakeEvent;
use crate::filter::{BoundingBox, FilterCriteria, Threshold, minutes};
use crate::geojson::{Feature, Link, Point, Properties, timestamp};
use crate::symbology::{alert_info, intensity_info};

pub const FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";

/// CoT type for a geophysical incident.
pub const COT_TYPE: &str = "a-f-X-i-g-e";

/// The weekly summary cannot answer for anything older than seven days.
pub const MAX_AGE_CAP_MINUTES: f64 = 10080.0;

/// Ten years; longer lifetimes are rejected.
pub const MAX_LIFETIME_SECONDS: f64 = 315_360_000.0;

static FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: MIN_MAGNITUDE,
        default: "2.5",
        description: "Minimum magnitude to include",
    },
    FieldSpec {
        name: BOUNDING_BOX,
        default: "-90,90,-180,180",
        description: "minLat,maxLat,minLon,maxLon; empty for worldwide",
    },
    FieldSpec {
        name: MAX_AGE_MINUTES,
        default: "60",
        description: "Only include events newer than this (capped at 10080)",
    },
    FieldSpec {
        name: COT_LIFETIME_SECONDS,
        default: "3600",
        description: "Symbol lifetime after the event time; empty for no stale time",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsgsSettings {
    pub min_magnitude: f64,
    pub bounding_box: Option<BoundingBox>,
    pub max_age_minutes: f64,
    pub lifetime_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct UsgsRecord {
    id: String,
    properties: UsgsProperties,
    geometry: SourceGeometry,
}

#[derive(Debug, Deserialize)]
struct UsgsProperties {
    mag: f64,
    place: Option<String>,
    /// Milliseconds since the Unix epoch.
    time: i64,
    url: Option<String>,
    felt: Option<u64>,
    mmi: Option<f64>,
    alert: Option<String>,
    tsunami: Option<i64>,
    #[serde(rename = "type")]
    event_type: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Usgs;

impl Feed for Usgs {
    type Settings = UsgsSettings;

    fn name(&self) -> &'static str {
        "usgs"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn settings(&self, raw: &RawConfig) -> crate::error::Result<UsgsSettings> {
        let mut r = ConfigReader::new(raw, FIELDS);
        let settings = UsgsSettings {
            min_magnitude: r.decimal(MIN_MAGNITUDE),
            bounding_box: r.bounding_box(BOUNDING_BOX),
            max_age_minutes: r.capped_decimal(MAX_AGE_MINUTES, MAX_AGE_CAP_MINUTES),
            lifetime_seconds: r
                .bounded_optional_decimal(COT_LIFETIME_SECONDS, MAX_LIFETIME_SECONDS),
        };
        r.finish()?;
        Ok(settings)
    }

    fn url(&self, _settings: &UsgsSettings) -> String {
        FEED_URL.to_string()
    }

    fn accept(&self) -> &'static str {
        "application/geo+json, application/json"
    }

    fn criteria(&self, settings: &UsgsSettings) -> FilterCriteria {
        FilterCriteria {
            threshold: Threshold::Magnitude(settings.min_magnitude),
            bounding_box: settings.bounding_box,
            max_age: minutes(settings.max_age_minutes),
            event_type: Some("earthquake".to_string()),
        }
    }

    fn decode(&self, record: &Value) -> Result<QuakeEvent> {
        let record = UsgsRecord::deserialize(record).context("invalid USGS record")?;
        let (longitude, latitude, depth_km) = record.geometry.position()?;
        let p = record.properties;
        let time = DateTime::<Utc>::from_timestamp_millis(p.time)
            .ok_or_else(|| anyhow!("event time {} is out of range", p.time))?;

        let mut event = QuakeEvent::new(&record.id, p.mag, time, longitude, latitude);
        event.depth_km = depth_km;
        event.place = p.place;
        event.title = p.title;
        event.alert = p.alert;
        event.intensity = p.mmi.map(|m| m.round() as i32);
        event.event_type = p.event_type;
        event.url = p.url;
        event.felt = p.felt;
        event.tsunami = p.tsunami.unwrap_or(0) != 0;
        Ok(event)
    }

    fn to_feature(&self, event: &QuakeEvent, settings: &UsgsSettings) -> Feature {
        let alert = alert_info(event.alert.as_deref());
        let magnitude = magnitude_text(event.magnitude);

        let callsign = event
            .title
            .clone()
            .unwrap_or_else(|| format!("M{magnitude} {}", event.place_or_unknown()));

        let remarks = Remarks::new()
            .line("Magnitude", &magnitude)
            .line("Location", event.place_or_unknown())
            .time("Time", event.time)
            .depth(event.depth_km)
            .line("Alert Level", alert.label)
            .line("Estimated Fatalities", alert.fatalities)
            .line("Estimated Losses", alert.losses)
            .maybe("Max Intensity", event.intensity.map(intensity_text))
            .maybe("Felt Reports", event.felt)
            .maybe("Tsunami Warning", event.tsunami.then_some("Yes"))
            .build();

        let stale = settings
            .lifetime_seconds
            .and_then(|secs| {
                let lifetime = Duration::try_milliseconds((secs * 1000.0).round() as i64)?;
                event.time.checked_add_signed(lifetime)
            })
            .map(timestamp);

        let links = event
            .url
            .iter()
            .map(|url| {
                Link::web_page(&format!("usgs-{}-page", event.id), url, "USGS Event Page")
            })
            .collect();

        let time = timestamp(event.time);
        Feature::new(
            format!("usgs-{}", event.id),
            Properties {
                callsign,
                cot_type: COT_TYPE.to_string(),
                icon: alert.icon.to_string(),
                time: time.clone(),
                start: time,
                stale,
                marker_color: Some(alert.color.to_string()),
                remarks,
                links,
            },
            Point::with_elevation(event.longitude, event.latitude, -event.depth_or_zero()),
        )
    }
}

fn intensity_text(mmi: i32) -> String {
    format!("MMI {mmi} ({})", intensity_info(Some(mmi)).descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_record() -> Value {
        json!({
            "type": "Feature",
            "id": "us7000abcd",
            "properties": {
                "mag": 6.2,
                "place": "45 km NE of Somewhere",
                "time": 1709294400000i64,
                "url": "https://earthquake.usgs.gov/earthquakes/eventpage/us7000abcd",
                "felt": 120,
                "mmi": 6.4,
                "alert": "yellow",
                "tsunami": 1,
                "type": "earthquake",
                "title": "M 6.2 - 45 km NE of Somewhere"
            },
            "geometry": { "type": "Point", "coordinates": [142.5, 38.1, 35.0] }
        })
    }

    fn settings() -> UsgsSettings {
        Usgs.settings(&RawConfig::new()).unwrap()
    }

    #[test]
    fn test_default_settings() {
        let s = settings();
        assert_eq!(s.min_magnitude, 2.5);
        assert_eq!(s.max_age_minutes, 60.0);
        assert_eq!(s.lifetime_seconds, Some(3600.0));
        assert!(s.bounding_box.is_some());
    }

    #[test]
    fn test_max_age_is_clamped_to_a_week() {
        let raw = RawConfig::from([(MAX_AGE_MINUTES, "50000")]);
        assert_eq!(Usgs.settings(&raw).unwrap().max_age_minutes, 10080.0);
    }

    #[test]
    fn test_oversized_lifetime_is_invalid_configuration() {
        let raw = RawConfig::from([(COT_LIFETIME_SECONDS, "1e15")]);
        match Usgs.settings(&raw) {
            Err(PipelineError::InvalidConfiguration(issues)) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field, COT_LIFETIME_SECONDS);
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }

        let raw = RawConfig::from([(COT_LIFETIME_SECONDS, "315360000")]);
        assert!(Usgs.settings(&raw).is_ok());
    }

    #[test]
    fn test_stale_never_overflows() {
        let event = Usgs.decode(&sample_record()).unwrap();
        let settings = UsgsSettings {
            lifetime_seconds: Some(1e15),
            ..settings()
        };
        let feature = Usgs.to_feature(&event, &settings);
        assert!(feature.properties.stale.is_none());
    }

    #[test]
    fn test_bad_settings_fail_together() {
        let raw = RawConfig::from([
            (MIN_MAGNITUDE, "x"),
            (BOUNDING_BOX, "1,2,3"),
            (MAX_AGE_MINUTES, "soon"),
        ]);
        match Usgs.settings(&raw) {
            Err(PipelineError::InvalidConfiguration(issues)) => assert_eq!(issues.len(), 3),
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_full_record() {
        let event = Usgs.decode(&sample_record()).unwrap();

        assert_eq!(event.id, "us7000abcd");
        assert_eq!(event.magnitude, 6.2);
        assert_eq!(event.time, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(event.depth_km, Some(35.0));
        assert_eq!(event.intensity, Some(6));
        assert_eq!(event.alert.as_deref(), Some("yellow"));
        assert!(event.tsunami);
    }

    #[test]
    fn test_decode_rejects_null_magnitude() {
        let mut record = sample_record();
        record["properties"]["mag"] = Value::Null;
        assert!(Usgs.decode(&record).is_err());
    }

    #[test]
    fn test_feature_mapping() {
        let event = Usgs.decode(&sample_record()).unwrap();
        let feature = Usgs.to_feature(&event, &settings());
        let p = &feature.properties;

        assert_eq!(feature.id, "usgs-us7000abcd");
        assert_eq!(p.callsign, "M 6.2 - 45 km NE of Somewhere");
        assert_eq!(p.cot_type, COT_TYPE);
        assert_eq!(p.icon, "quake/alert-yellow.png");
        assert_eq!(p.marker_color.as_deref(), Some("#FBC02D"));
        assert_eq!(p.time, "2024-03-01T12:00:00.000Z");
        assert_eq!(p.start, p.time);
        assert_eq!(p.stale.as_deref(), Some("2024-03-01T13:00:00.000Z"));
        assert_eq!(feature.geometry.coordinates, vec![142.5, 38.1, -35.0]);

        assert!(p.remarks.contains("Magnitude: 6.2"));
        assert!(p.remarks.contains("Location: 45 km NE of Somewhere"));
        assert!(p.remarks.contains("Depth: 35.0 km"));
        assert!(p.remarks.contains("Alert Level: Yellow"));
        assert!(p.remarks.contains("Estimated Fatalities: 1 - 99"));
        assert!(p.remarks.contains("Estimated Losses: $1 million - $100 million"));
        assert!(p.remarks.contains("Max Intensity: MMI 6 (Strong)"));
        assert!(p.remarks.contains("Felt Reports: 120"));
        assert!(p.remarks.contains("Tsunami Warning: Yes"));

        assert_eq!(p.links.len(), 1);
        assert_eq!(
            p.links[0].url,
            "https://earthquake.usgs.gov/earthquakes/eventpage/us7000abcd"
        );
    }

    #[test]
    fn test_feature_mapping_without_optional_fields() {
        let record = json!({
            "id": "nc1",
            "properties": { "mag": 3.04, "place": "10 km W of Cobb, CA", "time": 1709294400000i64 },
            "geometry": { "type": "Point", "coordinates": [-122.8, 38.8] }
        });
        let event = Usgs.decode(&record).unwrap();
        let raw = RawConfig::from([(COT_LIFETIME_SECONDS, "")]);
        let feature = Usgs.to_feature(&event, &Usgs.settings(&raw).unwrap());
        let p = &feature.properties;

        assert_eq!(p.callsign, "M3.0 10 km W of Cobb, CA");
        assert_eq!(p.icon, "quake/alert-none.png");
        assert_eq!(p.marker_color.as_deref(), Some("#9E9E9E"));
        assert!(p.stale.is_none());
        assert!(p.links.is_empty());
        assert!(p.remarks.contains("Estimated Fatalities: Not estimated"));
        assert!(!p.remarks.contains("Felt Reports"));
        assert_eq!(feature.geometry.elevation(), Some(0.0));
    }
}
