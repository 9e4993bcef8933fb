//! GeoJSON output types handed to a sink.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: Properties,
    pub geometry: Point,
}

impl Feature {
    pub fn new(id: String, properties: Properties, geometry: Point) -> Self {
        Self {
            id,
            kind: "Feature".to_string(),
            properties,
            geometry,
        }
    }
}

/// Symbology and metadata attached to a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub callsign: String,
    /// CoT type code, e.g. `a-f-X-i-g-e`.
    #[serde(rename = "type")]
    pub cot_type: String,
    pub icon: String,
    pub time: String,
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale: Option<String>,
    #[serde(rename = "marker-color", skip_serializing_if = "Option::is_none")]
    pub marker_color: Option<String>,
    pub remarks: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub uid: String,
    pub relation: String,
    pub mime: String,
    pub url: String,
    pub remarks: String,
}

impl Link {
    /// An HTML page related to the feature.
    pub fn web_page(uid: &str, url: &str, remarks: &str) -> Self {
        Self {
            uid: uid.to_string(),
            relation: "r-u".to_string(),
            mime: "text/html".to_string(),
            url: url.to_string(),
            remarks: remarks.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

impl Point {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: vec![longitude, latitude],
        }
    }

    pub fn with_elevation(longitude: f64, latitude: f64, elevation: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: vec![longitude, latitude, elevation],
        }
    }

    pub fn elevation(&self) -> Option<f64> {
        self.coordinates.get(2).copied()
    }
}

/// RFC 3339, UTC, millisecond precision.
pub fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(timestamp(t), "2024-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_optional_properties_are_omitted() {
        let feature = Feature::new(
            "x-1".to_string(),
            Properties {
                callsign: "M3.0 Somewhere".to_string(),
                cot_type: "a-u-X-i-g-e".to_string(),
                icon: "quake/mmi-3.png".to_string(),
                time: "2024-01-02T03:04:05.000Z".to_string(),
                start: "2024-01-02T03:04:05.000Z".to_string(),
                stale: None,
                marker_color: None,
                remarks: "Magnitude: 3.0".to_string(),
                links: vec![],
            },
            Point::new(174.0, -41.0),
        );

        let json = serde_json::to_value(&feature).unwrap();
        let props = json["properties"].as_object().unwrap();
        assert!(!props.contains_key("stale"));
        assert!(!props.contains_key("marker-color"));
        assert!(!props.contains_key("links"));
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["coordinates"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_collection_type_tag() {
        let json = serde_json::to_value(FeatureCollection::new(vec![])).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert!(json["features"].as_array().unwrap().is_empty());
    }
}
