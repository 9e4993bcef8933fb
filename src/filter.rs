//! Per-record inclusion rules.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::event::QuakeEvent;

/// The gate a feed applies before region and age checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Threshold {
    Magnitude(f64),
    Intensity(i32),
}

/// An axis-aligned region. `min_lon > max_lon` wraps across the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        latitude >= self.min_lat
            && latitude <= self.max_lat
            && longitude_in_range(longitude, self.min_lon, self.max_lon)
    }
}

/// Longitude membership in `[min, max]`, wrapping when `min > max`.
pub fn longitude_in_range(longitude: f64, min: f64, max: f64) -> bool {
    if min > max {
        longitude >= min || longitude <= max
    } else {
        longitude >= min && longitude <= max
    }
}

/// Why a record was left out of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    BelowThreshold,
    OutsideRegion,
    TooOld,
    WrongEventType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub threshold: Threshold,
    pub bounding_box: Option<BoundingBox>,
    #[serde(serialize_with = "serialize_minutes")]
    pub max_age: Duration,
    pub event_type: Option<String>,
}

impl FilterCriteria {
    /// Checks every rule; the first failing one is reported.
    pub fn check(&self, event: &QuakeEvent, now: DateTime<Utc>) -> Result<(), DropReason> {
        let passes_threshold = match self.threshold {
            Threshold::Magnitude(min) => event.magnitude >= min,
            Threshold::Intensity(min) => event.intensity.is_some_and(|mmi| mmi >= min),
        };
        if !passes_threshold {
            return Err(DropReason::BelowThreshold);
        }

        if let Some(bbox) = &self.bounding_box {
            if !bbox.contains(event.longitude, event.latitude) {
                return Err(DropReason::OutsideRegion);
            }
        }

        if now - event.time > self.max_age {
            return Err(DropReason::TooOld);
        }

        if let Some(expected) = &self.event_type {
            if event.event_type.as_deref() != Some(expected.as_str()) {
                return Err(DropReason::WrongEventType);
            }
        }

        Ok(())
    }

    pub fn accepts(&self, event: &QuakeEvent, now: DateTime<Utc>) -> bool {
        self.check(event, now).is_ok()
    }
}

/// Converts a decimal minute count to a millisecond-precision duration.
pub fn minutes(value: f64) -> Duration {
    Duration::milliseconds((value * 60_000.0).round() as i64)
}

fn serialize_minutes<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.num_milliseconds() as f64 / 60_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn event(magnitude: f64, lon: f64, lat: f64) -> QuakeEvent {
        let mut e = QuakeEvent::new("e1", magnitude, now(), lon, lat);
        e.event_type = Some("earthquake".to_string());
        e
    }

    fn criteria(min_mag: f64) -> FilterCriteria {
        FilterCriteria {
            threshold: Threshold::Magnitude(min_mag),
            bounding_box: None,
            max_age: minutes(60.0),
            event_type: Some("earthquake".to_string()),
        }
    }

    #[test]
    fn test_longitude_normal_range() {
        assert!(longitude_in_range(0.0, -10.0, 10.0));
        assert!(!longitude_in_range(20.0, -10.0, 10.0));
        assert!(longitude_in_range(-10.0, -10.0, 10.0));
        assert!(longitude_in_range(10.0, -10.0, 10.0));
    }

    #[test]
    fn test_longitude_antimeridian_range() {
        assert!(longitude_in_range(175.0, 170.0, -170.0));
        assert!(longitude_in_range(-175.0, 170.0, -170.0));
        assert!(longitude_in_range(180.0, 170.0, -170.0));
        assert!(longitude_in_range(-180.0, 170.0, -170.0));
        assert!(!longitude_in_range(0.0, 170.0, -170.0));
        assert!(!longitude_in_range(169.9, 170.0, -170.0));
    }

    #[test]
    fn test_magnitude_threshold() {
        let c = criteria(2.5);
        assert_eq!(
            c.check(&event(2.4, 0.0, 0.0), now()),
            Err(DropReason::BelowThreshold)
        );
        assert!(c.accepts(&event(2.5, 0.0, 0.0), now()));
        assert!(c.accepts(&event(7.1, 0.0, 0.0), now()));
    }

    #[test]
    fn test_intensity_threshold_requires_intensity() {
        let c = FilterCriteria {
            threshold: Threshold::Intensity(4),
            event_type: None,
            ..criteria(0.0)
        };
        let mut e = event(3.0, 0.0, 0.0);
        assert_eq!(c.check(&e, now()), Err(DropReason::BelowThreshold));

        e.intensity = Some(3);
        assert_eq!(c.check(&e, now()), Err(DropReason::BelowThreshold));

        e.intensity = Some(4);
        assert!(c.accepts(&e, now()));
    }

    #[test]
    fn test_bounding_box_membership() {
        let c = FilterCriteria {
            bounding_box: Some(BoundingBox {
                min_lat: -50.0,
                max_lat: -30.0,
                min_lon: 170.0,
                max_lon: -170.0,
            }),
            ..criteria(0.0)
        };
        assert!(c.accepts(&event(3.0, 175.0, -41.0), now()));
        assert_eq!(
            c.check(&event(3.0, 0.0, -41.0), now()),
            Err(DropReason::OutsideRegion)
        );
        assert_eq!(
            c.check(&event(3.0, 175.0, -20.0), now()),
            Err(DropReason::OutsideRegion)
        );
    }

    #[test]
    fn test_age_boundary_is_inclusive() {
        let c = criteria(0.0);

        let mut at_boundary = event(3.0, 0.0, 0.0);
        at_boundary.time = now() - Duration::minutes(60);
        assert!(c.accepts(&at_boundary, now()));

        let mut older = event(3.0, 0.0, 0.0);
        older.time = now() - Duration::minutes(60) - Duration::milliseconds(1);
        assert_eq!(c.check(&older, now()), Err(DropReason::TooOld));
    }

    #[test]
    fn test_future_events_are_not_too_old() {
        let mut e = event(3.0, 0.0, 0.0);
        e.time = now() + Duration::minutes(5);
        assert!(criteria(0.0).accepts(&e, now()));
    }

    #[test]
    fn test_event_type_must_match() {
        let mut e = event(3.0, 0.0, 0.0);
        e.event_type = Some("explosion".to_string());
        assert_eq!(
            criteria(0.0).check(&e, now()),
            Err(DropReason::WrongEventType)
        );

        e.event_type = None;
        assert_eq!(
            criteria(0.0).check(&e, now()),
            Err(DropReason::WrongEventType)
        );
    }

    #[test]
    fn test_minutes_keeps_fractions() {
        assert_eq!(minutes(1.5), Duration::seconds(90));
        assert_eq!(minutes(10080.0), Duration::days(7));
    }
}
