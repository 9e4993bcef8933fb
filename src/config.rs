//! String-valued task configuration and its eager, typed parsing.
//!
//! Every field arrives as a string keyed by a display name such as
//! `"Min Magnitude"`. Feed variants read their fields through a
//! [`ConfigReader`], which records every problem it meets and only fails
//! once, in [`ConfigReader::finish`], so a bad configuration is reported in
//! full before anything is fetched.

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigIssue, PipelineError};
use crate::filter::BoundingBox;

pub const MIN_MAGNITUDE: &str = "Min Magnitude";
pub const MMI: &str = "MMI";
pub const BOUNDING_BOX: &str = "Bounding Box";
pub const MAX_AGE_MINUTES: &str = "Max Age Minutes";
pub const COT_LIFETIME_SECONDS: &str = "CoT Lifetime Seconds";

/// A named configuration field with its default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Raw configuration: field name to string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig(BTreeMap<String, String>);

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON object of string values, e.g. `{"Min Magnitude": "4.5"}`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config: RawConfig = serde_json::from_str(&content)
            .with_context(|| format!("config file '{path}' is not a JSON object of strings"))?;
        Ok(config)
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    /// Applies a `Name=value` override as given on the command line.
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let Some((name, value)) = assignment.split_once('=') else {
            bail!("override '{assignment}' is not of the form Name=value");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("override '{assignment}' has an empty field name");
        }
        self.set(name, value.trim());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RawConfig {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let mut config = RawConfig::new();
        for (name, value) in pairs {
            config.set(name, value);
        }
        config
    }
}

/// Reads typed values out of a [`RawConfig`], collecting issues as it goes.
///
/// Accessors return a placeholder when a value is bad; the placeholder is
/// never observed because [`finish`](Self::finish) fails whenever any issue
/// was recorded.
pub struct ConfigReader<'a> {
    raw: &'a RawConfig,
    fields: &'a [FieldSpec],
    issues: Vec<ConfigIssue>,
}

impl<'a> ConfigReader<'a> {
    pub fn new(raw: &'a RawConfig, fields: &'a [FieldSpec]) -> Self {
        Self {
            raw,
            fields,
            issues: Vec::new(),
        }
    }

    fn value(&self, name: &str) -> &'a str {
        match self.raw.get(name) {
            Some(v) => v.trim(),
            None => self
                .fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.default)
                .unwrap_or(""),
        }
    }

    fn issue(&mut self, name: &str, reason: impl Into<String>) {
        self.issues.push(ConfigIssue::new(name, reason));
    }

    /// A finite, non-negative decimal.
    pub fn decimal(&mut self, name: &str) -> f64 {
        let raw = self.value(name);
        match parse_finite(raw) {
            Some(v) if v >= 0.0 => v,
            Some(_) => {
                self.issue(name, format!("must not be negative: {raw:?}"));
                0.0
            }
            None => {
                self.issue(name, format!("not a number: {raw:?}"));
                0.0
            }
        }
    }

    /// Like [`decimal`](Self::decimal), but an empty value means "unset".
    pub fn optional_decimal(&mut self, name: &str) -> Option<f64> {
        if self.value(name).is_empty() {
            None
        } else {
            Some(self.decimal(name))
        }
    }

    /// An optional decimal no larger than `max`.
    pub fn bounded_optional_decimal(&mut self, name: &str, max: f64) -> Option<f64> {
        let value = self.optional_decimal(name)?;
        if value > max {
            self.issue(name, format!("{value} exceeds the maximum of {max}"));
            return None;
        }
        Some(value)
    }

    /// An integer within `min..=max`.
    pub fn integer_in(&mut self, name: &str, min: i32, max: i32) -> i32 {
        let raw = self.value(name);
        match raw.parse::<i32>() {
            Ok(v) if (min..=max).contains(&v) => v,
            Ok(v) => {
                self.issue(name, format!("{v} is outside {min}..={max}"));
                min
            }
            Err(_) => {
                self.issue(name, format!("not an integer: {raw:?}"));
                min
            }
        }
    }

    /// A decimal clamped to `cap`. Clamping is logged, not rejected.
    pub fn capped_decimal(&mut self, name: &str, cap: f64) -> f64 {
        let v = self.decimal(name);
        if v > cap {
            warn!(field = name, requested = v, cap, "Value exceeds cap, clamping");
            cap
        } else {
            v
        }
    }

    /// `minLat,maxLat,minLon,maxLon`; an empty value means no box.
    pub fn bounding_box(&mut self, name: &str) -> Option<BoundingBox> {
        let raw = self.value(name);
        if raw.is_empty() {
            return None;
        }

        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            self.issue(name, format!("expected 4 values, got {}", parts.len()));
            return None;
        }

        let mut values = [0.0; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            match parse_finite(part) {
                Some(v) => *slot = v,
                None => {
                    self.issue(name, format!("not a number: {part:?}"));
                    return None;
                }
            }
        }

        let [min_lat, max_lat, min_lon, max_lon] = values;
        let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
        let lon_ok = |v: f64| (-180.0..=180.0).contains(&v);

        if !lat_ok(min_lat) || !lat_ok(max_lat) {
            self.issue(name, "latitudes must be within -90..90");
            return None;
        }
        if min_lat > max_lat {
            self.issue(name, "minimum latitude is greater than maximum latitude");
            return None;
        }
        if !lon_ok(min_lon) || !lon_ok(max_lon) {
            self.issue(name, "longitudes must be within -180..180");
            return None;
        }

        Some(BoundingBox {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// Fails with every recorded issue, if any.
    pub fn finish(self) -> crate::error::Result<()> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::InvalidConfiguration(self.issues))
        }
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
