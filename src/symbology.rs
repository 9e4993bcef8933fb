//! Static symbology lookup tables.
//!
//! Both tables are total: unknown keys resolve to an explicit default row
//! rather than being special-cased by callers.

/// Icon shown when no table row matches.
pub const FALLBACK_ICON: &str = "quake/unknown.png";

/// Severity tag attached to PAGER-assessed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    None,
    Green,
    Yellow,
    Orange,
    Red,
}

impl AlertLevel {
    /// Parses an upstream alert string. Anything unrecognized is `None`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("green") => AlertLevel::Green,
            Some("yellow") => AlertLevel::Yellow,
            Some("orange") => AlertLevel::Orange,
            Some("red") => AlertLevel::Red,
            _ => AlertLevel::None,
        }
    }

    pub fn info(self) -> &'static AlertInfo {
        ALERT_TABLE
            .iter()
            .find(|row| row.level == self)
            .unwrap_or(&ALERT_TABLE[0])
    }
}

/// One row of the alert-level table.
#[derive(Debug, PartialEq, Eq)]
pub struct AlertInfo {
    pub level: AlertLevel,
    pub label: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub fatalities: &'static str,
    pub losses: &'static str,
}

/// PAGER alert levels with estimated impact ranges.
///
/// | Level  | Fatalities     | Economic losses             |
/// |--------|----------------|-----------------------------|
/// | none   | not estimated  | not estimated               |
/// | green  | 0              | < $1 million                |
/// | yellow | 1 - 99         | $1 million - $100 million   |
/// | orange | 100 - 999      | $100 million - $1 billion   |
/// | red    | 1,000+         | $1 billion+                 |
pub static ALERT_TABLE: &[AlertInfo] = &[
    AlertInfo {
        level: AlertLevel::None,
        label: "None",
        color: "#9E9E9E",
        icon: "quake/alert-none.png",
        fatalities: "Not estimated",
        losses: "Not estimated",
    },
    AlertInfo {
        level: AlertLevel::Green,
        label: "Green",
        color: "#2E7D32",
        icon: "quake/alert-green.png",
        fatalities: "0",
        losses: "< $1 million",
    },
    AlertInfo {
        level: AlertLevel::Yellow,
        label: "Yellow",
        color: "#FBC02D",
        icon: "quake/alert-yellow.png",
        fatalities: "1 - 99",
        losses: "$1 million - $100 million",
    },
    AlertInfo {
        level: AlertLevel::Orange,
        label: "Orange",
        color: "#EF6C00",
        icon: "quake/alert-orange.png",
        fatalities: "100 - 999",
        losses: "$100 million - $1 billion",
    },
    AlertInfo {
        level: AlertLevel::Red,
        label: "Red",
        color: "#C62828",
        icon: "quake/alert-red.png",
        fatalities: "1,000+",
        losses: "$1 billion+",
    },
];

/// Looks up the alert row for a raw upstream value.
pub fn alert_info(raw: Option<&str>) -> &'static AlertInfo {
    AlertLevel::parse(raw).info()
}

/// One row of the intensity table.
#[derive(Debug, PartialEq, Eq)]
pub struct IntensityInfo {
    pub mmi: i32,
    pub descriptor: &'static str,
    pub icon: &'static str,
}

/// Shaking intensity descriptors as used by GeoNet, MMI -1 through 8.
pub static INTENSITY_TABLE: &[IntensityInfo] = &[
    IntensityInfo {
        mmi: -1,
        descriptor: "Not calculated",
        icon: "quake/mmi-unknown.png",
    },
    IntensityInfo {
        mmi: 0,
        descriptor: "Unnoticeable",
        icon: "quake/mmi-0.png",
    },
    IntensityInfo {
        mmi: 1,
        descriptor: "Unnoticeable",
        icon: "quake/mmi-1.png",
    },
    IntensityInfo {
        mmi: 2,
        descriptor: "Unnoticeable",
        icon: "quake/mmi-2.png",
    },
    IntensityInfo {
        mmi: 3,
        descriptor: "Weak",
        icon: "quake/mmi-3.png",
    },
    IntensityInfo {
        mmi: 4,
        descriptor: "Light",
        icon: "quake/mmi-4.png",
    },
    IntensityInfo {
        mmi: 5,
        descriptor: "Moderate",
        icon: "quake/mmi-5.png",
    },
    IntensityInfo {
        mmi: 6,
        descriptor: "Strong",
        icon: "quake/mmi-6.png",
    },
    IntensityInfo {
        mmi: 7,
        descriptor: "Severe",
        icon: "quake/mmi-7.png",
    },
    IntensityInfo {
        mmi: 8,
        descriptor: "Extreme",
        icon: "quake/mmi-8.png",
    },
];

static UNKNOWN_INTENSITY: IntensityInfo = IntensityInfo {
    mmi: -1,
    descriptor: "Unknown",
    icon: FALLBACK_ICON,
};

/// Looks up the intensity row, falling back for absent or out-of-range values.
pub fn intensity_info(mmi: Option<i32>) -> &'static IntensityInfo {
    mmi.and_then(|m| INTENSITY_TABLE.iter().find(|row| row.mmi == m))
        .unwrap_or(&UNKNOWN_INTENSITY)
}
