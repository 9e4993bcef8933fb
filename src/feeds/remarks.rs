use chrono::{DateTime, Utc};

/// Builds the newline-joined remarks block line by line.
#[derive(Debug, Default)]
pub struct Remarks {
    lines: Vec<String>,
}

impl Remarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, label: &str, value: impl std::fmt::Display) -> Self {
        self.lines.push(format!("{label}: {value}"));
        self
    }

    /// Adds the line only when a value is present.
    pub fn maybe<T: std::fmt::Display>(self, label: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.line(label, v),
            None => self,
        }
    }

    pub fn time(self, label: &str, t: DateTime<Utc>) -> Self {
        self.line(label, t.format("%Y-%m-%d %H:%M:%S UTC"))
    }

    pub fn depth(self, depth_km: Option<f64>) -> Self {
        match depth_km {
            Some(d) => self.line("Depth", format!("{d:.1} km")),
            None => self.line("Depth", "Unknown"),
        }
    }

    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}
