//! Discrete risk classes and their legend.

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use riskmap_core::{Error, Result};

use crate::scheme::Rgb;

/// One legend bucket: values in `[min, max)` share a color and a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendClass {
    pub min: f64,
    pub max: f64,
    pub color: Rgb,
    pub label: String,
}

impl LegendClass {
    pub fn new(min: f64, max: f64, color: Rgb, label: impl Into<String>) -> Self {
        Self {
            min,
            max,
            color,
            label: label.into(),
        }
    }

    /// Label followed by the value range, e.g. `Low Risk (0.00 – 0.25)`
    pub fn caption(&self) -> String {
        format!("{} ({:.2} – {:.2})", self.label, self.min, self.max)
    }
}

/// Ordered, non-overlapping legend buckets with a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Legend {
    pub title: String,
    pub classes: Vec<LegendClass>,
}

impl Default for Legend {
    /// Four equal-width classes over [0, 1]
    fn default() -> Self {
        Self {
            title: "Malaria Risk Index".to_string(),
            classes: vec![
                LegendClass::new(0.00, 0.25, Rgb::new(0x2c, 0x7b, 0xb6), "Low Risk"),
                LegendClass::new(0.25, 0.50, Rgb::new(0xab, 0xd9, 0xe9), "Moderate Risk"),
                LegendClass::new(0.50, 0.75, Rgb::new(0xfd, 0xae, 0x61), "High Risk"),
                LegendClass::new(0.75, 1.00, Rgb::new(0xd7, 0x19, 0x1c), "Very High Risk"),
            ],
        }
    }
}

impl Legend {
    /// Reject empty legends, empty or non-finite classes, and classes that
    /// are unsorted or overlap.
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(Error::InvalidLegend("legend has no classes".into()));
        }

        for class in &self.classes {
            if !class.min.is_finite() || !class.max.is_finite() || class.min >= class.max {
                return Err(Error::InvalidLegend(format!(
                    "class '{}' has an empty range [{}, {})",
                    class.label, class.min, class.max
                )));
            }
        }

        for pair in self.classes.windows(2) {
            if pair[1].min < pair[0].max {
                return Err(Error::InvalidLegend(format!(
                    "class '{}' starts at {} before '{}' ends at {}",
                    pair[1].label, pair[1].min, pair[0].label, pair[0].max
                )));
            }
        }

        Ok(())
    }

    /// Index of the class containing `value`.
    ///
    /// Classes are half-open except the last, which includes its max so
    /// that an index of exactly 1.0 is classified. NaN and values outside
    /// every class give `None`.
    pub fn classify(&self, value: f64) -> Option<usize> {
        if let Some(i) = self
            .classes
            .iter()
            .position(|c| value >= c.min && value < c.max)
        {
            return Some(i);
        }
        match self.classes.last() {
            Some(last) if value == last.max => Some(self.classes.len() - 1),
            _ => None,
        }
    }

    /// Plain-text rendering: the title, then one line per class
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        for class in &self.classes {
            let _ = writeln!(out, "  {}  {}", class.color, class.caption());
        }
        out
    }
}
