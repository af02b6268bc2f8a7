//! Color scales: level boundaries, interval colors and out-of-range handling.

use ofs_common::{PlotError, PlotResult};
use serde::Deserialize;

/// Default color for values beyond an extended end of the scale (indigo).
pub const DEFAULT_OVER_COLOR: &str = "#4B0082";

/// A labelled class on a categorical scale, placed at `value` along the bar.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub label: String,
    pub value: f64,
}

/// Color scale with ascending `levels` and one color per interval.
///
/// The palette may be longer or shorter than the number of intervals; the
/// renderer decides how palette entries map onto intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    pub levels: Vec<f64>,
    pub colors: Vec<(u8, u8, u8)>,
    pub over: (u8, u8, u8),
    pub under: (u8, u8, u8),
    pub categories: Vec<Category>,
}

/// YAML structure of a scale entry.
#[derive(Debug, Deserialize)]
pub(crate) struct YamlScale {
    levels: Vec<f64>,
    colors: Vec<String>,
    #[serde(default)]
    over: Option<String>,
    #[serde(default)]
    under: Option<String>,
    #[serde(default)]
    categories: Vec<Category>,
}

impl ColorScale {
    /// Build and validate a scale from its YAML form.
    pub(crate) fn from_yaml(key: &str, yaml: YamlScale) -> PlotResult<Self> {
        if yaml.levels.len() < 2 {
            return Err(PlotError::Config(format!(
                "scale '{}' needs at least 2 levels, got {}",
                key,
                yaml.levels.len()
            )));
        }
        if yaml.levels.iter().any(|l| !l.is_finite()) {
            return Err(PlotError::Config(format!(
                "scale '{}' has a non-finite level",
                key
            )));
        }
        if yaml.levels.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PlotError::Config(format!(
                "scale '{}' levels must be strictly ascending",
                key
            )));
        }
        if yaml.colors.is_empty() {
            return Err(PlotError::Config(format!("scale '{}' has no colors", key)));
        }

        let parse = |hex: &str| {
            hex_to_rgb(hex).ok_or_else(|| {
                PlotError::Config(format!("scale '{}' has invalid color '{}'", key, hex))
            })
        };

        let colors = yaml
            .colors
            .iter()
            .map(|c| parse(c))
            .collect::<PlotResult<Vec<_>>>()?;
        let over = parse(yaml.over.as_deref().unwrap_or(DEFAULT_OVER_COLOR))?;
        let under = parse(yaml.under.as_deref().unwrap_or(DEFAULT_OVER_COLOR))?;

        Ok(Self {
            levels: yaml.levels,
            colors,
            over,
            under,
            categories: yaml.categories,
        })
    }

    /// Number of intervals between consecutive levels.
    pub fn interval_count(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn min(&self) -> f64 {
        self.levels[0]
    }

    pub fn max(&self) -> f64 {
        self.levels[self.levels.len() - 1]
    }

    /// Index of the interval containing `value`, `None` outside the levels.
    ///
    /// Intervals are half-open `[levels[k], levels[k+1])`, except that the
    /// top level itself belongs to the last interval.
    pub fn interval_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.min() || value > self.max() {
            return None;
        }
        let k = self.levels.partition_point(|&l| l <= value);
        Some(k.saturating_sub(1).min(self.interval_count() - 1))
    }

    pub fn is_categorical(&self) -> bool {
        !self.categories.is_empty()
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}
