//! Variable catalogue.
//!
//! Loads per-quantity plotting configuration (dataset variables, titles,
//! units and color scales) from `variables.yaml`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ofs_common::{PlotError, PlotResult};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::scale::{ColorScale, YamlScale};

const BUILTIN_VARIABLES: &str = include_str!("../../../config/variables.yaml");

/// How the dataset fields of a variable combine into a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// Magnitude in `var1`, direction in degrees in `var2`.
    Direction,
    /// Eastward component in `var1`, northward component in `var2`.
    Vector,
    /// Scalar field in `var1`.
    Magnitude,
    /// Categorical public warning derived from `var1`.
    Warning,
}

impl VariableKind {
    /// Whether the plot carries direction arrows.
    pub fn has_arrows(&self) -> bool {
        matches!(self, VariableKind::Direction | VariableKind::Vector)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableKind::Direction => "direction",
            VariableKind::Vector => "vector",
            VariableKind::Magnitude => "magnitude",
            VariableKind::Warning => "warning",
        }
    }
}

/// Plotting configuration for one physical quantity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariableDef {
    pub code: String,
    /// File stem of the output image
    pub savename: String,
    pub kind: VariableKind,
    pub var1: String,
    #[serde(default)]
    pub var2: Option<String>,
    /// Field the colors come from when it differs from `var1` (vector kinds)
    #[serde(default)]
    pub mag: Option<String>,
    /// Unit conversion applied to every field read for this variable
    #[serde(default = "default_factor")]
    pub factor: f64,
    pub figtitle: String,
    #[serde(default)]
    pub cbrtitle: String,
    /// Arrow legend label, may contain line breaks
    #[serde(default)]
    pub dirtitle: Option<String>,
    pub unit: String,
    pub scale: String,
}

fn default_factor() -> f64 {
    1.0
}

impl VariableDef {
    /// Color bar title, e.g. `Significant Wave Height (m)`.
    pub fn colorbar_label(&self) -> String {
        format!("{} ({})", self.cbrtitle, self.unit)
    }

    /// Dataset variable the colored field is read from.
    pub fn magnitude_var(&self) -> &str {
        self.mag.as_deref().unwrap_or(&self.var1)
    }
}

#[derive(Debug, Deserialize)]
struct YamlVariableFile {
    #[serde(default)]
    scales: HashMap<String, YamlScale>,
    #[serde(default)]
    variables: Vec<VariableDef>,
}

/// Registry of variables and the color scales they reference.
#[derive(Debug, Clone, Default)]
pub struct VariableCatalog {
    variables: Vec<VariableDef>,
    scales: HashMap<String, ColorScale>,
}

impl VariableCatalog {
    /// Catalogue compiled into the binary.
    pub fn builtin() -> PlotResult<Self> {
        Self::from_yaml_str(BUILTIN_VARIABLES)
    }

    /// Load `variables.yaml` from a config directory, falling back to the
    /// built-in catalogue when the file does not exist.
    pub fn load_from_directory<P: AsRef<Path>>(config_dir: P) -> PlotResult<Self> {
        let path = config_dir.as_ref().join("variables.yaml");
        if !path.exists() {
            warn!(path = ?path, "Variable catalogue not found, using built-in");
            return Self::builtin();
        }
        let contents = fs::read_to_string(&path)?;
        let catalog = Self::from_yaml_str(&contents)?;
        debug!(path = ?path, count = catalog.variables.len(), "Loaded variable catalogue");
        Ok(catalog)
    }

    /// Parse and validate a catalogue.
    pub fn from_yaml_str(contents: &str) -> PlotResult<Self> {
        let yaml: YamlVariableFile = serde_yaml::from_str(contents)?;

        let mut scales = HashMap::with_capacity(yaml.scales.len());
        for (key, scale) in yaml.scales {
            let scale = ColorScale::from_yaml(&key, scale)?;
            scales.insert(key, scale);
        }

        let mut seen = std::collections::HashSet::new();
        for var in &yaml.variables {
            if !seen.insert(var.code.as_str()) {
                return Err(PlotError::Config(format!(
                    "variable '{}' is defined twice",
                    var.code
                )));
            }
            if !scales.contains_key(&var.scale) {
                return Err(PlotError::Config(format!(
                    "variable '{}' references unknown scale '{}'",
                    var.code, var.scale
                )));
            }
            if var.kind.has_arrows() && var.var2.is_none() {
                return Err(PlotError::Config(format!(
                    "variable '{}' of kind {} needs var2",
                    var.code,
                    var.kind.as_str()
                )));
            }
        }

        Ok(Self {
            variables: yaml.variables,
            scales,
        })
    }

    /// Look up a variable by code.
    pub fn get(&self, code: &str) -> PlotResult<&VariableDef> {
        self.variables
            .iter()
            .find(|v| v.code == code)
            .ok_or_else(|| PlotError::VariableNotFound(code.to_string()))
    }

    /// Look up a color scale by key.
    pub fn scale(&self, key: &str) -> PlotResult<&ColorScale> {
        self.scales
            .get(key)
            .ok_or_else(|| PlotError::ScaleNotFound(key.to_string()))
    }

    /// Variable codes in catalogue order.
    pub fn codes(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.code.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
