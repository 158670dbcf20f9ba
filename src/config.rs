//! Figure configuration.
//!
//! Figures can be configured from YAML. Every field is optional and falls
//! back to the defaults below. Facets accept the loose shapes people write
//! by hand (a bare column name, or a column with a value list) and are turned
//! into [`FacetSelector`]s exactly once.
//!
//! ```yaml
//! width: 1000
//! xlim: [0, 1]
//! facets:
//!   panel: nx
//!   line: { column: solver_type, values: [classic, sharpclaw] }
//!   slider: [time]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::facet::{FacetSelector, FacetSpec};
use crate::table::Value;

/// One facet as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorConfig {
    /// Every value of the column.
    Column(String),
    /// Only the listed values, in the listed order.
    Restricted {
        /// Column name.
        column: String,
        /// Values to keep.
        values: Vec<Value>,
    },
}

impl SelectorConfig {
    /// Convert into the tagged selector.
    #[must_use]
    pub fn to_selector(&self) -> FacetSelector {
        match self {
            SelectorConfig::Column(column) => FacetSelector::AllValues(column.clone()),
            SelectorConfig::Restricted { column, values } => {
                FacetSelector::RestrictedValues(column.clone(), values.clone())
            }
        }
    }
}

/// Slider facets: a single entry or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SliderConfig {
    /// A single slider.
    One(SelectorConfig),
    /// Several independent sliders.
    Many(Vec<SelectorConfig>),
}

/// Facet roles as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetConfig {
    /// Panel facet.
    #[serde(default)]
    pub panel: Option<SelectorConfig>,
    /// Line facet.
    #[serde(default)]
    pub line: Option<SelectorConfig>,
    /// Slider facets.
    #[serde(default)]
    pub slider: Option<SliderConfig>,
}

impl FacetConfig {
    /// Build the facet spec.
    #[must_use]
    pub fn to_spec(&self) -> FacetSpec {
        let selector = |entry: &Option<SelectorConfig>| {
            entry.as_ref().map_or(FacetSelector::Absent, SelectorConfig::to_selector)
        };
        let sliders: Vec<&SelectorConfig> = match &self.slider {
            None => Vec::new(),
            Some(SliderConfig::One(entry)) => vec![entry],
            Some(SliderConfig::Many(entries)) => entries.iter().collect(),
        };

        sliders
            .into_iter()
            .fold(FacetSpec::new().panel(selector(&self.panel)).line(selector(&self.line)), |spec, entry| {
                spec.slider(entry.to_selector())
            })
    }
}

/// Figure settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    /// Canvas width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Canvas height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// X-axis limits applied to every panel.
    #[serde(default = "default_xlim")]
    pub xlim: (f64, f64),

    /// Y-axis limits applied to every panel.
    #[serde(default = "default_ylim")]
    pub ylim: (f64, f64),

    /// Column left out of ambiguity reports. Unset keeps the table's own
    /// payload column (`data` unless the table names another).
    #[serde(default)]
    pub payload_column: Option<String>,

    /// Draw point markers on lines.
    #[serde(default = "default_markers")]
    pub markers: bool,

    /// Line stroke width in pixels.
    #[serde(default = "default_line_width")]
    pub line_width: f32,

    /// Facet roles.
    #[serde(default)]
    pub facets: FacetConfig,
}

fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_xlim() -> (f64, f64) {
    (0.0, 1.0)
}
fn default_ylim() -> (f64, f64) {
    (-0.1, 1.1)
}
fn default_markers() -> bool {
    true
}
fn default_line_width() -> f32 {
    2.0
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            xlim: default_xlim(),
            ylim: default_ylim(),
            payload_column: None,
            markers: default_markers(),
            line_width: default_line_width(),
            facets: FacetConfig::default(),
        }
    }
}

impl FigureConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }
}
