//! # facetplot
//!
//! Faceted, slider-driven line plots over a table of computed results.
//!
//! Each record in a [`ResultTable`](table::ResultTable) is one parameter
//! combination with an opaque payload. Choosing columns as facets splits
//! the table across a grid of panels, the lines on each panel, and any
//! number of sliders. Moving a slider redraws every panel/line cell from the
//! single record that matches it, without recreating the layout.
//!
//! ## Quick Start
//!
//! ```rust
//! use facetplot::prelude::*;
//!
//! let mut table = ResultTable::new();
//! for nx in [10, 20] {
//!     for time in [0.0, 0.5, 1.0] {
//!         let xs: Vec<f64> = (0..nx).map(|i| f64::from(i) / f64::from(nx)).collect();
//!         table.push(Record::new(xs).with("nx", nx).with("time", time));
//!     }
//! }
//!
//! let mut figure = FacetPlot::new(&table, |r: &Record<Vec<f64>>| {
//!     PlotData::new(r.payload().clone(), r.payload().iter().map(|x| x * x).collect())
//! })
//! .panel(FacetSelector::all("nx"))
//! .slider(FacetSelector::all("time"))
//! .build(RecordingBackend::new())?;
//!
//! assert_eq!(figure.panels().len(), 2);
//! figure.set_slider(0, 2)?;
//! assert_eq!(figure.backend().caption(), Some("time: 1.0"));
//! # Ok::<(), facetplot::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! - [`facet::resolve`] turns a [`FacetSpec`](facet::FacetSpec) into ordered domains.
//! - [`layout::GridLayout`] packs one panel per panel value into a square-ish grid.
//! - [`lines::register_lines`] creates one empty line per line value on every panel.
//! - [`matcher::match_cell`] finds zero, one, or too many records for a cell.
//! - [`redraw::redraw_pass`] writes every cell and flushes the canvas once.
//! - [`figure::FacetFigure`] ties it together and reacts to slider changes.

#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Faceting Engine
// ============================================================================

/// Result tables and scalar values.
pub mod table;

/// Facet specifications and domain resolution.
pub mod facet;

/// Panel grid layout.
pub mod layout;

/// Per-panel line registry and legend.
pub mod lines;

/// Cell-to-record matching.
pub mod matcher;

/// Redraw passes.
pub mod redraw;

/// Figure builder and interaction driver.
pub mod figure;

// ============================================================================
// Rendering
// ============================================================================

/// Rendering backend trait and the in-memory recorder.
pub mod backend;

/// Colors and the line palette.
pub mod color;

/// RGBA pixel buffer.
pub mod framebuffer;

/// Data-to-pixel scales.
pub mod scale;

/// Raster backend.
pub mod raster;

/// Output encoders (PNG).
pub mod output;

// ============================================================================
// Configuration & Errors
// ============================================================================

/// YAML figure configuration.
pub mod config;

/// Error types for facetplot operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use facetplot::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{RecordingBackend, RenderBackend};
    pub use crate::color::{Palette, Rgba};
    pub use crate::config::FigureConfig;
    pub use crate::error::{Error, Result};
    pub use crate::facet::{FacetKey, FacetSelector, FacetSpec};
    pub use crate::figure::{FacetFigure, FacetPlot, InteractiveState, Mode};
    pub use crate::lines::LineTemplate;
    pub use crate::matcher::MatchResult;
    pub use crate::raster::RasterBackend;
    pub use crate::redraw::PlotData;
    pub use crate::table::{Record, ResultTable, Value};
}
