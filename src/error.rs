//! Error types for facetplot operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or redrawing a faceted figure.
///
/// Setup-time validation errors (`UnknownColumn`, `MissingFacetValue`,
/// `EmptyDomain`) are raised before any panel exists. Pass-time errors
/// (`Ambiguity`, `DataLengthMismatch`) abort the redraw pass in progress.
#[derive(Error, Debug)]
pub enum Error {
    /// A facet names a column that the table does not carry.
    #[error("No column {column} in table")]
    UnknownColumn {
        /// Requested column.
        column: String,
    },

    /// A restricted facet value never occurs in its column.
    #[error("No value {value} in column {column}")]
    MissingFacetValue {
        /// The missing value, formatted.
        value: String,
        /// Column the value was looked up in.
        column: String,
    },

    /// A column facet resolved to no values at all.
    #[error("Column {column} has no values to facet over")]
    EmptyDomain {
        /// Column that produced the empty domain.
        column: String,
    },

    /// More than one record matched a single panel/line/slider cell.
    #[error(
        "Multiple entries would be plotted with the same parameters. \
         You must differentiate by the following: {}",
        columns.join(", ")
    )]
    Ambiguity {
        /// Non-payload columns on which the first two matches differ.
        columns: Vec<String>,
    },

    /// Data length mismatch between extracted x and y sequences.
    #[error("Data length mismatch: x has {x_len} elements, y has {y_len} elements")]
    DataLengthMismatch {
        /// Length of x data.
        x_len: usize,
        /// Length of y data.
        y_len: usize,
    },

    /// A slider was asked to select an index outside its domain.
    #[error("Slider '{slider}' index {index} out of range (domain has {len} values)")]
    SliderOutOfRange {
        /// Slider label.
        slider: String,
        /// Requested index.
        index: usize,
        /// Domain length.
        len: usize,
    },

    /// An interactive state carried the wrong number of selections.
    #[error("Interactive state has {actual} selections, figure has {expected} sliders")]
    StateMismatch {
        /// Number of sliders on the figure.
        expected: usize,
        /// Number of selections supplied.
        actual: usize,
    },

    /// Invalid dimensions for a framebuffer or figure.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Invalid scale domain (e.g. equal axis limits).
    #[error("Invalid scale domain: {0}")]
    ScaleDomain(String),

    /// A backend handle did not refer to anything the backend created.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),
}

impl Error {
    /// Whether this error is raised during setup, before any panel is created.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::UnknownColumn { .. } | Error::MissingFacetValue { .. } | Error::EmptyDomain { .. }
        )
    }
}
