//! Panel grid layout.
//!
//! Panels are packed row-major into a roughly square grid with no gaps:
//! `cols = ceil(sqrt(n))`, `rows = ceil(n / cols)`.

use crate::facet::{Domain, FacetKey};

/// Position of one panel in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    /// Zero-based row, top to bottom.
    pub row: usize,
    /// Zero-based column, left to right.
    pub col: usize,
}

impl GridCell {
    /// Only first-column panels keep value-axis tick labels.
    #[must_use]
    pub fn shows_value_ticks(&self) -> bool {
        self.col == 0
    }
}

/// Rows and columns of a panel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    rows: usize,
    cols: usize,
}

impl GridLayout {
    /// The roughly-square grid for `n` panels.
    #[must_use]
    pub fn for_count(n: usize) -> Self {
        if n == 0 {
            return Self { rows: 0, cols: 0 };
        }
        let cols = ceil_sqrt(n);
        let rows = n.div_ceil(cols);
        Self { rows, cols }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Grid position of the `index`-th panel (row-major).
    #[must_use]
    pub fn cell(&self, index: usize) -> GridCell {
        if self.cols == 0 {
            return GridCell { row: 0, col: 0 };
        }
        GridCell { row: index / self.cols, col: index % self.cols }
    }

    /// Panel title font size; shrinks as rows are added.
    #[must_use]
    pub fn title_size(&self) -> f32 {
        10.0 + 10.0 / self.rows.max(1) as f32
    }

    /// Lay out every entry of a panel domain, in domain order.
    pub fn place<'d>(&self, domain: &'d Domain) -> impl Iterator<Item = (&'d FacetKey, GridCell)> + 'd {
        let grid = *self;
        domain.values().iter().enumerate().map(move |(i, key)| (key, grid.cell(i)))
    }
}

/// Exact integer `ceil(sqrt(n))`.
fn ceil_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root < n {
        root += 1;
    }
    while root > 1 && (root - 1) * (root - 1) >= n {
        root -= 1;
    }
    root
}

/// Title for a panel: `"<column>: <value>"`, or `None` when the panel facet is absent.
#[must_use]
pub fn panel_title(domain: &Domain, key: &FacetKey) -> Option<String> {
    match (domain.column(), key) {
        (Some(column), Some(value)) => Some(format!("{column}: {value}")),
        _ => None,
    }
}
