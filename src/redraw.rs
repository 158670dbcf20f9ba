//! Redraw controller.
//!
//! A pass visits every panel x line cell in layout order, matches the cell
//! against the table, writes the extracted data (or clears the line), then
//! sets the caption and flushes the canvas exactly once.
//!
//! An ambiguous cell aborts the pass. Lines already written earlier in the
//! same pass keep their new data and no flush is issued.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::backend::RenderBackend;
use crate::error::{Error, Result};
use crate::facet::{Domains, FacetKey};
use crate::lines::{Line, Panel};
use crate::matcher::{match_cell, CellQuery, MatchResult};
use crate::table::{Record, ResultTable};

/// The (x, y) sequences extracted from one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotData {
    /// X values.
    pub xs: Vec<f64>,
    /// Y values.
    pub ys: Vec<f64>,
}

impl PlotData {
    /// Create plot data from two sequences.
    #[must_use]
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self { xs, ys }
    }

    fn check_lengths(&self) -> Result<()> {
        if self.xs.len() == self.ys.len() {
            Ok(())
        } else {
            Err(Error::DataLengthMismatch { x_len: self.xs.len(), y_len: self.ys.len() })
        }
    }
}

impl From<(Vec<f64>, Vec<f64>)> for PlotData {
    fn from((xs, ys): (Vec<f64>, Vec<f64>)) -> Self {
        Self { xs, ys }
    }
}

/// Caller-supplied mapping from a record to the data to plot.
pub type Extractor<'e, P> = Box<dyn Fn(&Record<P>) -> PlotData + 'e>;

/// What happened to one cell during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOutcome {
    /// The line now shows the matched record.
    Drawn,
    /// No record matched; the line was emptied.
    Cleared,
}

/// Counts from one completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Cells drawn from a record.
    pub drawn: usize,
    /// Cells cleared for lack of data.
    pub cleared: usize,
}

/// Write one cell's match result into its line.
pub fn redraw_line<P, B>(
    backend: &mut B,
    line: &mut Line,
    matched: Option<&Record<P>>,
    extract: &dyn Fn(&Record<P>) -> PlotData,
) -> Result<CellOutcome>
where
    B: RenderBackend + ?Sized,
{
    match matched {
        Some(record) => {
            let data = extract(record);
            data.check_lengths()?;
            line.set_data(backend, data.xs, data.ys)?;
            Ok(CellOutcome::Drawn)
        }
        None => {
            line.clear(backend)?;
            Ok(CellOutcome::Cleared)
        }
    }
}

/// Figure caption for the current slider selection.
///
/// Formatted as `"<column>: <value>"` per slider, joined with `", "`.
#[must_use]
pub fn caption(domains: &Domains, selection: &[FacetKey]) -> String {
    domains
        .sliders
        .iter()
        .zip(selection)
        .filter_map(|(domain, key)| match (domain.column(), key) {
            (Some(column), Some(value)) => Some(format!("{column}: {value}")),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run one full redraw pass over every panel and line.
///
/// `selection` holds the selected key of each slider domain. `payload_column`
/// overrides the table's payload column in ambiguity reports.
pub fn redraw_pass<P, B>(
    backend: &mut B,
    table: &ResultTable<P>,
    domains: &Domains,
    panels: &mut IndexMap<FacetKey, Panel>,
    selection: &[FacetKey],
    payload_column: Option<&str>,
    extract: &dyn Fn(&Record<P>) -> PlotData,
) -> Result<PassSummary>
where
    B: RenderBackend + ?Sized,
{
    let mut summary = PassSummary::default();

    for (panel_key, panel) in panels.iter_mut() {
        for (line_key, line) in panel.lines_mut().iter_mut() {
            let query = CellQuery::for_cell(domains, panel_key, line_key, selection).payload_column(payload_column);
            let matched = match match_cell(table, &query) {
                MatchResult::Found(record) => Some(record),
                MatchResult::NotFound => None,
                MatchResult::Ambiguous(columns) => {
                    warn!(?columns, "ambiguous cell, aborting redraw pass");
                    return Err(Error::Ambiguity { columns });
                }
            };
            match redraw_line(backend, line, matched, extract)? {
                CellOutcome::Drawn => summary.drawn += 1,
                CellOutcome::Cleared => summary.cleared += 1,
            }
        }
    }

    if !domains.sliders.is_empty() {
        backend.set_caption(&caption(domains, selection))?;
    }
    backend.draw()?;

    debug!(drawn = summary.drawn, cleared = summary.cleared, "redraw pass complete");
    Ok(summary)
}
