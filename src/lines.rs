//! Line registry: one line per line-domain value on every panel.
//!
//! Lines are created empty at setup, whether or not the table holds data for
//! their cell. Their buffers are overwritten on every redraw and never
//! recreated.

use indexmap::IndexMap;

use crate::backend::{LegendEntry, LineId, LineStyle, PanelId, RenderBackend};
use crate::color::Palette;
use crate::error::Result;
use crate::facet::{Domain, FacetKey};
use crate::layout::GridCell;

/// Current (x, y) data of a line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineBuffer {
    /// X values.
    pub xs: Vec<f64>,
    /// Y values.
    pub ys: Vec<f64>,
}

impl LineBuffer {
    /// Whether the buffer holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty() && self.ys.is_empty()
    }
}

/// A curve bound to one (panel value, line value) pair.
#[derive(Debug, Clone)]
pub struct Line {
    id: LineId,
    key: FacetKey,
    buffer: LineBuffer,
}

impl Line {
    /// Backend handle.
    #[must_use]
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Line-domain value this line is bound to.
    #[must_use]
    pub fn key(&self) -> &FacetKey {
        &self.key
    }

    /// Current data.
    #[must_use]
    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// Overwrite the buffer and push it to the backend.
    pub fn set_data<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, xs: Vec<f64>, ys: Vec<f64>) -> Result<()> {
        backend.set_line_data(self.id, &xs, &ys)?;
        self.buffer = LineBuffer { xs, ys };
        Ok(())
    }

    /// Replace the buffer with two empty sequences.
    pub fn clear<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> Result<()> {
        self.set_data(backend, Vec::new(), Vec::new())
    }
}

/// Lines of one panel keyed by line-domain value, in domain order.
pub type LineMap = IndexMap<FacetKey, Line>;

/// One rendering surface bound to a panel-domain value.
#[derive(Debug, Clone)]
pub struct Panel {
    id: PanelId,
    cell: GridCell,
    lines: LineMap,
}

impl Panel {
    pub(crate) fn new(id: PanelId, cell: GridCell, lines: LineMap) -> Self {
        Self { id, cell, lines }
    }

    /// Backend handle.
    #[must_use]
    pub fn id(&self) -> PanelId {
        self.id
    }

    /// Grid position.
    #[must_use]
    pub fn cell(&self) -> GridCell {
        self.cell
    }

    /// Lines in line-domain order.
    #[must_use]
    pub fn lines(&self) -> &LineMap {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut LineMap {
        &mut self.lines
    }
}

/// Stroke settings shared by all lines; color is assigned per line value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineTemplate {
    /// Stroke width in pixels.
    pub width: f32,
    /// Draw point markers.
    pub markers: bool,
}

impl Default for LineTemplate {
    fn default() -> Self {
        Self { width: 2.0, markers: true }
    }
}

/// Create one empty line per line-domain value on `panel`.
pub fn register_lines<B: RenderBackend + ?Sized>(
    backend: &mut B,
    panel: PanelId,
    line_domain: &Domain,
    template: LineTemplate,
) -> Result<LineMap> {
    let mut lines = LineMap::with_capacity(line_domain.len());
    for (index, key) in line_domain.values().iter().enumerate() {
        let style = LineStyle { color: Palette::line_color(index), width: template.width, markers: template.markers };
        let id = backend.create_line(panel, &style)?;
        lines.insert(key.clone(), Line { id, key: key.clone(), buffer: LineBuffer::default() });
    }
    Ok(lines)
}

/// Attach the single figure legend built from one panel's lines.
///
/// Returns `false` without touching the backend when the line facet is absent.
pub fn attach_legend<B: RenderBackend + ?Sized>(backend: &mut B, line_domain: &Domain, lines: &LineMap) -> Result<bool> {
    let Some(title) = line_domain.column() else {
        return Ok(false);
    };
    let entries: Vec<LegendEntry> = lines
        .values()
        .filter_map(|line| {
            line.key().as_ref().map(|value| LegendEntry { label: value.to_string(), line: line.id() })
        })
        .collect();
    backend.create_legend(title, &entries)?;
    Ok(true)
}
