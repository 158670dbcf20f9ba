//! Interaction driver: figure setup and slider-driven redraws.
//!
//! [`FacetPlot`] is the builder. [`FacetPlot::build`] resolves every facet
//! before the backend is touched, lays out the panel grid, registers lines,
//! attaches the legend and slider controls, then runs the first pass.
//!
//! The resulting [`FacetFigure`] is in one of two modes, fixed at setup:
//!
//! - [`Mode::Static`]: no sliders. The first pass is the only one needed.
//! - [`Mode::Interactive`]: one control per slider facet. Every accepted
//!   state change runs exactly one pass. A failed first pass does not fail
//!   the build; it is kept in [`FacetFigure::initial_error`] and the
//!   controls stay usable.
//!
//! # Example
//!
//! ```
//! use facetplot::prelude::*;
//!
//! let table: ResultTable<f64> = [10, 20]
//!     .into_iter()
//!     .flat_map(|nx| [0.0, 0.5].map(move |t| Record::new(t).with("nx", nx).with("time", t)))
//!     .collect();
//!
//! let mut figure = FacetPlot::new(&table, |r: &Record<f64>| PlotData::new(vec![0.0], vec![*r.payload()]))
//!     .panel(FacetSelector::all("nx"))
//!     .slider(FacetSelector::all("time"))
//!     .build(RecordingBackend::new())?;
//!
//! figure.set_slider(0, 1)?;
//! assert_eq!(figure.backend().caption(), Some("time: 0.5"));
//! # Ok::<(), facetplot::Error>(())
//! ```

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::backend::{RenderBackend, SliderId, SliderSpec};
use crate::config::FigureConfig;
use crate::error::{Error, Result};
use crate::facet::{resolve, Domains, FacetKey, FacetSelector, FacetSpec};
use crate::layout::{panel_title, GridLayout};
use crate::lines::{attach_legend, register_lines, LineTemplate, Panel};
use crate::redraw::{redraw_pass, Extractor, PassSummary, PlotData};
use crate::table::{Record, ResultTable};

/// Whether a figure responds to slider changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No slider facets; rendered once at setup.
    Static,
    /// At least one slider facet.
    Interactive,
}

/// Selected index of every slider, in control order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InteractiveState {
    selections: Vec<usize>,
}

impl InteractiveState {
    /// State with the given per-slider indices.
    #[must_use]
    pub fn new(selections: Vec<usize>) -> Self {
        Self { selections }
    }

    /// Index 0 on each of `sliders` controls.
    #[must_use]
    pub fn initial(sliders: usize) -> Self {
        Self { selections: vec![0; sliders] }
    }

    /// Per-slider indices.
    #[must_use]
    pub fn selections(&self) -> &[usize] {
        &self.selections
    }

    /// Replace one slider's index.
    #[must_use]
    pub fn with(mut self, slider: usize, index: usize) -> Self {
        if let Some(slot) = self.selections.get_mut(slider) {
            *slot = index;
        }
        self
    }
}

/// An integer slider over the indices of one slider domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderControl {
    id: SliderId,
    label: String,
    len: usize,
    index: usize,
}

impl SliderControl {
    /// Backend handle.
    #[must_use]
    pub fn id(&self) -> SliderId {
        self.id
    }

    /// Facet column shown next to the control.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of stops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: slider domains are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Currently selected index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::SliderOutOfRange { slider: self.label.clone(), index, len: self.len })
        }
    }

    /// Move the control to `index`, rejecting anything past the last stop.
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.index = index;
        Ok(())
    }
}

/// Builder for a [`FacetFigure`].
pub struct FacetPlot<'t, P> {
    table: &'t ResultTable<P>,
    extract: Extractor<'t, P>,
    spec: FacetSpec,
    xlim: (f64, f64),
    ylim: (f64, f64),
    template: LineTemplate,
    payload_column: Option<String>,
}

impl<'t, P> FacetPlot<'t, P> {
    /// Start a figure over `table`, plotting what `extract` returns for each matched record.
    #[must_use]
    pub fn new<F>(table: &'t ResultTable<P>, extract: F) -> Self
    where
        F: Fn(&Record<P>) -> PlotData + 't,
    {
        let defaults = FigureConfig::default();
        Self {
            table,
            extract: Box::new(extract),
            spec: FacetSpec::new(),
            xlim: defaults.xlim,
            ylim: defaults.ylim,
            template: LineTemplate::default(),
            payload_column: None,
        }
    }

    /// Replace the whole facet spec.
    #[must_use]
    pub fn facets(mut self, spec: FacetSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Set the panel facet.
    #[must_use]
    pub fn panel(mut self, selector: FacetSelector) -> Self {
        self.spec = self.spec.panel(selector);
        self
    }

    /// Set the line facet.
    #[must_use]
    pub fn line(mut self, selector: FacetSelector) -> Self {
        self.spec = self.spec.line(selector);
        self
    }

    /// Add a slider facet.
    #[must_use]
    pub fn slider(mut self, selector: FacetSelector) -> Self {
        self.spec = self.spec.slider(selector);
        self
    }

    /// X-axis limits for every panel.
    #[must_use]
    pub fn xlim(mut self, min: f64, max: f64) -> Self {
        self.xlim = (min, max);
        self
    }

    /// Y-axis limits for every panel.
    #[must_use]
    pub fn ylim(mut self, min: f64, max: f64) -> Self {
        self.ylim = (min, max);
        self
    }

    /// Stroke settings for every line.
    #[must_use]
    pub fn line_template(mut self, template: LineTemplate) -> Self {
        self.template = template;
        self
    }

    /// Column to leave out of ambiguity reports, in place of the table's payload column.
    #[must_use]
    pub fn payload_column(mut self, column: impl Into<String>) -> Self {
        self.payload_column = Some(column.into());
        self
    }

    /// Apply limits, line style, payload column and facets from a loaded config.
    #[must_use]
    pub fn configure(self, config: &FigureConfig) -> Self {
        let plot = self
            .facets(config.facets.to_spec())
            .xlim(config.xlim.0, config.xlim.1)
            .ylim(config.ylim.0, config.ylim.1)
            .line_template(LineTemplate { width: config.line_width, markers: config.markers });
        match &config.payload_column {
            Some(column) => plot.payload_column(column.as_str()),
            None => plot,
        }
    }

    /// Resolve facets, build panels, lines, legend and sliders, and run the first pass.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before the backend receives any call.
    /// In static mode a failed first pass also fails the build; in interactive
    /// mode the figure is returned and the error is kept on it.
    pub fn build<B: RenderBackend>(self, mut backend: B) -> Result<FacetFigure<'t, P, B>> {
        let domains = resolve(self.table, &self.spec)?;

        let layout = GridLayout::for_count(domains.panel.len());
        debug!(rows = layout.rows(), cols = layout.cols(), panels = domains.panel.len(), "laying out panel grid");
        backend.create_grid(layout.rows(), layout.cols())?;

        let mut panels = IndexMap::with_capacity(domains.panel.len());
        for (key, cell) in layout.place(&domains.panel) {
            let id = backend.create_panel(cell, cell.shows_value_ticks())?;
            backend.set_panel_limits(id, self.xlim, self.ylim)?;
            if let Some(title) = panel_title(&domains.panel, key) {
                backend.set_panel_title(id, &title, layout.title_size())?;
            }
            let lines = register_lines(&mut backend, id, &domains.line, self.template)?;
            panels.insert(key.clone(), Panel::new(id, cell, lines));
        }

        if let Some(first) = panels.values().next() {
            attach_legend(&mut backend, &domains.line, first.lines())?;
        }

        let mut sliders = Vec::with_capacity(domains.sliders.len());
        for domain in &domains.sliders {
            let label = domain.column().unwrap_or_default().to_string();
            let spec = SliderSpec { label: label.clone(), max_index: domain.len() - 1, initial: 0, readout: false };
            let id = backend.create_slider(&spec)?;
            sliders.push(SliderControl { id, label, len: domain.len(), index: 0 });
        }

        let mode = if sliders.is_empty() { Mode::Static } else { Mode::Interactive };
        let mut figure = FacetFigure {
            table: self.table,
            extract: self.extract,
            domains,
            layout,
            panels,
            sliders,
            backend,
            mode,
            passes: 0,
            payload_column: self.payload_column,
            initial_error: None,
        };
        if let Err(err) = figure.redraw() {
            if mode == Mode::Static {
                return Err(err);
            }
            warn!(error = %err, "initial pass failed, sliders remain active");
            figure.initial_error = Some(err);
        }
        Ok(figure)
    }
}

/// A built figure bound to its backend.
pub struct FacetFigure<'t, P, B> {
    table: &'t ResultTable<P>,
    extract: Extractor<'t, P>,
    domains: Domains,
    layout: GridLayout,
    panels: IndexMap<FacetKey, Panel>,
    sliders: Vec<SliderControl>,
    backend: B,
    mode: Mode,
    passes: usize,
    payload_column: Option<String>,
    initial_error: Option<Error>,
}

impl<'t, P, B: RenderBackend> FacetFigure<'t, P, B> {
    /// Static or interactive.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current slider indices.
    #[must_use]
    pub fn state(&self) -> InteractiveState {
        InteractiveState::new(self.sliders.iter().map(SliderControl::index).collect())
    }

    /// Selected key of every slider domain.
    #[must_use]
    pub fn selection(&self) -> Vec<FacetKey> {
        self.domains
            .sliders
            .iter()
            .zip(&self.sliders)
            .filter_map(|(domain, control)| domain.get(control.index()).cloned())
            .collect()
    }

    /// Apply a full interactive state and redraw.
    ///
    /// The state is validated as a whole first; a rejected state leaves every
    /// control and line untouched.
    ///
    /// # Errors
    ///
    /// [`Error::StateMismatch`] or [`Error::SliderOutOfRange`] on a bad state,
    /// or any error from the redraw pass.
    pub fn on_state_change(&mut self, state: &InteractiveState) -> Result<&B> {
        if state.selections().len() != self.sliders.len() {
            return Err(Error::StateMismatch { expected: self.sliders.len(), actual: state.selections().len() });
        }
        for (control, &index) in self.sliders.iter().zip(state.selections()) {
            control.check(index)?;
        }
        for (control, &index) in self.sliders.iter_mut().zip(state.selections()) {
            control.select(index)?;
        }
        self.redraw()?;
        Ok(&self.backend)
    }

    /// Move one slider and redraw.
    ///
    /// # Errors
    ///
    /// [`Error::StateMismatch`] when `slider` names no control, otherwise as
    /// [`FacetFigure::on_state_change`].
    pub fn set_slider(&mut self, slider: usize, index: usize) -> Result<&B> {
        if slider >= self.sliders.len() {
            return Err(Error::StateMismatch { expected: self.sliders.len(), actual: slider + 1 });
        }
        let state = self.state().with(slider, index);
        self.on_state_change(&state)
    }

    /// Run one pass for the current state.
    ///
    /// # Errors
    ///
    /// [`Error::Ambiguity`] or [`Error::DataLengthMismatch`] abort the pass
    /// without a canvas flush.
    pub fn redraw(&mut self) -> Result<PassSummary> {
        let selection = self.selection();
        self.passes += 1;
        debug!(pass = self.passes, ?selection, "starting redraw pass");
        redraw_pass(
            &mut self.backend,
            self.table,
            &self.domains,
            &mut self.panels,
            &selection,
            self.payload_column.as_deref(),
            &*self.extract,
        )
    }

    /// Resolved domains.
    #[must_use]
    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Panel grid shape.
    #[must_use]
    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    /// Panels keyed by panel-domain value, in domain order.
    #[must_use]
    pub fn panels(&self) -> &IndexMap<FacetKey, Panel> {
        &self.panels
    }

    /// Slider controls in facet order.
    #[must_use]
    pub fn sliders(&self) -> &[SliderControl] {
        &self.sliders
    }

    /// Why the first pass failed, for an interactive figure built over a bad
    /// initial selection.
    #[must_use]
    pub fn initial_error(&self) -> Option<&Error> {
        self.initial_error.as_ref()
    }

    /// Number of passes started so far, including failed ones.
    #[must_use]
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Give the backend back.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::table::Value;

    /// `resolution ∈ {10, 20}` x `time ∈ {0.0, 0.5, 1.0}`, payload = resolution + time.
    fn advection_table() -> ResultTable<f64> {
        let mut table = ResultTable::new();
        for resolution in [10, 20] {
            for time in [0.0, 0.5, 1.0] {
                table.push(Record::new(f64::from(resolution) + time).with("resolution", resolution).with("time", time));
            }
        }
        table
    }

    fn payload(record: &Record<f64>) -> PlotData {
        PlotData::new(vec![0.0], vec![*record.payload()])
    }

    fn ys<B: RenderBackend>(figure: &FacetFigure<'_, f64, B>) -> Vec<Vec<f64>> {
        figure.panels().values().flat_map(|p| p.lines().values().map(|l| l.buffer().ys.clone())).collect()
    }

    #[test]
    fn test_end_to_end_time_slider() {
        let table = advection_table();
        let mut figure = FacetPlot::new(&table, payload)
            .panel(FacetSelector::all("resolution"))
            .slider(FacetSelector::all("time"))
            .build(RecordingBackend::new())
            .unwrap();

        assert_eq!(figure.mode(), Mode::Interactive);
        assert_eq!(figure.panels().len(), 2);
        assert!(figure.panels().values().all(|p| p.lines().len() == 1));
        assert_eq!(ys(&figure), vec![vec![10.0], vec![20.0]]);

        let backend = figure.set_slider(0, 1).unwrap();
        assert_eq!(backend.caption(), Some("time: 0.5"));
        assert_eq!(backend.draw_count(), 2);
        assert_eq!(ys(&figure), vec![vec![10.5], vec![20.5]]);

        let titles: Vec<_> =
            figure.backend().panels().iter().filter_map(|p| p.title.as_ref().map(|(t, _)| t.clone())).collect();
        assert_eq!(titles, vec!["resolution: 10", "resolution: 20"]);
        assert_eq!(figure.backend().sliders()[0].max_index, 2);
        assert!(!figure.backend().sliders()[0].readout);
    }

    #[test]
    fn test_out_of_range_slider_is_rejected_by_the_control() {
        let table = advection_table();
        let mut figure = FacetPlot::new(&table, payload)
            .panel(FacetSelector::all("resolution"))
            .slider(FacetSelector::all("time"))
            .build(RecordingBackend::new())
            .unwrap();

        let err = figure.set_slider(0, 3).unwrap_err();
        assert!(matches!(err, Error::SliderOutOfRange { index: 3, len: 3, .. }));
        assert_eq!(figure.state(), InteractiveState::new(vec![0]));
        assert_eq!(figure.backend().draw_count(), 1);
    }

    #[test]
    fn test_state_mismatch() {
        let table = advection_table();
        let mut figure = FacetPlot::new(&table, payload)
            .panel(FacetSelector::all("resolution"))
            .slider(FacetSelector::all("time"))
            .build(RecordingBackend::new())
            .unwrap();

        let err = figure.on_state_change(&InteractiveState::new(vec![0, 0])).unwrap_err();
        assert!(matches!(err, Error::StateMismatch { expected: 1, actual: 2 }));
        assert!(figure.set_slider(1, 0).is_err());
    }

    #[test]
    fn test_static_mode_runs_one_pass() {
        let table = advection_table();
        let figure = FacetPlot::new(&table, payload)
            .panel(FacetSelector::all("resolution"))
            .line(FacetSelector::all("time"))
            .build(RecordingBackend::new())
            .unwrap();

        assert_eq!(figure.mode(), Mode::Static);
        assert_eq!(figure.passes(), 1);
        assert_eq!(figure.backend().draw_count(), 1);
        assert_eq!(figure.backend().caption(), None);
        assert!(figure.backend().sliders().is_empty());

        let (title, entries) = figure.backend().legend().unwrap();
        assert_eq!(title, "time");
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_validation_error_touches_nothing() {
        let table = advection_table();
        let mut backend = RecordingBackend::new();
        let result = FacetPlot::new(&table, payload)
            .panel(FacetSelector::restricted("resolution", [10, 40]))
            .build(&mut backend)
            .map(|_| ());

        assert!(matches!(result, Err(Error::MissingFacetValue { .. })));
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_ambiguous_first_pass_fails_build() {
        let table = advection_table();
        let mut backend = RecordingBackend::new();
        let result =
            FacetPlot::new(&table, payload).panel(FacetSelector::all("resolution")).build(&mut backend).map(|_| ());

        match result {
            Err(Error::Ambiguity { columns }) => assert_eq!(columns, vec!["time".to_string()]),
            Err(other) => panic!("Expected Ambiguity, got {other:?}"),
            Ok(()) => panic!("Expected Ambiguity"),
        }
        assert_eq!(backend.draw_count(), 0);
    }

    #[test]
    fn test_ambiguous_first_frame_keeps_sliders() {
        let table = ResultTable::new()
            .row(Record::new(1.0).with("time", 0.0).with("variant", "a"))
            .row(Record::new(2.0).with("time", 0.0).with("variant", "b"))
            .row(Record::new(3.0).with("time", 1.0).with("variant", "a"));
        let mut figure =
            FacetPlot::new(&table, payload).slider(FacetSelector::all("time")).build(RecordingBackend::new()).unwrap();

        assert!(matches!(figure.initial_error(), Some(Error::Ambiguity { columns }) if columns == &["variant"]));
        assert_eq!(figure.backend().draw_count(), 0);
        assert_eq!(figure.sliders().len(), 1);

        figure.set_slider(0, 1).unwrap();
        assert_eq!(figure.backend().draw_count(), 1);
        assert_eq!(ys(&figure), vec![vec![3.0]]);
    }

    #[test]
    fn test_configured_payload_column_is_left_out_of_reports() {
        let table = ResultTable::new()
            .row(Record::new(1.0).with("resolution", 10).with("frame", 0).with("variant", "a"))
            .row(Record::new(2.0).with("resolution", 10).with("frame", 1).with("variant", "b"));
        let config = FigureConfig::parse("payload_column: frame\nfacets:\n  panel: resolution\n").unwrap();
        let result = FacetPlot::new(&table, payload).configure(&config).build(RecordingBackend::new()).map(|_| ());

        match result {
            Err(Error::Ambiguity { columns }) => assert_eq!(columns, vec!["variant".to_string()]),
            Err(other) => panic!("Expected Ambiguity, got {other:?}"),
            Ok(()) => panic!("Expected Ambiguity"),
        }
    }

    #[test]
    fn test_missing_cells_are_cleared() {
        let table = advection_table().row(Record::new(30.0).with("resolution", 30).with("time", 0.0));
        let mut figure = FacetPlot::new(&table, payload)
            .panel(FacetSelector::all("resolution"))
            .slider(FacetSelector::all("time"))
            .build(RecordingBackend::new())
            .unwrap();

        assert_eq!(figure.layout().rows(), 2);
        assert_eq!(ys(&figure), vec![vec![10.0], vec![20.0], vec![30.0]]);

        figure.set_slider(0, 2).unwrap();
        assert_eq!(ys(&figure), vec![vec![11.0], vec![21.0], vec![]]);
    }

    #[test]
    fn test_slider_and_line_on_same_column() {
        let table = advection_table();
        let mut figure = FacetPlot::new(&table, payload)
            .panel(FacetSelector::all("resolution"))
            .line(FacetSelector::all("time"))
            .slider(FacetSelector::all("time"))
            .build(RecordingBackend::new())
            .unwrap();

        figure.set_slider(0, 1).unwrap();
        let first: Vec<_> = figure.panels()[0].lines().values().map(|l| l.buffer().ys.clone()).collect();
        assert_eq!(first, vec![vec![], vec![10.5], vec![]]);
    }

    #[test]
    fn test_configure_from_yaml() {
        let table = advection_table();
        let config = FigureConfig::parse(
            "
ylim: [0, 25]
markers: false
facets:
  panel: { column: resolution, values: [20, 10] }
  slider: time
",
        )
        .unwrap();

        let figure = FacetPlot::new(&table, payload).configure(&config).build(RecordingBackend::new()).unwrap();

        let keys: Vec<_> = figure.panels().keys().cloned().collect();
        assert_eq!(keys, vec![Some(Value::Int(20)), Some(Value::Int(10))]);
        let backend = figure.backend();
        assert_eq!(backend.panels()[0].limits, Some(((0.0, 1.0), (0.0, 25.0))));
        assert!(!backend.lines()[0].style.markers);
    }

    #[test]
    fn test_interactive_state_builder() {
        let state = InteractiveState::initial(2).with(1, 4).with(5, 1);
        assert_eq!(state.selections(), &[0, 4]);
    }
}
