//! Falsification tests for the faceting and redraw engine.
//!
//! Each test is a falsifiable claim about observable figure behavior.
//!
//! Run: cargo test --test facet_claims_test

#![allow(clippy::unwrap_used, clippy::float_cmp, missing_docs)]

use std::collections::{HashMap, HashSet};

use approx::assert_relative_eq;
use proptest::prelude::*;

use facetplot::prelude::*;

fn scalar(record: &Record<f64>) -> PlotData {
    PlotData::new(vec![0.0], vec![*record.payload()])
}

fn buffers<B: RenderBackend>(figure: &FacetFigure<'_, f64, B>) -> Vec<(Vec<u64>, Vec<u64>)> {
    figure
        .panels()
        .values()
        .flat_map(|panel| panel.lines().values())
        .map(|line| {
            let buffer = line.buffer();
            (buffer.xs.iter().map(|v| v.to_bits()).collect(), buffer.ys.iter().map(|v| v.to_bits()).collect())
        })
        .collect()
}

/// `resolution ∈ {10, 20}` x `time ∈ {0.0, 0.5, 1.0}`.
fn resolution_time_table() -> ResultTable<f64> {
    let mut table = ResultTable::new();
    for resolution in [10, 20] {
        for time in [0.0, 0.5, 1.0] {
            let payload = f64::from(resolution) * 100.0 + time;
            table.push(Record::new(payload).with("resolution", resolution).with("time", time));
        }
    }
    table
}

// ============================================================================
// DOMAIN & LAYOUT CLAIMS
// ============================================================================

/// Claim 1: Restricting a facet preserves the caller's order, not table order.
#[test]
fn claim_01_restriction_preserves_order() {
    let table: ResultTable<f64> = [20, 40, 80]
        .into_iter()
        .map(|nx| Record::new(f64::from(nx)).with("nx", nx))
        .collect();

    let figure = FacetPlot::new(&table, scalar)
        .panel(FacetSelector::restricted("nx", [80, 20]))
        .build(RecordingBackend::new())
        .unwrap();

    let keys: Vec<FacetKey> = figure.panels().keys().cloned().collect();
    assert_eq!(
        keys,
        vec![Some(Value::Int(80)), Some(Value::Int(20))],
        "Claim 1 FALSIFIED: restricted domain reordered to {keys:?}"
    );
}

/// Claim 2: A restricted value that never occurs is rejected before any backend call.
#[test]
fn claim_02_validation_precedes_layout() {
    let table = resolution_time_table();
    let mut backend = RecordingBackend::new();
    let result = FacetPlot::new(&table, scalar)
        .panel(FacetSelector::all("resolution"))
        .slider(FacetSelector::restricted("time", [0.0, 2.0]))
        .build(&mut backend)
        .map(|_| ());

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "No value 2.0 in column time");
    assert_eq!(backend.call_count(), 0, "Claim 2 FALSIFIED: backend touched before validation");
}

/// Claim 3: An unknown facet column is a validation error.
#[test]
fn claim_03_unknown_column_rejected() {
    let table = resolution_time_table();
    let result = FacetPlot::new(&table, scalar).line(FacetSelector::all("solver")).build(RecordingBackend::new());
    assert!(
        matches!(result, Err(Error::UnknownColumn { ref column }) if column == "solver"),
        "Claim 3 FALSIFIED: unknown column accepted"
    );
}

// ============================================================================
// MATCHING CLAIMS
// ============================================================================

/// Claim 4: Two records differing only in `variant` report exactly `{variant}`.
#[test]
fn claim_04_ambiguity_names_differing_column() {
    let table = ResultTable::new()
        .row(Record::new(1.0).with("nx", 10).with("variant", "a"))
        .row(Record::new(2.0).with("nx", 10).with("variant", "b"));

    let mut backend = RecordingBackend::new();
    let result = FacetPlot::new(&table, scalar).panel(FacetSelector::all("nx")).build(&mut backend).map(|_| ());

    match result {
        Err(Error::Ambiguity { columns }) => {
            assert_eq!(columns, vec!["variant".to_string()], "Claim 4 FALSIFIED: reported {columns:?}");
        }
        other => panic!("Claim 4 FALSIFIED: expected Ambiguity, got {other:?}"),
    }
    assert_eq!(backend.draw_count(), 0, "Claim 4 FALSIFIED: aborted pass flushed the canvas");
}

/// Claim 5: An ambiguous later pass keeps earlier writes and issues no flush.
#[test]
fn claim_05_ambiguous_pass_has_no_rollback_and_no_flush() {
    let table = ResultTable::new()
        .row(Record::new(1.0).with("nx", 10).with("time", 0.0))
        .row(Record::new(2.0).with("nx", 10).with("time", 1.0))
        .row(Record::new(3.0).with("nx", 20).with("time", 0.0))
        .row(Record::new(4.0).with("nx", 20).with("time", 1.0).with("variant", "a"))
        .row(Record::new(5.0).with("nx", 20).with("time", 1.0).with("variant", "b"));

    let mut figure = FacetPlot::new(&table, scalar)
        .panel(FacetSelector::all("nx"))
        .slider(FacetSelector::all("time"))
        .build(RecordingBackend::new())
        .unwrap();
    assert_eq!(figure.backend().draw_count(), 1);

    let err = figure.set_slider(0, 1).map(|_| ()).unwrap_err();
    assert!(matches!(err, Error::Ambiguity { ref columns } if columns == &["variant".to_string()]));
    assert_eq!(figure.backend().draw_count(), 1, "Claim 5 FALSIFIED: failed pass flushed");

    let first = figure.panels().get_index(0).unwrap().1;
    let ys = &first.lines()[0].buffer().ys;
    assert_eq!(ys, &vec![2.0], "Claim 5 FALSIFIED: earlier write was rolled back");
}

/// Claim 6: A cell with no record clears its line instead of failing.
#[test]
fn claim_06_empty_match_clears_line() {
    let table = ResultTable::new()
        .row(Record::new(1.0).with("nx", 10).with("solver", "classic"))
        .row(Record::new(2.0).with("nx", 20).with("solver", "sharpclaw"));

    let figure = FacetPlot::new(&table, scalar)
        .panel(FacetSelector::all("nx"))
        .line(FacetSelector::all("solver"))
        .build(RecordingBackend::new())
        .unwrap();

    let empties = figure
        .panels()
        .values()
        .flat_map(|p| p.lines().values())
        .filter(|l| l.buffer().is_empty())
        .count();
    assert_eq!(empties, 2, "Claim 6 FALSIFIED: {empties} cleared lines, expected 2");
    assert_eq!(figure.backend().lines().len(), 4);
}

// ============================================================================
// INTERACTION CLAIMS
// ============================================================================

/// Claim 7: The resolution x time walkthrough redraws both panels from the matching rows.
#[test]
fn claim_07_end_to_end_time_slider() {
    let table = resolution_time_table();
    let mut figure = FacetPlot::new(&table, scalar)
        .panel(FacetSelector::all("resolution"))
        .slider(FacetSelector::all("time"))
        .build(RecordingBackend::new())
        .unwrap();

    assert_eq!(figure.mode(), Mode::Interactive);
    assert_eq!(figure.panels().len(), 2);
    assert_eq!(figure.backend().grid(), Some((1, 2)));

    figure.set_slider(0, 1).unwrap();
    let ys: Vec<f64> =
        figure.panels().values().map(|p| p.lines()[0].buffer().ys[0]).collect();
    assert_relative_eq!(ys[0], 1000.5);
    assert_relative_eq!(ys[1], 2000.5);
    assert_eq!(figure.backend().caption(), Some("time: 0.5"));

    assert!(
        matches!(figure.set_slider(0, 3), Err(Error::SliderOutOfRange { .. })),
        "Claim 7 FALSIFIED: control accepted an index past its last stop"
    );
}

/// Claim 8: Each accepted state change flushes the canvas exactly once.
#[test]
fn claim_08_one_flush_per_pass() {
    let table = resolution_time_table();
    let mut figure = FacetPlot::new(&table, scalar)
        .panel(FacetSelector::all("resolution"))
        .slider(FacetSelector::all("time"))
        .build(RecordingBackend::new())
        .unwrap();

    for index in [1, 2, 0, 2] {
        figure.on_state_change(&InteractiveState::new(vec![index])).unwrap();
    }
    assert_eq!(figure.backend().draw_count(), 5, "Claim 8 FALSIFIED: flush count drifted");
    assert_eq!(figure.passes(), 5);
}

/// Claim 9: Without sliders the figure is static and rendered exactly once.
#[test]
fn claim_09_static_mode_single_pass() {
    let table = ResultTable::new().row(Record::new(0.25).with("nx", 10));
    let figure = FacetPlot::new(&table, scalar).build(RecordingBackend::new()).unwrap();

    assert_eq!(figure.mode(), Mode::Static);
    assert_eq!(figure.panels().len(), 1);
    assert_eq!(figure.backend().draw_count(), 1);
    assert!(figure.backend().legend().is_none(), "Claim 9 FALSIFIED: legend without a line facet");
    assert!(figure.backend().caption().is_none(), "Claim 9 FALSIFIED: caption without sliders");
}

/// Claim 10: Multiple sliders produce a comma-joined caption in control order.
#[test]
fn claim_10_multi_slider_caption() {
    let mut table = ResultTable::new();
    for solver in ["classic", "sharpclaw"] {
        for time in [0.0, 1.0] {
            table.push(Record::new(time).with("solver", solver).with("time", time));
        }
    }

    let mut figure = FacetPlot::new(&table, scalar)
        .slider(FacetSelector::all("time"))
        .slider(FacetSelector::all("solver"))
        .build(RecordingBackend::new())
        .unwrap();

    figure.on_state_change(&InteractiveState::new(vec![1, 1])).unwrap();
    assert_eq!(figure.backend().caption(), Some("time: 1.0, solver: sharpclaw"));
    assert_eq!(figure.backend().sliders().len(), 2);
}

// ============================================================================
// OUTPUT & CONFIG CLAIMS
// ============================================================================

/// Claim 11: The raster backend writes one decodable PNG per frame.
#[test]
fn claim_11_raster_frames_to_png() {
    let table = resolution_time_table();
    let curve = |r: &Record<f64>| {
        let xs: Vec<f64> = (0..=10).map(|i| f64::from(i) / 10.0).collect();
        let ys = xs.iter().map(|x| (x + r.payload() / 1000.0).sin()).collect();
        PlotData::new(xs, ys)
    };
    let mut figure = FacetPlot::new(&table, curve)
        .panel(FacetSelector::all("resolution"))
        .slider(FacetSelector::all("time"))
        .build(RasterBackend::new(240, 160).unwrap())
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    for index in 0..3 {
        figure.set_slider(0, index).unwrap();
        figure.backend().write_png(dir.path().join(format!("frame_{index}.png"))).unwrap();
    }

    assert_eq!(figure.backend().frames(), 4);
    for index in 0..3 {
        let bytes = std::fs::read(dir.path().join(format!("frame_{index}.png"))).unwrap();
        assert_eq!(&bytes[1..4], b"PNG", "Claim 11 FALSIFIED: frame {index} is not a PNG");
    }
    assert!(figure.backend().framebuffer().count_color(Palette::line_color(0)) > 0);
}

/// Claim 12: A YAML config file drives facets and limits.
#[test]
fn claim_12_config_file_drives_figure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figure.yaml");
    std::fs::write(
        &path,
        "ylim: [0, 3000]\nline_width: 1.0\nfacets:\n  panel: resolution\n  slider: [time]\n",
    )
    .unwrap();

    let config = FigureConfig::load(&path).unwrap();
    let figure = FacetPlot::new(&resolution_time_table(), scalar)
        .configure(&config)
        .build(RecordingBackend::new())
        .map(|f| (f.mode(), f.panels().len(), f.into_backend()))
        .unwrap();

    let (mode, panels, backend) = figure;
    assert_eq!(mode, Mode::Interactive);
    assert_eq!(panels, 2);
    assert_eq!(backend.panels()[0].limits, Some(((0.0, 1.0), (0.0, 3000.0))));
    assert_eq!(backend.lines()[0].style.width, 1.0);
}

/// Claim 16: An ambiguous first frame leaves the slider usable for the valid frames.
#[test]
fn claim_16_ambiguous_first_frame_keeps_controls() {
    let table = ResultTable::new()
        .row(Record::new(1.0).with("time", 0.0).with("variant", "a"))
        .row(Record::new(2.0).with("time", 0.0).with("variant", "b"))
        .row(Record::new(3.0).with("time", 1.0).with("variant", "a"));

    let mut figure = FacetPlot::new(&table, scalar)
        .slider(FacetSelector::all("time"))
        .build(RecordingBackend::new())
        .unwrap();
    assert!(
        matches!(figure.initial_error(), Some(Error::Ambiguity { .. })),
        "Claim 16 FALSIFIED: initial failure not kept, got {:?}",
        figure.initial_error()
    );
    assert_eq!(figure.backend().draw_count(), 0);

    figure.set_slider(0, 1).unwrap();
    let ys = &figure.panels()[0].lines()[0].buffer().ys;
    assert_eq!(ys, &vec![3.0], "Claim 16 FALSIFIED: valid frame not drawn");
    assert_eq!(figure.backend().caption(), Some("time: 1.0"));
}

/// Claim 17: Integer restrictions from YAML select values of a float column.
#[test]
fn claim_17_integer_config_values_match_float_column() {
    let config = FigureConfig::parse("facets:\n  panel: resolution\n  slider: { column: time, values: [0, 1] }\n").unwrap();
    let table = resolution_time_table();
    let mut figure = FacetPlot::new(&table, scalar)
        .configure(&config)
        .build(RecordingBackend::new())
        .unwrap();

    assert_eq!(figure.sliders()[0].len(), 2);
    figure.set_slider(0, 1).unwrap();
    let ys: Vec<f64> = figure.panels().values().flat_map(|p| p.lines()[0].buffer().ys.clone()).collect();
    assert_eq!(ys, vec![1001.0, 2001.0], "Claim 17 FALSIFIED: integer key missed float rows");
}

// ============================================================================
// PROPERTY CLAIMS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Claim 13: One panel per value, packed into the smallest square-ish grid.
    #[test]
    fn claim_13_grid_holds_every_panel(n in 1i64..40) {
        let table: ResultTable<f64> = (0..n).map(|k| Record::new(0.0).with("k", k)).collect();
        let figure = FacetPlot::new(&table, scalar)
            .panel(FacetSelector::all("k"))
            .build(RecordingBackend::new())
            .unwrap();

        let n = n as usize;
        let layout = figure.layout();
        prop_assert_eq!(figure.panels().len(), n);
        prop_assert!(layout.rows() * layout.cols() >= n);
        prop_assert!(n > layout.rows() * (layout.cols() - 1));
        prop_assert!(layout.rows() <= layout.cols());

        let cells: HashSet<_> = figure.panels().values().map(|p| (p.cell().row, p.cell().col)).collect();
        prop_assert_eq!(cells.len(), n);
        prop_assert!(cells.iter().all(|&(r, c)| r < layout.rows() && c < layout.cols()));
    }

    /// Claim 14: Every cell is drawn from its unique record, cleared, or the pass aborts.
    #[test]
    fn claim_14_every_cell_has_one_outcome(
        rows in prop::collection::vec((0i64..3, 0i64..3, -10.0f64..10.0), 1..12)
    ) {
        let table: ResultTable<f64> =
            rows.iter().map(|&(a, b, y)| Record::new(y).with("a", a).with("b", b)).collect();

        let mut groups: HashMap<(i64, i64), Vec<f64>> = HashMap::new();
        for &(a, b, y) in &rows {
            groups.entry((a, b)).or_default().push(y);
        }
        let ambiguous = groups.values().any(|ys| ys.len() > 1);

        let result = FacetPlot::new(&table, scalar)
            .panel(FacetSelector::all("a"))
            .line(FacetSelector::all("b"))
            .build(RecordingBackend::new());

        match result {
            Err(Error::Ambiguity { .. }) => prop_assert!(ambiguous),
            Err(other) => prop_assert!(false, "unexpected error {}", other),
            Ok(figure) => {
                prop_assert!(!ambiguous);
                for (panel_key, panel) in figure.panels() {
                    for (line_key, line) in panel.lines() {
                        let a = panel_key.as_ref().and_then(|v| match v { Value::Int(i) => Some(*i), _ => None });
                        let b = line_key.as_ref().and_then(|v| match v { Value::Int(i) => Some(*i), _ => None });
                        let expected = a.zip(b).and_then(|key| groups.get(&key)).cloned().unwrap_or_default();
                        prop_assert_eq!(&line.buffer().ys, &expected);
                    }
                }
            }
        }
    }

    /// Claim 15: Repeating a state reproduces bit-identical line buffers.
    #[test]
    fn claim_15_redraw_is_idempotent(index in 0usize..3) {
        let table = resolution_time_table();
        let mut figure = FacetPlot::new(&table, scalar)
            .panel(FacetSelector::all("resolution"))
            .slider(FacetSelector::all("time"))
            .build(RecordingBackend::new())
            .unwrap();

        figure.set_slider(0, index).unwrap();
        let first = buffers(&figure);
        figure.set_slider(0, index).unwrap();
        prop_assert_eq!(first, buffers(&figure));
    }
}
