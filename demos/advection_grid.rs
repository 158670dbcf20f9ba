//! Advection sweep rendered as a faceted grid.
//!
//! Synthesizes snapshots of a Gaussian pulse advected around a periodic
//! domain for several resolutions and two solver variants, then steps the
//! time slider and writes one PNG per frame.
//!
//! Run: cargo run --example advection_grid -- [output_dir] [config.yaml]
//!
//! Set `RUST_LOG=facetplot=debug` to see pass-level events.

#![allow(clippy::unwrap_used, missing_docs)]

use std::path::PathBuf;

use facetplot::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Solution snapshot at one output time.
struct Snapshot {
    x: Vec<f64>,
    q: Vec<f64>,
}

const WIDTH: f64 = 0.05;
const FRAMES: usize = 11;

/// Pulse centered at 0.3 moved by unit speed, smeared by numerical diffusion.
fn snapshot(nx: u32, diffusion: f64, time: f64) -> Snapshot {
    let dx = 1.0 / f64::from(nx);
    let variance = WIDTH * WIDTH + 2.0 * diffusion * time;
    let amplitude = WIDTH / variance.sqrt();

    let x: Vec<f64> = (0..nx).map(|i| (f64::from(i) + 0.5) * dx).collect();
    let q = x
        .iter()
        .map(|&xi| {
            let d = (xi - 0.3 - time + 0.5).rem_euclid(1.0) - 0.5;
            amplitude * (-d * d / (2.0 * variance)).exp()
        })
        .collect();
    Snapshot { x, q }
}

fn sweep() -> ResultTable<Snapshot> {
    let mut table = ResultTable::new();
    for nx in [20, 40, 80, 160] {
        let dx = 1.0 / f64::from(nx);
        for (solver, diffusion) in [("classic", 0.5 * dx), ("sharpclaw", dx * dx * dx * 20.0)] {
            for frame in 0..FRAMES {
                let time = frame as f64 / (FRAMES - 1) as f64;
                table.push(
                    Record::new(snapshot(nx, diffusion, time))
                        .with("nx", nx)
                        .with("solver_type", solver)
                        .with("time", time),
                );
            }
        }
    }
    table
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "advection_frames".to_string()));
    let config = args.next().map_or_else(FigureConfig::default, |path| FigureConfig::load_or_default(path));
    std::fs::create_dir_all(&out_dir)?;

    let table = sweep();
    info!(records = table.len(), "synthesized advection sweep");

    let spec = if config.facets.to_spec() == FacetSpec::new() {
        FacetSpec::new()
            .panel(FacetSelector::all("nx"))
            .line(FacetSelector::all("solver_type"))
            .slider(FacetSelector::all("time"))
    } else {
        config.facets.to_spec()
    };

    let mut figure = FacetPlot::new(&table, |r: &Record<Snapshot>| {
        PlotData::new(r.payload().x.clone(), r.payload().q.clone())
    })
    .configure(&config)
    .facets(spec)
    .build(RasterBackend::from_config(&config)?)?;

    let stops = figure.sliders().first().map_or(1, |s| s.len());
    for index in 0..stops {
        if figure.mode() == Mode::Interactive {
            figure.set_slider(0, index)?;
        }
        let path = out_dir.join(format!("frame_{index:03}.png"));
        figure.backend().write_png(&path)?;
        info!(path = %path.display(), caption = figure.backend().caption().unwrap_or(""), "wrote frame");
    }

    Ok(())
}
