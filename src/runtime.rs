// Runtime: runs the pipeline stages in order for one configuration

use crate::compiler::compile_scene;
use crate::config::{OutputTarget, PlotConfig, JITTER_SEED};
use crate::csv_reader;
use crate::error::PlotError;
use crate::ir::SceneGraph;
use crate::output::{self, CommandViewer, Outcome, Viewer};
use crate::select;
use crate::transform;
use anyhow::{Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Ingest, select, transform and compile, without producing any output
pub fn build_scene(config: &PlotConfig) -> Result<SceneGraph> {
    let table = csv_reader::read_sources(&config.sources, &config.read)?;
    debug!("merged input:\n{}", table.head(5));

    let (mut primary, mut secondary) = select::split_axes(
        &table,
        config.xcol,
        &config.primary,
        config.secondary.as_ref(),
    )?;

    if let Some(labels) = &config.labels {
        select::apply_labels(&mut primary, labels)?;
    }
    select::check_duplicates(&primary)?;
    if let Some(secondary) = &secondary {
        select::check_duplicates(secondary)?;
    }

    if config.group {
        if secondary.is_some() {
            return Err(PlotError::config("--group cannot be combined with a secondary axis").into());
        }
        primary = transform::group_by_first(&primary)?;
    }

    if let Some(multiplier) = config.jitter {
        let mut rng = StdRng::seed_from_u64(JITTER_SEED);
        transform::jitter_x(&mut primary, multiplier, &mut rng)?;
        if let Some(secondary) = secondary.as_mut() {
            transform::jitter_x(secondary, multiplier, &mut rng)?;
        }
    }

    let scene = compile_scene(
        &primary,
        secondary.as_ref(),
        &config.render,
        &config.styles,
        &config.styles2,
    )?;
    debug!(
        "compiled scene with {} series ({} secondary)",
        scene.series_count(),
        scene.secondary.len()
    );
    Ok(scene)
}

/// Run the whole pipeline, showing the chart with the configured viewer
pub fn run(config: &PlotConfig) -> Result<Outcome> {
    let viewer = CommandViewer::new(config.viewer.as_deref());
    run_with_viewer(config, &viewer)
}

pub fn run_with_viewer(config: &PlotConfig, viewer: &dyn Viewer) -> Result<Outcome> {
    let scene = build_scene(config)?;
    match &config.output {
        OutputTarget::File(path) => {
            output::render_to_file(&scene, path)
                .with_context(|| format!("Failed to save chart to {}", path.display()))?;
            Ok(Outcome::Written(path.clone()))
        }
        OutputTarget::Display => {
            let path = output::display(&scene, viewer).context("Failed to display chart")?;
            info!("displayed {}", path.display());
            Ok(Outcome::Displayed(path))
        }
    }
}
