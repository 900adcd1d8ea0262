use crate::config::{AxisLimits, RenderConfig};
use crate::data::{Column, Table, Value};
use crate::error::PlotError;
use crate::graph::{LineStyle, PointStyle};
use crate::ir::{LabelRotation, LegendMode, LegendScene, SceneGraph, SeriesScene, XAxis, YAxis};
use crate::style::{default_color, Marker, SeriesStyles};
use log::{debug, warn};

const DEFAULT_LINE_WIDTH: f64 = 1.5;
const DEFAULT_MARKER_SIZE: f64 = 6.0;
const MINOR_DIVISIONS: usize = 5;
const MAX_TICKS: usize = 500;

/// Compile the extracted tables into a scene. Column 0 of each table is the
/// x axis; every other column becomes one series.
pub fn compile_scene(
    primary: &Table,
    secondary: Option<&Table>,
    config: &RenderConfig,
    styles: &SeriesStyles,
    styles2: &SeriesStyles,
) -> Result<SceneGraph, PlotError> {
    if primary.row_count() == 0 {
        return Err(PlotError::config("input must have at least one data row"));
    }
    let series_total = primary.column_count().saturating_sub(1)
        + secondary.map_or(0, |t| t.column_count().saturating_sub(1));
    if series_total == 0 {
        return Err(PlotError::config(
            "no columns to plot besides the x axis column",
        ));
    }

    // Categorical as soon as either table's x column holds text
    let categorical = !primary.columns[0].is_numeric()
        || secondary.is_some_and(|t| !t.columns[0].is_numeric());

    let primary_series = build_series(primary, categorical, config, styles, 0)?;
    let secondary_series = match secondary {
        Some(table) => build_series(table, categorical, config, styles2, primary_series.len())?,
        None => Vec::new(),
    };

    let x_axis = build_x_axis(primary, secondary, categorical, config);

    let y_axis = YAxis {
        range: apply_limits(y_extent(&primary_series), config.ylim),
        label: config.ylabel.clone(),
    };
    let y2_axis = secondary.map(|_| YAxis {
        range: pad_range(y_extent(&secondary_series)),
        label: config.ylabel2.clone(),
    });

    let legend = LegendScene {
        mode: if secondary.is_some() {
            LegendMode::Combined
        } else {
            LegendMode::Standard
        },
        location: config.legend_loc,
    };
    debug!(
        "scene: {} primary, {} secondary series, legend {:?}",
        primary_series.len(),
        secondary_series.len(),
        legend.mode
    );

    Ok(SceneGraph {
        width: config.width,
        height: config.height,
        title: config.title.clone(),
        tight: config.tight,
        x_axis,
        y_axis,
        y2_axis,
        primary: primary_series,
        secondary: secondary_series,
        legend,
    })
}

fn build_series(
    table: &Table,
    categorical: bool,
    config: &RenderConfig,
    styles: &SeriesStyles,
    color_offset: usize,
) -> Result<Vec<SeriesScene>, PlotError> {
    let xs = x_positions(&table.columns[0], categorical);
    let mut series = Vec::new();

    for (idx, column) in table.columns.iter().enumerate().skip(1) {
        let overrides = styles.resolve(idx);
        debug!("style for series {} '{}': {:?}", idx, column.name, overrides);
        let color = overrides
            .color
            .unwrap_or_else(|| default_color(color_offset + idx - 1));
        let alpha = config.alpha.unwrap_or(1.0);

        let marker = overrides
            .marker
            .or(if config.scatter { Some(Marker::Point) } else { None });

        let line = (!config.scatter).then(|| LineStyle {
            color,
            width: config.linewidth.unwrap_or(DEFAULT_LINE_WIDTH),
            alpha,
        });
        let markers = marker.map(|shape| PointStyle {
            color,
            size: overrides.marker_size.unwrap_or(DEFAULT_MARKER_SIZE),
            shape,
            alpha,
        });

        series.push(SeriesScene {
            name: column.name.clone(),
            segments: segments(&xs, column)?,
            line,
            markers,
        });
    }
    Ok(series)
}

/// Numeric x values, or row positions for a categorical axis
fn x_positions(x: &Column, categorical: bool) -> Vec<Option<f64>> {
    if categorical {
        (0..x.values.len()).map(|i| Some(i as f64)).collect()
    } else {
        x.values.iter().map(Value::as_f64).collect()
    }
}

fn segments(xs: &[Option<f64>], column: &Column) -> Result<Vec<Vec<(f64, f64)>>, PlotError> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (x, value) in xs.iter().zip(&column.values) {
        let y = match value {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Number(_) | Value::Missing => None,
            Value::Text(t) => {
                return Err(PlotError::config(format!(
                    "column '{}' has non-numeric value '{}'",
                    column.name, t
                )))
            }
        };
        match (x, y) {
            (Some(x), Some(y)) => current.push((*x, y)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    Ok(runs)
}

fn build_x_axis(
    primary: &Table,
    secondary: Option<&Table>,
    categorical: bool,
    config: &RenderConfig,
) -> XAxis {
    let rotation = snap_rotation(config.xrotate);

    if categorical {
        let labels: Vec<String> = primary.columns[0]
            .values
            .iter()
            .map(|v| v.to_string())
            .collect();
        let n = secondary
            .map_or(0, |t| t.row_count())
            .max(labels.len());
        let major_ticks = match config.tick_interval {
            Some(step) if !config.all_x_ticks => interval_ticks(0.0, n as f64 - 1.0, step.ceil()),
            _ if config.all_x_ticks || n <= 20 => (0..n).map(|i| i as f64).collect(),
            _ => interval_ticks(0.0, n as f64 - 1.0, (n as f64 / 10.0).ceil()),
        };
        return XAxis {
            range: (-0.5, n as f64 - 0.5),
            label: config.xlabel.clone(),
            major_ticks,
            minor_ticks: Vec::new(),
            categories: Some(labels),
            rotation,
        };
    }

    let mut xs: Vec<f64> = std::iter::once(primary)
        .chain(secondary)
        .flat_map(|t| t.columns[0].values.iter().filter_map(Value::as_f64))
        .filter(|x| x.is_finite())
        .collect();
    let range = pad_range(extent(xs.iter().copied()));

    let (major_ticks, minor_ticks) = if config.all_x_ticks {
        xs.sort_by(|a, b| a.total_cmp(b));
        xs.dedup();
        (xs, Vec::new())
    } else {
        let major = match config.tick_interval {
            Some(step) => interval_ticks(range.0, range.1, step),
            None => nice_ticks(range.0, range.1, 10),
        };
        let minor = minor_ticks(&major, range);
        (major, minor)
    };

    XAxis {
        range,
        label: config.xlabel.clone(),
        major_ticks,
        minor_ticks,
        categories: None,
        rotation,
    }
}

/// plotters rotates labels in quarter turns only
fn snap_rotation(degrees: f64) -> LabelRotation {
    let quarters = (degrees / 90.0).round().rem_euclid(4.0) as u8;
    let snapped = (degrees / 90.0).round() * 90.0;
    if (snapped - degrees).abs() > f64::EPSILON {
        warn!(
            "x label rotation {} snapped to {} degrees",
            degrees, snapped
        );
    }
    match quarters {
        1 => LabelRotation::Rotate90,
        2 => LabelRotation::Rotate180,
        3 => LabelRotation::Rotate270,
        _ => LabelRotation::None,
    }
}

/// Multiples of `step` inside `[min, max]`
fn interval_ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(max >= min) {
        return Vec::new();
    }
    if (max - min) / step > MAX_TICKS as f64 {
        warn!("tick interval {} is too small for range {}..{}, using automatic ticks", step, min, max);
        return nice_ticks(min, max, 10);
    }
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    let mut ticks: Vec<f64> = (first..=last).map(|k| k as f64 * step).collect();
    // Far from zero, neighbouring multiples can round to the same f64
    ticks.dedup();
    ticks
}

/// About `target` ticks at a 1/2/5 × 10^n spacing
fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let span = max - min;
    if !(span > 0.0) || !span.is_finite() {
        return vec![min];
    }
    let raw = span / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let step = if residual < 1.5 {
        1.0
    } else if residual < 3.0 {
        2.0
    } else if residual < 7.0 {
        5.0
    } else {
        10.0
    } * magnitude;
    interval_ticks(min, max, step)
}

/// Subdivide each major interval, continuing one step past either end
fn minor_ticks(major: &[f64], range: (f64, f64)) -> Vec<f64> {
    if major.len() < 2 {
        return Vec::new();
    }
    let major_step = major[1] - major[0];
    let step = major_step / MINOR_DIVISIONS as f64;
    let start = major[0] - major_step;
    // Subdivisions below the f64 resolution at this magnitude collapse
    if !step.is_finite() || step <= 0.0 || start + step == start {
        return Vec::new();
    }
    let end = major[major.len() - 1] + major_step;

    let mut ticks = Vec::new();
    for k in 0..(MAX_TICKS + 2) * MINOR_DIVISIONS {
        let t = start + k as f64 * step;
        if t > end || t > range.1 {
            break;
        }
        if t >= range.0 && k % MINOR_DIVISIONS != 0 {
            ticks.push(t);
        }
    }
    ticks.dedup();
    ticks
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn y_extent(series: &[SeriesScene]) -> Option<(f64, f64)> {
    extent(series.iter().flat_map(|s| s.points().map(|&(_, y)| y)))
}

fn pad_range(extent: Option<(f64, f64)>) -> (f64, f64) {
    match extent {
        None => (0.0, 1.0),
        Some((min, max)) if min == max => {
            let padding = (min.abs() * 0.05).max(1.0);
            (min - padding, max + padding)
        }
        Some((min, max)) => {
            let padding = (max - min) * 0.05;
            (min - padding, max + padding)
        }
    }
}

fn apply_limits(extent: Option<(f64, f64)>, limits: Option<AxisLimits>) -> (f64, f64) {
    let (min, max) = pad_range(extent);
    match limits {
        None => (min, max),
        Some(AxisLimits::Lower(lower)) => {
            if max > lower {
                (lower, max)
            } else {
                warn!("--ylim lower bound {} is above the data, widening the axis", lower);
                (lower, lower + 1.0)
            }
        }
        Some(AxisLimits::Range(lower, upper)) => {
            if lower == upper {
                warn!("--ylim bounds are identical, widening the axis");
                (lower - 1.0, upper + 1.0)
            } else {
                (lower, upper)
            }
        }
    }
}
