use crate::config::LegendLoc;
use crate::ir::{LabelRotation, LegendMode, SceneGraph, SeriesScene};
use crate::style::Marker;
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::ops::Range;

/// Style configuration for line series
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: RGBColor,
    pub width: f64,
    pub alpha: f64,
}

/// Style configuration for marker series
#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub color: RGBColor,
    pub size: f64,
    pub shape: Marker,
    pub alpha: f64,
}

/// Numeric x coordinate whose bold and light points are the precomputed
/// major and minor ticks of the scene
#[derive(Clone)]
struct TickedAxis {
    inner: RangedCoordf64,
    major: Vec<f64>,
    minor: Vec<f64>,
}

impl TickedAxis {
    fn new(range: (f64, f64), major: &[f64], minor: &[f64]) -> Self {
        Self {
            inner: (range.0..range.1).into(),
            major: major.to_vec(),
            minor: minor.to_vec(),
        }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            self.minor.clone()
        } else {
            self.major.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.inner.range()
    }
}

type PrimaryCoord = Cartesian2d<TickedAxis, RangedCoordf64>;

/// Draw a whole scene onto `root`
pub fn draw_scene<DB>(root: &DrawingArea<DB, Shift>, scene: &SceneGraph) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let (margin, x_area, y_area) = if scene.tight { (5, 40, 50) } else { (20, 60, 70) };
    let x_area = match scene.x_axis.rotation {
        LabelRotation::Rotate90 | LabelRotation::Rotate270 => x_area + 40,
        _ => x_area,
    };

    let (x0, x1) = scene.x_axis.range;
    let (y0, y1) = scene.y_axis.range;
    let x_coord = TickedAxis::new(
        scene.x_axis.range,
        &scene.x_axis.major_ticks,
        &scene.x_axis.minor_ticks,
    );

    let mut chart = ChartBuilder::on(root)
        .margin(margin)
        .caption(&scene.title, ("sans-serif", 24))
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .right_y_label_area_size(if scene.y2_axis.is_some() { y_area } else { 0 })
        .build_cartesian_2d(x_coord, y0..y1)
        .context("Failed to build chart")?;

    draw_mesh(&mut chart, scene)?;

    for (idx, series) in scene.primary.iter().enumerate() {
        for segment in &series.segments {
            if let Some(line) = &series.line {
                chart
                    .draw_series(LineSeries::new(segment.iter().copied(), line_shape(line)))
                    .with_context(|| format!("Failed to draw line series {}", idx + 1))?;
            }
            if let Some(points) = &series.markers {
                let outline = points.shape.outline(points.size);
                let fill = points.color.mix(points.alpha).filled();
                chart
                    .draw_series(segment.iter().map(|&(x, y)| {
                        EmptyElement::at((x, y)) + Polygon::new(outline.clone(), fill)
                    }))
                    .with_context(|| format!("Failed to draw markers of series {}", idx + 1))?;
            }
        }
        add_legend_entry(&mut chart, series)?;
    }

    match &scene.y2_axis {
        None => {
            draw_legend(&mut chart, scene)?;
        }
        Some(y2) => {
            let mut chart = chart.set_secondary_coord(x0..x1, y2.range.0..y2.range.1);

            {
                let mut axes = chart.configure_secondary_axes();
                axes.axis_desc_style(("sans-serif", 16));
                if let Some(label) = &y2.label {
                    axes.y_desc(label.as_str());
                }
                axes.draw().context("Failed to draw secondary axis")?;
            }

            for (idx, series) in scene.secondary.iter().enumerate() {
                for segment in &series.segments {
                    if let Some(line) = &series.line {
                        chart
                            .draw_secondary_series(LineSeries::new(
                                segment.iter().copied(),
                                line_shape(line),
                            ))
                            .with_context(|| {
                                format!("Failed to draw secondary line series {}", idx + 1)
                            })?;
                    }
                    if let Some(points) = &series.markers {
                        let outline = points.shape.outline(points.size);
                        let fill = points.color.mix(points.alpha).filled();
                        chart
                            .draw_secondary_series(segment.iter().map(|&(x, y)| {
                                EmptyElement::at((x, y)) + Polygon::new(outline.clone(), fill)
                            }))
                            .with_context(|| {
                                format!("Failed to draw secondary markers of series {}", idx + 1)
                            })?;
                    }
                }
                // Registered on the primary axes so a single legend covers both
                let primary: &mut ChartContext<'_, DB, PrimaryCoord> = &mut chart;
                add_legend_entry(primary, series)?;
            }

            let primary: &mut ChartContext<'_, DB, PrimaryCoord> = &mut chart;
            draw_legend(primary, scene)?;
        }
    }

    Ok(())
}

fn draw_mesh<'a, DB>(chart: &mut ChartContext<'a, DB, PrimaryCoord>, scene: &SceneGraph) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
{
    let categories = scene.x_axis.categories.clone();
    let x_formatter = move |x: &f64| match &categories {
        Some(labels) => {
            let idx = x.round();
            if (x - idx).abs() < 1e-9 && idx >= 0.0 && (idx as usize) < labels.len() {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        }
        None => format_tick(*x),
    };

    let x_label_font = ("sans-serif", 14).into_font().transform(match scene.x_axis.rotation {
        LabelRotation::None => FontTransform::None,
        LabelRotation::Rotate90 => FontTransform::Rotate90,
        LabelRotation::Rotate180 => FontTransform::Rotate180,
        LabelRotation::Rotate270 => FontTransform::Rotate270,
    });

    let mut mesh = chart.configure_mesh();
    mesh.x_labels(scene.x_axis.major_ticks.len().max(1))
        .x_label_formatter(&x_formatter)
        .x_label_style(x_label_font)
        .y_label_style(("sans-serif", 14))
        .axis_desc_style(("sans-serif", 16))
        .bold_line_style(BLACK.mix(0.2))
        .light_line_style(BLACK.mix(0.07));
    if let Some(label) = &scene.x_axis.label {
        mesh.x_desc(label.as_str());
    }
    if let Some(label) = &scene.y_axis.label {
        mesh.y_desc(label.as_str());
    }
    mesh.draw().context("Failed to draw mesh")?;
    Ok(())
}

/// Register a legend swatch for `series` without drawing any data. Swatches
/// are always fully opaque, whatever the series alpha.
fn add_legend_entry<'a, DB>(chart: &mut ChartContext<'a, DB, PrimaryCoord>, series: &SeriesScene) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
{
    let anno = chart
        .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())
        .context("Failed to register legend entry")?;
    anno.label(series.name.clone());

    match (&series.line, &series.markers) {
        (Some(line), Some(points)) => {
            let stroke = line.color.stroke_width(stroke_width(line.width));
            let outline = points.shape.outline(points.size);
            let fill = points.color.filled();
            anno.legend(move |(x, y)| {
                EmptyElement::at((x + 10, y))
                    + PathElement::new(vec![(-10, 0), (10, 0)], stroke)
                    + Polygon::new(outline.clone(), fill)
            });
        }
        (Some(line), None) => {
            let stroke = line.color.stroke_width(stroke_width(line.width));
            anno.legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], stroke));
        }
        (None, Some(points)) => {
            let outline = points.shape.outline(points.size);
            let fill = points.color.filled();
            anno.legend(move |(x, y)| {
                EmptyElement::at((x + 10, y)) + Polygon::new(outline.clone(), fill)
            });
        }
        (None, None) => {}
    }
    Ok(())
}

fn draw_legend<'a, DB>(chart: &mut ChartContext<'a, DB, PrimaryCoord>, scene: &SceneGraph) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
{
    // Both modes end up on the primary plotting area: in combined mode every
    // secondary series was registered there as well.
    let background = match scene.legend.mode {
        LegendMode::Standard => WHITE.mix(0.8),
        LegendMode::Combined => WHITE.mix(0.9),
    };
    chart
        .configure_series_labels()
        .position(legend_position(scene.legend.location))
        .background_style(background)
        .border_style(BLACK.mix(0.3))
        .label_font(("sans-serif", 14))
        .draw()
        .context("Failed to draw legend")?;
    Ok(())
}

fn legend_position(loc: LegendLoc) -> SeriesLabelPosition {
    match loc {
        LegendLoc::Best | LegendLoc::UpperRight => SeriesLabelPosition::UpperRight,
        LegendLoc::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendLoc::LowerLeft => SeriesLabelPosition::LowerLeft,
        LegendLoc::LowerRight => SeriesLabelPosition::LowerRight,
        LegendLoc::Right | LegendLoc::CenterRight => SeriesLabelPosition::MiddleRight,
        LegendLoc::CenterLeft => SeriesLabelPosition::MiddleLeft,
        LegendLoc::LowerCenter => SeriesLabelPosition::LowerMiddle,
        LegendLoc::UpperCenter => SeriesLabelPosition::UpperMiddle,
        LegendLoc::Center => SeriesLabelPosition::MiddleMiddle,
    }
}

fn line_shape(line: &LineStyle) -> ShapeStyle {
    line.color.mix(line.alpha).stroke_width(stroke_width(line.width))
}

fn stroke_width(width: f64) -> u32 {
    width.round().max(1.0) as u32
}

fn format_tick(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.6}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Bytes needed for a packed RGB image, `None` on overflow
fn buffer_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(3)
}

/// Rasterize a scene into a packed RGB buffer
pub fn rasterize(scene: &SceneGraph) -> Result<Vec<u8>> {
    let len = buffer_len(scene.width, scene.height)
        .with_context(|| format!("Image size {}x{} is too large", scene.width, scene.height))?;
    let mut buffer = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (scene.width, scene.height))
            .into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(buffer)
}

/// Rasterize and encode a scene as PNG
pub fn render_png(scene: &SceneGraph) -> Result<Vec<u8>> {
    let buffer = rasterize(scene)?;
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, scene.width, scene.height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}
