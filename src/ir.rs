use crate::config::LegendLoc;
use crate::graph::{LineStyle, PointStyle};

// =============================================================================
// Scene Graph: everything the backend needs, already resolved
// =============================================================================

#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub tight: bool,
    pub x_axis: XAxis,
    pub y_axis: YAxis,
    /// Present only when a secondary selection was made
    pub y2_axis: Option<YAxis>,
    pub primary: Vec<SeriesScene>,
    pub secondary: Vec<SeriesScene>,
    pub legend: LegendScene,
}

impl SceneGraph {
    pub fn series_count(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }
}

#[derive(Debug, Clone)]
pub struct XAxis {
    pub range: (f64, f64),
    pub label: Option<String>,
    pub major_ticks: Vec<f64>,
    pub minor_ticks: Vec<f64>,
    /// Tick labels for a categorical axis, indexed by row position
    pub categories: Option<Vec<String>>,
    pub rotation: LabelRotation,
}

#[derive(Debug, Clone)]
pub struct YAxis {
    pub range: (f64, f64),
    pub label: Option<String>,
}

/// Tick label rotations the backend can draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelRotation {
    #[default]
    None,
    Rotate90,
    Rotate180,
    Rotate270,
}

/// One plotted column
#[derive(Debug, Clone)]
pub struct SeriesScene {
    pub name: String,
    /// Runs of consecutive present points; a missing cell starts a new run
    pub segments: Vec<Vec<(f64, f64)>>,
    /// `None` in scatter mode
    pub line: Option<LineStyle>,
    /// `None` when no marker applies
    pub markers: Option<PointStyle>,
}

impl SeriesScene {
    pub fn points(&self) -> impl Iterator<Item = &(f64, f64)> + '_ {
        self.segments.iter().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendMode {
    /// A single axes: the usual per-axes legend
    Standard,
    /// Dual axes: one legend covering both axes, anchored to the primary plot area
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendScene {
    pub mode: LegendMode,
    pub location: LegendLoc,
}
