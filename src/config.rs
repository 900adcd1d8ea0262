// Resolved run configuration, built once from the command line

use crate::error::PlotError;
use crate::style::SeriesStyles;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_TITLE: &str = "Some chart (use --title to specify title)";
pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 800;
/// Largest accepted image side in pixels
pub const MAX_DIMENSION: u32 = 16_384;
pub const DEFAULT_JITTER: f64 = 0.1;
pub const JITTER_SEED: u64 = 123;

/// Where a table comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            Source::Stdin
        } else {
            Source::File(arg.to_path_buf())
        }
    }

    /// Name used when suffixing column names: the file's base name
    pub fn display_name(&self) -> String {
        match self {
            Source::Stdin => "<stdin>".to_string(),
            Source::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    pub separator: u8,
    pub nrows: Option<usize>,
    pub suffix_names: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            nrows: None,
            suffix_names: false,
        }
    }
}

/// Parse a `--sep` value: one ASCII character, or `\t` / `tab`
pub fn parse_separator(sep: &str) -> Result<u8, PlotError> {
    match sep {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        s => Err(PlotError::config(format!(
            "separator must be a single ASCII character, got '{}'",
            s
        ))),
    }
}

/// Which columns the user asked for on one axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnIntent {
    All,
    Names(Vec<String>),
    Indices(Vec<usize>),
}

impl ColumnIntent {
    /// Names take precedence over indices; neither means every column
    pub fn from_options(names: Option<Vec<String>>, indices: Option<Vec<usize>>) -> Self {
        match (names, indices) {
            (Some(names), _) if !names.is_empty() => ColumnIntent::Names(names),
            (_, Some(indices)) if !indices.is_empty() => ColumnIntent::Indices(indices),
            _ => ColumnIntent::All,
        }
    }
}

/// Primary y axis limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisLimits {
    /// Lower bound only; the upper bound follows the data
    Lower(f64),
    Range(f64, f64),
}

impl AxisLimits {
    pub fn from_values(values: &[f64]) -> Result<Option<Self>, PlotError> {
        match values {
            [] => Ok(None),
            [lower] => Ok(Some(AxisLimits::Lower(*lower))),
            [lower, upper] => Ok(Some(AxisLimits::Range(*lower, *upper))),
            _ => Err(PlotError::config("provide one or two args to --ylim")),
        }
    }
}

/// Legend placement, using matplotlib's location names and codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendLoc {
    #[default]
    Best,
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
    Right,
    CenterLeft,
    CenterRight,
    LowerCenter,
    UpperCenter,
    Center,
}

impl FromStr for LegendLoc {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let loc = match s.trim().to_lowercase().as_str() {
            "best" | "0" => LegendLoc::Best,
            "upper right" | "1" => LegendLoc::UpperRight,
            "upper left" | "2" => LegendLoc::UpperLeft,
            "lower left" | "3" => LegendLoc::LowerLeft,
            "lower right" | "4" => LegendLoc::LowerRight,
            "right" | "5" => LegendLoc::Right,
            "center left" | "6" => LegendLoc::CenterLeft,
            "center right" | "7" => LegendLoc::CenterRight,
            "lower center" | "8" => LegendLoc::LowerCenter,
            "upper center" | "9" => LegendLoc::UpperCenter,
            "center" | "10" => LegendLoc::Center,
            other => {
                return Err(PlotError::config(format!(
                    "unknown legend location '{}'",
                    other
                )))
            }
        };
        Ok(loc)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
    File(PathBuf),
    Display,
}

/// Everything the renderer needs besides the data. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub title: String,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub ylabel2: Option<String>,
    pub ylim: Option<AxisLimits>,
    pub tick_interval: Option<f64>,
    pub all_x_ticks: bool,
    pub xrotate: f64,
    pub legend_loc: LegendLoc,
    pub alpha: Option<f64>,
    pub linewidth: Option<f64>,
    pub scatter: bool,
    pub tight: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            xlabel: None,
            ylabel: None,
            ylabel2: None,
            ylim: None,
            tick_interval: None,
            all_x_ticks: false,
            xrotate: 0.0,
            legend_loc: LegendLoc::Best,
            alpha: None,
            linewidth: None,
            scatter: false,
            tight: false,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Fully validated configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub sources: Vec<Source>,
    pub read: ReadOptions,
    pub xcol: usize,
    pub primary: ColumnIntent,
    pub secondary: Option<ColumnIntent>,
    pub labels: Option<Vec<String>>,
    pub group: bool,
    pub jitter: Option<f64>,
    pub styles: SeriesStyles,
    pub styles2: SeriesStyles,
    pub render: RenderConfig,
    pub output: OutputTarget,
    pub viewer: Option<String>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            sources: vec![Source::Stdin],
            read: ReadOptions::default(),
            xcol: 0,
            primary: ColumnIntent::All,
            secondary: None,
            labels: None,
            group: false,
            jitter: None,
            styles: SeriesStyles::default(),
            styles2: SeriesStyles::default(),
            render: RenderConfig::default(),
            output: OutputTarget::Display,
            viewer: None,
        }
    }
}
