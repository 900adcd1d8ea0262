// Command line arguments and their conversion into a validated PlotConfig

use crate::config::{
    parse_separator, AxisLimits, ColumnIntent, LegendLoc, OutputTarget, PlotConfig, ReadOptions,
    RenderConfig, Source, DEFAULT_HEIGHT, DEFAULT_TITLE, DEFAULT_WIDTH, MAX_DIMENSION,
};
use crate::error::PlotError;
use crate::style::SeriesStyles;
use clap::Parser;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "plotcsv")]
#[command(version)]
#[command(about = "Plot columns of CSV data as a line or scatter chart", long_about = None)]
pub struct Args {
    /// Input files; none or '-' reads standard input
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Write the chart here instead of displaying it (format from extension)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Field separator, a single character ('\t' or 'tab' for tabs)
    #[arg(long, default_value = ",")]
    pub sep: String,

    /// Read at most this many data rows from each input
    #[arg(long)]
    pub nrows: Option<usize>,

    /// Column index used for the x axis
    #[arg(long, default_value_t = 0)]
    pub xcol: usize,

    /// Columns to plot, by header name
    #[arg(long, value_delimiter = ',')]
    pub cols_by_name: Option<Vec<String>>,

    /// Columns to plot, by zero-based index
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub cols: Option<Vec<usize>>,

    /// Columns for the secondary y axis, by header name
    #[arg(long, value_delimiter = ',')]
    pub cols2_by_name: Option<Vec<String>>,

    /// Columns for the secondary y axis, by zero-based index
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub cols2: Option<Vec<usize>>,

    /// Series colors, wrapping around when shorter than the series
    #[arg(long, value_delimiter = ',')]
    pub color: Vec<String>,

    /// Secondary axis series colors
    #[arg(long, value_delimiter = ',')]
    pub color2: Vec<String>,

    /// Series markers (matplotlib codes such as o, s, ^, none)
    #[arg(long, value_delimiter = ',')]
    pub marker: Vec<String>,

    /// Secondary axis series markers
    #[arg(long, value_delimiter = ',')]
    pub marker2: Vec<String>,

    /// Marker sizes in points
    #[arg(long, value_delimiter = ',')]
    pub markersize: Vec<String>,

    /// Secondary axis marker sizes
    #[arg(long, value_delimiter = ',')]
    pub markersize2: Vec<String>,

    /// JSON object mapping column names to colors
    #[arg(long)]
    pub color_map: Option<String>,

    /// Legend labels for the plotted (non-x) columns
    #[arg(long, value_delimiter = ',')]
    pub clabels: Option<Vec<String>>,

    /// Draw unconnected markers
    #[arg(long)]
    pub scatter: bool,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub xlabel: Option<String>,

    #[arg(long)]
    pub ylabel: Option<String>,

    /// Label of the secondary y axis
    #[arg(long)]
    pub ylabel2: Option<String>,

    /// Suffix column names with the name of their input file
    #[arg(long)]
    pub suffix_names: bool,

    /// Legend location: a name such as 'upper left' or a code 0-10
    #[arg(long, default_value = "best")]
    pub legend_loc: String,

    /// Add gaussian noise to x values, scaled by this multiplier
    #[arg(long, num_args = 0..=1, default_missing_value = "0.1")]
    pub jitter: Option<f64>,

    /// Group by the first column and plot min/median/max of the others
    #[arg(long)]
    pub group: bool,

    /// Y axis limits: lower, or lower and upper
    #[arg(long, num_args = 1.., allow_negative_numbers = true)]
    pub ylim: Vec<f64>,

    /// Rotation of the x tick labels in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub xrotate: f64,

    /// Spacing of x ticks in x axis units
    #[arg(long)]
    pub tick_interval: Option<f64>,

    /// One x tick per x value
    #[arg(long)]
    pub allxticks: bool,

    /// Opacity of lines and markers, 0 to 1
    #[arg(long)]
    pub alpha: Option<f64>,

    #[arg(long)]
    pub linewidth: Option<f64>,

    /// Reduce the margins around the chart
    #[arg(long)]
    pub tight: bool,

    /// Image width in pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// Command used to display the chart when --out is not given. It should
    /// block until the chart is closed; the temporary image is then removed
    #[arg(long, env = "PLOTCSV_VIEWER")]
    pub viewer: Option<String>,

    /// Print debug output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Column name to color mapping accepted by --color-map
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct ColorMap(pub HashMap<String, String>);

impl Args {
    /// Validate every option and build the run configuration. Nothing is
    /// read from the inputs here.
    pub fn into_config(self) -> Result<PlotConfig, PlotError> {
        if let Some(json) = &self.color_map {
            let map: ColorMap = serde_json::from_str(json)
                .map_err(|e| PlotError::config(format!("--color-map is not a JSON object: {}", e)))?;
            debug!("color map with {} entries", map.0.len());
            return Err(PlotError::NotImplemented("--color-map"));
        }

        let ylim = AxisLimits::from_values(&self.ylim)?;
        let legend_loc: LegendLoc = self.legend_loc.parse()?;
        let separator = parse_separator(&self.sep)?;

        if let Some(step) = self.tick_interval {
            if step.is_nan() || step <= 0.0 {
                return Err(PlotError::config("--tick-interval must be positive"));
            }
        }
        if let Some(alpha) = self.alpha {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(PlotError::config("--alpha must be between 0 and 1"));
            }
        }
        if let Some(width) = self.linewidth {
            if width.is_nan() || width < 0.0 {
                return Err(PlotError::config("--linewidth must not be negative"));
            }
        }
        if let Some(multiplier) = self.jitter {
            if !multiplier.is_finite() {
                return Err(PlotError::config("--jitter must be a finite number"));
            }
        }
        if self.width == 0 || self.height == 0 {
            return Err(PlotError::config("--width and --height must be positive"));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(PlotError::config(format!(
                "--width and --height must be at most {} pixels",
                MAX_DIMENSION
            )));
        }

        let secondary = if self.cols2_by_name.is_some() || self.cols2.is_some() {
            Some(ColumnIntent::from_options(self.cols2_by_name, self.cols2))
        } else {
            None
        };
        if self.group && secondary.is_some() {
            return Err(PlotError::config(
                "--group cannot be combined with a secondary axis",
            ));
        }

        let styles = SeriesStyles::from_lists(&self.color, &self.marker, &self.markersize)?;
        let styles2 = SeriesStyles::from_lists(&self.color2, &self.marker2, &self.markersize2)?;

        let sources = if self.inputs.is_empty() {
            vec![Source::Stdin]
        } else {
            self.inputs.iter().map(|p| Source::from_arg(p)).collect()
        };

        Ok(PlotConfig {
            sources,
            read: ReadOptions {
                separator,
                nrows: self.nrows,
                suffix_names: self.suffix_names,
            },
            xcol: self.xcol,
            primary: ColumnIntent::from_options(self.cols_by_name, self.cols),
            secondary,
            labels: self.clabels,
            group: self.group,
            jitter: self.jitter,
            styles,
            styles2,
            render: RenderConfig {
                title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                xlabel: self.xlabel,
                ylabel: self.ylabel,
                ylabel2: self.ylabel2,
                ylim,
                tick_interval: self.tick_interval,
                all_x_ticks: self.allxticks,
                xrotate: self.xrotate,
                legend_loc,
                alpha: self.alpha,
                linewidth: self.linewidth,
                scatter: self.scatter,
                tight: self.tight,
                width: self.width,
                height: self.height,
            },
            output: self.out.map_or(OutputTarget::Display, OutputTarget::File),
            viewer: self.viewer,
        })
    }
}

/// Warn when standard input is a source and nothing is piped into it
pub fn warn_if_interactive_stdin(config: &PlotConfig) {
    if stdin_needs_warning(&config.sources, std::io::stdin().is_terminal()) {
        warn!("reading from standard input...");
    }
}

fn stdin_needs_warning(sources: &[Source], stdin_is_terminal: bool) -> bool {
    stdin_is_terminal && sources.contains(&Source::Stdin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("plotcsv").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).into_config().unwrap();
        assert_eq!(config.sources, vec![Source::Stdin]);
        assert_eq!(config.output, OutputTarget::Display);
        assert_eq!(config.primary, ColumnIntent::All);
        assert_eq!(config.secondary, None);
        assert_eq!(config.render.title, DEFAULT_TITLE);
        assert_eq!((config.render.width, config.render.height), (1200, 800));
    }

    #[test]
    fn test_jitter_default_value() {
        assert_eq!(parse(&["--jitter"]).jitter, Some(0.1));
        assert_eq!(parse(&["--jitter", "0.5"]).jitter, Some(0.5));
        assert_eq!(parse(&[]).jitter, None);
    }

    #[test]
    fn test_ylim_arity() {
        let one = parse(&["--ylim", "-1"]).into_config().unwrap();
        assert_eq!(one.render.ylim, Some(AxisLimits::Lower(-1.0)));
        let two = parse(&["--ylim", "0", "10"]).into_config().unwrap();
        assert_eq!(two.render.ylim, Some(AxisLimits::Range(0.0, 10.0)));
        let err = parse(&["--ylim", "0", "1", "2"]).into_config().unwrap_err();
        assert!(err.to_string().contains("one or two"));
    }

    #[test]
    fn test_column_lists() {
        let config = parse(&["--cols", "1,3", "--cols2-by-name", "load", "a.csv"])
            .into_config()
            .unwrap();
        assert_eq!(config.primary, ColumnIntent::Indices(vec![1, 3]));
        assert_eq!(config.secondary, Some(ColumnIntent::Names(vec!["load".into()])));
        assert_eq!(config.sources, vec![Source::File("a.csv".into())]);

        let spaced = parse(&["--cols", "1", "2", "--", "b.csv"]);
        assert_eq!(spaced.cols, Some(vec![1, 2]));
    }

    #[test]
    fn test_color_map_not_implemented() {
        let err = parse(&["--color-map", r#"{"a": "red"}"#]).into_config().unwrap_err();
        assert!(matches!(err, PlotError::NotImplemented(_)));
        assert!(err.to_string().contains("not implemented"));
    }

    #[test]
    fn test_invalid_options_rejected() {
        assert!(parse(&["--color", "notacolor"]).into_config().is_err());
        assert!(parse(&["--marker", "?"]).into_config().is_err());
        assert!(parse(&["--legend-loc", "nowhere"]).into_config().is_err());
        assert!(parse(&["--alpha", "1.5"]).into_config().is_err());
        assert!(parse(&["--tick-interval", "0"]).into_config().is_err());
        assert!(parse(&["--sep", ";;"]).into_config().is_err());
        assert!(parse(&["--group", "--cols2", "2"]).into_config().is_err());
    }

    #[test]
    fn test_oversized_image_rejected() {
        let err = parse(&["--width", "40000", "--height", "40000"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, PlotError::Configuration(_)));
        assert!(parse(&["--width", "0"]).into_config().is_err());
        let max = MAX_DIMENSION.to_string();
        assert!(parse(&["--width", max.as_str(), "--height", max.as_str()]).into_config().is_ok());
    }

    #[test]
    fn test_stdin_warning_only_for_terminal_stdin() {
        let stdin = vec![Source::Stdin];
        let file = vec![Source::File("a.csv".into())];
        let mixed = vec![Source::File("a.csv".into()), Source::Stdin];
        assert!(stdin_needs_warning(&stdin, true));
        assert!(!stdin_needs_warning(&stdin, false));
        assert!(!stdin_needs_warning(&file, true));
        assert!(stdin_needs_warning(&mixed, true));
    }

    #[test]
    fn test_out_selects_file_target() {
        let config = parse(&["--out", "chart.svg", "-"]).into_config().unwrap();
        assert_eq!(config.output, OutputTarget::File("chart.svg".into()));
        assert_eq!(config.sources, vec![Source::Stdin]);
    }
}
