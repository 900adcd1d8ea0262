// Per-series styling: colors, markers, marker sizes

use crate::error::PlotError;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{alpha1, char, digit1},
    combinator::{all_consuming, map_opt, map_res},
    sequence::preceded,
    IResult,
};
use plotters::style::RGBColor;
use std::f64::consts::PI;
use std::str::FromStr;

/// Matplotlib's default `tab10` cycle, in order
pub const CATEGORY10: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

const TABLEAU_NAMES: [&str; 10] = [
    "blue", "orange", "green", "red", "purple", "brown", "pink", "gray", "olive", "cyan",
];

/// Default color of the `n`th series drawn (0-based, across both axes)
pub fn default_color(n: usize) -> RGBColor {
    CATEGORY10[n % CATEGORY10.len()]
}

// === Color Parsing ===

/// Parse a color: `#RRGGBB`, `#RGB`, cycle references `C0`..`C9`,
/// `tab:<name>`, single-letter shorthands and common color names.
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    all_consuming(alt((hex_color, cycle_color, tableau_color, named_color)))(color_str.trim())
        .ok()
        .map(|(_, color)| color)
}

fn hex_color(input: &str) -> IResult<&str, RGBColor> {
    map_opt(
        preceded(
            char('#'),
            take_while_m_n(3, 6, |c: char| c.is_ascii_hexdigit()),
        ),
        |hex: &str| match hex.len() {
            6 => Some(RGBColor(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            3 => Some(RGBColor(
                u8::from_str_radix(&hex[0..1], 16).ok()? * 17,
                u8::from_str_radix(&hex[1..2], 16).ok()? * 17,
                u8::from_str_radix(&hex[2..3], 16).ok()? * 17,
            )),
            _ => None,
        },
    )(input)
}

fn cycle_color(input: &str) -> IResult<&str, RGBColor> {
    map_res(preceded(char('C'), digit1), |n: &str| {
        n.parse::<usize>().map(default_color)
    })(input)
}

fn tableau_color(input: &str) -> IResult<&str, RGBColor> {
    map_opt(preceded(tag("tab:"), alpha1), |name: &str| {
        let name = if name == "grey" { "gray" } else { name };
        TABLEAU_NAMES
            .iter()
            .position(|&n| n == name)
            .map(default_color)
    })(input)
}

fn named_color(input: &str) -> IResult<&str, RGBColor> {
    map_opt(alpha1, |name: &str| match name {
        // matplotlib single-letter shorthands are case sensitive
        "b" => Some(RGBColor(0, 0, 255)),
        "g" => Some(RGBColor(0, 128, 0)),
        "r" => Some(RGBColor(255, 0, 0)),
        "c" => Some(RGBColor(0, 191, 191)),
        "m" => Some(RGBColor(191, 0, 191)),
        "y" => Some(RGBColor(191, 191, 0)),
        "k" => Some(RGBColor(0, 0, 0)),
        "w" => Some(RGBColor(255, 255, 255)),
        _ => match name.to_lowercase().as_str() {
            "white" => Some(RGBColor(255, 255, 255)),
            "black" => Some(RGBColor(0, 0, 0)),
            "red" => Some(RGBColor(255, 0, 0)),
            "green" => Some(RGBColor(0, 128, 0)),
            "blue" => Some(RGBColor(0, 0, 255)),
            "yellow" => Some(RGBColor(255, 255, 0)),
            "cyan" => Some(RGBColor(0, 255, 255)),
            "magenta" => Some(RGBColor(255, 0, 255)),
            "orange" => Some(RGBColor(255, 165, 0)),
            "purple" => Some(RGBColor(128, 0, 128)),
            "pink" => Some(RGBColor(255, 192, 203)),
            "brown" => Some(RGBColor(139, 69, 19)),
            "navy" => Some(RGBColor(0, 0, 128)),
            "teal" => Some(RGBColor(0, 128, 128)),
            "olive" => Some(RGBColor(128, 128, 0)),
            "gray" | "grey" => Some(RGBColor(128, 128, 128)),
            "darkgray" | "darkgrey" => Some(RGBColor(64, 64, 64)),
            "lightgray" | "lightgrey" => Some(RGBColor(192, 192, 192)),
            _ => None,
        },
    })(input)
}

// === Markers ===

/// Marker shapes, named by their matplotlib codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Point,
    Pixel,
    Circle,
    Square,
    Diamond,
    ThinDiamond,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Star,
    Cross,
    Plus,
}

impl FromStr for Marker {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let marker = match s.trim() {
            "." | "point" => Marker::Point,
            "," | "pixel" => Marker::Pixel,
            "o" | "circle" => Marker::Circle,
            "s" | "square" => Marker::Square,
            "D" | "diamond" => Marker::Diamond,
            "d" | "thin_diamond" => Marker::ThinDiamond,
            "^" | "triangle" | "triangle_up" => Marker::TriangleUp,
            "v" | "triangle_down" => Marker::TriangleDown,
            "<" | "triangle_left" => Marker::TriangleLeft,
            ">" | "triangle_right" => Marker::TriangleRight,
            "*" | "star" => Marker::Star,
            "x" | "cross" => Marker::Cross,
            "+" | "plus" => Marker::Plus,
            other => {
                return Err(PlotError::config(format!(
                    "unknown marker '{}' (expected one of . , o s D d ^ v < > * x +)",
                    other
                )))
            }
        };
        Ok(marker)
    }
}

/// Parse one entry of a marker list; `none` and empty entries mean "no marker"
pub fn parse_marker(s: &str) -> Result<Option<Marker>, PlotError> {
    match s.trim() {
        "" | "none" | "None" => Ok(None),
        other => other.parse().map(Some),
    }
}

impl Marker {
    /// Polygon vertices, in pixels relative to the data point, for a marker
    /// whose matplotlib size (diameter in points) is `size`.
    pub fn outline(&self, size: f64) -> Vec<(i32, i32)> {
        // 100 dpi figure: points -> pixels, then diameter -> radius
        let r = (size * 100.0 / 72.0 / 2.0).max(1.0);
        let pts: Vec<(f64, f64)> = match self {
            Marker::Point => regular_polygon(12, (r * 0.5).max(1.0), 0.0),
            Marker::Pixel => vec![(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)],
            Marker::Circle => regular_polygon(16, r, 0.0),
            Marker::Square => {
                let h = r * 0.85;
                vec![(-h, -h), (h, -h), (h, h), (-h, h)]
            }
            Marker::Diamond => vec![(0.0, -r), (r, 0.0), (0.0, r), (-r, 0.0)],
            Marker::ThinDiamond => vec![(0.0, -r), (r * 0.6, 0.0), (0.0, r), (-r * 0.6, 0.0)],
            Marker::TriangleUp => regular_polygon(3, r, -PI / 2.0),
            Marker::TriangleDown => regular_polygon(3, r, PI / 2.0),
            Marker::TriangleLeft => regular_polygon(3, r, PI),
            Marker::TriangleRight => regular_polygon(3, r, 0.0),
            Marker::Star => (0..10)
                .map(|i| {
                    let radius = if i % 2 == 0 { r } else { r * 0.4 };
                    let angle = -PI / 2.0 + i as f64 * PI / 5.0;
                    (radius * angle.cos(), radius * angle.sin())
                })
                .collect(),
            Marker::Plus => plus_shape(r, 0.0),
            Marker::Cross => plus_shape(r, PI / 4.0),
        };
        pts.into_iter()
            .map(|(x, y)| (x.round() as i32, y.round() as i32))
            .collect()
    }
}

fn regular_polygon(n: usize, r: f64, start: f64) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let angle = start + i as f64 * 2.0 * PI / n as f64;
            (r * angle.cos(), r * angle.sin())
        })
        .collect()
}

fn plus_shape(r: f64, rotation: f64) -> Vec<(f64, f64)> {
    let t = (r / 4.0).max(1.0);
    let arm = [
        (t, -t),
        (r, -t),
        (r, t),
        (t, t),
        (t, r),
        (-t, r),
        (-t, t),
        (-r, t),
        (-r, -t),
        (-t, -t),
        (-t, -r),
        (t, -r),
    ];
    let (sin, cos) = rotation.sin_cos();
    arm.iter()
        .map(|&(x, y)| (x * cos - y * sin, x * sin + y * cos))
        .collect()
}

// === Series Styles ===

/// Style overrides for one series. `None` means "not set".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStyle {
    pub color: Option<RGBColor>,
    pub marker: Option<Marker>,
    pub marker_size: Option<f64>,
}

/// User-supplied style lists for one axis. Lists shorter than the number of
/// series wrap around: series `i` (1-based) uses entry `(i - 1) % len`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStyles {
    pub colors: Vec<RGBColor>,
    pub markers: Vec<Option<Marker>>,
    pub marker_sizes: Vec<f64>,
}

impl SeriesStyles {
    pub fn from_lists(
        colors: &[String],
        markers: &[String],
        marker_sizes: &[String],
    ) -> Result<Self, PlotError> {
        let colors = colors
            .iter()
            .map(|c| {
                parse_color(c).ok_or_else(|| PlotError::config(format!("unknown color '{}'", c)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let markers = markers
            .iter()
            .map(|m| parse_marker(m))
            .collect::<Result<Vec<_>, _>>()?;
        let marker_sizes = marker_sizes
            .iter()
            .map(|s| {
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| *v >= 0.0)
                    .ok_or_else(|| PlotError::config(format!("invalid marker size '{}'", s)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            colors,
            markers,
            marker_sizes,
        })
    }

    /// Resolve the overrides for series `index` (1-based; 0 is the x column)
    pub fn resolve(&self, index: usize) -> SeriesStyle {
        debug_assert!(index > 0, "series indices start at 1");
        let idx = index.saturating_sub(1);
        SeriesStyle {
            color: wrap(&self.colors, idx).copied(),
            marker: wrap(&self.markers, idx).copied().flatten(),
            marker_size: wrap(&self.marker_sizes, idx).copied(),
        }
    }
}

fn wrap<T>(list: &[T], idx: usize) -> Option<&T> {
    if list.is_empty() {
        None
    } else {
        list.get(idx % list.len())
    }
}
