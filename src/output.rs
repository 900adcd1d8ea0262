// Output: write the rendered chart to a file or hand it to a viewer

use crate::graph;
use crate::ir::SceneGraph;
use anyhow::{bail, Context, Result};
use image::ImageFormat;
use log::{debug, info};
use plotters::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Svg,
    /// Raster formats encoded by the image crate from an RGB buffer
    Raster(ImageFormat),
}

impl OutputFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if ext == "svg" {
            return Ok(OutputFormat::Svg);
        }
        match ImageFormat::from_path(path) {
            Ok(
                format @ (ImageFormat::Png
                | ImageFormat::Jpeg
                | ImageFormat::Bmp
                | ImageFormat::Tiff
                | ImageFormat::Tga
                | ImageFormat::Pnm),
            ) => Ok(OutputFormat::Raster(format)),
            _ => bail!(
                "cannot determine output format from '{}': use an extension such as .png, .svg or .jpg",
                path.display()
            ),
        }
    }
}

/// What happened to the chart
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Written(PathBuf),
    Displayed(PathBuf),
}

/// Something that can show a PNG file to the user
pub trait Viewer {
    fn show(&self, path: &Path) -> Result<()>;

    /// Whether `show` returns only once the user is done with the image
    fn blocks(&self) -> bool {
        true
    }
}

/// Runs an external command with the image path as its last argument
#[derive(Debug, Clone)]
pub struct CommandViewer {
    program: String,
    args: Vec<String>,
    blocking: bool,
}

impl CommandViewer {
    /// `command` is split on whitespace; `None` picks the platform opener
    pub fn new(command: Option<&str>) -> Self {
        match command.map(str::trim).filter(|c| !c.is_empty()) {
            Some(command) => {
                let mut parts = command.split_whitespace().map(str::to_string);
                let program = parts.next().unwrap_or_default();
                Self {
                    program,
                    args: parts.collect(),
                    blocking: true,
                }
            }
            None => Self::platform_default(),
        }
    }

    fn platform_default() -> Self {
        let (program, args, blocking): (&str, &[&str], bool) = if cfg!(target_os = "macos") {
            ("open", &["-W"], true)
        } else if cfg!(windows) {
            ("cmd", &["/C", "start", "/WAIT", ""], true)
        } else {
            // xdg-open hands the file over and returns immediately
            ("xdg-open", &[], false)
        };
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            blocking,
        }
    }
}

impl Viewer for CommandViewer {
    fn show(&self, path: &Path) -> Result<()> {
        debug!("showing {} with {} {:?}", path.display(), self.program, self.args);
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .with_context(|| format!("Failed to launch viewer '{}'", self.program))?;
        if !status.success() {
            bail!("viewer '{}' exited with {}", self.program, status);
        }
        Ok(())
    }

    fn blocks(&self) -> bool {
        self.blocking
    }
}

/// Render `scene` to `path`, format chosen by extension
pub fn render_to_file(scene: &SceneGraph, path: &Path) -> Result<()> {
    match OutputFormat::from_path(path)? {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path, (scene.width, scene.height)).into_drawing_area();
            graph::draw_scene(&root, scene)?;
            root.present()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        OutputFormat::Raster(ImageFormat::Png) => {
            let png = graph::render_png(scene)?;
            fs::write(path, png).with_context(|| format!("Failed to write {}", path.display()))?;
        }
        OutputFormat::Raster(format) => {
            let buffer = graph::rasterize(scene)?;
            image::save_buffer_with_format(
                path,
                &buffer,
                scene.width,
                scene.height,
                image::ColorType::Rgb8,
                format,
            )
            .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }
    info!("wrote {}", path.display());
    Ok(())
}

/// Write the chart to a PNG in the temp directory and show it. The image is
/// removed once a blocking viewer returns; a non-blocking opener may still be
/// reading it, so in that case it stays behind.
pub fn display(scene: &SceneGraph, viewer: &dyn Viewer) -> Result<PathBuf> {
    let png = graph::render_png(scene)?;

    let mut file = tempfile::Builder::new()
        .prefix("plotcsv-")
        .suffix(".png")
        .tempfile()
        .context("Failed to create temporary file")?;
    file.write_all(&png)
        .context("Failed to write temporary image")?;
    let temp_path = file.into_temp_path();

    viewer.show(&temp_path)?;

    let path = temp_path.to_path_buf();
    if viewer.blocks() {
        temp_path
            .close()
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    } else {
        temp_path.keep().context("Failed to keep temporary image")?;
        debug!("left {} for the viewer", path.display());
    }
    Ok(path)
}
