use crate::geometry::Size;
use crate::render::ConstantProvider;
use serde::{Deserialize, Serialize};
use std::fs;

/// Grid settings used when snapping block positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub spacing: f64,
    pub snap: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            spacing: 0.0,
            snap: false,
        }
    }
}

impl GridOptions {
    /// Snaps a coordinate to the nearest grid point. Grid points sit at the centre
    /// of each cell, so with a spacing of 20 the origin snaps to 10.
    pub fn snap_value(&self, value: f64) -> f64 {
        if !self.snap || self.spacing <= 0.0 {
            return value;
        }
        let half = self.spacing / 2.0;
        // Rounds half up, so -0.5 cells snaps to the cell at 0.
        ((value - half) / self.spacing + 0.5).floor() * self.spacing + half
    }
}

/// Zoom limits and behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomOptions {
    pub start_scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale factor applied per zoom step.
    pub scale_speed: f64,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self {
            start_scale: 1.0,
            min_scale: 0.3,
            max_scale: 3.0,
            scale_speed: 1.2,
        }
    }
}

/// Which path object variant the renderer creates for each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    /// One outline path per block.
    Basic,
    /// Outline plus light and dark accent paths.
    #[default]
    Geras,
}

/// Configuration of a workspace.
///
/// Every field has a default, so a JSON file only needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceOptions {
    pub rtl: bool,
    pub grid: GridOptions,
    pub zoom: ZoomOptions,
    /// Size of the visible area in pixels.
    pub view: Size,
    pub renderer: RendererKind,
    pub constants: ConstantProvider,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            rtl: false,
            grid: GridOptions::default(),
            zoom: ZoomOptions::default(),
            view: Size::new(400.0, 400.0),
            renderer: RendererKind::default(),
            constants: ConstantProvider::default(),
        }
    }
}

impl WorkspaceOptions {
    /// Load options from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let options = serde_json::from_str(&content)?;
        Ok(options)
    }

    pub fn with_rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    pub fn with_grid(mut self, spacing: f64, snap: bool) -> Self {
        self.grid = GridOptions { spacing, snap };
        self
    }

    pub fn with_renderer(mut self, renderer: RendererKind) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_view_size(mut self, width: f64, height: f64) -> Self {
        self.view = Size::new(width, height);
        self
    }
}
