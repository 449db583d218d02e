//! # Screen Projection
//!
//! Maps grid positions onto the 2D drawing surface. Grid lines sit 100
//! pixel-units apart before zoom; the view state adds a zoom factor and a
//! scroll offset:
//!
//! ```text
//! x = col * 100 * zoom + scroll_x
//! y = row * 100 * zoom + scroll_y
//! ```
//!
//! Member silhouettes are scaled from millimeters by `mm / 2000 * zoom`.
//!
//! View state is an explicit value passed into every call, never ambient.
//!
//! ## Example
//!
//! ```rust
//! use grid_core::projection::{project, ViewState};
//!
//! let view = ViewState { zoom: 2.0, scroll_x: 10.0, scroll_y: 10.0 };
//! let p = project(1, 2, &view);
//! assert_eq!((p.x, p.y), (410.0, 210.0));
//! ```

use serde::{Deserialize, Serialize};

/// Distance between adjacent grid lines at zoom 1.0
pub const GRID_SPACING_PX: f32 = 100.0;

/// Millimeters per pixel-unit of member silhouette at zoom 1.0
pub const MM_PER_SILHOUETTE_PX: f32 = 2000.0;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.0;

/// Multiplicative change per zoom step
pub const ZOOM_STEP: f32 = 1.2;

/// A point on the drawing surface, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        ScreenPoint { x, y }
    }
}

/// An axis-aligned rectangle on the drawing surface, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        ScreenRect { x, y, width, height }
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered(center: ScreenPoint, width: f32, height: f32) -> Self {
        ScreenRect {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Fractional grid coordinates (inverse of [`project`])
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub row: f32,
    pub col: f32,
}

impl GridPoint {
    /// Nearest grid intersection `(row, col)`, if it is non-negative
    pub fn nearest(&self) -> Option<(u32, u32)> {
        let (row, col) = (self.row.round(), self.col.round());
        if row < 0.0 || col < 0.0 {
            None
        } else {
            Some((row as u32, col as u32))
        }
    }
}

/// Zoom and scroll of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub zoom: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            zoom: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

impl ViewState {
    /// One zoom step in, clamped to [`MAX_ZOOM`]
    pub fn zoomed_in(self) -> Self {
        self.with_zoom(self.zoom * ZOOM_STEP)
    }

    /// One zoom step out, clamped to [`MIN_ZOOM`]
    pub fn zoomed_out(self) -> Self {
        self.with_zoom(self.zoom / ZOOM_STEP)
    }

    pub fn with_zoom(self, zoom: f32) -> Self {
        ViewState {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..self
        }
    }

    /// Accumulate a wheel delta; divided by zoom so panning speed
    /// does not depend on magnification.
    pub fn scrolled_by(self, dx: f32, dy: f32) -> Self {
        ViewState {
            scroll_x: self.scroll_x + dx / self.zoom,
            scroll_y: self.scroll_y + dy / self.zoom,
            ..self
        }
    }
}

/// Pixel position of grid point `(row, col)`.
pub fn project(row: u32, col: u32, view: &ViewState) -> ScreenPoint {
    project_f(row as f32, col as f32, view)
}

/// [`project`] for fractional grid coordinates (margins, label offsets).
pub fn project_f(row: f32, col: f32, view: &ViewState) -> ScreenPoint {
    ScreenPoint {
        x: col * GRID_SPACING_PX * view.zoom + view.scroll_x,
        y: row * GRID_SPACING_PX * view.zoom + view.scroll_y,
    }
}

/// Fractional grid coordinates under a pixel position.
pub fn unproject(point: ScreenPoint, view: &ViewState) -> GridPoint {
    let scale = GRID_SPACING_PX * view.zoom;
    GridPoint {
        row: (point.y - view.scroll_y) / scale,
        col: (point.x - view.scroll_x) / scale,
    }
}

/// Silhouette size in pixels of a member dimension given in millimeters.
pub fn silhouette_px(dimension_mm: f64, zoom: f32) -> f32 {
    (dimension_mm as f32 / MM_PER_SILHOUETTE_PX) * zoom
}
