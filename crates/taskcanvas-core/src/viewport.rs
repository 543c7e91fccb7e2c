//! Viewport module for pan/zoom transforms.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom factor.
pub const MIN_SCALE: f64 = 0.1;
/// Maximum allowed zoom factor.
pub const MAX_SCALE: f64 = 5.0;

/// Viewport state of the canvas.
///
/// `x`/`y` are the pan offset in screen pixels and `scale` is the zoom factor.
/// A world point `w` appears on screen at `w * scale + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal pan offset (screen pixels).
    pub x: f64,
    /// Vertical pan offset (screen pixels).
    pub y: f64,
    /// Zoom factor (1.0 = 100%).
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl Viewport {
    /// Create a viewport with the given offset and scale.
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Pan offset as a vector.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Zoom factor guarded against zero, negative and non-finite values.
    pub fn effective_scale(&self) -> f64 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }

    /// Convert a screen point to canvas (world) coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        let scale = self.effective_scale();
        Point::new(
            (screen_point.x - self.x) / scale,
            (screen_point.y - self.y) / scale,
        )
    }

    /// Convert a canvas (world) point to screen coordinates.
    pub fn canvas_to_screen(&self, world_point: Point) -> Point {
        let scale = self.effective_scale();
        Point::new(
            world_point.x * scale + self.x,
            world_point.y * scale + self.y,
        )
    }

    /// Convert a screen-space distance to world units.
    pub fn screen_len_to_world(&self, len: f64) -> f64 {
        len / self.effective_scale()
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_scale = (self.effective_scale() * factor).clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_canvas(screen_point);
        self.scale = new_scale;

        // Shift the offset so world_point lands back under screen_point
        let new_screen = self.canvas_to_screen(world_point);
        self.x += screen_point.x - new_screen.x;
        self.y += screen_point.y - new_screen.y;
    }

    /// Reset to the origin at 100%.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Convert a screen point to canvas coordinates using `viewport`.
///
/// Free-function form of [`Viewport::screen_to_canvas`].
pub fn screen_to_canvas(screen_point: Point, viewport: &Viewport) -> Point {
    viewport.screen_to_canvas(screen_point)
}
