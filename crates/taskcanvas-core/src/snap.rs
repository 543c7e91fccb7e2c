//! Alignment snapping of a dragged rectangle against its siblings and the grid.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Soft grid spacing in world units.
pub const GRID_SIZE: f64 = 10.0;

/// Sibling snap threshold in screen pixels.
pub const SNAP_THRESHOLD_PX: f64 = 12.0;

/// Snap mode for aligning a dragged entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapMode {
    /// No snapping.
    None,
    /// Round to the grid only.
    Grid,
    /// Align with sibling edges and centers only.
    Siblings,
    /// Align with siblings, falling back to the grid per axis.
    #[default]
    All,
}

impl SnapMode {
    /// Cycle to the next snap mode.
    pub fn next(self) -> Self {
        match self {
            SnapMode::None => SnapMode::Grid,
            SnapMode::Grid => SnapMode::Siblings,
            SnapMode::Siblings => SnapMode::All,
            SnapMode::All => SnapMode::None,
        }
    }

    /// Check if grid snapping is enabled.
    pub fn snaps_to_grid(self) -> bool {
        matches!(self, SnapMode::Grid | SnapMode::All)
    }

    /// Check if sibling snapping is enabled.
    pub fn snaps_to_siblings(self) -> bool {
        matches!(self, SnapMode::Siblings | SnapMode::All)
    }

    /// Check if any snapping is enabled.
    pub fn is_enabled(self) -> bool {
        self != SnapMode::None
    }
}

/// Orientation of an alignment guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideKind {
    /// A horizontal line at `y = pos`.
    Horizontal,
    /// A vertical line at `x = pos`.
    Vertical,
}

/// A transient alignment indicator in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    pub kind: GuideKind,
    pub pos: f64,
}

impl GuideLine {
    pub fn horizontal(pos: f64) -> Self {
        Self {
            kind: GuideKind::Horizontal,
            pos,
        }
    }

    pub fn vertical(pos: f64) -> Self {
        Self {
            kind: GuideKind::Vertical,
            pos,
        }
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// The adjusted top-left position.
    pub point: Point,
    /// Whether the X coordinate locked onto a sibling.
    pub snapped_x: bool,
    /// Whether the Y coordinate locked onto a sibling.
    pub snapped_y: bool,
    /// One guide per axis that locked onto a sibling.
    pub guides: Vec<GuideLine>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
            guides: Vec::new(),
        }
    }

    /// Check if any sibling alignment occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Round a value to the nearest multiple of `grid_size`.
pub fn snap_value_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(
        snap_value_to_grid(point.x, grid_size),
        snap_value_to_grid(point.y, grid_size),
    )
}

/// A candidate alignment on one axis.
#[derive(Debug, Clone, Copy)]
struct AxisCandidate {
    /// New start coordinate of the dragged rectangle.
    origin: f64,
    /// Coordinate of the sibling line being aligned to.
    guide: f64,
    /// Distance the dragged rectangle would have to move.
    distance: f64,
}

/// The five alignments of a dragged span `[start, start + len]` against a
/// sibling span: start/start, start/end, end/start, end/end and center/center.
fn axis_candidates(start: f64, len: f64, sib_start: f64, sib_end: f64) -> [AxisCandidate; 5] {
    let sib_center = (sib_start + sib_end) / 2.0;
    let candidate = |origin: f64, guide: f64| AxisCandidate {
        origin,
        guide,
        distance: (origin - start).abs(),
    };
    [
        candidate(sib_start, sib_start),
        candidate(sib_end, sib_end),
        candidate(sib_start - len, sib_start),
        candidate(sib_end - len, sib_end),
        candidate(sib_center - len / 2.0, sib_center),
    ]
}

fn is_finite_rect(rect: &Rect) -> bool {
    rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite()
}

/// Resolve the snapped position of a dragged rectangle.
///
/// `proposed` is the rectangle at its unsnapped position and `siblings` the
/// rectangles of every entity that is not moving. Each axis independently
/// takes the closest sibling alignment within `threshold_px / scale` world
/// units; axes without a sibling match fall back to the grid when `mode`
/// allows it.
pub fn resolve_snap(
    proposed: Rect,
    siblings: impl IntoIterator<Item = Rect>,
    scale: f64,
    mode: SnapMode,
    threshold_px: f64,
    grid_size: f64,
) -> SnapResult {
    let origin = proposed.origin();
    if !mode.is_enabled() || !is_finite_rect(&proposed) {
        return SnapResult::none(origin);
    }

    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let threshold = threshold_px / scale;
    let width = proposed.width();
    let height = proposed.height();

    let mut best_x: Option<AxisCandidate> = None;
    let mut best_y: Option<AxisCandidate> = None;

    if mode.snaps_to_siblings() {
        for sibling in siblings.into_iter().filter(is_finite_rect) {
            for c in axis_candidates(proposed.x0, width, sibling.x0, sibling.x1) {
                if c.distance < threshold && best_x.is_none_or(|b| c.distance < b.distance) {
                    best_x = Some(c);
                }
            }
            for c in axis_candidates(proposed.y0, height, sibling.y0, sibling.y1) {
                if c.distance < threshold && best_y.is_none_or(|b| c.distance < b.distance) {
                    best_y = Some(c);
                }
            }
        }
    }

    let mut result = SnapResult::none(origin);

    match best_x {
        Some(c) => {
            result.point.x = c.origin;
            result.snapped_x = true;
            result.guides.push(GuideLine::vertical(c.guide));
        }
        None if mode.snaps_to_grid() => result.point.x = snap_value_to_grid(origin.x, grid_size),
        None => {}
    }

    match best_y {
        Some(c) => {
            result.point.y = c.origin;
            result.snapped_y = true;
            result.guides.push(GuideLine::horizontal(c.guide));
        }
        None if mode.snaps_to_grid() => result.point.y = snap_value_to_grid(origin.y, grid_size),
        None => {}
    }

    result
}
