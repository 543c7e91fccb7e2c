//! Positioned entities on the canvas: tasks and groups.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a task.
pub type TaskId = Uuid;
/// Unique identifier for a group.
pub type GroupId = Uuid;

/// Width used when a task has no (or an unusable) width.
pub const DEFAULT_TASK_WIDTH: f64 = 300.0;
/// Height used when a task has no (or an unusable) height.
pub const DEFAULT_TASK_HEIGHT: f64 = 150.0;
/// Smallest width a group can be resized to.
pub const MIN_GROUP_WIDTH: f64 = 200.0;
/// Smallest height a group can be resized to.
pub const MIN_GROUP_HEIGHT: f64 = 100.0;

/// Return `value` if it is a usable dimension, otherwise `fallback`.
pub fn sanitize_dimension(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => fallback,
    }
}

/// Return `value` if it is finite, otherwise zero.
pub fn sanitize_coordinate(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Axis-aligned overlap test.
///
/// Two rectangles overlap unless one lies entirely to the left, right,
/// above or below the other. Touching edges count as overlapping.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    !(a.x1 < b.x0 || a.x0 > b.x1 || a.y1 < b.y0 || a.y0 > b.y1)
}

/// Inclusive point-in-rectangle test.
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// A task node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub(crate) id: TaskId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Left edge in world coordinates.
    pub x: f64,
    /// Top edge in world coordinates.
    pub y: f64,
    /// Explicit width; `None` means [`DEFAULT_TASK_WIDTH`].
    #[serde(default)]
    pub width: Option<f64>,
    /// Explicit height; `None` means [`DEFAULT_TASK_HEIGHT`].
    #[serde(default)]
    pub height: Option<f64>,
    /// Parent task in the task tree.
    #[serde(default)]
    pub parent_id: Option<TaskId>,
}

impl Task {
    /// Create a new task at the given world position.
    pub fn new(title: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            x,
            y,
            width: None,
            height: None,
            parent_id: None,
        }
    }

    /// Builder-style explicit size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Builder-style parent link.
    pub fn with_parent(mut self, parent: TaskId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// The task's unique ID.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Top-left corner, with non-finite coordinates replaced by zero.
    pub fn position(&self) -> Point {
        Point::new(sanitize_coordinate(self.x), sanitize_coordinate(self.y))
    }

    /// Size with defaults substituted for missing or malformed dimensions.
    pub fn size(&self) -> Size {
        Size::new(
            sanitize_dimension(self.width, DEFAULT_TASK_WIDTH),
            sanitize_dimension(self.height, DEFAULT_TASK_HEIGHT),
        )
    }

    /// Bounding rectangle in world coordinates.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    /// Center point in world coordinates.
    pub fn center(&self) -> Point {
        self.rect().center()
    }
}

/// A colored container that visually groups tasks.
///
/// Containment is purely spatial: a task belongs to a group while its center
/// lies inside the group's rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub(crate) id: GroupId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Fill color as a CSS-style hex string.
    #[serde(default = "default_group_color")]
    pub color: String,
    /// Left edge in world coordinates.
    pub x: f64,
    /// Top edge in world coordinates.
    pub y: f64,
    /// Width in world units.
    pub width: f64,
    /// Height in world units.
    pub height: f64,
}

fn default_group_color() -> String {
    "#e0e7ff".to_string()
}

impl Group {
    /// Create a new group.
    pub fn new(title: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            color: default_group_color(),
            x,
            y,
            width,
            height,
        }
    }

    /// The group's unique ID.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Top-left corner, with non-finite coordinates replaced by zero.
    pub fn position(&self) -> Point {
        Point::new(sanitize_coordinate(self.x), sanitize_coordinate(self.y))
    }

    /// Size; malformed dimensions collapse to the resize floor.
    pub fn size(&self) -> Size {
        Size::new(
            sanitize_dimension(Some(self.width), MIN_GROUP_WIDTH),
            sanitize_dimension(Some(self.height), MIN_GROUP_HEIGHT),
        )
    }

    /// Bounding rectangle in world coordinates.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.size())
    }

    /// Whether the task's center point lies inside this group.
    pub fn contains_task(&self, task: &Task) -> bool {
        rect_contains(self.rect(), task.center())
    }
}
