//! Hit testing: which task, group or handle lies under a point.

use crate::input::PointerTarget;
use crate::model::{Group, Task, rect_contains};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size};

/// Connection handle hit radius in screen pixels.
pub const CONNECTION_HANDLE_RADIUS_PX: f64 = 10.0;
/// Side of the square group resize handle in screen pixels.
pub const RESIZE_HANDLE_SIZE_PX: f64 = 16.0;

/// Center of a task's connection handle (bottom-center of its rectangle).
pub fn connection_handle_position(task: &Task) -> Point {
    let rect = task.rect();
    Point::new(rect.center().x, rect.y1)
}

/// The resize handle of a group: a square on its bottom-right corner whose
/// on-screen size is constant across zoom levels.
pub fn resize_handle_rect(group: &Group, viewport: &Viewport) -> Rect {
    let side = viewport.screen_len_to_world(RESIZE_HANDLE_SIZE_PX);
    let rect = group.rect();
    Rect::from_center_size(Point::new(rect.x1, rect.y1), Size::new(side, side))
}

/// Check if a world point lies within `radius` of `center`.
fn within_radius(point: Point, center: Point, radius: f64) -> bool {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    dx * dx + dy * dy <= radius * radius
}

/// Classify a world-space point. Handle sizes follow the viewport zoom.
///
/// Later entries in `tasks` and `groups` are drawn on top. Tasks are drawn
/// above groups, and handles take priority over bodies.
pub fn hit_test(
    point: Point,
    tasks: &[Task],
    groups: &[Group],
    viewport: &Viewport,
) -> PointerTarget {
    let handle_radius = viewport.screen_len_to_world(CONNECTION_HANDLE_RADIUS_PX);

    for task in tasks.iter().rev() {
        if within_radius(point, connection_handle_position(task), handle_radius) {
            return PointerTarget::TaskConnectionHandle(task.id());
        }
        if rect_contains(task.rect(), point) {
            return PointerTarget::Task(task.id());
        }
    }

    for group in groups.iter().rev() {
        if rect_contains(resize_handle_rect(group, viewport), point) {
            return PointerTarget::GroupResizeHandle(group.id());
        }
        if rect_contains(group.rect(), point) {
            return PointerTarget::Group(group.id());
        }
    }

    PointerTarget::Background
}
