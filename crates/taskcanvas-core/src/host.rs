//! Contract between the interaction engine and the application that owns
//! the task and group state.

use crate::input::InteractionMode;
use crate::model::{Group, GroupId, Task, TaskId};
use crate::selection::Selection;
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// New top-left position for a task or group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: Uuid,
    pub x: f64,
    pub y: f64,
}

/// New size for a group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeUpdate {
    pub id: GroupId,
    pub width: f64,
    pub height: f64,
}

/// The application state seen by the engine.
///
/// Every engine call receives the host by reference, so reads always observe
/// the latest viewport, entities and selection. The engine never mutates
/// entities itself: all changes go through the `on_*` sinks and the host
/// applies them before the next read.
pub trait CanvasHost {
    /// Current viewport.
    fn viewport(&self) -> Viewport;

    /// Replace the viewport (pan and zoom gestures).
    fn set_viewport(&mut self, viewport: Viewport);

    /// Snapshot of all tasks.
    fn tasks(&self) -> &[Task];

    /// Snapshot of all groups.
    fn groups(&self) -> &[Group];

    /// Current selection.
    fn selection(&self) -> &Selection;

    /// Replace the selection.
    fn set_selection(&mut self, selection: Selection);

    /// Whether presses act on entities or always pan.
    fn interaction_mode(&self) -> InteractionMode;

    /// Batched task moves.
    fn on_tasks_update(&mut self, updates: &[PositionUpdate]);

    /// Batched group moves.
    fn on_groups_update(&mut self, updates: &[PositionUpdate]);

    /// Group resize.
    fn on_group_resize(&mut self, update: SizeUpdate);

    /// Commit an undo checkpoint. Called once per mutating gesture, before
    /// the first update of that gesture.
    fn push_history(&mut self);

    /// A connection gesture was released over `target`.
    fn on_connect(&mut self, source: TaskId, target: TaskId);
}
