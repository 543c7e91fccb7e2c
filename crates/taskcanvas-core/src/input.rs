//! Input vocabulary for mouse/touch/keyboard events.

use crate::model::{GroupId, TaskId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Modifiers with only shift held.
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Global interaction mode, toggled by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    /// Presses select, drag, resize and connect.
    #[default]
    Pointer,
    /// Every left press pans.
    Hand,
}

impl InteractionMode {
    pub fn toggle(self) -> Self {
        match self {
            InteractionMode::Pointer => InteractionMode::Hand,
            InteractionMode::Hand => InteractionMode::Pointer,
        }
    }
}

/// What lies under the pointer at press or release time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerTarget {
    /// Empty canvas.
    Background,
    /// A task's body.
    Task(TaskId),
    /// A task's connection (source) handle.
    TaskConnectionHandle(TaskId),
    /// A group's body.
    Group(GroupId),
    /// A group's resize handle.
    GroupResizeHandle(GroupId),
}

impl PointerTarget {
    /// The task under the pointer, if any part of a task was hit.
    pub fn task(&self) -> Option<TaskId> {
        match *self {
            PointerTarget::Task(id) | PointerTarget::TaskConnectionHandle(id) => Some(id),
            _ => None,
        }
    }
}

/// Pointer event type for unified mouse handling.
///
/// Positions are in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        target: PointerTarget,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        target: PointerTarget,
        modifiers: Modifiers,
    },
    Cancel,
    Scroll {
        position: Point,
        delta: Vec2,
        modifiers: Modifiers,
    },
}

/// Phase of a touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

/// A single touch contact update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Stable identifier of the contact for its lifetime.
    pub id: u64,
    pub phase: TouchPhase,
    /// Screen position.
    pub position: Point,
    /// What lies under the contact.
    pub target: PointerTarget,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_pointer_target_task() {
        let id = Uuid::new_v4();
        assert_eq!(PointerTarget::Task(id).task(), Some(id));
        assert_eq!(PointerTarget::TaskConnectionHandle(id).task(), Some(id));
        assert_eq!(PointerTarget::Group(id).task(), None);
        assert_eq!(PointerTarget::Background.task(), None);
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(InteractionMode::Pointer.toggle(), InteractionMode::Hand);
        assert_eq!(InteractionMode::Hand.toggle(), InteractionMode::Pointer);
    }

    #[test]
    fn test_command_modifier() {
        let mac = Modifiers {
            meta: true,
            ..Modifiers::default()
        };
        assert!(mac.command());
        assert!(!Modifiers::shift().command());
    }
}
