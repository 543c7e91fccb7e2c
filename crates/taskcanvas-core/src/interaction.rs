//! Interaction state machine payloads.
//!
//! An [`InteractionState`] exists only while a gesture is in progress; every
//! variant carries exactly the data its gesture needs. Anchor and current
//! pointer positions are in screen coordinates, entity positions in world
//! coordinates.

use crate::host::{PositionUpdate, SizeUpdate};
use crate::model::{Group, GroupId, Task, TaskId};
use crate::selection::Marquee;
use kurbo::{Point, Size, Vec2};
use std::collections::HashMap;

/// Discriminant of [`InteractionState`], for logging and rendering decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Idle,
    Panning,
    Selecting,
    DraggingNode,
    DraggingGroup,
    ResizingGroup,
    Connecting,
}

/// Viewport panning.
#[derive(Debug, Clone, PartialEq)]
pub struct PanState {
    pub start: Point,
    pub current: Point,
    /// Pointer position at the previous recomputation.
    pub last: Point,
}

/// Moving one or more tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDrag {
    pub start: Point,
    pub current: Point,
    /// Tasks moving together.
    pub target_ids: Vec<TaskId>,
    /// The task actually grabbed; the snap reference.
    pub primary_id: TaskId,
    /// Size of the grabbed task at grab time.
    pub primary_size: Size,
    /// Starting positions, captured once.
    pub initial_positions: HashMap<TaskId, Point>,
}

impl NodeDrag {
    /// Snapshot the starting positions of `target_ids`.
    ///
    /// IDs that are not present in `tasks` are dropped. Returns `None` when no
    /// target exists.
    pub fn capture(
        start: Point,
        target_ids: &[TaskId],
        primary_id: TaskId,
        tasks: &[Task],
    ) -> Option<Self> {
        let initial_positions: HashMap<TaskId, Point> = tasks
            .iter()
            .filter(|task| target_ids.contains(&task.id()))
            .map(|task| (task.id(), task.position()))
            .collect();
        if initial_positions.is_empty() {
            return None;
        }

        let target_ids: Vec<TaskId> = target_ids
            .iter()
            .copied()
            .filter(|id| initial_positions.contains_key(id))
            .collect();
        let primary_id = if initial_positions.contains_key(&primary_id) {
            primary_id
        } else {
            target_ids[0]
        };
        let primary_size = tasks
            .iter()
            .find(|task| task.id() == primary_id)
            .map(Task::size)
            .unwrap_or_default();

        Some(Self {
            start,
            current: start,
            target_ids,
            primary_id,
            primary_size,
            initial_positions,
        })
    }

    /// Whether `id` is part of the moving set.
    pub fn is_moving(&self, id: TaskId) -> bool {
        self.initial_positions.contains_key(&id)
    }

    /// Starting position of the grabbed task.
    pub fn primary_origin(&self) -> Point {
        self.initial_positions
            .get(&self.primary_id)
            .copied()
            .unwrap_or_default()
    }

    /// Every target translated rigidly by `delta` from its start.
    pub fn translated(&self, delta: Vec2) -> Vec<PositionUpdate> {
        translate_all(&self.target_ids, &self.initial_positions, delta)
    }
}

/// Moving one or more groups and the tasks they contained at grab time.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDrag {
    pub start: Point,
    pub current: Point,
    pub target_ids: Vec<GroupId>,
    /// The group actually grabbed.
    pub primary_id: GroupId,
    pub initial_positions: HashMap<GroupId, Point>,
    /// Tasks whose center was inside a dragged group at grab time.
    pub dragged_children_ids: Vec<TaskId>,
    pub initial_children_positions: HashMap<TaskId, Point>,
}

impl GroupDrag {
    /// Snapshot group positions and freeze the set of contained tasks.
    pub fn capture(
        start: Point,
        target_ids: &[GroupId],
        primary_id: GroupId,
        groups: &[Group],
        tasks: &[Task],
    ) -> Option<Self> {
        let grabbed: Vec<&Group> = groups
            .iter()
            .filter(|group| target_ids.contains(&group.id()))
            .collect();
        if grabbed.is_empty() {
            return None;
        }

        let initial_positions: HashMap<GroupId, Point> = grabbed
            .iter()
            .map(|group| (group.id(), group.position()))
            .collect();
        let target_ids: Vec<GroupId> = target_ids
            .iter()
            .copied()
            .filter(|id| initial_positions.contains_key(id))
            .collect();
        let primary_id = if initial_positions.contains_key(&primary_id) {
            primary_id
        } else {
            target_ids[0]
        };

        let children: Vec<&Task> = tasks
            .iter()
            .filter(|task| grabbed.iter().any(|group| group.contains_task(task)))
            .collect();

        Some(Self {
            start,
            current: start,
            target_ids,
            primary_id,
            initial_positions,
            dragged_children_ids: children.iter().map(|task| task.id()).collect(),
            initial_children_positions: children
                .iter()
                .map(|task| (task.id(), task.position()))
                .collect(),
        })
    }

    /// Group positions translated by `delta`.
    pub fn translated_groups(&self, delta: Vec2) -> Vec<PositionUpdate> {
        translate_all(&self.target_ids, &self.initial_positions, delta)
    }

    /// Frozen children translated by `delta`.
    pub fn translated_children(&self, delta: Vec2) -> Vec<PositionUpdate> {
        translate_all(
            &self.dragged_children_ids,
            &self.initial_children_positions,
            delta,
        )
    }
}

/// Resizing a single group from its bottom-right handle.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupResize {
    pub start: Point,
    pub current: Point,
    pub group_id: GroupId,
    /// Size at grab time.
    pub initial_size: Size,
}

impl GroupResize {
    pub fn capture(start: Point, group_id: GroupId, groups: &[Group]) -> Option<Self> {
        let group = groups.iter().find(|group| group.id() == group_id)?;
        Some(Self {
            start,
            current: start,
            group_id,
            initial_size: group.size(),
        })
    }

    /// New size for a world-space pointer delta, clamped to `min_size`.
    pub fn resized(&self, delta: Vec2, min_size: Size) -> SizeUpdate {
        SizeUpdate {
            id: self.group_id,
            width: (self.initial_size.width + delta.x).max(min_size.width),
            height: (self.initial_size.height + delta.y).max(min_size.height),
        }
    }
}

/// Drawing a parent-child connection out of a task's handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub start: Point,
    pub current: Point,
    /// The task where the connection drag began.
    pub connection_start_id: TaskId,
}

/// The gesture currently in progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning(PanState),
    Selecting(Marquee),
    DraggingNode(NodeDrag),
    DraggingGroup(GroupDrag),
    ResizingGroup(GroupResize),
    Connecting(Connection),
}

impl InteractionState {
    pub fn kind(&self) -> InteractionKind {
        match self {
            InteractionState::Idle => InteractionKind::Idle,
            InteractionState::Panning(_) => InteractionKind::Panning,
            InteractionState::Selecting(_) => InteractionKind::Selecting,
            InteractionState::DraggingNode(_) => InteractionKind::DraggingNode,
            InteractionState::DraggingGroup(_) => InteractionKind::DraggingGroup,
            InteractionState::ResizingGroup(_) => InteractionKind::ResizingGroup,
            InteractionState::Connecting(_) => InteractionKind::Connecting,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Gesture anchor in screen coordinates.
    pub fn anchor(&self) -> Option<Point> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Panning(s) => Some(s.start),
            InteractionState::Selecting(s) => Some(s.start),
            InteractionState::DraggingNode(s) => Some(s.start),
            InteractionState::DraggingGroup(s) => Some(s.start),
            InteractionState::ResizingGroup(s) => Some(s.start),
            InteractionState::Connecting(s) => Some(s.start),
        }
    }

    /// Latest pointer position in screen coordinates.
    pub fn current(&self) -> Option<Point> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Panning(s) => Some(s.current),
            InteractionState::Selecting(s) => Some(s.current),
            InteractionState::DraggingNode(s) => Some(s.current),
            InteractionState::DraggingGroup(s) => Some(s.current),
            InteractionState::ResizingGroup(s) => Some(s.current),
            InteractionState::Connecting(s) => Some(s.current),
        }
    }

    /// Record the latest pointer position.
    pub fn set_current(&mut self, point: Point) {
        match self {
            InteractionState::Idle => {}
            InteractionState::Panning(s) => s.current = point,
            InteractionState::Selecting(s) => s.current = point,
            InteractionState::DraggingNode(s) => s.current = point,
            InteractionState::DraggingGroup(s) => s.current = point,
            InteractionState::ResizingGroup(s) => s.current = point,
            InteractionState::Connecting(s) => s.current = point,
        }
    }

    /// Pointer movement since the anchor, in screen pixels.
    pub fn screen_delta(&self) -> Vec2 {
        match (self.anchor(), self.current()) {
            (Some(start), Some(current)) => current - start,
            _ => Vec2::ZERO,
        }
    }
}

fn translate_all(
    ids: &[uuid::Uuid],
    origins: &HashMap<uuid::Uuid, Point>,
    delta: Vec2,
) -> Vec<PositionUpdate> {
    ids.iter()
        .filter_map(|id| {
            origins.get(id).map(|origin| PositionUpdate {
                id: *id,
                x: origin.x + delta.x,
                y: origin.y + delta.y,
            })
        })
        .collect()
}
