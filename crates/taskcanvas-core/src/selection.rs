//! Selection model: the selected task and group sets and the marquee.

use crate::model::{GroupId, Task, TaskId, rects_overlap};
use crate::viewport::Viewport;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minimum on-screen marquee extent (pixels) before it selects anything.
pub const MIN_MARQUEE_SIZE_PX: f64 = 5.0;

/// The sets of selected tasks and groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Selected task IDs.
    pub tasks: HashSet<TaskId>,
    /// Selected group IDs.
    pub groups: HashSet<GroupId>,
}

fn sorted<T: Ord + Copy>(set: &HashSet<T>) -> Vec<T> {
    let mut ids: Vec<T> = set.iter().copied().collect();
    ids.sort();
    ids
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.groups.is_empty()
    }

    /// Clear both sets.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.groups.clear();
    }

    pub fn is_task_selected(&self, id: TaskId) -> bool {
        self.tasks.contains(&id)
    }

    pub fn is_group_selected(&self, id: GroupId) -> bool {
        self.groups.contains(&id)
    }

    /// Add or remove a task depending on current membership.
    pub fn toggle_task(&mut self, id: TaskId) {
        if !self.tasks.remove(&id) {
            self.tasks.insert(id);
        }
    }

    /// Add or remove a group depending on current membership.
    pub fn toggle_group(&mut self, id: GroupId) {
        if !self.groups.remove(&id) {
            self.groups.insert(id);
        }
    }

    /// Select exactly one task, clearing everything else.
    pub fn select_only_task(&mut self, id: TaskId) {
        self.clear();
        self.tasks.insert(id);
    }

    /// Select exactly one group, clearing everything else.
    pub fn select_only_group(&mut self, id: GroupId) {
        self.clear();
        self.groups.insert(id);
    }

    /// Replace the task selection with `ids`.
    pub fn replace_tasks(&mut self, ids: impl IntoIterator<Item = TaskId>) {
        self.tasks = ids.into_iter().collect();
    }

    /// Symmetric difference: IDs already selected are removed, others added.
    pub fn xor_tasks(&mut self, ids: impl IntoIterator<Item = TaskId>) {
        for id in ids {
            self.toggle_task(id);
        }
    }

    /// Apply the selection rule for a press on a task body and return the
    /// tasks that should move with the drag.
    ///
    /// Shift toggles the pressed task. A plain press on an unselected task
    /// selects only that task; a plain press on a selected task keeps the
    /// current multi-selection. An empty result falls back to the pressed task.
    pub fn press_task(&mut self, id: TaskId, shift: bool) -> Vec<TaskId> {
        if shift {
            self.toggle_task(id);
        } else if !self.is_task_selected(id) {
            self.select_only_task(id);
        }

        let targets = sorted(&self.tasks);
        if targets.is_empty() { vec![id] } else { targets }
    }

    /// Group counterpart of [`Selection::press_task`].
    pub fn press_group(&mut self, id: GroupId, shift: bool) -> Vec<GroupId> {
        if shift {
            self.toggle_group(id);
        } else if !self.is_group_selected(id) {
            self.select_only_group(id);
        }

        let targets = sorted(&self.groups);
        if targets.is_empty() { vec![id] } else { targets }
    }

    /// Resolve a finished marquee: XOR under shift, replace otherwise.
    pub fn apply_marquee(&mut self, hits: Vec<TaskId>, shift: bool) {
        if shift {
            self.xor_tasks(hits);
        } else {
            self.replace_tasks(hits);
        }
    }
}

/// Marquee rectangle state, kept in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    /// Screen point where the gesture started.
    pub start: Point,
    /// Latest screen point.
    pub current: Point,
}

impl Marquee {
    /// Normalized rectangle in screen coordinates.
    pub fn screen_rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }

    /// Normalized rectangle in world coordinates under `viewport`.
    pub fn world_rect(&self, viewport: &Viewport) -> Rect {
        Rect::from_points(
            viewport.screen_to_canvas(self.start),
            viewport.screen_to_canvas(self.current),
        )
    }

    /// Whether the marquee is large enough to count as a selection.
    pub fn is_significant(&self) -> bool {
        let rect = self.screen_rect();
        rect.width() > MIN_MARQUEE_SIZE_PX || rect.height() > MIN_MARQUEE_SIZE_PX
    }
}

/// IDs of the tasks whose rectangles intersect `rect`.
pub fn tasks_in_rect<'a>(rect: Rect, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<TaskId> {
    tasks
        .into_iter()
        .filter(|task| rects_overlap(rect, task.rect()))
        .map(Task::id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_plain_press_on_unselected_replaces() {
        let (a, b, g) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.tasks.insert(a);
        selection.groups.insert(g);

        let targets = selection.press_task(b, false);

        assert_eq!(targets, vec![b]);
        assert!(selection.is_task_selected(b));
        assert!(!selection.is_task_selected(a));
        assert!(selection.groups.is_empty());
    }

    #[test]
    fn test_plain_press_on_selected_keeps_multi_selection() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.tasks.extend([a, b]);

        let targets = selection.press_task(a, false);

        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&a) && targets.contains(&b));
    }

    #[test]
    fn test_shift_press_toggles() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.tasks.insert(a);

        let targets = selection.press_task(b, true);
        assert_eq!(targets.len(), 2);

        let targets = selection.press_task(a, true);
        assert_eq!(targets, vec![b]);
        assert!(!selection.is_task_selected(a));
    }

    #[test]
    fn test_shift_press_deselecting_last_falls_back_to_pressed() {
        let a = Uuid::new_v4();
        let mut selection = Selection::new();
        selection.tasks.insert(a);

        let targets = selection.press_task(a, true);

        assert_eq!(targets, vec![a]);
        assert!(selection.tasks.is_empty());
    }

    #[test]
    fn test_group_press_clears_tasks() {
        let (t, g) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.tasks.insert(t);

        let targets = selection.press_group(g, false);

        assert_eq!(targets, vec![g]);
        assert!(selection.tasks.is_empty());
    }

    #[test]
    fn test_marquee_xor_under_shift() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.tasks.insert(a);

        selection.apply_marquee(vec![a, b], true);

        assert_eq!(selection.tasks, HashSet::from([b]));
    }

    #[test]
    fn test_marquee_replace_without_shift() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.tasks.insert(a);

        selection.apply_marquee(vec![b, c], false);

        assert_eq!(selection.tasks, HashSet::from([b, c]));
    }

    #[test]
    fn test_marquee_significance() {
        let tiny = Marquee {
            start: Point::new(10.0, 10.0),
            current: Point::new(13.0, 14.0),
        };
        assert!(!tiny.is_significant());

        let wide = Marquee {
            start: Point::new(10.0, 10.0),
            current: Point::new(4.0, 12.0),
        };
        assert!(wide.is_significant());
    }

    #[test]
    fn test_marquee_world_rect_is_normalized() {
        let marquee = Marquee {
            start: Point::new(200.0, 300.0),
            current: Point::new(100.0, 100.0),
        };
        let viewport = Viewport::new(100.0, 100.0, 2.0);
        assert_eq!(marquee.world_rect(&viewport), Rect::new(0.0, 0.0, 50.0, 100.0));
    }

    #[test]
    fn test_tasks_in_rect() {
        let near = Task::new("near", 0.0, 0.0).with_size(100.0, 100.0);
        let far = Task::new("far", 1000.0, 1000.0);
        let hits = tasks_in_rect(Rect::new(50.0, 50.0, 60.0, 60.0), [&near, &far]);
        assert_eq!(hits, vec![near.id()]);
    }
}
