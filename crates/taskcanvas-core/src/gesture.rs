//! Gesture dispatcher: turns pointer, wheel and touch input into interaction
//! state transitions and batched position updates.
//!
//! Pointer moves are coalesced through a [`FrameMailbox`]: the host calls
//! [`GestureDispatcher::pointer_move`] at native event rate and
//! [`GestureDispatcher::on_frame`] once per animation frame, which runs at
//! most one recomputation with the newest pointer position.

use crate::host::CanvasHost;
use crate::input::{
    InteractionMode, Modifiers, MouseButton, PointerEvent, PointerTarget, TouchEvent, TouchPhase,
};
use crate::interaction::{
    Connection, GroupDrag, GroupResize, InteractionKind, InteractionState, NodeDrag, PanState,
};
pub use crate::model::{MIN_GROUP_HEIGHT, MIN_GROUP_WIDTH};
use crate::model::{GroupId, Task, TaskId};
use crate::selection::{Marquee, tasks_in_rect};
use crate::snap::{GRID_SIZE, GuideLine, SNAP_THRESHOLD_PX, SnapMode, resolve_snap};
use crate::throttle::FrameMailbox;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Zoom step applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Tunables of the interaction engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How single-entity drags snap.
    pub snap_mode: SnapMode,
    /// Sibling snap distance in screen pixels.
    pub snap_threshold_px: f64,
    /// Grid spacing in world units.
    pub grid_size: f64,
    /// Resize floor for groups.
    pub min_group_size: Size,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_mode: SnapMode::default(),
            snap_threshold_px: SNAP_THRESHOLD_PX,
            grid_size: GRID_SIZE,
            min_group_size: Size::new(MIN_GROUP_WIDTH, MIN_GROUP_HEIGHT),
        }
    }
}

/// Two-finger pinch in progress.
#[derive(Debug, Clone, Copy)]
struct Pinch {
    /// The two contacts driving the pinch.
    ids: (u64, u64),
    distance: f64,
    midpoint: Point,
}

/// Active touch contacts.
#[derive(Debug, Clone, Default)]
struct TouchTracker {
    contacts: HashMap<u64, Point>,
    /// The contact driving a single-finger gesture.
    primary: Option<u64>,
    pinch: Option<Pinch>,
}

impl TouchTracker {
    /// Pinch geometry of two specific contacts.
    fn pinch_between(&self, ids: (u64, u64)) -> Option<Pinch> {
        let a = *self.contacts.get(&ids.0)?;
        let b = *self.contacts.get(&ids.1)?;
        Some(Pinch {
            ids,
            distance: a.distance(b),
            midpoint: a.midpoint(b),
        })
    }

    /// Pinch over the two lowest contact ids, if at least two are down.
    fn seed_pinch(&self) -> Option<Pinch> {
        let mut ids: Vec<u64> = self.contacts.keys().copied().collect();
        ids.sort_unstable();
        match ids.as_slice() {
            [a, b, ..] => self.pinch_between((*a, *b)),
            _ => None,
        }
    }

    fn is_pinch_contact(&self, id: u64) -> bool {
        self.pinch
            .is_some_and(|pinch| pinch.ids.0 == id || pinch.ids.1 == id)
    }
}

/// Drives the interaction state machine.
#[derive(Debug, Clone, Default)]
pub struct GestureDispatcher {
    config: EngineConfig,
    state: InteractionState,
    guides: Vec<GuideLine>,
    mailbox: FrameMailbox<Point>,
    space_held: bool,
    touches: TouchTracker,
}

impl GestureDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_snap_mode(&mut self, mode: SnapMode) {
        self.config.snap_mode = mode;
    }

    /// The gesture in progress, for drawing marquees and connection lines.
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Alignment guides of the current drag frame.
    pub fn guides(&self) -> &[GuideLine] {
        &self.guides
    }

    /// Whether a gesture is in progress. While true, the host should route
    /// window-level pointer events here so drags continue outside the canvas.
    pub fn is_active(&self) -> bool {
        !self.state.is_idle()
    }

    /// Whether a recomputation is waiting for the next frame.
    pub fn needs_frame(&self) -> bool {
        self.mailbox.is_scheduled()
    }

    /// Track the spacebar pan modifier.
    pub fn set_space_held(&mut self, held: bool) {
        self.space_held = held;
    }

    /// The current marquee in world coordinates.
    pub fn marquee_rect(&self, host: &impl CanvasHost) -> Option<Rect> {
        match &self.state {
            InteractionState::Selecting(marquee) => Some(marquee.world_rect(&host.viewport())),
            _ => None,
        }
    }

    /// Source task and world-space pointer of an in-flight connection.
    pub fn connection_preview(&self, host: &impl CanvasHost) -> Option<(TaskId, Point)> {
        match &self.state {
            InteractionState::Connecting(connection) => Some((
                connection.connection_start_id,
                host.viewport().screen_to_canvas(connection.current),
            )),
            _ => None,
        }
    }

    /// Route a unified pointer event.
    ///
    /// Returns `true` when the host must schedule a frame, as
    /// [`GestureDispatcher::pointer_move`] does.
    pub fn handle_event(&mut self, host: &mut impl CanvasHost, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down {
                position,
                button,
                target,
                modifiers,
            } => self.pointer_down(host, position, button, target, modifiers),
            PointerEvent::Move { position } => return self.pointer_move(position),
            PointerEvent::Up {
                position,
                target,
                modifiers,
            } => self.pointer_up(host, position, target, modifiers),
            PointerEvent::Cancel => self.pointer_cancel(host),
            PointerEvent::Scroll {
                position,
                delta,
                modifiers,
            } => self.wheel(host, position, delta, modifiers),
        }
        false
    }

    /// Classify a press and start the matching gesture.
    pub fn pointer_down(
        &mut self,
        host: &mut impl CanvasHost,
        position: Point,
        button: MouseButton,
        target: PointerTarget,
        modifiers: Modifiers,
    ) {
        if self.is_active() {
            log::debug!(
                "Ignoring {:?} press during {:?}",
                button,
                self.state.kind()
            );
            return;
        }

        let pans = match button {
            MouseButton::Middle => true,
            MouseButton::Left => {
                self.space_held || host.interaction_mode() == InteractionMode::Hand
            }
            MouseButton::Right => return,
        };

        self.mailbox.cancel();
        self.guides.clear();

        if pans {
            self.state = InteractionState::Panning(PanState {
                start: position,
                current: position,
                last: position,
            });
        } else {
            self.state = match target {
                PointerTarget::Background => self.begin_selecting(host, position, modifiers),
                PointerTarget::Task(id) => self.begin_node_drag(host, position, id, modifiers),
                PointerTarget::Group(id) => self.begin_group_drag(host, position, id, modifiers),
                PointerTarget::GroupResizeHandle(id) => self.begin_resize(host, position, id),
                PointerTarget::TaskConnectionHandle(id) => {
                    InteractionState::Connecting(Connection {
                        start: position,
                        current: position,
                        connection_start_id: id,
                    })
                }
            };
        }

        if self.is_active() {
            log::debug!("Gesture started: {:?}", self.state.kind());
        }
    }

    fn begin_selecting(
        &mut self,
        host: &mut impl CanvasHost,
        position: Point,
        modifiers: Modifiers,
    ) -> InteractionState {
        if !modifiers.shift && !host.selection().is_empty() {
            let mut selection = host.selection().clone();
            selection.clear();
            host.set_selection(selection);
        }
        InteractionState::Selecting(Marquee {
            start: position,
            current: position,
        })
    }

    fn begin_node_drag(
        &mut self,
        host: &mut impl CanvasHost,
        position: Point,
        id: TaskId,
        modifiers: Modifiers,
    ) -> InteractionState {
        if !host.tasks().iter().any(|task| task.id() == id) {
            log::warn!("Press on unknown task {}", id);
            return InteractionState::Idle;
        }

        let mut selection = host.selection().clone();
        let targets = selection.press_task(id, modifiers.shift);

        match NodeDrag::capture(position, &targets, id, host.tasks()) {
            Some(drag) => {
                host.set_selection(selection);
                host.push_history();
                log::debug!("Dragging {} task(s)", drag.target_ids.len());
                InteractionState::DraggingNode(drag)
            }
            None => InteractionState::Idle,
        }
    }

    fn begin_group_drag(
        &mut self,
        host: &mut impl CanvasHost,
        position: Point,
        id: GroupId,
        modifiers: Modifiers,
    ) -> InteractionState {
        if !host.groups().iter().any(|group| group.id() == id) {
            log::warn!("Press on unknown group {}", id);
            return InteractionState::Idle;
        }

        let mut selection = host.selection().clone();
        let targets = selection.press_group(id, modifiers.shift);

        match GroupDrag::capture(position, &targets, id, host.groups(), host.tasks()) {
            Some(drag) => {
                host.set_selection(selection);
                host.push_history();
                log::debug!(
                    "Dragging {} group(s) carrying {} task(s)",
                    drag.target_ids.len(),
                    drag.dragged_children_ids.len()
                );
                InteractionState::DraggingGroup(drag)
            }
            None => InteractionState::Idle,
        }
    }

    fn begin_resize(
        &mut self,
        host: &mut impl CanvasHost,
        position: Point,
        id: GroupId,
    ) -> InteractionState {
        match GroupResize::capture(position, id, host.groups()) {
            Some(resize) => {
                host.push_history();
                InteractionState::ResizingGroup(resize)
            }
            None => {
                log::warn!("Resize handle of unknown group {}", id);
                InteractionState::Idle
            }
        }
    }

    /// Record the newest pointer position.
    ///
    /// Returns `true` when the host must schedule a frame; further moves
    /// before that frame only overwrite the pending position.
    pub fn pointer_move(&mut self, position: Point) -> bool {
        if !self.is_active() {
            return false;
        }
        self.mailbox.post(position)
    }

    /// Animation-frame callback. Returns `true` if a recomputation ran.
    pub fn on_frame(&mut self, host: &mut impl CanvasHost) -> bool {
        match self.mailbox.take() {
            Some(position) => {
                self.recompute(host, position);
                true
            }
            None => false,
        }
    }

    /// Apply one pointer position to the active gesture.
    fn recompute(&mut self, host: &mut impl CanvasHost, position: Point) {
        self.state.set_current(position);
        let scale = host.viewport().effective_scale();
        let world_delta = self.state.screen_delta() / scale;
        log::trace!("Frame {:?} at {:?}", self.state.kind(), position);

        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::Selecting(_) | InteractionState::Connecting(_) => {}
            InteractionState::Panning(pan) => {
                let delta = pan.current - pan.last;
                pan.last = pan.current;
                let mut viewport = host.viewport();
                viewport.pan(delta);
                host.set_viewport(viewport);
            }
            InteractionState::DraggingNode(drag) => {
                let delta = if drag.target_ids.len() == 1 && self.config.snap_mode.is_enabled() {
                    let origin = drag.primary_origin();
                    let proposed = Rect::from_origin_size(origin + world_delta, drag.primary_size);
                    let siblings = host
                        .tasks()
                        .iter()
                        .filter(|task| !drag.is_moving(task.id()))
                        .map(Task::rect);
                    let snapped = resolve_snap(
                        proposed,
                        siblings,
                        scale,
                        self.config.snap_mode,
                        self.config.snap_threshold_px,
                        self.config.grid_size,
                    );
                    self.guides = snapped.guides;
                    snapped.point - origin
                } else {
                    self.guides.clear();
                    world_delta
                };
                let updates = drag.translated(delta);
                host.on_tasks_update(&updates);
            }
            InteractionState::DraggingGroup(drag) => {
                self.guides.clear();
                host.on_groups_update(&drag.translated_groups(world_delta));
                let children = drag.translated_children(world_delta);
                if !children.is_empty() {
                    host.on_tasks_update(&children);
                }
            }
            InteractionState::ResizingGroup(resize) => {
                host.on_group_resize(resize.resized(world_delta, self.config.min_group_size));
            }
        }
    }

    /// Finish the active gesture.
    ///
    /// A pending move is flushed first, followed by the release position, so
    /// the last movement is never dropped. Entities stay where the final
    /// recomputation put them.
    pub fn pointer_up(
        &mut self,
        host: &mut impl CanvasHost,
        position: Point,
        target: PointerTarget,
        modifiers: Modifiers,
    ) {
        if !self.is_active() {
            self.mailbox.cancel();
            return;
        }

        if let Some(pending) = self.mailbox.take() {
            self.recompute(host, pending);
        }
        if self.state.current() != Some(position) {
            self.recompute(host, position);
        }

        let kind = self.state.kind();
        match std::mem::take(&mut self.state) {
            InteractionState::Selecting(marquee) => {
                if marquee.is_significant() {
                    let rect = marquee.world_rect(&host.viewport());
                    let hits = tasks_in_rect(rect, host.tasks());
                    log::debug!("Marquee hit {} task(s)", hits.len());
                    let mut selection = host.selection().clone();
                    selection.apply_marquee(hits, modifiers.shift);
                    host.set_selection(selection);
                }
            }
            InteractionState::Connecting(connection) => match target.task() {
                Some(target_id) if target_id != connection.connection_start_id => {
                    host.on_connect(connection.connection_start_id, target_id);
                }
                _ => log::debug!("Connection released over no target"),
            },
            _ => {}
        }

        self.guides.clear();
        log::debug!("Gesture ended: {:?}", kind);
    }

    /// Abandon the active gesture (pointer cancel, lost focus).
    ///
    /// Positions already emitted stay; no marquee or connection resolves.
    pub fn pointer_cancel(&mut self, _host: &mut impl CanvasHost) {
        if self.is_active() {
            log::debug!("Gesture cancelled: {:?}", self.state.kind());
        }
        self.mailbox.cancel();
        self.state = InteractionState::Idle;
        self.guides.clear();
    }

    /// Wheel input: command + wheel zooms at the pointer, plain wheel pans.
    pub fn wheel(
        &mut self,
        host: &mut impl CanvasHost,
        position: Point,
        delta: Vec2,
        modifiers: Modifiers,
    ) {
        let mut viewport = host.viewport();
        if modifiers.command() {
            if delta.y == 0.0 {
                return;
            }
            let factor = if delta.y > 0.0 {
                WHEEL_ZOOM_STEP
            } else {
                1.0 / WHEEL_ZOOM_STEP
            };
            viewport.zoom_at(position, factor);
        } else {
            viewport.pan(delta);
        }
        host.set_viewport(viewport);
    }

    /// Route a touch contact update.
    ///
    /// One finger behaves like the left mouse button. A second finger
    /// abandons that gesture and starts a pinch that zooms around, and pans
    /// with, the midpoint of the two contacts.
    pub fn handle_touch(&mut self, host: &mut impl CanvasHost, event: TouchEvent) {
        match event.phase {
            TouchPhase::Started => self.touch_start(host, event),
            TouchPhase::Moved => self.touch_move(host, event),
            TouchPhase::Ended => self.touch_end(host, event, false),
            TouchPhase::Cancelled => self.touch_end(host, event, true),
        }
    }

    fn touch_start(&mut self, host: &mut impl CanvasHost, event: TouchEvent) {
        self.touches.contacts.insert(event.id, event.position);

        match self.touches.contacts.len() {
            1 => {
                self.touches.primary = Some(event.id);
                self.pointer_down(
                    host,
                    event.position,
                    MouseButton::Left,
                    event.target,
                    Modifiers::default(),
                );
            }
            _ if self.touches.pinch.is_none() => {
                if self.is_active() {
                    self.pointer_cancel(host);
                }
                self.touches.primary = None;
                self.touches.pinch = self.touches.seed_pinch();
                log::debug!("Pinch started");
            }
            // Extra fingers do not join a running pinch.
            _ => {}
        }
    }

    fn touch_move(&mut self, host: &mut impl CanvasHost, event: TouchEvent) {
        let Some(contact) = self.touches.contacts.get_mut(&event.id) else {
            return;
        };
        *contact = event.position;

        if let Some(previous) = self.touches.pinch {
            if !self.touches.is_pinch_contact(event.id) {
                return;
            }
            let Some(next) = self.touches.pinch_between(previous.ids) else {
                return;
            };
            let mut viewport = host.viewport();
            if previous.distance > f64::EPSILON && next.distance > f64::EPSILON {
                viewport.zoom_at(previous.midpoint, next.distance / previous.distance);
            }
            viewport.pan(next.midpoint - previous.midpoint);
            host.set_viewport(viewport);
            self.touches.pinch = Some(next);
        } else if self.touches.primary == Some(event.id) {
            self.pointer_move(event.position);
        }
    }

    fn touch_end(&mut self, host: &mut impl CanvasHost, event: TouchEvent, cancelled: bool) {
        if self.touches.contacts.remove(&event.id).is_none() {
            return;
        }

        if self.touches.pinch.is_some() {
            if self.touches.is_pinch_contact(event.id) {
                // Continue with the remaining fingers from their current spread.
                self.touches.pinch = self.touches.seed_pinch();
                if self.touches.pinch.is_none() {
                    log::debug!("Pinch ended");
                }
            }
            return;
        }

        if self.touches.primary == Some(event.id) {
            self.touches.primary = None;
            if cancelled {
                self.pointer_cancel(host);
            } else {
                self.pointer_up(host, event.position, event.target, Modifiers::default());
            }
        }
    }

    /// Kind of the gesture in progress.
    pub fn kind(&self) -> InteractionKind {
        self.state.kind()
    }
}
