//! TaskCanvas Core Library
//!
//! Platform-agnostic interaction engine for an infinite-canvas task board:
//! viewport math, gesture state machine, alignment snapping, selection and
//! parent-link validation.

pub mod board;
pub mod gesture;
pub mod graph;
pub mod hit;
pub mod history;
pub mod host;
pub mod input;
pub mod interaction;
pub mod model;
pub mod selection;
pub mod snap;
pub mod throttle;
pub mod viewport;

pub use board::{Board, BoardError, BoardResult};
pub use gesture::{EngineConfig, GestureDispatcher, MIN_GROUP_HEIGHT, MIN_GROUP_WIDTH};
pub use graph::{ConnectionError, validate_connection};
pub use hit::hit_test;
pub use history::History;
pub use host::{CanvasHost, PositionUpdate, SizeUpdate};
pub use input::{
    InteractionMode, Modifiers, MouseButton, PointerEvent, PointerTarget, TouchEvent, TouchPhase,
};
pub use interaction::{InteractionKind, InteractionState};
pub use model::{Group, GroupId, Task, TaskId};
pub use selection::{Marquee, Selection};
pub use snap::{
    GRID_SIZE, GuideKind, GuideLine, SNAP_THRESHOLD_PX, SnapMode, SnapResult, resolve_snap,
};
pub use throttle::FrameMailbox;
pub use viewport::{Viewport, screen_to_canvas};
