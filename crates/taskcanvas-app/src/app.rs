//! Core application state and lifecycle.

use kurbo::Point;
use std::path::PathBuf;
use std::sync::Arc;
use taskcanvas_core::{
    Board, BoardError, CanvasHost, EngineConfig, GestureDispatcher, Group, InteractionKind,
    InteractionMode, Modifiers, MouseButton, PointerTarget, Task, TouchEvent, hit_test,
};
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use crate::event_handler::{
    is_space, map_button, map_modifiers, map_touch_phase, scroll_delta, shortcut_key, to_point,
};
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Board error: {0}")]
    Board(#[from] BoardError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Board file to open and save to.
    pub board_path: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "TaskCanvas".to_string(),
            width: 1280,
            height: 800,
            board_path: None,
            engine: EngineConfig::default(),
        }
    }
}

/// Main application.
pub struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    board: Board,
    dispatcher: GestureDispatcher,
    /// Last cursor position in window pixels.
    cursor: Point,
    modifiers: Modifiers,
    /// Gesture kind at the previous redraw, for change logging.
    last_kind: InteractionKind,
}

impl App {
    /// Create the app, loading the configured board file if it exists.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let board = match &config.board_path {
            Some(path) if path.exists() => {
                let json = std::fs::read_to_string(path)?;
                let board = Board::from_json(&json)?;
                log::info!("Loaded board '{}' from {:?}", board.name, path);
                board
            }
            _ => sample_board()?,
        };

        Ok(Self {
            dispatcher: GestureDispatcher::with_config(config.engine),
            config,
            window: None,
            board,
            cursor: Point::ZERO,
            modifiers: Modifiers::default(),
            last_kind: InteractionKind::Idle,
        })
    }

    /// Run the app until the window closes.
    pub fn run(config: AppConfig) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        let mut app = App::new(config)?;
        event_loop.run_app(&mut app)?;
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// What lies under a window position.
    fn target_at(&self, position: Point) -> PointerTarget {
        let viewport = self.board.viewport();
        hit_test(
            viewport.screen_to_canvas(position),
            self.board.tasks(),
            self.board.groups(),
            &viewport,
        )
    }

    fn handle_shortcut(&mut self, action: ShortcutAction) {
        // Document edits are refused while a gesture owns the board.
        let editing = matches!(
            action,
            ShortcutAction::Undo | ShortcutAction::Redo | ShortcutAction::DeleteSelected
        );
        if editing && self.dispatcher.is_active() {
            log::debug!("Ignoring {:?} during {:?}", action, self.dispatcher.kind());
            return;
        }

        match action {
            ShortcutAction::Undo => {
                if self.board.undo() {
                    log::info!("Undo");
                }
            }
            ShortcutAction::Redo => {
                if self.board.redo() {
                    log::info!("Redo");
                }
            }
            ShortcutAction::SelectAll => self.board.select_all_tasks(),
            ShortcutAction::ClearSelection => {
                self.dispatcher.pointer_cancel(&mut self.board);
                self.board.clear_selection();
            }
            ShortcutAction::DeleteSelected => self.board.delete_selected(),
            ShortcutAction::HandMode => self.board.set_interaction_mode(InteractionMode::Hand),
            ShortcutAction::PointerMode => {
                self.board.set_interaction_mode(InteractionMode::Pointer)
            }
            ShortcutAction::CycleSnapMode => {
                let mode = self.dispatcher.config().snap_mode.next();
                self.dispatcher.set_snap_mode(mode);
                log::info!("Snap mode: {:?}", mode);
            }
            ShortcutAction::ResetView => {
                let mut viewport = self.board.viewport();
                viewport.reset();
                self.board.set_viewport(viewport);
            }
            ShortcutAction::Save => {
                if let Err(e) = self.save() {
                    log::error!("Failed to save board: {}", e);
                }
            }
        }
        self.request_redraw();
    }

    fn save(&self) -> Result<(), AppError> {
        let Some(path) = &self.config.board_path else {
            log::warn!("No board file configured; pass a path on the command line");
            return Ok(());
        };
        std::fs::write(path, self.board.to_json()?)?;
        log::info!("Saved board to {:?}", path);
        Ok(())
    }

    /// Stand-in for drawing: report what changed since the last frame.
    fn present(&mut self) {
        let kind = self.dispatcher.kind();
        if kind != self.last_kind {
            log::info!("Interaction: {:?} -> {:?}", self.last_kind, kind);
            self.last_kind = kind;
        }
        if let Some(rect) = self.dispatcher.marquee_rect(&self.board) {
            log::trace!("Marquee {:?}", rect);
        }
        if let Some((source, point)) = self.dispatcher.connection_preview(&self.board) {
            log::trace!("Connection from {} to {:?}", source, point);
        }
        for guide in self.dispatcher.guides() {
            log::trace!("Guide {:?}", guide);
        }
    }
}

/// Board shown when no file is given.
fn sample_board() -> Result<Board, BoardError> {
    let mut board = Board::new();
    board.name = "Sample".to_string();
    board.add_group(Group::new("Backlog", 40.0, 40.0, 720.0, 420.0))?;
    let epic = board.add_task(Task::new("Ship the board", 80.0, 80.0))?;
    board.add_task(Task::new("Gesture engine", 80.0, 280.0).with_parent(epic))?;
    board.add_task(Task::new("Snapping", 420.0, 280.0).with_parent(epic))?;
    Ok(board)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Creating window...");
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        match event_loop.create_window(window_attrs) {
            Ok(window) => {
                self.window = Some(Arc::new(window));
                ShortcutRegistry::print_all();
            }
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(_) => self.request_redraw(),

            WindowEvent::RedrawRequested => {
                self.dispatcher.on_frame(&mut self.board);
                self.present();
            }

            WindowEvent::Focused(false) => {
                self.dispatcher.set_space_held(false);
                self.dispatcher.pointer_cancel(&mut self.board);
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = map_modifiers(modifiers.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = to_point(position);
                if self.dispatcher.pointer_move(self.cursor) {
                    self.request_redraw();
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                // The right button is reserved for context menus.
                let Some(button) = map_button(button).filter(|b| *b != MouseButton::Right) else {
                    return;
                };
                let target = self.target_at(self.cursor);
                match state {
                    ElementState::Pressed => {
                        self.dispatcher.pointer_down(
                            &mut self.board,
                            self.cursor,
                            button,
                            target,
                            self.modifiers,
                        );
                    }
                    ElementState::Released => {
                        self.dispatcher.pointer_up(
                            &mut self.board,
                            self.cursor,
                            target,
                            self.modifiers,
                        );
                    }
                }
                self.request_redraw();
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.dispatcher.wheel(
                    &mut self.board,
                    self.cursor,
                    scroll_delta(delta),
                    self.modifiers,
                );
                self.request_redraw();
            }

            WindowEvent::Touch(touch) => {
                let position = to_point(touch.location);
                let event = TouchEvent {
                    id: touch.id,
                    phase: map_touch_phase(touch.phase),
                    position,
                    target: self.target_at(position),
                };
                self.dispatcher.handle_touch(&mut self.board, event);
                self.request_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                if is_space(&event.logical_key) {
                    self.dispatcher.set_space_held(pressed);
                    return;
                }
                if !pressed || event.repeat {
                    return;
                }
                let action = shortcut_key(&event.logical_key).and_then(|key| {
                    ShortcutRegistry::lookup(&key, self.modifiers.command(), self.modifiers.shift)
                });
                if let Some(action) = action {
                    self.handle_shortcut(action);
                }
            }

            _ => {}
        }
    }
}
