//! TaskCanvas Application
//!
//! The native shell: windowing, input translation and keyboard shortcuts
//! around the core interaction engine.

mod app;
mod event_handler;
mod shortcuts;

pub use app::{App, AppConfig, AppError};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
