//! Translation of winit events into engine input types.

use kurbo::{Point, Vec2};
use taskcanvas_core::input::{Modifiers, MouseButton, TouchPhase};
use winit::dpi::PhysicalPosition;
use winit::event::{self, MouseScrollDelta};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Pixels scrolled per wheel line.
pub const LINE_SCROLL_PX: f64 = 40.0;

pub fn to_point(position: PhysicalPosition<f64>) -> Point {
    Point::new(position.x, position.y)
}

/// Map a winit button; back/forward and other buttons are ignored.
pub fn map_button(button: event::MouseButton) -> Option<MouseButton> {
    match button {
        event::MouseButton::Left => Some(MouseButton::Left),
        event::MouseButton::Right => Some(MouseButton::Right),
        event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

pub fn map_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

/// Wheel delta in screen pixels.
pub fn scroll_delta(delta: MouseScrollDelta) -> Vec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => {
            Vec2::new(f64::from(x) * LINE_SCROLL_PX, f64::from(y) * LINE_SCROLL_PX)
        }
        MouseScrollDelta::PixelDelta(pos) => Vec2::new(pos.x, pos.y),
    }
}

pub fn map_touch_phase(phase: event::TouchPhase) -> TouchPhase {
    match phase {
        event::TouchPhase::Started => TouchPhase::Started,
        event::TouchPhase::Moved => TouchPhase::Moved,
        event::TouchPhase::Ended => TouchPhase::Ended,
        event::TouchPhase::Cancelled => TouchPhase::Cancelled,
    }
}

/// Shortcut name of a logical key ("Z", "Escape", ...).
pub fn shortcut_key(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_uppercase()),
        Key::Named(NamedKey::Escape) => Some("Escape".to_string()),
        Key::Named(NamedKey::Delete) => Some("Delete".to_string()),
        Key::Named(NamedKey::Backspace) => Some("Backspace".to_string()),
        Key::Named(NamedKey::Home) => Some("Home".to_string()),
        _ => None,
    }
}

pub fn is_space(key: &Key) -> bool {
    matches!(key, Key::Named(NamedKey::Space))
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::SmolStr;

    #[test]
    fn test_scroll_delta_lines() {
        let delta = scroll_delta(MouseScrollDelta::LineDelta(0.0, -2.0));
        assert_eq!(delta, Vec2::new(0.0, -80.0));
    }

    #[test]
    fn test_scroll_delta_pixels() {
        let delta = scroll_delta(MouseScrollDelta::PixelDelta(PhysicalPosition::new(3.0, 4.5)));
        assert_eq!(delta, Vec2::new(3.0, 4.5));
    }

    #[test]
    fn test_shortcut_key_uppercases() {
        assert_eq!(shortcut_key(&Key::Character(SmolStr::new("z"))), Some("Z".to_string()));
        assert_eq!(shortcut_key(&Key::Named(NamedKey::Escape)), Some("Escape".to_string()));
        assert_eq!(shortcut_key(&Key::Named(NamedKey::Tab)), None);
    }

    #[test]
    fn test_modifiers() {
        let mods = map_modifiers(ModifiersState::SHIFT | ModifiersState::CONTROL);
        assert!(mods.shift && mods.ctrl && !mods.alt && !mods.meta);
        assert!(mods.command());
    }

    #[test]
    fn test_buttons() {
        assert_eq!(map_button(event::MouseButton::Middle), Some(MouseButton::Middle));
        assert_eq!(map_button(event::MouseButton::Back), None);
    }
}
