//! Keyboard shortcut registry and documentation.

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    SelectAll,
    ClearSelection,
    DeleteSelected,
    HandMode,
    PointerMode,
    CycleSnapMode,
    ResetView,
    Save,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use ShortcutAction::*;
        vec![
            Shortcut::new("A", true, false, SelectAll, "Select all tasks"),
            Shortcut::new("S", true, false, Save, "Save board"),
            Shortcut::new("Z", true, false, Undo, "Undo"),
            Shortcut::new("Z", true, true, Redo, "Redo"),
            Shortcut::new("Y", true, false, Redo, "Redo"),
            Shortcut::new("H", false, false, HandMode, "Hand mode (drag pans)"),
            Shortcut::new("V", false, false, PointerMode, "Pointer mode"),
            Shortcut::new("G", false, false, CycleSnapMode, "Cycle snap mode"),
            Shortcut::new("Home", false, false, ResetView, "Reset view"),
            Shortcut::new("Delete", false, false, DeleteSelected, "Delete selection"),
            Shortcut::new("Backspace", false, false, DeleteSelected, "Delete selection"),
            Shortcut::new("Escape", false, false, ClearSelection, "Clear selection"),
        ]
    }

    /// Find the action bound to a key and modifier combination.
    pub fn lookup(key: &str, ctrl: bool, shift: bool) -> Option<ShortcutAction> {
        Self::all()
            .into_iter()
            .find(|s| s.key.eq_ignore_ascii_case(key) && s.ctrl == ctrl && s.shift == shift)
            .map(|s| s.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!("  {:20} {}", "Space+Drag", "Pan the canvas");
        println!();
    }
}
