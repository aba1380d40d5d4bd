//! Keyboard shortcut table.
//!
//! Hosts resolve key presses to an [`EditorAction`] and call the matching
//! engine operation themselves.

use crate::tools::ToolKind;

/// What a shortcut asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    FitToScreen,
    CancelDrawing,
    SetTool(ToolKind),
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: EditorAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: EditorAction,
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

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
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

    fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.ctrl == ctrl && self.shift == shift && self.key.eq_ignore_ascii_case(key)
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> Vec<Shortcut> {
        use EditorAction::*;
        vec![
            Shortcut::new("Z", true, false, Undo, "Undo"),
            Shortcut::new("Z", true, true, Redo, "Redo"),
            Shortcut::new("Y", true, false, Redo, "Redo"),
            Shortcut::new("=", true, false, ZoomIn, "Zoom in"),
            Shortcut::new("-", true, false, ZoomOut, "Zoom out"),
            Shortcut::new("0", true, false, ResetZoom, "Reset zoom to 100%"),
            Shortcut::new("1", false, true, FitToScreen, "Fit diagram to screen"),
            Shortcut::new("Escape", false, false, CancelDrawing, "Cancel current connection"),
            Shortcut::new("V", false, false, SetTool(ToolKind::Select), "Select tool"),
            Shortcut::new("H", false, false, SetTool(ToolKind::Pan), "Pan tool"),
            Shortcut::new("C", false, false, SetTool(ToolKind::Connection), "Connection tool"),
            Shortcut::new("T", false, false, SetTool(ToolKind::Text), "Text tool"),
        ]
    }

    /// Action bound to a key press. Letter keys match in either case.
    pub fn resolve(key: &str, ctrl: bool, shift: bool) -> Option<EditorAction> {
        Self::all()
            .into_iter()
            .find(|s| s.matches(key, ctrl, shift))
            .map(|s| s.action)
    }

    /// One "Ctrl+Z  Undo" line per shortcut, for help overlays.
    pub fn help_lines() -> Vec<String> {
        Self::all()
            .iter()
            .map(|s| format!("{:16} {}", s.format(), s.description))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_bindings() {
        assert_eq!(ShortcutRegistry::resolve("z", true, false), Some(EditorAction::Undo));
        assert_eq!(ShortcutRegistry::resolve("Z", true, true), Some(EditorAction::Redo));
        assert_eq!(ShortcutRegistry::resolve("y", true, false), Some(EditorAction::Redo));
        assert_eq!(ShortcutRegistry::resolve("z", false, false), None);
    }

    #[test]
    fn test_tool_and_view_bindings() {
        assert_eq!(
            ShortcutRegistry::resolve("c", false, false),
            Some(EditorAction::SetTool(ToolKind::Connection))
        );
        assert_eq!(ShortcutRegistry::resolve("escape", false, false), Some(EditorAction::CancelDrawing));
        assert_eq!(ShortcutRegistry::resolve("0", true, false), Some(EditorAction::ResetZoom));
    }

    #[test]
    fn test_bindings_are_unique() {
        let all = ShortcutRegistry::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(!(a.key == b.key && a.ctrl == b.ctrl && a.shift == b.shift), "{}", a.format());
            }
        }
    }

    #[test]
    fn test_format() {
        let redo = &ShortcutRegistry::all()[1];
        assert_eq!(redo.format(), "Ctrl+Shift+Z");
        assert!(ShortcutRegistry::help_lines()[0].starts_with("Ctrl+Z"));
    }
}
