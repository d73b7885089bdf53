//! Keyboard shortcuts: the sketchpad's command surface.

use sketchpad_core::Thickness;

/// Degrees added or removed per rotation step.
pub const ROTATION_STEP: f64 = 15.0;

/// A command the user can issue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Undo,
    Redo,
    Clear,
    Export,
    SetThickness(Thickness),
    StrokeTool,
    NextSticker,
    /// Rotate new stickers by this many degrees.
    RotateBy(f64),
    /// Start typing a custom sticker.
    BeginCustomSticker,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
    pub command: Command,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
        command: Command,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
            command,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
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
        self.key.eq_ignore_ascii_case(key) && self.ctrl == ctrl && self.shift == shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, "Undo", Command::Undo),
            Shortcut::new("Z", true, true, "Redo", Command::Redo),
            Shortcut::new("Y", true, false, "Redo", Command::Redo),
            Shortcut::new("Delete", false, false, "Clear canvas", Command::Clear),
            Shortcut::new("E", true, false, "Export to PNG", Command::Export),
            Shortcut::new("1", false, false, "Thin", Command::SetThickness(Thickness::Thin)),
            Shortcut::new("2", false, false, "Thick", Command::SetThickness(Thickness::Thick)),
            Shortcut::new("D", false, false, "Draw strokes", Command::StrokeTool),
            Shortcut::new("S", false, false, "Next sticker", Command::NextSticker),
            Shortcut::new("C", false, false, "Type a custom sticker", Command::BeginCustomSticker),
            Shortcut::new("[", false, false, "Rotate stickers left", Command::RotateBy(-ROTATION_STEP)),
            Shortcut::new("]", false, false, "Rotate stickers right", Command::RotateBy(ROTATION_STEP)),
        ]
    }

    /// Find the command bound to a key with the given modifiers.
    pub fn lookup(key: &str, ctrl: bool, shift: bool) -> Option<Command> {
        Self::all()
            .into_iter()
            .find(|s| s.matches(key, ctrl, shift))
            .map(|s| s.command)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let shortcut = Shortcut::new("Z", true, true, "Redo", Command::Redo);
        assert_eq!(shortcut.format(), "Ctrl+Shift+Z");
    }

    #[test]
    fn test_lookup_respects_modifiers() {
        assert_eq!(ShortcutRegistry::lookup("z", true, false), Some(Command::Undo));
        assert_eq!(ShortcutRegistry::lookup("Z", true, true), Some(Command::Redo));
        assert_eq!(ShortcutRegistry::lookup("z", false, false), None);
    }

    #[test]
    fn test_lookup_tools() {
        assert_eq!(
            ShortcutRegistry::lookup("2", false, false),
            Some(Command::SetThickness(Thickness::Thick))
        );
        assert_eq!(
            ShortcutRegistry::lookup("[", false, false),
            Some(Command::RotateBy(-ROTATION_STEP))
        );
        assert_eq!(ShortcutRegistry::lookup("Delete", false, false), Some(Command::Clear));
    }

    #[test]
    fn test_no_duplicate_bindings() {
        let all = ShortcutRegistry::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(
                    !(a.key == b.key && a.ctrl == b.ctrl && a.shift == b.shift),
                    "{} bound twice",
                    a.format()
                );
            }
        }
    }
}
