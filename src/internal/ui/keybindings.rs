use crate::internal::action::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps key events to actions
#[derive(Debug, Clone, Default)]
pub struct KeyBindingMap {
    bindings: HashMap<KeyEvent, Action>,
}

impl KeyBindingMap {
    /// Create a new empty keybinding map
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the action for a key event.
    ///
    /// Letters are matched case-insensitively: when `J` (typed with SHIFT
    /// or Caps Lock) has no binding of its own, the lookup retries with
    /// SHIFT dropped, then with `j`.
    pub fn get_action(&self, key: &KeyEvent) -> Option<Action> {
        let lookup = KeyEvent::new(key.code, key.modifiers);
        if let Some(action) = self.bindings.get(&lookup) {
            return Some(*action);
        }

        match lookup.code {
            KeyCode::Char(c) if c.is_uppercase() || lookup.modifiers.contains(KeyModifiers::SHIFT) => {
                let modifiers = lookup.modifiers - KeyModifiers::SHIFT;
                let lowered = c.to_lowercase().next().unwrap_or(c);
                [c, lowered]
                    .into_iter()
                    .find_map(|ch| self.bindings.get(&KeyEvent::new(KeyCode::Char(ch), modifiers)))
                    .copied()
            }
            _ => None,
        }
    }

    pub fn add_binding(&mut self, key: KeyEvent, action: Action) {
        self.bindings.insert(key, action);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Merge custom keybindings from configuration
    pub fn merge_config(&mut self, config: &crate::config::KeyBindingConfig) {
        for (key_str, action) in &config.global {
            if let Some(key_event) = parse_key_str(key_str) {
                self.add_binding(key_event, *action);
            } else {
                tracing::warn!("Invalid key string in config: {}", key_str);
            }
        }
    }
}

/// Parse a key string into a KeyEvent
/// Supported formats:
/// - Single char: "j", "k", "1"
/// - Special keys: "Enter", "Tab", "BackTab", "Space", "Esc", "Up", "Down", "Left", "Right"
/// - With modifiers: "Ctrl+C", "Shift+Tab"
pub fn parse_key_str(key_str: &str) -> Option<KeyEvent> {
    let parts: Vec<&str> = key_str.split('+').collect();

    let mut modifiers = KeyModifiers::empty();
    let key_part = if parts.len() > 1 {
        // Has modifiers
        for modifier in &parts[..parts.len() - 1] {
            match modifier.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" => modifiers |= KeyModifiers::ALT,
                _ => return None, // Invalid modifier
            }
        }
        parts[parts.len() - 1]
    } else {
        parts[0]
    };

    let code = match key_part {
        "Enter" => KeyCode::Enter,
        "Tab" if modifiers.contains(KeyModifiers::SHIFT) => {
            modifiers -= KeyModifiers::SHIFT;
            KeyCode::BackTab
        }
        "Tab" => KeyCode::Tab,
        "BackTab" => KeyCode::BackTab,
        "Space" => KeyCode::Char(' '),
        "Esc" => KeyCode::Esc,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Backspace" => KeyCode::Backspace,
        "Delete" => KeyCode::Delete,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None, // Unknown key
            }
        }
    };

    Some(KeyEvent::new(code, modifiers))
}
