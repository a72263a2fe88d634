use crate::internal::action::Action;
use crate::internal::theme::ThemeMode;
use crate::internal::ui::keybindings::KeyBindingMap;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Create default keybindings for the application
pub fn create_default_keybindings() -> KeyBindingMap {
    let mut map = KeyBindingMap::new();

    // Quit
    map.add_binding(key('q'), Action::Quit);
    map.add_binding(
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        Action::Quit,
    );

    // Section paging
    map.add_binding(key('j'), Action::NextSection);
    map.add_binding(key('k'), Action::PreviousSection);
    map.add_binding(key_code(KeyCode::Down), Action::NextSection);
    map.add_binding(key_code(KeyCode::Up), Action::PreviousSection);

    // Free scrolling
    map.add_binding(key_code(KeyCode::PageDown), Action::ScrollDown);
    map.add_binding(key_code(KeyCode::PageUp), Action::ScrollUp);

    // Focus and activation
    map.add_binding(key_code(KeyCode::Tab), Action::FocusNext);
    map.add_binding(key_code(KeyCode::BackTab), Action::FocusPrevious);
    map.add_binding(key_code(KeyCode::Enter), Action::Activate);
    map.add_binding(key(' '), Action::Activate);

    // Theme switcher
    map.add_binding(key('a'), Action::SetThemeMode(ThemeMode::Auto));
    map.add_binding(key('l'), Action::SetThemeMode(ThemeMode::Light));
    map.add_binding(key('d'), Action::SetThemeMode(ThemeMode::Dark));

    map
}

/// Helper to create a simple char key event
fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty())
}

/// Helper to create a key event from KeyCode
fn key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}
