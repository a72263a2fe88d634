use serde::{Deserialize, Serialize};

use super::theme::ThemeMode;

/// Things a key binding can ask the page to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Quit,
    NextSection,
    PreviousSection,
    ScrollDown,
    ScrollUp,
    FocusNext,
    FocusPrevious,
    Activate,
    SetThemeMode(ThemeMode),
}
