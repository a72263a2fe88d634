use std::io::{self, Stdout, stdout};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{
    ExecutableCommand,
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

static KEYBOARD_ENHANCED: AtomicBool = AtomicBool::new(false);

/// Enter raw mode and the alternate screen with mouse capture.
///
/// Key release events are requested where the terminal supports them so
/// the continue prompt can react to `keyup` as well.
pub fn init() -> io::Result<Tui> {
    enable_raw_mode()?;

    match supports_keyboard_enhancement() {
        Ok(true) => {
            let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
            match stdout().execute(PushKeyboardEnhancementFlags(flags)) {
                Ok(_) => KEYBOARD_ENHANCED.store(true, Ordering::Relaxed),
                Err(e) => tracing::warn!("Failed to enable keyboard enhancement: {}", e),
            }
        }
        Ok(false) => tracing::info!("Keyboard enhancement not supported by terminal"),
        Err(e) => tracing::warn!("Failed to query keyboard enhancement support: {}", e),
    }

    if let Err(e) = stdout().execute(EnterAlternateScreen) {
        let _ = restore();
        return Err(e);
    }
    if let Err(e) = stdout().execute(EnableMouseCapture) {
        tracing::warn!("Failed to enable mouse capture: {}", e);
    }

    Terminal::new(CrosstermBackend::new(stdout()))
}

pub fn restore() -> io::Result<()> {
    if KEYBOARD_ENHANCED.swap(false, Ordering::Relaxed) {
        let _ = stdout().execute(PopKeyboardEnhancementFlags);
    }
    let _ = stdout().execute(DisableMouseCapture);
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()
}
