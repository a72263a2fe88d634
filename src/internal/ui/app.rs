use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use super::document::Document;
use super::keybindings::KeyBindingMap;
use super::keybindings_default::create_default_keybindings;
use super::view;
use crate::config::AppConfig;
use crate::internal::action::Action;
use crate::internal::content::SiteContent;
use crate::internal::page::{ElementKey, ScrollBehavior};
use crate::internal::site::{Dispatch, SCROLL_STEP, Site};
use crate::internal::storage::{DisabledStore, FileStore, KeyValueStore};
use crate::internal::theme::{
    FixedPreference, SystemPreference, TerminalPreference, Theme, system_theme,
};
use crate::utils::theme_loader::Palettes;

/// Messages posted to the event loop by background tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    AppearanceChanged(Theme),
}

pub struct App {
    pub running: bool,
    pub config: AppConfig,
    pub content: SiteContent,
    pub site: Site,
    pub palettes: Palettes,
    pub keybindings: KeyBindingMap,
    /// Clickable regions from the last frame.
    pub hit_map: Vec<(Rect, ElementKey)>,
    /// Terminal area of the last tick.
    pub area: Rect,
    pub event_tx: UnboundedSender<AppEvent>,
    pub event_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let content = SiteContent::load_or_default(config.content_file.as_deref());
        let store = Self::open_store(&config);
        let system: Box<dyn SystemPreference> = match config.appearance {
            Some(theme) => Box::new(FixedPreference(theme)),
            None => Box::new(TerminalPreference),
        };
        tracing::info!("Detected system appearance: {}", system_theme(system.as_ref()));

        let site = Self::bootstrap_site(&config, &content, store, system);
        Self::with_site(config, content, site)
    }

    /// Build the page for `content` and bootstrap it.
    pub fn bootstrap_site(
        config: &AppConfig,
        content: &SiteContent,
        store: Box<dyn KeyValueStore>,
        system: Box<dyn SystemPreference>,
    ) -> Site {
        let scroll = match config.smooth_scroll {
            true => ScrollBehavior::Smooth,
            false => ScrollBehavior::Instant,
        };
        let page = content.build_page(Duration::from_millis(config.timing.smooth_scroll_ms));
        Site::bootstrap(page, store, system, &config.timing, scroll)
    }

    pub fn with_site(config: AppConfig, content: SiteContent, site: Site) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let palettes = Palettes::load_or_builtin(config.theme_file.as_deref());

        let mut keybindings = create_default_keybindings();
        if let Some(custom) = &config.keybindings {
            keybindings.merge_config(custom);
        }

        Self {
            running: true,
            config,
            content,
            site,
            palettes,
            keybindings,
            hit_map: Vec::new(),
            area: Rect::default(),
            event_tx,
            event_rx,
        }
    }

    fn open_store(config: &AppConfig) -> Box<dyn KeyValueStore> {
        let opened = match &config.storage_file {
            Some(path) => FileStore::open(PathBuf::from(path)),
            None => FileStore::load_or_create(),
        };
        match opened {
            Ok(store) => Box::new(store),
            Err(e) => {
                tracing::warn!("Preference storage unavailable, theme choice won't persist: {:#}", e);
                Box::new(DisabledStore)
            }
        }
    }

    /// Lay the document out for a terminal of `area`, then run the page
    /// clock forward to `now`.
    pub fn tick(&mut self, area: Rect, now: Duration) {
        self.area = area;
        self.relayout();
        self.site.advance(now);
        // Timers may have shown or hidden header rows.
        self.relayout();
    }

    /// Rebuild the document from the current registry and hand the
    /// geometry to the page, so observers never read stale rows.
    fn relayout(&mut self) {
        // The bottom row is the status bar.
        let viewport = self.area.height.saturating_sub(1);
        let document = Document::build(&self.content, self.site.page(), self.area.width);
        self.site.set_layout(document.layout(u32::from(viewport)));
    }

    pub async fn run(&mut self, mut tui: crate::tui::Tui) -> Result<()> {
        self.spawn_appearance_watcher();

        let started = tokio::time::Instant::now();
        let mut event_interval = tokio::time::interval(Duration::from_millis(16));

        loop {
            let size = tui.size()?;
            self.tick(Rect::new(0, 0, size.width, size.height), started.elapsed());
            tui.draw(|f| view::draw(self, f))?;

            tokio::select! {
                _ = event_interval.tick() => {
                    while event::poll(Duration::ZERO)? {
                        self.handle_terminal_event(event::read()?);
                    }
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_app_event(event);
                }
            }

            if !self.running {
                break;
            }
        }
        Ok(())
    }

    fn spawn_appearance_watcher(&self) {
        if self.config.appearance.is_some() {
            return;
        }
        let tx = self.event_tx.clone();
        let period = Duration::from_secs(self.config.appearance_poll_secs.max(1));
        let mut last = system_theme(&TerminalPreference);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let current = desktop_appearance()
                    .await
                    .unwrap_or_else(|| system_theme(&TerminalPreference));
                if current == last {
                    continue;
                }
                last = current;
                if tx.send(AppEvent::AppearanceChanged(current)).is_err() {
                    break;
                }
            }
        });
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AppearanceChanged(theme) => {
                tracing::info!(%theme, "System appearance changed");
                self.site
                    .set_system_preference(Box::new(FixedPreference(theme)));
            }
        }
    }

    pub fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => match key.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => self.handle_key_press(key),
                KeyEventKind::Release => {
                    self.site.key_up();
                }
            },
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => return,
        }
        self.relayout();
    }

    fn handle_key_press(&mut self, key: KeyEvent) {
        // Ctrl+C always leaves, even while the continue prompt is waiting.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return;
        }

        let action = self.keybindings.get_action(&key);
        let dispatch = self.site.key_down(action);
        tracing::trace!(code = ?key.code, ?action, ?dispatch, "key press");

        if dispatch != Dispatch::Consumed && action == Some(Action::Quit) {
            self.running = false;
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let target = self.hit_test(mouse.column, mouse.row);
                self.site.pointer_down(target);
            }
            MouseEventKind::Down(_) => {
                self.site.pointer_down(None);
            }
            MouseEventKind::ScrollDown => self.site.scroll_by(SCROLL_STEP),
            MouseEventKind::ScrollUp => self.site.scroll_by(-SCROLL_STEP),
            _ => {}
        }
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<ElementKey> {
        let position = Position::new(column, row);
        self.hit_map
            .iter()
            .find(|(rect, _)| rect.contains(position))
            .map(|(_, key)| *key)
    }
}

/// Ask the desktop for its colour scheme, when it exposes one.
async fn desktop_appearance() -> Option<Theme> {
    use tokio::process::Command;

    if cfg!(target_os = "macos") {
        let output = Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .await
            .ok()?;
        // The key only exists while dark mode is on.
        let dark = String::from_utf8_lossy(&output.stdout).trim() == "Dark";
        return Some(if dark { Theme::Dark } else { Theme::Light });
    }

    let output = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_color_scheme(&String::from_utf8_lossy(&output.stdout))
}

fn parse_color_scheme(raw: &str) -> Option<Theme> {
    match raw.trim().trim_matches('\'') {
        "prefer-dark" => Some(Theme::Dark),
        "prefer-light" | "default" => Some(Theme::Light),
        _ => None,
    }
}
