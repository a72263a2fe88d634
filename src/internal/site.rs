//! Page bootstrap and event routing.
//!
//! [`Site`] owns the element registry, the clock and both state machines.
//! Hosts feed it input, geometry and time; everything else happens inside.

use std::time::Duration;

use crate::config::TimingConfig;

use super::action::Action;
use super::clock::{TimerEvent, Timers};
use super::fade::settle;
use super::intro::{GateInput, IntroSequencer, IntroTiming, Stage, reveal_section};
use super::page::{CursorTarget, ElementKey, Page, PageLayout, ScrollBehavior, Section};
use super::storage::KeyValueStore;
use super::theme::{
    ApplyOptions, SystemPreference, Theme, ThemeMode, apply_theme_mode, on_system_change,
    stored_theme_mode,
};
use super::tracker::{PageKey, SectionTracker};

/// Rows moved by a single scroll step.
pub const SCROLL_STEP: i64 = 3;

/// What became of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Swallowed by the continue gate before anything else saw it.
    Consumed,
    /// Acted on; default handling should not run.
    Handled,
    /// Nobody wanted it.
    Ignored,
}

pub struct Site {
    page: Page,
    timers: Timers,
    tracker: SectionTracker,
    intro: IntroSequencer,
    timing: IntroTiming,
    store: Box<dyn KeyValueStore>,
    system: Box<dyn SystemPreference>,
}

impl Site {
    #[tracing::instrument(skip_all)]
    pub fn bootstrap(
        page: Page,
        store: Box<dyn KeyValueStore>,
        system: Box<dyn SystemPreference>,
        timing: &TimingConfig,
        scroll: ScrollBehavior,
    ) -> Self {
        let mut site = Self {
            page,
            timers: Timers::new(),
            tracker: SectionTracker::new(
                Duration::from_millis(timing.keyboard_nav_reset_ms),
                scroll,
            ),
            intro: IntroSequencer::new(IntroTiming::from(timing)),
            timing: IntroTiming::from(timing),
            store,
            system,
        };

        let mode = stored_theme_mode(site.store.as_ref());
        let theme = apply_theme_mode(
            &mut site.page,
            mode,
            site.system.as_ref(),
            site.store.as_mut(),
            ApplyOptions::default(),
        );
        tracing::info!(%mode, %theme, "Bootstrapping page");

        for target in CursorTarget::ALL {
            if let Some(cursor) = site.page.get_mut(ElementKey::Cursor(target)) {
                cursor.active = false;
            }
        }

        let present: Vec<Section> = Section::ALL
            .into_iter()
            .filter(|s| site.page.contains(ElementKey::Section(*s)))
            .collect();
        for section in present.into_iter().skip(1) {
            if let Some(el) = site.page.get_mut(ElementKey::Section(section)) {
                el.opacity = 0.0;
            }
        }

        let Self {
            page,
            timers,
            tracker,
            intro,
            ..
        } = &mut site;
        intro.start(Stage {
            page,
            timers,
            tracker,
        });
        site
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn tracker(&self) -> &SectionTracker {
        &self.tracker
    }

    pub fn intro(&self) -> &IntroSequencer {
        &self.intro
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.page.root.theme_mode.unwrap_or_default()
    }

    pub fn theme(&self) -> Theme {
        self.page.root.theme.unwrap_or(Theme::Dark)
    }

    /// Run the clock forward to `now`, firing every callback due on the way.
    pub fn advance(&mut self, now: Duration) {
        if self.page.step_scroll(now) {
            self.tracker.on_scroll(&mut self.page);
        }
        while let Some(event) = self.timers.pop_due(now) {
            self.on_timer(event);
        }
    }

    fn on_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Intro(_) | TimerEvent::ContinueTimeout => self.intro.on_timer(
                event,
                Stage {
                    page: &mut self.page,
                    timers: &mut self.timers,
                    tracker: &mut self.tracker,
                },
            ),
            TimerEvent::RevealSection(section) => {
                reveal_section(section, &mut self.page, &mut self.timers, &self.timing)
            }
            TimerEvent::FadeSettled(key) => {
                settle(self.page.get_mut(key), self.timers.now());
                tracing::debug!(?key, "fade settled");
            }
            TimerEvent::KeyboardNavReset => self.tracker.on_nav_reset(),
        }
    }

    fn offer_to_gate(&mut self, input: GateInput) -> bool {
        self.intro.handle_input(
            input,
            Stage {
                page: &mut self.page,
                timers: &mut self.timers,
                tracker: &mut self.tracker,
            },
        )
    }

    /// A key went down. `action` is whatever the key is bound to.
    pub fn key_down(&mut self, action: Option<Action>) -> Dispatch {
        if self.offer_to_gate(GateInput::KeyDown) {
            return Dispatch::Consumed;
        }
        match action {
            Some(Action::NextSection) => self.page_key(PageKey::Next),
            Some(Action::PreviousSection) => self.page_key(PageKey::Previous),
            Some(Action::ScrollDown) => {
                self.scroll_by(SCROLL_STEP);
                Dispatch::Handled
            }
            Some(Action::ScrollUp) => {
                self.scroll_by(-SCROLL_STEP);
                Dispatch::Handled
            }
            Some(Action::FocusNext) => {
                self.page.focus_step(true);
                Dispatch::Handled
            }
            Some(Action::FocusPrevious) => {
                self.page.focus_step(false);
                Dispatch::Handled
            }
            Some(Action::Activate) => match self.page.focus() {
                Some(target) => self.click(target),
                None => Dispatch::Ignored,
            },
            Some(Action::SetThemeMode(mode)) => {
                self.select_theme_mode(mode);
                Dispatch::Handled
            }
            Some(Action::Quit) | None => Dispatch::Ignored,
        }
    }

    pub fn key_up(&mut self) -> Dispatch {
        if self.offer_to_gate(GateInput::KeyUp) {
            Dispatch::Consumed
        } else {
            Dispatch::Ignored
        }
    }

    /// A pointer press, followed by a click on `target` unless the gate
    /// takes it.
    pub fn pointer_down(&mut self, target: Option<ElementKey>) -> Dispatch {
        if self.offer_to_gate(GateInput::PointerDown) {
            return Dispatch::Consumed;
        }
        match target {
            Some(target) => self.click(target),
            None => Dispatch::Ignored,
        }
    }

    pub fn click(&mut self, target: ElementKey) -> Dispatch {
        if !self.page.contains(target) {
            return Dispatch::Ignored;
        }
        match target {
            ElementKey::NavItem(i) => {
                let before = self.page.scroll_y();
                self.tracker.nav_click(&mut self.page, &mut self.timers, i);
                self.notify_scroll_since(before);
                Dispatch::Handled
            }
            ElementKey::ThemeButton(mode) => {
                self.select_theme_mode(mode);
                Dispatch::Handled
            }
            _ => Dispatch::Ignored,
        }
    }

    fn page_key(&mut self, key: PageKey) -> Dispatch {
        let before = self.page.scroll_y();
        if self.tracker.page_key(&mut self.page, &mut self.timers, key) {
            self.notify_scroll_since(before);
            Dispatch::Handled
        } else {
            Dispatch::Ignored
        }
    }

    /// Instant navigation scrolls still count as scroll events.
    fn notify_scroll_since(&mut self, before: u32) {
        if self.page.scroll_y() != before {
            self.tracker.on_scroll(&mut self.page);
        }
    }

    /// Explicit user choice: applied and persisted.
    pub fn select_theme_mode(&mut self, mode: ThemeMode) -> Theme {
        apply_theme_mode(
            &mut self.page,
            mode,
            self.system.as_ref(),
            self.store.as_mut(),
            ApplyOptions { persist: true },
        )
    }

    /// The system appearance signal changed.
    pub fn system_theme_changed(&mut self) -> Option<Theme> {
        on_system_change(&mut self.page, self.system.as_ref(), self.store.as_mut())
    }

    /// Swap the system signal, e.g. after the host re-detected it.
    pub fn set_system_preference(&mut self, system: Box<dyn SystemPreference>) -> Option<Theme> {
        self.system = system;
        self.system_theme_changed()
    }

    pub fn scroll_by(&mut self, delta: i64) {
        if self.page.scroll_by(delta) {
            self.tracker.on_scroll(&mut self.page);
        }
    }

    pub fn set_layout(&mut self, layout: PageLayout) {
        let before = self.page.scroll_y();
        if !self.page.set_layout(layout) {
            return;
        }
        if self.page.scroll_y() != before {
            self.tracker.on_scroll(&mut self.page);
        } else {
            self.tracker.check_intersections(&mut self.page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::intro::IntroState;
    use crate::internal::page::SectionBox;
    use crate::internal::storage::{DisabledStore, MemoryStore};
    use crate::internal::theme::FixedPreference;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn layout() -> PageLayout {
        PageLayout {
            sections: Section::ALL
                .iter()
                .enumerate()
                .map(|(i, s)| SectionBox {
                    section: *s,
                    top: i as u32 * 40,
                    height: 40,
                })
                .collect(),
            doc_height: 240,
            viewport_height: 40,
            nav_height: 3,
        }
    }

    fn site_with(page: Page) -> Site {
        let mut site = Site::bootstrap(
            page,
            Box::new(MemoryStore::default()),
            Box::new(FixedPreference(Theme::Dark)),
            &TimingConfig::default(),
            ScrollBehavior::Instant,
        );
        site.set_layout(layout());
        site
    }

    #[test]
    fn bootstrap_hides_everything_but_welcome() {
        let site = site_with(Page::complete());
        for section in Section::ALL {
            let opacity = site
                .page()
                .get(ElementKey::Section(section))
                .unwrap()
                .opacity;
            let expected = if section == Section::Welcome { 1.0 } else { 0.0 };
            assert_eq!(opacity, expected, "{section}");
        }
        assert_eq!(site.intro().state(), IntroState::Init);
        assert_eq!(site.theme_mode(), ThemeMode::Auto);
        assert_eq!(site.theme(), Theme::Dark);
    }

    #[test]
    fn gate_key_never_reaches_navigation() {
        let mut site = site_with(Page::complete());
        site.advance(ms(1500));
        assert_eq!(site.key_down(Some(Action::NextSection)), Dispatch::Consumed);
        assert_eq!(site.tracker().current_index(), 0);
        assert_eq!(site.page().scroll_y(), 0);

        assert_eq!(site.key_down(Some(Action::NextSection)), Dispatch::Handled);
        assert_eq!(site.tracker().current_index(), 1);
        assert_eq!(site.page().scroll_y(), 38);
    }

    #[test]
    fn pointer_during_gate_does_not_click() {
        let mut site = site_with(Page::complete());
        site.advance(ms(1500));
        assert_eq!(
            site.pointer_down(Some(ElementKey::NavItem(4))),
            Dispatch::Consumed
        );
        assert_eq!(site.tracker().current_index(), 0);
        assert!(!site.tracker().is_keyboard_navigating());
    }

    #[test]
    fn nav_click_works_before_the_gate_opens() {
        let mut site = site_with(Page::complete());
        assert_eq!(site.click(ElementKey::NavItem(2)), Dispatch::Handled);
        assert_eq!(site.tracker().current_index(), 2);
        // Cursor override from the intro still wins.
        let welcome = site
            .page()
            .get(ElementKey::Cursor(CursorTarget::Section(Section::Welcome)))
            .unwrap();
        assert!(welcome.active);
    }

    #[test]
    fn activate_clicks_the_focused_element() {
        let mut site = site_with(Page::complete());
        site.advance(ms(6500));
        assert!(site.intro().is_complete());
        assert_eq!(site.key_down(Some(Action::Activate)), Dispatch::Ignored);
        site.key_down(Some(Action::FocusPrevious));
        assert_eq!(
            site.page().focus(),
            Some(ElementKey::ThemeButton(ThemeMode::Dark))
        );
        assert_eq!(site.key_down(Some(Action::Activate)), Dispatch::Handled);
        assert_eq!(site.theme_mode(), ThemeMode::Dark);
    }

    #[test]
    fn first_scroll_after_reveal_drops_the_override() {
        let mut site = site_with(Page::complete());
        site.advance(ms(6500));
        assert_eq!(
            site.tracker().cursor_override(),
            Some(CursorTarget::Section(Section::About))
        );
        site.scroll_by(1);
        assert_eq!(site.tracker().cursor_override(), None);
        let welcome = site
            .page()
            .get(ElementKey::Cursor(CursorTarget::Section(Section::Welcome)))
            .unwrap();
        assert!(welcome.active);
    }

    #[test]
    fn reveal_fades_settle() {
        let mut site = site_with(Page::complete());
        site.advance(ms(6500));
        site.advance(ms(7500));
        for section in Section::ALL {
            let el = site.page().get(ElementKey::Section(section)).unwrap();
            assert!(el.transition.is_none(), "{section} still fading");
            assert_eq!(el.opacity_at(ms(7500)), 1.0);
        }
        assert_eq!(site.timers().pending_count(), 0);
    }

    #[test]
    fn switcher_persists_but_bootstrap_does_not() {
        let mut site = Site::bootstrap(
            Page::complete(),
            Box::new(DisabledStore),
            Box::new(FixedPreference(Theme::Light)),
            &TimingConfig::default(),
            ScrollBehavior::Instant,
        );
        assert_eq!(site.theme(), Theme::Light);
        assert_eq!(
            site.click(ElementKey::ThemeButton(ThemeMode::Dark)),
            Dispatch::Handled
        );
        assert_eq!(site.theme(), Theme::Dark);
        assert!(
            site.page()
                .get(ElementKey::ThemeButton(ThemeMode::Dark))
                .unwrap()
                .pressed
        );
    }

    #[test]
    fn system_change_follows_auto_only() {
        let mut site = site_with(Page::complete());
        assert_eq!(
            site.set_system_preference(Box::new(FixedPreference(Theme::Light))),
            Some(Theme::Light)
        );
        site.select_theme_mode(ThemeMode::Dark);
        assert_eq!(
            site.set_system_preference(Box::new(FixedPreference(Theme::Dark))),
            None
        );
        assert_eq!(site.theme(), Theme::Dark);
    }
}
