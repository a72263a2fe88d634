//! Timed header reveal that gates the rest of the page.
//!
//! `Init` shows only the prompt line. After a pause the ASCII art fades in
//! (`ShowArt`), then the tagline (`ShowTagline`), then the "press any key"
//! prompt (`ShowPrompt`). From `ShowArt` onward a continue gate waits for a
//! key, a pointer press or a timeout; the first of those completes the
//! sequence and every other pending stage is cancelled.

use std::time::Duration;

use crate::config::TimingConfig;

use super::clock::{CancelToken, TimerEvent, Timers};
use super::fade::{fade_in, hide_element};
use super::observer::RootMargin;
use super::page::{CursorTarget, ElementKey, Page, Section};
use super::tracker::SectionTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntroState {
    Init,
    ShowArt,
    ShowTagline,
    ShowPrompt,
    Completed,
}

/// Input that can open the continue gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateInput {
    KeyDown,
    KeyUp,
    PointerDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Closed,
    Listening,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroTiming {
    pub art_delay: Duration,
    pub step_delay: Duration,
    pub header_fade: Duration,
    pub continue_timeout: Duration,
    pub section_fade: Duration,
    pub section_stagger: Duration,
}

impl Default for IntroTiming {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}

impl From<&TimingConfig> for IntroTiming {
    fn from(cfg: &TimingConfig) -> Self {
        Self {
            art_delay: Duration::from_millis(cfg.header_art_delay_ms),
            step_delay: Duration::from_millis(cfg.header_step_delay_ms),
            header_fade: Duration::from_millis(cfg.header_fade_ms),
            continue_timeout: Duration::from_millis(cfg.continue_timeout_ms),
            section_fade: Duration::from_millis(cfg.section_fade_ms),
            section_stagger: Duration::from_millis(cfg.section_stagger_ms),
        }
    }
}

/// Everything a stage transition may touch.
pub struct Stage<'a> {
    pub page: &'a mut Page,
    pub timers: &'a mut Timers,
    pub tracker: &'a mut SectionTracker,
}

#[derive(Debug)]
pub struct IntroSequencer {
    state: IntroState,
    gate: Gate,
    token: Option<CancelToken>,
    timing: IntroTiming,
}

impl IntroSequencer {
    pub fn new(timing: IntroTiming) -> Self {
        Self {
            state: IntroState::Init,
            gate: Gate::Closed,
            token: None,
            timing,
        }
    }

    pub fn state(&self) -> IntroState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.gate == Gate::Listening
    }

    pub fn is_complete(&self) -> bool {
        self.state == IntroState::Completed
    }

    pub fn token(&self) -> Option<CancelToken> {
        self.token
    }

    #[tracing::instrument(skip_all)]
    pub fn start(&mut self, stage: Stage<'_>) {
        if !stage.page.contains(ElementKey::PressKey) || !stage.page.contains(ElementKey::MainContent) {
            tracing::info!("Header elements missing; revealing content immediately");
            self.gate = Gate::Resolved;
            self.state = IntroState::Completed;
            show_remaining_content(stage, &self.timing);
            return;
        }

        if let Some(token) = self.token {
            stage.timers.cancel_all(token);
        }
        self.token = Some(stage.timers.token());
        self.gate = Gate::Closed;
        self.transition(IntroState::Init, stage);
    }

    /// Timer callbacks for the intro land here.
    pub fn on_timer(&mut self, event: TimerEvent, stage: Stage<'_>) {
        match event {
            TimerEvent::Intro(next) => self.transition(next, stage),
            TimerEvent::ContinueTimeout => {
                tracing::debug!("continue gate timed out");
                self.complete(stage);
            }
            _ => {}
        }
    }

    /// Offer an input event to the gate. Returns true when the gate consumed
    /// it, in which case nothing else should see the event.
    pub fn handle_input(&mut self, input: GateInput, stage: Stage<'_>) -> bool {
        if self.gate != Gate::Listening {
            return false;
        }
        tracing::debug!(?input, "continue gate opened by input");
        self.complete(stage);
        true
    }

    fn transition(&mut self, next: IntroState, stage: Stage<'_>) {
        if self.state == IntroState::Completed {
            return;
        }
        let Some(token) = self.token else {
            return;
        };
        tracing::debug!(from = ?self.state, to = ?next, "intro transition");
        self.state = next;
        let t = self.timing;

        match next {
            IntroState::Init => {
                if let Some(main) = stage.page.get_mut(ElementKey::MainContent) {
                    main.opacity = 1.0;
                    main.transition = None;
                }
                hide_element(stage.page.get_mut(ElementKey::AsciiArt));
                hide_element(stage.page.get_mut(ElementKey::Tagline));
                hide_element(stage.page.get_mut(ElementKey::PressKey));
                stage
                    .tracker
                    .set_cursor_override(stage.page, Some(CursorTarget::Section(Section::Welcome)));
                stage
                    .timers
                    .schedule_with(token, t.art_delay, TimerEvent::Intro(IntroState::ShowArt));
            }
            IntroState::ShowArt => {
                hide_element(stage.page.get_mut(ElementKey::AsciiArt));
                fade_in(
                    stage.page.get_mut(ElementKey::AsciiArt),
                    stage.timers,
                    t.header_fade,
                    true,
                    None,
                );
                stage
                    .timers
                    .schedule_with(token, t.step_delay, TimerEvent::Intro(IntroState::ShowTagline));
                // A focused nav item would otherwise be activated by the
                // key that opens the gate.
                stage.page.blur();
                self.gate = Gate::Listening;
                stage
                    .timers
                    .schedule_with(token, t.continue_timeout, TimerEvent::ContinueTimeout);
            }
            IntroState::ShowTagline => {
                fade_in(
                    stage.page.get_mut(ElementKey::Tagline),
                    stage.timers,
                    t.header_fade,
                    true,
                    None,
                );
                stage
                    .timers
                    .schedule_with(token, t.step_delay, TimerEvent::Intro(IntroState::ShowPrompt));
            }
            IntroState::ShowPrompt => {
                fade_in(
                    stage.page.get_mut(ElementKey::PressKey),
                    stage.timers,
                    t.header_fade,
                    true,
                    None,
                );
                stage
                    .tracker
                    .set_cursor_override(stage.page, Some(CursorTarget::PressKey));
            }
            IntroState::Completed => self.complete(stage),
        }
    }

    fn complete(&mut self, stage: Stage<'_>) {
        if self.gate == Gate::Resolved {
            return;
        }
        self.gate = Gate::Resolved;
        self.state = IntroState::Completed;
        if let Some(token) = self.token {
            stage.timers.cancel_all(token);
        }
        show_remaining_content(stage, &self.timing);
    }
}

/// Reveal everything below the header and hand control to the tracker.
#[tracing::instrument(skip_all)]
pub fn show_remaining_content(stage: Stage<'_>, timing: &IntroTiming) {
    let Stage {
        page,
        timers,
        tracker,
    } = stage;

    if let Some(prompt) = page.get_mut(ElementKey::PressKey) {
        prompt.displayed = false;
    }
    if let Some(tagline) = page.get_mut(ElementKey::Tagline) {
        tagline.displayed = true;
        tagline.transition = None;
        tagline.opacity = 1.0;
    }
    tracker.mark_animation_complete();

    tracker.set_cursor_override(page, Some(CursorTarget::Section(Section::About)));
    tracker.clear_override_on_next_scroll();

    if let Some(welcome) = page.get_mut(ElementKey::Section(Section::Welcome)) {
        welcome.animation_complete = true;
    }

    let remaining: Vec<Section> = Section::ALL[1..]
        .iter()
        .copied()
        .filter(|s| page.contains(ElementKey::Section(*s)))
        .collect();
    for (i, section) in remaining.into_iter().enumerate() {
        if let Some(el) = page.get_mut(ElementKey::Section(section)) {
            el.opacity = 0.0;
            el.transition = None;
        }
        timers.schedule(timing.section_stagger * i as u32, TimerEvent::RevealSection(section));
    }

    tracker.update_active_section(page, 0);
    tracker.start_observing(page, RootMargin::default());
    tracing::info!("Intro complete; content revealed");
}

/// Begin a section's staggered fade.
pub fn reveal_section(section: Section, page: &mut Page, timers: &mut Timers, timing: &IntroTiming) {
    let key = ElementKey::Section(section);
    fade_in(
        page.get_mut(key),
        timers,
        timing.section_fade,
        false,
        Some(TimerEvent::FadeSettled(key)),
    );
}
