//! Element registry standing in for the rendered document.
//!
//! Every element the page logic touches is looked up by an [`ElementKey`].
//! A key that was never inserted behaves like a missing node: operations on
//! it quietly do nothing. Geometry (section offsets, viewport, nav height) is
//! supplied by whoever lays the page out, so the state machines never depend
//! on a concrete renderer.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::theme::{Theme, ThemeMode};

/// Content sections in display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Welcome,
    About,
    Experience,
    Skills,
    Education,
    Contact,
}

impl Section {
    pub const COUNT: usize = 6;

    pub const ALL: [Section; Section::COUNT] = [
        Section::Welcome,
        Section::About,
        Section::Experience,
        Section::Skills,
        Section::Education,
        Section::Contact,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn id(self) -> &'static str {
        match self {
            Section::Welcome => "welcome",
            Section::About => "about",
            Section::Experience => "experience",
            Section::Skills => "skills",
            Section::Education => "education",
            Section::Contact => "contact",
        }
    }
}

/// Where a terminal-style cursor can be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CursorTarget {
    Section(Section),
    PressKey,
}

impl CursorTarget {
    /// Every cursor the document provides, in document order.
    pub const ALL: [CursorTarget; 7] = [
        CursorTarget::Section(Section::Welcome),
        CursorTarget::PressKey,
        CursorTarget::Section(Section::About),
        CursorTarget::Section(Section::Experience),
        CursorTarget::Section(Section::Skills),
        CursorTarget::Section(Section::Education),
        CursorTarget::Section(Section::Contact),
    ];

    pub fn id(self) -> &'static str {
        match self {
            CursorTarget::Section(section) => section.id(),
            CursorTarget::PressKey => "pressKey",
        }
    }
}

impl std::fmt::Display for CursorTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Logical name of an element on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKey {
    MainContent,
    NavBar,
    AsciiArt,
    Tagline,
    PressKey,
    Section(Section),
    Cursor(CursorTarget),
    /// Navigation items by position: the home item first, then one per
    /// section in section order.
    NavItem(usize),
    ThemeButton(ThemeMode),
    /// Form fields; paging keys are left to them while they hold focus.
    TextInput(usize),
}

impl ElementKey {
    pub fn is_focusable(self) -> bool {
        matches!(
            self,
            ElementKey::NavItem(_) | ElementKey::ThemeButton(_) | ElementKey::TextInput(_)
        )
    }
}

/// Opacity animation between two values, eased in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: f32,
    pub to: f32,
    pub start: Duration,
    pub duration: Duration,
}

impl Transition {
    pub fn value_at(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.start);
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * t * t
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.start) >= self.duration
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub displayed: bool,
    /// Committed opacity; the end value of any running transition.
    pub opacity: f32,
    pub transition: Option<Transition>,
    pub active: bool,
    pub animation_complete: bool,
    pub pressed: bool,
    /// Text inputs swallow paging keys while focused.
    pub text_entry: bool,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            displayed: true,
            opacity: 1.0,
            transition: None,
            active: false,
            animation_complete: false,
            pressed: false,
            text_entry: false,
        }
    }
}

impl Element {
    pub fn text_input() -> Self {
        Self {
            text_entry: true,
            ..Self::default()
        }
    }

    /// Rendered opacity at `now`, zero while not displayed.
    pub fn opacity_at(&self, now: Duration) -> f32 {
        if !self.displayed {
            return 0.0;
        }
        match &self.transition {
            Some(transition) => transition.value_at(now),
            None => self.opacity,
        }
    }
}

/// Document-level markers mirrored from the theme resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootMarkers {
    pub theme_mode: Option<ThemeMode>,
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBox {
    pub section: Section,
    pub top: u32,
    pub height: u32,
}

impl SectionBox {
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }
}

/// Geometry of the laid-out document, in rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLayout {
    pub sections: Vec<SectionBox>,
    pub doc_height: u32,
    pub viewport_height: u32,
    pub nav_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScrollAnimation {
    from: u32,
    to: u32,
    start: Duration,
    duration: Duration,
}

impl ScrollAnimation {
    fn position_at(&self, now: Duration) -> u32 {
        let elapsed = now.saturating_sub(self.start);
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let eased = 1.0 - (1.0 - t).powi(3);
        let delta = f64::from(self.to) - f64::from(self.from);
        (f64::from(self.from) + delta * eased).round().max(0.0) as u32
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    elements: BTreeMap<ElementKey, Element>,
    pub root: RootMarkers,
    focus: Option<ElementKey>,
    layout: PageLayout,
    scroll_y: u32,
    scroll_animation: Option<ScrollAnimation>,
    smooth_scroll_duration: Duration,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Self {
            elements: BTreeMap::new(),
            root: RootMarkers::default(),
            focus: None,
            layout: PageLayout::default(),
            scroll_y: 0,
            scroll_animation: None,
            smooth_scroll_duration: Duration::from_millis(450),
        }
    }

    /// A page carrying every element of the full document.
    pub fn complete() -> Self {
        let mut page = Self::new()
            .with(ElementKey::MainContent)
            .with(ElementKey::NavBar)
            .with(ElementKey::AsciiArt)
            .with(ElementKey::Tagline)
            .with(ElementKey::PressKey);
        for section in Section::ALL {
            page.insert(ElementKey::Section(section), Element::default());
        }
        for target in CursorTarget::ALL {
            page.insert(ElementKey::Cursor(target), Element::default());
        }
        for i in 0..Section::COUNT {
            page.insert(ElementKey::NavItem(i), Element::default());
        }
        for mode in ThemeMode::ALL {
            page.insert(ElementKey::ThemeButton(mode), Element::default());
        }
        page
    }

    pub fn with(mut self, key: ElementKey) -> Self {
        self.insert(key, Element::default());
        self
    }

    pub fn without(mut self, key: ElementKey) -> Self {
        self.elements.remove(&key);
        if self.focus == Some(key) {
            self.focus = None;
        }
        self
    }

    pub fn with_smooth_scroll_duration(mut self, duration: Duration) -> Self {
        self.smooth_scroll_duration = duration;
        self
    }

    pub fn insert(&mut self, key: ElementKey, element: Element) {
        self.elements.insert(key, element);
    }

    pub fn contains(&self, key: ElementKey) -> bool {
        self.elements.contains_key(&key)
    }

    pub fn get(&self, key: ElementKey) -> Option<&Element> {
        self.elements.get(&key)
    }

    pub fn get_mut(&mut self, key: ElementKey) -> Option<&mut Element> {
        self.elements.get_mut(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ElementKey> + '_ {
        self.elements.keys().copied()
    }

    /// Present navigation item positions, ascending.
    pub fn nav_items(&self) -> Vec<usize> {
        self.elements
            .keys()
            .filter_map(|key| match key {
                ElementKey::NavItem(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    pub fn theme_buttons(&self) -> Vec<ThemeMode> {
        self.elements
            .keys()
            .filter_map(|key| match key {
                ElementKey::ThemeButton(mode) => Some(*mode),
                _ => None,
            })
            .collect()
    }

    // --- focus -----------------------------------------------------------

    pub fn focus(&self) -> Option<ElementKey> {
        self.focus
    }

    pub fn set_focus(&mut self, key: ElementKey) -> bool {
        if self.contains(key) {
            self.focus = Some(key);
            true
        } else {
            false
        }
    }

    pub fn blur(&mut self) {
        if let Some(key) = self.focus.take() {
            tracing::debug!(?key, "focus cleared");
        }
    }

    pub fn focus_is_text_entry(&self) -> bool {
        self.focus
            .and_then(|key| self.get(key))
            .is_some_and(|el| el.text_entry)
    }

    /// Move focus through focusable elements, wrapping at both ends.
    pub fn focus_step(&mut self, forward: bool) -> Option<ElementKey> {
        let focusable: Vec<ElementKey> = self
            .elements
            .iter()
            .filter(|(key, el)| key.is_focusable() || el.text_entry)
            .map(|(key, _)| *key)
            .collect();
        if focusable.is_empty() {
            return None;
        }
        let len = focusable.len();
        let next = match self.focus.and_then(|f| focusable.iter().position(|k| *k == f)) {
            Some(pos) if forward => (pos + 1) % len,
            Some(pos) => (pos + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        self.focus = Some(focusable[next]);
        self.focus
    }

    // --- geometry and scrolling -------------------------------------------

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Replace the geometry. Returns true when anything changed.
    pub fn set_layout(&mut self, layout: PageLayout) -> bool {
        if self.layout == layout {
            return false;
        }
        self.layout = layout;
        let clamped = self.scroll_y.min(self.max_scroll());
        self.scroll_y = clamped;
        if let Some(anim) = &mut self.scroll_animation {
            anim.to = anim.to.min(self.layout.doc_height.saturating_sub(self.layout.viewport_height));
        }
        true
    }

    pub fn section_box(&self, section: Section) -> Option<SectionBox> {
        self.layout
            .sections
            .iter()
            .find(|b| b.section == section)
            .copied()
    }

    pub fn scroll_y(&self) -> u32 {
        self.scroll_y
    }

    pub fn is_scroll_animating(&self) -> bool {
        self.scroll_animation.is_some()
    }

    pub fn max_scroll(&self) -> u32 {
        self.layout
            .doc_height
            .saturating_sub(self.layout.viewport_height)
    }

    /// Rows hidden by the sticky nav bar, less one so a section's top rule
    /// tucks under the bar's bottom border.
    pub fn sticky_nav_offset(&self) -> u32 {
        if !self.contains(ElementKey::NavBar) {
            return 0;
        }
        self.layout.nav_height.saturating_sub(1)
    }

    /// Start scrolling to `y`. Returns true if the position moved right away.
    pub fn scroll_to(&mut self, y: i64, behavior: ScrollBehavior, now: Duration) -> bool {
        let target = y.clamp(0, i64::from(self.max_scroll())) as u32;
        match behavior {
            ScrollBehavior::Smooth if !self.smooth_scroll_duration.is_zero() => {
                self.scroll_animation = Some(ScrollAnimation {
                    from: self.scroll_y,
                    to: target,
                    start: now,
                    duration: self.smooth_scroll_duration,
                });
                false
            }
            _ => {
                self.scroll_animation = None;
                self.set_scroll(target)
            }
        }
    }

    /// User-driven scroll; interrupts any smooth scroll in flight.
    pub fn scroll_by(&mut self, delta: i64) -> bool {
        self.scroll_animation = None;
        let target = (i64::from(self.scroll_y) + delta).clamp(0, i64::from(self.max_scroll()));
        self.set_scroll(target as u32)
    }

    /// Advance a running smooth scroll. Returns true if the position moved.
    pub fn step_scroll(&mut self, now: Duration) -> bool {
        let Some(anim) = self.scroll_animation else {
            return false;
        };
        let y = anim.position_at(now);
        if y == anim.to {
            self.scroll_animation = None;
        }
        self.set_scroll(y)
    }

    fn set_scroll(&mut self, y: u32) -> bool {
        if y == self.scroll_y {
            return false;
        }
        self.scroll_y = y;
        true
    }
}
