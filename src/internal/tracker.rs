//! Active-section bookkeeping.
//!
//! One index says which section is current. Navigation clicks, paging keys
//! and viewport intersection all funnel into [`SectionTracker::update_active_section`],
//! which is the only place nav highlighting and cursor markers change.

use std::time::Duration;

use super::clock::{TimerEvent, TimerId, Timers};
use super::observer::{IntersectionEntry, IntersectionObserver, RootMargin};
use super::page::{CursorTarget, ElementKey, Page, ScrollBehavior, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKey {
    Next,
    Previous,
}

#[derive(Debug)]
pub struct SectionTracker {
    current: usize,
    cursor_override: Option<CursorTarget>,
    animation_complete: bool,
    keyboard_navigating: bool,
    clear_override_on_scroll: bool,
    observer: Option<IntersectionObserver>,
    nav_reset: Option<TimerId>,
    nav_reset_delay: Duration,
    scroll_behavior: ScrollBehavior,
}

impl Default for SectionTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), ScrollBehavior::Smooth)
    }
}

impl SectionTracker {
    pub fn new(nav_reset_delay: Duration, scroll_behavior: ScrollBehavior) -> Self {
        Self {
            current: 0,
            cursor_override: None,
            animation_complete: false,
            keyboard_navigating: false,
            clear_override_on_scroll: false,
            observer: None,
            nav_reset: None,
            nav_reset_delay,
            scroll_behavior,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_section(&self) -> Section {
        Section::ALL[self.current]
    }

    pub fn cursor_override(&self) -> Option<CursorTarget> {
        self.cursor_override
    }

    /// The cursor that should currently be lit.
    pub fn cursor_target(&self) -> CursorTarget {
        self.cursor_override
            .unwrap_or(CursorTarget::Section(self.current_section()))
    }

    pub fn is_animation_complete(&self) -> bool {
        self.animation_complete
    }

    pub fn is_keyboard_navigating(&self) -> bool {
        self.keyboard_navigating
    }

    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    /// Clamp `index`, make it current, and sync nav items and cursors.
    pub fn update_active_section(&mut self, page: &mut Page, index: usize) {
        self.current = index.min(Section::COUNT - 1);

        for i in page.nav_items() {
            if let Some(item) = page.get_mut(ElementKey::NavItem(i)) {
                item.active = i == self.current;
            }
        }

        let lit = self.cursor_target();
        for target in CursorTarget::ALL {
            if let Some(cursor) = page.get_mut(ElementKey::Cursor(target)) {
                cursor.active = target == lit;
            }
        }

        tracing::debug!(index = self.current, cursor = %lit, "active section updated");
    }

    pub fn set_cursor_override(&mut self, page: &mut Page, target: Option<CursorTarget>) {
        self.cursor_override = target;
        self.update_active_section(page, self.current);
    }

    /// Arrange for the override to drop on the next scroll, once.
    pub fn clear_override_on_next_scroll(&mut self) {
        self.clear_override_on_scroll = true;
    }

    /// Only ever moves forward; there is no way back to the intro.
    pub fn mark_animation_complete(&mut self) {
        self.animation_complete = true;
    }

    /// Scroll so section `index` sits just under the nav bar, and make it
    /// active right away. Intersection updates are held off until the
    /// reset timer fires.
    pub fn scroll_to_section(&mut self, page: &mut Page, timers: &mut Timers, index: usize) -> bool {
        let Some(section) = Section::from_index(index) else {
            return false;
        };
        if !page.contains(ElementKey::Section(section)) {
            return false;
        }

        self.keyboard_navigating = true;
        let top = page.section_box(section).map_or(0, |b| b.top);
        let y = i64::from(top) - i64::from(page.sticky_nav_offset());
        page.scroll_to(y, self.scroll_behavior, timers.now());

        self.update_active_section(page, index);

        if let Some(previous) = self.nav_reset.take() {
            timers.cancel(previous);
        }
        self.nav_reset = Some(timers.schedule(self.nav_reset_delay, TimerEvent::KeyboardNavReset));
        true
    }

    pub fn nav_click(&mut self, page: &mut Page, timers: &mut Timers, item: usize) -> bool {
        tracing::debug!(item, "nav item clicked");
        self.scroll_to_section(page, timers, item)
    }

    /// Handle a paging key. Returns false when the key should fall through
    /// to default handling.
    pub fn page_key(&mut self, page: &mut Page, timers: &mut Timers, key: PageKey) -> bool {
        if !self.animation_complete || page.focus_is_text_entry() {
            return false;
        }
        let target = match key {
            PageKey::Next => (self.current + 1).min(Section::COUNT - 1),
            PageKey::Previous => self.current.saturating_sub(1),
        };
        self.scroll_to_section(page, timers, target);
        true
    }

    pub fn on_nav_reset(&mut self) {
        self.nav_reset = None;
        self.keyboard_navigating = false;
    }

    pub fn start_observing(&mut self, page: &mut Page, margin: RootMargin) {
        let mut observer = IntersectionObserver::new(margin);
        let entries = observer.observe(page);
        self.observer = Some(observer);
        self.on_intersections(page, &entries);
    }

    pub fn on_scroll(&mut self, page: &mut Page) {
        if self.clear_override_on_scroll {
            self.clear_override_on_scroll = false;
            self.cursor_override = None;
            self.update_active_section(page, self.current);
        }
        self.check_intersections(page);
    }

    /// Re-evaluate intersections after geometry or scroll changed.
    pub fn check_intersections(&mut self, page: &mut Page) {
        let entries = match &mut self.observer {
            Some(observer) => observer.take_records(page),
            None => return,
        };
        if !entries.is_empty() {
            self.on_intersections(page, &entries);
        }
    }

    pub fn on_intersections(&mut self, page: &mut Page, entries: &[IntersectionEntry]) {
        if self.keyboard_navigating {
            return;
        }
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            let index = entry.section.index();
            if index != self.current {
                self.update_active_section(page, index);
            }
        }
    }
}
