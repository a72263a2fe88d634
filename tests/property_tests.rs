use std::time::Duration;

use proptest::prelude::*;
use tui_homepage::config::{AppConfig, TimingConfig};
use tui_homepage::internal::content::SiteContent;
use tui_homepage::internal::page::{CursorTarget, ElementKey, Page, ScrollBehavior, Section};
use tui_homepage::internal::site::{Dispatch, Site};
use tui_homepage::internal::storage::MemoryStore;
use tui_homepage::internal::theme::{FixedPreference, Theme, ThemeMode, resolve};
use tui_homepage::internal::tracker::SectionTracker;
use tui_homepage::internal::ui::document::Document;

fn count_active(page: &Page, keys: impl Iterator<Item = ElementKey>) -> usize {
    keys.filter(|k| page.get(*k).is_some_and(|el| el.active))
        .count()
}

#[derive(Debug, Clone, Copy)]
enum GateEvent {
    KeyDown,
    KeyUp,
    Pointer,
    Wait(u64),
}

fn gate_event() -> impl Strategy<Value = GateEvent> {
    prop_oneof![
        Just(GateEvent::KeyDown),
        Just(GateEvent::KeyUp),
        Just(GateEvent::Pointer),
        (0u64..3000).prop_map(GateEvent::Wait),
    ]
}

proptest! {
    #[test]
    fn test_unknown_modes_normalize_to_auto(s in "\\PC*") {
        prop_assume!(!["auto", "light", "dark"].contains(&s.as_str()));
        prop_assert_eq!(ThemeMode::normalize(&s), ThemeMode::Auto);
    }

    #[test]
    fn test_auto_follows_the_system(prefers_light in any::<bool>()) {
        let theme = if prefers_light { Theme::Light } else { Theme::Dark };
        let system = FixedPreference(theme);
        prop_assert_eq!(resolve(ThemeMode::Auto, &system), theme);
        prop_assert_eq!(resolve(ThemeMode::Light, &system), Theme::Light);
        prop_assert_eq!(resolve(ThemeMode::Dark, &system), Theme::Dark);
    }

    #[test]
    fn test_active_section_is_clamped_and_unique(index in 0usize..64, override_pick in 0usize..9) {
        let mut page = Page::complete();
        let mut tracker = SectionTracker::default();
        let target = CursorTarget::ALL.get(override_pick).copied();
        tracker.set_cursor_override(&mut page, target);
        tracker.update_active_section(&mut page, index);

        prop_assert_eq!(tracker.current_index(), index.min(Section::COUNT - 1));
        let nav = (0..Section::COUNT).map(ElementKey::NavItem);
        prop_assert_eq!(count_active(&page, nav), 1);
        let cursors = CursorTarget::ALL.into_iter().map(ElementKey::Cursor);
        prop_assert!(count_active(&page, cursors) <= 1);
    }

    #[test]
    fn test_gate_completes_exactly_once(events in prop::collection::vec(gate_event(), 1..12)) {
        let mut site = Site::bootstrap(
            Page::complete(),
            Box::new(MemoryStore::default()),
            Box::new(FixedPreference(Theme::Dark)),
            &TimingConfig::default(),
            ScrollBehavior::Instant,
        );
        site.advance(Duration::from_millis(1500));

        let mut now = 1500;
        let mut consumed = 0;
        for event in events {
            let dispatch = match event {
                GateEvent::KeyDown => site.key_down(None),
                GateEvent::KeyUp => site.key_up(),
                GateEvent::Pointer => site.pointer_down(None),
                GateEvent::Wait(ms) => {
                    now += ms;
                    site.advance(Duration::from_millis(now));
                    Dispatch::Ignored
                }
            };
            if dispatch == Dispatch::Consumed {
                consumed += 1;
            }
            if site.intro().is_complete() {
                // Nothing scheduled before completion may bring the prompt back.
                prop_assert!(!site.page().get(ElementKey::PressKey).unwrap().displayed);
            }
        }
        prop_assert!(consumed <= 1);

        site.advance(Duration::from_millis(now + 10_000));
        prop_assert!(site.intro().is_complete());
        prop_assert!(!site.page().get(ElementKey::PressKey).unwrap().displayed);
    }

    #[test]
    fn test_document_layout_never_panics(width in 0u16..300, para in "\\PC{0,200}") {
        let mut content = SiteContent::default();
        content.sections[1].body = vec![para];
        let page = content.build_page(Duration::ZERO);
        let doc = Document::build(&content, &page, width);
        let total: u32 = doc.sections.iter().map(|b| b.height).sum();
        prop_assert!(total <= doc.height());
    }

    #[test]
    fn test_config_parsing_resilience(s in "\\PC*") {
        // Fuzz the config loader with random strings
        // It should return an Err, but not panic
        let _ = ron::from_str::<AppConfig>(&s);
    }
}
