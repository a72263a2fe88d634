//! Viewport-band intersection tracking for sections.

use std::collections::BTreeMap;

use super::page::{ElementKey, Page, Section};

/// Fractions of the viewport height trimmed off the observation band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: f32,
    pub bottom: f32,
}

impl Default for RootMargin {
    fn default() -> Self {
        Self {
            top: 0.2,
            bottom: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub section: Section,
    pub is_intersecting: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IntersectionObserver {
    margin: RootMargin,
    states: BTreeMap<Section, bool>,
}

impl IntersectionObserver {
    pub fn new(margin: RootMargin) -> Self {
        Self {
            margin,
            states: BTreeMap::new(),
        }
    }

    /// Start watching every section present on the page. Reports the
    /// initial state of each one.
    pub fn observe(&mut self, page: &Page) -> Vec<IntersectionEntry> {
        self.states.clear();
        let band = self.band(page);
        Section::ALL
            .iter()
            .filter(|s| page.contains(ElementKey::Section(**s)))
            .map(|s| {
                let is_intersecting = Self::intersects(page, *s, band);
                self.states.insert(*s, is_intersecting);
                IntersectionEntry {
                    section: *s,
                    is_intersecting,
                }
            })
            .collect()
    }

    /// Entries for sections whose intersection state changed since the last
    /// call.
    pub fn take_records(&mut self, page: &Page) -> Vec<IntersectionEntry> {
        let band = self.band(page);
        let mut records = Vec::new();
        for (section, was) in self.states.iter_mut() {
            let now = Self::intersects(page, *section, band);
            if now != *was {
                *was = now;
                records.push(IntersectionEntry {
                    section: *section,
                    is_intersecting: now,
                });
            }
        }
        records
    }

    /// Absolute document rows `[top, bottom)` currently inside the band.
    pub fn band(&self, page: &Page) -> (u32, u32) {
        let vh = page.layout().viewport_height as f32;
        let top = page.scroll_y() + (vh * self.margin.top).round() as u32;
        let bottom = page.scroll_y() + (vh * (1.0 - self.margin.bottom)).round() as u32;
        (top, bottom.max(top))
    }

    fn intersects(page: &Page, section: Section, (top, bottom): (u32, u32)) -> bool {
        if top == bottom {
            return false;
        }
        page.section_box(section)
            .is_some_and(|b| b.top < bottom && b.bottom() > top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::page::{PageLayout, ScrollBehavior, SectionBox};
    use std::time::Duration;

    fn page() -> Page {
        let mut page = Page::complete();
        page.set_layout(PageLayout {
            sections: Section::ALL
                .iter()
                .enumerate()
                .map(|(i, s)| SectionBox {
                    section: *s,
                    top: i as u32 * 30,
                    height: 30,
                })
                .collect(),
            doc_height: 180,
            viewport_height: 50,
            nav_height: 3,
        });
        page
    }

    #[test]
    fn band_skips_top_fifth_and_bottom_three_fifths() {
        let page = page();
        let observer = IntersectionObserver::default();
        assert_eq!(observer.band(&page), (10, 20));
    }

    #[test]
    fn initial_observation_reports_every_section() {
        let page = page();
        let mut observer = IntersectionObserver::default();
        let entries = observer.observe(&page);
        assert_eq!(entries.len(), Section::COUNT);
        let hits: Vec<Section> = entries
            .iter()
            .filter(|e| e.is_intersecting)
            .map(|e| e.section)
            .collect();
        assert_eq!(hits, vec![Section::Welcome]);
    }

    #[test]
    fn scrolling_reports_only_changes() {
        let mut page = page();
        let mut observer = IntersectionObserver::default();
        observer.observe(&page);
        assert!(observer.take_records(&page).is_empty());

        page.scroll_to(25, ScrollBehavior::Instant, Duration::ZERO);
        // Band is now [35, 45): welcome leaves, about enters.
        let records = observer.take_records(&page);
        assert_eq!(
            records,
            vec![
                IntersectionEntry {
                    section: Section::Welcome,
                    is_intersecting: false
                },
                IntersectionEntry {
                    section: Section::About,
                    is_intersecting: true
                },
            ]
        );
    }

    #[test]
    fn missing_sections_are_not_observed() {
        let page = page().without(ElementKey::Section(Section::Skills));
        let mut observer = IntersectionObserver::default();
        let entries = observer.observe(&page);
        assert_eq!(entries.len(), Section::COUNT - 1);
        assert!(entries.iter().all(|e| e.section != Section::Skills));
    }
}
