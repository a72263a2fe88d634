//! Lays the site content out as terminal rows.
//!
//! The document is rebuilt from the element registry every frame, so
//! elements that are not displayed take no rows while faded ones keep
//! their space. The resulting section boxes feed the page geometry.

use std::time::Duration;

use crate::internal::content::{SectionContent, SiteContent};
use crate::internal::page::{CursorTarget, ElementKey, Page, PageLayout, Section, SectionBox};

/// Rows taken by the sticky nav bar, bottom border included.
pub const NAV_HEIGHT: u16 = 2;

const INDENT: &str = "  ";
const MIN_WRAP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Prompt,
    Command,
    Body,
    Art,
    Tagline,
    Hint,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text { text: String, role: Role },
    /// One cell, filled while the cursor is active and blinking on.
    Cursor(CursorTarget),
}

impl Segment {
    fn text(text: impl Into<String>, role: Role) -> Self {
        Segment::Text {
            text: text.into(),
            role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLine {
    /// `None` for the spacer rows under the nav bar.
    pub section: Option<Section>,
    /// Header element the row belongs to, if any.
    pub owner: Option<ElementKey>,
    pub segments: Vec<Segment>,
}

impl DocLine {
    /// Effective opacity: the product of every enclosing element's.
    pub fn opacity(&self, page: &Page, now: Duration) -> f32 {
        let of = |key| page.get(key).map_or(1.0, |el| el.opacity_at(now));
        let mut opacity = of(ElementKey::MainContent);
        if let Some(section) = self.section {
            opacity *= of(ElementKey::Section(section));
        }
        if let Some(owner) = self.owner {
            opacity *= of(owner);
        }
        opacity
    }

    /// Row text with cursors drawn as `_`.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text { text, .. } => text.as_str(),
                Segment::Cursor(_) => "_",
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub lines: Vec<DocLine>,
    pub sections: Vec<SectionBox>,
}

impl Document {
    pub fn build(content: &SiteContent, page: &Page, width: u16) -> Self {
        let mut builder = Builder {
            lines: Vec::new(),
            width: usize::from(width),
            prompt: &content.prompt,
        };
        for _ in 0..NAV_HEIGHT {
            builder.blank(None);
        }

        let mut sections = Vec::new();
        for section in Section::ALL {
            let Some(text) = content.section(section) else {
                continue;
            };
            let Some(element) = page.get(ElementKey::Section(section)) else {
                continue;
            };
            if !element.displayed {
                continue;
            }

            let top = builder.lines.len();
            if section == Section::Welcome {
                builder.welcome(content, page, text, element.animation_complete);
            } else {
                builder.section(text);
            }
            sections.push(SectionBox {
                section,
                top: top as u32,
                height: (builder.lines.len() - top) as u32,
            });
        }

        Self {
            lines: builder.lines,
            sections,
        }
    }

    pub fn height(&self) -> u32 {
        self.lines.len() as u32
    }

    pub fn line(&self, row: u32) -> Option<&DocLine> {
        self.lines.get(row as usize)
    }

    /// Geometry for a viewport of `viewport_height` rows.
    pub fn layout(&self, viewport_height: u32) -> PageLayout {
        PageLayout {
            sections: self.sections.clone(),
            doc_height: self.height(),
            viewport_height,
            nav_height: u32::from(NAV_HEIGHT),
        }
    }
}

struct Builder<'a> {
    lines: Vec<DocLine>,
    width: usize,
    prompt: &'a str,
}

impl Builder<'_> {
    fn push(&mut self, section: Option<Section>, owner: Option<ElementKey>, segments: Vec<Segment>) {
        self.lines.push(DocLine {
            section,
            owner,
            segments,
        });
    }

    fn blank(&mut self, section: Option<Section>) {
        self.push(section, None, Vec::new());
    }

    fn rule(&mut self, section: Section) {
        let rule = "─".repeat(self.width);
        self.push(Some(section), None, vec![Segment::text(rule, Role::Rule)]);
    }

    fn command(&mut self, text: &SectionContent) {
        let segments = vec![
            Segment::text(format!("{INDENT}{}", self.prompt), Role::Prompt),
            Segment::text(format!(" {} ", text.command), Role::Command),
            Segment::Cursor(CursorTarget::Section(text.section)),
        ];
        self.push(Some(text.section), None, segments);
    }

    fn wrapped(&mut self, section: Section, owner: Option<ElementKey>, text: &str, role: Role) {
        let wrap_width = self.width.saturating_sub(INDENT.len() * 2).max(MIN_WRAP);
        for line in textwrap::wrap(text, wrap_width) {
            self.push(
                Some(section),
                owner,
                vec![Segment::text(format!("{INDENT}{line}"), role)],
            );
        }
    }

    fn welcome(&mut self, content: &SiteContent, page: &Page, text: &SectionContent, complete: bool) {
        let section = Section::Welcome;
        let shown = |key| page.get(key).is_some_and(|el| el.displayed);

        self.blank(Some(section));
        self.command(text);
        self.blank(Some(section));

        if shown(ElementKey::AsciiArt) && !content.ascii_art.is_empty() {
            for art in &content.ascii_art {
                self.push(
                    Some(section),
                    Some(ElementKey::AsciiArt),
                    vec![Segment::text(format!("{INDENT}{art}"), Role::Art)],
                );
            }
            self.blank(Some(section));
        }

        if shown(ElementKey::Tagline)
            && let Some(tagline) = &content.tagline
        {
            self.wrapped(section, Some(ElementKey::Tagline), tagline, Role::Tagline);
            self.blank(Some(section));
        }

        if shown(ElementKey::PressKey)
            && let Some(press_key) = content.press_key_text()
        {
            self.push(
                Some(section),
                Some(ElementKey::PressKey),
                vec![
                    Segment::text(format!("{INDENT}{press_key} "), Role::Hint),
                    Segment::Cursor(CursorTarget::PressKey),
                ],
            );
            self.blank(Some(section));
        }

        if complete {
            self.rule(section);
        }
    }

    fn section(&mut self, text: &SectionContent) {
        let section = text.section;
        self.rule(section);
        self.blank(Some(section));
        self.command(text);
        self.blank(Some(section));
        for paragraph in &text.body {
            self.wrapped(section, None, paragraph, Role::Body);
            self.blank(Some(section));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(page: &Page) -> Document {
        let content = SiteContent::default();
        Document::build(&content, page, 60)
    }

    fn default_page() -> Page {
        SiteContent::default().build_page(Duration::ZERO)
    }

    #[test]
    fn sections_tile_the_document() {
        let doc = build(&default_page());
        assert_eq!(doc.sections.len(), Section::COUNT);
        assert_eq!(doc.sections[0].top, u32::from(NAV_HEIGHT));
        for pair in doc.sections.windows(2) {
            assert_eq!(pair[0].bottom(), pair[1].top);
        }
        assert_eq!(doc.sections[Section::COUNT - 1].bottom(), doc.height());
    }

    #[test]
    fn hidden_header_elements_take_no_rows() {
        let mut page = default_page();
        let full = build(&page).sections[0].height;

        page.get_mut(ElementKey::PressKey).unwrap().displayed = false;
        let without_prompt = build(&page).sections[0].height;
        assert_eq!(without_prompt, full - 2);

        // Faded but displayed keeps its space.
        page.get_mut(ElementKey::AsciiArt).unwrap().opacity = 0.0;
        assert_eq!(build(&page).sections[0].height, without_prompt);
    }

    #[test]
    fn welcome_gains_a_rule_when_complete() {
        let mut page = default_page();
        let before = build(&page);
        page.get_mut(ElementKey::Section(Section::Welcome))
            .unwrap()
            .animation_complete = true;
        let after = build(&page);
        assert_eq!(after.sections[0].height, before.sections[0].height + 1);
        let last = after.line(after.sections[0].bottom() - 1).unwrap();
        assert!(last.plain_text().starts_with('─'));
    }

    #[test]
    fn command_line_ends_with_the_cursor() {
        let doc = build(&default_page());
        let about = doc.sections[Section::About.index()];
        let command = doc.line(about.top + 2).unwrap();
        assert_eq!(command.plain_text(), "  guest@homepage:~$ man about _");
        assert_eq!(
            command.segments.last(),
            Some(&Segment::Cursor(CursorTarget::Section(Section::About)))
        );
    }

    #[test]
    fn opacity_multiplies_through_owners() {
        let mut page = default_page();
        page.get_mut(ElementKey::Section(Section::Welcome))
            .unwrap()
            .opacity = 0.5;
        page.get_mut(ElementKey::AsciiArt).unwrap().opacity = 0.5;
        let doc = build(&page);
        let art = doc
            .lines
            .iter()
            .find(|l| l.owner == Some(ElementKey::AsciiArt))
            .unwrap();
        assert_eq!(art.opacity(&page, Duration::ZERO), 0.25);
        assert_eq!(doc.lines[0].opacity(&page, Duration::ZERO), 1.0);
    }

    #[test]
    fn layout_reports_geometry() {
        let doc = build(&default_page());
        let layout = doc.layout(20);
        assert_eq!(layout.doc_height, doc.height());
        assert_eq!(layout.viewport_height, 20);
        assert_eq!(layout.nav_height, u32::from(NAV_HEIGHT));
    }
}
