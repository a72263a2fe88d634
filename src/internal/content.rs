use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::page::{CursorTarget, Element, ElementKey, Page, Section};
use super::theme::ThemeMode;

/// Text of the homepage. Anything left out is simply absent from the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteContent {
    /// Shell prompt printed before each section command.
    pub prompt: String,
    pub ascii_art: Vec<String>,
    pub tagline: Option<String>,
    pub press_key: Option<String>,
    /// Label of the first navigation item.
    pub home_label: String,
    pub sections: Vec<SectionContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionContent {
    pub section: Section,
    pub command: String,
    pub nav_label: String,
    #[serde(default)]
    pub body: Vec<String>,
}

impl Default for SiteContent {
    fn default() -> Self {
        let section = |section, command: &str, nav_label: &str, body: &[&str]| SectionContent {
            section,
            command: command.to_string(),
            nav_label: nav_label.to_string(),
            body: body.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            prompt: "guest@homepage:~$".to_string(),
            ascii_art: [
                r" _   _      _ _       ",
                r"| | | | ___| | | ___  ",
                r"| |_| |/ _ \ | |/ _ \ ",
                r"|  _  |  __/ | | (_) |",
                r"|_| |_|\___|_|_|\___/ ",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            tagline: Some("Software engineer. Terminal enthusiast.".to_string()),
            press_key: Some("Press any key to continue".to_string()),
            home_label: "~".to_string(),
            sections: vec![
                section(Section::Welcome, "whoami", "~", &[]),
                section(
                    Section::About,
                    "man about",
                    "about",
                    &[
                        "I build fast, dependable software and like tools that stay out of the way.",
                        "Most of my time goes into systems programming, developer tooling and the occasional side project that gets out of hand.",
                    ],
                ),
                section(
                    Section::Experience,
                    "cat experience.log",
                    "experience",
                    &[
                        "Senior Engineer, Platform team: build pipelines, release tooling, incident response.",
                        "Software Engineer, Payments: settlement services and reconciliation jobs.",
                    ],
                ),
                section(
                    Section::Skills,
                    "ls skills/",
                    "skills",
                    &["rust  go  typescript  sql  linux  networking  observability"],
                ),
                section(
                    Section::Education,
                    "cat education.txt",
                    "education",
                    &["B.Sc. Computer Science"],
                ),
                section(
                    Section::Contact,
                    "finger contact",
                    "contact",
                    &["mail: hello@example.com", "code: github.com/example"],
                ),
            ],
        }
    }
}

impl SiteContent {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read content file")?;
        ron::from_str(&content).context("Failed to parse content file")
    }

    /// Load a configured content file, falling back to the built-in page.
    pub fn load_or_default(path: Option<&str>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(Path::new(path)) {
            Ok(content) => {
                tracing::info!("Loaded page content from {}", path);
                content
            }
            Err(e) => {
                tracing::error!("Failed to load content '{}': {:#}", path, e);
                Self::default()
            }
        }
    }

    pub fn section(&self, section: Section) -> Option<&SectionContent> {
        self.sections.iter().find(|s| s.section == section)
    }

    pub fn press_key_text(&self) -> Option<&str> {
        self.press_key.as_deref().filter(|s| !s.is_empty())
    }

    /// Build the element registry this content renders into.
    pub fn build_page(&self, smooth_scroll: Duration) -> Page {
        let mut page = Page::new()
            .with(ElementKey::MainContent)
            .with(ElementKey::NavBar)
            .with_smooth_scroll_duration(smooth_scroll);

        if !self.ascii_art.is_empty() {
            page.insert(ElementKey::AsciiArt, Element::default());
        }
        if self.tagline.is_some() {
            page.insert(ElementKey::Tagline, Element::default());
        }
        if self.press_key_text().is_some() {
            page.insert(ElementKey::PressKey, Element::default());
            page.insert(ElementKey::Cursor(CursorTarget::PressKey), Element::default());
        }
        for section in Section::ALL {
            if self.section(section).is_some() {
                page.insert(ElementKey::Section(section), Element::default());
                page.insert(
                    ElementKey::Cursor(CursorTarget::Section(section)),
                    Element::default(),
                );
                page.insert(ElementKey::NavItem(section.index()), Element::default());
            }
        }
        for mode in ThemeMode::ALL {
            page.insert(ElementKey::ThemeButton(mode), Element::default());
        }
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_content_builds_the_full_page() {
        let page = SiteContent::default().build_page(Duration::ZERO);
        for key in Page::complete().keys() {
            assert!(page.contains(key), "missing {key:?}");
        }
    }

    #[test]
    fn missing_prompt_drops_the_press_key_elements() {
        let content = SiteContent {
            press_key: Some(String::new()),
            ..SiteContent::default()
        };
        let page = content.build_page(Duration::ZERO);
        assert!(!page.contains(ElementKey::PressKey));
        assert!(!page.contains(ElementKey::Cursor(CursorTarget::PressKey)));
    }

    #[test]
    fn content_parses_from_ron() {
        let content: SiteContent = ron::from_str(
            r#"(
    prompt: "me@box:~$",
    tagline: None,
    sections: [
        (section: welcome, command: "whoami", nav_label: "~"),
        (section: contact, command: "finger me", nav_label: "contact", body: ["mail: me@example.com"]),
    ],
)"#,
        )
        .unwrap();
        assert_eq!(content.sections.len(), 2);
        assert!(content.tagline.is_none());
        // Unset fields keep their defaults.
        assert_eq!(content.home_label, "~");

        let page = content.build_page(Duration::ZERO);
        assert!(page.contains(ElementKey::Section(Section::Contact)));
        assert!(!page.contains(ElementKey::Section(Section::About)));
        assert!(!page.contains(ElementKey::Tagline));
        assert_eq!(page.nav_items(), vec![0, 5]);
    }

    #[test]
    fn unreadable_file_falls_back_to_default() {
        let content = SiteContent::load_or_default(Some("/definitely/not/here.ron"));
        assert_eq!(content.sections.len(), Section::COUNT);
    }
}
