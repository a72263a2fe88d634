//! Theme mode resolution and its reflection onto the page.
//!
//! The user picks one of `auto`, `light` or `dark`. `auto` follows the
//! system appearance signal; the other two pass straight through. The chosen
//! mode and the resolved theme are mirrored onto the page root and the
//! switcher buttons, and an explicit choice is persisted to the key-value
//! store.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::page::{ElementKey, Page};
use super::storage::KeyValueStore;

pub const THEME_MODE_STORAGE_KEY: &str = "theme";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Auto, ThemeMode::Light, ThemeMode::Dark];

    /// Parse a stored or user-supplied mode. Anything but an exact
    /// `auto`/`light`/`dark` becomes `auto`.
    pub fn normalize(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// The platform's "prefers light" signal.
pub trait SystemPreference: Send {
    fn prefers_light(&self) -> bool;
}

/// Fixed answer, for configuration overrides and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedPreference(pub Theme);

impl SystemPreference for FixedPreference {
    fn prefers_light(&self) -> bool {
        self.0 == Theme::Light
    }
}

/// Terminal appearance read from `COLORFGBG`.
///
/// The variable holds `fg;bg` colour indices; a background of 0-6 is a dark
/// palette slot and 7-15 a light one. Without it the terminal is assumed dark.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPreference;

impl TerminalPreference {
    pub fn detect_from(colorfgbg: Option<&str>) -> Theme {
        let Some(value) = colorfgbg else {
            return Theme::Dark;
        };
        match value.rsplit(';').next().map(str::parse::<u8>) {
            Some(Ok(7..=15)) => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

impl SystemPreference for TerminalPreference {
    fn prefers_light(&self) -> bool {
        let colorfgbg = std::env::var("COLORFGBG").ok();
        Self::detect_from(colorfgbg.as_deref()) == Theme::Light
    }
}

pub fn system_theme(system: &dyn SystemPreference) -> Theme {
    if system.prefers_light() {
        Theme::Light
    } else {
        Theme::Dark
    }
}

pub fn resolve(mode: ThemeMode, system: &dyn SystemPreference) -> Theme {
    match mode {
        ThemeMode::Auto => system_theme(system),
        ThemeMode::Light => Theme::Light,
        ThemeMode::Dark => Theme::Dark,
    }
}

/// Read the persisted mode. Storage failures and unknown values fall back to
/// `auto`.
pub fn stored_theme_mode(store: &dyn KeyValueStore) -> ThemeMode {
    match store.get_item(THEME_MODE_STORAGE_KEY) {
        Ok(Some(raw)) => ThemeMode::normalize(&raw),
        Ok(None) => ThemeMode::Auto,
        Err(e) => {
            tracing::warn!("Theme preference unavailable: {e:#}");
            ThemeMode::Auto
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    pub persist: bool,
}

/// Reflect `mode` onto the page and optionally persist it.
#[tracing::instrument(skip(page, system, store))]
pub fn apply_theme_mode(
    page: &mut Page,
    mode: ThemeMode,
    system: &dyn SystemPreference,
    store: &mut dyn KeyValueStore,
    options: ApplyOptions,
) -> Theme {
    let theme = resolve(mode, system);

    page.root.theme_mode = Some(mode);
    page.root.theme = Some(theme);
    update_switcher(page, mode);

    if options.persist
        && let Err(e) = store.set_item(THEME_MODE_STORAGE_KEY, mode.as_ref())
    {
        tracing::warn!("Failed to persist theme mode: {e:#}");
    }

    tracing::debug!(%mode, %theme, "theme applied");
    theme
}

fn update_switcher(page: &mut Page, mode: ThemeMode) {
    for button in page.theme_buttons() {
        if let Some(el) = page.get_mut(ElementKey::ThemeButton(button)) {
            el.pressed = button == mode;
        }
    }
}

/// React to a system appearance change. Only `auto` re-resolves; returns
/// the new theme when it was re-applied.
pub fn on_system_change(
    page: &mut Page,
    system: &dyn SystemPreference,
    store: &mut dyn KeyValueStore,
) -> Option<Theme> {
    let current = page.root.theme_mode.unwrap_or_default();
    if current != ThemeMode::Auto {
        return None;
    }
    Some(apply_theme_mode(
        page,
        ThemeMode::Auto,
        system,
        store,
        ApplyOptions::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::storage::{DisabledStore, MemoryStore};

    #[test]
    fn normalize_accepts_only_exact_modes() {
        assert_eq!(ThemeMode::normalize("light"), ThemeMode::Light);
        assert_eq!(ThemeMode::normalize("dark"), ThemeMode::Dark);
        assert_eq!(ThemeMode::normalize("auto"), ThemeMode::Auto);
        assert_eq!(ThemeMode::normalize("Light"), ThemeMode::Auto);
        assert_eq!(ThemeMode::normalize(""), ThemeMode::Auto);
        assert_eq!(ThemeMode::normalize("solarized"), ThemeMode::Auto);
    }

    #[test]
    fn auto_follows_the_system() {
        let light = FixedPreference(Theme::Light);
        let dark = FixedPreference(Theme::Dark);
        assert_eq!(resolve(ThemeMode::Auto, &light), Theme::Light);
        assert_eq!(resolve(ThemeMode::Auto, &dark), Theme::Dark);
        assert_eq!(resolve(ThemeMode::Light, &dark), Theme::Light);
        assert_eq!(resolve(ThemeMode::Dark, &light), Theme::Dark);
    }

    #[test]
    fn colorfgbg_detection() {
        assert_eq!(TerminalPreference::detect_from(Some("15;0")), Theme::Dark);
        assert_eq!(TerminalPreference::detect_from(Some("0;15")), Theme::Light);
        assert_eq!(TerminalPreference::detect_from(Some("0;default;7")), Theme::Light);
        assert_eq!(TerminalPreference::detect_from(Some("garbage")), Theme::Dark);
        assert_eq!(TerminalPreference::detect_from(None), Theme::Dark);
    }

    #[test]
    fn apply_marks_root_and_switcher() {
        let mut page = Page::complete();
        let mut store = MemoryStore::default();
        let theme = apply_theme_mode(
            &mut page,
            ThemeMode::Dark,
            &FixedPreference(Theme::Light),
            &mut store,
            ApplyOptions::default(),
        );
        assert_eq!(theme, Theme::Dark);
        assert_eq!(page.root.theme_mode, Some(ThemeMode::Dark));
        assert_eq!(page.root.theme, Some(Theme::Dark));
        for mode in ThemeMode::ALL {
            let pressed = page.get(ElementKey::ThemeButton(mode)).unwrap().pressed;
            assert_eq!(pressed, mode == ThemeMode::Dark);
        }
        // Not persisted without the option.
        assert_eq!(store.get_item(THEME_MODE_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn persist_writes_mode() {
        let mut page = Page::complete();
        let mut store = MemoryStore::default();
        apply_theme_mode(
            &mut page,
            ThemeMode::Light,
            &FixedPreference(Theme::Dark),
            &mut store,
            ApplyOptions { persist: true },
        );
        assert_eq!(
            store.get_item(THEME_MODE_STORAGE_KEY).unwrap().as_deref(),
            Some("light")
        );
    }

    #[test]
    fn persist_failure_is_ignored() {
        let mut page = Page::complete();
        let theme = apply_theme_mode(
            &mut page,
            ThemeMode::Light,
            &FixedPreference(Theme::Dark),
            &mut DisabledStore,
            ApplyOptions { persist: true },
        );
        assert_eq!(theme, Theme::Light);
        assert_eq!(page.root.theme_mode, Some(ThemeMode::Light));
    }

    #[test]
    fn stored_mode_falls_back_to_auto() {
        assert_eq!(stored_theme_mode(&DisabledStore), ThemeMode::Auto);

        let mut store = MemoryStore::default();
        assert_eq!(stored_theme_mode(&store), ThemeMode::Auto);
        store.set_item(THEME_MODE_STORAGE_KEY, "sepia").unwrap();
        assert_eq!(stored_theme_mode(&store), ThemeMode::Auto);
        store.set_item(THEME_MODE_STORAGE_KEY, "dark").unwrap();
        assert_eq!(stored_theme_mode(&store), ThemeMode::Dark);
    }

    #[test]
    fn system_change_only_reapplies_auto() {
        let mut page = Page::complete();
        let mut store = MemoryStore::default();
        apply_theme_mode(
            &mut page,
            ThemeMode::Auto,
            &FixedPreference(Theme::Dark),
            &mut store,
            ApplyOptions::default(),
        );
        assert_eq!(
            on_system_change(&mut page, &FixedPreference(Theme::Light), &mut store),
            Some(Theme::Light)
        );
        assert_eq!(page.root.theme, Some(Theme::Light));

        apply_theme_mode(
            &mut page,
            ThemeMode::Dark,
            &FixedPreference(Theme::Light),
            &mut store,
            ApplyOptions::default(),
        );
        assert_eq!(
            on_system_change(&mut page, &FixedPreference(Theme::Light), &mut store),
            None
        );
        assert_eq!(page.root.theme, Some(Theme::Dark));
    }
}
