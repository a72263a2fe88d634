use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::internal::theme::Theme;

#[derive(Debug, Deserialize, Clone)]
pub struct ThemeFile {
    #[allow(dead_code)]
    pub name: String,
    pub themes: Vec<ThemeVariant>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ThemeVariant {
    #[allow(dead_code)]
    pub name: String,
    pub mode: Theme,
    pub colors: HashMap<String, String>,
}

/// Colours for one concrete theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub prompt: Color,
    pub command: Color,
    pub art: Color,
    pub accent: Color,
    pub accent_foreground: Color,
    pub border: Color,
    pub cursor: Color,
}

impl Palette {
    pub fn builtin(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::Rgb(0x10, 0x0f, 0x0f),
                foreground: Color::Rgb(0xce, 0xcd, 0xc3),
                muted: Color::Rgb(0x87, 0x85, 0x80),
                prompt: Color::Rgb(0x87, 0x9a, 0x39),
                command: Color::Rgb(0xda, 0x70, 0x2c),
                art: Color::Rgb(0x43, 0x85, 0xbe),
                accent: Color::Rgb(0x3a, 0xa9, 0x9f),
                accent_foreground: Color::Rgb(0x10, 0x0f, 0x0f),
                border: Color::Rgb(0x40, 0x3e, 0x3c),
                cursor: Color::Rgb(0xce, 0xcd, 0xc3),
            },
            Theme::Light => Self {
                background: Color::Rgb(0xff, 0xfc, 0xf0),
                foreground: Color::Rgb(0x10, 0x0f, 0x0f),
                muted: Color::Rgb(0x6f, 0x6e, 0x69),
                prompt: Color::Rgb(0x66, 0x80, 0x0b),
                command: Color::Rgb(0xbc, 0x52, 0x15),
                art: Color::Rgb(0x20, 0x5e, 0xa6),
                accent: Color::Rgb(0x24, 0x83, 0x7b),
                accent_foreground: Color::Rgb(0xff, 0xfc, 0xf0),
                border: Color::Rgb(0xce, 0xcd, 0xc3),
                cursor: Color::Rgb(0x10, 0x0f, 0x0f),
            },
        }
    }

    fn with_overrides(mut self, colors: &HashMap<String, String>) -> Self {
        let pick = |key: &str, slot: &mut Color| {
            if let Some(color) = colors.get(key).and_then(|hex| parse_color(hex)) {
                *slot = color;
            }
        };
        pick("background", &mut self.background);
        pick("foreground", &mut self.foreground);
        pick("muted.foreground", &mut self.muted);
        pick("prompt", &mut self.prompt);
        pick("command", &mut self.command);
        pick("art", &mut self.art);
        pick("accent", &mut self.accent);
        pick("accent.foreground", &mut self.accent_foreground);
        pick("border", &mut self.border);
        pick("cursor", &mut self.cursor);
        self
    }

    /// `color` as seen through `opacity` over the page background.
    pub fn faded(&self, color: Color, opacity: f32) -> Color {
        fade_color(self.background, color, opacity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palettes {
    pub light: Palette,
    pub dark: Palette,
}

impl Default for Palettes {
    fn default() -> Self {
        Self {
            light: Palette::builtin(Theme::Light),
            dark: Palette::builtin(Theme::Dark),
        }
    }
}

impl Palettes {
    pub fn for_theme(&self, theme: Theme) -> &Palette {
        match theme {
            Theme::Light => &self.light,
            Theme::Dark => &self.dark,
        }
    }

    /// Load a configured palette file, falling back to the built-in colours.
    pub fn load_or_builtin(path: Option<&str>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match load_palettes(Path::new(path)) {
            Ok(palettes) => palettes,
            Err(e) => {
                tracing::error!("Failed to load theme '{}': {:#}", path, e);
                Self::default()
            }
        }
    }
}

#[tracing::instrument(skip(path), fields(path = ?path))]
pub fn load_palettes(path: &Path) -> Result<Palettes> {
    let content = fs::read_to_string(path).context("Failed to read theme file")?;
    parse_palettes(&content)
}

pub fn parse_palettes(json: &str) -> Result<Palettes> {
    let theme_file: ThemeFile = serde_json::from_str(json).context("Failed to parse theme JSON")?;
    if theme_file.themes.is_empty() {
        anyhow::bail!("Theme file has no variants");
    }

    let mut palettes = Palettes::default();
    for variant in &theme_file.themes {
        let slot = match variant.mode {
            Theme::Light => &mut palettes.light,
            Theme::Dark => &mut palettes.dark,
        };
        *slot = Palette::builtin(variant.mode).with_overrides(&variant.colors);
    }
    tracing::debug!(name = %theme_file.name, variants = theme_file.themes.len(), "Loaded theme");
    Ok(palettes)
}

pub fn parse_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    match hex.len() {
        6 | 8 => {
            // For 8-char hex (with alpha), ignore the alpha and use the RGB components.
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => hex.parse::<Color>().ok(),
    }
}

/// Blend `to` over `from` by `opacity`. Non-RGB colours snap at half
/// opacity since they cannot be mixed.
pub fn fade_color(from: Color, to: Color, opacity: f32) -> Color {
    let opacity = opacity.clamp(0.0, 1.0);
    match (from, to) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            let mix = |a: u8, b: u8| {
                (f32::from(a) + (f32::from(b) - f32::from(a)) * opacity).round() as u8
            };
            Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
        }
        _ if opacity >= 0.5 => to,
        _ => from,
    }
}
