use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use strum_macros::Display;

use crate::internal::action::Action;
use crate::internal::theme::Theme;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// RON file with the page content. The built-in page is used when unset.
    pub content_file: Option<String>,
    /// JSON palette file with `light` and `dark` variants.
    pub theme_file: Option<String>,
    /// Where the theme preference is stored. Defaults to the user config dir.
    pub storage_file: Option<String>,
    /// Animate navigation scrolls instead of jumping.
    #[serde(default = "default_smooth_scroll")]
    pub smooth_scroll: bool,
    /// Force the system appearance instead of detecting it from the terminal.
    pub appearance: Option<Theme>,
    /// How often the desktop appearance is re-checked, in seconds.
    #[serde(default = "default_appearance_poll_secs")]
    pub appearance_poll_secs: u64,
    pub timing: TimingConfig,
    pub keybindings: Option<KeyBindingConfig>,
    pub logging: LogConfig,
}

fn default_smooth_scroll() -> bool {
    true
}

fn default_appearance_poll_secs() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content_file: None,
            theme_file: None,
            storage_file: None,
            smooth_scroll: default_smooth_scroll(),
            appearance: None,
            appearance_poll_secs: default_appearance_poll_secs(),
            timing: TimingConfig::default(),
            keybindings: None,
            logging: LogConfig::default(),
        }
    }
}

/// Every delay used by the intro and navigation, in milliseconds.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    pub header_art_delay_ms: u64,
    pub header_step_delay_ms: u64,
    pub header_fade_ms: u64,
    pub continue_timeout_ms: u64,
    pub section_fade_ms: u64,
    pub section_stagger_ms: u64,
    pub keyboard_nav_reset_ms: u64,
    pub smooth_scroll_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            header_art_delay_ms: 1500,
            header_step_delay_ms: 200,
            header_fade_ms: 300,
            continue_timeout_ms: 5000,
            section_fade_ms: 300,
            section_stagger_ms: 100,
            keyboard_nav_reset_ms: 1000,
            smooth_scroll_ms: 450,
        }
    }
}

/// Custom key bindings, merged over the defaults.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct KeyBindingConfig {
    pub global: HashMap<String, Action>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub log_directory: Option<String>,
    pub module_levels: HashMap<String, LogLevel>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            log_directory: None,
            module_levels: HashMap::new(),
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directive string built from the configured levels.
    pub fn filter_directives(&self) -> String {
        let mut filter_str = self.level.to_string();
        let mut modules: Vec<_> = self.module_levels.iter().collect();
        modules.sort_by(|a, b| a.0.cmp(b.0));
        for (module, level) in modules {
            filter_str.push_str(&format!(",{}={}", module, level));
        }
        filter_str
    }
}

impl AppConfig {
    pub fn load() -> Self {
        // Look for config.ron in current directory or next to executable
        let mut candidates = Vec::new();

        // 1. Current working directory
        candidates.push(PathBuf::from("config.ron"));

        // 2. Next to executable
        if let Ok(exe) = std::env::current_exe()
            && let Some(dir) = exe.parent()
        {
            candidates.push(dir.join("config.ron"));
        }

        for path in candidates {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match ron::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse config at {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Self::default()
    }
}
