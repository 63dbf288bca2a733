//! Configuration structs with sensible defaults and RON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewport configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Overlay toggles and dust field sizing.
    pub viewport: ViewportConfig,
    /// Scenario-level settings (default skybox).
    pub scenario: ScenarioConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Free-form user preferences (string key, string value).
    pub preferences: Preferences,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Window title.
    pub title: String,
}

/// Viewport overlay configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    /// Draw ship callsigns above other entities.
    pub show_callsigns: bool,
    /// Draw heading ticks around the player ship.
    pub show_headings: bool,
    /// Draw streaking space dust around the player ship.
    pub show_spacedust: bool,
    /// Number of dust segments (each segment is two points).
    pub spacedust_particle_count: u32,
}

/// Scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Skybox used outside any zone, without the `skybox/` prefix.
    pub default_skybox: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

/// Key/value preference store.
///
/// Lookups always take a default, so a missing key is never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Preferences {
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// Create an empty preference store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, returning `default` when it is not set.
    pub fn get(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Look up `key` as a float.
    ///
    /// Falls back to `default` when the key is missing or does not parse.
    pub fn get_f32(&self, key: &str, default: f32) -> f32 {
        match self.values.get(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Preference '{key}' = '{raw}' is not a number, using {default}");
                default
            }),
            None => default,
        }
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    /// Whether `key` has an explicit value.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Nebula Viewport".to_string(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            show_callsigns: false,
            show_headings: false,
            show_spacedust: false,
            spacedust_particle_count: 1000,
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            default_skybox: "default".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Default per-user config directory (`<config_dir>/nebula-viewport`).
    pub fn default_dir() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nebula-viewport"))
    }
}
