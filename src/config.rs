//! Configuration file support.
//!
//! Settings are looked up per project first (`<project>/labelforge.json`),
//! then in the per-user config directory, then fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{layout, mask, threshold, zoom};
use crate::hit_test::HitTester;
use crate::keybindings::KeyBindings;
use crate::view::ScaleLimits;

/// Log level setting for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Tuning values for interaction and labelling
    #[serde(default)]
    pub preferences: Preferences,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,
}

/// Interaction and labelling preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Corner grab distance in image pixels
    #[serde(default = "default_corner_threshold")]
    pub corner_threshold: i32,

    /// Drawn boxes must exceed this extent on both axes
    #[serde(default = "default_min_box_size")]
    pub min_box_size: i32,

    /// Wheel zoom factor per notch in box mode
    #[serde(default = "default_box_zoom_step")]
    pub box_zoom_step: f32,

    /// Wheel zoom factor per notch in mask mode
    #[serde(default = "default_mask_zoom_step")]
    pub mask_zoom_step: f32,

    /// Pen and eraser diameter in image pixels
    #[serde(default = "default_pen_thickness")]
    pub pen_thickness: u32,

    /// Rectangle fill labels pixels at or below this gray value
    #[serde(default = "default_mask_threshold")]
    pub mask_threshold: u8,

    #[serde(default = "default_min_scale")]
    pub min_scale: f32,

    #[serde(default = "default_max_scale")]
    pub max_scale: f32,
}

fn default_corner_threshold() -> i32 {
    threshold::CORNER
}

fn default_min_box_size() -> i32 {
    threshold::MIN_BOX_SIZE
}

fn default_box_zoom_step() -> f32 {
    zoom::BOX_STEP
}

fn default_mask_zoom_step() -> f32 {
    zoom::MASK_STEP
}

fn default_pen_thickness() -> u32 {
    mask::PEN_THICKNESS
}

fn default_mask_threshold() -> u8 {
    threshold::MASK_BINARIZE
}

fn default_min_scale() -> f32 {
    zoom::MIN_SCALE
}

fn default_max_scale() -> f32 {
    zoom::MAX_SCALE
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            corner_threshold: default_corner_threshold(),
            min_box_size: default_min_box_size(),
            box_zoom_step: default_box_zoom_step(),
            mask_zoom_step: default_mask_zoom_step(),
            pen_thickness: default_pen_thickness(),
            mask_threshold: default_mask_threshold(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
        }
    }
}

impl Preferences {
    /// Scale limits for view transforms, falling back to the defaults when
    /// the configured pair is unusable.
    pub fn scale_limits(&self) -> ScaleLimits {
        let valid = self.min_scale.is_finite()
            && self.max_scale.is_finite()
            && self.min_scale > 0.0
            && self.min_scale <= 1.0
            && self.max_scale >= 1.0;
        if valid {
            ScaleLimits {
                min: self.min_scale,
                max: self.max_scale,
            }
        } else {
            log::warn!(
                "Ignoring scale limits {}..{}; using defaults",
                self.min_scale,
                self.max_scale
            );
            ScaleLimits::default()
        }
    }

    pub fn hit_tester(&self) -> HitTester {
        HitTester::new(self.corner_threshold.max(0))
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: Preferences::default(),
            keybindings: KeyBindings::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the config file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default filename for the per-user config.
    pub fn default_filename() -> &'static str {
        "labelforge-config.json"
    }

    /// Get the per-user config file path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("labelforge").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("labelforge")
                    .join(Self::default_filename())
            })
        }
    }

    /// No per-user config on WASM (no filesystem access).
    #[cfg(target_arch = "wasm32")]
    pub fn default_path() -> Option<PathBuf> {
        None
    }

    /// Resolve the configuration for a project.
    ///
    /// The project file wins over the per-user file. A file that cannot be
    /// read or parsed is logged and skipped.
    pub fn resolve(project_root: &Path) -> Self {
        let candidates = std::iter::once(project_root.join(layout::PROJECT_CONFIG_FILE))
            .chain(Self::default_path());

        for path in candidates {
            if !path.exists() {
                log::debug!("No config file found at {:?}", path);
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    return config;
                }
                Err(e) => log::warn!("Failed to load config file {:?}: {}", path, e),
            }
        }

        Self::default()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
