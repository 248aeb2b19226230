//! Climb sandbox settings with persistence
//!
//! Settings are saved to `~/.config/ascent/settings.toml`

use std::fs;
use std::path::PathBuf;

use ascent_climb::{ClimbConfig, MontageLibrary, MovementConfig, TransitionKind};
use ascent_core::TimeConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All sandbox settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub climb: ClimbConfig,
    pub movement: MovementConfig,
    pub time: TimeConfig,
    /// Clip lengths and root motion for the transition montages
    pub montages: MontageLibrary,
}

impl GameSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ascent"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found or invalid
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to load settings: {:#}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Parse settings, check the climb section and make sure every
    /// transition montage has a clip
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.climb.validate()?;

        for kind in TransitionKind::ALL {
            if let Some(id) = settings.climb.montages.get(kind) {
                if settings.montages.get(id).is_none() {
                    anyhow::bail!("no clip for {kind:?} montage `{id}`");
                }
            }
        }

        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        // Create config directory if it doesn't exist
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}
