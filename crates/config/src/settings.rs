// User settings (TOML)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;

const APP_DIR: &str = "implant-vault";
const SETTINGS_FILE: &str = "settings.toml";

/// Application settings.
///
/// Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the per-account folders. `~` is expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_directory: Option<PathBuf>,
    /// Defaults to `<base_directory>/characters.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    /// Offer clone-or-replace on duplicate sample numbers instead of
    /// always replacing.
    pub allow_clones: bool,
    /// Defaults to `tesseract` on `PATH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tesseract_path: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_directory: None,
            data_file: None,
            allow_clones: true,
            tesseract_path: None,
            log_level: "warn".to_string(),
        }
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(SETTINGS_FILE)
    }

    /// `~/ARK_AssistantV2/data/character_implants`
    pub fn default_base_directory() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ARK_AssistantV2")
            .join("data")
            .join("character_implants")
    }

    pub fn base_directory(&self) -> PathBuf {
        self.base_directory
            .as_deref()
            .map(expand)
            .unwrap_or_else(Self::default_base_directory)
    }

    pub fn effective_data_file(&self) -> PathBuf {
        self.data_file
            .as_deref()
            .map(expand)
            .unwrap_or_else(|| self.base_directory().join("characters.json"))
    }

    pub fn tesseract_path(&self) -> Option<PathBuf> {
        self.tesseract_path.as_deref().map(expand)
    }

    /// Parse and validate a settings document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Validation("log_level must not be empty".into()));
        }
        if let Some(data_file) = &self.data_file {
            let s = data_file.to_string_lossy();
            if s.trim().is_empty() || s.ends_with('/') || s.ends_with('\\') {
                return Err(ConfigError::Validation(format!(
                    "data_file must name a file, got '{s}'"
                )));
            }
        }
        Ok(())
    }

    /// Load settings from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file means defaults; a broken
    /// file is reported and also means defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        }

        let result = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(e.to_string()))
            .and_then(|content| Self::from_toml(&content));
        match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default settings");
                Self::default()
            }
        }
    }

    /// Save current settings to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }
}
