//! Injection configuration
//!
//! Everything the button bar injector needs to know about naming and
//! styling lives here so a host can restyle the bar without touching code.
//! The config is persisted as JSON next to the prompt data.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{bar, button};

/// Errors loading or saving a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Naming and styling of the injected bar and its buttons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuickPromptsConfig {
    /// Class shared by every injected bar
    pub marker_class: String,
    /// Prefix of generated bar ids
    pub bar_id_prefix: String,
    pub button_class: String,
    pub default_button_color: String,
    pub button_text_color: String,
    /// Characters of prompt text used when a prompt has no name
    pub label_max_chars: usize,
    pub bar_style: Vec<(String, String)>,
    pub button_style: Vec<(String, String)>,
}

impl Default for QuickPromptsConfig {
    fn default() -> Self {
        Self {
            marker_class: bar::MARKER_CLASS.to_string(),
            bar_id_prefix: bar::ID_PREFIX.to_string(),
            button_class: button::CLASS.to_string(),
            default_button_color: button::DEFAULT_COLOR.to_string(),
            button_text_color: button::TEXT_COLOR.to_string(),
            label_max_chars: button::LABEL_MAX_CHARS,
            bar_style: to_owned_pairs(bar::STYLE),
            button_style: to_owned_pairs(button::STYLE),
        }
    }
}

fn to_owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl QuickPromptsConfig {
    /// Load from a JSON file; a missing file yields the defaults
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!("Loaded quick-prompts config from {:?}", path);
        Ok(config)
    }

    /// Save as pretty JSON, creating parent directories
    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        log::info!("Saved quick-prompts config to {:?}", path);
        Ok(())
    }

    /// The marker class scopes the single-bar invariant, so it cannot be blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker_class.trim().is_empty() || self.marker_class.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "marker class must be a single class name, got {:?}",
                self.marker_class
            )));
        }
        if self.bar_id_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("bar id prefix must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = QuickPromptsConfig::default();
        assert_eq!(config.default_button_color, "#444654");
        assert_eq!(config.label_max_chars, 15);
        assert!(config
            .bar_style
            .contains(&("display".to_string(), "flex".to_string())));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: QuickPromptsConfig =
            serde_json::from_str(r##"{"defaultButtonColor": "#123456"}"##).unwrap();
        assert_eq!(config.default_button_color, "#123456");
        assert_eq!(config.marker_class, bar::MARKER_CLASS);
    }

    #[test]
    fn test_blank_marker_rejected() {
        let config = QuickPromptsConfig {
            marker_class: "two words".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = QuickPromptsConfig {
            label_max_chars: 20,
            ..Default::default()
        };
        config.save(&path).await.unwrap();

        let loaded = QuickPromptsConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let loaded = QuickPromptsConfig::load(&dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(loaded, QuickPromptsConfig::default());
    }
}
