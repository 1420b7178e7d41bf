use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::engine::EngineSource;
use crate::speech::SpeechConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSource,
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Show image id, validity and sign count under the result.
    #[serde(default = "default_show_debug")]
    pub show_debug: bool,
}

fn default_show_debug() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineSource::default(),
            speech: SpeechConfig::default(),
            show_debug: default_show_debug(),
        }
    }
}

impl Config {
    /// Directory: ~/.config/sign-visualizer/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("sign-visualizer");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        let path = Self::path();
        match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let dir = Self::dir();
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(), data)?;
        Ok(())
    }

    /// Write the defaults out on first run so users have something to edit.
    pub fn ensure_saved(&self) {
        if Self::path().exists() {
            return;
        }
        if let Err(e) = self.save() {
            log::warn!("Failed to save config: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine, EngineSource::Builtin);
        assert!(config.speech.enabled);
        assert_eq!(config.speech.rate, 0.8);
        assert!(config.show_debug);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "engine": { "kind": "table", "path": "/opt/signs.json" } }"#,
        )
        .unwrap();
        assert_eq!(
            config.engine,
            EngineSource::Table {
                path: PathBuf::from("/opt/signs.json")
            }
        );
        assert_eq!(config.speech, SpeechConfig::default());
        assert!(config.show_debug);
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = Config {
            show_debug: false,
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
