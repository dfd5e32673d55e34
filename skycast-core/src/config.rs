use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::search::SearchSettings;

/// Coordinates used by the location flow when the hosting surface has no
/// device position to offer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub lat: f64,
    pub lon: f64,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    /// Optional fallback coordinates for `skycast locate`.
    pub home: Option<HomeLocation>,

    /// Example TOML:
    /// [search]
    /// min_query_len = 6
    /// debounce_ms = 300
    #[serde(default)]
    pub search: SearchSettings,
}

impl Config {
    /// Return the configured API key, with a hint when it is missing.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `skycast configure` and enter your API key first."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.require_api_key().unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("Hint: run `skycast configure`"));
    }

    #[test]
    fn set_api_key_round_trips() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());

        assert_eq!(cfg.require_api_key().expect("key must exist"), "KEY");
    }

    #[test]
    fn search_settings_default_when_absent() {
        let cfg: Config = toml::from_str(r#"api_key = "KEY""#).expect("config must parse");

        assert_eq!(cfg.search, SearchSettings::default());
        assert_eq!(cfg.search.min_query_len, 6);
        assert_eq!(cfg.search.debounce_ms, 300);
        assert_eq!(cfg.search.min_index_count, 1);
    }

    #[test]
    fn partial_search_table_keeps_other_defaults() {
        let cfg: Config = toml::from_str(
            "api_key = \"KEY\"\n\
             [search]\n\
             min_query_len = 3\n",
        )
        .expect("config must parse");

        assert_eq!(cfg.search.min_query_len, 3);
        assert_eq!(cfg.search.debounce_ms, 300);
    }

    #[test]
    fn toml_round_trip_preserves_home_location() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.home = Some(HomeLocation { lat: 51.51, lon: -0.13 });

        let serialized = toml::to_string_pretty(&cfg).expect("config must serialize");
        let parsed: Config = toml::from_str(&serialized).expect("config must parse back");

        assert_eq!(parsed.home, Some(HomeLocation { lat: 51.51, lon: -0.13 }));
        assert_eq!(parsed.require_api_key().expect("key must exist"), "KEY");
    }
}
