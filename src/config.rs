use crate::{error::Result, PresubmitError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_service_base_url")]
    pub service_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Upper bound on in-flight page submissions. `None` submits every page at once.
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,
    #[serde(default)]
    pub symbol_hints: Vec<String>,
    /// Folder a document is filed under when the service detects a symbol.
    #[serde(default)]
    pub symbol_folders: BTreeMap<String, String>,
    #[serde(default = "default_popup_width")]
    pub popup_width: f64,
    #[serde(default = "default_popup_height")]
    pub popup_height: f64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_service_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_jpeg_quality() -> u8 {
    50
}

fn default_popup_width() -> f64 {
    200.0
}

fn default_popup_height() -> f64 {
    100.0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            service_base_url: default_service_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            jpeg_quality: default_jpeg_quality(),
            max_concurrent_requests: None,
            symbol_hints: Vec::new(),
            symbol_folders: BTreeMap::new(),
            popup_width: default_popup_width(),
            popup_height: default_popup_height(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn folder_for_symbol(&self, symbol: &str) -> Option<&str> {
        self.symbol_folders
            .get(symbol.trim().to_lowercase().as_str())
            .map(String::as_str)
    }

    /// Clamps out-of-range values back to something usable. Returns whether
    /// anything changed.
    fn normalize(&mut self) -> bool {
        let mut changed = false;
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            self.jpeg_quality = default_jpeg_quality();
            changed = true;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
            changed = true;
        }
        if self.max_concurrent_requests == Some(0) {
            self.max_concurrent_requests = None;
            changed = true;
        }
        let trimmed = self.service_base_url.trim_end_matches('/');
        if trimmed.len() != self.service_base_url.len() {
            self.service_base_url = trimmed.to_string();
            changed = true;
        }
        let lowered: BTreeMap<String, String> = self
            .symbol_folders
            .iter()
            .map(|(symbol, folder)| (symbol.trim().to_lowercase(), folder.clone()))
            .collect();
        if lowered != self.symbol_folders {
            self.symbol_folders = lowered;
            changed = true;
        }
        changed
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir()
        .ok_or_else(|| PresubmitError::Config("Failed to get config directory".to_string()))?;

    path.push("presubmit");
    fs::create_dir_all(&path)?;

    path.push("config.json");
    Ok(path)
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()?)
}

pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(&get_config_path()?, config)
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        let default_config = Config::default();
        save_config_to(config_path, &default_config)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(config_path)?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| PresubmitError::Config(format!("Failed to parse config: {}", e)))?;
    let mut config: Config = serde_json::from_value(value.clone())
        .map_err(|e| PresubmitError::Config(format!("Failed to parse config: {}", e)))?;

    let changed = config.normalize();

    // Persist fields added since the file was written.
    let needs_backfill = value
        .as_object()
        .map(|obj| {
            ["request_timeout_secs", "symbol_folders", "popup_width", "log_level"]
                .iter()
                .any(|key| !obj.contains_key(*key))
        })
        .unwrap_or(false);
    if needs_backfill || changed {
        save_config_to(config_path, &config)?;
    }

    Ok(config)
}

pub fn save_config_to(config_path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| PresubmitError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(config_path, content)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = load_config_from(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_partial_file_is_backfilled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"service_base_url": "https://api.example.com/"}"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.service_base_url, "https://api.example.com");
        assert_eq!(config.jpeg_quality, 50);

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(written.get("log_level").is_some());
    }

    #[test]
    fn test_out_of_range_values_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"jpeg_quality": 0, "request_timeout_secs": 0, "max_concurrent_requests": 0}"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.jpeg_quality, 50);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.max_concurrent_requests, None);
    }

    #[test]
    fn test_symbol_folder_lookup_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::default();
        config.symbol_folders.insert("Star".to_string(), "Algebra".to_string());
        save_config_to(&path, &config).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.folder_for_symbol("star"), Some("Algebra"));
        assert_eq!(loaded.folder_for_symbol(" STAR "), Some("Algebra"));
        assert_eq!(loaded.folder_for_symbol("square"), None);
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(load_config_from(&path), Err(PresubmitError::Config(_))));
    }
}
