use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_ENV: &str = "PLANGO_API_URL";

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout; requests run to completion when unset.
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("plango-session.json"),
        }
    }
}

/// Reads the config file, falling back to defaults when it is missing or
/// malformed. `PLANGO_API_URL` overrides the base url either way.
pub fn load(path: &Path) -> ClientConfig {
    let mut config = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to parse config {}: {e}, using defaults", path.display());
                ClientConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("failed to read config {}: {e}, using defaults", path.display());
            ClientConfig::default()
        }
    };

    if let Ok(baseUrl) = std::env::var(BASE_URL_ENV) {
        if !baseUrl.trim().is_empty() {
            config.api.base_url = baseUrl;
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let parsed: ClientConfig = toml::from_str(
            r#"
            [api]
            timeout_secs = 15
            "#,
        )
        .unwrap();

        assert_eq!(parsed.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(parsed.api.timeout_secs, Some(15));
        assert_eq!(parsed.storage.path, PathBuf::from("plango-session.json"));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plango.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();

        let config = load(&path);
        assert_eq!(config.api.timeout_secs, None);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("absent.toml"));

        assert_eq!(config.api.timeout_secs, None);
        assert_eq!(config.storage.path, PathBuf::from("plango-session.json"));
    }
}
