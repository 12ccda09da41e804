use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_VERSION: &str = "2024-02-01";
pub const DEFAULT_MAX_TOKENS: u32 = 2500;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";
pub const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_CHAT_DEPLOYMENT_NAME";
pub const ENV_CONFIG_PATH: &str = "AUTORAG_CONFIG";

/// Keys accepted by `autorag config`
pub const CONFIG_KEYS: &[&str] = &[
    "endpoint",
    "deployment",
    "api_version",
    "max_tokens",
    "temperature",
    "timeout_secs",
];

/// Default config file location
pub fn default_config_file() -> PathBuf {
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        return PathBuf::from(path);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("autorag")
        .join("config.yaml")
}

/// Values stored in the config file. Unset keys fall back to the
/// environment, then to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load from a path; a missing file is an empty config
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).map_err(write_err)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "endpoint" => self.endpoint.clone(),
            "deployment" => self.deployment.clone(),
            "api_version" => self.api_version.clone(),
            "max_tokens" => self.max_tokens.map(|v| v.to_string()),
            "temperature" => self.temperature.map(|v| v.to_string()),
            "timeout_secs" => self.timeout_secs.map(|v| v.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "endpoint" => self.endpoint = Some(value.to_string()),
            "deployment" => self.deployment = Some(value.to_string()),
            "api_version" => self.api_version = Some(value.to_string()),
            "max_tokens" => self.max_tokens = Some(value.parse().map_err(|_| invalid())?),
            "temperature" => {
                let t: f64 = value.parse().map_err(|_| invalid())?;
                if !(0.0..=2.0).contains(&t) {
                    return Err(invalid());
                }
                self.temperature = Some(t);
            }
            "timeout_secs" => self.timeout_secs = Some(value.parse().map_err(|_| invalid())?),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// Fully resolved settings for the generation client
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub deployment: String,
    pub api_key: String,
    pub api_version: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl GenerationConfig {
    /// Resolve: config file > environment > default. The API key only comes
    /// from the environment.
    pub fn resolve(file: &FileConfig) -> Self {
        Self::resolve_with(file, |key| std::env::var(key).ok())
    }

    fn resolve_with(file: &FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            endpoint: file
                .endpoint
                .clone()
                .or_else(|| env(ENV_ENDPOINT))
                .unwrap_or_default(),
            deployment: file
                .deployment
                .clone()
                .or_else(|| env(ENV_DEPLOYMENT))
                .unwrap_or_default(),
            api_key: env(ENV_API_KEY).unwrap_or_default(),
            api_version: file
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            max_tokens: file.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: file.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            timeout_secs: file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load the config file at `path` and resolve it
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::resolve(&FileConfig::load(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig::load(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = FileConfig::default();
        config.set("endpoint", "https://example.openai.azure.com/").unwrap();
        config.set("max_tokens", "512").unwrap();
        config.save(&path).unwrap();

        let loaded = FileConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.get("max_tokens").unwrap(), Some("512".to_string()));
        assert_eq!(loaded.get("deployment").unwrap(), None);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = FileConfig::default();

        assert!(matches!(
            config.set("max_tokens", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("temperature", "3.5"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("colour", "blue"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_resolve_order() {
        let env: HashMap<&str, &str> = [
            (ENV_ENDPOINT, "https://env.example/"),
            (ENV_DEPLOYMENT, "env-deploy"),
            (ENV_API_KEY, "secret"),
        ]
        .into_iter()
        .collect();
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let file = FileConfig {
            endpoint: Some("https://file.example/".to_string()),
            ..Default::default()
        };
        let resolved = GenerationConfig::resolve_with(&file, lookup);

        assert_eq!(resolved.endpoint, "https://file.example/");
        assert_eq!(resolved.deployment, "env-deploy");
        assert_eq!(resolved.api_key, "secret");
        assert_eq!(resolved.api_version, DEFAULT_API_VERSION);
        assert_eq!(resolved.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(resolved.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
