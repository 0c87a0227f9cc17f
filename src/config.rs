use crate::constants::{
    DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_REDIRECTS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::models::FormatTag;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration loaded from settings.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub extractors: ExtractorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Limits applied to every remote fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum payload size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Resolve hostnames and refuse ones that point at internal addresses
    #[serde(default = "default_resolve_dns")]
    pub resolve_dns: bool,
    /// Where scratch files are written (system temp dir when unset)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

fn default_resolve_dns() -> bool {
    true
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            request_timeout_secs: default_request_timeout_secs(),
            max_redirects: default_max_redirects(),
            resolve_dns: default_resolve_dns(),
            scratch_dir: None,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn max_file_size_mb(&self) -> f64 {
        self.max_file_size as f64 / (1024.0 * 1024.0)
    }

    /// Scratch directory with `~` expanded
    pub fn scratch_dir(&self) -> PathBuf {
        match &self.scratch_dir {
            Some(dir) => expand_path(dir),
            None => std::env::temp_dir(),
        }
    }
}

/// Which extractors are switched on
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractorsConfig {
    /// Formats to disable, written as extensions ("doc" or ".doc")
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl ExtractorsConfig {
    pub fn is_enabled(&self, format: FormatTag) -> bool {
        !self
            .disabled
            .iter()
            .filter_map(|ext| FormatTag::from_extension(ext))
            .any(|disabled| disabled == format)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration from default location or return defaults
    pub fn load() -> Result<Self> {
        let default_paths = [
            PathBuf::from("config/settings.toml"),
            PathBuf::from("./config/settings.toml"),
            expand_path(Path::new("~/.config/docpull/settings.toml")),
        ];

        for path in &default_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Apply `MAX_FILE_SIZE`, `REQUEST_TIMEOUT`, `HOST` and `PORT` from the environment
    pub fn apply_env(mut self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("MAX_FILE_SIZE") {
            self.fetch.max_file_size = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid MAX_FILE_SIZE: {}", raw))?;
        }
        if let Some(raw) = lookup("REQUEST_TIMEOUT") {
            self.fetch.request_timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid REQUEST_TIMEOUT: {}", raw))?;
        }
        if let Some(raw) = lookup("HOST") {
            self.server.host = raw;
        }
        if let Some(raw) = lookup("PORT") {
            self.server.port = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {}", raw))?;
        }
        Ok(())
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.fetch.max_file_size, 50 * 1024 * 1024);
        assert_eq!(config.fetch.request_timeout_secs, 30);
        assert!(config.fetch.resolve_dns);
        assert!(config.extractors.disabled.is_empty());
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 8080

[fetch]
max_file_size = 1048576
request_timeout_secs = 5

[extractors]
disabled = ["doc"]
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.fetch.max_file_size, 1048576);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch.max_redirects, 10);
        assert!(!config.extractors.is_enabled(FormatTag::Doc));
        assert!(config.extractors.is_enabled(FormatTag::Docx));
    }

    #[test]
    fn test_config_env_overrides() {
        let env: HashMap<&str, &str> = [("MAX_FILE_SIZE", "1024"), ("REQUEST_TIMEOUT", "7"), ("PORT", "9000")]
            .into_iter()
            .collect();
        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.fetch.max_file_size, 1024);
        assert_eq!(config.fetch.request_timeout_secs, 7);
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_config_env_rejects_garbage() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| (key == "MAX_FILE_SIZE").then(|| "lots".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_max_file_size_mb() {
        let config = FetchConfig::default();
        assert_eq!(config.max_file_size_mb(), 50.0);
    }
}
