use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const API_URL_ENV: &str = "BAIKAL_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_url: Option<String>,
    /// Pre-filled on the login screen.
    pub last_email: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> io::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn save(&self) -> io::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)
    }

    pub fn save_last_email(email: &str) -> io::Result<()> {
        let mut config = Self::load().unwrap_or_default();
        config.last_email = Some(email.to_string());
        config.save()
    }

    /// Backend base URL: explicit override, then `BAIKAL_API_URL`, then the
    /// config file, then the local development default.
    pub fn resolve_api_url(&self, cli_override: Option<&str>) -> String {
        let env_url = std::env::var(API_URL_ENV).ok();
        cli_override
            .map(str::to_string)
            .or(env_url)
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    fn config_path() -> io::Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not determine config directory")
        })?;

        Ok(config_dir.join("baikal").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_url: Some("https://gw.example.com/api".to_string()),
            last_email: Some("admin@baikal.ai".to_string()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_cli_override_wins_and_is_trimmed() {
        let config = Config {
            api_url: Some("http://from-config/api".to_string()),
            last_email: None,
        };
        assert_eq!(
            config.resolve_api_url(Some("http://cli:9000/api/")),
            "http://cli:9000/api"
        );
    }
}
