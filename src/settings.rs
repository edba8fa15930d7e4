use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::DEFAULT_UTC_OFFSET_MINUTES;

#[derive(Debug, Deserialize)]
pub struct Api {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Api {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Locale {
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Appearance {
    #[serde(default = "default_prefers_dark")]
    pub prefers_dark: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        Self { prefers_dark: true }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api: Api,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub appearance: Appearance,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_utc_offset() -> i32 {
    DEFAULT_UTC_OFFSET_MINUTES
}

fn default_prefers_dark() -> bool {
    true
}

impl Settings {
    /// Loads the TOML file at `path`, then applies `RASPOU__SECTION__KEY`
    /// environment overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("RASPOU").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// `client.toml` in the user's config directory when it exists,
    /// otherwise `client.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("br", "raspoulevou", "raspou-client")
            .map(|dirs| dirs.config_dir().join("client.toml"))
            .filter(|path| path.exists())
            .unwrap_or_else(|| PathBuf::from("client.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_applies_defaults() {
        let path = std::env::temp_dir().join(format!("raspou-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[api]\nbase_url = \"http://localhost:5000\"").unwrap();

        let settings = Settings::load(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.api.base_url, "http://localhost:5000");
        assert_eq!(settings.api.timeout(), Duration::from_secs(10));
        assert_eq!(settings.session.token, None);
        assert_eq!(settings.locale.utc_offset_minutes, -180);
        assert!(settings.appearance.prefers_dark);
    }
}
