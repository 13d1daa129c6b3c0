use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_session_minutes")]
    pub session_minutes: u32,
    #[serde(default = "default_python_bin")]
    pub python_bin: String,
    #[serde(default = "default_python_timeout_secs")]
    pub python_timeout_secs: u64,
    /// Legacy scoring backend; no posting when unset.
    #[serde(default)]
    pub results_endpoint: Option<String>,
    /// Learner address for the emailed report; no email when unset.
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub email_endpoint: Option<String>,
    #[serde(default)]
    pub email_service_id: Option<String>,
    #[serde(default)]
    pub email_template_id: Option<String>,
    #[serde(default)]
    pub email_public_key: Option<String>,
    /// Directory of question-set JSON; embedded content is used when unset.
    #[serde(default)]
    pub content_dir: Option<String>,
}

fn default_session_minutes() -> u32 {
    90
}
fn default_python_bin() -> String {
    "python3".to_string()
}
fn default_python_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_minutes: default_session_minutes(),
            python_bin: default_python_bin(),
            python_timeout_secs: default_python_timeout_secs(),
            results_endpoint: None,
            user_email: None,
            email_endpoint: None,
            email_service_id: None,
            email_template_id: None,
            email_public_key: None,
            content_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("examdrill")
            .join("config.toml")
    }

    pub fn session_seconds(&self) -> u32 {
        self.session_minutes * 60
    }

    pub fn python_timeout(&self) -> Duration {
        Duration::from_secs(self.python_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.session_minutes, 90);
        assert_eq!(config.python_bin, "python3");
        assert_eq!(config.python_timeout_secs, 10);
        assert!(config.results_endpoint.is_none());
        assert!(config.user_email.is_none());
    }

    #[test]
    fn test_config_serde_partial_file_keeps_defaults() {
        let toml_str = r#"
session_minutes = 45
user_email = "learner@example.com"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session_minutes, 45);
        assert_eq!(config.user_email.as_deref(), Some("learner@example.com"));
        assert_eq!(config.python_bin, "python3");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.results_endpoint = Some("https://example.com/score".to_string());
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.session_minutes, deserialized.session_minutes);
        assert_eq!(config.results_endpoint, deserialized.results_endpoint);
    }

    #[test]
    fn test_session_seconds() {
        let config = Config::default();
        assert_eq!(config.session_seconds(), 90 * 60);
    }
}
