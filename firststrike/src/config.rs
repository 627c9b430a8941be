//! FirstStrike configuration types and loading

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::LatLng;

/// Main FirstStrike configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generative AI provider configuration
    pub genai: GenAiConfig,

    /// Fixed operator position used to bias grounded search
    pub location: Option<LatLng>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the API key environment variable is set. Call this before
    /// any command that reaches the provider.
    pub fn validate(&self) -> Result<()> {
        self.genai.get_api_key().map(|_| ())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .firststrike.yml
        let local_config = PathBuf::from(".firststrike.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/firststrike/firststrike.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("firststrike").join("firststrike.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Generative AI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Model used for grounded command plans
    #[serde(rename = "plan-model")]
    pub plan_model: String,

    /// Model used for recon imagery
    #[serde(rename = "image-model")]
    pub image_model: String,

    /// Model used for spoken briefings
    #[serde(rename = "speech-model")]
    pub speech_model: String,

    /// Prebuilt voice for spoken briefings
    pub voice: String,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_ms: 120_000,
            plan_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            voice: "Charon".to_string(),
        }
    }
}

impl GenAiConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        api_key_from_env(&self.api_key_env).ok_or_else(|| {
            eyre!(
                "GenAI API key not found. Set the {} environment variable.",
                self.api_key_env
            )
        })
    }
}

/// Read a usable API key from `env_var`; a blank value counts as unset
pub fn api_key_from_env(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.genai.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.genai.plan_model, "gemini-2.5-flash");
        assert_eq!(config.genai.image_model, "gemini-2.5-flash-image");
        assert_eq!(config.genai.speech_model, "gemini-2.5-flash-preview-tts");
        assert_eq!(config.genai.voice, "Charon");
        assert!(config.location.is_none());
    }

    #[test]
    fn test_load_from_file_partial() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
genai:
  plan-model: gemini-2.5-pro
  timeout-ms: 5000
location:
  latitude: 34.05
  longitude: -118.24
log-level: debug
"#
        )
        .unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.genai.plan_model, "gemini-2.5-pro");
        assert_eq!(config.genai.timeout_ms, 5000);
        // Unspecified keys keep their defaults
        assert_eq!(config.genai.voice, "Charon");
        assert_eq!(config.location, Some(LatLng::new(34.05, -118.24)));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_load_explicit_missing_file_errors() {
        let path = PathBuf::from("/nonexistent/firststrike.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    #[serial]
    fn test_validate_and_get_api_key() {
        let mut config = Config::default();
        config.genai.api_key_env = "FIRSTSTRIKE_TEST_KEY".to_string();

        unsafe { std::env::remove_var("FIRSTSTRIKE_TEST_KEY") };
        assert!(config.validate().is_err());
        assert!(config.genai.get_api_key().is_err());

        unsafe { std::env::set_var("FIRSTSTRIKE_TEST_KEY", "k-123") };
        assert!(config.validate().is_ok());
        assert_eq!(config.genai.get_api_key().unwrap(), "k-123");
        unsafe { std::env::remove_var("FIRSTSTRIKE_TEST_KEY") };
    }

    #[test]
    #[serial]
    fn test_blank_key_counts_as_missing() {
        let mut config = Config::default();
        config.genai.api_key_env = "FIRSTSTRIKE_BLANK_KEY".to_string();

        unsafe { std::env::set_var("FIRSTSTRIKE_BLANK_KEY", "  \t ") };
        assert!(config.validate().is_err());
        assert!(api_key_from_env("FIRSTSTRIKE_BLANK_KEY").is_none());

        unsafe { std::env::set_var("FIRSTSTRIKE_BLANK_KEY", " k-789\n") };
        assert_eq!(config.genai.get_api_key().unwrap(), "k-789");
        unsafe { std::env::remove_var("FIRSTSTRIKE_BLANK_KEY") };
    }
}
