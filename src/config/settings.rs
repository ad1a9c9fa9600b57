use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use lazy_static::lazy_static;

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "FITCOACH_CONFIG";
/// Environment variable carrying an extra AI API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    /// Keys tried in order; rotation moves to the next one on quota errors
    pub api_keys: Vec<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            api_keys: Vec::new(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig { data_dir: data_dir().join("data") }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoachConfig {
    pub ai: AiConfig,
    pub store: StoreConfig,
}

impl CoachConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, crate::error::CoachError> {
        Ok(toml::from_str::<CoachConfig>(content)?)
    }
}

fn data_dir() -> PathBuf {
    // Use platform-specific app data directory
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/com.fitcoach");
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("com.fitcoach");
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share/com.fitcoach");
            return dir;
        }
    }

    // Fallback
    PathBuf::from(".")
}

fn get_config_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(explicit);
    }
    data_dir().join("fitcoach.toml")
}

fn load_config_internal() -> CoachConfig {
    let config_path = get_config_path();

    match fs::read_to_string(&config_path) {
        Ok(content) => match CoachConfig::from_toml_str(&content) {
            Ok(config) => {
                tracing::info!(path = ?config_path, "Loaded configuration");
                return config;
            }
            Err(e) => {
                tracing::warn!(path = ?config_path, error = %e, "Failed to parse config, using defaults");
            }
        },
        Err(e) => {
            tracing::debug!(path = ?config_path, error = %e, "No config file, using defaults");
        }
    }

    CoachConfig::default()
}

lazy_static! {
    static ref COACH_CONFIG: CoachConfig = load_config_internal();
}

/// Get the cached configuration (loaded once on first use)
pub fn get_config() -> &'static CoachConfig {
    &COACH_CONFIG
}
