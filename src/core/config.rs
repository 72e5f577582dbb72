use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Display name of the initially selected model.
    #[serde(default = "default_model_name")]
    pub default_model: String,

    /// Simulated completion latency in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// How many recent sessions the sidebar list shows.
    #[serde(default = "default_recent_sessions")]
    pub recent_sessions: usize,

    #[serde(default)]
    pub debug: bool,
}

fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_data_dir() -> String {
    ".arceus".into()
}

fn default_model_name() -> String {
    "DeepSeek V3".into()
}

fn default_reply_delay_ms() -> u64 {
    1000
}

fn default_recent_sessions() -> usize {
    20
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            data_dir: default_data_dir(),
            default_model: default_model_name(),
            reply_delay_ms: default_reply_delay_ms(),
            recent_sessions: default_recent_sessions(),
            debug: false,
        }
    }
}

impl AppConfig {
    pub fn data_path(&self) -> PathBuf {
        self.working_dir.join(&self.data_dir)
    }
}

pub fn load_config(working_dir: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut config = AppConfig::default();
    config.working_dir = wd.clone();

    // Global config first, local project config on top
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("arceus").join("config.json");
        if global_path.exists() {
            let content = std::fs::read_to_string(&global_path)
                .map_err(|e| ConfigError::File(e.to_string()))?;
            let file_config: AppConfig =
                serde_json::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
            merge_config(&mut config, file_config);
        }
    }

    let local_path = wd.join("arceus.json");
    if local_path.exists() {
        let content =
            std::fs::read_to_string(&local_path).map_err(|e| ConfigError::File(e.to_string()))?;
        let file_config: AppConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        merge_config(&mut config, file_config);
    }

    Ok(config)
}

fn merge_config(base: &mut AppConfig, overlay: AppConfig) {
    if overlay.data_dir != default_data_dir() {
        base.data_dir = overlay.data_dir;
    }
    if overlay.default_model != default_model_name() {
        base.default_model = overlay.default_model;
    }
    if overlay.reply_delay_ms != default_reply_delay_ms() {
        base.reply_delay_ms = overlay.reply_delay_ms;
    }
    if overlay.recent_sessions != default_recent_sessions() {
        base.recent_sessions = overlay.recent_sessions;
    }
    if overlay.debug {
        base.debug = true;
    }
}
