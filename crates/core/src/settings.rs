use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::room::RoomSpecs;

pub const DEFAULT_CONFIG_FILE: &str = "furnish.json";
pub const ENV_API_URL: &str = "FURNISH_API_URL";
pub const ENV_MODEL_ROOT: &str = "FURNISH_MODEL_ROOT";
pub const ENV_DESIGNS_DIR: &str = "FURNISH_DESIGNS_DIR";

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    /// Prefixed to catalog model paths.
    pub model_root: PathBuf,
    pub designs_dir: PathBuf,
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub log_level: String,
    pub default_room: RoomSpecs,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            model_root: PathBuf::from("assets"),
            designs_dir: PathBuf::from("designs"),
            api_base_url: None,
            api_token: None,
            log_level: "info".to_string(),
            default_room: RoomSpecs::default(),
        }
    }
}

impl EditorSettings {
    pub fn from_json(data: &str) -> Result<Self, String> {
        serde_json::from_str(data).map_err(|err| format!("invalid settings: {err}"))
    }

    /// Reads `path` when given (it must exist), otherwise `furnish.json` in the
    /// working directory if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        match std::fs::read_to_string(&path) {
            Ok(data) => {
                let settings = Self::from_json(&data)?;
                tracing::info!("settings loaded from {}", path.display());
                Ok(settings)
            }
            Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(format!("failed to read {}: {err}", path.display())),
        }
    }

    /// `load` followed by the `FURNISH_*` environment overrides.
    pub fn from_environment(path: Option<&Path>) -> Result<Self, String> {
        let mut settings = Self::load(path)?;
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = Some(url);
        }
        if let Some(root) = lookup(ENV_MODEL_ROOT) {
            self.model_root = PathBuf::from(root);
        }
        if let Some(dir) = lookup(ENV_DESIGNS_DIR) {
            self.designs_dir = PathBuf::from(dir);
        }
    }

    /// Normalized log level; unknown values fall back to `info`.
    pub fn log_level(&self) -> &'static str {
        let wanted = self.log_level.trim().to_ascii_lowercase();
        LOG_LEVELS
            .into_iter()
            .find(|level| *level == wanted)
            .unwrap_or("info")
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
