use crate::scores::ScoreSource;
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub scores: ScoreSettings,
    #[serde(default)]
    pub view: ViewSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScoreSettings {
    pub file: Option<PathBuf>,     // JSON or TOML map of domain -> score
    pub endpoint: Option<String>,  // REST endpoint answering ?user_id=...
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub frame_ms: u64,
    pub base_hue: f32,
    pub thickness: f32,
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            frame_ms: 33,
            base_hue: 30.0,
            thickness: 1.0,
            snapshot_dir: None,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                warn!("ignoring malformed settings in {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mindroots")
            .join("config.toml")
    }
}

impl ScoreSettings {
    /// Command-line values take precedence over the config file.
    /// A file beats an endpoint; an endpoint needs a user.
    pub fn source(
        &self,
        file: Option<PathBuf>,
        endpoint: Option<String>,
        user: Option<String>,
    ) -> ScoreSource {
        if let Some(path) = file.or_else(|| self.file.clone()) {
            return ScoreSource::File(path);
        }
        let endpoint = endpoint.or_else(|| self.endpoint.clone());
        let user = user.or_else(|| self.user.clone());
        match (endpoint, user) {
            (Some(endpoint), Some(user)) => ScoreSource::Remote { endpoint, user },
            (Some(_), None) => {
                warn!("score endpoint configured without a user, using defaults");
                ScoreSource::Defaults
            }
            _ => ScoreSource::Defaults,
        }
    }
}

impl ViewSettings {
    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot_dir
            .clone()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
