use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use stitch_grid::Rgb;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Preview request body limit, 64 MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Pattern generation server
    pub backend: BackendConfig,

    /// Preview rendering settings
    pub preview: PreviewConfig,

    /// Form defaults for generation requests
    pub defaults: GenerationDefaults,

    /// Client-side upload limits
    pub upload: UploadConfig,
}

/// Where the pattern generation server lives
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Preview surface and legend settings
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PreviewConfig {
    /// Length of the longer preview side
    pub target_dimension: f32,

    /// Cell border color
    #[serde(deserialize_with = "deserialize_rgb")]
    pub grid_color: Rgb,

    /// Cell border width
    pub grid_width: f32,

    /// Legend chip edge length in pixels
    pub swatch_size: u32,

    /// Legend chips per row
    pub swatch_columns: u32,

    /// Largest generation response accepted by `POST /api/preview`
    pub max_body_bytes: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            target_dimension: 400.0,
            grid_color: Rgb::new(0xdd, 0xdd, 0xdd),
            grid_width: 0.5,
            swatch_size: 24,
            swatch_columns: 10,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Values pre-selected in the generation form
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationDefaults {
    pub mesh_count: u32,
    pub canvas_size: String,
    pub max_colors: u32,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            mesh_count: 14,
            canvas_size: "100x100".to_string(),
            max_colors: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UploadConfig {
    /// Largest image accepted before upload
    pub max_file_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: crate::models::upload::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn deserialize_rgb<'de, D>(deserializer: D) -> Result<Rgb, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

impl AppConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load configuration from `path`, or from `config.yaml` when present.
    ///
    /// Missing or unparsable files fall back to defaults. Environment
    /// overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> Self {
        let path: Option<PathBuf> = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        let mut config = match path {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(content) => match Self::from_yaml_str(&content) {
                    Ok(config) => {
                        tracing::info!(
                            path = %path.display(),
                            backend = %config.backend.base_url,
                            target_dimension = config.preview.target_dimension,
                            "Loaded configuration"
                        );
                        config
                    }
                    Err(e) => {
                        tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                    Self::default()
                }
            },
            None => {
                tracing::debug!("No config file, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `STITCHVIEW_BACKEND` from the given lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("STITCHVIEW_BACKEND").filter(|u| !u.trim().is_empty()) {
            tracing::debug!(url = %url, "Backend URL overridden from environment");
            self.backend.base_url = url.trim().trim_end_matches('/').to_string();
        }
    }
}
