use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `output_dir`.
pub const OUTPUT_DIR_ENV: &str = "SONGS_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("xdg: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Global configuration loaded from `~/.config/batchdl/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of jobs allowed to run at the same time.
    pub concurrency: usize,
    /// External download tool (looked up on PATH).
    pub tool: String,
    /// Arguments placed after each target; the output directory follows them.
    pub tool_flags: Vec<String>,
    /// Directory every job downloads into.
    pub output_dir: PathBuf,
    /// Log file; defaults to the XDG state dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            tool: "yt-dlp".to_string(),
            tool_flags: [
                "-f",
                "bestaudio",
                "--extract-audio",
                "--audio-format",
                "opus",
                "--audio-quality",
                "160K",
                "--embed-metadata",
                "-P",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            output_dir: PathBuf::from("."),
            log_file: None,
        }
    }
}

impl BatchConfig {
    /// Apply environment overrides (`SONGS_DIR`).
    pub fn apply_env(&mut self) {
        self.apply_output_dir_override(std::env::var_os(OUTPUT_DIR_ENV).map(PathBuf::from));
    }

    fn apply_output_dir_override(&mut self, dir: Option<PathBuf>) {
        if let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) {
            self.output_dir = dir;
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.tool.trim().is_empty() {
            return Err(ConfigError::Invalid("tool must not be empty".into()));
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("batchdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from an explicit file. Missing keys are an error.
/// Values are not validated here; overrides may still replace them.
pub fn load_from_path(path: &Path) -> Result<BatchConfig, ConfigError> {
    let data = fs::read_to_string(path)?;
    Ok(toml::from_str(&data)?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BatchConfig, ConfigError> {
    load_or_init_at(&config_path()?)
}

fn load_or_init_at(path: &Path) -> Result<BatchConfig, ConfigError> {
    if !path.exists() {
        let default_cfg = BatchConfig::default();
        let toml = default_cfg.to_toml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}
