//! Optional TOML configuration.
//!
//! Looked up at `$PREDICT_CONFIG`, falling back to `config.toml` in the
//! platform config directory. Every key is optional; anything missing keeps
//! its default.

use directories::ProjectDirs;
use predict::{LogisticParams, PlotSettings};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "PREDICT_CONFIG";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub plot: PlotConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub alpha: f64,
    pub max_iterations: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let params = LogisticParams::default();
        Self {
            alpha: params.alpha,
            max_iterations: params.max_iterations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        let settings = PlotSettings::default();
        Self {
            width: settings.width,
            height: settings.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Below this width (in points) widgets are stacked in one column.
    pub narrow_width: f32,
    /// Share of the display the window takes at startup.
    pub window_fraction: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            narrow_width: 400.0,
            window_fraction: 0.8,
        }
    }
}

impl AppConfig {
    pub fn logistic_params(&self) -> LogisticParams {
        LogisticParams {
            alpha: self.model.alpha,
            max_iterations: self.model.max_iterations,
        }
    }

    pub fn plot_settings(&self) -> PlotSettings {
        PlotSettings {
            width: self.plot.width,
            height: self.plot.height,
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !(self.model.alpha.is_finite() && self.model.alpha >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "model.alpha must be a non-negative number, got {}",
                self.model.alpha
            )));
        }
        if self.model.max_iterations == 0 {
            return Err(ConfigError::Invalid(
                "model.max_iterations must be at least 1".to_string(),
            ));
        }
        if self.plot.width < 200 || self.plot.height < 200 {
            return Err(ConfigError::Invalid(format!(
                "plot size must be at least 200x200, got {}x{}",
                self.plot.width, self.plot.height
            )));
        }
        if !(self.layout.window_fraction > 0.0 && self.layout.window_fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "layout.window_fraction must be in (0, 1], got {}",
                self.layout.window_fraction
            )));
        }
        Ok(self)
    }
}

/// Where the config file is expected, if a location can be resolved.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("", "", "predict-anything").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Reads `path`; a missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let config: AppConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()
}

/// Loads the config, falling back to defaults on any failure.
pub fn load() -> AppConfig {
    let Some(path) = config_path() else {
        tracing::debug!("no config directory available; using defaults");
        return AppConfig::default();
    };
    match load_from(&path) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), ?config, "configuration loaded");
            config
        }
        Err(err) => {
            tracing::warn!("{err}; using defaults");
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.logistic_params(), LogisticParams::default());
        assert_eq!(config.plot_settings(), PlotSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = write_config("[model]\nalpha = 0.25\n\n[layout]\nnarrow_width = 500.0\n");
        let config = load_from(file.path()).unwrap();
        assert_eq!(config.model.alpha, 0.25);
        assert_eq!(config.model.max_iterations, 100);
        assert_eq!(config.layout.narrow_width, 500.0);
        assert_eq!(config.layout.window_fraction, 0.8);
        assert_eq!(config.plot, PlotConfig::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let file = write_config("[model\nalpha = ");
        assert!(matches!(load_from(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let file = write_config("[model]\nmax_iterations = 0\n");
        assert!(matches!(load_from(file.path()), Err(ConfigError::Invalid(_))));

        let file = write_config("[layout]\nwindow_fraction = 1.5\n");
        assert!(matches!(load_from(file.path()), Err(ConfigError::Invalid(_))));
    }
}
