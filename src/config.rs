// Application configuration loaded from TOML.
//
// ```toml
// [heatmap]
// resolution = 10
//
// [heatmap.policy]
// spot_lower = 0.8
// vol_cap = 5.0
//
// [storage]
// backend = "csv"
// data_dir = "./data"
// ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::surface::generator::RangePolicy;

/// Surface sweep settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HeatmapConfig {
    /// Grid points per axis.
    #[serde(default = "default_resolution")]
    pub resolution: usize,

    /// Default window when no explicit ranges are given.
    #[serde(default)]
    pub policy: RangePolicy,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            policy: RangePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Csv,
}

/// Where calculations are persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for file-backed stores.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub heatmap: HeatmapConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(s).context("invalid configuration TOML")?;
        if config.heatmap.resolution < 2 {
            anyhow::bail!(
                "heatmap.resolution must be at least 2, got {}",
                config.heatmap.resolution
            );
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Default settings with a 10×10 grid.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Quick 5×5 grid.
    pub fn coarse() -> Self {
        Self {
            heatmap: HeatmapConfig {
                resolution: 5,
                ..HeatmapConfig::default()
            },
            ..Self::default()
        }
    }

    /// Dense 25×25 grid.
    pub fn fine() -> Self {
        Self {
            heatmap: HeatmapConfig {
                resolution: 25,
                ..HeatmapConfig::default()
            },
            ..Self::default()
        }
    }
}

fn default_resolution() -> usize {
    10
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.heatmap.resolution, 10);
        assert_eq!(config.heatmap.policy, RangePolicy::default());
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn partial_policy_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [heatmap]
            resolution = 4

            [heatmap.policy]
            spot_lower = 0.5

            [storage]
            backend = "csv"
            data_dir = "/tmp/history"
            "#,
        )
        .unwrap();
        assert_eq!(config.heatmap.resolution, 4);
        assert_eq!(config.heatmap.policy.spot_lower, 0.5);
        assert_eq!(config.heatmap.policy.spot_upper, 1.2);
        assert_eq!(config.storage.backend, StorageBackend::Csv);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/history"));
    }

    #[test]
    fn resolution_below_two_is_rejected() {
        assert!(AppConfig::from_toml_str("[heatmap]\nresolution = 1\n").is_err());
    }

    #[test]
    fn presets_differ_in_resolution() {
        assert_eq!(AppConfig::coarse().heatmap.resolution, 5);
        assert_eq!(AppConfig::standard().heatmap.resolution, 10);
        assert_eq!(AppConfig::fine().heatmap.resolution, 25);
    }
}
