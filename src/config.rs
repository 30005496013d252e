//! Generator configuration.
//!
//! Stored as JSON. An explicit `--config` file must exist; otherwise
//! `~/.config/cmv-maps/config.json` is tried and defaults are used when it is
//! absent. Paths left unset are derived from the module name the same way a
//! toolkit module is laid out: `modules/<name>/assets`, `modules/<name>/addon`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file path.
fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cmv-maps")
        .join("config.json")
}

/// Default directory holding the CSV exports.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("Projects/wow/data")
}

/// Where asset-created creatures are placed when spawns are enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnGrid {
    pub map: u32,
    pub x0: f32,
    pub y0: f32,
    pub z: f32,
    pub o: f32,
    pub dx: f32,
    pub dy: f32,
    pub per_row: u32,
}

impl Default for SpawnGrid {
    fn default() -> Self {
        Self {
            map: 13,
            x0: -14.550729,
            y0: -6.558920,
            z: -144.708649,
            o: 4.706141,
            dx: -3.0,
            dy: 10.0,
            per_row: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_module")]
    pub module_name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub assets_root: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub cleanup_invalid: bool,
    #[serde(default = "default_true")]
    pub scan_assets: bool,
    #[serde(default)]
    pub enable_spawns: bool,
    #[serde(default)]
    pub spawn_grid: SpawnGrid,
    /// Write the record store back to CSV here after asset registration.
    #[serde(default)]
    pub export_records: Option<PathBuf>,
}

fn default_module() -> String { "magic-core".into() }
fn default_true() -> bool { true }

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            module_name: default_module(),
            data_dir: default_data_dir(),
            assets_root: None,
            output_dir: None,
            cleanup_invalid: true,
            scan_assets: true,
            enable_spawns: false,
            spawn_grid: SpawnGrid::default(),
            export_records: None,
        }
    }
}

impl GeneratorConfig {
    /// Load from `path`, or from the default location if `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                Self::from_file(path)
            }
            None => {
                let path = default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn module_dir(&self) -> PathBuf {
        Path::new("modules").join(&self.module_name)
    }

    pub fn assets_root(&self) -> PathBuf {
        self.assets_root
            .clone()
            .unwrap_or_else(|| self.module_dir().join("assets"))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.module_dir().join("addon"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_follow_module_name() {
        let config = GeneratorConfig {
            module_name: "my-module".into(),
            ..Default::default()
        };
        assert_eq!(config.assets_root(), Path::new("modules/my-module/assets"));
        assert_eq!(config.output_dir(), Path::new("modules/my-module/addon"));
        assert!(config.cleanup_invalid);
        assert!(!config.enable_spawns);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "module_name": "zoo", "output_dir": "/tmp/out", "spawn_grid": { "map": 1, "x0": 0, "y0": 0, "z": 0, "o": 0, "dx": 1, "dy": 1, "per_row": 2 } }"#,
        )
        .unwrap();

        let config = GeneratorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.module_name, "zoo");
        assert_eq!(config.output_dir(), Path::new("/tmp/out"));
        assert_eq!(config.assets_root(), Path::new("modules/zoo/assets"));
        assert!(config.scan_assets);
        assert_eq!(config.spawn_grid.per_row, 2);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let err = GeneratorConfig::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn test_bad_json_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            GeneratorConfig::load(Some(&path)),
            Err(Error::Json(_))
        ));
    }
}
