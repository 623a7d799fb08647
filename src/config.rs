//! Dashboard Configuration
//! Data file locations, read from an optional `dashboard.json`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// File names of the six input tables, relative to `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    pub historical: String,
    pub forecast: String,
    pub metrics: String,
    pub metadata: String,
    pub actual_test: String,
    pub predicted_test: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            historical: "data processed_data monthly.csv".to_string(),
            forecast: "data forecast_peramalan 20 tahun semua parameter.csv".to_string(),
            metrics: "evaluation model_metrics.csv".to_string(),
            metadata: "metadata_model metadata.csv".to_string(),
            actual_test: "data dashboard_data aktual test.csv".to_string(),
            predicted_test: "data dashboard_data prediksi test.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub files: DataFiles,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            files: DataFiles::default(),
        }
    }
}

/// Resolved paths of the six input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub historical: PathBuf,
    pub forecast: PathBuf,
    pub metrics: PathBuf,
    pub metadata: PathBuf,
    pub actual_test: PathBuf,
    pub predicted_test: PathBuf,
}

impl DashboardConfig {
    /// Parse a config file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load `path` if it exists, otherwise use defaults.
    /// A broken file is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded dashboard config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), "ignoring config: {}", e);
                Self::default()
            }
        }
    }

    pub fn data_paths(&self) -> DataPaths {
        let join = |name: &str| self.data_dir.join(name);
        DataPaths {
            historical: join(&self.files.historical),
            forecast: join(&self.files.forecast),
            metrics: join(&self.files.metrics),
            metadata: join(&self.files.metadata),
            actual_test: join(&self.files.actual_test),
            predicted_test: join(&self.files.predicted_test),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = DashboardConfig::load_or_default(Path::new("does/not/exist.json"));
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_default_names() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, r#"{{"data_dir": "/srv/climate", "files": {{"metrics": "m.csv"}}}}"#).unwrap();

        let config = DashboardConfig::load(tmp.path()).unwrap();
        let paths = config.data_paths();

        assert_eq!(paths.metrics, PathBuf::from("/srv/climate/m.csv"));
        assert_eq!(
            paths.historical,
            PathBuf::from("/srv/climate/data processed_data monthly.csv")
        );
    }

    #[test]
    fn test_invalid_json_falls_back() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{{ not json").unwrap();

        assert!(matches!(
            DashboardConfig::load(tmp.path()),
            Err(ConfigError::Json(_))
        ));
        assert_eq!(
            DashboardConfig::load_or_default(tmp.path()),
            DashboardConfig::default()
        );
    }
}
