//! YAML configuration for windowed PDR runs.
//!
//! ```yaml
//! log_file: loglistener.log
//! testbed: false
//! time_markers: [3, 6, 9, 12, 15, 18]
//! output_dir: timeline
//! keep_truncated: true
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::Dialect;

/// Minute marks used when none are configured
pub const DEFAULT_TIME_MARKERS: [u64; 6] = [3, 6, 9, 12, 15, 18];

/// Windowed run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub testbed: bool,
    /// Cutoffs in minutes since the first log line
    #[serde(default = "default_time_markers")]
    pub time_markers: Vec<u64>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Also write each truncated log as `log_<M>min.log`
    #[serde(default)]
    pub keep_truncated: bool,
}

fn default_time_markers() -> Vec<u64> {
    DEFAULT_TIME_MARKERS.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            testbed: false,
            time_markers: default_time_markers(),
            output_dir: default_output_dir(),
            keep_truncated: false,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid time markers: {0}")]
    InvalidMarkers(String),
    #[error("No log file given")]
    MissingLogFile,
}

impl TimelineConfig {
    pub fn dialect(&self) -> Dialect {
        Dialect::from_testbed_flag(self.testbed)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.log_file.is_none() {
            return Err(ValidationError::MissingLogFile);
        }
        if self.time_markers.is_empty() {
            return Err(ValidationError::InvalidMarkers("at least one marker is required".to_string()));
        }
        if self.time_markers.contains(&0) {
            return Err(ValidationError::InvalidMarkers("markers must be positive".to_string()));
        }
        if self.time_markers.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ValidationError::InvalidMarkers(format!(
                "markers must be strictly increasing, got {:?}",
                self.time_markers
            )));
        }
        Ok(())
    }
}

/// Load configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<TimelineConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .with_context(|| format!("Failed to open config file: {}", config_path.display()))?;
    let config: TimelineConfig = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log_file: /tmp/loglistener.log").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/loglistener.log")));
        assert!(!config.testbed);
        assert_eq!(config.time_markers, vec![3, 6, 9, 12, 15, 18]);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.dialect(), Dialect::Simulation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "log_file: run.log\ntestbed: true\ntime_markers: [5, 10]\noutput_dir: out\nkeep_truncated: true\n"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.dialect(), Dialect::Testbed);
        assert_eq!(config.time_markers, vec![5, 10]);
        assert!(config.keep_truncated);
    }

    #[test]
    fn test_validate_markers() {
        let mut config = TimelineConfig {
            log_file: Some(PathBuf::from("run.log")),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.time_markers = vec![6, 3];
        assert!(matches!(config.validate(), Err(ValidationError::InvalidMarkers(_))));

        config.time_markers = vec![0, 3];
        assert!(config.validate().is_err());

        config.time_markers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_log_file() {
        assert!(matches!(
            TimelineConfig::default().validate(),
            Err(ValidationError::MissingLogFile)
        ));
    }
}
