//! Run configuration and the per-city file layout derived from it.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ClipError, Result};

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClipConfig {
    /// Directory holding one sub-directory per city
    pub data_root: PathBuf,
    /// Where outputs go; falls back to `data_root`
    pub output_root: Option<PathBuf>,
    pub overpass_url: String,
    pub timeout_secs: u64,
    /// Produce `list_filtered.csv`
    pub join: bool,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            output_root: None,
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            join: true,
        }
    }
}

impl ClipConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ClipError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ClipConfig =
            toml::from_str(content).map_err(|e| ClipError::Config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ClipError::Config("timeout_secs must be positive".into()));
        }
        url::Url::parse(&self.overpass_url)
            .map_err(|e| ClipError::Config(format!("overpass_url: {}", e)))?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn output_root(&self) -> &Path {
        self.output_root.as_deref().unwrap_or(&self.data_root)
    }
}

/// Every file a run touches for one city
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetPaths {
    pub streets: PathBuf,
    pub records: PathBuf,
    pub boundary_out: PathBuf,
    pub streets_out: PathBuf,
    pub records_out: PathBuf,
}

impl DatasetPaths {
    pub fn for_city(config: &ClipConfig, city: &str) -> Self {
        let input = config.data_root.join(city);
        let output = config.output_root().join(city);
        Self {
            streets: input.join(format!("{}_streets.geojson", city)),
            records: input.join("list.csv"),
            boundary_out: output.join(format!("{}_boundary.geojson", city)),
            streets_out: output.join(format!("{}_streets_filtered.geojson", city)),
            records_out: output.join("list_filtered.csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = ClipConfig::from_toml("").unwrap();
        assert_eq!(config, ClipConfig::default());
        assert!(config.join);
        assert_eq!(config.output_root(), Path::new("data"));
    }

    #[test]
    fn test_partial_toml() {
        let config = ClipConfig::from_toml(
            r#"
            data_root = "/srv/streets"
            output_root = "/tmp/out"
            timeout_secs = 30
            join = false
            "#,
        )
        .unwrap();
        assert_eq!(config.data_root, PathBuf::from("/srv/streets"));
        assert_eq!(config.output_root(), Path::new("/tmp/out"));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.join);
        assert_eq!(config.overpass_url, DEFAULT_OVERPASS_URL);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ClipConfig::from_toml("timeout_secs = 0").is_err());
        assert!(ClipConfig::from_toml("overpass_url = \"not a url\"").is_err());
        assert!(ClipConfig::from_toml("colour = \"blue\"").is_err());
    }

    #[test]
    fn test_dataset_paths() {
        let config = ClipConfig {
            data_root: PathBuf::from("in"),
            output_root: Some(PathBuf::from("out")),
            ..ClipConfig::default()
        };
        let paths = DatasetPaths::for_city(&config, "lima");
        assert_eq!(paths.streets, PathBuf::from("in/lima/lima_streets.geojson"));
        assert_eq!(paths.records, PathBuf::from("in/lima/list.csv"));
        assert_eq!(
            paths.boundary_out,
            PathBuf::from("out/lima/lima_boundary.geojson")
        );
        assert_eq!(
            paths.streets_out,
            PathBuf::from("out/lima/lima_streets_filtered.geojson")
        );
        assert_eq!(paths.records_out, PathBuf::from("out/lima/list_filtered.csv"));
    }
}
