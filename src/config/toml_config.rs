use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Optional `--config` file. Every section and key falls back to the
/// production defaults, so an empty file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub sanity: SanitySettings,
    #[serde(default)]
    pub mapbox: MapboxSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitySettings {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub document_type: String,
    /// Replaces `https://{project_id}.api.sanity.io`.
    pub api_host: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for SanitySettings {
    fn default() -> Self {
        Self {
            project_id: "uyzjzo0o".to_string(),
            dataset: "production".to_string(),
            api_version: "2024-06-01".to_string(),
            document_type: "neighborhood".to_string(),
            api_host: None,
            timeout_seconds: 30,
        }
    }
}

impl SanitySettings {
    pub fn host(&self) -> String {
        match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        }
    }

    pub fn query_url(&self) -> String {
        format!(
            "{}/v{}/data/query/{}",
            self.host(),
            self.api_version,
            self.dataset
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapboxSettings {
    pub base_url: String,
    /// `minLng,minLat,maxLng,maxLat` bounding box for neighborhood lookups.
    pub bbox: String,
    /// `lng,lat` bias point for neighborhood lookups.
    pub proximity: String,
    pub country: String,
    pub timeout_seconds: u64,
}

impl Default for MapboxSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com".to_string(),
            bbox: "-80.3,32.5,-79.4,33.1".to_string(),
            proximity: "-79.9311,32.7765".to_string(),
            country: "US".to_string(),
            timeout_seconds: 20,
        }
    }
}

impl MapboxSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ToolConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EtlError::not_found("Config file", path.display().to_string())
            } else {
                EtlError::IoError(e)
            }
        })?;
        let config: ToolConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!("Loading tool config from {}", path);
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }
}

impl Validate for ToolConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("sanity.project_id", &self.sanity.project_id)?;
        validate_non_empty_string("sanity.dataset", &self.sanity.dataset)?;
        validate_non_empty_string("sanity.api_version", &self.sanity.api_version)?;
        validate_non_empty_string("sanity.document_type", &self.sanity.document_type)?;
        if let Some(host) = &self.sanity.api_host {
            validate_url("sanity.api_host", host)?;
        }
        validate_positive_number("sanity.timeout_seconds", self.sanity.timeout_seconds as usize, 1)?;

        validate_url("mapbox.base_url", &self.mapbox.base_url)?;
        validate_coordinate_list("mapbox.bbox", &self.mapbox.bbox, 4)?;
        validate_coordinate_list("mapbox.proximity", &self.mapbox.proximity, 2)?;
        validate_positive_number("mapbox.timeout_seconds", self.mapbox.timeout_seconds as usize, 1)?;
        Ok(())
    }
}

fn validate_coordinate_list(field: &str, value: &str, expected: usize) -> Result<()> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != expected || parts.iter().any(|p| p.parse::<f64>().is_err()) {
        return Err(EtlError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: format!("Expected {} comma-separated numbers", expected),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.sanity.query_url(),
            "https://uyzjzo0o.api.sanity.io/v2024-06-01/data/query/production"
        );
        assert_eq!(config.mapbox.timeout(), Duration::from_secs(20));
        assert_eq!(config.sanity.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.toml");
        std::fs::write(
            &path,
            r#"
[sanity]
dataset = "staging"
api_host = "http://127.0.0.1:9999/"

[mapbox]
proximity = "-79.86,32.79"
"#,
        )
        .unwrap();

        let config = ToolConfig::from_file(&path).unwrap();
        assert_eq!(config.sanity.project_id, "uyzjzo0o");
        assert_eq!(
            config.sanity.query_url(),
            "http://127.0.0.1:9999/v2024-06-01/data/query/staging"
        );
        assert_eq!(config.mapbox.proximity, "-79.86,32.79");
        assert_eq!(config.mapbox.bbox, "-80.3,32.5,-79.4,33.1");
    }

    #[test]
    fn test_invalid_bbox_rejected() {
        let mut config = ToolConfig::default();
        config.mapbox.bbox = "-80.3,32.5".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_without_path_is_default() {
        let config = ToolConfig::load(None).unwrap();
        assert_eq!(config.sanity.document_type, "neighborhood");
    }

    #[test]
    fn test_missing_file() {
        let err = ToolConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, EtlError::FileNotFoundError { .. }));
    }
}
