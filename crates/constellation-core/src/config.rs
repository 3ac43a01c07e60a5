//! Configuration file support
//!
//! Provides TOML-based configuration for the star buffer and for the scan
//! that feeds it.

use crate::builder::StarBufferConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConstellationConfig {
    #[serde(default)]
    pub buffer: StarBufferConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

/// How candidates are fed to the buffer
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Worker threads offering stars; 0 uses rayon's default pool
    #[serde(default)]
    pub threads: usize,
}

impl ConstellationConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: ConstellationConfig =
            toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        self.buffer
            .validate()
            .context("Invalid [buffer] configuration")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Strategy, DEFAULT_STAR_DENSITY_FACTOR};
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let config = ConstellationConfig::default();
        assert_eq!(config.buffer.strategy, Strategy::fair());
        assert_relative_eq!(config.buffer.star_density_factor, DEFAULT_STAR_DENSITY_FACTOR);
        assert_eq!(config.scan.threads, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ConstellationConfig::from_toml_str("").unwrap();
        assert_eq!(config.buffer, StarBufferConfig::default());
    }

    #[test]
    fn test_parse_manual_bands_toml() {
        let toml_str = r#"
            [buffer]
            star_density_factor = 0.04

            [buffer.strategy]
            kind = "manually_banded"
            sizes = [0.25, 0.25, 0.5]
            weights = [1.0, 2.0, 1.0]

            [scan]
            threads = 4
        "#;

        let config = ConstellationConfig::from_toml_str(toml_str).unwrap();
        assert_relative_eq!(config.buffer.star_density_factor, 0.04);
        assert_eq!(
            config.buffer.strategy,
            Strategy::ManuallyBanded {
                sizes: vec![0.25, 0.25, 0.5],
                weights: vec![1.0, 2.0, 1.0],
            }
        );
        assert_eq!(config.scan.threads, 4);
    }

    #[test]
    fn test_parse_coordinate_agnostic_toml() {
        let toml_str = r#"
            [buffer]
            star_density_factor = 0.5

            [buffer.strategy]
            kind = "coordinate_agnostic"
        "#;

        let config = ConstellationConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.buffer.strategy, Strategy::CoordinateAgnostic);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let toml_str = r#"
            [buffer.strategy]
            kind = "manually_banded"
            sizes = [0.5, 0.5]
            weights = [1.0]
        "#;
        assert!(ConstellationConfig::from_toml_str(toml_str).is_err());

        let toml_str = r#"
            [buffer]
            star_density_factor = -1.0
        "#;
        assert!(ConstellationConfig::from_toml_str(toml_str).is_err());

        let toml_str = r#"
            [buffer.strategy]
            kind = "spiral"
        "#;
        assert!(ConstellationConfig::from_toml_str(toml_str).is_err());
    }
}
