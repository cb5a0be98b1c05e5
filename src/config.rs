//! Engine configuration (sample rate and block size)
//!
//! Loaded from TOML:
//! ```toml
//! sample_rate = 48000.0
//! block_size = 256
//! ```

use crate::error::{DspError, DspResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Execution context shared by every node of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate in Hz
    pub sample_rate: f32,
    /// Samples per processing tick
    pub block_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            block_size: 512,
        }
    }
}

impl EngineConfig {
    pub fn new(sample_rate: f32, block_size: usize) -> DspResult<Self> {
        let config = Self {
            sample_rate,
            block_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> DspResult<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> DspResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> DspResult<String> {
        toml::to_string_pretty(self).map_err(|e| DspError::Config(e.to_string()))
    }

    pub fn validate(&self) -> DspResult<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(DspError::InvalidConfig(format!(
                "sample_rate {} outside 8000..=384000",
                self.sample_rate
            )));
        }
        if !(1..=8192).contains(&self.block_size) {
            return Err(DspError::InvalidConfig(format!(
                "block_size {} outside 1..=8192",
                self.block_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = EngineConfig::from_toml_str("block_size = 64").unwrap();
        assert_eq!(config.sample_rate, 44100.0);
        assert_eq!(config.block_size, 64);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            EngineConfig::from_toml_str("sample_rate = 100.0"),
            Err(DspError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::new(44100.0, 0),
            Err(DspError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parse_error_maps_to_config() {
        assert!(matches!(
            EngineConfig::from_toml_str("sample_rate = \"fast\""),
            Err(DspError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sample_rate = 48000.0\nblock_size = 128").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config, EngineConfig::new(48000.0, 128).unwrap());

        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
