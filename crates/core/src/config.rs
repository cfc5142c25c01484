use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::ticket::DEFAULT_CURRENCY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Currency tag stored with every ticket.
    pub currency: String,
    pub database: Option<PathBuf>,
    pub intake_dir: Option<PathBuf>,
    pub ocr: OcrConfig,
    pub preprocess: PreprocessConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub language: String,
    pub page_segmentation_mode: u8,
    pub data_path: Option<String>,
}

/// Adaptive-threshold parameters for the binarized OCR variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Side of the square neighbourhood used for the local mean; forced odd.
    pub block_size: u32,
    /// Subtracted from the local mean before comparing.
    pub offset: i32,
    /// Larger images are down-scaled to fit within this many pixels.
    pub max_dimension: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            database: None,
            intake_dir: None,
            ocr: OcrConfig::default(),
            preprocess: PreprocessConfig::default(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "spa+eng".to_string(),
            page_segmentation_mode: 6,
            data_path: None,
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { block_size: 31, offset: 15, max_dimension: 2800 }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        self.database.clone().unwrap_or_else(|| data_dir.join("tickets.db"))
    }

    pub fn intake_path(&self, data_dir: &Path) -> PathBuf {
        self.intake_dir.clone().unwrap_or_else(|| data_dir.join("intake"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.currency, "MXN");
        assert_eq!(cfg.ocr.language, "spa+eng");
        assert_eq!(cfg.ocr.page_segmentation_mode, 6);
        assert_eq!(cfg.preprocess.block_size, 31);
        assert_eq!(cfg.preprocess.offset, 15);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            currency = "USD"

            [preprocess]
            offset = 10
            "#,
        )
        .unwrap();
        assert_eq!(cfg.currency, "USD");
        assert_eq!(cfg.preprocess.offset, 10);
        assert_eq!(cfg.preprocess.block_size, 31);
        assert_eq!(cfg.ocr, OcrConfig::default());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(Config::from_toml_str("currency = "), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn paths_default_under_data_dir() {
        let cfg = Config::default();
        let base = Path::new("/data/recibo");
        assert_eq!(cfg.database_path(base), base.join("tickets.db"));
        assert_eq!(cfg.intake_path(base), base.join("intake"));

        let cfg = Config::from_toml_str(r#"database = "/tmp/t.db""#).unwrap();
        assert_eq!(cfg.database_path(base), PathBuf::from("/tmp/t.db"));
    }

    #[test]
    fn missing_file_falls_back_only_when_optional() {
        let dir = std::env::temp_dir().join("recibo-config-test-missing");
        let path = dir.join("nope.toml");
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
        assert!(matches!(Config::load(&path), Err(ConfigError::Io { .. })));
    }
}
