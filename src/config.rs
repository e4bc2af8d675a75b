use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use serde::Deserialize;

use crate::market::PriceSelector;

/// Calculator settings, read from YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Carried for callers; orders are not filtered by it.
    pub buy_only: bool,
    pub support_fractional_share: bool,
    /// Tradeable units per share when fractional shares are not supported.
    pub slot_size: f64,
    pub buying_price: PriceSelector,
    pub selling_price: PriceSelector,
    pub value_price: PriceSelector,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buy_only: false,
            support_fractional_share: true,
            slot_size: 1.0,
            buying_price: PriceSelector::default(),
            selling_price: PriceSelector::default(),
            value_price: PriceSelector::default(),
        }
    }
}

impl Config {
    pub fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("org", "quotidian", "modelfit")
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|pdirs| pdirs.config_dir().join("config.yml"))
    }

    /// Model file next to the default configuration.
    pub fn default_model_path() -> Option<PathBuf> {
        Self::project_dirs().map(|pdirs| pdirs.config_dir().join("model.json"))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let file =
            std::fs::File::open(path).with_context(|| format!("Failed to open file {path:?}"))?;
        let config: Config = serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse config {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path must exist; the default location falls back to
    /// `Config::default()` when absent.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.support_fractional_share {
            anyhow::ensure!(
                self.slot_size.is_finite() && self.slot_size > 0.0,
                "slot_size must be positive when fractional shares are disabled, got {}",
                self.slot_size
            );
        }
        Ok(())
    }
}
