use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::backoff::{self, Backoff, BackoffExt, BackoffFactory, Constant, Exponential};

/// Delay shape between retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Same delay every time (`interval_ms`).
    #[default]
    Constant,
    /// `interval_ms * 2^(n-1)`, capped at `max_delay_ms`.
    Exponential,
}

/// Backoff parameters (`[backoff]` section in config.toml).
///
/// Without `max_retries` or `max_elapsed_ms` the sequence never ends, so an
/// open retries until it succeeds or is cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub strategy: BackoffStrategy,
    /// Constant interval, or the first exponential delay, in milliseconds.
    pub interval_ms: u64,
    /// Upper bound for exponential delays, in milliseconds.
    pub max_delay_ms: u64,
    /// Optional cap on the number of retries per open.
    pub max_retries: Option<u32>,
    /// Optional time budget per open, in milliseconds.
    pub max_elapsed_ms: Option<u64>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::Constant,
            interval_ms: backoff::DEFAULT_INTERVAL.as_millis() as u64,
            max_delay_ms: 30_000,
            max_retries: None,
            max_elapsed_ms: None,
        }
    }
}

impl BackoffConfig {
    /// Build one backoff sequence from these settings.
    pub fn build(&self) -> Box<dyn Backoff> {
        let interval = Duration::from_millis(self.interval_ms);
        let base: Box<dyn Backoff> = match self.strategy {
            BackoffStrategy::Constant => Box::new(Constant::new(interval)),
            BackoffStrategy::Exponential => Box::new(Exponential::new(
                interval,
                Duration::from_millis(self.max_delay_ms.max(self.interval_ms)),
            )),
        };
        let base: Box<dyn Backoff> = match self.max_retries {
            Some(n) => Box::new(base.max_retries(n)),
            None => base,
        };
        match self.max_elapsed_ms {
            Some(ms) => Box::new(base.max_elapsed(Duration::from_millis(ms))),
            None => base,
        }
    }

    pub fn factory(&self) -> BackoffFactory {
        let cfg = self.clone();
        std::sync::Arc::new(move || cfg.build())
    }
}

/// Global configuration loaded from `~/.config/safeopen/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafeOpenConfig {
    /// Retry backoff; if missing, constant 100ms forever.
    #[serde(default)]
    pub backoff: BackoffConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("safeopen")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SafeOpenConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SafeOpenConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<SafeOpenConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: SafeOpenConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
