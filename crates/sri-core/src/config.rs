use crate::digest::Algorithm;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Global configuration loaded from `~/.config/sri/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SriConfig {
    /// Digest algorithm for integrity values: "sha256" (default) or "sha512".
    pub algorithm: Algorithm,
    /// Seconds to wait for a dispatched digest before giving up on it.
    pub dispatch_timeout_secs: u64,
}

impl Default for SriConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha256,
            dispatch_timeout_secs: 10,
        }
    }
}

impl SriConfig {
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }

    /// Reject values the controller cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.dispatch_timeout_secs == 0 {
            bail!("dispatch_timeout_secs must be at least 1");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sri")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SriConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<SriConfig> {
    if !path.exists() {
        let default_cfg = SriConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SriConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate().with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Live configuration the controller reads on every request.
pub trait ConfigStore: Send + Sync + 'static {
    fn algorithm(&self) -> Algorithm;
    fn dispatch_timeout(&self) -> Duration;
}

/// In-memory config shared between the host (which may change it) and the controller.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<SriConfig>>,
}

impl SharedConfig {
    pub fn new(cfg: SriConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cfg)),
        }
    }

    pub fn set_algorithm(&self, algorithm: Algorithm) {
        self.write().algorithm = algorithm;
        tracing::debug!(%algorithm, "algorithm changed");
    }

    pub fn snapshot(&self) -> SriConfig {
        self.read().clone()
    }

    // A poisoned lock still holds a valid config; keep serving it.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, SriConfig> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SriConfig> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl ConfigStore for SharedConfig {
    fn algorithm(&self) -> Algorithm {
        self.read().algorithm
    }

    fn dispatch_timeout(&self) -> Duration {
        self.read().dispatch_timeout()
    }
}
