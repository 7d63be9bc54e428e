//! `sri config` – show where the config lives and what it says.

use anyhow::Result;
use sri_core::config::{self, SriConfig};

pub fn run_config(cfg: &SriConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
