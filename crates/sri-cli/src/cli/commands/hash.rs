//! `sri hash` – print the integrity value of a file.

use anyhow::{Context, Result};
use sri_core::digest::Algorithm;
use sri_core::runner::{DigestRunner, InProcessRunner};
use std::path::Path;

pub async fn run_hash(path: &Path, algorithm: Algorithm) -> Result<()> {
    let result = InProcessRunner
        .run(path.to_path_buf(), algorithm)
        .await
        .with_context(|| format!("hash {}", path.display()))?;
    println!("{}", result);
    Ok(())
}
