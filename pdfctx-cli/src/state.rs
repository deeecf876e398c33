use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn pdfctx_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".pdfctx"))
}

pub fn ensure_pdfctx_home() -> Result<PathBuf> {
    let dir = pdfctx_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(pdfctx_home()?.join("config.toml"))
}
