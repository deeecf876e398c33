use anyhow::{Context, Result};
use clap::ValueEnum;
use pdfctx_core::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_LOCALE, LocaleDetector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{config_path, ensure_pdfctx_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: LocaleSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSection {
    /// Fallback when nothing else identifies the document's locale.
    pub default: String,
    pub auto_detect: bool,
    /// Minimum share of a locale's keywords that must appear in the text.
    pub confidence_threshold: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: OutputFormat,
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Md,
    Both,
}

impl OutputFormat {
    pub fn writes_csv(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }

    pub fn writes_markdown(self) -> bool {
        matches!(self, OutputFormat::Md | OutputFormat::Both)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Md => "md",
            OutputFormat::Both => "both",
        })
    }
}

impl Default for LocaleSection {
    fn default() -> Self {
        Self {
            default: DEFAULT_LOCALE.to_string(),
            auto_detect: true,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl LocaleSection {
    pub fn detector(&self) -> Result<LocaleDetector> {
        let detector = LocaleDetector::new(&self.default)
            .context("invalid [locale] default in config")?;
        Ok(detector.with_threshold(self.confidence_threshold))
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Missing file means built-in defaults.
pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    ensure_pdfctx_home()?;
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
