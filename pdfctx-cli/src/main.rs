use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdfctx_core::list_locales;
use simplelog::LevelFilter;
use std::path::{Path, PathBuf};

mod config;
mod extract;
mod state;

/// Extract tables from bank-statement PDFs as CSV or Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "pdfctx",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PDFCTX_BUILD_SHA"), ")")
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Logging level.
    #[arg(long, global = true, default_value = "Warn")]
    log_level: LevelFilter,
}

#[derive(Subcommand, Debug)]
enum Command {
    Extract(extract::Command),

    /// List supported locales
    Locales,

    /// Show which locale a statement resolves to, and how
    Detect {
        /// PDF to inspect
        file: PathBuf,

        /// Locale code, skipping detection
        #[arg(long)]
        locale: Option<String>,

        /// Only use the explicit or default locale
        #[arg(long)]
        no_auto_detect: bool,
    },

    /// Write a default ~/.pdfctx/config.toml if none exists
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    simplelog::SimpleLogger::init(cli.log_level, simplelog::Config::default())
        .context("configuring logging")?;

    match &cli.command {
        Command::Extract(cmd) => {
            let cfg = config::load_config()?;
            extract::run(cmd, &cfg)?;
        }

        Command::Locales => {
            for l in list_locales() {
                println!("{}  {}", l.code, l.name);
            }
        }

        Command::Detect {
            file,
            locale,
            no_auto_detect,
        } => {
            let cfg = config::load_config()?;
            detect(&cfg, file, locale.as_deref(), !no_auto_detect)?;
        }

        Command::Init => {
            config::init_config()?;
        }
    }

    Ok(())
}

fn detect(cfg: &config::Config, file: &Path, locale: Option<&str>, auto_detect: bool) -> Result<()> {
    let detector = cfg.locale.detector()?;
    let auto_detect = auto_detect && cfg.locale.auto_detect;

    // Content is only needed when the file name is not enough.
    let text = if auto_detect && locale.is_none() {
        match pdfctx_ingest::extract_text(file) {
            Ok(text) => Some(text),
            Err(e) => {
                log::warn!("{e:#}; detecting from the file name only");
                None
            }
        }
    } else {
        None
    };

    let filename = file
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", file.display()))?;

    if let Some(text) = &text {
        for s in detector.score_content(text) {
            log::info!("{}: {}/{} keywords ({:.2})", s.locale, s.matched, s.total, s.score);
        }
    }

    let result = detector.resolve(&filename, text.as_deref(), locale, auto_detect)?;
    println!("{result}");
    Ok(())
}
