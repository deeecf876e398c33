use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use clap::Args;
use pdfctx_core::{LocaleCode, LocaleDetector, RawTableRow, TransactionRecord};
use pdfctx_ingest::output::{render_markdown, transaction_rows, write_table_csv, write_transactions_csv};
use pdfctx_ingest::parsers::{ParserKind, parse_bank_statement};
use pdfctx_ingest::{ExtractedDocument, extract_document};
use regex::Regex;
use walkdir::WalkDir;

use crate::config::{Config, OutputFormat};

/// Extracts tables from a PDF file, or every matching PDF in a directory.
#[derive(Args, Debug)]
pub struct Command {
    /// PDF file or directory of PDF files.
    input: PathBuf,

    /// Output directory. Defaults to the config's output directory, else
    /// `extracted/` next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (defaults to the config's output format).
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// File name pattern for directory input (`*` and `?` wildcards).
    #[arg(short, long, default_value = "*.pdf")]
    pattern: String,

    /// Descend into subdirectories.
    #[arg(short, long)]
    recursive: bool,

    /// Post-extraction parser: raw or bank-statement.
    #[arg(long, default_value_t = ParserKind::Raw)]
    parser: ParserKind,

    /// Locale code, skipping detection.
    #[arg(long)]
    locale: Option<String>,

    /// Only use the explicit or default locale.
    #[arg(long)]
    no_auto_detect: bool,

    /// Suppress progress output.
    #[arg(short, long)]
    quiet: bool,
}

/// Settings for one run, with command line flags applied over the config.
#[derive(Debug)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub parser: ParserKind,
    pub detector: LocaleDetector,
    pub explicit_locale: Option<LocaleCode>,
    pub auto_detect: bool,
    pub quiet: bool,
}

impl Settings {
    pub fn resolve(cmd: &Command, cfg: &Config) -> Result<Self> {
        let explicit_locale = match cmd.locale.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(code.parse::<LocaleCode>()?),
            _ => None,
        };
        let output_dir = cmd
            .output
            .clone()
            .or_else(|| cfg.output.directory.clone())
            .unwrap_or_else(|| default_output_dir(&cmd.input));

        Ok(Self {
            output_dir,
            format: cmd.format.unwrap_or(cfg.output.format),
            parser: cmd.parser,
            detector: cfg.locale.detector()?,
            explicit_locale,
            auto_detect: cfg.locale.auto_detect && !cmd.no_auto_detect,
            quiet: cmd.quiet,
        })
    }

    fn progress(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", msg.as_ref());
        }
    }
}

/// `extracted/` beside the input file or directory.
pub fn default_output_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("extracted")
}

/// Runs the subcommand.
pub fn run(cmd: &Command, cfg: &Config) -> Result<()> {
    if !cmd.input.exists() {
        bail!("{} does not exist", cmd.input.display());
    }
    let settings = Settings::resolve(cmd, cfg)?;
    let extracted_at = chrono::Local::now().naive_local();

    if cmd.input.is_file() {
        process_file(&cmd.input, &settings, extracted_at)?;
        return Ok(());
    }

    let pattern = FilePattern::new(&cmd.pattern)?;
    let files = collect_inputs(&cmd.input, &pattern, cmd.recursive)?;
    let summary = process_batch(&files, &settings, extracted_at);
    if summary.processed + summary.failed == 0 {
        settings.progress(format!(
            "No files matching {} found in {}",
            cmd.pattern,
            cmd.input.display()
        ));
        return Ok(());
    }
    settings.progress(format!(
        "Done: {} processed, {} failed",
        summary.processed, summary.failed
    ));
    if summary.failed > 0 {
        bail!("{} of {} files failed", summary.failed, files.len());
    }
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Process each file in turn. A failing file is logged and counted.
pub fn process_batch(files: &[PathBuf], settings: &Settings, extracted_at: NaiveDateTime) -> BatchSummary {
    let mut summary = BatchSummary::default();
    if !files.is_empty() {
        settings.progress(format!("Found {} PDF files", files.len()));
    }
    for path in files {
        match process_file(path, settings, extracted_at) {
            Ok(_) => summary.processed += 1,
            Err(e) => {
                log::error!("{}: {e:#}", path.display());
                summary.failed += 1;
            }
        }
    }
    summary
}

enum Extracted {
    Grid(Vec<RawTableRow>),
    Transactions(Vec<TransactionRecord>),
}

/// Extract one PDF and write its outputs. Returns the paths written.
pub fn process_file(path: &Path, settings: &Settings, extracted_at: NaiveDateTime) -> Result<Vec<PathBuf>> {
    settings.progress(format!("Processing: {}", path.display()));
    let doc = extract_document(path)?;

    let extracted = match settings.parser {
        ParserKind::Raw => {
            if doc.tables.is_empty() {
                log::warn!("{}: no tables found, nothing written", path.display());
                return Ok(Vec::new());
            }
            Extracted::Grid(doc.tables.rows().cloned().collect())
        }
        ParserKind::BankStatement => Extracted::Transactions(parse_document(&doc, settings)),
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .context("input has no file name")?;
    let written = write_outputs(&extracted, &stem, settings, extracted_at)?;
    if let Some(name) = path.file_name() {
        settings.progress(format!("  Processed: {}", name.to_string_lossy()));
    }
    Ok(written)
}

fn parse_document(doc: &ExtractedDocument, settings: &Settings) -> Vec<TransactionRecord> {
    let filename = doc
        .path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let detection = settings.detector.detect(
        &filename,
        Some(&doc.text),
        settings.explicit_locale,
        settings.auto_detect,
    );
    log::info!("{}: locale {detection}", doc.path.display());

    let records = parse_bank_statement(&doc.tables, detection.locale.config());
    log::info!("{}: {} transactions", doc.path.display(), records.len());
    records
}

fn write_outputs(
    extracted: &Extracted,
    stem: &str,
    settings: &Settings,
    extracted_at: NaiveDateTime,
) -> Result<Vec<PathBuf>> {
    let dir = &settings.output_dir;
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut written = Vec::new();

    if settings.format.writes_csv() {
        let p = dir.join(format!("{stem}.csv"));
        let f = fs::File::create(&p).with_context(|| format!("create {}", p.display()))?;
        let result = match extracted {
            Extracted::Grid(rows) => write_table_csv(f, rows),
            Extracted::Transactions(records) => write_transactions_csv(f, records),
        };
        result.with_context(|| format!("write {}", p.display()))?;
        written.push(p);
    }

    if settings.format.writes_markdown() {
        let p = dir.join(format!("{stem}.md"));
        let md = match extracted {
            Extracted::Grid(rows) => render_markdown(stem, rows, extracted_at),
            Extracted::Transactions(records) => {
                render_markdown(stem, &transaction_rows(records), extracted_at)
            }
        };
        fs::write(&p, md).with_context(|| format!("write {}", p.display()))?;
        written.push(p);
    }

    Ok(written)
}

/// Shell-style file name pattern supporting `*` and `?`.
#[derive(Debug)]
pub struct FilePattern(Regex);

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut re = String::from("^");
        for c in pattern.chars() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                c => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }
        re.push('$');
        let re = Regex::new(&re).with_context(|| format!("invalid pattern {pattern:?}"))?;
        Ok(Self(re))
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.0.is_match(file_name)
    }
}

/// Files under `dir` whose names match `pattern`, sorted by path.
pub fn collect_inputs(dir: &Path, pattern: &FilePattern, recursive: bool) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        if entry.file_type().is_file() && pattern.matches(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
