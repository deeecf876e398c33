//! Static catalog of supported locales (fr, de, en).
//!
//! Each [`LocaleConfig`] bundles the date layouts, amount layouts,
//! separators and vocabulary used to read one family of statements. The
//! registry is built on first use and lives for the whole process.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Match, Regex};
use serde::{Deserialize, Serialize};

use crate::error::UnknownLocaleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleCode {
    Fr,
    De,
    En,
}

impl LocaleCode {
    /// Registry order. Also the tie-break order for detection.
    pub const ALL: [LocaleCode; 3] = [LocaleCode::Fr, LocaleCode::De, LocaleCode::En];

    pub fn as_str(self) -> &'static str {
        match self {
            LocaleCode::Fr => "fr",
            LocaleCode::De => "de",
            LocaleCode::En => "en",
        }
    }

    pub fn config(self) -> &'static LocaleConfig {
        let idx = match self {
            LocaleCode::Fr => 0,
            LocaleCode::De => 1,
            LocaleCode::En => 2,
        };
        &registry()[idx]
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocaleCode {
    type Err = UnknownLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fr" => Ok(LocaleCode::Fr),
            "de" => Ok(LocaleCode::De),
            "en" => Ok(LocaleCode::En),
            _ => Err(UnknownLocaleError::new(s.trim())),
        }
    }
}

/// Literal marker looked up in a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameMarker {
    /// Matches anywhere in the lowercased file name.
    Substring(&'static str),
    /// Matches only a whole alphanumeric token of the file name.
    Token(&'static str),
}

impl FilenameMarker {
    fn matches(&self, lowered: &str, tokens: &[&str]) -> bool {
        match self {
            FilenameMarker::Substring(s) => lowered.contains(s),
            FilenameMarker::Token(t) => tokens.iter().any(|tok| tok == t),
        }
    }
}

/// A regex layout usable both as a whole-token check and as a locator
/// inside longer text.
#[derive(Debug, Clone)]
pub struct TokenPattern {
    pub layout: &'static str,
    full: Regex,
    search: Regex,
}

impl TokenPattern {
    fn new(layout: &'static str, source: &str) -> Self {
        let full = Regex::new(&format!(r"^\s*(?:{source})\s*$")).expect("full token regex");
        let search = Regex::new(&format!(r"(?:{source})")).expect("search token regex");
        Self { layout, full, search }
    }

    /// Date layouts are bounded by word boundaries when searched, so that a
    /// date is not carved out of a longer digit run.
    fn bounded(layout: &'static str, source: &str) -> Self {
        let full = Regex::new(&format!(r"^\s*(?:{source})\s*$")).expect("full token regex");
        let search = Regex::new(&format!(r"\b(?:{source})\b")).expect("search token regex");
        Self { layout, full, search }
    }

    pub fn is_full_match(&self, text: &str) -> bool {
        self.full.is_match(text)
    }

    pub(crate) fn full_captures<'t>(&self, text: &'t str) -> Option<regex::Captures<'t>> {
        self.full.captures(text)
    }

    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.search.find(text)
    }

    pub fn find_last<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.search.find_iter(text).last()
    }
}

#[derive(Debug, Clone)]
pub struct LocaleConfig {
    pub code: LocaleCode,
    pub name: &'static str,
    /// Tried in order; the first full match is authoritative.
    pub date_patterns: Vec<TokenPattern>,
    pub amount_patterns: Vec<TokenPattern>,
    pub decimal_separator: char,
    /// `' '` stands for any whitespace grouping.
    pub thousands_separator: char,
    /// Lowercase vocabulary used for content detection.
    pub keywords: &'static [&'static str],
    pub filename_markers: &'static [FilenameMarker],
    pub skip_keywords: &'static [&'static str],
    pub debit_headings: &'static [&'static str],
    pub credit_headings: &'static [&'static str],
    months: &'static [(&'static str, u32)],
    skip_re: Regex,
}

impl LocaleConfig {
    /// Month number for a (case-insensitive) month name in this locale.
    pub fn month_number(&self, name: &str) -> Option<u32> {
        let lowered = name.trim().trim_end_matches('.').to_lowercase();
        self.months
            .iter()
            .find(|(m, _)| *m == lowered)
            .map(|(_, n)| *n)
    }

    /// True if the row text names a balance/total/carry-over line.
    pub fn is_skip_text(&self, text: &str) -> bool {
        self.skip_re.is_match(text)
    }

    /// True if any of this locale's markers occurs in the file name.
    pub fn matches_filename(&self, file_name: &str) -> bool {
        let lowered = file_name.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        self.filename_markers
            .iter()
            .any(|m| m.matches(&lowered, &tokens))
    }

    pub fn heading_kind(&self, cell: &str) -> Option<ColumnKind> {
        let norm = normalize_heading(cell);
        if norm.is_empty() {
            return None;
        }
        let hit = |headings: &[&str]| headings.iter().any(|h| *h == norm);
        if hit(self.debit_headings) {
            Some(ColumnKind::Debit)
        } else if hit(self.credit_headings) {
            Some(ColumnKind::Credit)
        } else {
            None
        }
    }
}

/// Role of an amount column as announced by a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Debit,
    Credit,
}

fn normalize_heading(cell: &str) -> String {
    cell.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up a locale by code.
pub fn get_locale(code: &str) -> Result<&'static LocaleConfig, UnknownLocaleError> {
    Ok(code.parse::<LocaleCode>()?.config())
}

/// All locales in registry order (fr, de, en).
pub fn list_locales() -> &'static [LocaleConfig] {
    registry()
}

fn registry() -> &'static [LocaleConfig; 3] {
    static REGISTRY: OnceLock<[LocaleConfig; 3]> = OnceLock::new();
    REGISTRY.get_or_init(|| [french(), german(), english()])
}

const FR_MONTHS: &[(&str, u32)] = &[
    ("janvier", 1),
    ("février", 2),
    ("fevrier", 2),
    ("mars", 3),
    ("avril", 4),
    ("mai", 5),
    ("juin", 6),
    ("juillet", 7),
    ("août", 8),
    ("aout", 8),
    ("septembre", 9),
    ("octobre", 10),
    ("novembre", 11),
    ("décembre", 12),
    ("decembre", 12),
];

const DE_MONTHS: &[(&str, u32)] = &[
    ("januar", 1),
    ("jänner", 1),
    ("februar", 2),
    ("märz", 3),
    ("maerz", 3),
    ("april", 4),
    ("mai", 5),
    ("juni", 6),
    ("juli", 7),
    ("august", 8),
    ("september", 9),
    ("oktober", 10),
    ("november", 11),
    ("dezember", 12),
];

const EN_MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("sept", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// Alternation of month names, longest first so "sept" wins over "sep".
fn month_alternation(months: &[(&str, u32)]) -> String {
    let mut names: Vec<&str> = months.iter().map(|(m, _)| *m).collect();
    names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));
    names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|")
}

fn skip_regex(keywords: &[&str]) -> Regex {
    let alts = keywords
        .iter()
        .map(|k| regex::escape(k).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alts})\b")).expect("skip keyword regex")
}

fn french() -> LocaleConfig {
    let months = month_alternation(FR_MONTHS);
    let skip_keywords: &[&str] = &[
        "solde",
        "sous-total",
        "total des opérations",
        "totaux",
        "report",
    ];
    LocaleConfig {
        code: LocaleCode::Fr,
        name: "French",
        date_patterns: vec![
            TokenPattern::bounded(
                "DD/MM/YYYY",
                r"(?P<day>\d{1,2})/(?P<month>\d{1,2})/(?P<year>\d{4})",
            ),
            TokenPattern::bounded(
                "DD.MM.YYYY",
                r"(?P<day>\d{1,2})\.(?P<month>\d{1,2})\.(?P<year>\d{4})",
            ),
            TokenPattern::bounded(
                "D mois YYYY",
                &format!(r"(?i)(?P<day>\d{{1,2}})(?:er)?\s+(?P<month>{months})\s+(?P<year>\d{{4}})"),
            ),
        ],
        amount_patterns: vec![
            TokenPattern::new(
                "1 234,56",
                r"[+-]?\s?(?:\d{1,3}(?:[ \x{A0}\x{202F}]\d{3})+|\d+),\d{2}(?:\s?(?:€|EUR))?-?",
            ),
            TokenPattern::new(
                "1 234 €",
                r"[+-]?\s?\d{1,3}(?:[ \x{A0}\x{202F}]\d{3})*\s?(?:€|EUR)",
            ),
        ],
        decimal_separator: ',',
        thousands_separator: ' ',
        keywords: &[
            "solde", "crédit", "débit", "virement", "prélèvement", "montant", "date",
            "opération", "facture", "relevé", "janvier", "février", "mars", "avril", "mai",
            "juin", "juillet", "août", "septembre", "octobre", "novembre", "décembre",
        ],
        filename_markers: &[
            FilenameMarker::Substring("_fr"),
            FilenameMarker::Substring("-fr"),
            FilenameMarker::Substring("french"),
            FilenameMarker::Substring("francais"),
            FilenameMarker::Substring("français"),
            FilenameMarker::Substring("france"),
        ],
        skip_keywords,
        debit_headings: &["débit", "debit", "débits"],
        credit_headings: &["crédit", "credit", "crédits"],
        months: FR_MONTHS,
        skip_re: skip_regex(skip_keywords),
    }
}

fn german() -> LocaleConfig {
    let months = month_alternation(DE_MONTHS);
    let skip_keywords: &[&str] = &["saldo", "summe", "übertrag", "kontostand", "gesamt"];
    LocaleConfig {
        code: LocaleCode::De,
        name: "German",
        date_patterns: vec![
            TokenPattern::bounded(
                "DD.MM.YYYY",
                r"(?P<day>\d{1,2})\.(?P<month>\d{1,2})\.(?P<year>\d{4})",
            ),
            TokenPattern::bounded(
                "DD/MM/YYYY",
                r"(?P<day>\d{1,2})/(?P<month>\d{1,2})/(?P<year>\d{4})",
            ),
            TokenPattern::bounded(
                "D. Monat YYYY",
                &format!(r"(?i)(?P<day>\d{{1,2}})\.?\s+(?P<month>{months})\s+(?P<year>\d{{4}})"),
            ),
        ],
        amount_patterns: vec![
            TokenPattern::new(
                "1.234,56",
                r"[+-]?\s?(?:\d{1,3}(?:\.\d{3})+|\d+),\d{2}(?:\s?(?:€|EUR))?-?",
            ),
        ],
        decimal_separator: ',',
        thousands_separator: '.',
        keywords: &[
            "saldo", "kredit", "lastschrift", "überweisung", "betrag", "datum", "buchung",
            "rechnung", "kontoauszug", "januar", "februar", "märz", "april", "mai", "juni",
            "juli", "august", "september", "oktober", "november", "dezember",
        ],
        filename_markers: &[
            FilenameMarker::Substring("_de"),
            FilenameMarker::Substring("-de"),
            FilenameMarker::Substring("german"),
            FilenameMarker::Substring("deutsch"),
            FilenameMarker::Substring("deutschland"),
            FilenameMarker::Substring("germany"),
        ],
        skip_keywords,
        debit_headings: &["soll", "lastschrift", "belastung"],
        credit_headings: &["haben", "gutschrift"],
        months: DE_MONTHS,
        skip_re: skip_regex(skip_keywords),
    }
}

fn english() -> LocaleConfig {
    let months = month_alternation(EN_MONTHS);
    let skip_keywords: &[&str] = &[
        "balance",
        "total",
        "subtotal",
        "brought forward",
        "carried forward",
    ];
    LocaleConfig {
        code: LocaleCode::En,
        name: "English",
        date_patterns: vec![
            TokenPattern::bounded(
                "MM/DD/YYYY",
                r"(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<year>\d{4})",
            ),
            TokenPattern::bounded(
                "YYYY-MM-DD",
                r"(?P<year>\d{4})-(?P<month>\d{1,2})-(?P<day>\d{1,2})",
            ),
            TokenPattern::bounded(
                "D Month YYYY",
                &format!(r"(?i)(?P<day>\d{{1,2}})\s+(?P<month>{months})\.?\s+(?P<year>\d{{4}})"),
            ),
            TokenPattern::bounded(
                "Month D, YYYY",
                &format!(r"(?i)(?P<month>{months})\.?\s+(?P<day>\d{{1,2}}),?\s+(?P<year>\d{{4}})"),
            ),
        ],
        amount_patterns: vec![
            TokenPattern::new(
                "$1,234.56",
                r"[+-]?\s?[$£€]?(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}(?:\s?(?:USD|EUR|GBP))?-?",
            ),
        ],
        decimal_separator: '.',
        thousands_separator: ',',
        keywords: &[
            "balance", "credit", "debit", "transfer", "payment", "amount", "date",
            "transaction", "invoice", "statement", "january", "february", "march", "april",
            "may", "june", "july", "august", "september", "october", "november", "december",
        ],
        filename_markers: &[
            FilenameMarker::Substring("_en"),
            FilenameMarker::Substring("-en"),
            FilenameMarker::Substring("english"),
            FilenameMarker::Token("uk"),
            FilenameMarker::Token("usa"),
            FilenameMarker::Token("us"),
        ],
        skip_keywords,
        debit_headings: &["debit", "debits", "withdrawals", "withdrawal", "paid out"],
        credit_headings: &["credit", "credits", "deposits", "deposit", "paid in"],
        months: EN_MONTHS,
        skip_re: skip_regex(skip_keywords),
    }
}
