//! pdfctx-core: locale resolution and locale-aware parsing of statement tables.
//!
//! Pure functions over text already pulled out of a PDF. Nothing here does I/O.

pub mod amount;
pub mod date;
pub mod detect;
pub mod error;
pub mod locale;
pub mod statement;

pub use amount::parse_amount;
pub use date::parse_date;
pub use detect::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_LOCALE, DetectionMethod, DetectionResult,
    LocaleDetector, LocaleScore,
};
pub use error::{AmountParseError, DateParseError, UnknownLocaleError};
pub use locale::{LocaleCode, LocaleConfig, get_locale, list_locales};
pub use statement::{RawTableRow, TransactionRecord, TransactionRows, parse_rows};

/// Resolve the locale of one document with the default detector
/// (fallback `fr`, threshold [`DEFAULT_CONFIDENCE_THRESHOLD`]).
///
/// Fails only when `explicit_locale` names an unsupported locale.
pub fn resolve_locale(
    filename: &str,
    document_text: Option<&str>,
    explicit_locale: Option<&str>,
    auto_detect: bool,
) -> Result<DetectionResult, UnknownLocaleError> {
    LocaleDetector::default().resolve(filename, document_text, explicit_locale, auto_detect)
}

/// Parse the rows of a statement into transactions, in source order.
pub fn parse_statement<I, R, S>(rows: I, locale: &LocaleConfig) -> TransactionRows<'_, I::IntoIter, S>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    parse_rows(rows, locale)
}
