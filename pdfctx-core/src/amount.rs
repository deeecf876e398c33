//! Locale-aware amount normalization into exact decimals.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::AmountParseError;
use crate::locale::LocaleConfig;

fn currency_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)EUR|USD|GBP|CHF").expect("currency code regex"))
}

/// Parse an amount written in `locale`'s convention.
///
/// Currency symbols/codes and all whitespace are dropped, grouping
/// separators removed, and the locale's decimal separator turned into a
/// period. Text that is already canonical (`-1234.56`) parses to the same
/// value under every locale. A sign may lead or trail.
pub fn parse_amount(raw: &str, locale: &LocaleConfig) -> Result<Decimal, AmountParseError> {
    let stripped: String = currency_code_re()
        .replace_all(raw, "")
        .chars()
        .filter(|c| !matches!(c, '€' | '$' | '£' | '¥') && !c.is_whitespace())
        .collect();

    if stripped.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let ungrouped = remove_grouping(&stripped, locale);
    let canonical = if locale.decimal_separator == '.' {
        ungrouped
    } else {
        ungrouped.replace(locale.decimal_separator, ".")
    };

    to_decimal(&canonical, raw)
}

fn remove_grouping(text: &str, locale: &LocaleConfig) -> String {
    let sep = locale.thousands_separator;
    if sep.is_whitespace() || !text.contains(sep) {
        return text.to_string();
    }
    if text.contains(locale.decimal_separator) || is_grouped_integer(text, sep) {
        return text.replace(sep, "");
    }
    // A lone separator that does not group thousands is left for the
    // validator, e.g. the period of an already canonical amount.
    text.to_string()
}

/// `1,234`, `-12.345.678`: every separator followed by exactly three digits.
/// A lone `.` is read as an already canonical decimal point instead.
fn is_grouped_integer(text: &str, sep: char) -> bool {
    if sep == '.' && text.matches(sep).count() < 2 {
        return false;
    }
    let body = text.trim_start_matches(['+', '-']).trim_end_matches('-');
    let mut groups = body.split(sep);
    let head_ok = groups
        .next()
        .is_some_and(|h| (1..=3).contains(&h.len()) && h.chars().all(|c| c.is_ascii_digit()));
    head_ok && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

fn to_decimal(canonical: &str, raw: &str) -> Result<Decimal, AmountParseError> {
    if canonical
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.')))
    {
        return Err(AmountParseError::InvalidCharacters { raw: raw.to_string() });
    }
    if canonical.matches('.').count() > 1 {
        return Err(AmountParseError::MultipleDecimalPoints { raw: raw.to_string() });
    }

    let malformed = || AmountParseError::Malformed { raw: raw.to_string() };

    let sign_count = canonical.matches(['+', '-']).count();
    let (negative, body) = match sign_count {
        0 => (false, canonical),
        1 => {
            if let Some(rest) = canonical.strip_prefix('-') {
                (true, rest)
            } else if let Some(rest) = canonical.strip_prefix('+') {
                (false, rest)
            } else if let Some(rest) = canonical.strip_suffix('-') {
                (true, rest)
            } else {
                return Err(malformed());
            }
        }
        _ => return Err(malformed()),
    };

    if !body.chars().any(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }

    let body = body.strip_suffix('.').unwrap_or(body);
    let text = match (negative, body.starts_with('.')) {
        (true, true) => format!("-0{body}"),
        (true, false) => format!("-{body}"),
        (false, true) => format!("0{body}"),
        (false, false) => body.to_string(),
    };

    Decimal::from_str(&text).map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleCode;

    fn amount(raw: &str, code: LocaleCode) -> Result<Decimal, AmountParseError> {
        parse_amount(raw, code.config())
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    #[test]
    fn test_french_amounts() {
        assert_eq!(amount("1 234,56", LocaleCode::Fr).unwrap(), dec("1234.56"));
        assert_eq!(amount("1\u{a0}234,56 €", LocaleCode::Fr).unwrap(), dec("1234.56"));
        assert_eq!(amount("1\u{202f}000\u{202f}000,00", LocaleCode::Fr).unwrap(), dec("1000000"));
        assert_eq!(amount("- 12,00 EUR", LocaleCode::Fr).unwrap(), dec("-12.00"));
        assert_eq!(amount("1234,56", LocaleCode::Fr).unwrap(), dec("1234.56"));
    }

    #[test]
    fn test_german_amounts() {
        assert_eq!(amount("1.234,56", LocaleCode::De).unwrap(), dec("1234.56"));
        assert_eq!(amount("12.345.678,90 €", LocaleCode::De).unwrap(), dec("12345678.90"));
        assert_eq!(amount("45,10-", LocaleCode::De).unwrap(), dec("-45.10"));
        assert_eq!(amount("1.234.567", LocaleCode::De).unwrap(), dec("1234567"));
        assert_eq!(amount("1.234", LocaleCode::De).unwrap(), dec("1.234"));
    }

    #[test]
    fn test_english_amounts() {
        assert_eq!(amount("$1,234.56", LocaleCode::En).unwrap(), dec("1234.56"));
        assert_eq!(amount("-1,000,000.00 USD", LocaleCode::En).unwrap(), dec("-1000000"));
        assert_eq!(amount("+15.00", LocaleCode::En).unwrap(), dec("15"));
        assert_eq!(amount("£7.5", LocaleCode::En).unwrap(), dec("7.5"));
        assert_eq!(amount("1,234", LocaleCode::En).unwrap(), dec("1234"));
    }

    #[test]
    fn test_canonical_amounts_are_stable_under_every_locale() {
        for code in LocaleCode::ALL {
            for (canonical, expected) in [
                ("1234.56", "1234.56"),
                ("-0.99", "-0.99"),
                ("42", "42"),
                ("100000.00", "100000"),
                (".5", "0.5"),
                ("1.500", "1.500"),
                ("0.125", "0.125"),
            ] {
                let first = amount(canonical, code).unwrap();
                assert_eq!(first, dec(expected), "{code}: {canonical}");
                let again = amount(&first.to_string(), code).unwrap();
                assert_eq!(first, again, "{code}: {canonical}");
            }
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(amount("  ", LocaleCode::Fr), Err(AmountParseError::Empty));
        assert_eq!(amount("€", LocaleCode::Fr), Err(AmountParseError::Empty));
        assert!(matches!(
            amount("12a,00", LocaleCode::Fr),
            Err(AmountParseError::InvalidCharacters { .. })
        ));
        assert!(matches!(
            amount("1.234.56", LocaleCode::En),
            Err(AmountParseError::MultipleDecimalPoints { .. })
        ));
        // French text with period grouping is not French convention.
        assert!(matches!(
            amount("1.234,56", LocaleCode::Fr),
            Err(AmountParseError::MultipleDecimalPoints { .. })
        ));
        assert!(matches!(
            amount("12,50", LocaleCode::En),
            Err(AmountParseError::InvalidCharacters { .. })
        ));
        assert!(matches!(amount("1-2", LocaleCode::En), Err(AmountParseError::Malformed { .. })));
        assert!(matches!(amount("--1", LocaleCode::En), Err(AmountParseError::Malformed { .. })));
        assert!(matches!(amount("-", LocaleCode::En), Err(AmountParseError::Malformed { .. })));
    }
}
