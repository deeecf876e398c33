//! Locale-aware date normalization.

use chrono::NaiveDate;

use crate::error::DateParseError;
use crate::locale::LocaleConfig;

/// Parse a date token using `locale`'s layouts in declaration order.
///
/// The first layout matching the whole token decides the field order;
/// later layouts are not consulted even if the date it yields is invalid.
pub fn parse_date(raw: &str, locale: &LocaleConfig) -> Result<NaiveDate, DateParseError> {
    let caps = locale
        .date_patterns
        .iter()
        .find_map(|p| p.full_captures(raw))
        .ok_or_else(|| DateParseError::NoMatch { raw: raw.to_string() })?;

    let month_text = &caps["month"];
    let month = match month_text.parse::<u32>() {
        Ok(m) => m,
        Err(_) => locale.month_number(month_text).ok_or_else(|| DateParseError::UnknownMonth {
            raw: raw.to_string(),
            month: month_text.to_string(),
        })?,
    };
    // Both are bounded digit runs, so these parses only fail on overflow.
    let day: u32 = caps["day"].parse().unwrap_or(0);
    let year: i32 = caps["year"].parse().unwrap_or(0);

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DateParseError::OutOfRange {
        raw: raw.to_string(),
        year,
        month,
        day,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleCode;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_french_layouts() {
        let fr = LocaleCode::Fr.config();
        assert_eq!(parse_date("15/01/2024", fr).unwrap(), ymd(2024, 1, 15));
        assert_eq!(parse_date(" 3.2.2023 ", fr).unwrap(), ymd(2023, 2, 3));
        assert_eq!(parse_date("1er août 2022", fr).unwrap(), ymd(2022, 8, 1));
        assert_eq!(parse_date("12 Décembre 2021", fr).unwrap(), ymd(2021, 12, 12));
    }

    #[test]
    fn test_german_layouts() {
        let de = LocaleCode::De.config();
        assert_eq!(parse_date("31.12.2023", de).unwrap(), ymd(2023, 12, 31));
        assert_eq!(parse_date("5. März 2024", de).unwrap(), ymd(2024, 3, 5));
        assert_eq!(parse_date("5 Maerz 2024", de).unwrap(), ymd(2024, 3, 5));
    }

    #[test]
    fn test_english_field_order_is_fixed_per_layout() {
        let en = LocaleCode::En.config();
        assert_eq!(parse_date("01/15/2024", en).unwrap(), ymd(2024, 1, 15));
        assert_eq!(parse_date("2024-01-15", en).unwrap(), ymd(2024, 1, 15));
        assert_eq!(parse_date("15 January 2024", en).unwrap(), ymd(2024, 1, 15));
        assert_eq!(parse_date("Sept 3, 2024", en).unwrap(), ymd(2024, 9, 3));

        // Day-first text is not reinterpreted under the month-first layout.
        assert!(matches!(
            parse_date("15/01/2024", en),
            Err(DateParseError::OutOfRange { month: 15, day: 1, .. })
        ));
    }

    #[test]
    fn test_february_bounds_in_every_locale() {
        for code in LocaleCode::ALL {
            let cfg = code.config();
            let (leap, common, thirtieth) = match code {
                LocaleCode::En => ("02/29/2024", "02/29/2023", "02/30/2024"),
                LocaleCode::De => ("29.02.2024", "29.02.2023", "30.02.2024"),
                LocaleCode::Fr => ("29/02/2024", "29/02/2023", "30/02/2024"),
            };
            assert_eq!(parse_date(leap, cfg).unwrap(), ymd(2024, 2, 29), "{code}");
            assert!(matches!(parse_date(common, cfg), Err(DateParseError::OutOfRange { .. })));
            assert!(matches!(parse_date(thirtieth, cfg), Err(DateParseError::OutOfRange { .. })));
        }
        let fr = LocaleCode::Fr.config();
        assert_eq!(parse_date("29/02/2000", fr).unwrap(), ymd(2000, 2, 29));
        assert!(parse_date("29/02/1900", fr).is_err());
    }

    #[test]
    fn test_rejects_bad_months_and_non_dates() {
        let fr = LocaleCode::Fr.config();
        assert!(matches!(
            parse_date("10/13/2024", fr),
            Err(DateParseError::OutOfRange { month: 13, .. })
        ));
        assert!(matches!(
            parse_date("Virement reçu", fr),
            Err(DateParseError::NoMatch { .. })
        ));
        assert!(matches!(
            parse_date("15/01/2024 Virement", fr),
            Err(DateParseError::NoMatch { .. })
        ));
    }
}
