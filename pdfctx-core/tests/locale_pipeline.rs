use chrono::NaiveDate;
use pdfctx_core::{
    DetectionMethod, LocaleCode, get_locale, list_locales, parse_amount, parse_statement,
    resolve_locale,
};
use rust_decimal::Decimal;

const GERMAN_STATEMENT: &str = "Kontoauszug Nr. 3 Datum Buchung Betrag Saldo \
    Überweisung Lastschrift Rechnung Januar Februar März April Juni";
const FRENCH_STATEMENT: &str = "Relevé de compte. Date Opération Montant Débit Crédit Solde \
    Virement Prélèvement Facture janvier février mars avril";

#[test_log::test]
fn test_explicit_locale_overrides_filename_and_content() {
    let r = resolve_locale("releve_fr.pdf", Some(FRENCH_STATEMENT), Some("de"), true).unwrap();
    assert_eq!(r.locale, LocaleCode::De);
    assert_eq!(r.method, DetectionMethod::Explicit);
}

#[test_log::test]
fn test_filename_marker_beats_german_content() {
    let r = resolve_locale("releve_fr.pdf", Some(GERMAN_STATEMENT), None, true).unwrap();
    assert_eq!(r.locale, LocaleCode::Fr);
    assert_eq!(r.method, DetectionMethod::Filename);
}

#[test_log::test]
fn test_content_then_default() {
    let r = resolve_locale("export-0042.pdf", Some(GERMAN_STATEMENT), None, true).unwrap();
    assert_eq!(r.locale, LocaleCode::De);
    assert_eq!(r.method, DetectionMethod::Content);

    let r = resolve_locale("export-0042.pdf", Some("Seite 1 von 2"), None, true).unwrap();
    assert_eq!((r.locale, r.method), (LocaleCode::Fr, DetectionMethod::Default));
}

#[test]
fn test_unknown_explicit_locale_is_a_caller_error() {
    let err = resolve_locale("a.pdf", None, Some("pt"), true).unwrap_err();
    assert_eq!(err.code, "pt");
}

#[test]
fn test_list_locales_is_stable() {
    let pairs: Vec<_> = list_locales().iter().map(|l| (l.code.as_str(), l.name)).collect();
    assert_eq!(pairs, vec![("fr", "French"), ("de", "German"), ("en", "English")]);
}

#[test]
fn test_amounts_in_native_format_match_their_value() {
    let cases = [
        ("fr", "12 345,67", "12345.67"),
        ("fr", "-0,05", "-0.05"),
        ("de", "12.345,67", "12345.67"),
        ("de", "0,05-", "-0.05"),
        ("en", "12,345.67", "12345.67"),
        ("en", "-$0.05", "-0.05"),
    ];
    for (code, raw, expected) in cases {
        let cfg = get_locale(code).unwrap();
        assert_eq!(
            parse_amount(raw, cfg).unwrap(),
            Decimal::from_str_exact(expected).unwrap(),
            "{code} {raw}"
        );
    }
}

#[test_log::test]
fn test_french_statement_end_to_end() {
    let rows: Vec<Vec<String>> = vec![
        vec!["15/01/2024".into(), "Virement reçu".into(), "1 234,56".into()],
        vec!["Solde".into(), "".into(), "5 000,00".into()],
    ];
    let detection = resolve_locale("releve_fr.pdf", None, None, true).unwrap();
    let cfg = detection.locale.config();

    let records: Vec<_> = parse_statement(&rows, cfg).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(records[0].amount, Decimal::new(123456, 2));
    assert!(records[0].description.contains("Virement reçu"));
}

#[test]
fn test_german_statement_with_soll_haben_columns() {
    let rows = vec![
        vec!["Buchungstag", "Verwendungszweck", "Soll", "Haben"],
        vec!["02.01.2024", "Lastschrift Stadtwerke", "64,20", ""],
        vec!["03.01.2024", "Gutschrift Gehalt", "", "2.850,00"],
        vec!["", "Neuer Kontostand", "", "4.000,00"],
    ];
    let records: Vec<_> = parse_statement(rows, LocaleCode::De.config()).collect();
    let amounts: Vec<_> = records.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![Decimal::new(-6420, 2), Decimal::new(285000, 2)]);
}

#[test]
fn test_records_serialize_with_iso_dates() {
    let rows = vec![vec!["2024-02-29", "Leap day lunch", "18.25"]];
    let record = parse_statement(rows, LocaleCode::En.config()).next().unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["date"], "2024-02-29");
    assert_eq!(json["amount"], "18.25");
    assert_eq!(json["locale"], "en");
}
