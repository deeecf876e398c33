//! CSV and Markdown rendering of extracted grids and parsed transactions.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use pdfctx_core::{RawTableRow, TransactionRecord};

pub const TRANSACTION_HEADERS: [&str; 4] = ["date", "description", "amount", "locale"];

/// Write raw rows as CSV. Rows may have different lengths.
pub fn write_table_csv<W: Write>(out: W, rows: &[RawTableRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(out);
    for row in rows {
        wtr.write_record(row).context("writing CSV row")?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}

/// Write transactions as CSV with an ISO date and a canonical amount column.
pub fn write_transactions_csv<W: Write>(out: W, records: &[TransactionRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(TRANSACTION_HEADERS)
        .context("writing CSV header")?;
    for r in records {
        wtr.write_record(transaction_cells(r))
            .context("writing CSV row")?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}

/// Header row plus one row per transaction, for Markdown rendering.
pub fn transaction_rows(records: &[TransactionRecord]) -> Vec<RawTableRow> {
    let mut rows = vec![TRANSACTION_HEADERS.iter().map(|h| h.to_string()).collect()];
    rows.extend(records.iter().map(|r| transaction_cells(r).to_vec()));
    rows
}

fn transaction_cells(r: &TransactionRecord) -> [String; 4] {
    [
        r.date.format("%Y-%m-%d").to_string(),
        r.description.clone(),
        r.amount.to_string(),
        r.locale.to_string(),
    ]
}

/// Markdown document: heading, pipe table (first row as header), footer
/// with the extraction time.
pub fn render_markdown(title: &str, rows: &[RawTableRow], extracted_at: NaiveDateTime) -> String {
    let mut md = format!("# Extracted from {title}\n\n");

    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    if width == 0 {
        md.push_str("_No table rows extracted._\n");
    } else {
        let cell = |row: &RawTableRow, i: usize| {
            row.get(i)
                .map(|c| escape_cell(c))
                .unwrap_or_default()
        };
        let line = |row: &RawTableRow| {
            let cells: Vec<String> = (0..width).map(|i| cell(row, i)).collect();
            format!("| {} |\n", cells.join(" | "))
        };

        md.push_str(&line(&rows[0]));
        md.push_str(&format!("|{}\n", " --- |".repeat(width)));
        for row in &rows[1..] {
            md.push_str(&line(row));
        }
    }

    md.push_str(&format!(
        "\n---\n*Extracted: {}*\n",
        extracted_at.format("%Y-%m-%d %H:%M:%S")
    ));
    md
}

fn escape_cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', r"\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pdfctx_core::LocaleCode;
    use rust_decimal::Decimal;

    fn record() -> TransactionRecord {
        TransactionRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            description: "Virement reçu, loyer".to_string(),
            amount: Decimal::new(123456, 2),
            locale: LocaleCode::Fr,
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_transactions_csv() {
        let mut buf = Vec::new();
        write_transactions_csv(&mut buf, &[record()]).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(
            s,
            "date,description,amount,locale\n2024-01-15,\"Virement reçu, loyer\",1234.56,fr\n"
        );
    }

    #[test]
    fn test_ragged_table_csv() {
        let rows = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ];
        let mut buf = Vec::new();
        write_table_csv(&mut buf, &rows).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a,b\nc\n");
    }

    #[test]
    fn test_markdown_pads_and_escapes() {
        let rows = vec![
            vec!["Date".to_string(), "Libellé".to_string(), "Montant".to_string()],
            vec!["15/01/2024".to_string(), "A | B".to_string()],
        ];
        let md = render_markdown("releve_fr", &rows, at());
        assert_eq!(
            md,
            "# Extracted from releve_fr\n\n\
             | Date | Libellé | Montant |\n\
             | --- | --- | --- |\n\
             | 15/01/2024 | A \\| B |  |\n\
             \n---\n*Extracted: 2024-02-01 09:30:00*\n"
        );
    }

    #[test]
    fn test_markdown_without_rows() {
        let md = render_markdown("empty", &[], at());
        assert!(md.contains("_No table rows extracted._"));
        assert!(md.ends_with("*Extracted: 2024-02-01 09:30:00*\n"));
    }

    #[test]
    fn test_transaction_rows_start_with_header() {
        let rows = transaction_rows(&[record()]);
        assert_eq!(rows[0], vec!["date", "description", "amount", "locale"]);
        assert_eq!(rows[1][2], "1234.56");
    }
}
