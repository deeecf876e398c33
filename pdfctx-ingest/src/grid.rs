//! Rebuild table grids from extracted page text.
//!
//! Each strategy in [`ExtractionMethod::ALL`] runs over every page; the one
//! producing the most rows wins. Finding nothing is not an error.

use std::ops::Range;
use std::sync::OnceLock;

use pdfctx_core::RawTableRow;
use regex::Regex;

use crate::types::{ExtractedTables, ExtractionMethod, RawTable};

const MIN_TABLE_ROWS: usize = 2;
const MIN_TABLE_COLUMNS: usize = 2;
/// Blank columns needed to separate two aligned columns. A single blank is
/// just the space between words (or a thousands separator).
const MIN_COLUMN_GAP: usize = 2;

fn cell_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\t|\s{2,}").expect("cell separator regex"))
}

/// Find tables in `text` (pages separated by form feeds).
pub fn tables_from_text(text: &str) -> ExtractedTables {
    let mut best = ExtractedTables::default();

    for method in ExtractionMethod::ALL {
        let tables: Vec<RawTable> = text
            .split('\u{c}')
            .enumerate()
            .flat_map(|(i, page)| {
                let grids = match method {
                    ExtractionMethod::Aligned => aligned_tables(page),
                    ExtractionMethod::Stream => stream_tables(page),
                };
                grids.into_iter().map(move |rows| RawTable { page: i + 1, rows })
            })
            .collect();

        let candidate = ExtractedTables {
            tables,
            method: Some(method),
        };
        log::debug!(
            "{method}: {} tables, {} rows",
            candidate.tables.len(),
            candidate.row_count()
        );
        if candidate.row_count() > best.row_count() {
            best = candidate;
        }
    }

    best
}

fn stream_tables(page: &str) -> Vec<Vec<RawTableRow>> {
    let mut tables = Vec::new();
    let mut current: Vec<RawTableRow> = Vec::new();

    for line in page.lines() {
        let cells: RawTableRow = cell_separator_re()
            .split(line.trim())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if cells.len() >= MIN_TABLE_COLUMNS {
            current.push(cells);
        } else {
            flush(&mut tables, &mut current);
        }
    }
    flush(&mut tables, &mut current);
    tables
}

fn flush(tables: &mut Vec<Vec<RawTableRow>>, current: &mut Vec<RawTableRow>) {
    if current.len() >= MIN_TABLE_ROWS {
        tables.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

fn aligned_tables(page: &str) -> Vec<Vec<RawTableRow>> {
    let mut tables = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in page.lines() {
        if line.trim().is_empty() {
            tables.extend(aligned_block(&block));
            block.clear();
        } else {
            block.push(line);
        }
    }
    tables.extend(aligned_block(&block));
    tables
}

/// Cut a block of consecutive lines at the character columns that are blank
/// on every line.
fn aligned_block(lines: &[&str]) -> Option<Vec<RawTableRow>> {
    if lines.len() < MIN_TABLE_ROWS {
        return None;
    }

    let grid: Vec<Vec<char>> = lines.iter().map(|l| l.trim_end().chars().collect()).collect();
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    let blank: Vec<bool> = (0..width)
        .map(|x| {
            grid.iter()
                .all(|row| row.get(x).is_none_or(|c| c.is_whitespace()))
        })
        .collect();

    let spans = column_spans(&blank);
    if spans.len() < MIN_TABLE_COLUMNS {
        return None;
    }

    let rows: Vec<RawTableRow> = grid
        .iter()
        .map(|row| {
            spans
                .iter()
                .map(|span| {
                    let start = span.start.min(row.len());
                    let end = span.end.min(row.len());
                    row[start..end].iter().collect::<String>().trim().to_string()
                })
                .collect()
        })
        .collect();

    // At least two lines must fill two or more cells.
    let filled = rows
        .iter()
        .filter(|r| r.iter().filter(|c| !c.is_empty()).count() >= MIN_TABLE_COLUMNS)
        .count();
    (filled >= MIN_TABLE_ROWS).then_some(rows)
}

fn column_spans(blank: &[bool]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut gap = 0;

    for (x, is_blank) in blank.iter().enumerate() {
        if *is_blank {
            gap += 1;
            if gap >= MIN_COLUMN_GAP {
                if let Some(s) = start.take() {
                    spans.push(s..x + 1 - gap);
                }
            }
        } else {
            if start.is_none() {
                start = Some(x);
            }
            gap = 0;
        }
    }
    if let Some(s) = start {
        spans.push(s..blank.len() - gap);
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement_text() -> String {
        let line = |a: &str, b: &str, c: &str, d: &str| format!("{a:<12}{b:<24}{c:>10}{d:>12}");
        [
            "RELEVE DE COMPTE".to_string(),
            String::new(),
            line("Date", "Libellé", "Débit", "Crédit"),
            line("03/01/2024", "Prélèvement EDF", "82,10", ""),
            line("05/01/2024", "Virement SALAIRE", "", "2 500,00"),
        ]
        .join("\n")
    }

    #[test]
    fn test_aligned_keeps_empty_cells() {
        let found = tables_from_text(&statement_text());
        assert_eq!(found.method, Some(ExtractionMethod::Aligned));
        assert_eq!(found.tables.len(), 1);

        let rows = &found.tables[0].rows;
        assert_eq!(rows[0], vec!["Date", "Libellé", "Débit", "Crédit"]);
        assert_eq!(rows[1], vec!["03/01/2024", "Prélèvement EDF", "82,10", ""]);
        assert_eq!(rows[2], vec!["05/01/2024", "Virement SALAIRE", "", "2 500,00"]);
    }

    #[test]
    fn test_stream_wins_when_columns_do_not_line_up() {
        let text = "Opérations du mois\n\
                    03/01/2024   Carte BOULANGERIE   -4,20\n\
                    05/01/2024   Virement   +150,00\n";
        let found = tables_from_text(text);
        assert_eq!(found.method, Some(ExtractionMethod::Stream));
        assert_eq!(found.row_count(), 2);
        assert_eq!(found.tables[0].rows[1], vec!["05/01/2024", "Virement", "+150,00"]);
    }

    #[test]
    fn test_no_tables_is_empty_not_error() {
        let found = tables_from_text("Just a letter.\nNothing tabular here.\n");
        assert!(found.is_empty());
        assert_eq!(found.method, None);
        assert!(tables_from_text("").is_empty());
    }

    #[test]
    fn test_pages_are_numbered_from_form_feeds() {
        let text = format!("Cover page\u{c}{}", statement_text());
        let found = tables_from_text(&text);
        assert_eq!(found.tables[0].page, 2);
    }

    #[test]
    fn test_column_spans_ignore_single_blanks() {
        let blank: Vec<bool> = "xx x   xx  x".chars().map(|c| c == ' ').collect();
        assert_eq!(column_spans(&blank), vec![0..4, 7..9, 11..12]);
    }
}
