//! Statement row parser: raw table rows in, normalized transactions out.
//!
//! Extracted tables are noisy. Headers, carry-over lines, totals and rows
//! whose date or amount cannot be normalized are dropped without error.
//! Output order is source order.

use std::marker::PhantomData;
use std::ops::Range;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::parse_amount;
use crate::date::parse_date;
use crate::error::DateParseError;
use crate::locale::{ColumnKind, LocaleCode, LocaleConfig};

/// One row of text cells as produced by table extraction.
pub type RawTableRow = Vec<String>;

/// Normalized transaction. Credits are positive, debits negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub locale: LocaleCode,
}

/// Column roles learned from the most recent header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ColumnLayout {
    debit: Option<usize>,
    credit: Option<usize>,
    /// Balance/total columns, never read as the transaction amount.
    ignored: Vec<usize>,
}

struct DateToken {
    cell: usize,
    span: Range<usize>,
    parsed: Result<NaiveDate, DateParseError>,
}

/// Lazily parse `rows` under `locale`.
pub fn parse_rows<I, R, S>(rows: I, locale: &LocaleConfig) -> TransactionRows<'_, I::IntoIter, S>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    TransactionRows {
        rows: rows.into_iter(),
        locale,
        layout: None,
        row_index: 0,
        cell_type: PhantomData,
    }
}

/// Iterator returned by [`parse_rows`].
pub struct TransactionRows<'a, I, S> {
    rows: I,
    locale: &'a LocaleConfig,
    layout: Option<ColumnLayout>,
    row_index: usize,
    cell_type: PhantomData<fn() -> S>,
}

impl<I, R, S> Iterator for TransactionRows<'_, I, S>
where
    I: Iterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    type Item = TransactionRecord;

    fn next(&mut self) -> Option<TransactionRecord> {
        while let Some(row) = self.rows.next() {
            self.row_index += 1;
            let cells: Vec<&str> = row.as_ref().iter().map(|c| c.as_ref().trim()).collect();
            if let Some(record) = self.parse_row(&cells) {
                return Some(record);
            }
        }
        None
    }
}

impl<I, S> TransactionRows<'_, I, S> {
    fn parse_row(&mut self, cells: &[&str]) -> Option<TransactionRecord> {
        if cells.iter().all(|c| c.is_empty()) {
            return None;
        }

        let Some(date_token) = self.locate_date(cells) else {
            if let Some(layout) = self.header_layout(cells) {
                log::debug!("row {}: header {:?}", self.row_index, layout);
                self.layout = Some(layout);
            } else {
                log::debug!("row {}: no date, skipped", self.row_index);
            }
            return None;
        };

        let text = cells.join(" ");
        if self.locale.is_skip_text(&text) {
            log::debug!("row {}: summary line {:?}, skipped", self.row_index, text.trim());
            return None;
        }

        let date = match date_token.parsed {
            Ok(d) => d,
            Err(e) => {
                log::debug!("row {}: {e}", self.row_index);
                return None;
            }
        };

        let mut remaining: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        remaining[date_token.cell].replace_range(date_token.span.clone(), " ");

        let Some((amount_cell, amount_span)) = self.locate_amount(&remaining) else {
            log::debug!("row {}: no amount, skipped", self.row_index);
            return None;
        };
        let raw_amount = remaining[amount_cell][amount_span.clone()].to_string();
        let mut amount = match parse_amount(&raw_amount, self.locale) {
            Ok(a) => a,
            Err(e) => {
                log::debug!("row {}: {e}", self.row_index);
                return None;
            }
        };
        remaining[amount_cell].replace_range(amount_span, " ");

        if self.column_kind(amount_cell) == Some(ColumnKind::Debit) && amount > Decimal::ZERO {
            amount = -amount;
        }

        let description = remaining
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.is_ignored(*i))
            .flat_map(|(_, c)| c.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ");

        Some(TransactionRecord {
            date,
            description,
            amount,
            locale: self.locale.code,
        })
    }

    /// First cell that is a whole date token, else the first date found
    /// inside any cell.
    fn locate_date(&self, cells: &[&str]) -> Option<DateToken> {
        let patterns = &self.locale.date_patterns;
        for (i, cell) in cells.iter().enumerate() {
            if patterns.iter().any(|p| p.is_full_match(cell)) {
                return Some(DateToken {
                    cell: i,
                    span: 0..cell.len(),
                    parsed: parse_date(cell, self.locale),
                });
            }
        }
        for (i, cell) in cells.iter().enumerate() {
            if let Some(m) = patterns.iter().find_map(|p| p.find(cell)) {
                return Some(DateToken {
                    cell: i,
                    span: m.range(),
                    parsed: parse_date(m.as_str(), self.locale),
                });
            }
        }
        None
    }

    /// Last cell that is a whole amount token, else the last amount found
    /// inside a cell, scanning right to left.
    fn locate_amount(&self, cells: &[String]) -> Option<(usize, Range<usize>)> {
        let patterns = &self.locale.amount_patterns;
        let candidates = || {
            cells
                .iter()
                .enumerate()
                .rev()
                .filter(|(i, c)| !self.is_ignored(*i) && !c.trim().is_empty())
        };

        for (i, cell) in candidates() {
            if patterns.iter().any(|p| p.is_full_match(cell)) {
                let start = cell.len() - cell.trim_start().len();
                let end = cell.trim_end().len();
                return Some((i, start..end));
            }
        }
        for (i, cell) in candidates() {
            if let Some(m) = patterns.iter().find_map(|p| p.find_last(cell)) {
                return Some((i, m.range()));
            }
        }
        None
    }

    fn header_layout(&self, cells: &[&str]) -> Option<ColumnLayout> {
        let mut layout = ColumnLayout::default();
        for (i, cell) in cells.iter().enumerate() {
            match self.locale.heading_kind(cell) {
                Some(ColumnKind::Debit) => layout.debit = Some(i),
                Some(ColumnKind::Credit) => layout.credit = Some(i),
                None if self.locale.is_skip_text(cell) => layout.ignored.push(i),
                None => {}
            }
        }
        (layout.debit.is_some() && layout.credit.is_some()).then_some(layout)
    }

    fn column_kind(&self, cell: usize) -> Option<ColumnKind> {
        let layout = self.layout.as_ref()?;
        if layout.debit == Some(cell) {
            Some(ColumnKind::Debit)
        } else if layout.credit == Some(cell) {
            Some(ColumnKind::Credit)
        } else {
            None
        }
    }

    fn is_ignored(&self, cell: usize) -> bool {
        self.layout
            .as_ref()
            .is_some_and(|l| l.ignored.contains(&cell))
    }
}
