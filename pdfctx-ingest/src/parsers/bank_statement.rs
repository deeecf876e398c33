//! Bank statement parser: every extracted table is read as statement rows
//! under one resolved locale.

use pdfctx_core::{LocaleConfig, TransactionRecord, parse_rows};

use crate::types::ExtractedTables;

/// Transactions of all tables, in page and row order.
///
/// Column roles (debit/credit headers) are learned per table.
pub fn parse_bank_statement(tables: &ExtractedTables, locale: &LocaleConfig) -> Vec<TransactionRecord> {
    let records: Vec<TransactionRecord> = tables
        .tables
        .iter()
        .flat_map(|t| parse_rows(&t.rows, locale))
        .collect();
    log::debug!(
        "{} of {} rows parsed as transactions ({})",
        records.len(),
        tables.row_count(),
        locale.code
    );
    records
}
