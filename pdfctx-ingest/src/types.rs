use std::fmt;
use std::path::PathBuf;

use pdfctx_core::RawTableRow;
use serde::{Deserialize, Serialize};

/// Strategy used to rebuild a table grid from page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Columns are the character ranges separated by gaps shared by every line.
    Aligned,
    /// Every line is split on runs of two or more blanks.
    Stream,
}

impl ExtractionMethod {
    /// Tried in this order; the earlier one wins a tie.
    pub const ALL: [ExtractionMethod; 2] = [ExtractionMethod::Aligned, ExtractionMethod::Stream];
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Aligned => f.write_str("aligned"),
            ExtractionMethod::Stream => f.write_str("stream"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// 1-based page number.
    pub page: usize,
    pub rows: Vec<RawTableRow>,
}

impl RawTable {
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// Tables found in one document and the strategy that found them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTables {
    pub tables: Vec<RawTable>,
    pub method: Option<ExtractionMethod>,
}

impl ExtractedTables {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }

    /// All rows of all tables, concatenated in page order.
    pub fn rows(&self) -> impl Iterator<Item = &RawTableRow> {
        self.tables.iter().flat_map(|t| t.rows.iter())
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub path: PathBuf,
    /// Full document text, pages separated by form feeds when known.
    pub text: String,
    pub tables: ExtractedTables,
}
