//! pdfctx-ingest: PDF text extraction, table grids, and CSV/Markdown output.

pub mod grid;
pub mod output;
pub mod parsers;
pub mod pdf;
pub mod types;

pub use grid::tables_from_text;
pub use pdf::{extract_document, extract_tables, extract_text};
pub use types::{ExtractedDocument, ExtractedTables, ExtractionMethod, RawTable};
