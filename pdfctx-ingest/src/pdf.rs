//! PDF text extraction wrapper around the `pdf-extract` crate.

use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::grid::tables_from_text;
use crate::types::{ExtractedDocument, ExtractedTables};

/// Full text of the PDF at `path`.
pub fn extract_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| anyhow!("extracting text from {}: {e}", path.display()))
}

/// Tables of the PDF at `path`. A document without tables yields an empty set.
pub fn extract_tables(path: impl AsRef<Path>) -> Result<ExtractedTables> {
    Ok(extract_document(path)?.tables)
}

/// Text and tables in one pass over the file.
pub fn extract_document(path: impl AsRef<Path>) -> Result<ExtractedDocument> {
    let path = path.as_ref();
    let text = extract_text(path)?;
    let tables = tables_from_text(&text);

    match tables.method {
        Some(method) => log::info!(
            "{}: {} rows in {} tables ({method})",
            path.display(),
            tables.row_count(),
            tables.tables.len()
        ),
        None => log::info!("{}: no tables found", path.display()),
    }

    Ok(ExtractedDocument {
        path: path.to_path_buf(),
        text,
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        let err = extract_text("/definitely/not/here.pdf").unwrap_err();
        assert!(err.to_string().contains("here.pdf"));
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("broken.pdf");
        std::fs::write(&p, b"this is not a pdf").unwrap();
        assert!(extract_document(&p).is_err());
    }
}
