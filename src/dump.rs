//! JSON dump of the extracted tables and a word sample.

use crate::tables::TableData;
use crate::words::Word;
use crate::{PageAnalysis, PdfError};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// On-disk record.
#[derive(Debug, Serialize)]
pub struct TableDump<'a> {
    pub page_count: usize,
    pub tables: &'a [TableData],
    pub sample_words: &'a [Word],
}

impl<'a> TableDump<'a> {
    pub fn new(analysis: &'a PageAnalysis, sample_words: usize) -> Self {
        let n = sample_words.min(analysis.words.len());
        Self {
            page_count: analysis.page_count,
            tables: &analysis.tables,
            sample_words: &analysis.words[..n],
        }
    }
}

/// Write the first-pass tables to `path` as pretty JSON.
///
/// Nothing is written when no tables were found; the return value tells
/// whether the file was written. An existing file is overwritten.
pub fn write_table_dump(
    path: &Path,
    analysis: &PageAnalysis,
    sample_words: usize,
) -> Result<bool, PdfError> {
    if analysis.tables.is_empty() {
        log::info!("no tables found, skipping {}", path.display());
        return Ok(false);
    }

    let dump = TableDump::new(analysis, sample_words);
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &dump)?;
    writer.flush()?;

    log::debug!("wrote {} tables to {}", analysis.tables.len(), path.display());
    Ok(true)
}
