//! PDF table and text inspection using lopdf
//!
//! This crate provides:
//! - A content stream interpreter producing positioned chars and ruling edges
//! - Word and raw text extraction
//! - Table detection from ruling lines or word alignment
//! - A fixed-format diagnostic report and a JSON dump of the tables found

pub mod document;
pub mod dump;
pub mod encoding;
pub mod font;
pub mod geometry;
pub mod interpreter;
pub mod metrics;
pub mod report;
pub mod tables;
pub mod tounicode;
pub mod words;

pub use document::{PageInfo, PdfDocument};
pub use dump::{write_table_dump, TableDump};
pub use interpreter::{Char, PageContent};
pub use report::{write_report, write_saved_notice, ReportOptions};
pub use tables::{extract_tables, find_tables, Strategy, Table, TableData, TableSettings};
pub use words::{extract_text, extract_words, TextDirection, Word, WordOptions};

use std::path::Path;

/// What to analyse and how.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeOptions {
    /// 1-based page number
    pub page: usize,
    /// Settings for the first table pass
    pub tables: TableSettings,
    /// Settings for the second, line-based table pass
    pub line_tables: TableSettings,
    /// Word grouping for raw text and word positions
    pub words: WordOptions,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            page: 1,
            tables: TableSettings::default(),
            line_tables: TableSettings::lines(),
            words: WordOptions::default(),
        }
    }
}

/// Everything extracted from one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageAnalysis {
    /// Pages in the document
    pub page_count: usize,
    /// The analysed page (1-based)
    pub page_number: usize,
    pub width: f64,
    pub height: f64,
    /// Tables from the first pass
    pub tables: Vec<TableData>,
    /// Tables from the line-based pass
    pub line_tables: Vec<TableData>,
    /// Raw page text
    pub text: String,
    pub words: Vec<Word>,
}

/// Analyse one page of a PDF file
pub fn analyze_pdf<P: AsRef<Path>>(path: P, opts: &AnalyzeOptions) -> Result<PageAnalysis, PdfError> {
    let doc = PdfDocument::open(path)?;
    analyze_document(&doc, opts)
}

/// Analyse one page of a PDF held in memory
pub fn analyze_pdf_mem(buffer: &[u8], opts: &AnalyzeOptions) -> Result<PageAnalysis, PdfError> {
    let doc = PdfDocument::load_mem(buffer)?;
    analyze_document(&doc, opts)
}

/// Analyse one page of an opened document
pub fn analyze_document(doc: &PdfDocument, opts: &AnalyzeOptions) -> Result<PageAnalysis, PdfError> {
    let info = doc.page_info(opts.page)?;
    let content = doc.page_content(&info)?;

    let tables = extract_tables(&content, &opts.tables);
    let line_tables = extract_tables(&content, &opts.line_tables);
    let text = extract_text(&content.chars, &opts.words);
    let words = extract_words(&content.chars, &opts.words);

    log::info!(
        "page {}: {} tables, {} line-strategy tables, {} words",
        info.number,
        tables.len(),
        line_tables.len(),
        words.len()
    );

    Ok(PageAnalysis {
        page_count: doc.page_count(),
        page_number: info.number,
        width: info.width,
        height: info.height,
        tables,
        line_tables,
        text,
        words,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(e: lopdf::Error) -> Self {
        PdfError::Parse(e.to_string())
    }
}
