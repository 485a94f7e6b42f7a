//! Integration tests for the pdf-probe library and CLI

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_probe::{
    analyze_pdf, analyze_pdf_mem, write_report, write_table_dump, AnalyzeOptions, PdfDocument,
    PdfError, ReportOptions, Strategy, TableData, TableSettings,
};
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

// ============================================================================
// Fixture builders
// ============================================================================

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

fn line(x0: i64, y0: i64, x1: i64, y1: i64) -> Vec<Operation> {
    vec![
        op("m", vec![x0.into(), y0.into()]),
        op("l", vec![x1.into(), y1.into()]),
        op("S", vec![]),
    ]
}

fn text(s: &str, x: i64, y: i64) -> Vec<Operation> {
    vec![
        op("BT", vec![]),
        op("Tf", vec!["F1".into(), 12.into()]),
        op("Td", vec![x.into(), y.into()]),
        op("Tj", vec![Object::string_literal(s)]),
        op("ET", vec![]),
    ]
}

/// A ruled 2x3 grid with header `A B C` and data row `1 2 3`.
fn grid_page() -> Vec<Operation> {
    let mut ops = Vec::new();
    for y in [700, 680, 660] {
        ops.extend(line(100, y, 400, y));
    }
    for x in [100, 200, 300, 400] {
        ops.extend(line(x, 660, x, 700));
    }
    for (s, x) in [("A", 110), ("B", 210), ("C", 310)] {
        ops.extend(text(s, x, 685));
    }
    for (s, x) in [("1", 110), ("2", 210), ("3", 310)] {
        ops.extend(text(s, x, 665));
    }
    ops
}

fn prose_page() -> Vec<Operation> {
    let mut ops = text("Hello", 72, 700);
    ops.extend(text("world", 120, 700));
    ops
}

/// Build a PDF with one page per operation list, Helvetica as /F1.
fn build_pdf(pages: Vec<Vec<Operation>>, compress: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for operations in pages {
        let data = Content { operations }.encode().unwrap();
        let stream = if compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&data).unwrap();
            Stream::new(
                dictionary! { "Filter" => "FlateDecode" },
                encoder.finish().unwrap(),
            )
        } else {
            Stream::new(dictionary! {}, data)
        };
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn cells(row: &[&str]) -> Vec<Option<String>> {
    row.iter().map(|c| Some(c.to_string())).collect()
}

fn expected_grid() -> TableData {
    vec![cells(&["A", "B", "C"]), cells(&["1", "2", "3"])]
}

// ============================================================================
// Loader
// ============================================================================

#[test]
fn test_page_count_and_size() {
    let bytes = build_pdf(vec![grid_page(), prose_page(), prose_page()], false);
    let doc = PdfDocument::load_mem(&bytes).unwrap();
    assert_eq!(doc.page_count(), 3);

    let info = doc.page_info(2).unwrap();
    assert_eq!((info.width, info.height), (612.0, 792.0));
    assert_eq!(info.doctop_offset, 792.0);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let result = analyze_pdf(dir.path().join("missing.pdf"), &AnalyzeOptions::default());
    assert!(matches!(result, Err(PdfError::Io(_))));
}

#[test]
fn test_not_a_pdf() {
    let result = analyze_pdf_mem(b"definitely not a pdf", &AnalyzeOptions::default());
    assert!(result.is_err());
}

#[test]
fn test_page_out_of_range() {
    let bytes = build_pdf(vec![prose_page()], false);
    let opts = AnalyzeOptions {
        page: 2,
        ..AnalyzeOptions::default()
    };
    match analyze_pdf_mem(&bytes, &opts) {
        Err(PdfError::PageOutOfRange { page, page_count }) => {
            assert_eq!((page, page_count), (2, 1));
        }
        other => panic!("expected PageOutOfRange, got {:?}", other),
    }
}

// ============================================================================
// Extraction
// ============================================================================

#[test]
fn test_grid_tables_both_passes() {
    let bytes = build_pdf(vec![grid_page()], false);
    let analysis = analyze_pdf_mem(&bytes, &AnalyzeOptions::default()).unwrap();

    assert_eq!(analysis.page_count, 1);
    assert_eq!(analysis.tables, vec![expected_grid()]);
    assert_eq!(analysis.line_tables, analysis.tables);
    assert_eq!(analysis.text, "A B C\n1 2 3");

    let words: Vec<_> = analysis.words.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(words, vec!["A", "B", "C", "1", "2", "3"]);
    assert_eq!(analysis.words[0].x0, 110.0);
    assert_eq!(analysis.words[0].top, 95.0);
}

#[test]
fn test_compressed_content_stream() {
    let bytes = build_pdf(vec![grid_page()], true);
    let analysis = analyze_pdf_mem(&bytes, &AnalyzeOptions::default()).unwrap();
    assert_eq!(analysis.tables, vec![expected_grid()]);
}

#[test]
fn test_prose_page_has_no_tables() {
    let bytes = build_pdf(vec![grid_page(), prose_page()], false);
    let opts = AnalyzeOptions {
        page: 2,
        ..AnalyzeOptions::default()
    };
    let analysis = analyze_pdf_mem(&bytes, &opts).unwrap();
    assert!(analysis.tables.is_empty());
    assert_eq!(analysis.text, "Hello world");
    // doctop counts the height of page 1
    assert_eq!(analysis.words[0].doctop, analysis.words[0].top + 792.0);
}

#[test]
fn test_alternate_strategy_pass() {
    let bytes = build_pdf(vec![grid_page()], false);
    let opts = AnalyzeOptions {
        line_tables: TableSettings::with_strategies(Strategy::Text, Strategy::Lines),
        ..AnalyzeOptions::default()
    };
    let analysis = analyze_pdf_mem(&bytes, &opts).unwrap();
    // First pass is unaffected by the alternate settings
    assert_eq!(analysis.tables, vec![expected_grid()]);
}

// ============================================================================
// Report and dump
// ============================================================================

#[test]
fn test_report_for_grid() {
    let bytes = build_pdf(vec![grid_page()], false);
    let analysis = analyze_pdf_mem(&bytes, &AnalyzeOptions::default()).unwrap();

    let mut buf = Vec::new();
    write_report(&mut buf, &analysis, &ReportOptions::default()).unwrap();
    let report = String::from_utf8(buf).unwrap();

    assert!(report.contains("Total pages: 1\n"));
    assert!(report.contains("First page size: 612.0 x 792.0\n"));
    assert!(report.contains("  Rows: 2\n  Columns: 3\n"));
    assert!(report.contains("  Headers: ['A', 'B', 'C']\n"));
    assert!(report.contains("  First data row: ['1', '2', '3']\n"));
    assert!(report.contains("Table 1 (with lines strategy):\n  Rows: 2\n"));
    assert!(report.contains("  Sample row 1: ['1', '2', '3']\n"));
    assert!(report.contains("0: x=110.0 y=95.0 text='A'\n"));
    assert!(report.contains("5: x=310.0 y=115.0 text='3'\n"));
}

#[test]
fn test_dump_round_trip() {
    let bytes = build_pdf(vec![grid_page()], false);
    let analysis = analyze_pdf_mem(&bytes, &AnalyzeOptions::default()).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("tables.json");
    assert!(write_table_dump(&path, &analysis, 50).unwrap());

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["page_count"], 1);
    let tables: Vec<TableData> = serde_json::from_value(value["tables"].clone()).unwrap();
    assert_eq!(tables, analysis.tables);
    assert_eq!(value["sample_words"].as_array().unwrap().len(), 6);
    assert_eq!(value["sample_words"][0]["x0"], 110.0);
}

#[test]
fn test_no_tables_no_dump() {
    let bytes = build_pdf(vec![prose_page()], false);
    let analysis = analyze_pdf_mem(&bytes, &AnalyzeOptions::default()).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("tables.json");
    assert!(!write_table_dump(&path, &analysis, 50).unwrap());
    assert!(!path.exists());
}

// ============================================================================
// CLI
// ============================================================================

#[test]
fn test_cli_end_to_end() {
    let dir = tempdir().unwrap();
    let pdf = dir.path().join("grid.pdf");
    let json = dir.path().join("out.json");
    std::fs::write(&pdf, build_pdf(vec![grid_page()], false)).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_analyze_pdf"))
        .arg(&pdf)
        .arg("--output")
        .arg(&json)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with(&"=".repeat(80)));
    assert!(stdout.contains("  Headers: ['A', 'B', 'C']\n"));
    assert!(stdout.ends_with(&format!("\n\nFull table data saved to: {}\n", json.display())));
    assert!(json.exists());
}

#[test]
fn test_cli_fails_on_missing_file() {
    let dir = tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_analyze_pdf"))
        .arg(dir.path().join("missing.pdf"))
        .arg("--output")
        .arg(dir.path().join("out.json"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!dir.path().join("out.json").exists());
}
