//! Console report for a page analysis.
//!
//! The layout is fixed: banner sections separated by 80-column `=` rules,
//! table rows rendered as list literals such as `['A', None]`.

use crate::PageAnalysis;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;

const RULE_WIDTH: usize = 80;

/// Code points printed escaped: controls, format characters, separators
/// other than the ASCII space, private use and unassigned planes.
const NON_PRINTABLE: &[(u32, u32)] = &[
    (0x0000, 0x001F),
    (0x007F, 0x00A0),
    (0x00AD, 0x00AD),
    (0x0600, 0x0605),
    (0x061C, 0x061C),
    (0x06DD, 0x06DD),
    (0x070F, 0x070F),
    (0x0890, 0x0891),
    (0x08E2, 0x08E2),
    (0x1680, 0x1680),
    (0x180E, 0x180E),
    (0x2000, 0x200F),
    (0x2028, 0x202F),
    (0x205F, 0x206F),
    (0x3000, 0x3000),
    (0xD800, 0xF8FF),
    (0xFDD0, 0xFDEF),
    (0xFEFF, 0xFEFF),
    (0xFFF0, 0xFFFB),
    (0x110BD, 0x110BD),
    (0x110CD, 0x110CD),
    (0x13430, 0x1343F),
    (0x1BCA0, 0x1BCA3),
    (0x1D173, 0x1D17A),
    (0x323B0, 0xE00FF),
    (0xE01F0, 0x10FFFF),
];

fn is_printable(c: char) -> bool {
    let cp = c as u32;
    // U+xFFFE and U+xFFFF in every plane
    if cp & 0xFFFE == 0xFFFE {
        return false;
    }
    !NON_PRINTABLE.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

fn push_escaped(out: &mut String, c: char) {
    let cp = c as u32;
    let _ = match cp {
        0..=0xFF => write!(out, "\\x{:02x}", cp),
        0x100..=0xFFFF => write!(out, "\\u{:04x}", cp),
        _ => write!(out, "\\U{:08x}", cp),
    };
}

/// How much of the page text and word list to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Characters of raw text to print
    pub text_chars: usize,
    /// Words to list with positions
    pub word_count: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            text_chars: 2000,
            word_count: 20,
        }
    }
}

/// Quote a cell: single quotes unless the text holds `'` and no `"`,
/// with backslash and non-printable characters escaped.
pub fn quote_cell(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => push_escaped(&mut out, c),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// A table row as a list literal, e.g. `['A', None]`.
pub fn format_row(row: &[Option<String>]) -> String {
    let items: Vec<String> = row
        .iter()
        .map(|cell| match cell {
            Some(s) => quote_cell(s),
            None => "None".to_string(),
        })
        .collect();
    format!("[{}]", items.join(", "))
}

/// Shortest round-trip form, always with a fractional part (`612.0`).
pub fn format_float(v: f64) -> String {
    let s = v.to_string();
    if v.is_finite() && !s.contains('.') {
        format!("{}.0", s)
    } else {
        s
    }
}

fn banner<W: Write>(out: &mut W, title: &str, leading_break: bool) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    if leading_break {
        writeln!(out)?;
    }
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", rule)
}

/// Write the full report.
pub fn write_report<W: Write>(
    out: &mut W,
    analysis: &PageAnalysis,
    opts: &ReportOptions,
) -> io::Result<()> {
    banner(out, "PDF STRUCTURE ANALYSIS", false)?;
    writeln!(out, "Total pages: {}", analysis.page_count)?;
    let size_label = if analysis.page_number == 1 {
        "First page".to_string()
    } else {
        format!("Page {}", analysis.page_number)
    };
    writeln!(
        out,
        "{} size: {} x {}",
        size_label,
        format_float(analysis.width),
        format_float(analysis.height)
    )?;
    writeln!(out)?;

    banner(
        out,
        &format!("TABLES FOUND ON PAGE {}:", analysis.page_number),
        false,
    )?;
    for (i, table) in analysis.tables.iter().enumerate() {
        writeln!(out, "\nTable {}:", i + 1)?;
        writeln!(out, "  Rows: {}", table.len())?;
        writeln!(out, "  Columns: {}", table.first().map_or(0, |r| r.len()))?;
        if let Some(header) = table.first() {
            writeln!(out, "  Headers: {}", format_row(header))?;
            if let Some(row) = table.get(1) {
                writeln!(out, "  First data row: {}", format_row(row))?;
            }
            if let Some(row) = table.get(2) {
                writeln!(out, "  Second data row: {}", format_row(row))?;
            }
        }
    }

    banner(out, "TRYING DIFFERENT TABLE EXTRACTION SETTINGS:", true)?;
    for (i, table) in analysis.line_tables.iter().enumerate() {
        writeln!(out, "\nTable {} (with lines strategy):", i + 1)?;
        writeln!(out, "  Rows: {}", table.len())?;
        if let Some(header) = table.first() {
            writeln!(out, "  Headers: {}", format_row(header))?;
            if let Some(row) = table.get(1) {
                writeln!(out, "  Sample row 1: {}", format_row(row))?;
            }
        }
    }

    banner(
        out,
        &format!("RAW TEXT (first {} chars):", opts.text_chars),
        true,
    )?;
    let text: String = analysis.text.chars().take(opts.text_chars).collect();
    writeln!(out, "{}", text)?;

    banner(
        out,
        &format!("TEXT WITH POSITIONS (first {} items):", opts.word_count),
        true,
    )?;
    for (i, word) in analysis.words.iter().take(opts.word_count).enumerate() {
        writeln!(
            out,
            "{}: x={:.1} y={:.1} text='{}'",
            i, word.x0, word.top, word.text
        )?;
    }

    Ok(())
}

/// Trailer printed after the JSON dump was written.
pub fn write_saved_notice<W: Write>(out: &mut W, path: &Path) -> io::Result<()> {
    writeln!(out, "\n\nFull table data saved to: {}", path.display())
}
