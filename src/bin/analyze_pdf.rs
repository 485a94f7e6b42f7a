//! CLI tool printing the table/text structure of one PDF page
//!
//! Prints a diagnostic report to stdout and saves the first-pass tables plus
//! a word sample as JSON when any table was found.

use anyhow::{Context, Result};
use clap::Parser;
use pdf_probe::{
    analyze_pdf, write_report, write_saved_notice, write_table_dump, AnalyzeOptions,
    ReportOptions, Strategy, TableSettings,
};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "analyze_pdf", about = "Analyze the table and text structure of a PDF page")]
struct Args {
    /// PDF file to analyze
    pdf: PathBuf,

    /// Where to save the table data
    #[arg(short, long, default_value = "pdf_table_data.json")]
    output: PathBuf,

    /// Page to analyze (1-based)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    page: u64,

    /// Characters of raw text to print
    #[arg(long, default_value_t = 2000)]
    text_chars: usize,

    /// Words to print with positions
    #[arg(long, default_value_t = 20)]
    words: usize,

    /// Words to include in the JSON sample
    #[arg(long, default_value_t = 50)]
    sample_words: usize,

    /// Vertical strategy for the second table pass
    #[arg(long, value_enum, default_value_t = Strategy::Lines)]
    alt_vertical: Strategy,

    /// Horizontal strategy for the second table pass
    #[arg(long, value_enum, default_value_t = Strategy::Lines)]
    alt_horizontal: Strategy,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let opts = AnalyzeOptions {
        page: args.page as usize,
        line_tables: TableSettings::with_strategies(args.alt_vertical, args.alt_horizontal),
        ..AnalyzeOptions::default()
    };
    let report_opts = ReportOptions {
        text_chars: args.text_chars,
        word_count: args.words,
    };

    let analysis = analyze_pdf(&args.pdf, &opts)
        .with_context(|| format!("failed to analyze {}", args.pdf.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_report(&mut out, &analysis, &report_opts).context("failed to write report")?;

    let saved = write_table_dump(&args.output, &analysis, args.sample_words)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    if saved {
        write_saved_notice(&mut out, &args.output).context("failed to write report")?;
    }
    out.flush()?;

    Ok(())
}
