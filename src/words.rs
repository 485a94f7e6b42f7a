//! Word and raw-text extraction from positioned chars.

use crate::geometry::cluster_objects;
use crate::interpreter::Char;
use serde::Serialize;

/// Options for grouping chars into words.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordOptions {
    /// Max gap between the end of one char and the start of the next
    pub x_tolerance: f64,
    /// Max vertical drift inside one line
    pub y_tolerance: f64,
    /// Treat whitespace chars as part of words
    pub keep_blank_chars: bool,
    /// Replace ligature glyphs (U+FB00..U+FB06) with their letters
    pub expand_ligatures: bool,
}

impl Default for WordOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
            keep_blank_chars: false,
            expand_ligatures: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Left to right
    Ltr,
    /// Top to bottom
    Ttb,
}

/// A positioned word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub doctop: f64,
    pub bottom: f64,
    pub upright: bool,
    pub height: f64,
    pub width: f64,
    pub direction: TextDirection,
}

fn expand_ligature(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{FB00}' => out.push_str("ff"),
            '\u{FB01}' => out.push_str("fi"),
            '\u{FB02}' => out.push_str("fl"),
            '\u{FB03}' => out.push_str("ffi"),
            '\u{FB04}' => out.push_str("ffl"),
            '\u{FB05}' | '\u{FB06}' => out.push_str("st"),
            _ => out.push(c),
        }
    }
    out
}

fn is_blank(c: &Char) -> bool {
    c.text.chars().all(char::is_whitespace)
}

/// Whether `curr` cannot continue the word ending with `prev`.
fn begins_new_word(prev: &Char, curr: &Char, opts: &WordOptions) -> bool {
    if prev.upright {
        curr.x0 < prev.x0
            || curr.x0 > prev.x1 + opts.x_tolerance
            || (curr.top - prev.top).abs() > opts.y_tolerance
    } else {
        curr.top < prev.top
            || curr.top > prev.bottom + opts.y_tolerance
            || (curr.x0 - prev.x0).abs() > opts.x_tolerance
    }
}

fn merge_chars(chars: &[Char], opts: &WordOptions) -> Word {
    let text: String = chars.iter().map(|c| c.text.as_str()).collect();
    let text = if opts.expand_ligatures {
        expand_ligature(&text)
    } else {
        text
    };

    let x0 = chars.iter().map(|c| c.x0).fold(f64::INFINITY, f64::min);
    let x1 = chars.iter().map(|c| c.x1).fold(f64::NEG_INFINITY, f64::max);
    let top = chars.iter().map(|c| c.top).fold(f64::INFINITY, f64::min);
    let bottom = chars.iter().map(|c| c.bottom).fold(f64::NEG_INFINITY, f64::max);
    let doctop = chars.iter().map(|c| c.doctop).fold(f64::INFINITY, f64::min);
    let upright = chars[0].upright;

    Word {
        text,
        x0,
        x1,
        top,
        doctop,
        bottom,
        upright,
        height: bottom - top,
        width: x1 - x0,
        direction: if upright {
            TextDirection::Ltr
        } else {
            TextDirection::Ttb
        },
    }
}

/// Split a line of chars (already in reading order) into words.
fn line_to_words(line: &[Char], opts: &WordOptions, out: &mut Vec<Word>) {
    let mut current: Vec<Char> = Vec::new();
    for c in line {
        if !opts.keep_blank_chars && is_blank(c) {
            if !current.is_empty() {
                out.push(merge_chars(&current, opts));
                current.clear();
            }
        } else if current
            .last()
            .map(|prev| begins_new_word(prev, c, opts))
            .unwrap_or(false)
        {
            out.push(merge_chars(&current, opts));
            current.clear();
            current.push(c.clone());
        } else {
            current.push(c.clone());
        }
    }
    if !current.is_empty() {
        out.push(merge_chars(&current, opts));
    }
}

/// Group chars into words.
///
/// Consecutive runs of chars sharing the same `upright` flag are clustered
/// into lines (by `top` for upright text, by `x0` otherwise), each line is
/// put in reading order and split at whitespace and gaps.
pub fn extract_words(chars: &[Char], opts: &WordOptions) -> Vec<Word> {
    let mut words = Vec::new();

    let mut start = 0;
    while start < chars.len() {
        let upright = chars[start].upright;
        let end = chars[start..]
            .iter()
            .position(|c| c.upright != upright)
            .map(|n| start + n)
            .unwrap_or(chars.len());
        let run = &chars[start..end];

        // y_tolerance clusters lines in either orientation
        let lines = if upright {
            cluster_objects(run, |c| c.top, opts.y_tolerance)
        } else {
            cluster_objects(run, |c| c.x0, opts.y_tolerance)
        };
        for mut line in lines {
            if upright {
                line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            } else {
                line.sort_by(|a, b| a.top.total_cmp(&b.top));
            }
            line_to_words(&line, opts, &mut words);
        }

        start = end;
    }

    words
}

/// Plain text of a set of chars: words joined by spaces, lines by newlines.
pub fn extract_text(chars: &[Char], opts: &WordOptions) -> String {
    let words = extract_words(chars, opts);
    if words.is_empty() {
        return String::new();
    }

    cluster_objects(&words, |w| w.top, opts.y_tolerance)
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            line.iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
