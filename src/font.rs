//! Font decoding: character codes to Unicode text and glyph advances.
//!
//! Glyph advances are what turn a `Tj` string into individually positioned
//! characters, so every font carries a width table alongside its text
//! mapping.

use crate::document::{dict_get, number, stream_bytes};
use crate::encoding::{glyph_to_unicode, BaseEncoding};
use crate::metrics::StandardFont;
use crate::tounicode::ToUnicodeCMap;
use lopdf::{Dictionary, Document, Object};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Subset fonts are named `ABCDEF+RealName`.
static SUBSET_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{6}\+").unwrap());

/// One decoded glyph from a shown string.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Unicode text (may be empty or several chars)
    pub text: String,
    /// Horizontal advance in text space units per unit font size
    pub width: f64,
    /// Single-byte code 32, which also receives word spacing
    pub is_word_space: bool,
}

#[derive(Debug, Clone)]
enum FontWidths {
    Simple {
        first_char: u32,
        widths: Vec<f64>,
        missing_width: f64,
    },
    Composite {
        widths: HashMap<u32, f64>,
        default_width: f64,
    },
    Standard(StandardFont),
}

/// A font resolved from a page resource dictionary.
#[derive(Debug, Clone)]
pub struct PdfFont {
    /// `/BaseFont` without any subset prefix
    pub base_name: String,
    /// Distance from baseline to the bottom of the glyph box, per unit size
    pub descent: f64,
    widths: FontWidths,
    width_scale: f64,
    two_byte: bool,
    encoding: Vec<Option<String>>,
    to_unicode: Option<ToUnicodeCMap>,
}

impl PdfFont {
    /// Helvetica with standard encoding, used when no font was selected or
    /// the selected one cannot be found.
    pub fn fallback() -> Self {
        Self {
            base_name: "Helvetica".to_string(),
            descent: 0.0,
            widths: FontWidths::Standard(StandardFont::Helvetica),
            width_scale: 0.001,
            two_byte: false,
            encoding: base_table(BaseEncoding::Standard),
            to_unicode: None,
        }
    }

    /// Build a font from its dictionary.
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let subtype = dict_get(doc, dict, b"Subtype")
            .and_then(|o| o.as_name().ok())
            .unwrap_or(&b"Type1"[..]);
        let raw_name = dict_get(doc, dict, b"BaseFont")
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_default();
        let base_name = SUBSET_PREFIX_RE.replace(&raw_name, "").to_string();

        let to_unicode = dict_get(doc, dict, b"ToUnicode")
            .and_then(|o| o.as_stream().ok())
            .and_then(|s| ToUnicodeCMap::parse(&stream_bytes(s)));

        if subtype == b"Type0" {
            let descendant = dict_get(doc, dict, b"DescendantFonts")
                .and_then(|o| o.as_array().ok())
                .and_then(|a| a.first())
                .and_then(|o| crate::document::resolve(doc, o).as_dict().ok());

            let (widths, default_width, descent) = match descendant {
                Some(d) => (
                    parse_cid_widths(doc, d),
                    dict_get(doc, d, b"DW").and_then(number).unwrap_or(1000.0),
                    descriptor_descent(doc, d),
                ),
                None => (HashMap::new(), 1000.0, 0.0),
            };

            return Self {
                base_name,
                descent,
                widths: FontWidths::Composite {
                    widths,
                    default_width,
                },
                width_scale: 0.001,
                two_byte: true,
                encoding: Vec::new(),
                to_unicode,
            };
        }

        let width_scale = if subtype == b"Type3" {
            dict_get(doc, dict, b"FontMatrix")
                .and_then(|o| o.as_array().ok())
                .and_then(|a| a.first())
                .and_then(number)
                .unwrap_or(0.001)
        } else {
            0.001
        };

        let widths = match dict_get(doc, dict, b"Widths").and_then(|o| o.as_array().ok()) {
            Some(arr) => FontWidths::Simple {
                first_char: dict_get(doc, dict, b"FirstChar")
                    .and_then(number)
                    .unwrap_or(0.0) as u32,
                widths: arr
                    .iter()
                    .map(|o| number(crate::document::resolve(doc, o)).unwrap_or(0.0))
                    .collect(),
                missing_width: dict_get(doc, dict, b"FontDescriptor")
                    .and_then(|o| o.as_dict().ok())
                    .and_then(|fd| dict_get(doc, fd, b"MissingWidth"))
                    .and_then(number)
                    .unwrap_or(0.0),
            },
            None => FontWidths::Standard(StandardFont::from_base_name(&base_name).unwrap_or_else(|| {
                log::debug!("no widths for {}, measuring as Helvetica", base_name);
                StandardFont::Helvetica
            })),
        };

        let default_base = if subtype == b"TrueType" {
            BaseEncoding::WinAnsi
        } else {
            BaseEncoding::Standard
        };

        let descent = if subtype == b"Type3" {
            0.0
        } else {
            descriptor_descent(doc, dict)
        };

        Self {
            base_name,
            descent,
            widths,
            width_scale,
            two_byte: false,
            encoding: simple_encoding(doc, dict, default_base),
            to_unicode,
        }
    }

    /// Split a shown string into glyphs.
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|chunk| {
                    let code = chunk.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
                    Glyph {
                        text: self.code_text(code),
                        width: self.code_width(code),
                        is_word_space: false,
                    }
                })
                .collect()
        } else {
            bytes
                .iter()
                .map(|&b| {
                    let code = b as u32;
                    Glyph {
                        text: self.code_text(code),
                        width: self.code_width(code),
                        is_word_space: b == b' ',
                    }
                })
                .collect()
        }
    }

    fn code_text(&self, code: u32) -> String {
        if let Some(s) = self.to_unicode.as_ref().and_then(|m| m.lookup(code)) {
            return s;
        }
        if self.two_byte {
            return char::from_u32(code).map(String::from).unwrap_or_default();
        }
        self.encoding
            .get(code as usize)
            .cloned()
            .flatten()
            .unwrap_or_else(|| (code as u8 as char).to_string())
    }

    fn code_width(&self, code: u32) -> f64 {
        let raw = match &self.widths {
            FontWidths::Simple {
                first_char,
                widths,
                missing_width,
            } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .unwrap_or(*missing_width),
            FontWidths::Composite {
                widths,
                default_width,
            } => widths.get(&code).copied().unwrap_or(*default_width),
            FontWidths::Standard(face) => {
                let encoded = self.encoding.get(code as usize).and_then(|t| t.as_deref());
                face.glyph_width(code, encoded)
            }
        };
        raw * self.width_scale
    }
}

fn descriptor_descent(doc: &Document, font: &Dictionary) -> f64 {
    dict_get(doc, font, b"FontDescriptor")
        .and_then(|o| o.as_dict().ok())
        .and_then(|fd| dict_get(doc, fd, b"Descent"))
        .and_then(number)
        .map(|d| d * 0.001)
        .unwrap_or(0.0)
}

/// Highest two-byte code.
const MAX_CID: u32 = 0xFFFF;

/// `/W` array: `c [w1 w2 ...]` and `c_first c_last w` forms.
fn parse_cid_widths(doc: &Document, descendant: &Dictionary) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let Some(arr) = dict_get(doc, descendant, b"W").and_then(|o| o.as_array().ok()) else {
        return widths;
    };

    let items: Vec<&Object> = arr
        .iter()
        .map(|o| crate::document::resolve(doc, o))
        .collect();
    let mut i = 0;
    while i < items.len() {
        let Some(first) = number(items[i]) else {
            i += 1;
            continue;
        };
        match items.get(i + 1) {
            Some(Object::Array(list)) => {
                let first = first.clamp(0.0, MAX_CID as f64) as u32;
                for (code, w) in (first..=MAX_CID).zip(list) {
                    if let Some(w) = number(crate::document::resolve(doc, w)) {
                        widths.insert(code, w);
                    }
                }
                i += 2;
            }
            Some(last) => {
                if let (Some(last), Some(w)) = (number(last), items.get(i + 2).and_then(|o| number(o))) {
                    let first = first.clamp(0.0, MAX_CID as f64) as u32;
                    let last = last.clamp(0.0, MAX_CID as f64) as u32;
                    for code in first..=last {
                        widths.insert(code, w);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

fn base_table(base: BaseEncoding) -> Vec<Option<String>> {
    (0..=255u8).map(|b| Some(base.decode(b).to_string())).collect()
}

/// Base encoding plus `/Differences`.
fn simple_encoding(doc: &Document, font: &Dictionary, default_base: BaseEncoding) -> Vec<Option<String>> {
    match dict_get(doc, font, b"Encoding") {
        Some(Object::Name(name)) => {
            base_table(BaseEncoding::from_name(name).unwrap_or(default_base))
        }
        Some(Object::Dictionary(enc)) => {
            let base = dict_get(doc, enc, b"BaseEncoding")
                .and_then(|o| o.as_name().ok())
                .and_then(BaseEncoding::from_name)
                .unwrap_or(default_base);
            let mut table = base_table(base);

            if let Some(diffs) = dict_get(doc, enc, b"Differences").and_then(|o| o.as_array().ok()) {
                let mut code = 0usize;
                for item in diffs {
                    match crate::document::resolve(doc, item) {
                        Object::Integer(n) => code = (*n).max(0) as usize,
                        Object::Name(glyph) => {
                            if code < table.len() {
                                let name = String::from_utf8_lossy(glyph);
                                if let Some(text) = glyph_to_unicode(&name) {
                                    table[code] = Some(text);
                                } else {
                                    log::debug!("unknown glyph name in /Differences: {}", name);
                                }
                            }
                            code += 1;
                        }
                        _ => {}
                    }
                }
            }
            table
        }
        _ => base_table(default_base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    #[test]
    fn test_fallback_helvetica_widths() {
        let font = PdfFont::fallback();
        let glyphs = font.decode(b"A i");
        assert_eq!(glyphs.len(), 3);
        assert_eq!(glyphs[0].text, "A");
        assert!((glyphs[0].width - 0.667).abs() < 1e-9);
        assert!(glyphs[1].is_word_space);
        assert!((glyphs[2].width - 0.222).abs() < 1e-9);
    }

    #[test]
    fn test_simple_font_widths_and_differences() {
        let doc = Document::with_version("1.5");
        let font_dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "ABCDEF+Custom",
            "FirstChar" => 65,
            "Widths" => vec![500.into(), 600.into()],
            "Encoding" => dictionary! {
                "Type" => "Encoding",
                "BaseEncoding" => "WinAnsiEncoding",
                "Differences" => vec![66.into(), Object::Name(b"eacute".to_vec())],
            },
        };
        let font = PdfFont::from_dict(&doc, &font_dict);
        assert_eq!(font.base_name, "Custom");

        let glyphs = font.decode(b"ABC");
        assert_eq!(glyphs[0].text, "A");
        assert_eq!(glyphs[1].text, "é");
        assert!((glyphs[1].width - 0.6).abs() < 1e-9);
        // past the Widths array, no MissingWidth
        assert_eq!(glyphs[2].width, 0.0);
    }

    #[test]
    fn test_courier_is_monospace() {
        let doc = Document::with_version("1.5");
        let font_dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        };
        let font = PdfFont::from_dict(&doc, &font_dict);
        assert!(font.decode(b"iW").iter().all(|g| (g.width - 0.6).abs() < 1e-9));
    }

    #[test]
    fn test_type0_widths() {
        let doc = Document::with_version("1.5");
        let font_dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "CIDFont",
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "CIDFontType2",
                "DW" => 500,
                "W" => vec![
                    36.into(), Object::Array(vec![700.into(), 710.into()]),
                    50.into(), 52.into(), 300.into(),
                ],
            })],
        };
        let font = PdfFont::from_dict(&doc, &font_dict);
        let glyphs = font.decode(&[0x00, 0x24, 0x00, 0x25, 0x00, 0x33, 0x00, 0x01]);
        let expected = [0.7, 0.71, 0.3, 0.5];
        assert_eq!(glyphs.len(), expected.len());
        for (g, w) in glyphs.iter().zip(expected) {
            assert!((g.width - w).abs() < 1e-9, "{} != {}", g.width, w);
        }
        assert_eq!(glyphs[0].text, "$");
    }

    #[test]
    fn test_times_roman_standard_widths() {
        let doc = Document::with_version("1.5");
        let font_dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Times-Roman",
        };
        let font = PdfFont::from_dict(&doc, &font_dict);

        let glyphs = font.decode(b"mm x");
        let widths: Vec<f64> = glyphs.iter().map(|g| g.width).collect();
        let expected = [0.778, 0.778, 0.25, 0.5];
        for (w, e) in widths.iter().zip(expected) {
            assert!((w - e).abs() < 1e-9, "{} != {}", w, e);
        }
        // 10pt text starting at x=100: "x" begins at 118.06
        let x = 100.0 + widths[..3].iter().sum::<f64>() * 10.0;
        assert!((x - 118.06).abs() < 1e-9);
    }

    #[test]
    fn test_standard_widths_follow_encoding() {
        let doc = Document::with_version("1.5");
        let font_dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "ABCDEF+Times-Bold",
            "Encoding" => "WinAnsiEncoding",
        };
        let font = PdfFont::from_dict(&doc, &font_dict);
        let glyphs = font.decode(&[0xC9, 0x96]);
        assert_eq!(glyphs[0].text, "É");
        // Eacute measures as E, endash from the face's extra glyphs
        assert!((glyphs[0].width - 0.667).abs() < 1e-9);
        assert!((glyphs[1].width - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_type3_font_matrix_scales_widths() {
        let doc = Document::with_version("1.5");
        let font_dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type3",
            "FontMatrix" => vec![0.01.into(), 0.into(), 0.into(), 0.01.into(), 0.into(), 0.into()],
            "FirstChar" => 65,
            "Widths" => vec![50.into(), 80.into()],
        };
        let font = PdfFont::from_dict(&doc, &font_dict);
        let glyphs = font.decode(b"AB");
        assert!((glyphs[0].width - 0.5).abs() < 1e-9);
        assert!((glyphs[1].width - 0.8).abs() < 1e-9);
        assert_eq!(font.descent, 0.0);
    }

    #[test]
    fn test_to_unicode_overrides_encoding() {
        let mut doc = Document::with_version("1.5");
        let cmap = Stream::new(
            dictionary! {},
            b"1 beginbfchar\n<41> <0416>\nendbfchar".to_vec(),
        );
        let cmap_id = doc.add_object(cmap);
        let font_dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Arial",
            "Encoding" => "WinAnsiEncoding",
            "ToUnicode" => cmap_id,
        };
        let font = PdfFont::from_dict(&doc, &font_dict);
        let glyphs = font.decode(b"AB");
        assert_eq!(glyphs[0].text, "\u{416}");
        // codes missing from the CMap fall back to the encoding
        assert_eq!(glyphs[1].text, "B");
    }

    #[test]
    fn test_cid_width_range_is_clamped() {
        let doc = Document::with_version("1.5");
        let descendant = dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "W" => vec![65000.into(), 4_294_967_295i64.into(), 250.into()],
        };
        let widths = parse_cid_widths(&doc, &descendant);
        assert_eq!(widths.len(), (MAX_CID - 65000 + 1) as usize);
        assert_eq!(widths.get(&MAX_CID), Some(&250.0));
    }
}
