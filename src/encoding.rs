//! Base encodings for simple fonts and glyph-name to Unicode lookup.
//!
//! Covers the encodings that appear in practice for `/Encoding` names and
//! `/BaseEncoding`, plus the subset of the Adobe Glyph List needed to resolve
//! `/Differences` arrays.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A named single-byte base encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    WinAnsi,
    MacRoman,
    Standard,
    PdfDoc,
}

impl BaseEncoding {
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"WinAnsiEncoding" => Some(BaseEncoding::WinAnsi),
            b"MacRomanEncoding" => Some(BaseEncoding::MacRoman),
            b"StandardEncoding" => Some(BaseEncoding::Standard),
            b"PDFDocEncoding" => Some(BaseEncoding::PdfDoc),
            _ => None,
        }
    }

    /// Decode one code. Codes the encoding leaves undefined fall back to
    /// their Latin-1 interpretation.
    pub fn decode(self, code: u8) -> char {
        match self {
            BaseEncoding::WinAnsi | BaseEncoding::PdfDoc => {
                if (0x80..0xA0).contains(&code) {
                    WIN_ANSI_80_9F[(code - 0x80) as usize].unwrap_or(code as char)
                } else {
                    code as char
                }
            }
            BaseEncoding::MacRoman => {
                if code >= 0x80 {
                    MAC_ROMAN_HIGH
                        .chars()
                        .nth((code - 0x80) as usize)
                        .unwrap_or(code as char)
                } else {
                    code as char
                }
            }
            BaseEncoding::Standard => match code {
                0x27 => '\u{2019}',
                0x60 => '\u{2018}',
                0x80..=0xFF => STANDARD_HIGH
                    .iter()
                    .find(|(c, _)| *c == code)
                    .map(|(_, ch)| *ch)
                    .unwrap_or(code as char),
                _ => code as char,
            },
        }
    }
}

const WIN_ANSI_80_9F: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

const MAC_ROMAN_HIGH: &str = concat!(
    "ÄÅÇÉÑÖÜáàâäãåçéè",
    "êëíìîïñóòôöõúùûü",
    "†°¢£§•¶ß®©™´¨≠ÆØ",
    "∞±≤≥¥µ∂∑∏π∫ªºΩæø",
    "¿¡¬√ƒ≈∆«»…\u{A0}ÀÃÕŒœ",
    "–—“”‘’÷◊ÿŸ⁄¤‹›ﬁﬂ",
    "‡·‚„‰ÂÊÁËÈÍÎÏÌÓÔ",
    "\u{F8FF}ÒÚÛÙıˆ˜¯˘˙˚¸˝˛ˇ",
);

const STANDARD_HIGH: &[(u8, char)] = &[
    (0xA1, '¡'),
    (0xA2, '¢'),
    (0xA3, '£'),
    (0xA4, '\u{2044}'),
    (0xA5, '¥'),
    (0xA6, 'ƒ'),
    (0xA7, '§'),
    (0xA8, '¤'),
    (0xA9, '\''),
    (0xAA, '\u{201C}'),
    (0xAB, '«'),
    (0xAC, '\u{2039}'),
    (0xAD, '\u{203A}'),
    (0xAE, '\u{FB01}'),
    (0xAF, '\u{FB02}'),
    (0xB1, '\u{2013}'),
    (0xB2, '\u{2020}'),
    (0xB3, '\u{2021}'),
    (0xB4, '·'),
    (0xB6, '¶'),
    (0xB7, '\u{2022}'),
    (0xB8, '\u{201A}'),
    (0xB9, '\u{201E}'),
    (0xBA, '\u{201D}'),
    (0xBB, '»'),
    (0xBC, '\u{2026}'),
    (0xBD, '\u{2030}'),
    (0xBF, '¿'),
    (0xC1, '`'),
    (0xC2, '´'),
    (0xC3, '\u{02C6}'),
    (0xC4, '\u{02DC}'),
    (0xC5, '¯'),
    (0xC6, '\u{02D8}'),
    (0xC7, '\u{02D9}'),
    (0xC8, '¨'),
    (0xCA, '\u{02DA}'),
    (0xCB, '¸'),
    (0xCD, '\u{02DD}'),
    (0xCE, '\u{02DB}'),
    (0xCF, '\u{02C7}'),
    (0xD0, '\u{2014}'),
    (0xE1, 'Æ'),
    (0xE3, 'ª'),
    (0xE8, 'Ł'),
    (0xE9, 'Ø'),
    (0xEA, 'Œ'),
    (0xEB, 'º'),
    (0xF1, 'æ'),
    (0xF5, 'ı'),
    (0xF8, 'ł'),
    (0xF9, 'ø'),
    (0xFA, 'œ'),
    (0xFB, 'ß'),
];

/// Adobe glyph names that are not a single letter.
static GLYPH_TO_UNICODE: Lazy<HashMap<&'static str, char>> = Lazy::new(|| {
    let entries: &[(&str, char)] = &[
        ("space", ' '),
        ("exclam", '!'),
        ("quotedbl", '"'),
        ("numbersign", '#'),
        ("dollar", '$'),
        ("percent", '%'),
        ("ampersand", '&'),
        ("quotesingle", '\''),
        ("quoteright", '\u{2019}'),
        ("quoteleft", '\u{2018}'),
        ("parenleft", '('),
        ("parenright", ')'),
        ("asterisk", '*'),
        ("plus", '+'),
        ("comma", ','),
        ("hyphen", '-'),
        ("minus", '\u{2212}'),
        ("period", '.'),
        ("slash", '/'),
        ("zero", '0'),
        ("one", '1'),
        ("two", '2'),
        ("three", '3'),
        ("four", '4'),
        ("five", '5'),
        ("six", '6'),
        ("seven", '7'),
        ("eight", '8'),
        ("nine", '9'),
        ("colon", ':'),
        ("semicolon", ';'),
        ("less", '<'),
        ("equal", '='),
        ("greater", '>'),
        ("question", '?'),
        ("at", '@'),
        ("bracketleft", '['),
        ("backslash", '\\'),
        ("bracketright", ']'),
        ("asciicircum", '^'),
        ("underscore", '_'),
        ("grave", '`'),
        ("braceleft", '{'),
        ("bar", '|'),
        ("braceright", '}'),
        ("asciitilde", '~'),
        ("nbspace", '\u{A0}'),
        ("exclamdown", '¡'),
        ("cent", '¢'),
        ("sterling", '£'),
        ("currency", '¤'),
        ("yen", '¥'),
        ("brokenbar", '¦'),
        ("section", '§'),
        ("dieresis", '¨'),
        ("copyright", '©'),
        ("ordfeminine", 'ª'),
        ("guillemotleft", '«'),
        ("logicalnot", '¬'),
        ("registered", '®'),
        ("macron", '¯'),
        ("degree", '°'),
        ("plusminus", '±'),
        ("twosuperior", '²'),
        ("threesuperior", '³'),
        ("acute", '´'),
        ("mu", 'µ'),
        ("paragraph", '¶'),
        ("periodcentered", '·'),
        ("cedilla", '¸'),
        ("onesuperior", '¹'),
        ("ordmasculine", 'º'),
        ("guillemotright", '»'),
        ("onequarter", '¼'),
        ("onehalf", '½'),
        ("threequarters", '¾'),
        ("questiondown", '¿'),
        ("Agrave", 'À'),
        ("Aacute", 'Á'),
        ("Acircumflex", 'Â'),
        ("Atilde", 'Ã'),
        ("Adieresis", 'Ä'),
        ("Aring", 'Å'),
        ("AE", 'Æ'),
        ("Ccedilla", 'Ç'),
        ("Egrave", 'È'),
        ("Eacute", 'É'),
        ("Ecircumflex", 'Ê'),
        ("Edieresis", 'Ë'),
        ("Igrave", 'Ì'),
        ("Iacute", 'Í'),
        ("Icircumflex", 'Î'),
        ("Idieresis", 'Ï'),
        ("Eth", 'Ð'),
        ("Ntilde", 'Ñ'),
        ("Ograve", 'Ò'),
        ("Oacute", 'Ó'),
        ("Ocircumflex", 'Ô'),
        ("Otilde", 'Õ'),
        ("Odieresis", 'Ö'),
        ("multiply", '×'),
        ("Oslash", 'Ø'),
        ("Ugrave", 'Ù'),
        ("Uacute", 'Ú'),
        ("Ucircumflex", 'Û'),
        ("Udieresis", 'Ü'),
        ("Yacute", 'Ý'),
        ("Thorn", 'Þ'),
        ("germandbls", 'ß'),
        ("agrave", 'à'),
        ("aacute", 'á'),
        ("acircumflex", 'â'),
        ("atilde", 'ã'),
        ("adieresis", 'ä'),
        ("aring", 'å'),
        ("ae", 'æ'),
        ("ccedilla", 'ç'),
        ("egrave", 'è'),
        ("eacute", 'é'),
        ("ecircumflex", 'ê'),
        ("edieresis", 'ë'),
        ("igrave", 'ì'),
        ("iacute", 'í'),
        ("icircumflex", 'î'),
        ("idieresis", 'ï'),
        ("eth", 'ð'),
        ("ntilde", 'ñ'),
        ("ograve", 'ò'),
        ("oacute", 'ó'),
        ("ocircumflex", 'ô'),
        ("otilde", 'õ'),
        ("odieresis", 'ö'),
        ("divide", '÷'),
        ("oslash", 'ø'),
        ("ugrave", 'ù'),
        ("uacute", 'ú'),
        ("ucircumflex", 'û'),
        ("udieresis", 'ü'),
        ("yacute", 'ý'),
        ("thorn", 'þ'),
        ("ydieresis", 'ÿ'),
        ("OE", 'Œ'),
        ("oe", 'œ'),
        ("Scaron", 'Š'),
        ("scaron", 'š'),
        ("Zcaron", 'Ž'),
        ("zcaron", 'ž'),
        ("Ydieresis", 'Ÿ'),
        ("Lslash", 'Ł'),
        ("lslash", 'ł'),
        ("dotlessi", 'ı'),
        ("florin", 'ƒ'),
        ("circumflex", '\u{02C6}'),
        ("tilde", '\u{02DC}'),
        ("endash", '\u{2013}'),
        ("emdash", '\u{2014}'),
        ("quotesinglbase", '\u{201A}'),
        ("quotedblleft", '\u{201C}'),
        ("quotedblright", '\u{201D}'),
        ("quotedblbase", '\u{201E}'),
        ("dagger", '\u{2020}'),
        ("daggerdbl", '\u{2021}'),
        ("bullet", '\u{2022}'),
        ("ellipsis", '\u{2026}'),
        ("perthousand", '\u{2030}'),
        ("guilsinglleft", '\u{2039}'),
        ("guilsinglright", '\u{203A}'),
        ("fraction", '\u{2044}'),
        ("Euro", '\u{20AC}'),
        ("trademark", '\u{2122}'),
        ("fi", '\u{FB01}'),
        ("fl", '\u{FB02}'),
        ("ff", '\u{FB00}'),
        ("ffi", '\u{FB03}'),
        ("ffl", '\u{FB04}'),
    ];
    entries.iter().copied().collect()
});

/// Resolve a glyph name to Unicode text.
///
/// Handles the named subset above, single-letter names, `uniXXXX[XXXX...]`,
/// `uXXXX[XX]`, `.suffix` variants and `_`-joined ligature names.
pub fn glyph_to_unicode(name: &str) -> Option<String> {
    let base = name.split('.').next().unwrap_or(name);
    if base.is_empty() {
        return None;
    }

    if base.contains('_') {
        let parts: Option<String> = base.split('_').map(glyph_to_unicode).collect();
        return parts;
    }

    if let Some(&c) = GLYPH_TO_UNICODE.get(base) {
        return Some(c.to_string());
    }

    if base.len() == 1 && base.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(base.to_string());
    }

    if let Some(hex) = base.strip_prefix("uni") {
        if hex.len() >= 4 && hex.len() % 4 == 0 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let mut out = String::new();
            for i in (0..hex.len()).step_by(4) {
                let cp = u32::from_str_radix(&hex[i..i + 4], 16).ok()?;
                out.push(char::from_u32(cp)?);
            }
            return Some(out);
        }
    }

    if let Some(hex) = base.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            let cp = u32::from_str_radix(hex, 16).ok()?;
            return char::from_u32(cp).map(|c| c.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_roman_table_is_complete() {
        assert_eq!(MAC_ROMAN_HIGH.chars().count(), 128);
        assert_eq!(BaseEncoding::MacRoman.decode(0x80), 'Ä');
        assert_eq!(BaseEncoding::MacRoman.decode(0xFF), 'ˇ');
    }

    #[test]
    fn test_win_ansi_specials() {
        assert_eq!(BaseEncoding::WinAnsi.decode(0x80), '€');
        assert_eq!(BaseEncoding::WinAnsi.decode(0x41), 'A');
        assert_eq!(BaseEncoding::WinAnsi.decode(0xE9), 'é');
        assert_eq!(BaseEncoding::WinAnsi.decode(0x81), '\u{81}');
    }

    #[test]
    fn test_standard_quotes() {
        assert_eq!(BaseEncoding::Standard.decode(0x27), '’');
        assert_eq!(BaseEncoding::Standard.decode(0xAE), 'ﬁ');
    }

    #[test]
    fn test_glyph_names() {
        assert_eq!(glyph_to_unicode("A").as_deref(), Some("A"));
        assert_eq!(glyph_to_unicode("adieresis").as_deref(), Some("ä"));
        assert_eq!(glyph_to_unicode("uni00E9").as_deref(), Some("é"));
        assert_eq!(glyph_to_unicode("u1F600").as_deref(), Some("😀"));
        assert_eq!(glyph_to_unicode("a.sc").as_deref(), Some("a"));
        assert_eq!(glyph_to_unicode("f_i").as_deref(), Some("fi"));
        assert_eq!(glyph_to_unicode("g123"), None);
    }
}
