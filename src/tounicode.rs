//! ToUnicode CMap parsing for PDF text extraction
//!
//! Maps character codes (of any byte width) to Unicode strings using the
//! `bfchar` and `bfrange` sections of an embedded CMap stream.

use std::collections::HashMap;

/// A parsed ToUnicode CMap
#[derive(Debug, Default, Clone)]
pub struct ToUnicodeCMap {
    /// Direct code mappings
    pub char_map: HashMap<u32, String>,
    /// Ranges mapped onto consecutive Unicode scalars: (start, end, base)
    pub ranges: Vec<(u32, u32, u32)>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    ArrayStart,
    ArrayEnd,
}

impl ToUnicodeCMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a ToUnicode CMap from its decompressed content.
    /// Returns `None` when no mapping could be read.
    pub fn parse(content: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(content);
        let mut cmap = ToUnicodeCMap::new();

        for section in sections(&text, "beginbfchar", "endbfchar") {
            cmap.parse_bfchar_section(section);
        }
        for section in sections(&text, "beginbfrange", "endbfrange") {
            cmap.parse_bfrange_section(section);
        }

        if cmap.char_map.is_empty() && cmap.ranges.is_empty() {
            None
        } else {
            Some(cmap)
        }
    }

    /// `<src> <dst>` pairs
    fn parse_bfchar_section(&mut self, section: &str) {
        let tokens = tokenize(section);
        for pair in tokens.chunks(2) {
            if let [Token::Hex(src), Token::Hex(dst)] = pair {
                if let Some(s) = utf16be_to_string(dst) {
                    self.char_map.insert(bytes_to_code(src), s);
                }
            }
        }
    }

    /// `<start> <end> <base>` or `<start> <end> [<dst> <dst> ...]`
    fn parse_bfrange_section(&mut self, section: &str) {
        let tokens = tokenize(section);
        let mut i = 0;
        while i + 2 < tokens.len() {
            let (start, end) = match (&tokens[i], &tokens[i + 1]) {
                (Token::Hex(s), Token::Hex(e)) => (bytes_to_code(s), bytes_to_code(e)),
                _ => {
                    i += 1;
                    continue;
                }
            };

            match &tokens[i + 2] {
                Token::Hex(base) => {
                    if let Some(base) = utf16be_to_scalar(base) {
                        self.ranges.push((start, end, base));
                    }
                    i += 3;
                }
                Token::ArrayStart => {
                    let mut j = i + 3;
                    let mut code = start;
                    while j < tokens.len() && tokens[j] != Token::ArrayEnd {
                        if let Token::Hex(dst) = &tokens[j] {
                            if code <= end {
                                if let Some(s) = utf16be_to_string(dst) {
                                    self.char_map.insert(code, s);
                                }
                            }
                            code += 1;
                        }
                        j += 1;
                    }
                    i = j + 1;
                }
                Token::ArrayEnd => i += 3,
            }
        }
    }

    /// Look up a code and return the Unicode string
    pub fn lookup(&self, code: u32) -> Option<String> {
        if let Some(s) = self.char_map.get(&code) {
            return Some(s.clone());
        }

        self.ranges
            .iter()
            .find(|&&(start, end, _)| code >= start && code <= end)
            .and_then(|&(start, _, base)| char::from_u32(base + (code - start)))
            .map(|c| c.to_string())
    }
}

/// Bodies between every `begin`/`end` marker pair.
fn sections<'a>(text: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(start) = text[pos..].find(begin) {
        let body_start = pos + start + begin.len();
        match text[body_start..].find(end) {
            Some(len) => {
                out.push(&text[body_start..body_start + len]);
                pos = body_start + len + end.len();
            }
            None => break,
        }
    }
    out
}

fn tokenize(section: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = section.chars();
    while let Some(c) = chars.next() {
        match c {
            '<' => {
                let mut hex = String::new();
                for h in chars.by_ref() {
                    if h == '>' {
                        break;
                    }
                    if h.is_ascii_hexdigit() {
                        hex.push(h);
                    }
                }
                if hex.len() % 2 == 1 {
                    hex.push('0');
                }
                let bytes = (0..hex.len())
                    .step_by(2)
                    .filter_map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
                    .collect();
                tokens.push(Token::Hex(bytes));
            }
            '[' => tokens.push(Token::ArrayStart),
            ']' => tokens.push(Token::ArrayEnd),
            _ => {}
        }
    }
    tokens
}

fn bytes_to_code(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

/// Destination strings are UTF-16BE, possibly with surrogate pairs.
fn utf16be_to_string(bytes: &[u8]) -> Option<String> {
    if bytes.len() == 1 {
        return Some((bytes[0] as char).to_string());
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    let s = String::from_utf16_lossy(&units);
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn utf16be_to_scalar(bytes: &[u8]) -> Option<u32> {
    utf16be_to_string(bytes)
        .and_then(|s| s.chars().next())
        .map(|c| c as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bfchar() {
        let cmap_content = r#"
/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<0000><FFFF>
endcodespacerange
3 beginbfchar
<0003> <0020>
<0024> <0041>
<0025> <0042>
endbfchar
endcmap
"#;
        let cmap = ToUnicodeCMap::parse(cmap_content.as_bytes()).unwrap();

        assert_eq!(cmap.lookup(0x0003), Some(" ".to_string()));
        assert_eq!(cmap.lookup(0x0024), Some("A".to_string()));
        assert_eq!(cmap.lookup(0x0025), Some("B".to_string()));
    }

    #[test]
    fn test_parse_bfrange_base_and_array() {
        let cmap_content = r#"
2 beginbfrange
<0010> <0012> <0061>
<0020> <0021> [<0058> <00660069>]
endbfrange
"#;
        let cmap = ToUnicodeCMap::parse(cmap_content.as_bytes()).unwrap();

        assert_eq!(cmap.lookup(0x10).as_deref(), Some("a"));
        assert_eq!(cmap.lookup(0x12).as_deref(), Some("c"));
        assert_eq!(cmap.lookup(0x20).as_deref(), Some("X"));
        assert_eq!(cmap.lookup(0x21).as_deref(), Some("fi"));
        assert_eq!(cmap.lookup(0x13), None);
    }

    #[test]
    fn test_one_byte_codes() {
        let cmap_content = "1 beginbfchar\n<41> <00C4>\nendbfchar";
        let cmap = ToUnicodeCMap::parse(cmap_content.as_bytes()).unwrap();
        assert_eq!(cmap.lookup(0x41).as_deref(), Some("Ä"));
    }

    #[test]
    fn test_unmapped_code_is_none() {
        let cmap_content = r#"
3 beginbfchar
<0003> <0020>
<0024> <0041>
<0025> <0042>
endbfchar
"#;
        let cmap = ToUnicodeCMap::parse(cmap_content.as_bytes()).unwrap();
        assert_eq!(cmap.lookup(0x0024).as_deref(), Some("A"));
        assert_eq!(cmap.lookup(0x0026), None);
    }

    #[test]
    fn test_empty_cmap_is_none() {
        assert!(ToUnicodeCMap::parse(b"begincmap endcmap").is_none());
    }
}
