//! Built-in glyph advances for the standard 14 fonts.
//!
//! Fonts that name a standard face and carry no `/Widths` are measured from
//! these tables. Latin faces are looked up by the character a code decodes
//! to under the font's encoding, so `é` in WinAnsi and `é` via
//! `/Differences` get the same width. Symbol and ZapfDingbats are looked up
//! by code.

/// One of the standard 14 faces. Oblique variants share their upright
/// widths and every Courier is 600 units wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    Symbol,
    ZapfDingbats,
}

struct LatinMetrics {
    ascii: &'static [u16; 95],
    extra: &'static [(char, u16)],
}

impl StandardFont {
    /// Face for a `/BaseFont` name with any subset prefix removed.
    pub fn from_base_name(name: &str) -> Option<Self> {
        let face = match name {
            "Helvetica" | "Helvetica-Oblique" => StandardFont::Helvetica,
            "Helvetica-Bold" | "Helvetica-BoldOblique" => StandardFont::HelveticaBold,
            "Times-Roman" => StandardFont::TimesRoman,
            "Times-Bold" => StandardFont::TimesBold,
            "Times-Italic" => StandardFont::TimesItalic,
            "Times-BoldItalic" => StandardFont::TimesBoldItalic,
            "Symbol" => StandardFont::Symbol,
            "ZapfDingbats" => StandardFont::ZapfDingbats,
            n if n.starts_with("Courier") => StandardFont::Courier,
            _ => return None,
        };
        Some(face)
    }

    fn latin(self) -> Option<LatinMetrics> {
        let (ascii, extra) = match self {
            StandardFont::Helvetica => (&HELVETICA_WIDTHS, HELVETICA_EXTRA),
            StandardFont::HelveticaBold => (&HELVETICA_BOLD_WIDTHS, HELVETICA_BOLD_EXTRA),
            StandardFont::TimesRoman => (&TIMES_ROMAN_WIDTHS, TIMES_ROMAN_EXTRA),
            StandardFont::TimesBold => (&TIMES_BOLD_WIDTHS, TIMES_BOLD_EXTRA),
            StandardFont::TimesItalic => (&TIMES_ITALIC_WIDTHS, TIMES_ITALIC_EXTRA),
            StandardFont::TimesBoldItalic => (&TIMES_BOLD_ITALIC_WIDTHS, TIMES_BOLD_ITALIC_EXTRA),
            _ => return None,
        };
        Some(LatinMetrics { ascii, extra })
    }

    /// Advance in 1/1000 em for a code whose encoded text is `text`.
    /// Glyphs the face does not have are 0 wide.
    pub fn glyph_width(self, code: u32, text: Option<&str>) -> f64 {
        let width = match self {
            StandardFont::Courier => Some(600),
            StandardFont::Symbol => ascii_slot(code)
                .map(|i| SYMBOL_WIDTHS[i])
                .or_else(|| SYMBOL_HIGH.iter().find(|(c, _)| *c as u32 == code).map(|(_, w)| *w)),
            StandardFont::ZapfDingbats => ascii_slot(code).map(|i| ZAPF_DINGBATS_WIDTHS[i]),
            latin => latin
                .latin()
                .zip(text.and_then(single_char))
                .and_then(|(metrics, c)| latin_width(&metrics, c)),
        };
        width.map(f64::from).unwrap_or(0.0)
    }
}

fn ascii_slot(code: u32) -> Option<usize> {
    (32..=126).contains(&code).then(|| (code - 32) as usize)
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// Accented letters are as wide as their base letter in every Latin face.
const ACCENTED: &[(&str, char)] = &[
    ("ÀÁÂÃÄÅĀĂĄ", 'A'),
    ("àáâãäåāăą", 'a'),
    ("ÇĆČ", 'C'),
    ("çćč", 'c'),
    ("ÈÉÊËĒĖĘĚ", 'E'),
    ("èéêëēėęě", 'e'),
    ("ĞĢ", 'G'),
    ("ğģ", 'g'),
    ("ÌÍÎÏĪĮİ", 'I'),
    ("ìíîïīį", 'i'),
    ("ÑŃŅŇ", 'N'),
    ("ñńņň", 'n'),
    ("ÒÓÔÕÖŌŐ", 'O'),
    ("òóôõöōő", 'o'),
    ("ŔŘ", 'R'),
    ("ŕř", 'r'),
    ("ŚŞŠ", 'S'),
    ("śşš", 's'),
    ("ŢŤ", 'T'),
    ("ÙÚÛÜŪŮŰŲ", 'U'),
    ("ùúûüūůűų", 'u'),
    ("ÝŸ", 'Y'),
    ("ýÿ", 'y'),
    ("ŹŻŽ", 'Z'),
    ("źżž", 'z'),
];

fn latin_width(metrics: &LatinMetrics, c: char) -> Option<u16> {
    let c = match c {
        '\u{A0}' => ' ',
        '\u{AD}' => '-',
        c => ACCENTED
            .iter()
            .find(|(letters, _)| letters.contains(c))
            .map_or(c, |(_, base)| *base),
    };
    match ascii_slot(c as u32) {
        Some(i) => Some(metrics.ascii[i]),
        None => metrics.extra.iter().find(|(e, _)| *e == c).map(|(_, w)| *w),
    }
}

/// Symbol codes above 126 that show up in running text.
const SYMBOL_HIGH: &[(u8, u16)] = &[
    (0xA3, 549), (0xA5, 713), (0xAC, 987), (0xAE, 987), (0xB0, 400), (0xB1, 549),
    (0xB3, 549), (0xB4, 549), (0xB7, 460), (0xB8, 549), (0xB9, 549), (0xBB, 549),
    (0xBC, 1000), (0xD7, 250), (0xE0, 494),
];

/// Helvetica, by character for codes 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

const HELVETICA_EXTRA: &[(char, u16)] = &[
    ('‘', 222), ('’', 222), ('‚', 222), ('“', 333), ('”', 333), ('„', 333),
    ('–', 556), ('—', 1000), ('•', 350), ('…', 1000), ('†', 556), ('‡', 556),
    ('‰', 1000), ('™', 1000), ('©', 737), ('®', 737), ('°', 400), ('§', 556),
    ('¶', 537), ('£', 556), ('¥', 556), ('¢', 556), ('¤', 556), ('«', 556),
    ('»', 556), ('‹', 333), ('›', 333), ('ß', 611), ('Æ', 1000), ('æ', 889),
    ('Œ', 1000), ('œ', 944), ('Ø', 778), ('ø', 611), ('¡', 333), ('¿', 611),
    ('±', 584), ('×', 584), ('÷', 584), ('¬', 584), ('µ', 556), ('·', 278),
    ('¦', 260), ('ª', 370), ('º', 365), ('½', 834), ('¼', 834), ('¾', 834),
    ('¹', 333), ('²', 333), ('³', 333), ('Ð', 722), ('ð', 556), ('Þ', 667),
    ('þ', 556), ('ı', 278), ('ƒ', 556), ('ﬁ', 500), ('ﬂ', 500), ('´', 333),
    ('¨', 333), ('¯', 333), ('¸', 333),
];

/// Helvetica-Bold, laid out like [`HELVETICA_WIDTHS`].
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

const HELVETICA_BOLD_EXTRA: &[(char, u16)] = &[
    ('‘', 278), ('’', 278), ('‚', 278), ('“', 500), ('”', 500), ('„', 500),
    ('–', 556), ('—', 1000), ('•', 350), ('…', 1000), ('†', 556), ('‡', 556),
    ('‰', 1000), ('™', 1000), ('©', 737), ('®', 737), ('°', 400), ('§', 556),
    ('¶', 556), ('£', 556), ('¥', 556), ('¢', 556), ('¤', 556), ('«', 556),
    ('»', 556), ('‹', 333), ('›', 333), ('ß', 611), ('Æ', 1000), ('æ', 889),
    ('Œ', 1000), ('œ', 944), ('Ø', 778), ('ø', 611), ('¡', 333), ('¿', 611),
    ('±', 584), ('×', 584), ('÷', 584), ('¬', 584), ('µ', 611), ('·', 278),
    ('¦', 280), ('ª', 370), ('º', 365), ('½', 834), ('¼', 834), ('¾', 834),
    ('¹', 333), ('²', 333), ('³', 333), ('Ð', 722), ('ð', 611), ('Þ', 667),
    ('þ', 611), ('ı', 278), ('ƒ', 556), ('ﬁ', 611), ('ﬂ', 611), ('´', 333),
    ('¨', 333), ('¯', 333), ('¸', 333),
];

/// Times-Roman.
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // 32-47
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, // 48-63
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, // 64-79
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, // 80-95
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, // 96-111
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, // 112-126
];

const TIMES_ROMAN_EXTRA: &[(char, u16)] = &[
    ('‘', 333), ('’', 333), ('‚', 333), ('“', 444), ('”', 444), ('„', 444),
    ('–', 500), ('—', 1000), ('•', 350), ('…', 1000), ('†', 500), ('‡', 500),
    ('‰', 1000), ('™', 980), ('©', 760), ('®', 760), ('°', 400), ('§', 500),
    ('¶', 453), ('£', 500), ('¥', 500), ('¢', 500), ('¤', 500), ('«', 500),
    ('»', 500), ('‹', 333), ('›', 333), ('ß', 500), ('Æ', 889), ('æ', 667),
    ('Œ', 889), ('œ', 722), ('Ø', 722), ('ø', 500), ('¡', 333), ('¿', 444),
    ('±', 564), ('×', 564), ('÷', 564), ('¬', 564), ('µ', 500), ('·', 250),
    ('¦', 200), ('ª', 276), ('º', 310), ('½', 750), ('¼', 750), ('¾', 750),
    ('¹', 300), ('²', 300), ('³', 300), ('Ð', 722), ('ð', 500), ('Þ', 556),
    ('þ', 500), ('ı', 278), ('ƒ', 500), ('ﬁ', 556), ('ﬂ', 556), ('´', 333),
    ('¨', 333), ('¯', 333), ('¸', 333),
];

/// Times-Bold.
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278, // 32-47
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500, // 48-63
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778, // 64-79
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500, // 80-95
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500, // 96-111
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520, // 112-126
];

const TIMES_BOLD_EXTRA: &[(char, u16)] = &[
    ('‘', 333), ('’', 333), ('‚', 333), ('“', 500), ('”', 500), ('„', 500),
    ('–', 500), ('—', 1000), ('•', 350), ('…', 1000), ('†', 500), ('‡', 500),
    ('‰', 1000), ('™', 1000), ('©', 747), ('®', 747), ('°', 400), ('§', 500),
    ('¶', 540), ('£', 500), ('¥', 500), ('¢', 500), ('¤', 500), ('«', 500),
    ('»', 500), ('‹', 333), ('›', 333), ('ß', 556), ('Æ', 1000), ('æ', 722),
    ('Œ', 1000), ('œ', 722), ('Ø', 778), ('ø', 500), ('¡', 333), ('¿', 500),
    ('±', 570), ('×', 570), ('÷', 570), ('¬', 570), ('µ', 556), ('·', 250),
    ('¦', 220), ('ª', 300), ('º', 330), ('½', 750), ('¼', 750), ('¾', 750),
    ('¹', 300), ('²', 300), ('³', 300), ('Ð', 722), ('ð', 500), ('Þ', 611),
    ('þ', 556), ('ı', 278), ('ƒ', 500), ('ﬁ', 556), ('ﬂ', 556), ('´', 333),
    ('¨', 333), ('¯', 333), ('¸', 333),
];

/// Times-Italic.
const TIMES_ITALIC_WIDTHS: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278, // 32-47
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500, // 48-63
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722, // 64-79
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500, // 80-95
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500, // 96-111
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541, // 112-126
];

const TIMES_ITALIC_EXTRA: &[(char, u16)] = &[
    ('‘', 333), ('’', 333), ('‚', 333), ('“', 556), ('”', 556), ('„', 556),
    ('–', 500), ('—', 889), ('•', 350), ('…', 889), ('†', 500), ('‡', 500),
    ('‰', 1000), ('™', 980), ('©', 760), ('®', 760), ('°', 400), ('§', 500),
    ('¶', 523), ('£', 500), ('¥', 500), ('¢', 500), ('¤', 500), ('«', 500),
    ('»', 500), ('‹', 333), ('›', 333), ('ß', 500), ('Æ', 889), ('æ', 667),
    ('Œ', 944), ('œ', 667), ('Ø', 722), ('ø', 500), ('¡', 389), ('¿', 500),
    ('±', 675), ('×', 675), ('÷', 675), ('¬', 675), ('µ', 500), ('·', 250),
    ('¦', 275), ('ª', 276), ('º', 310), ('½', 750), ('¼', 750), ('¾', 750),
    ('¹', 300), ('²', 300), ('³', 300), ('Ð', 722), ('ð', 500), ('Þ', 611),
    ('þ', 500), ('ı', 278), ('ƒ', 500), ('ﬁ', 500), ('ﬂ', 500), ('´', 333),
    ('¨', 333), ('¯', 333), ('¸', 333),
];

/// Times-BoldItalic.
const TIMES_BOLD_ITALIC_WIDTHS: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278, // 32-47
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500, // 48-63
    832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722, // 64-79
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500, // 80-95
    333, 500, 556, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500, // 96-111
    500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570, // 112-126
];

const TIMES_BOLD_ITALIC_EXTRA: &[(char, u16)] = &[
    ('‘', 333), ('’', 333), ('‚', 333), ('“', 500), ('”', 500), ('„', 500),
    ('–', 500), ('—', 1000), ('•', 350), ('…', 1000), ('†', 500), ('‡', 500),
    ('‰', 1000), ('™', 1000), ('©', 747), ('®', 747), ('°', 400), ('§', 500),
    ('¶', 500), ('£', 500), ('¥', 500), ('¢', 500), ('¤', 500), ('«', 500),
    ('»', 500), ('‹', 333), ('›', 333), ('ß', 500), ('Æ', 944), ('æ', 722),
    ('Œ', 944), ('œ', 722), ('Ø', 722), ('ø', 500), ('¡', 389), ('¿', 500),
    ('±', 570), ('×', 570), ('÷', 570), ('¬', 606), ('µ', 576), ('·', 250),
    ('¦', 220), ('ª', 266), ('º', 300), ('½', 750), ('¼', 750), ('¾', 750),
    ('¹', 300), ('²', 300), ('³', 300), ('Ð', 722), ('ð', 500), ('Þ', 611),
    ('þ', 500), ('ı', 278), ('ƒ', 500), ('ﬁ', 556), ('ﬂ', 556), ('´', 333),
    ('¨', 333), ('¯', 333), ('¸', 333),
];

/// Symbol, by code (the font's built-in encoding).
const SYMBOL_WIDTHS: [u16; 95] = [
    250, 333, 713, 500, 549, 833, 778, 439, 333, 333, 500, 549, 250, 549, 250, 278, // 32-47
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 549, 549, 549, 444, // 48-63
    549, 722, 667, 722, 612, 611, 763, 603, 722, 333, 631, 722, 686, 889, 722, 722, // 64-79
    768, 741, 556, 592, 611, 690, 439, 768, 645, 795, 611, 333, 863, 333, 658, 500, // 80-95
    500, 631, 549, 549, 494, 439, 521, 411, 603, 329, 603, 549, 549, 576, 521, 549, // 96-111
    549, 521, 549, 603, 439, 576, 713, 686, 493, 686, 494, 480, 200, 480, 549, // 112-126
];

/// ZapfDingbats, by code.
const ZAPF_DINGBATS_WIDTHS: [u16; 95] = [
    278, 974, 961, 974, 980, 719, 789, 790, 791, 690, 960, 939, 549, 855, 911, 933, // 32-47
    911, 945, 974, 755, 846, 762, 761, 571, 677, 763, 760, 759, 754, 494, 552, 537, // 48-63
    577, 692, 786, 788, 788, 790, 793, 794, 816, 823, 789, 841, 823, 833, 816, 831, // 64-79
    923, 744, 723, 749, 790, 792, 695, 776, 768, 792, 759, 707, 708, 682, 701, 826, // 80-95
    815, 789, 789, 707, 687, 696, 689, 786, 787, 713, 791, 785, 791, 873, 761, 762, // 96-111
    762, 759, 759, 892, 892, 788, 784, 438, 138, 277, 415, 392, 392, 668, 668, // 112-126
];
