use lopdf::{Dictionary, Document, Object, ObjectId};

/// Anything that can tell how wide a string is at a given font size.
///
/// Implementations must not get wider as the size shrinks; the fitter
/// relies on it.
pub trait TextMeasure {
    fn width_of_text_at_size(&self, text: &str, size: f64) -> f64;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, f64) -> f64,
{
    fn width_of_text_at_size(&self, text: &str, size: f64) -> f64 {
        self(text, size)
    }
}

/// Largest size in `min_size..=default_size`, stepping down by one point,
/// at which `text` fits in `max_width`.
///
/// Returns `None` when the text overflows even at `min_size`.
pub fn ideal_font_size<M>(
    font: &M,
    text: &str,
    max_width: f64,
    min_size: f64,
    default_size: f64,
) -> Option<f64>
where
    M: TextMeasure + ?Sized,
{
    let mut size = default_size;
    let mut width = font.width_of_text_at_size(text, size);
    while width > max_width && size > min_size {
        size = (size - 1.0).max(min_size);
        width = font.width_of_text_at_size(text, size);
    }
    (width <= max_width).then_some(size)
}

/// The standard Type1 Helvetica font drawn with WinAnsiEncoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    pub const BASE_FONT: &'static str = "Helvetica";

    /// Advance width of a WinAnsi code in 1/1000 em
    pub fn glyph_width(code: u8) -> u16 {
        match code {
            32..=255 => HELVETICA_WIDTHS[(code - 32) as usize],
            _ => 0,
        }
    }
}

impl TextMeasure for Helvetica {
    fn width_of_text_at_size(&self, text: &str, size: f64) -> f64 {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|code| u32::from(Helvetica::glyph_width(code)))
            .sum();
        f64::from(units) * size / 1000.0
    }
}

/// Add the Helvetica font dictionary to `doc`
pub fn create_font(doc: &mut Document) -> ObjectId {
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", "Font");
    font_dict.set("Subtype", "Type1");
    font_dict.set("BaseFont", Helvetica::BASE_FONT);
    font_dict.set("Encoding", "WinAnsiEncoding");
    doc.add_object(Object::Dictionary(font_dict))
}

/// WinAnsi code for `c`, if the encoding has one
pub fn win_ansi_code(c: char) -> Option<u8> {
    let code = match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Encode text as WinAnsi bytes, replacing unsupported characters with `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| win_ansi_code(c).unwrap_or(b'?')).collect()
}

/// Helvetica AFM widths for WinAnsi codes 32..=255
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 224] = [
    // 32
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 48
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    // 64
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    // 80
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    // 96
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    // 112
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 0,
    // 128
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    // 144
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    // 160
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    // 176
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    // 192
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    // 208
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    // 224
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    // 240
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];
