//! PDF content stream generation for the certificate overlay.
//!
//! This module provides:
//! - Text placement with the standard Helvetica font
//! - Image XObject placement
//! - String encoding for PDF (WinAnsi with octal escapes)

use lopdf::{Dictionary, Object, ObjectId};

use super::fonts::encode_win_ansi;
use crate::layout::{ImageBox, LayoutBox};

/// Builder for a content stream and the XObjects it references
pub struct ContentBuilder {
    pub content_parts: Vec<String>,
    pub xobjects: Dictionary,
    font_name: String,
}

impl ContentBuilder {
    /// Create a new ContentBuilder drawing text with the font resource `font_name`
    pub fn new(font_name: &str) -> Self {
        Self {
            content_parts: Vec::new(),
            xobjects: Dictionary::new(),
            font_name: font_name.to_string(),
        }
    }

    /// Draw `value` at the anchor of `field` with its default size
    pub fn add_field(&mut self, value: &str, field: &LayoutBox) {
        self.add_text(value, field.x, field.y, field.default_size);
    }

    /// Draw `value` with its baseline starting at (`x`, `y`)
    pub fn add_text(&mut self, value: &str, x: f64, y: f64, font_size: f64) {
        let escaped_value = escape_pdf_string(&encode_win_ansi(value));
        self.content_parts.push(format!(
            "q BT 0 g /{} {} Tf {} {} Td ({}) Tj ET Q ",
            self.font_name,
            pdf_number(font_size),
            pdf_number(x),
            pdf_number(y),
            escaped_value
        ));
    }

    /// Draw the image XObject `image_id` scaled into `placement`
    pub fn add_image(&mut self, image_name: &str, image_id: ObjectId, placement: &ImageBox) {
        self.xobjects
            .set(image_name.to_string(), Object::Reference(image_id));
        self.content_parts.push(format!(
            "q {} 0 0 {} {} {} cm /{} Do Q ",
            pdf_number(placement.width),
            pdf_number(placement.height),
            pdf_number(placement.x),
            pdf_number(placement.y),
            image_name
        ));
    }

    /// Build the final content bytes
    pub fn build_content_bytes(&self) -> Vec<u8> {
        self.content_parts.join("").into_bytes()
    }
}

/// Escape encoded bytes for a PDF literal string
///
/// Bytes outside printable ASCII are written as octal escapes so the
/// content stream stays plain ASCII.
pub fn escape_pdf_string(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'(' => result.push_str(r"\("),
            b')' => result.push_str(r"\)"),
            b'\\' => result.push_str(r"\\"),
            b'\n' => result.push_str(r"\n"),
            b'\r' => result.push_str(r"\r"),
            b'\t' => result.push_str(r"\t"),
            0x20..=0x7E => result.push(b as char),
            _ => result.push_str(&format!("\\{:03o}", b)),
        }
    }
    result
}

/// Format a number for a content stream: at most 3 decimals, no trailing zeros
pub fn pdf_number(value: f64) -> String {
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        _ => trimmed.to_string(),
    }
}
