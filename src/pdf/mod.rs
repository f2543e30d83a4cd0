//! Certificate rendering on top of the PDF template.

mod content;
mod document;
mod fonts;
mod qr;
mod resources;

pub use document::generate_certificate;

#[cfg(test)]
pub(crate) use document::test_support;
