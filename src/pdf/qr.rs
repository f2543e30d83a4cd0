//! QR code rasterization and embedding.

use image::{ImageBuffer, Luma};
use lopdf::{Dictionary, Document, ObjectId, Stream};
use qrcode::{EcLevel, QrCode};
use std::io::Write;

use crate::error::{CertificateError, Result};

/// Pixels per QR module
const MODULE_PIXELS: u32 = 8;

/// Light border around the code, in modules
const QUIET_ZONE_MODULES: u32 = 1;

/// Error correction level: recovers roughly 15% damage
const EC_LEVEL: EcLevel = EcLevel::M;

/// Generate a QR code for `data` as a grayscale image with a one-module
/// light border
pub fn generate_qr_code(data: &str) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
    let qr_code = QrCode::with_error_correction_level(data.as_bytes(), EC_LEVEL)
        .map_err(|e| CertificateError::QrGeneration(Box::new(e)))?;

    // Render QR code with light=255 (white) and dark=0 (black)
    let modules = qr_code
        .render::<Luma<u8>>()
        .quiet_zone(false)
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .light_color(Luma([255u8]))
        .dark_color(Luma([0u8]))
        .build();

    let margin = MODULE_PIXELS * QUIET_ZONE_MODULES;
    let mut canvas = ImageBuffer::from_pixel(
        modules.width() + 2 * margin,
        modules.height() + 2 * margin,
        Luma([255u8]),
    );
    image::imageops::overlay(&mut canvas, &modules, i64::from(margin), i64::from(margin));
    Ok(canvas)
}

/// Compress data using zlib/flate2
pub fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Render `payload` as a QR code and add it to `doc` as one image XObject.
///
/// The returned object can be drawn any number of times at any scale.
pub fn embed_qr_image(doc: &mut Document, payload: &str) -> Result<ObjectId> {
    let qr_img = generate_qr_code(payload)?;

    // One byte per pixel, DeviceGray
    let compressed_bytes = compress_data(qr_img.as_raw())
        .map_err(|e| CertificateError::QrGeneration(Box::new(e)))?;

    let mut img_dict = Dictionary::new();
    img_dict.set("Type", "XObject");
    img_dict.set("Subtype", "Image");
    img_dict.set("Width", i64::from(qr_img.width()));
    img_dict.set("Height", i64::from(qr_img.height()));
    img_dict.set("ColorSpace", "DeviceGray");
    img_dict.set("BitsPerComponent", 8_i64);
    img_dict.set("Interpolate", false);
    img_dict.set("Filter", "FlateDecode");

    // Already compressed; keep lopdf from compressing it again on save
    let img_stream = Stream::new(img_dict, compressed_bytes).with_compression(false);
    Ok(doc.add_object(img_stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    #[test]
    fn test_generate_qr_code_has_light_border() {
        let img = generate_qr_code("Motifs: sport").unwrap();
        assert_eq!(img.width(), img.height());
        assert_eq!(img.width() % MODULE_PIXELS, 0);
        // Border is light, the finder pattern corner just inside is dark
        assert_eq!(img.get_pixel(0, 0), &Luma([255u8]));
        assert_eq!(img.get_pixel(MODULE_PIXELS, MODULE_PIXELS), &Luma([0u8]));
    }

    #[test]
    fn test_generate_qr_code_rejects_oversized_payload() {
        let payload = "x".repeat(5000);
        assert!(matches!(
            generate_qr_code(&payload),
            Err(CertificateError::QrGeneration(_))
        ));
    }

    #[test]
    fn test_embed_qr_image() {
        let mut doc = Document::with_version("1.5");
        let id = embed_qr_image(&mut doc, "Nom: Dupont").unwrap();

        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        let width = stream.dict.get(b"Width").unwrap().as_i64().unwrap();
        let height = stream.dict.get(b"Height").unwrap().as_i64().unwrap();
        assert_eq!(width, height);
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");

        let mut raw = Vec::new();
        ZlibDecoder::new(stream.content.as_slice())
            .read_to_end(&mut raw)
            .unwrap();
        assert_eq!(raw.len() as i64, width * height);
    }
}
