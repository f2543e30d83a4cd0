//! Write a blank certificate template to `data/certificate.pdf`.
//!
//! Labels and checkboxes line up with the anchors the generator draws at.
//! Run with `cargo run --example create_template`.

use anyhow::{Context, Result};
use printpdf::{BuiltinFont, Line, Mm, PdfDocument, Point};
use std::fs::{self, File};
use std::io::BufWriter;

/// Template coordinates are in points
fn pt(value: f32) -> Mm {
    Mm(value * 25.4 / 72.0)
}

const REASONS: [(&str, f32); 7] = [
    ("Deplacements entre le domicile et le lieu d'exercice de l'activite professionnelle", 527.0),
    ("Deplacements pour effectuer des achats de fournitures necessaires", 478.0),
    ("Consultations et soins ne pouvant etre assures a distance", 436.0),
    ("Deplacements pour motif familial imperieux", 400.0),
    ("Deplacements brefs, dans la limite d'une heure quotidienne", 345.0),
    ("Convocation judiciaire ou administrative", 298.0),
    ("Participation a des missions d'interet general", 260.0),
];

fn main() -> Result<()> {
    let (doc, page1, layer1) = PdfDocument::new("Attestation de deplacement", Mm(210.0), Mm(297.0), "Layer 1");
    let current_layer = doc.get_page(page1).get_layer(layer1);

    let font_bold_ref = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_ref = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    current_layer.use_text("ATTESTATION DE DEPLACEMENT DEROGATOIRE", 16.0, pt(120.0), pt(760.0), &font_bold_ref);

    current_layer.use_text("Je soussigne(e),", 11.0, pt(47.0), pt(710.0), &font_ref);
    current_layer.use_text("Mme/M. :", 11.0, pt(47.0), pt(686.0), &font_ref);
    current_layer.use_text("Ne(e) le :", 11.0, pt(47.0), pt(661.0), &font_ref);
    current_layer.use_text("A :", 11.0, pt(47.0), pt(638.0), &font_ref);
    current_layer.use_text("Demeurant :", 11.0, pt(47.0), pt(613.0), &font_ref);
    current_layer.use_text(
        "certifie que mon deplacement est lie au motif suivant :",
        11.0,
        pt(47.0),
        pt(570.0),
        &font_ref,
    );

    for (label, y) in REASONS {
        let checkbox = Line {
            points: vec![
                (Point::new(pt(72.0), pt(y - 3.0)), false),
                (Point::new(pt(90.0), pt(y - 3.0)), false),
                (Point::new(pt(90.0), pt(y + 15.0)), false),
                (Point::new(pt(72.0), pt(y + 15.0)), false),
            ],
            is_closed: true,
        };
        current_layer.add_line(checkbox);
        current_layer.use_text(label, 9.0, pt(100.0), pt(y + 2.0), &font_ref);
    }

    current_layer.use_text("Fait a :", 11.0, pt(72.0), pt(226.0), &font_ref);
    current_layer.use_text("Le :", 11.0, pt(72.0), pt(200.0), &font_ref);
    current_layer.use_text("a", 11.0, pt(190.0), pt(201.0), &font_ref);
    current_layer.use_text("h", 11.0, pt(214.0), pt(201.0), &font_ref);

    fs::create_dir_all("data").context("Failed to create data directory")?;
    let file = File::create("data/certificate.pdf").context("Failed to create data/certificate.pdf")?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer)?;
    println!("Created data/certificate.pdf");
    Ok(())
}
