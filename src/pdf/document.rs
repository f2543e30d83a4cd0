use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::content::ContentBuilder;
use super::fonts::{Helvetica, create_font, ideal_font_size};
use super::qr::embed_qr_image;
use super::resources::{inherited_attribute, resource_names, unique_name, update_page_resources};
use crate::config::Profile;
use crate::error::{CertificateError, RenderWarning, Result};
use crate::layout::{self, CHECKMARK, Reason};
use crate::payload::{build_payload, format_date, format_time};

/// Resource name prefixes for what we add to the template
const FONT_RESOURCE: &str = "CertHelv";
const QR_RESOURCE: &str = "CertQr";

/// A filled certificate, ready to be written out
#[derive(Debug)]
pub struct Certificate {
    pub document: Vec<u8>,
    /// Exact text encoded in the QR code
    pub payload: String,
    pub warnings: Vec<RenderWarning>,
}

/// Fill `template` for `profile` and `reasons`, stamped with the current time
pub fn generate_certificate(template: &[u8], profile: &Profile, reasons: &str) -> Result<Certificate> {
    generate_certificate_at(template, profile, reasons, Local::now().naive_local())
}

/// Fill `template` with a fixed generation timestamp
pub fn generate_certificate_at(
    template: &[u8],
    profile: &Profile,
    reasons: &str,
    generated_at: NaiveDateTime,
) -> Result<Certificate> {
    let creation_date = format_date(&generated_at);
    let creation_hour = format_time(&generated_at);

    let mut doc = load_template_document(template)?;
    let first_page_id = *doc
        .get_pages()
        .values()
        .next()
        .ok_or_else(|| CertificateError::template("template has no pages"))?;
    let media_box = page_media_box(&doc, first_page_id)?;
    let (page_width, page_height) = media_box_size(&media_box)?;
    debug!("Template page 1 is {}x{}", page_width, page_height);
    debug!(
        "Outing on {} at {}",
        profile.datesortie, profile.heuresortie.raw
    );

    let font_id = create_font(&mut doc);
    let font_name = unique_name(FONT_RESOURCE, &resource_names(&doc, first_page_id, b"Font"));
    let qr_name = unique_name(QR_RESOURCE, &resource_names(&doc, first_page_id, b"XObject"));

    let mut warnings = Vec::new();
    let mut page1 = ContentBuilder::new(&font_name);

    page1.add_field(&profile.full_name(), &layout::FULL_NAME);
    page1.add_field(&profile.birthday, &layout::BIRTHDAY);
    page1.add_field(&profile.lieunaissance, &layout::BIRTHPLACE);
    page1.add_field(&profile.full_address(), &layout::ADDRESS);

    for reason in Reason::selected_in(reasons) {
        debug!("Checking reason {}", reason.token());
        page1.add_field(CHECKMARK, &reason.checkbox());
    }

    let town_box = layout::TOWN;
    let town_size = town_box
        .max_width
        .and_then(|max_width| {
            ideal_font_size(
                &Helvetica,
                &profile.town,
                max_width,
                town_box.min_size,
                town_box.default_size,
            )
        })
        .unwrap_or_else(|| {
            let warning = RenderWarning {
                field: "town",
                text: profile.town.clone(),
                size: town_box.min_size,
            };
            warn!("{}", warning);
            warnings.push(warning);
            town_box.min_size
        });
    page1.add_text(&profile.town, town_box.x, town_box.y, town_size);

    // No outing time is stamped without a stated reason
    if !reasons.is_empty() {
        page1.add_field(&profile.datesortie, &layout::OUTING_DATE);
        page1.add_field(&profile.heuresortie.hour, &layout::OUTING_HOUR);
        page1.add_field(&profile.heuresortie.minute, &layout::OUTING_MINUTE);
    }

    page1.add_field("Date de création:", &layout::CREATED_LABEL);
    page1.add_field(
        &format!("{} à {}", creation_date, creation_hour),
        &layout::CREATED_VALUE,
    );

    let payload = build_payload(profile, reasons, &generated_at);
    let qr_id = embed_qr_image(&mut doc, &payload)?;
    page1.add_image(&qr_name, qr_id, &layout::qr_thumbnail(page_width));

    isolate_page_contents(&mut doc, first_page_id)?;
    doc.add_page_contents(first_page_id, page1.build_content_bytes())?;
    let mut fonts = Dictionary::new();
    fonts.set(font_name.clone(), Object::Reference(font_id));
    update_page_resources(&mut doc, first_page_id, &fonts, &page1.xobjects)?;

    let mut page2 = ContentBuilder::new(&font_name);
    page2.add_image(&qr_name, qr_id, &layout::qr_full_page(page_height));
    append_page(&mut doc, media_box, &page2)?;

    let mut document = Vec::new();
    doc.save_to(&mut document).map_err(|e| CertificateError::Serialize(e.into()))?;
    info!("Generated certificate ({} bytes)", document.len());

    Ok(Certificate {
        document,
        payload,
        warnings,
    })
}

fn load_template_document(template: &[u8]) -> Result<Document> {
    let doc = Document::load_mem(template).map_err(|e| CertificateError::TemplateLoad {
        reason: "not a readable PDF document".to_string(),
        source: Some(e),
    })?;
    if doc.is_encrypted() {
        return Err(CertificateError::template("template is encrypted"));
    }
    Ok(doc)
}

fn page_media_box(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>> {
    let media_box = match inherited_attribute(doc, page_id, b"MediaBox") {
        Some(Object::Reference(id)) => doc.get_object(id).ok().cloned(),
        other => other,
    };
    match media_box {
        Some(Object::Array(values)) if values.len() == 4 => Ok(values),
        _ => Err(CertificateError::template("page 1 has no valid MediaBox")),
    }
}

fn media_box_size(media_box: &[Object]) -> Result<(f64, f64)> {
    let coords = media_box
        .iter()
        .map(|v| v.as_float().map(f64::from))
        .collect::<lopdf::Result<Vec<f64>>>()
        .map_err(|e| CertificateError::TemplateLoad {
            reason: "MediaBox is not numeric".to_string(),
            source: Some(e),
        })?;
    Ok(((coords[2] - coords[0]).abs(), (coords[3] - coords[1]).abs()))
}

/// Wrap the page's existing content streams in `q`/`Q`.
///
/// A template may end its content with a transform, colour or text state
/// still set; the overlay drawn after it must start from the default state.
fn isolate_page_contents(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let existing = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Array(streams)) => streams.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(streams)) => streams.clone(),
            _ => vec![Object::Reference(*id)],
        },
        _ => Vec::new(),
    };
    if existing.is_empty() {
        return Ok(());
    }

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(restore_id));
    doc.get_dictionary_mut(page_id)?.set("Contents", contents);
    Ok(())
}

/// Append a page with `content` at the end of the root page tree
fn append_page(doc: &mut Document, media_box: Vec<Object>, content: &ContentBuilder) -> Result<ObjectId> {
    let pages_id = doc.catalog()?.get(b"Pages")?.as_reference()?;

    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.build_content_bytes()));

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(content.xobjects.clone()));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", "Page");
    page_dict.set("Parent", Object::Reference(pages_id));
    page_dict.set("MediaBox", media_box);
    page_dict.set("Resources", Object::Dictionary(resources));
    page_dict.set("Contents", Object::Reference(content_id));
    let page_id = doc.add_object(Object::Dictionary(page_dict));

    let pages = doc.get_dictionary_mut(pages_id)?;
    let mut kids = pages
        .get(b"Kids")
        .and_then(Object::as_array)
        .cloned()
        .unwrap_or_default();
    kids.push(Object::Reference(page_id));
    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0) + 1;
    pages.set("Kids", kids);
    pages.set("Count", count);

    Ok(page_id)
}

#[cfg(test)]
pub(crate) mod test_support {
    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Document, Object, Stream};

    fn title_operations() -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 16.into()]),
            Operation::new("Td", vec![120.into(), 760.into()]),
            Operation::new("Tj", vec![Object::string_literal("ATTESTATION")]),
            Operation::new("ET", vec![]),
        ]
    }

    /// A one-page A4 template whose MediaBox is inherited from the page tree
    /// and whose page already uses a font resource.
    pub fn sample_template() -> Vec<u8> {
        template_with_operations(title_operations())
    }

    /// Like [`sample_template`], but the page content ends with a half-scale
    /// transform and a red fill colour that are never restored.
    pub fn unbalanced_template() -> Vec<u8> {
        let mut operations = vec![
            Operation::new(
                "cm",
                vec![Object::Real(0.5), 0.into(), 0.into(), Object::Real(0.5), 0.into(), 0.into()],
            ),
            Operation::new("rg", vec![1.into(), 0.into(), 0.into()]),
        ];
        operations.extend(title_operations());
        template_with_operations(operations)
    }

    fn template_with_operations(operations: Vec<Operation>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut font = Dictionary::new();
        font.set("Type", "Font");
        font.set("Subtype", "Type1");
        font.set("BaseFont", "Courier");
        let font_id = doc.add_object(font);

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));

        let mut page = Dictionary::new();
        page.set("Type", "Page");
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", Object::Reference(content_id));
        page.set("Resources", Object::Dictionary(resources));
        let page_id = doc.add_object(page);

        let mut pages = Dictionary::new();
        pages.set("Type", "Pages");
        pages.set("Kids", vec![Object::Reference(page_id)]);
        pages.set("Count", 1_i64);
        let media_box: Vec<Object> = vec![0.into(), 0.into(), 595.into(), 842.into()];
        pages.set("MediaBox", media_box);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", "Catalog");
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}
