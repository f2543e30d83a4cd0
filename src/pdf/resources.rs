use lopdf::{Dictionary, Document, Object, ObjectId};

/// Deepest page tree walked when resolving inherited attributes
const INHERITABLE_DEPTH: usize = 32;

/// Look up `key` on a page, walking up the page tree if needed
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node_id = page_id;
    for _ in 0..INHERITABLE_DEPTH {
        let node = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

/// Resolve an object that is either an inline dictionary or a reference to one
fn resolve_dictionary(doc: &Document, object: &Object) -> Option<Dictionary> {
    match object {
        Object::Dictionary(d) => Some(d.clone()),
        Object::Reference(id) => doc.get_dictionary(*id).ok().cloned(),
        _ => None,
    }
}

/// Add fonts and XObjects to a page's resources
///
/// This function handles the pattern of:
/// 1. Getting the effective resource dictionary (own, referenced or inherited)
/// 2. Merging our font and XObject entries into copies of its sub-dictionaries
/// 3. Storing the merged dictionary directly on the page
///
/// Shared resource objects are never modified, so other pages that use them
/// keep their resources unchanged.
pub fn update_page_resources(
    doc: &mut Document,
    page_id: ObjectId,
    fonts: &Dictionary,
    xobject_dict: &Dictionary,
) -> lopdf::Result<()> {
    let mut resources = inherited_attribute(doc, page_id, b"Resources")
        .and_then(|r| resolve_dictionary(doc, &r))
        .unwrap_or_default();

    for (category, entries) in [(&b"Font"[..], fonts), (&b"XObject"[..], xobject_dict)] {
        if entries.is_empty() {
            continue;
        }
        let mut merged = resources
            .get(category)
            .ok()
            .and_then(|existing| resolve_dictionary(doc, existing))
            .unwrap_or_default();
        for (key, value) in entries.iter() {
            merged.set(key.clone(), value.clone());
        }
        resources.set(category.to_vec(), Object::Dictionary(merged));
    }

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Names already used under `category` in a page's resources
pub fn resource_names(doc: &Document, page_id: ObjectId, category: &[u8]) -> Vec<Vec<u8>> {
    inherited_attribute(doc, page_id, b"Resources")
        .and_then(|r| resolve_dictionary(doc, &r))
        .and_then(|res| res.get(category).ok().and_then(|c| resolve_dictionary(doc, c)))
        .map(|dict| dict.iter().map(|(key, _)| key.clone()).collect())
        .unwrap_or_default()
}

/// `base`, or `base` with a numeric suffix, whichever is not in `taken`
pub fn unique_name(base: &str, taken: &[Vec<u8>]) -> String {
    let mut name = base.to_string();
    let mut suffix = 1;
    while taken.iter().any(|t| t.as_slice() == name.as_bytes()) {
        name = format!("{}{}", base, suffix);
        suffix += 1;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_tree(page_resources: Option<Object>, parent_resources: Option<Object>) -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut page = Dictionary::new();
        page.set("Type", "Page");
        page.set("Parent", pages_id);
        if let Some(res) = page_resources {
            page.set("Resources", res);
        }
        let page_id = doc.add_object(page);

        let mut pages = Dictionary::new();
        pages.set("Type", "Pages");
        pages.set("Kids", vec![Object::Reference(page_id)]);
        pages.set("Count", 1_i64);
        if let Some(res) = parent_resources {
            pages.set("Resources", res);
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        (doc, page_id)
    }

    fn font_entry(name: &str, id: ObjectId) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set(name, Object::Reference(id));
        dict
    }

    fn page_fonts(doc: &Document, page_id: ObjectId) -> Dictionary {
        let page = doc.get_dictionary(page_id).unwrap();
        let res = page.get(b"Resources").unwrap().as_dict().unwrap();
        res.get(b"Font").unwrap().as_dict().unwrap().clone()
    }

    #[test]
    fn test_merges_into_inline_resources() {
        let mut existing = Dictionary::new();
        existing.set("Font", font_entry("F1", (90, 0)));
        let (mut doc, page_id) = page_tree(Some(Object::Dictionary(existing)), None);

        update_page_resources(&mut doc, page_id, &font_entry("CertHelv", (91, 0)), &Dictionary::new())
            .unwrap();

        let fonts = page_fonts(&doc, page_id);
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(b"CertHelv"));
    }

    #[test]
    fn test_copies_inherited_resources_to_page() {
        let mut inherited = Dictionary::new();
        inherited.set("Font", font_entry("F1", (90, 0)));
        let (mut doc, page_id) = page_tree(None, Some(Object::Dictionary(inherited)));

        update_page_resources(
            &mut doc,
            page_id,
            &Dictionary::new(),
            &font_entry("CertQr", (92, 0)),
        )
        .unwrap();

        let page = doc.get_dictionary(page_id).unwrap();
        let res = page.get(b"Resources").unwrap().as_dict().unwrap();
        assert!(res.get(b"Font").unwrap().as_dict().unwrap().has(b"F1"));
        assert!(res.get(b"XObject").unwrap().as_dict().unwrap().has(b"CertQr"));
    }

    #[test]
    fn test_shared_resources_are_not_modified() {
        let (mut doc, page_id) = page_tree(None, None);
        let mut shared = Dictionary::new();
        shared.set("Font", font_entry("F1", (90, 0)));
        let shared_id = doc.add_object(shared);
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("Resources", Object::Reference(shared_id));

        update_page_resources(&mut doc, page_id, &font_entry("CertHelv", (91, 0)), &Dictionary::new())
            .unwrap();

        let shared = doc.get_dictionary(shared_id).unwrap();
        let shared_fonts = shared.get(b"Font").unwrap().as_dict().unwrap();
        assert!(!shared_fonts.has(b"CertHelv"));
        assert!(page_fonts(&doc, page_id).has(b"CertHelv"));
    }

    #[test]
    fn test_unique_name() {
        let taken = vec![b"CertHelv".to_vec(), b"CertHelv1".to_vec()];
        assert_eq!(unique_name("CertHelv", &taken), "CertHelv2");
        assert_eq!(unique_name("CertQr", &taken), "CertQr");
    }

    #[test]
    fn test_resource_names() {
        let mut existing = Dictionary::new();
        existing.set("Font", font_entry("F1", (90, 0)));
        let (doc, page_id) = page_tree(Some(Object::Dictionary(existing)), None);
        assert_eq!(resource_names(&doc, page_id, b"Font"), vec![b"F1".to_vec()]);
        assert!(resource_names(&doc, page_id, b"XObject").is_empty());
    }
}
