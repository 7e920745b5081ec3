use lopdf::content::Content;
use lopdf::{Document as LopdfDocument, Object, ObjectId};
use std::collections::BTreeMap;
use tocsmith::OutlineItem;

/// A link annotation as found in the output file.
#[derive(Debug, Clone)]
pub struct FoundLink {
    /// `[x0, y0, x1, y1]` in PDF user space.
    pub rect: [f32; 4],
    /// 1-based page number the link jumps to, if it resolves.
    pub target_page: Option<u32>,
    /// Fit type of the destination, e.g. `XYZ` or `FitH`.
    pub fit: String,
    /// Remaining numeric destination operands.
    pub params: Vec<f32>,
}

fn resolve<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn page_numbers(doc: &LopdfDocument) -> BTreeMap<ObjectId, u32> {
    doc.get_pages().into_iter().map(|(n, id)| (id, n)).collect()
}

/// Every string shown with `Tj` on the page, in drawing order.
pub fn page_strings(doc: &LopdfDocument, page_num: u32) -> Vec<String> {
    let Some(page_id) = doc.get_pages().get(&page_num).copied() else {
        return Vec::new();
    };
    let Ok(content) = doc.get_page_content(page_id) else {
        return Vec::new();
    };
    let Ok(content) = Content::decode(&content) else {
        return Vec::new();
    };
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(bytes.iter().map(|&b| b as char).collect()),
            _ => None,
        })
        .collect()
}

/// All page strings of the document, one page per line.
pub fn extract_text(doc: &LopdfDocument) -> String {
    (1..=doc.get_pages().len() as u32)
        .map(|n| page_strings(doc, n).join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Base font names referenced from the page's own `/Resources`.
pub fn page_font_names(doc: &LopdfDocument, page_num: u32) -> Vec<String> {
    let Some(page_id) = doc.get_pages().get(&page_num).copied() else {
        return Vec::new();
    };
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    let fonts = page
        .get(b"Resources")
        .ok()
        .and_then(|r| resolve(doc, r))
        .and_then(|r| r.as_dict().ok())
        .and_then(|r| r.get(b"Font").ok())
        .and_then(|f| resolve(doc, f))
        .and_then(|f| f.as_dict().ok());
    let Some(fonts) = fonts else {
        return Vec::new();
    };
    fonts
        .iter()
        .filter_map(|(_, font)| resolve(doc, font)?.as_dict().ok()?.get(b"BaseFont").ok()?.as_name().ok())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect()
}

/// Link annotations on one page, following `/Dest` or a `/GoTo` action.
pub fn links_on_page(doc: &LopdfDocument, page_num: u32) -> Vec<FoundLink> {
    let numbers = page_numbers(doc);
    let Some(page_id) = doc.get_pages().get(&page_num).copied() else {
        return Vec::new();
    };
    let annots = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|p| p.get(b"Annots").ok())
        .and_then(|a| resolve(doc, a))
        .and_then(|a| a.as_array().ok());
    let Some(annots) = annots else {
        return Vec::new();
    };

    annots
        .iter()
        .filter_map(|annot| resolve(doc, annot)?.as_dict().ok())
        .filter(|annot| annot.get(b"Subtype").and_then(Object::as_name).is_ok_and(|s| s == b"Link"))
        .filter_map(|annot| {
            let rect = annot.get(b"Rect").ok()?.as_array().ok()?;
            let rect = [
                rect.first()?.as_float().ok()?,
                rect.get(1)?.as_float().ok()?,
                rect.get(2)?.as_float().ok()?,
                rect.get(3)?.as_float().ok()?,
            ];
            let dest = match annot.get(b"Dest") {
                Ok(dest) => resolve(doc, dest)?,
                Err(_) => {
                    let action = resolve(doc, annot.get(b"A").ok()?)?.as_dict().ok()?;
                    if action.get(b"S").ok()?.as_name().ok()? != b"GoTo" {
                        return None;
                    }
                    resolve(doc, action.get(b"D").ok()?)?
                }
            };
            let dest = dest.as_array().ok()?;
            let target_page = dest.first()?.as_reference().ok().and_then(|id| numbers.get(&id).copied());
            let fit = dest.get(1)?.as_name().ok().map(|n| String::from_utf8_lossy(n).into_owned())?;
            let params = dest.iter().skip(2).filter_map(|o| o.as_float().ok()).collect();
            Some(FoundLink { rect, target_page, fit, params })
        })
        .collect()
}

pub fn count_links(doc: &LopdfDocument) -> usize {
    (1..=doc.get_pages().len() as u32).map(|n| links_on_page(doc, n).len()).sum()
}

/// The document outline flattened depth-first, with pages numbered in the
/// document as it is now.
pub fn outline_items(doc: &LopdfDocument) -> Vec<OutlineItem> {
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    tocsmith_pdf_composer::read_outline(doc, &pages)
}

pub fn get_page_dimensions(doc: &LopdfDocument, page_num: u32) -> Option<(f32, f32)> {
    let page_id = doc.get_pages().get(&page_num).copied()?;
    let media_box = doc.get_dictionary(page_id).ok()?.get(b"MediaBox").ok()?.as_array().ok()?;
    let width = media_box.get(2)?.as_float().ok()? - media_box.first()?.as_float().ok()?;
    let height = media_box.get(3)?.as_float().ok()? - media_box.get(1)?.as_float().ok()?;
    Some((width, height))
}

pub fn has_outlines(doc: &LopdfDocument) -> bool {
    doc.trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .is_ok_and(|catalog| catalog.has(b"Outlines"))
}

#[macro_export]
macro_rules! assert_pdf_contains_text {
    ($pdf:expr, $text:expr) => {
        let extracted = $crate::common::pdf_assertions::extract_text(&$pdf.doc);
        assert!(
            extracted.contains($text),
            "PDF should contain '{}', but extracted text was:\n{}",
            $text,
            extracted
        );
    };
}

#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        let count = $pdf.page_count();
        assert_eq!(count, $count, "Expected {} pages, got {}", $count, count);
    };
}

#[macro_export]
macro_rules! assert_pdf_link_count {
    ($pdf:expr, $count:expr) => {
        let link_count = $crate::common::pdf_assertions::count_links(&$pdf.doc);
        assert_eq!(link_count, $count, "Expected {} internal links, got {}", $count, link_count);
    };
}
