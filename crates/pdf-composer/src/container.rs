use crate::encoding::to_win_ansi;
use crate::outline::{read_outline, write_outline};
use crate::{inherited, insert_page, media_box, overlay_content, ComposerError};
use log::{debug, info};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tocsmith_traits::{ContainerError, DocumentContainer, LinkAnnotation, TextRun};
use tocsmith_types::{OutlineItem, Size, ZoomHint};

/// Text drawn on one page, waiting to be written as a single overlay stream.
#[derive(Debug, Default)]
struct PendingText {
    operations: Vec<Operation>,
    fonts: BTreeSet<String>,
}

/// A PDF document held in memory by lopdf.
///
/// Pages are tracked by object id: the pages present at load time are
/// remembered so outline items (numbered against the loaded document) keep
/// pointing at the same content after blank pages have been inserted.
/// Text is buffered per page and flushed by `to_bytes`, so each page gets
/// exactly one extra content stream however many runs are drawn on it.
#[derive(Debug)]
pub struct LopdfContainer {
    doc: Document,
    /// Current page order, refreshed whenever a page is inserted.
    pages: Vec<ObjectId>,
    original_pages: Vec<ObjectId>,
    loaded_outline: Vec<OutlineItem>,
    pending: BTreeMap<ObjectId, PendingText>,
    /// Base font name to (resource name, font object).
    fonts: BTreeMap<String, (String, ObjectId)>,
}

impl LopdfContainer {
    pub fn from_document(doc: Document) -> Self {
        let original_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let loaded_outline = read_outline(&doc, &original_pages);
        debug!(
            "Loaded document with {} pages and {} bookmarks",
            original_pages.len(),
            loaded_outline.len()
        );
        Self {
            doc,
            pages: original_pages.clone(),
            original_pages,
            loaded_outline,
            pending: BTreeMap::new(),
            fonts: BTreeMap::new(),
        }
    }

    pub fn load_mem(bytes: &[u8]) -> Result<Self, ComposerError> {
        Ok(Self::from_document(Document::load_mem(bytes)?))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ComposerError> {
        info!("Loading PDF from {}", path.as_ref().display());
        Ok(Self::from_document(Document::load(path)?))
    }

    /// The underlying document. Text drawn since the last `to_bytes` is not
    /// part of it yet.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId, ContainerError> {
        self.pages
            .get(page_index)
            .copied()
            .ok_or(ContainerError::PageOutOfRange { index: page_index, count: self.pages.len() })
    }

    /// Resource name for `base_font`, creating the shared font object on first use.
    fn font_resource(&mut self, base_font: &str) -> String {
        if let Some((name, _)) = self.fonts.get(base_font) {
            return name.clone();
        }
        let name = format!("TocF{}", self.fonts.len() + 1);
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
            "Encoding" => "WinAnsiEncoding",
        });
        self.fonts.insert(base_font.to_string(), (name.clone(), id));
        name
    }

    /// Gives the page its own `/Resources` with the fonts its overlay uses,
    /// keeping whatever it inherited.
    fn attach_fonts(&mut self, page_id: ObjectId, fonts: &BTreeSet<String>) -> Result<(), ComposerError> {
        let mut resources = match inherited(&self.doc, page_id, b"Resources") {
            Some(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        let mut font_dict = match resources.get(b"Font") {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(id)) => self
                .doc
                .get_object(*id)
                .and_then(Object::as_dict)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            _ => Dictionary::new(),
        };
        for base_font in fonts {
            if let Some((name, id)) = self.fonts.get(base_font) {
                font_dict.set(name.as_bytes().to_vec(), Object::Reference(*id));
            }
        }
        resources.set("Font", font_dict);

        let page_dict = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
        page_dict.set("Resources", resources);
        Ok(())
    }

    fn flush_text(&mut self) -> Result<(), ComposerError> {
        let pending = std::mem::take(&mut self.pending);
        for (page_id, text) in pending {
            self.attach_fonts(page_id, &text.fonts)?;
            let content = Content { operations: text.operations }.encode()?;
            overlay_content(&mut self.doc, page_id, content)?;
        }
        Ok(())
    }

    /// Appends an annotation to the page's `/Annots`, following an indirect array.
    fn push_annotation(&mut self, page_id: ObjectId, annot_id: ObjectId) -> Result<(), ComposerError> {
        let indirect = match self.doc.get_object(page_id)?.as_dict()?.get(b"Annots") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        if let Some(id) = indirect {
            self.doc.get_object_mut(id)?.as_array_mut()?.push(Object::Reference(annot_id));
            return Ok(());
        }

        let page_dict = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
        match page_dict.get_mut(b"Annots") {
            Ok(Object::Array(annots)) => annots.push(Object::Reference(annot_id)),
            _ => page_dict.set("Annots", vec![Object::Reference(annot_id)]),
        }
        Ok(())
    }
}

impl DocumentContainer for LopdfContainer {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page_index: usize) -> Result<Size, ContainerError> {
        if self.page_count() == 0 {
            return Err(ContainerError::EmptyDocument);
        }
        let [x0, y0, x1, y1] = media_box(&self.doc, self.page_id(page_index)?);
        Ok(Size::new(x1 - x0, y1 - y0))
    }

    fn insert_blank_page(&mut self, at: usize, size: Size) -> Result<(), ContainerError> {
        let count = self.page_count();
        if at > count {
            return Err(ContainerError::PageOutOfRange { index: at, count });
        }
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), size.width.into(), size.height.into()],
            "Resources" => dictionary! {},
        });
        insert_page(&mut self.doc, at, page_id)?;
        self.pages = self.doc.get_pages().into_values().collect();
        Ok(())
    }

    fn draw_text(&mut self, page_index: usize, run: &TextRun) -> Result<(), ContainerError> {
        let page_id = self.page_id(page_index)?;
        let [x0, _, _, y1] = media_box(&self.doc, page_id);
        let font = self.font_resource(&run.font);
        let [r, g, b] = run.color.unit_rgb();

        let pending = self.pending.entry(page_id).or_default();
        pending.fonts.insert(run.font.clone());
        pending.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(font.into_bytes()), run.font_size.into()]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("Td", vec![(x0 + run.position.x).into(), (y1 - run.position.y).into()]),
            Operation::new("Tj", vec![Object::String(to_win_ansi(&run.text), StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    fn add_link(&mut self, page_index: usize, link: &LinkAnnotation) -> Result<(), ContainerError> {
        let page_id = self.page_id(page_index)?;
        let target_id = self.page_id(link.destination)?;

        let [x0, _, _, y1] = media_box(&self.doc, page_id);
        let rect: Vec<Object> = vec![
            (x0 + link.rect.x).into(),
            (y1 - link.rect.bottom()).into(),
            (x0 + link.rect.right()).into(),
            (y1 - link.rect.y).into(),
        ];

        let [left, _, _, top] = media_box(&self.doc, target_id);
        let dest: Vec<Object> = match link.zoom {
            ZoomHint::TopOfPage => vec![Object::Reference(target_id), "FitH".into(), top.into()],
            ZoomHint::Fixed(zoom) => vec![Object::Reference(target_id), "XYZ".into(), left.into(), top.into(), zoom.into()],
        };
        let action_id = self.doc.add_object(dictionary! { "Type" => "Action", "S" => "GoTo", "D" => dest });
        let annot_id = self.doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => rect,
            "Border" => vec![0.into(), 0.into(), 0.into()],
            "A" => action_id,
            "P" => page_id,
        });
        self.push_annotation(page_id, annot_id)?;
        Ok(())
    }

    fn existing_outline(&self) -> Result<Vec<OutlineItem>, ContainerError> {
        Ok(self.loaded_outline.clone())
    }

    fn set_outline(&mut self, items: &[OutlineItem]) -> Result<usize, ContainerError> {
        let count = self.original_pages.len();
        if let Some(bad) = items.iter().find(|i| i.page == 0 || i.page > count) {
            return Err(ContainerError::PageOutOfRange { index: bad.page, count });
        }
        Ok(write_outline(&mut self.doc, items, &self.original_pages)?)
    }

    fn to_bytes(&mut self) -> Result<Vec<u8>, ContainerError> {
        self.flush_text()?;
        // Replaced outlines leave orphaned items behind.
        self.doc.prune_objects();
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer).map_err(ComposerError::from)?;
        Ok(buffer)
    }

    fn name(&self) -> &'static str {
        "LopdfContainer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_dummy_pdf, create_nested_pdf, page_strings, page_text, text_origins};
    use tocsmith_types::{Color, Point, Rect};

    fn container(pages: u32) -> LopdfContainer {
        LopdfContainer::from_document(create_dummy_pdf(pages, "Page"))
    }

    fn run(text: &str, x: f32, y: f32) -> TextRun {
        TextRun {
            position: Point::new(x, y),
            text: text.to_string(),
            font_size: 11.0,
            font: "Helvetica".to_string(),
            color: Color::BLUE,
        }
    }

    fn reload(container: &mut LopdfContainer) -> Document {
        Document::load_mem(&container.to_bytes().unwrap()).unwrap()
    }

    fn first_annotation(doc: &Document, page_number: u32) -> Dictionary {
        let page = doc.get_object(doc.get_pages()[&page_number]).unwrap().as_dict().unwrap();
        let annots = page.get(b"Annots").unwrap().as_array().unwrap();
        let id = annots[0].as_reference().unwrap();
        doc.get_object(id).unwrap().as_dict().unwrap().clone()
    }

    fn destination(doc: &Document, annot: &Dictionary) -> Vec<Object> {
        let action = match annot.get(b"A").unwrap() {
            Object::Reference(id) => doc.get_object(*id).unwrap().as_dict().unwrap(),
            other => other.as_dict().unwrap(),
        };
        action.get(b"D").unwrap().as_array().unwrap().clone()
    }

    #[test]
    fn reports_pages_and_sizes() {
        let c = container(3);
        assert_eq!(c.page_count(), 3);
        assert_eq!(c.page_size(0).unwrap(), Size::new(612.0, 792.0));
        assert!(matches!(c.page_size(3), Err(ContainerError::PageOutOfRange { index: 3, count: 3 })));
    }

    #[test]
    fn blank_pages_take_the_requested_size() {
        let mut c = container(2);
        c.insert_blank_page(0, Size::new(300.0, 400.0)).unwrap();
        c.append_blank_page(Size::letter()).unwrap();
        assert_eq!(c.page_count(), 4);
        assert_eq!(c.page_size(0).unwrap(), Size::new(300.0, 400.0));
        assert!(matches!(c.insert_blank_page(9, Size::letter()), Err(ContainerError::PageOutOfRange { .. })));
    }

    #[test]
    fn page_order_tracks_insertions() {
        let mut c = container(3);
        c.insert_blank_page(0, Size::letter()).unwrap();
        c.insert_blank_page(2, Size::letter()).unwrap();
        c.append_blank_page(Size::letter()).unwrap();

        let expected: Vec<ObjectId> = c.document().get_pages().into_values().collect();
        assert_eq!(c.page_count(), 6);
        assert_eq!(c.pages, expected);
        c.draw_text(1, &run("Second", 54.0, 54.0)).unwrap();
        c.draw_text(3, &run("Fourth", 54.0, 54.0)).unwrap();

        let doc = reload(&mut c);
        assert_eq!(page_strings(&doc, 2), vec!["Page 1", "Second"]);
        assert_eq!(page_strings(&doc, 4), vec!["Page 2", "Fourth"]);
    }

    #[test]
    fn text_is_flushed_with_fonts_on_serialization() {
        let mut c = container(1);
        c.insert_blank_page(0, Size::letter()).unwrap();
        c.draw_text(0, &run("Contents", 54.0, 54.0)).unwrap();
        c.draw_text(0, &run("Intro", 54.0, 90.0)).unwrap();

        let doc = reload(&mut c);
        assert_eq!(page_strings(&doc, 1), vec!["Contents", "Intro"]);
        // Top-left y 90 on a 792pt page is PDF y 702.
        assert!(text_origins(&doc, 1).contains(&(54.0, 702.0)));
        assert!(page_text(&doc, 2).contains("Page 1"));

        let page = doc.get_object(doc.get_pages()[&1]).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        let font_id = fonts.get(b"TocF1").unwrap().as_reference().unwrap();
        let font = doc.get_object(font_id).unwrap().as_dict().unwrap();
        assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Helvetica");
        assert_eq!(font.get(b"Encoding").unwrap().as_name().unwrap(), b"WinAnsiEncoding");
    }

    #[test]
    fn overlays_keep_inherited_fonts() {
        let mut c = container(1);
        c.draw_text(0, &run("Stamp", 10.0, 10.0)).unwrap();
        let doc = reload(&mut c);

        let page = doc.get_object(doc.get_pages()[&1]).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(b"TocF1"));
    }

    #[test]
    fn links_jump_to_the_top_of_the_target_page() {
        let mut c = container(3);
        c.insert_blank_page(0, Size::letter()).unwrap();
        let link = LinkAnnotation {
            rect: Rect::new(54.0, 81.2, 504.0, 12.0),
            destination: 2,
            zoom: ZoomHint::TopOfPage,
        };
        c.add_link(0, &link).unwrap();

        let doc = reload(&mut c);
        let annot = first_annotation(&doc, 1);
        assert_eq!(annot.get(b"Subtype").unwrap().as_name().unwrap(), b"Link");

        let rect: Vec<f32> = annot
            .get(b"Rect")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .filter_map(crate::number)
            .collect();
        assert!((rect[1] - (792.0 - 93.2)).abs() < 1e-3);
        assert!((rect[3] - (792.0 - 81.2)).abs() < 1e-3);

        let dest = destination(&doc, &annot);
        assert_eq!(dest[0].as_reference().unwrap(), doc.get_pages()[&3]);
        assert_eq!(dest[1].as_name().unwrap(), b"FitH");
        assert!(page_text(&doc, 3).contains("Page 2"));
    }

    #[test]
    fn fixed_zoom_links_use_xyz() {
        let mut c = container(2);
        let link = LinkAnnotation { rect: Rect::new(0.0, 0.0, 10.0, 10.0), destination: 1, zoom: ZoomHint::Fixed(1.5) };
        c.add_link(0, &link).unwrap();

        let doc = reload(&mut c);
        let dest = destination(&doc, &first_annotation(&doc, 1));
        assert_eq!(dest[1].as_name().unwrap(), b"XYZ");
        assert_eq!(crate::number(&dest[4]), Some(1.5));
    }

    #[test]
    fn link_to_missing_page_is_rejected() {
        let mut c = container(2);
        let link = LinkAnnotation { rect: Rect::new(0.0, 0.0, 1.0, 1.0), destination: 5, zoom: ZoomHint::default() };
        assert!(matches!(c.add_link(0, &link), Err(ContainerError::PageOutOfRange { index: 5, .. })));
    }

    #[test]
    fn outline_targets_survive_page_insertion() {
        let mut c = container(3);
        c.insert_blank_page(0, Size::letter()).unwrap();
        c.insert_blank_page(0, Size::letter()).unwrap();
        let items = vec![OutlineItem { level: 1, title: "Two".into(), page: 2 }];
        assert_eq!(c.set_outline(&items).unwrap(), 1);

        let doc = reload(&mut c);
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        // Original page 2 is now the fourth page.
        assert_eq!(read_outline(&doc, &pages)[0].page, 4);
    }

    #[test]
    fn outline_pages_are_checked_against_the_loaded_document() {
        let mut c = container(2);
        c.append_blank_page(Size::letter()).unwrap();
        let items = vec![OutlineItem { level: 1, title: "Appended".into(), page: 3 }];
        assert!(matches!(c.set_outline(&items), Err(ContainerError::PageOutOfRange { index: 3, count: 2 })));
    }

    #[test]
    fn existing_outline_is_read_at_load() {
        let mut doc = create_dummy_pdf(4, "Page");
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let items = vec![
            OutlineItem { level: 1, title: "Start".into(), page: 1 },
            OutlineItem { level: 2, title: "Later".into(), page: 3 },
        ];
        write_outline(&mut doc, &items, &pages).unwrap();

        let bytes = LopdfContainer::from_document(doc).to_bytes().unwrap();
        let c = LopdfContainer::load_mem(&bytes).unwrap();
        assert_eq!(c.existing_outline().unwrap(), items);
    }

    #[test]
    fn nested_page_trees_are_supported() {
        let mut c = LopdfContainer::from_document(create_nested_pdf(2, 2));
        assert_eq!(c.page_size(3).unwrap(), Size::new(595.0, 842.0));
        c.insert_blank_page(0, Size::new(595.0, 842.0)).unwrap();
        c.draw_text(0, &run("Contents", 54.0, 54.0)).unwrap();

        let doc = reload(&mut c);
        assert_eq!(doc.get_pages().len(), 5);
        assert_eq!(page_strings(&doc, 1), vec!["Contents"]);
        assert!(page_text(&doc, 2).contains("Page 1"));
    }
}
