use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

pub const LETTER: (i64, i64) = (612, 792);
/// A page on which the default layout fits exactly ten entries per TOC page.
pub const TEN_LINES: (i64, i64) = (612, 314);

/// Creates a document with `num_pages` pages of `size`.
/// Each page shows "Page X" so content can be traced after insertion.
pub fn plain_pdf(num_pages: u32, size: (i64, i64)) -> Document {
    build_pdf(num_pages, size, &[])
}

/// Creates a letter-sized document whose outline holds `items`, given as
/// depth-first `(level, title, page)` triples. Every item links with `/Dest`.
pub fn pdf_with_outline(num_pages: u32, items: &[(u32, &str, u32)]) -> Document {
    build_pdf(num_pages, LETTER, items)
}

fn build_pdf(num_pages: u32, size: (i64, i64), outline: &[(u32, &str, u32)]) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let page_ids: Vec<ObjectId> = (1..=num_pages)
        .map(|i| {
            let content = format!("BT /F1 12 Tf 72 72 Td (Page {}) Tj ET", i);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(size.0), Object::Integer(size.1)],
                "Contents" => content_id,
                "Resources" => resources_id,
            })
        })
        .collect();

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().copied().map(Object::Reference).collect::<Vec<_>>(),
            "Count" => num_pages as i64,
        }
        .into(),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if !outline.is_empty() {
        catalog.set("Outlines", add_outline(&mut doc, &page_ids, outline));
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Writes the outline tree for depth-first `items` and returns the root id.
fn add_outline(doc: &mut Document, page_ids: &[ObjectId], items: &[(u32, &str, u32)]) -> ObjectId {
    let root_id = doc.new_object_id();
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();
    let mut root = dictionary! { "Type" => "Outlines" };
    let mut dicts: Vec<Dictionary> = items
        .iter()
        .map(|(_, title, page)| {
            let target = page_ids[(*page as usize).saturating_sub(1).min(page_ids.len() - 1)];
            dictionary! {
                "Title" => Object::string_literal(*title),
                "Dest" => vec![Object::Reference(target), Object::Name(b"Fit".to_vec())],
            }
        })
        .collect();

    // `None` is the outline root.
    let mut children: Vec<(Option<usize>, Vec<usize>)> = vec![(None, Vec::new())];
    let mut stack: Vec<(u32, usize)> = Vec::new();
    for (i, (level, _, _)) in items.iter().enumerate() {
        while stack.last().is_some_and(|(l, _)| *l >= *level) {
            stack.pop();
        }
        let parent = stack.last().map(|(_, idx)| *idx);
        match children.iter_mut().find(|(p, _)| *p == parent) {
            Some((_, kids)) => kids.push(i),
            None => children.push((parent, vec![i])),
        }
        stack.push((*level, i));
    }

    for (parent, kids) in &children {
        let parent_id = parent.map_or(root_id, |p| ids[p]);
        for (pos, &kid) in kids.iter().enumerate() {
            dicts[kid].set("Parent", parent_id);
            if pos > 0 {
                dicts[kid].set("Prev", ids[kids[pos - 1]]);
            }
            if pos + 1 < kids.len() {
                dicts[kid].set("Next", ids[kids[pos + 1]]);
            }
        }
        let (Some(&first), Some(&last)) = (kids.first(), kids.last()) else { continue };
        let node = match parent {
            Some(p) => &mut dicts[*p],
            None => &mut root,
        };
        node.set("First", ids[first]);
        node.set("Last", ids[last]);
        node.set("Count", kids.len() as i64);
    }

    for (id, dict) in ids.into_iter().zip(dicts) {
        doc.objects.insert(id, dict.into());
    }
    doc.objects.insert(root_id, root.into());
    root_id
}

pub fn to_bytes(doc: &mut Document) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}
