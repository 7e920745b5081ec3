//! Reading and writing the document outline (`/Outlines`).
//!
//! Both directions identify pages by object id rather than by position, so
//! an outline read before TOC pages are inserted, or written after, still
//! points at the same content pages.

use crate::encoding::{decode_text_string, encode_text_string};
use crate::{deref, media_box, ComposerError, MAX_TREE_DEPTH};
use log::warn;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};
use tocsmith_types::OutlineItem;

fn catalog(doc: &Document) -> Option<&Dictionary> {
    deref(doc, doc.trailer.get(b"Root").ok()?).as_dict().ok()
}

/// Flattens the document's bookmark tree depth-first.
///
/// `pages` lists the page objects in document order; bookmark pages are
/// reported as 1-based positions in that list. Bookmarks whose destination
/// does not resolve to one of those pages are skipped, but their children
/// are still visited.
pub fn read_outline(doc: &Document, pages: &[ObjectId]) -> Vec<OutlineItem> {
    let Some(first) = catalog(doc)
        .and_then(|c| c.get(b"Outlines").ok())
        .and_then(|o| deref(doc, o).as_dict().ok())
        .and_then(|o| o.get(b"First").ok())
        .and_then(|f| f.as_reference().ok())
    else {
        return Vec::new();
    };

    let page_numbers: HashMap<ObjectId, usize> = pages.iter().enumerate().map(|(i, id)| (*id, i + 1)).collect();
    let mut walker = OutlineWalker { doc, page_numbers, visited: HashSet::new(), items: Vec::new() };
    walker.walk(first, 1);
    walker.items
}

struct OutlineWalker<'a> {
    doc: &'a Document,
    page_numbers: HashMap<ObjectId, usize>,
    visited: HashSet<ObjectId>,
    items: Vec<OutlineItem>,
}

impl<'a> OutlineWalker<'a> {
    fn walk(&mut self, first: ObjectId, level: u32) {
        let doc = self.doc;
        if level as usize > MAX_TREE_DEPTH {
            warn!("Outline is nested deeper than {} levels, ignoring the rest", MAX_TREE_DEPTH);
            return;
        }

        let mut current = Some(first);
        while let Some(node_id) = current {
            // Cycle protection across the whole tree, not just one sibling chain.
            if !self.visited.insert(node_id) {
                warn!("Outline item {:?} is reachable twice, stopping this branch", node_id);
                break;
            }
            let Ok(node) = doc.get_object(node_id).and_then(Object::as_dict) else {
                warn!("Outline item {:?} is not a dictionary", node_id);
                break;
            };

            let title = node
                .get(b"Title")
                .ok()
                .and_then(|t| match deref(doc, t) {
                    Object::String(bytes, _) => Some(decode_text_string(bytes)),
                    _ => None,
                })
                .unwrap_or_default();

            match self.destination_page(node) {
                Some(page) => self.items.push(OutlineItem { level, title, page }),
                None => warn!("Skipping bookmark '{}': its destination is not a page of this document", title),
            }

            if let Ok(Object::Reference(child)) = node.get(b"First") {
                self.walk(*child, level + 1);
            }
            current = match node.get(b"Next") {
                Ok(Object::Reference(next)) => Some(*next),
                _ => None,
            };
        }
    }

    /// Checks `/Dest` first, then a `/GoTo` action's `/D`.
    fn destination_page(&self, node: &Dictionary) -> Option<usize> {
        if let Ok(dest) = node.get(b"Dest") {
            if let Some(page) = self.resolve_dest(dest, 0) {
                return Some(page);
            }
        }
        let action = deref(self.doc, node.get(b"A").ok()?).as_dict().ok()?;
        match action.get(b"S") {
            Ok(Object::Name(kind)) if kind.as_slice() == b"GoTo" => self.resolve_dest(action.get(b"D").ok()?, 0),
            _ => None,
        }
    }

    fn resolve_dest(&self, dest: &Object, depth: usize) -> Option<usize> {
        if depth > MAX_TREE_DEPTH {
            return None;
        }
        match deref(self.doc, dest) {
            Object::Array(arr) => match arr.first()? {
                Object::Reference(page_id) => self.page_numbers.get(page_id).copied(),
                // Some producers write a zero-based page index instead of a reference.
                Object::Integer(index) => {
                    let page = usize::try_from(*index).ok()? + 1;
                    (page <= self.page_numbers.len()).then_some(page)
                }
                _ => None,
            },
            // A `/Dests` entry may wrap the array in a dictionary under /D.
            Object::Dictionary(dict) => self.resolve_dest(dict.get(b"D").ok()?, depth + 1),
            Object::String(name, _) | Object::Name(name) => {
                let target = self.named_destination(name)?;
                self.resolve_dest(target, depth + 1)
            }
            _ => None,
        }
    }

    /// Looks `name` up in the `/Names` → `/Dests` name tree, then in the
    /// older catalog `/Dests` dictionary.
    fn named_destination(&self, name: &[u8]) -> Option<&'a Object> {
        let catalog = catalog(self.doc)?;
        let from_tree = catalog
            .get(b"Names")
            .ok()
            .and_then(|n| deref(self.doc, n).as_dict().ok())
            .and_then(|n| n.get(b"Dests").ok())
            .and_then(|d| deref(self.doc, d).as_dict().ok())
            .and_then(|tree| self.lookup_name_tree(tree, name, 0));
        if from_tree.is_some() {
            return from_tree;
        }
        let dests = deref(self.doc, catalog.get(b"Dests").ok()?).as_dict().ok()?;
        dests.get(name).ok()
    }

    fn lookup_name_tree(&self, node: &'a Dictionary, name: &[u8], depth: usize) -> Option<&'a Object> {
        if depth > MAX_TREE_DEPTH {
            return None;
        }
        if let Some(names) = node.get(b"Names").ok().and_then(|n| deref(self.doc, n).as_array().ok()) {
            for pair in names.chunks_exact(2) {
                if let Object::String(key, _) = deref(self.doc, &pair[0]) {
                    if key.as_slice() == name {
                        return Some(&pair[1]);
                    }
                }
            }
        }
        let kids = node.get(b"Kids").ok().and_then(|k| deref(self.doc, k).as_array().ok())?;
        kids.iter()
            .filter_map(|kid| deref(self.doc, kid).as_dict().ok())
            .find_map(|kid| self.lookup_name_tree(kid, name, depth + 1))
    }
}

/// Replaces the document outline with `items`.
///
/// Item pages are 1-based positions in `pages`, which must list the page
/// objects the items refer to. An empty `items` removes the outline. Every
/// bookmark jumps to the top of its page. Returns the number of bookmarks
/// written.
pub fn write_outline(doc: &mut Document, items: &[OutlineItem], pages: &[ObjectId]) -> Result<usize, ComposerError> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    if items.is_empty() {
        let root_dict = doc.get_object_mut(root_id)?.as_dict_mut()?;
        root_dict.remove(b"Outlines");
        return Ok(0);
    }

    struct FlatOutlineItem { id: ObjectId, parent_idx: Option<usize>, dict: Dictionary }

    let mut flat_list: Vec<FlatOutlineItem> = Vec::with_capacity(items.len());
    let mut level_stack: Vec<(u32, usize)> = Vec::new();

    for item in items {
        let page_id = item
            .page
            .checked_sub(1)
            .and_then(|i| pages.get(i))
            .copied()
            .ok_or_else(|| ComposerError::Structure(format!("Bookmark '{}' targets missing page {}", item.title, item.page)))?;
        let top = media_box(doc, page_id)[3];
        let dest = vec![Object::Reference(page_id), "FitH".into(), top.into()];

        while level_stack.last().is_some_and(|(level, _)| *level >= item.level) {
            level_stack.pop();
        }
        let parent_idx = level_stack.last().map(|(_, idx)| *idx);
        let dict = dictionary! { "Title" => encode_text_string(&item.title), "Dest" => dest };
        level_stack.push((item.level, flat_list.len()));
        flat_list.push(FlatOutlineItem { id: doc.new_object_id(), parent_idx, dict });
    }

    // Sibling lists by index, in document order. Built in one pass so tree
    // depth never turns into call depth.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); flat_list.len()];
    let mut root_items = Vec::new();
    for (i, flat_node) in flat_list.iter().enumerate() {
        match flat_node.parent_idx {
            Some(parent_idx) => children[parent_idx].push(i),
            None => root_items.push(i),
        }
    }

    let (Some(&first), Some(&last)) = (root_items.first(), root_items.last()) else {
        return Ok(0);
    };
    let outline_root_id = doc.add_object(dictionary! {
        "Type" => "Outlines",
        "First" => Object::Reference(flat_list[first].id),
        "Last" => Object::Reference(flat_list[last].id),
        "Count" => root_items.len() as i64,
    });

    let mut links: Vec<(ObjectId, &[usize])> = vec![(outline_root_id, root_items.as_slice())];
    links.extend(flat_list.iter().zip(&children).map(|(node, kids)| (node.id, kids.as_slice())));
    let mut written = Vec::with_capacity(flat_list.len());
    for (parent_id, siblings) in &links {
        for (pos, &idx) in siblings.iter().enumerate() {
            let mut dict = flat_list[idx].dict.clone();
            dict.set("Parent", Object::Reference(*parent_id));
            if pos > 0 {
                dict.set("Prev", Object::Reference(flat_list[siblings[pos - 1]].id));
            }
            if let Some(&next) = siblings.get(pos + 1) {
                dict.set("Next", Object::Reference(flat_list[next].id));
            }
            let kids = &children[idx];
            if let (Some(&first), Some(&last)) = (kids.first(), kids.last()) {
                dict.set("First", Object::Reference(flat_list[first].id));
                dict.set("Last", Object::Reference(flat_list[last].id));
                // Negative: the item starts collapsed.
                dict.set("Count", -(kids.len() as i64));
            }
            written.push((flat_list[idx].id, dict));
        }
    }
    for (id, dict) in written {
        doc.objects.insert(id, dict.into());
    }

    let root_dict = doc.get_object_mut(root_id)?.as_dict_mut()?;
    root_dict.set("Outlines", Object::Reference(outline_root_id));
    root_dict.set("PageMode", "UseOutlines");
    Ok(items.len())
}
