//! An in-memory `DocumentContainer` that records every call.

use crate::container::{ContainerError, DocumentContainer, LinkAnnotation, TextRun};
use std::fmt::Write as _;
use tocsmith_types::{OutlineItem, Size};

/// One page of an `InMemoryContainer`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPage {
    pub size: Size,
    /// 1-based page number in the document as loaded, `None` for inserted pages.
    pub original_number: Option<usize>,
    pub texts: Vec<TextRun>,
    pub links: Vec<LinkAnnotation>,
}

impl MemoryPage {
    fn blank(size: Size, original_number: Option<usize>) -> Self {
        Self {
            size,
            original_number,
            texts: Vec::new(),
            links: Vec::new(),
        }
    }
}

/// A document that lives entirely in memory.
///
/// Useful for exercising the TOC pipeline without a PDF backend, and for
/// asserting exactly which pages were inserted and what was drawn on them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContainer {
    pages: Vec<MemoryPage>,
    existing_outline: Vec<OutlineItem>,
    outline: Option<Vec<OutlineItem>>,
    reject_outline_writes: bool,
}

impl InMemoryContainer {
    /// Creates a document with `page_count` pages of the given size.
    pub fn with_pages(page_count: usize, size: Size) -> Self {
        Self {
            pages: (1..=page_count)
                .map(|n| MemoryPage::blank(size, Some(n)))
                .collect(),
            ..Default::default()
        }
    }

    /// Seeds the outline reported by `existing_outline`.
    pub fn with_outline(mut self, items: Vec<OutlineItem>) -> Self {
        self.existing_outline = items;
        self
    }

    /// Makes every `set_outline` call fail, to exercise degraded paths.
    pub fn rejecting_outline_writes(mut self) -> Self {
        self.reject_outline_writes = true;
        self
    }

    pub fn pages(&self) -> &[MemoryPage] {
        &self.pages
    }

    /// The outline written by the last successful `set_outline`, if any.
    pub fn written_outline(&self) -> Option<&[OutlineItem]> {
        self.outline.as_deref()
    }

    fn original_page_count(&self) -> usize {
        self.pages.iter().filter(|p| p.original_number.is_some()).count()
    }

    fn page_mut(&mut self, page_index: usize) -> Result<&mut MemoryPage, ContainerError> {
        let count = self.pages.len();
        self.pages
            .get_mut(page_index)
            .ok_or(ContainerError::PageOutOfRange { index: page_index, count })
    }
}

impl DocumentContainer for InMemoryContainer {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page_index: usize) -> Result<Size, ContainerError> {
        if self.pages.is_empty() {
            return Err(ContainerError::EmptyDocument);
        }
        self.pages
            .get(page_index)
            .map(|p| p.size)
            .ok_or(ContainerError::PageOutOfRange { index: page_index, count: self.pages.len() })
    }

    fn insert_blank_page(&mut self, at: usize, size: Size) -> Result<(), ContainerError> {
        if at > self.pages.len() {
            return Err(ContainerError::PageOutOfRange { index: at, count: self.pages.len() });
        }
        self.pages.insert(at, MemoryPage::blank(size, None));
        Ok(())
    }

    fn draw_text(&mut self, page_index: usize, run: &TextRun) -> Result<(), ContainerError> {
        self.page_mut(page_index)?.texts.push(run.clone());
        Ok(())
    }

    fn add_link(&mut self, page_index: usize, link: &LinkAnnotation) -> Result<(), ContainerError> {
        let count = self.pages.len();
        if link.destination >= count {
            return Err(ContainerError::PageOutOfRange { index: link.destination, count });
        }
        self.page_mut(page_index)?.links.push(*link);
        Ok(())
    }

    fn existing_outline(&self) -> Result<Vec<OutlineItem>, ContainerError> {
        Ok(self.existing_outline.clone())
    }

    fn set_outline(&mut self, items: &[OutlineItem]) -> Result<usize, ContainerError> {
        if self.reject_outline_writes {
            return Err(ContainerError::Unsupported("outline writes are disabled".into()));
        }
        let originals = self.original_page_count();
        if let Some(bad) = items.iter().find(|i| i.page == 0 || i.page > originals) {
            return Err(ContainerError::PageOutOfRange { index: bad.page, count: originals });
        }
        self.outline = Some(items.to_vec());
        Ok(items.len())
    }

    /// Produces a plain-text dump of the document: one block per page.
    fn to_bytes(&mut self) -> Result<Vec<u8>, ContainerError> {
        let mut out = String::new();
        for (i, page) in self.pages.iter().enumerate() {
            let origin = match page.original_number {
                Some(n) => format!("original {}", n),
                None => "inserted".to_string(),
            };
            let _ = writeln!(out, "page {} ({}) {}x{}", i, origin, page.size.width, page.size.height);
            for run in &page.texts {
                let _ = writeln!(out, "  text {:?} at ({}, {})", run.text, run.position.x, run.position.y);
            }
            for link in &page.links {
                let _ = writeln!(out, "  link -> {}", link.destination);
            }
        }
        Ok(out.into_bytes())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
