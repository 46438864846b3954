use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Annotation, PageIndex};

/// Store index misuse. This is a programming error rather than a
/// user-facing condition; callers treat it as a fatal assertion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("page {page} has no annotation at index {index}")]
    OutOfRange { page: PageIndex, index: usize },
}

/// Per-page annotation lists; the single source of truth for what markup
/// exists. Within a page, order is insertion order and doubles as z-order:
/// later entries draw on top and win overlapping hit tests.
///
/// The store is owned by the editing session and mutated synchronously
/// from the event loop; the history engine keeps deep copies, never
/// references, so later edits cannot alter past snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStore {
    pages: BTreeMap<PageIndex, Vec<Annotation>>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with an empty sequence pre-seeded for every page
    /// `1..=page_count`, the shape of a freshly loaded document.
    pub fn with_pages(page_count: usize) -> Self {
        let pages = (1..=page_count as PageIndex)
            .map(|page| (page, Vec::new()))
            .collect();
        Self { pages }
    }

    /// The annotation sequence for `page`, oldest first. Unknown pages
    /// yield an empty slice; this never fails.
    pub fn get(&self, page: PageIndex) -> &[Annotation] {
        self.pages.get(&page).map_or(&[], Vec::as_slice)
    }

    /// Append to the end of the page's sequence (drawn on top of what is
    /// already there).
    pub fn append(&mut self, page: PageIndex, annotation: Annotation) {
        self.pages.entry(page).or_default().push(annotation);
    }

    /// Overwrite the annotation at `index` in place, preserving its
    /// z-order position. Used by drags.
    pub fn replace(
        &mut self,
        page: PageIndex,
        index: usize,
        annotation: Annotation,
    ) -> Result<(), StoreError> {
        match self.pages.get_mut(&page).and_then(|list| list.get_mut(index)) {
            Some(slot) => {
                *slot = annotation;
                Ok(())
            }
            None => Err(StoreError::OutOfRange { page, index }),
        }
    }

    pub fn annotation(&self, page: PageIndex, index: usize) -> Option<&Annotation> {
        self.pages.get(&page).and_then(|list| list.get(index))
    }

    /// Page indices known to the store, ascending.
    pub fn pages(&self) -> impl Iterator<Item = PageIndex> + '_ {
        self.pages.keys().copied()
    }

    /// Total annotation count across all pages.
    pub fn annotation_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.values().all(Vec::is_empty)
    }
}
