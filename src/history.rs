use crate::annotation::{AnnotationStore, PageIndex};

/// An immutable full copy of the annotation store (all pages) plus the
/// page that was active when it was captured.
///
/// Snapshots are structural clones, not serialization round-trips, so
/// equality and restoration never depend on an encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    store: AnnotationStore,
    active_page: PageIndex,
}

impl Snapshot {
    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn active_page(&self) -> PageIndex {
        self.active_page
    }
}

/// Linear undo history over whole-store snapshots.
///
/// Invariants, maintained by construction:
/// - the sequence is never empty: entry 0 is the empty-document baseline
///   and is never evicted;
/// - the cursor always indexes a live entry;
/// - committing while the cursor is behind the end truncates the redo
///   branch first (classic linear undo, branches are destroyed rather
///   than merged);
/// - a commit equal to the entry under the cursor is suppressed, so
///   no-op edits never grow the history.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl History {
    /// Baseline history for a freshly loaded document: one snapshot with
    /// an empty sequence for every page, cursor on it.
    pub fn init(page_count: usize) -> Self {
        let baseline = Snapshot {
            store: AnnotationStore::with_pages(page_count),
            active_page: 1,
        };
        Self {
            snapshots: vec![baseline],
            cursor: 0,
        }
    }

    /// Capture the current store. Returns whether a new snapshot was
    /// actually appended (false when the state is unchanged).
    pub fn commit(&mut self, store: &AnnotationStore, active_page: PageIndex) -> bool {
        if self.cursor + 1 < self.snapshots.len() {
            self.snapshots.truncate(self.cursor + 1);
        }
        let snapshot = Snapshot {
            store: store.clone(),
            active_page,
        };
        if self.snapshots[self.cursor] == snapshot {
            return false;
        }
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;
        log::debug!(
            "history: committed snapshot {} ({} annotations)",
            self.cursor,
            store.annotation_count()
        );
        true
    }

    /// Step back one snapshot. `None` at the baseline; callers gate the
    /// control on [`History::can_undo`], so hitting the floor is a no-op
    /// rather than an error.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward again after an undo. The cursor machinery supports
    /// this for free; a new commit destroys the redo branch.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of snapshots currently held, baseline included.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        // Never true after init; present for completeness.
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
