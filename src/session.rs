use crate::annotation::{AnnotationStore, ColorId, PageIndex};
use crate::history::History;
use crate::interaction::Tool;
use crate::layout::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};

/// Everything one open document's editing state needs, in one place:
/// the annotation store, its history, and the transient tool/color/zoom
/// selections. Owned by the app and handed to the interaction
/// controller; there are no process-wide singletons.
pub struct EditingSession {
    store: AnnotationStore,
    history: History,
    tool: Option<Tool>,
    color: ColorId,
    zoom: f32,
    active_page: PageIndex,
    page_count: usize,
}

impl EditingSession {
    pub fn new(page_count: usize) -> Self {
        Self {
            store: AnnotationStore::with_pages(page_count),
            history: History::init(page_count),
            tool: None,
            color: ColorId::default(),
            zoom: MIN_ZOOM,
            active_page: 1,
            page_count,
        }
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AnnotationStore {
        &mut self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Selected tool; `None` means select/drag mode.
    pub fn tool(&self) -> Option<Tool> {
        self.tool
    }

    /// Select a tool, or deselect it when it is already active so the
    /// user can get back to select/drag mode.
    pub fn toggle_tool(&mut self, tool: Tool) {
        self.tool = if self.tool == Some(tool) { None } else { Some(tool) };
        log::info!("tool: {:?}", self.tool);
    }

    pub fn color(&self) -> ColorId {
        self.color
    }

    pub fn set_color(&mut self, color: ColorId) {
        self.color = color;
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom + 1e-3 < MAX_ZOOM
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom - 1e-3 > MIN_ZOOM
    }

    /// Step the zoom, clamped to the allowed range. Returns whether it
    /// changed. Stored annotation coordinates are never rescaled here;
    /// zoom is purely a view transform.
    pub fn adjust_zoom(&mut self, steps: i32) -> bool {
        let old = self.zoom;
        self.zoom = (self.zoom + steps as f32 * ZOOM_STEP).clamp(MIN_ZOOM, MAX_ZOOM);
        (self.zoom - old).abs() > 1e-4
    }

    pub fn active_page(&self) -> PageIndex {
        self.active_page
    }

    pub fn set_active_page(&mut self, page: PageIndex) {
        if page >= 1 && page as usize <= self.page_count {
            self.active_page = page;
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Snapshot the current store into the history. Called by the
    /// interaction controller after every completed draw, drag, and text
    /// commit.
    pub fn commit(&mut self) -> bool {
        self.history.commit(&self.store, self.active_page)
    }

    /// Roll back one snapshot, replacing the live store wholesale and
    /// restoring the page that was active at capture time. Returns false
    /// at the baseline (gated by [`EditingSession::can_undo`] in the UI).
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.store = snapshot.store().clone();
                self.active_page = snapshot.active_page();
                log::info!("undo -> snapshot {}", self.history.cursor());
                true
            }
            None => false,
        }
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.store = snapshot.store().clone();
                self.active_page = snapshot.active_page();
                log::info!("redo -> snapshot {}", self.history.cursor());
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, ShapeKind};
    use egui::pos2;

    fn shape() -> Annotation {
        Annotation::Shape {
            kind: ShapeKind::Square,
            color: ColorId::Green,
            start: pos2(10.0, 10.0),
            end: pos2(40.0, 30.0),
        }
    }

    #[test]
    fn zoom_clamps_to_bounds() {
        let mut session = EditingSession::new(1);
        assert!(!session.adjust_zoom(-1)); // already at the floor
        for _ in 0..20 {
            session.adjust_zoom(1);
        }
        assert!((session.zoom() - MAX_ZOOM).abs() < 1e-4);
        assert!(!session.can_zoom_in());
        assert!(session.can_zoom_out());
    }

    #[test]
    fn zoom_change_leaves_store_untouched() {
        let mut session = EditingSession::new(1);
        session.store_mut().append(1, shape());
        let before = session.store().clone();
        session.adjust_zoom(5);
        assert_eq!(session.store(), &before);
    }

    #[test]
    fn toggle_tool_deselects_on_repeat() {
        let mut session = EditingSession::new(1);
        session.toggle_tool(Tool::Shape(ShapeKind::Circle));
        assert_eq!(session.tool(), Some(Tool::Shape(ShapeKind::Circle)));
        session.toggle_tool(Tool::Shape(ShapeKind::Circle));
        assert_eq!(session.tool(), None);
    }

    #[test]
    fn undo_replaces_store_wholesale() {
        let mut session = EditingSession::new(2);
        session.store_mut().append(2, shape());
        session.set_active_page(2);
        session.commit();

        assert!(session.undo());
        assert!(session.store().is_empty());
        assert_eq!(session.active_page(), 1);

        assert!(session.redo());
        assert_eq!(session.store().get(2).len(), 1);
        assert_eq!(session.active_page(), 2);
    }

    #[test]
    fn undo_at_baseline_is_a_quiet_no_op() {
        let mut session = EditingSession::new(1);
        assert!(!session.can_undo());
        assert!(!session.undo());
        assert!(session.store().is_empty());
    }
}
