use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

use crate::annotation::{Annotation, ColorId, FontSpec, PageIndex, ShapeKind};
use crate::geometry::hit_testing;
use crate::input::PointerInput;
use crate::session::EditingSession;

/// The five user-selectable tools. `None` in the session means
/// select/drag mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    Shape(ShapeKind),
    Text,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::Shape(ShapeKind::Circle),
        Tool::Shape(ShapeKind::Square),
        Tool::Shape(ShapeKind::Line),
        Tool::Shape(ShapeKind::Arrow),
        Tool::Text,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Shape(ShapeKind::Circle) => "Circle",
            Tool::Shape(ShapeKind::Square) => "Square",
            Tool::Shape(ShapeKind::Line) => "Line",
            Tool::Shape(ShapeKind::Arrow) => "Arrow",
            Tool::Text => "Text",
        }
    }
}

/// Pointer-gesture state. All positions are page-local content
/// coordinates; zoom is divided out before anything reaches here.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A new shape is being dragged out; the store is untouched until
    /// the gesture completes.
    Drawing {
        page: PageIndex,
        anchor: Pos2,
        current: Pos2,
    },
    /// An existing annotation is being moved in place.
    Dragging {
        page: PageIndex,
        index: usize,
        grab_offset: Vec2,
    },
    /// The inline text editor is open at `anchor`.
    TextEditing {
        page: PageIndex,
        anchor: Pos2,
        buffer: String,
    },
}

/// Per-page pointer state machine: draw a new shape, drag an existing
/// one, or place text. Mutates the session's store and triggers history
/// commits; it owns no document state itself.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: InteractionState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    /// The in-progress shape to preview, if a draw gesture is active.
    pub fn preview(&self, session: &EditingSession) -> Option<(PageIndex, ShapeKind, ColorId, Pos2, Pos2)> {
        match (&self.state, session.tool()) {
            (
                InteractionState::Drawing { page, anchor, current },
                Some(Tool::Shape(kind)),
            ) => Some((*page, kind, session.color(), *anchor, *current)),
            _ => None,
        }
    }

    /// Dispatch one pointer event that happened on `page`.
    pub fn handle(&mut self, session: &mut EditingSession, page: PageIndex, event: PointerInput) {
        match event {
            PointerInput::Down(pos) => self.pointer_down(session, page, pos),
            PointerInput::Moved(pos) => self.pointer_move(session, page, pos),
            PointerInput::Up(pos) => self.pointer_up(session, page, pos),
            PointerInput::Out(pos) => self.pointer_out(session, page, pos),
        }
    }

    pub fn pointer_down(&mut self, session: &mut EditingSession, page: PageIndex, pos: Pos2) {
        // A press on a page while the text editor is open is a blur:
        // the input closes without saving and the press proceeds.
        if matches!(self.state, InteractionState::TextEditing { .. }) {
            self.discard_text();
        }
        if !self.is_idle() {
            return;
        }
        session.set_active_page(page);

        match session.tool() {
            Some(Tool::Text) => {
                self.state = InteractionState::TextEditing {
                    page,
                    anchor: pos,
                    buffer: String::new(),
                };
            }
            Some(Tool::Shape(_)) => {
                // A press on an existing shape moves it; otherwise the
                // press anchors a new one.
                if let Some(index) = hit_testing::topmost_hit(session.store().get(page), pos) {
                    self.begin_drag(session, page, index, pos);
                } else {
                    self.state = InteractionState::Drawing {
                        page,
                        anchor: pos,
                        current: pos,
                    };
                }
            }
            None => {
                if let Some(index) = hit_testing::topmost_hit(session.store().get(page), pos) {
                    self.begin_drag(session, page, index, pos);
                }
            }
        }
    }

    fn begin_drag(&mut self, session: &EditingSession, page: PageIndex, index: usize, pos: Pos2) {
        let origin = session
            .store()
            .annotation(page, index)
            .expect("hit test returned a live index")
            .origin();
        self.state = InteractionState::Dragging {
            page,
            index,
            grab_offset: pos - origin,
        };
    }

    pub fn pointer_move(&mut self, session: &mut EditingSession, page: PageIndex, pos: Pos2) {
        match &mut self.state {
            InteractionState::Drawing { page: active, current, .. } if *active == page => {
                *current = pos;
            }
            InteractionState::Dragging { page: active, index, grab_offset } if *active == page => {
                let index = *index;
                let mut annotation = session
                    .store()
                    .annotation(page, index)
                    .expect("dragged annotation vanished from the store")
                    .clone();
                // Translate so the grab point stays under the pointer,
                // then re-derive the offset for the next move.
                let delta = pos - *grab_offset - annotation.origin();
                annotation.translate(delta);
                *grab_offset = pos - annotation.origin();
                session
                    .store_mut()
                    .replace(page, index, annotation)
                    .expect("dragged annotation vanished from the store");
            }
            _ => {}
        }
    }

    pub fn pointer_up(&mut self, session: &mut EditingSession, page: PageIndex, pos: Pos2) {
        match &self.state {
            InteractionState::Drawing { page: active, anchor, .. } if *active == page => {
                if let Some(Tool::Shape(kind)) = session.tool() {
                    let annotation = Annotation::Shape {
                        kind,
                        color: session.color(),
                        start: *anchor,
                        end: pos,
                    };
                    session.store_mut().append(page, annotation);
                    session.commit();
                }
                self.state = InteractionState::Idle;
            }
            InteractionState::Dragging { page: active, .. } if *active == page => {
                session.commit();
                self.state = InteractionState::Idle;
            }
            _ => {}
        }
    }

    /// The pointer left the page mid-gesture; commit whatever is in
    /// progress at the last known position.
    pub fn pointer_out(&mut self, session: &mut EditingSession, page: PageIndex, pos: Pos2) {
        if matches!(
            self.state,
            InteractionState::Drawing { .. } | InteractionState::Dragging { .. }
        ) {
            self.pointer_up(session, page, pos);
        }
    }

    /// Anchor of the open text editor, if any.
    pub fn text_anchor(&self) -> Option<(PageIndex, Pos2)> {
        match &self.state {
            InteractionState::TextEditing { page, anchor, .. } => Some((*page, *anchor)),
            _ => None,
        }
    }

    pub fn text_buffer_mut(&mut self) -> Option<&mut String> {
        match &mut self.state {
            InteractionState::TextEditing { buffer, .. } => Some(buffer),
            _ => None,
        }
    }

    /// Save the text editor's contents. Whitespace-only input closes the
    /// editor without touching the store, same as a discard.
    pub fn commit_text(&mut self, session: &mut EditingSession) {
        if let InteractionState::TextEditing { page, anchor, buffer } =
            std::mem::take(&mut self.state)
        {
            let trimmed = buffer.trim();
            if !trimmed.is_empty() {
                let color = session.color();
                session.store_mut().append(
                    page,
                    Annotation::Text {
                        color,
                        content: trimmed.to_owned(),
                        anchor,
                        font: FontSpec::default(),
                    },
                );
                session.commit();
            }
        }
    }

    /// Close the text editor without saving.
    pub fn discard_text(&mut self) {
        if matches!(self.state, InteractionState::TextEditing { .. }) {
            self.state = InteractionState::Idle;
        }
    }
}
