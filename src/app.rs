use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use egui::{ColorImage, Rect, TextureHandle, TextureOptions, Vec2};
use parking_lot::Mutex;

use crate::annotation::{ColorId, PageIndex};
use crate::document::{PageRenderer, RenderError, RenderQueue, RenderRequest};
use crate::error::EditorError;
use crate::export::{self, ExportError};
use crate::file_handler::FileIntake;
use crate::flatten::{ImageDocument, StitchedPngEncoder};
use crate::interaction::InteractionController;
use crate::layout;
use crate::panels;
use crate::session::EditingSession;

/// Scale the export pipeline rasterizes pages at. The display pipeline
/// uses the same base scale; zoom is purely a view transform on top.
const EXPORT_SCALE: f32 = 1.0;

/// The application shell: owns the editing session, the collaborator
/// handles, and the async task plumbing. We derive Deserialize/Serialize
/// so UI preferences survive restarts; everything document-bound is
/// per-session and skipped.
#[derive(Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct MarkupApp {
    /// Last palette selection, restored into the next session.
    pub(crate) color: ColorId,

    #[serde(skip)]
    pub(crate) session: Option<EditingSession>,
    #[serde(skip)]
    pub(crate) controller: InteractionController,
    #[serde(skip)]
    pub(crate) document: Option<Arc<dyn PageRenderer>>,
    #[serde(skip)]
    pub(crate) intake: FileIntake,

    #[serde(skip)]
    pub(crate) page_sizes: Vec<Vec2>,
    #[serde(skip)]
    pub(crate) page_textures: BTreeMap<PageIndex, TextureHandle>,
    /// Screen rect of each page last frame, for anchoring the text editor.
    #[serde(skip)]
    pub(crate) page_rects: BTreeMap<PageIndex, Rect>,

    #[serde(skip)]
    pub(crate) render_queue: RenderQueue,
    #[serde(skip)]
    pub(crate) render_backlog: VecDeque<PageIndex>,
    #[serde(skip)]
    pub(crate) finished_renders: Arc<Mutex<Vec<(PageIndex, Result<ColorImage, RenderError>)>>>,

    #[serde(skip)]
    pub(crate) export_requested: bool,
    #[serde(skip)]
    pub(crate) export_pending: bool,
    #[serde(skip)]
    pub(crate) export_result: Arc<Mutex<Option<Result<Vec<u8>, ExportError>>>>,

    #[serde(skip)]
    pub(crate) notice: Option<String>,
    #[serde(skip)]
    pub(crate) zoom_request: Option<i32>,
    #[serde(skip)]
    pub(crate) pending_scroll: Option<Vec2>,
    #[serde(skip)]
    pub(crate) scroll_offset: Vec2,
    #[serde(skip)]
    pub(crate) scroll_to_page: Option<PageIndex>,
}

impl MarkupApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        if let Some(storage) = cc.storage {
            return eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default();
        }
        Self::default()
    }

    fn open_document(&mut self, document: ImageDocument) {
        let page_count = document.page_count();
        self.page_sizes = (1..=page_count as PageIndex)
            .map(|page| document.page_size(page).unwrap_or(Vec2::new(600.0, 800.0)))
            .collect();
        self.document = Some(Arc::new(document));

        let mut session = EditingSession::new(page_count);
        session.set_color(self.color);
        self.session = Some(session);
        self.controller = InteractionController::new();

        self.page_textures.clear();
        self.page_rects.clear();
        self.render_queue = RenderQueue::new();
        self.render_backlog = (1..=page_count as PageIndex).collect();
        self.scroll_offset = Vec2::ZERO;
        self.pending_scroll = Some(Vec2::ZERO);
        log::info!("opened document with {page_count} pages");
    }

    fn request_render(&mut self, ctx: &egui::Context, page: PageIndex) {
        let request = RenderRequest {
            page,
            scale: EXPORT_SCALE,
        };
        if let Some(started) = self.render_queue.request(request) {
            self.spawn_render(ctx, started);
        }
    }

    fn spawn_render(&self, ctx: &egui::Context, request: RenderRequest) {
        let Some(document) = &self.document else { return };
        let document = Arc::clone(document);
        let slot = Arc::clone(&self.finished_renders);
        let ctx = ctx.clone();
        spawn_task(async move {
            let result = document
                .render_page(request.page, request.scale)
                .await
                .map(|surface| surface.to_color_image());
            slot.lock().push((request.page, result));
            ctx.request_repaint();
        });
    }

    /// Pull completed rasters into textures and keep the render pipeline
    /// fed, one page in flight at a time.
    fn drain_renders(&mut self, ctx: &egui::Context) {
        let completed: Vec<_> = self.finished_renders.lock().drain(..).collect();
        for (page, result) in completed {
            match result {
                Ok(image) => {
                    let texture =
                        ctx.load_texture(format!("page-{page}"), image, TextureOptions::LINEAR);
                    self.page_textures.insert(page, texture);
                }
                Err(err) => {
                    log::error!("page {page} failed to rasterize: {err}");
                    self.notice = Some(format!("Page {page} failed to render: {err}"));
                }
            }

            if let Some(parked) = self.render_queue.finished() {
                self.spawn_render(ctx, parked);
            } else if let Some(next) = self.render_backlog.pop_front() {
                self.request_render(ctx, next);
            }
        }
    }

    fn start_export(&mut self, ctx: &egui::Context) {
        let (Some(document), Some(session)) = (&self.document, &self.session) else {
            return;
        };
        let document = Arc::clone(document);
        let store = session.store().clone();
        let slot = Arc::clone(&self.export_result);
        let ctx = ctx.clone();
        self.export_pending = true;
        log::info!("export started");
        spawn_task(async move {
            let result =
                export::export_document(document.as_ref(), &StitchedPngEncoder, &store, EXPORT_SCALE)
                    .await;
            *slot.lock() = Some(result);
            ctx.request_repaint();
        });
    }

    fn finish_export(&mut self, result: Result<Vec<u8>, ExportError>) {
        self.export_pending = false;
        match result {
            Ok(bytes) => self.save_export(&bytes),
            Err(err) => {
                let err = EditorError::from(err);
                log::error!("{err}");
                self.notice = Some(err.to_string());
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save_export(&mut self, bytes: &[u8]) {
        match std::fs::write("annotated.png", bytes) {
            Ok(()) => {
                log::info!("export saved to annotated.png ({} bytes)", bytes.len());
                self.notice = Some("Saved annotated.png".to_owned());
            }
            Err(err) => {
                log::error!("failed to write export: {err}");
                self.notice = Some(format!("Failed to save export: {err}"));
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn save_export(&mut self, bytes: &[u8]) {
        log::warn!("export produced {} bytes; saving is not wired up on web", bytes.len());
        self.notice = Some("Export finished, but saving files is not supported on web.".to_owned());
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let mut undo = false;
        let mut redo = false;
        let mut discard_text = false;
        ctx.input_mut(|i| {
            redo = i.consume_key(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::Z)
                || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y);
            undo = i.consume_key(egui::Modifiers::COMMAND, egui::Key::Z);
            discard_text = i.consume_key(egui::Modifiers::NONE, egui::Key::Escape);
        });

        if discard_text {
            self.controller.discard_text();
        }
        if let Some(session) = self.session.as_mut() {
            if undo {
                session.undo();
            }
            if redo {
                session.redo();
            }
        }
    }

    /// The inline text editor for the controller's `TextEditing` state,
    /// anchored at the click point on the page.
    fn text_editor_window(&mut self, ctx: &egui::Context) {
        let Some((page, anchor)) = self.controller.text_anchor() else {
            return;
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let position = self
            .page_rects
            .get(&page)
            .map(|rect| layout::to_screen_coords(anchor, rect.min, session.zoom()))
            .unwrap_or_else(|| ctx.screen_rect().center());

        let mut save = false;
        let mut discard = false;
        egui::Window::new("Annotation text")
            .collapsible(false)
            .resizable(false)
            .default_pos(position)
            .show(ctx, |ui| {
                if let Some(buffer) = self.controller.text_buffer_mut() {
                    let edit = egui::TextEdit::multiline(buffer)
                        .desired_width(280.0)
                        .hint_text("Type text, Escape to discard");
                    ui.add(edit).request_focus();
                }
                ui.horizontal(|ui| {
                    save = ui.button("Save").clicked();
                    discard = ui.button("Discard").clicked();
                });
            });

        if save {
            self.controller.commit_text(session);
        } else if discard {
            self.controller.discard_text();
        }
    }

    fn notice_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.notice.clone() else {
            return;
        };
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("Close").clicked() {
                    self.notice = None;
                }
            });
    }
}

impl eframe::App for MarkupApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);

        self.intake.preview_files_being_dropped(ctx);
        if self.intake.check_for_dropped_files(ctx) {
            match self.intake.take_document() {
                Some(Ok(document)) => {
                    self.open_document(document);
                    self.request_render(ctx, 1);
                    self.render_backlog.pop_front();
                }
                Some(Err(err)) => {
                    log::warn!("rejected drop: {err}");
                    self.notice = Some(err.to_string());
                }
                None => {}
            }
        }

        self.drain_renders(ctx);

        let export_done = self.export_result.lock().take();
        if let Some(result) = export_done {
            self.finish_export(result);
        }
        if std::mem::take(&mut self.export_requested) && !self.export_pending {
            self.start_export(ctx);
        }

        panels::tools_panel(self, ctx);
        panels::previews_panel(self, ctx);
        panels::central_panel(self, ctx);

        self.text_editor_window(ctx);
        self.notice_window(ctx);
    }
}

/// Run a detached async task: a worker thread natively, a browser
/// microtask on wasm. Completion is signalled through the shared slots
/// plus a repaint request, never by blocking the UI thread.
fn spawn_task(future: impl std::future::Future<Output = ()> + Send + 'static) {
    #[cfg(not(target_arch = "wasm32"))]
    std::thread::spawn(move || futures::executor::block_on(future));

    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(future);
}
