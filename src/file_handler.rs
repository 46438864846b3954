use eframe::egui;

use crate::error::EditorError;
use crate::flatten::ImageDocument;

/// Collects files dropped onto the window and turns them into a
/// document. Each dropped image becomes one page, in drop order.
#[derive(Default)]
pub struct FileIntake {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up any newly dropped files from the UI context. Returns true
    /// if a drop arrived this frame.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let mut new_drop = false;
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
                new_drop = true;
            }
        });
        new_drop
    }

    /// Decode the pending drop into a document, consuming the queue.
    /// A drop with no supported file at all is rejected outright; a
    /// supported file that fails to parse surfaces a decode error and no
    /// session is entered.
    pub fn take_document(&mut self) -> Option<Result<ImageDocument, EditorError>> {
        if self.dropped_files.is_empty() {
            return None;
        }
        let files = std::mem::take(&mut self.dropped_files);

        let mut sources = Vec::new();
        for file in &files {
            let name = file_name(file);
            if !is_document_file(file) {
                log::warn!("dropped file is not a supported type: {name}");
                continue;
            }
            match file_bytes(file) {
                Some(bytes) => sources.push((name, bytes)),
                None => log::warn!("dropped file has no accessible data: {name}"),
            }
        }

        if sources.is_empty() {
            return Some(Err(EditorError::InvalidInput));
        }
        log::info!("decoding document from {} file(s)", sources.len());
        Some(ImageDocument::decode(&sources))
    }

    /// Preview files being dragged over the application.
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order};

        if !ctx.input(|i| i.raw.hovered_files.is_empty()) {
            let text = ctx.input(|i| {
                let mut text = "Dropping files:\n".to_owned();
                for file in &i.raw.hovered_files {
                    if let Some(path) = &file.path {
                        text += &format!("\n{}", path.display());
                    } else {
                        text += "\n(Path not available)";
                    }
                }
                text
            });

            let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
            let screen_rect = ctx.screen_rect();
            painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
            painter.text(
                screen_rect.center(),
                Align2::CENTER_CENTER,
                text,
                egui::TextStyle::Heading.resolve(&ctx.style()),
                Color32::WHITE,
            );
        }
    }
}

fn file_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Supported page sources, by MIME type or extension.
fn is_document_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        file.mime.starts_with("image/")
    } else if let Some(path) = &file.path {
        match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy().to_lowercase();
                matches!(ext.as_str(), "png" | "jpg" | "jpeg")
            }
            None => false,
        }
    } else {
        false
    }
}

fn file_bytes(file: &egui::DroppedFile) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }

    #[cfg(not(target_arch = "wasm32"))]
    if let Some(path) = &file.path {
        match std::fs::read(path) {
            Ok(bytes) => return Some(bytes),
            Err(err) => {
                log::error!("failed to read dropped file {}: {err}", path.display());
                return None;
            }
        }
    }

    None
}
