use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use egui::{Color32, ColorImage, Pos2, Rect, Vec2, pos2};
use futures::executor::block_on;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use pagemark::annotation::{Annotation, AnnotationStore, ColorId, PageIndex, ShapeKind};
use pagemark::document::{
    DocumentEncoder, EncodeError, PageRenderer, RasterPage, RenderError,
};
use pagemark::export::export_document;
use pagemark::flatten::{ImageDocument, StitchedPngEncoder};
use pagemark::renderer::Surface;

/// A raster page double that logs which primitives were replayed on it.
struct LoggingPage {
    page: PageIndex,
    log: Arc<Mutex<Vec<String>>>,
}

impl Surface for LoggingPage {
    fn clear(&mut self) {
        self.log.lock().push(format!("page {}: clear", self.page));
    }
    fn line(&mut self, from: Pos2, to: Pos2, _color: Color32, _width: f32) {
        self.log
            .lock()
            .push(format!("page {}: line {from:?}->{to:?}", self.page));
    }
    fn circle(&mut self, center: Pos2, radius: f32, _color: Color32, _width: f32) {
        self.log
            .lock()
            .push(format!("page {}: circle {center:?} r{radius}", self.page));
    }
    fn rect(&mut self, rect: Rect, _color: Color32, _width: f32) {
        self.log
            .lock()
            .push(format!("page {}: rect {rect:?}", self.page));
    }
    fn fill_polygon(&mut self, _points: &[Pos2], _color: Color32) {
        self.log.lock().push(format!("page {}: polygon", self.page));
    }
    fn text_line(&mut self, _anchor: Pos2, text: &str, _size: f32, _color: Color32) {
        self.log
            .lock()
            .push(format!("page {}: text {text:?}", self.page));
    }
}

impl RasterPage for LoggingPage {
    fn width(&self) -> u32 {
        100
    }
    fn height(&self) -> u32 {
        140
    }
    fn to_color_image(&self) -> ColorImage {
        ColorImage {
            size: [1, 1],
            pixels: vec![Color32::WHITE],
        }
    }
}

/// Renderer double serving `page_count` logging pages, optionally
/// failing on one page.
struct LoggingRenderer {
    page_count: usize,
    fail_on: Option<PageIndex>,
    log: Arc<Mutex<Vec<String>>>,
}

impl PageRenderer for LoggingRenderer {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_size(&self, _page: PageIndex) -> Option<Vec2> {
        Some(Vec2::new(100.0, 140.0))
    }

    fn render_page(
        &self,
        page: PageIndex,
        _scale: f32,
    ) -> BoxFuture<'static, Result<Box<dyn RasterPage>, RenderError>> {
        let fail = self.fail_on == Some(page);
        let log = Arc::clone(&self.log);
        Box::pin(async move {
            if fail {
                return Err(RenderError::Raster("raster backend went away".to_owned()));
            }
            log.lock().push(format!("page {page}: rendered"));
            Ok(Box::new(LoggingPage { page, log }) as Box<dyn RasterPage>)
        })
    }
}

struct CountingEncoder {
    called: Arc<AtomicBool>,
}

impl DocumentEncoder for CountingEncoder {
    fn encode(&self, pages: Vec<Box<dyn RasterPage>>) -> Result<Vec<u8>, EncodeError> {
        self.called.store(true, Ordering::SeqCst);
        Ok(vec![pages.len() as u8])
    }
}

fn sample_store() -> AnnotationStore {
    let mut store = AnnotationStore::with_pages(2);
    store.append(
        1,
        Annotation::Shape {
            kind: ShapeKind::Square,
            color: ColorId::Red,
            start: pos2(10.0, 10.0),
            end: pos2(40.0, 30.0),
        },
    );
    store.append(
        2,
        Annotation::Text {
            color: ColorId::Black,
            content: "approved".to_owned(),
            anchor: pos2(20.0, 60.0),
            font: Default::default(),
        },
    );
    store
}

#[test]
fn export_composites_each_page_without_clearing() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let renderer = LoggingRenderer {
        page_count: 2,
        fail_on: None,
        log: Arc::clone(&log),
    };
    let called = Arc::new(AtomicBool::new(false));
    let encoder = CountingEncoder {
        called: Arc::clone(&called),
    };

    let bytes = block_on(export_document(&renderer, &encoder, &sample_store(), 1.0)).unwrap();
    assert_eq!(bytes, vec![2]);
    assert!(called.load(Ordering::SeqCst));

    let log = log.lock();
    // Pages render in order and each gets its own annotations, drawn
    // over the page pixels (no clear call anywhere in the export path).
    assert_eq!(log.len(), 4);
    assert_eq!(log[0], "page 1: rendered");
    assert!(log[1].starts_with("page 1: rect"));
    assert_eq!(log[2], "page 2: rendered");
    assert_eq!(log[3], "page 2: text \"approved\"");
    assert!(log.iter().all(|entry| !entry.contains("clear")));
}

#[test]
fn failed_page_render_discards_all_output() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let renderer = LoggingRenderer {
        page_count: 3,
        fail_on: Some(2),
        log,
    };
    let called = Arc::new(AtomicBool::new(false));
    let encoder = CountingEncoder {
        called: Arc::clone(&called),
    };

    let result = block_on(export_document(&renderer, &encoder, &sample_store(), 1.0));
    assert!(result.is_err());
    // Partial output is dropped: the encoder never runs, no bytes leak.
    assert!(!called.load(Ordering::SeqCst));
}

#[test]
fn image_document_round_trip_produces_a_stitched_png() {
    // Two small pages as PNG bytes.
    let mut files = Vec::new();
    for (name, width, height) in [("a.png", 60u32, 40u32), ("b.png", 60, 50)] {
        let page = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(page)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        files.push((name.to_owned(), bytes));
    }
    let document = ImageDocument::decode(&files).unwrap();
    assert_eq!(document.page_count(), 2);

    let mut store = AnnotationStore::with_pages(2);
    store.append(
        1,
        Annotation::Shape {
            kind: ShapeKind::Line,
            color: ColorId::Blue,
            start: pos2(5.0, 20.0),
            end: pos2(55.0, 20.0),
        },
    );

    let bytes =
        block_on(export_document(&document, &StitchedPngEncoder, &store, 1.0)).unwrap();
    let flattened = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(flattened.width(), 60);
    assert_eq!(flattened.height(), 90);

    // The line's ink survived flattening onto page 1...
    let on_line = flattened.get_pixel(30, 20);
    assert_ne!(on_line.0, [255, 255, 255, 255]);
    // ...and page 2 (below the stitch seam) stayed clean.
    let page2_pixel = flattened.get_pixel(30, 70);
    assert_eq!(page2_pixel.0, [255, 255, 255, 255]);
}

#[test]
fn rejected_drops_do_not_build_documents() {
    assert!(matches!(
        ImageDocument::decode(&[]),
        Err(pagemark::EditorError::InvalidInput)
    ));
    assert!(matches!(
        ImageDocument::decode(&[("not_an_image.png".to_owned(), vec![1, 2, 3])]),
        Err(pagemark::EditorError::DecodeFailure(_))
    ));
}
