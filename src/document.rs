use egui::{ColorImage, Vec2};
use futures::future::BoxFuture;
use thiserror::Error;

use crate::annotation::PageIndex;
use crate::renderer::Surface;

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("page {0} does not exist")]
    PageOutOfRange(PageIndex),
    #[error("rasterization failed: {0}")]
    Raster(String),
}

#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    #[error("nothing to encode")]
    Empty,
    #[error("encoding failed: {0}")]
    Encode(String),
}

/// A rendered page raster that can also be drawn on: the page pixels plus
/// the 2D primitives the render bridge replays annotations with. This is
/// what the canvas was in the browser original.
pub trait RasterPage: Surface + Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// The pixels, for texture upload and for encoders.
    fn to_color_image(&self) -> ColorImage;
}

/// The page-rasterizing collaborator. Implementations decode a document
/// elsewhere and serve rasters of its pages; for a given `scale` the
/// resulting pixel dimensions must be deterministic.
///
/// Rendering is asynchronous; callers hold the returned future as a task
/// and must not block the event loop on it.
pub trait PageRenderer: Send + Sync {
    fn page_count(&self) -> usize;

    /// Base (scale 1.0) pixel size of `page`, used for layout before the
    /// raster arrives.
    fn page_size(&self, page: PageIndex) -> Option<Vec2>;

    fn render_page(
        &self,
        page: PageIndex,
        scale: f32,
    ) -> BoxFuture<'static, Result<Box<dyn RasterPage>, RenderError>>;
}

/// The final-file collaborator: consumes the ordered, already-composited
/// page rasters and produces a single output file. Overall page size is
/// conventionally taken from the first surface, orientation from whether
/// it is wider than tall.
pub trait DocumentEncoder: Send + Sync {
    fn encode(&self, pages: Vec<Box<dyn RasterPage>>) -> Result<Vec<u8>, EncodeError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page: PageIndex,
    pub scale: f32,
}

/// Single-slot render scheduling: one raster in flight at a time, and a
/// newer request simply overwrites the waiting slot (last-request-wins).
/// In-flight work is never aborted; a superseded result is still
/// delivered and simply overwritten by the newer one.
#[derive(Debug, Default)]
pub struct RenderQueue {
    busy: bool,
    pending: Option<RenderRequest>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a render. Returns the request to start now, or `None` if
    /// one is already in flight (the new request parks in the slot).
    pub fn request(&mut self, request: RenderRequest) -> Option<RenderRequest> {
        if self.busy {
            self.pending = Some(request);
            None
        } else {
            self.busy = true;
            Some(request)
        }
    }

    /// The in-flight render completed. Returns the parked request to
    /// start next, if any; otherwise the queue goes quiet.
    pub fn finished(&mut self) -> Option<RenderRequest> {
        match self.pending.take() {
            Some(next) => Some(next), // stays busy with the parked job
            None => {
                self.busy = false;
                None
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_queue_starts_requests_immediately() {
        let mut queue = RenderQueue::new();
        let req = RenderRequest { page: 1, scale: 1.0 };
        assert_eq!(queue.request(req), Some(req));
        assert!(queue.is_busy());
    }

    #[test]
    fn busy_queue_parks_the_newest_request() {
        let mut queue = RenderQueue::new();
        queue.request(RenderRequest { page: 1, scale: 1.0 });

        assert_eq!(queue.request(RenderRequest { page: 2, scale: 1.0 }), None);
        assert_eq!(queue.request(RenderRequest { page: 3, scale: 1.0 }), None);

        // Only the newest parked request survives.
        let next = queue.finished();
        assert_eq!(next, Some(RenderRequest { page: 3, scale: 1.0 }));
        assert!(queue.is_busy());

        assert_eq!(queue.finished(), None);
        assert!(!queue.is_busy());
    }
}
