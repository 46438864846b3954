use thiserror::Error;

use crate::annotation::{AnnotationStore, PageIndex};
use crate::document::{DocumentEncoder, EncodeError, PageRenderer, RenderError};
use crate::renderer;

#[derive(Debug, Clone, Error)]
pub enum ExportError {
    #[error("page rasterization failed: {0}")]
    Render(#[from] RenderError),
    #[error("document encoding failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Flatten the document: rasterize every page, composite its annotations
/// on top (without clearing, so the page pixels survive), and hand the
/// ordered surfaces to the encoder.
///
/// The store is read-only here. Any failure drops the pages collected so
/// far and yields no output file.
pub async fn export_document(
    renderer: &dyn PageRenderer,
    encoder: &dyn DocumentEncoder,
    store: &AnnotationStore,
    scale: f32,
) -> Result<Vec<u8>, ExportError> {
    let page_count = renderer.page_count();
    let mut pages = Vec::with_capacity(page_count);

    for page in 1..=page_count as PageIndex {
        let mut surface = renderer.render_page(page, scale).await?;
        renderer::draw_annotations(surface.as_mut(), store.get(page));
        pages.push(surface);
    }

    let bytes = encoder.encode(pages)?;
    log::info!("export: {page_count} pages, {} bytes", bytes.len());
    Ok(bytes)
}
