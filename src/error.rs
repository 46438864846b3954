use thiserror::Error;

use crate::annotation::StoreError;
use crate::export::ExportError;

/// Top-level error taxonomy, as surfaced to the user.
///
/// Collaborator failures (decode, render, encode) are caught at the
/// boundary and turned into these; the annotation store and the history
/// engine never fail in normal operation (undo at the baseline is a
/// no-op gated by `can_undo`, not an error).
#[derive(Debug, Error)]
pub enum EditorError {
    /// The selected file is not a document we can open. Rejected with a
    /// message; no state changes.
    #[error("not a supported document file")]
    InvalidInput,

    /// The document failed to parse; the editing session is not entered.
    #[error("failed to decode document: {0}")]
    DecodeFailure(String),

    /// Store or history index misuse. A programming error, not a user
    /// condition; call sites assert on it rather than swallowing it.
    #[error(transparent)]
    OutOfRange(#[from] StoreError),

    /// Rasterization or encoding failed mid-export; partial output is
    /// discarded and no file is produced.
    #[error("export failed: {0}")]
    ExportFailure(#[from] ExportError),
}
