//! Engine error taxonomy.
//!
//! Frame-level errors are fatal only for the frame being processed; the
//! report walker catches them and leaves the frame unsymbolicated. A
//! directory build failure is fatal for the whole pass and surfaces before
//! any frame is looked at.

/// An error symbolicating a single frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The symbol cache reported an architecture we have no register or
    /// address-correction table for.
    #[error("unsupported architecture {0:?}")]
    UnsupportedArchitecture(String),

    /// The frame references an image index outside the report's image list.
    #[error("frame references image {index}, but the report lists {count} images")]
    InvalidImageIndex { index: usize, count: usize },

    /// The symbol cache lookup itself failed (for example a corrupt cache).
    /// Distinct from a lookup that succeeds with no results.
    #[error("symbol cache lookup failed")]
    LookupFailed(#[source] anyhow::Error),
}

/// An image in a debug archive could not produce a symbol cache. No partial
/// directory is exposed when this occurs.
#[derive(Debug, thiserror::Error)]
#[error("failed to build symbol cache directory")]
pub struct DirectoryBuildError(#[source] pub anyhow::Error);
