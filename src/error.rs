//! Provides the top-level error type for the thumbnail pipeline.
//!
//! Model loading has its own error type ([`crate::formats::LoadError`]);
//! everything else that can fail during a run funnels through [`Error`].
//!
//! # Examples
//! ```
//! use modelshot::error::Error;
//!
//! let err = Error::DegenerateBounds { axis: 'y' };
//! assert!(format!("{}", err).contains("zero-sized"));
//! ```

use std::path::PathBuf;

use crate::formats::LoadError;

/// Errors surfaced by the framing, lighting, and output stages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The model's bounding box has a zero-sized extent on one axis, so no
    /// finite framing scale exists.
    #[error("model has a zero-sized extent on axis {axis}; cannot frame it")]
    DegenerateBounds {
        /// The offending axis, `'x'`, `'y'`, or `'z'`.
        axis: char,
    },

    /// The IBL directory could not be used.
    #[error("invalid IBL at {path}: {message}")]
    Ibl {
        /// The path that was inspected.
        path: PathBuf,
        /// What went wrong with it.
        message: String,
    },

    /// A model file failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The output image could not be encoded or written.
    #[error("failed to write {path}: {source}")]
    Encode {
        /// The destination path.
        path: PathBuf,
        /// The encoder failure.
        #[source]
        source: image::ImageError,
    },

    /// An IO error outside of model loading.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The result type used throughout the crate.
///
/// # Examples
/// ```
/// use modelshot::error::Result;
///
/// let ok: Result<u32> = Ok(1);
/// assert!(ok.is_ok());
/// ```
pub type Result<T> = std::result::Result<T, Error>;
