//! Layout errors.
//!
//! Only fatal conditions are errors. Precondition violations (a close with
//! no matching open, a finalizer call without frames) are logged and
//! ignored.

use std::path::PathBuf;

use numbat_common::Fx;
use numbat_display::DisplayError;

/// Fatal layout failures; the rest of the document is not laid out.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The primitive tree refused an allocation.
    #[error(transparent)]
    Display(#[from] DisplayError),
    /// Text fitting consumed nothing, so wrapping could never finish.
    #[error("text fitting made no progress at byte {offset} of {len}")]
    NoProgress {
        /// Byte offset into the content token.
        offset: usize,
        /// Length of the content token.
        len: usize,
    },
    /// The configuration could not be used.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Problems loading a [`LayoutConfig`](crate::LayoutConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config {}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The JSON did not describe a configuration.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The viewport must have a positive size.
    #[error("viewport {width}x{height} must be positive")]
    InvalidViewport {
        /// Configured width.
        width: Fx,
        /// Configured height.
        height: Fx,
    },
}
