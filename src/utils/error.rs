// src/utils/error.rs

use thiserror::Error;

/// The primary error type for all operations in the border-tracing library.
#[derive(Error, Debug)]
pub enum CcbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArg(String),

    #[error("image has no foreground pixels")]
    EmptyImage,

    #[error("isolated hole border pixel (hole {hole})")]
    IsolatedHoleBorder { hole: usize },

    #[error("stream is not a ccba container")]
    BadMagic,

    #[error("truncated ccba stream")]
    Truncated,

    #[error("deflate layer failed: {0}")]
    Decompression(String),
}

/// A specialized `Result` type for border-tracing operations.
pub type Result<T> = std::result::Result<T, CcbError>;
