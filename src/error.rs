//! # Error Types
//!
//! This module defines error types used throughout the pclview library.
//!
//! Unrecognized or truncated escape sequences are not errors: the decoder
//! classifies them as [`Command::Unknown`](crate::protocol::Command::Unknown)
//! and keeps going. Only conditions that make the remaining stream
//! untrustworthy surface here.

use thiserror::Error;

/// Main error type for pclview operations
#[derive(Debug, Error)]
pub enum PclError {
    /// The stream ended inside a graphics data payload.
    ///
    /// `row` is the index the scanline would have had; all rows before it
    /// were finalized and are still available from the decoder.
    #[error(
        "Truncated graphics payload for row {row} at offset {offset}: \
         expected {expected} bytes, stream ended after {received}"
    )]
    TruncatedPayload {
        row: usize,
        offset: u64,
        expected: usize,
        received: usize,
    },

    /// A graphics data header declared more bytes than a `u32` can hold.
    ///
    /// The payload boundary is unknown, so decoding cannot resume.
    #[error(
        "Graphics payload for row {row} at offset {offset} declares more than {max} bytes",
        max = u32::MAX
    )]
    PayloadTooLarge { row: usize, offset: u64 },

    /// Graphics data arrived outside a raster block and the decoder was
    /// configured to reject it.
    #[error("Graphics data ({length} bytes) outside raster block at offset {offset}")]
    DataOutsideGraphics { offset: u64, length: usize },

    /// Transport-level errors (serial device setup)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Image rendering or export error
    #[error("Image error: {0}")]
    Image(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
