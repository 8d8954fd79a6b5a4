//! Counters collected while decoding.

use serde::Serialize;

/// What the decoder saw, beyond the scanlines themselves.
///
/// `resolution_dpi`, `compression_mode` and `window_parameter` hold the
/// last value seen; the decoder does not act on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeStats {
    /// Bytes consumed from the source
    pub bytes_read: u64,
    /// Escape sequences seen, recognized or not
    pub commands: usize,
    /// Escape sequences classified as unknown or truncated
    pub unknown_commands: usize,
    /// Idle to graphics transitions
    pub graphics_blocks: usize,
    /// Scanlines collected
    pub rows: usize,
    /// Graphics data payloads skipped because they arrived while idle
    pub discarded_rows: usize,
    pub resolution_dpi: Option<u32>,
    pub compression_mode: Option<u32>,
    pub window_parameter: Option<u32>,
}
