//! # PCL Raster Commands
//!
//! This module defines the command vocabulary understood by the decoder and
//! byte builders that produce each command.
//!
//! ## Escape Sequence Structure
//!
//! Every command has the same shape:
//!
//! ```text
//! ESC  family  group  #  terminator
//! 1B   '*'     'b'    3  'W'         ESC*b3W  (graphics data, 3 bytes)
//! 1B   '&'     'k'    2  'W'         ESC&k2W  (window/config)
//! ```
//!
//! `#` is an unsigned decimal number written in ASCII digits. It may be
//! empty, in which case the value is 0.
//!
//! ## Supported Vocabulary
//!
//! | Sequence | Meaning | Parameter |
//! |----------|---------|-----------|
//! | `ESC*r#A` | Start raster graphics | mode (ignored) |
//! | `ESC*b#W` | Graphics data | payload byte count |
//! | `ESC*b#M` | Compression mode | mode (ignored) |
//! | `ESC*r#B` | End raster graphics | ignored |
//! | `ESC*t#R` | Raster resolution | dots per inch (ignored) |
//! | `ESC&k#W` | Window/config | length (ignored) |
//!
//! Only uncompressed rows are understood. The compression mode parameter is
//! recorded but never applied to the payload.

use crate::raster::Raster;

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
///
/// Hex: 0x1B, Decimal: 27
pub const ESC: u8 = 0x1B;

/// Raster/graphics command family (`ESC *`)
pub const FAMILY_GRAPHICS: u8 = b'*';

/// Keyboard/window command family (`ESC &`)
pub const FAMILY_WINDOW: u8 = b'&';

// ============================================================================
// COMMAND
// ============================================================================

/// Result of classifying one escape sequence.
///
/// Variants that read a numeric field carry it, even when the decoder has
/// no use for the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// No command. Never produced by the recognizer.
    None,
    /// `ESC*b#W`: `#` bytes of scanline payload follow.
    GraphicsData(u32),
    /// `ESC*b#M`
    CompressionMode(u32),
    /// `ESC*r#A`
    StartGraphics(u32),
    /// `ESC*r#B`
    EndGraphics(u32),
    /// `ESC*t#R`, value in dots per inch
    Resolution(u32),
    /// `ESC&k#W`
    ConfigureWindow(u32),
    /// `ESC*b#W` whose byte count does not fit in a `u32`. The payload
    /// cannot be skipped, so the decoder treats this as fatal.
    OversizedData,
    /// Unrecognized or truncated sequence
    Unknown,
}

impl Command {
    /// Short human-readable name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::None => "none",
            Command::GraphicsData(_) => "graphics-data",
            Command::CompressionMode(_) => "compression-mode",
            Command::StartGraphics(_) => "start-graphics",
            Command::EndGraphics(_) => "end-graphics",
            Command::Resolution(_) => "resolution",
            Command::ConfigureWindow(_) => "configure-window",
            Command::OversizedData => "oversized-data",
            Command::Unknown => "unknown",
        }
    }

    /// The numeric field of the sequence, if this variant carries one.
    pub fn parameter(&self) -> Option<u32> {
        match *self {
            Command::GraphicsData(n)
            | Command::CompressionMode(n)
            | Command::StartGraphics(n)
            | Command::EndGraphics(n)
            | Command::Resolution(n)
            | Command::ConfigureWindow(n) => Some(n),
            Command::None | Command::OversizedData | Command::Unknown => None,
        }
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Assemble `ESC family group <digits> terminator`.
fn sequence(family: u8, group: u8, parameter: Option<u32>, terminator: u8) -> Vec<u8> {
    let mut cmd = vec![ESC, family, group];
    if let Some(value) = parameter {
        cmd.extend_from_slice(value.to_string().as_bytes());
    }
    cmd.push(terminator);
    cmd
}

/// # Start Raster Graphics (ESC * r # A)
///
/// Enters graphics mode. Instruments send `1` (start at current cursor
/// position); the decoder ignores the value.
///
/// ## Example
///
/// ```
/// use pclview::protocol::commands;
///
/// assert_eq!(commands::start_graphics(1), b"\x1b*r1A");
/// ```
pub fn start_graphics(mode: u32) -> Vec<u8> {
    sequence(FAMILY_GRAPHICS, b'r', Some(mode), b'A')
}

/// # End Raster Graphics (ESC * r B)
///
/// Leaves graphics mode. Emitted without a numeric field, which reads as 0.
pub fn end_graphics() -> Vec<u8> {
    sequence(FAMILY_GRAPHICS, b'r', None, b'B')
}

/// # Transfer Raster Data (ESC * b # W data...)
///
/// One scanline: the header declares the byte count and exactly that many
/// raw bytes follow. The payload is not escaped, so it may contain 0x1B.
///
/// ## Example
///
/// ```
/// use pclview::protocol::commands;
///
/// let cmd = commands::graphics_data(&[0xAA, 0x1B, 0xFF]);
/// assert_eq!(&cmd[..6], b"\x1b*b3W");
/// assert_eq!(&cmd[6..], &[0xAA, 0x1B, 0xFF]);
/// ```
///
/// ## Panics
///
/// Panics if `row` is longer than `u32::MAX` bytes, which the header cannot
/// express.
pub fn graphics_data(row: &[u8]) -> Vec<u8> {
    let mut cmd = sequence(FAMILY_GRAPHICS, b'b', Some(row_length(row.len())), b'W');
    cmd.extend_from_slice(row);
    cmd
}

fn row_length(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(length) => length,
        Err(_) => panic!("row of {} bytes exceeds the {} byte header limit", len, u32::MAX),
    }
}

/// # Set Compression Method (ESC * b # M)
pub fn compression_mode(mode: u32) -> Vec<u8> {
    sequence(FAMILY_GRAPHICS, b'b', Some(mode), b'M')
}

/// # Raster Resolution (ESC * t # R)
pub fn resolution(dpi: u32) -> Vec<u8> {
    sequence(FAMILY_GRAPHICS, b't', Some(dpi), b'R')
}

/// # Window/Config (ESC & k # W)
pub fn configure_window(length: u32) -> Vec<u8> {
    sequence(FAMILY_WINDOW, b'k', Some(length), b'W')
}

/// Serialize a whole raster as a single graphics block.
///
/// Emits resolution, start, one data command per row, then end. Decoding
/// the result yields the same rows in the same order.
///
/// ## Example
///
/// ```
/// use pclview::protocol::commands;
/// use pclview::raster::Raster;
///
/// let raster = Raster::from_rows(vec![vec![0xF0], vec![0x0F]]);
/// let bytes = commands::encode_raster(&raster, 75);
///
/// assert_eq!(pclview::decode_bytes(&bytes)?, raster);
/// # Ok::<(), pclview::PclError>(())
/// ```
pub fn encode_raster(raster: &Raster, dpi: u32) -> Vec<u8> {
    let payload: usize = raster.rows().iter().map(|row| row.len() + 16).sum();

    let mut out = Vec::with_capacity(payload + 32);
    out.extend(resolution(dpi));
    out.extend(start_graphics(1));
    for row in raster.rows() {
        out.extend(graphics_data(row.as_bytes()));
    }
    out.extend(end_graphics());
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_graphics() {
        assert_eq!(start_graphics(1), vec![0x1B, b'*', b'r', b'1', b'A']);
        assert_eq!(start_graphics(0), b"\x1b*r0A");
    }

    #[test]
    fn test_end_graphics_has_no_digits() {
        assert_eq!(end_graphics(), b"\x1b*rB");
    }

    #[test]
    fn test_graphics_data_multi_digit_header() {
        let row = vec![0x55; 123];
        let cmd = graphics_data(&row);

        assert_eq!(&cmd[..8], b"\x1b*b123W");
        assert_eq!(cmd.len(), 8 + 123);
        assert_eq!(&cmd[8..], &row[..]);
    }

    #[test]
    fn test_graphics_data_empty_row() {
        assert_eq!(graphics_data(&[]), b"\x1b*b0W");
    }

    #[test]
    fn test_row_length_at_limit() {
        assert_eq!(row_length(u32::MAX as usize), u32::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    #[should_panic(expected = "exceeds")]
    fn test_row_length_past_limit_panics() {
        row_length(u32::MAX as usize + 1);
    }

    #[test]
    fn test_other_commands() {
        assert_eq!(compression_mode(0), b"\x1b*b0M");
        assert_eq!(resolution(75), b"\x1b*t75R");
        assert_eq!(configure_window(2), b"\x1b&k2W");
    }

    #[test]
    fn test_encode_raster_layout() {
        let raster = Raster::from_rows(vec![vec![0xAA, 0x00], vec![0xFF]]);
        let bytes = encode_raster(&raster, 100);

        let mut expected: Vec<u8> = Vec::new();
        expected.extend(b"\x1b*t100R");
        expected.extend(b"\x1b*r1A");
        expected.extend(b"\x1b*b2W\xaa\x00");
        expected.extend(b"\x1b*b1W\xff");
        expected.extend(b"\x1b*rB");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encode_empty_raster() {
        let bytes = encode_raster(&Raster::default(), 75);
        assert_eq!(bytes, b"\x1b*t75R\x1b*r1A\x1b*rB");
    }

    #[test]
    fn test_command_parameter() {
        assert_eq!(Command::GraphicsData(64).parameter(), Some(64));
        assert_eq!(Command::Resolution(150).parameter(), Some(150));
        assert_eq!(Command::Unknown.parameter(), None);
        assert_eq!(Command::None.parameter(), None);
        assert_eq!(Command::OversizedData.parameter(), None);
    }

    #[test]
    fn test_command_name() {
        assert_eq!(Command::StartGraphics(1).name(), "start-graphics");
        assert_eq!(Command::ConfigureWindow(0).name(), "configure-window");
    }
}
