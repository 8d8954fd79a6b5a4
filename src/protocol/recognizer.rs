//! # Command Recognizer
//!
//! Classifies the bytes that follow an ESC marker.
//!
//! ## Grammar
//!
//! ```text
//! ESC '*' 'b' <digits> 'W'   -> GraphicsData
//! ESC '*' 'b' <digits> 'M'   -> CompressionMode
//! ESC '*' 'r' <digits> 'A'   -> StartGraphics
//! ESC '*' 'r' <digits> 'B'   -> EndGraphics
//! ESC '*' 't' <digits> 'R'   -> Resolution
//! ESC '&' 'k' <digits> 'W'   -> ConfigureWindow
//! anything else              -> Unknown
//! ```
//!
//! A numeric field too large for a `u32` makes the command `Unknown`,
//! except for graphics data: its length frames the payload, so an
//! overflowed length is reported as `OversizedData`.
//!
//! The recognizer reads only as far as the grammar requires. On a mismatch
//! it stops at the offending byte, which is consumed and not retried as a
//! new command. End of stream at any point yields `Unknown`.

use std::io::{self, Read};

use tracing::warn;

use super::commands::{Command, FAMILY_GRAPHICS, FAMILY_WINDOW};
use super::source::ByteSource;

/// Read one byte or bail out of the enclosing function with `Unknown`.
macro_rules! next_or_unknown {
    ($source:expr) => {
        match $source.next_byte()? {
            Some(byte) => byte,
            None => return Ok(Command::Unknown),
        }
    };
}

/// Classify the command following an ESC byte.
///
/// `source` must be positioned just after the ESC. Truncated and
/// unrecognized sequences are `Ok(Command::Unknown)`; only genuine I/O
/// failures are errors.
///
/// ## Example
///
/// ```
/// use pclview::protocol::{recognize, ByteSource, Command};
///
/// let mut source = ByteSource::new(&b"*b72W"[..]);
/// assert_eq!(recognize(&mut source)?, Command::GraphicsData(72));
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn recognize<R: Read>(source: &mut ByteSource<R>) -> io::Result<Command> {
    let family = next_or_unknown!(source);

    match family {
        FAMILY_GRAPHICS => {
            let group = next_or_unknown!(source);
            match group {
                b'b' => {
                    let parameter = read_parameter(source)?;
                    let terminator = next_or_unknown!(source);
                    Ok(match terminator {
                        b'W' => match parameter {
                            Some(length) => Command::GraphicsData(length),
                            None => {
                                warn!("graphics data length exceeds {}", u32::MAX);
                                Command::OversizedData
                            }
                        },
                        b'M' => with_parameter(parameter, Command::CompressionMode),
                        _ => Command::Unknown,
                    })
                }
                b'r' => {
                    let parameter = read_parameter(source)?;
                    let terminator = next_or_unknown!(source);
                    Ok(match terminator {
                        b'A' => with_parameter(parameter, Command::StartGraphics),
                        b'B' => with_parameter(parameter, Command::EndGraphics),
                        _ => Command::Unknown,
                    })
                }
                b't' => {
                    let parameter = read_parameter(source)?;
                    let terminator = next_or_unknown!(source);
                    Ok(match terminator {
                        b'R' => with_parameter(parameter, Command::Resolution),
                        _ => Command::Unknown,
                    })
                }
                _ => Ok(Command::Unknown),
            }
        }
        FAMILY_WINDOW => {
            if next_or_unknown!(source) != b'k' {
                return Ok(Command::Unknown);
            }
            let parameter = read_parameter(source)?;
            if next_or_unknown!(source) != b'W' {
                return Ok(Command::Unknown);
            }
            Ok(with_parameter(parameter, Command::ConfigureWindow))
        }
        _ => Ok(Command::Unknown),
    }
}

/// Build a command from a parameter, demoting overflowed values to `Unknown`.
fn with_parameter(parameter: Option<u32>, build: fn(u32) -> Command) -> Command {
    match parameter {
        Some(value) => build(value),
        None => {
            warn!("numeric field exceeds {}, ignoring command", u32::MAX);
            Command::Unknown
        }
    }
}

/// Read an unsigned decimal field.
///
/// Consumes ASCII digits greedily. The first non-digit byte is pushed back
/// so the caller sees it next. An empty field is 0.
///
/// Returns `None` if the value does not fit in a `u32`; the remaining
/// digits are still consumed so the terminator stays in place.
///
/// ## Example
///
/// ```
/// use pclview::protocol::{read_parameter, ByteSource};
///
/// let mut source = ByteSource::new(&b"123W"[..]);
/// assert_eq!(read_parameter(&mut source)?, Some(123));
/// assert_eq!(source.next_byte()?, Some(b'W'));
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn read_parameter<R: Read>(source: &mut ByteSource<R>) -> io::Result<Option<u32>> {
    let mut value: Option<u32> = Some(0);

    while let Some(byte) = source.next_byte()? {
        if !byte.is_ascii_digit() {
            source.unread(byte);
            break;
        }
        let digit = u32::from(byte - b'0');
        value = value
            .and_then(|v| v.checked_mul(10))
            .and_then(|v| v.checked_add(digit));
    }

    Ok(value)
}

// ============================================================================
// TESTS
// ============================================================================
