//! # PCL Raster Protocol
//!
//! This module implements the small slice of HP PCL that test instruments
//! emit when their "print screen" output is pointed at a raster printer.
//!
//! ## Module Structure
//!
//! - [`commands`]: Command vocabulary and byte builders
//! - [`source`]: Byte reader with one byte of pushback
//! - [`recognizer`]: Classifies the bytes after an ESC marker
//!
//! ## Usage Example
//!
//! ```
//! use pclview::protocol::{commands, recognize, ByteSource, Command};
//!
//! let mut data = Vec::new();
//! data.extend(commands::start_graphics(1));
//! data.extend(commands::graphics_data(&[0xF0, 0x0F]));
//! data.extend(commands::end_graphics());
//!
//! // Skip the ESC, then classify
//! let mut source = ByteSource::new(&data[1..]);
//! assert_eq!(recognize(&mut source)?, Command::StartGraphics(1));
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## Protocol Reference
//!
//! Command shapes follow the "PCL 5 Technical Reference Manual" raster
//! graphics chapter. Only uncompressed raster transfer is supported.

pub mod commands;
pub mod recognizer;
pub mod source;

pub use commands::{Command, ESC};
pub use recognizer::{read_parameter, recognize};
pub use source::ByteSource;
