//! # Stream Decoder
//!
//! Drives a PCL byte stream from start to end, tracking graphics mode and
//! collecting scanlines in stream order.
//!
//! ## State Machine
//!
//! ```text
//!              ESC*r#A
//!   ┌──────┐ ──────────► ┌────────────┐ ◄─┐
//!   │ Idle │             │ InGraphics │   │ ESC*b#W + payload
//!   └──────┘ ◄────────── └────────────┘ ──┘  (one scanline)
//!              ESC*r#B
//! ```
//!
//! Bytes outside escape sequences are skipped. Graphics data while idle is
//! handled by [`OutOfContextPolicy`]. Every other command leaves the state
//! alone.
//!
//! ## Framing
//!
//! A graphics payload is delimited only by its declared length. It may
//! contain 0x1B bytes, which must not be mistaken for commands, so the
//! payload is always read in full before scanning resumes. A stream that
//! ends inside a payload fails with [`PclError::TruncatedPayload`]; no
//! partial scanline is emitted.
//!
//! A header whose length does not fit in a `u32` leaves the payload
//! boundary unknown and fails with [`PclError::PayloadTooLarge`].
//!
//! ## Example
//!
//! ```
//! use pclview::decoder::Decoder;
//!
//! let stream = b"\x1b*r1A\x1b*b3W\xAA\x00\xFF\x1b*r0B";
//!
//! let mut decoder = Decoder::new(&stream[..]);
//! decoder.run()?;
//! let raster = decoder.finish();
//!
//! assert_eq!(raster.row_count(), 1);
//! assert_eq!(raster.rows()[0].as_bytes(), &[0xAA, 0x00, 0xFF]);
//! # Ok::<(), pclview::PclError>(())
//! ```

mod stats;

pub use stats::DecodeStats;

use std::io::{BufReader, Read};

use tracing::{debug, trace, warn};

use crate::config::{DecoderConfig, OutOfContextPolicy};
use crate::error::PclError;
use crate::protocol::{ByteSource, Command, ESC, recognize};
use crate::raster::{Raster, Scanline};

/// Whether graphics data commands currently produce scanlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphicsState {
    #[default]
    Idle,
    InGraphics,
}

/// Outcome of one step of the top-level loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Continue,
    /// A raster block with at least one row just ended.
    PageComplete,
    EndOfStream,
}

/// # Stream Decoder
///
/// Owns the byte source for the whole run. Use [`Decoder::run`] to decode
/// to end of stream, or [`Decoder::next_page`] to pull one completed
/// graphics block at a time from a stream that never ends (a serial port).
pub struct Decoder<R> {
    source: ByteSource<R>,
    config: DecoderConfig,
    state: GraphicsState,
    raster: Raster,
    stats: DecodeStats,
}

impl<R: Read> Decoder<R> {
    /// Decoder with the default (lenient) configuration.
    ///
    /// Reads one byte at a time; wrap files and devices in a `BufReader`.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    pub fn with_config(reader: R, config: DecoderConfig) -> Self {
        Self {
            source: ByteSource::new(reader),
            config,
            state: GraphicsState::Idle,
            raster: Raster::new(),
            stats: DecodeStats::default(),
        }
    }

    pub fn state(&self) -> GraphicsState {
        self.state
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Rows finalized so far. After a fatal error these are the rows that
    /// were complete before the failure.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.source.position()
    }

    /// Decode until end of stream.
    pub fn run(&mut self) -> Result<(), PclError> {
        while self.advance()? != Progress::EndOfStream {}
        debug!(
            rows = self.raster.row_count(),
            bytes = self.stats.bytes_read,
            "end of stream"
        );
        Ok(())
    }

    /// Decode until a graphics block with at least one row has ended, and
    /// return that block's rows.
    ///
    /// At end of stream, returns whatever rows are pending (a block that
    /// was never closed), or `None` if there are none.
    pub fn next_page(&mut self) -> Result<Option<Raster>, PclError> {
        loop {
            match self.advance()? {
                Progress::Continue => {}
                Progress::PageComplete => {
                    debug!(rows = self.raster.row_count(), "page complete");
                    return Ok(Some(self.raster.take()));
                }
                Progress::EndOfStream => {
                    if self.raster.is_empty() {
                        return Ok(None);
                    }
                    debug!(
                        rows = self.raster.row_count(),
                        "stream ended inside a graphics block"
                    );
                    return Ok(Some(self.raster.take()));
                }
            }
        }
    }

    /// Finalized scanlines, in stream order.
    pub fn finish(self) -> Raster {
        self.raster
    }

    /// Process one top-level unit: a plain byte or a whole command.
    fn advance(&mut self) -> Result<Progress, PclError> {
        let Some(byte) = self.source.next_byte()? else {
            self.stats.bytes_read = self.source.position();
            return Ok(Progress::EndOfStream);
        };

        if byte != ESC {
            self.stats.bytes_read = self.source.position();
            return Ok(Progress::Continue);
        }

        let offset = self.source.position() - 1;
        let command = recognize(&mut self.source)?;
        self.stats.commands += 1;
        trace!(offset, command = command.name(), parameter = ?command.parameter(), "command");

        let progress = self.apply(command, offset)?;
        self.stats.bytes_read = self.source.position();
        Ok(progress)
    }

    /// Transition table.
    fn apply(&mut self, command: Command, offset: u64) -> Result<Progress, PclError> {
        match command {
            Command::None => {
                debug!(offset, "no command");
            }
            Command::GraphicsData(length) => {
                self.graphics_data(length, offset)?;
            }
            Command::OversizedData => {
                return Err(PclError::PayloadTooLarge {
                    row: self.raster.row_count(),
                    offset,
                });
            }
            Command::CompressionMode(mode) => {
                self.stats.compression_mode = Some(mode);
            }
            Command::StartGraphics(_) => {
                if self.state == GraphicsState::Idle {
                    self.stats.graphics_blocks += 1;
                }
                self.state = GraphicsState::InGraphics;
            }
            Command::EndGraphics(_) => {
                self.state = GraphicsState::Idle;
                if !self.raster.is_empty() {
                    return Ok(Progress::PageComplete);
                }
            }
            Command::Resolution(dpi) => {
                self.stats.resolution_dpi = Some(dpi);
            }
            Command::ConfigureWindow(length) => {
                self.stats.window_parameter = Some(length);
            }
            Command::Unknown => {
                self.stats.unknown_commands += 1;
            }
        }
        Ok(Progress::Continue)
    }

    fn graphics_data(&mut self, length: u32, offset: u64) -> Result<(), PclError> {
        let expected = usize::try_from(length).unwrap_or(usize::MAX);
        let row = self.raster.row_count();

        if self.state == GraphicsState::Idle {
            return match self.config.out_of_context {
                OutOfContextPolicy::Reject => Err(PclError::DataOutsideGraphics {
                    offset,
                    length: expected,
                }),
                OutOfContextPolicy::Discard => {
                    warn!(offset, length, "graphics data outside raster block, discarding");
                    let received = self.source.skip(expected)?;
                    if received < expected {
                        return Err(PclError::TruncatedPayload {
                            row,
                            offset,
                            expected,
                            received,
                        });
                    }
                    self.stats.discarded_rows += 1;
                    Ok(())
                }
            };
        }

        let mut data = Vec::new();
        let received = self.source.read_payload(expected, &mut data)?;
        if received < expected {
            return Err(PclError::TruncatedPayload {
                row,
                offset,
                expected,
                received,
            });
        }

        self.raster.push(Scanline::new(data));
        self.stats.rows += 1;
        Ok(())
    }
}

// ============================================================================
// CONVENIENCE FUNCTIONS
// ============================================================================

/// Decode a whole stream with the default configuration.
///
/// The reader is buffered internally.
pub fn decode<R: Read>(reader: R) -> Result<Raster, PclError> {
    decode_with(reader, DecoderConfig::default())
}

/// Decode a whole stream with an explicit configuration.
pub fn decode_with<R: Read>(reader: R, config: DecoderConfig) -> Result<Raster, PclError> {
    let mut decoder = Decoder::with_config(BufReader::new(reader), config);
    decoder.run()?;
    Ok(decoder.finish())
}

/// Decode an in-memory stream with the default configuration.
///
/// ## Example
///
/// ```
/// let raster = pclview::decode_bytes(b"no escape bytes here")?;
/// assert!(raster.is_empty());
/// # Ok::<(), pclview::PclError>(())
/// ```
pub fn decode_bytes(bytes: &[u8]) -> Result<Raster, PclError> {
    let mut decoder = Decoder::new(bytes);
    decoder.run()?;
    Ok(decoder.finish())
}

// ============================================================================
// TESTS
// ============================================================================
