//! # Raw Stream Dump
//!
//! Copies every byte read from a transport into a writer, so a live capture
//! can be kept on disk and decoded again later with `pclview render`.
//!
//! A capture that fails part way (a truncated row, a stray header) is the
//! case this exists for: the rendered image is lost but the raw bytes are
//! not.

use std::io::{self, Read, Write};

/// # Raw Dump Reader
///
/// Wraps a reader and writes each chunk it returns to `sink` before handing
/// it on. Bytes are written as they arrive, so nothing is lost when the
/// capture is interrupted.
///
/// ## Example
///
/// ```
/// use std::io::Read;
/// use pclview::transport::RawDump;
///
/// let mut raw = Vec::new();
/// let mut reader = RawDump::new(&b"\x1b*r1A"[..], &mut raw);
///
/// let mut seen = Vec::new();
/// reader.read_to_end(&mut seen)?;
/// drop(reader);
///
/// assert_eq!(raw, seen);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct RawDump<R, W> {
    inner: R,
    sink: W,
    written: u64,
}

impl<R: Read, W: Write> RawDump<R, W> {
    pub fn new(inner: R, sink: W) -> Self {
        Self {
            inner,
            sink,
            written: 0,
        }
    }

    /// Bytes copied to the sink so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_parts(self) -> (R, W) {
        (self.inner, self.sink)
    }
}

impl<R: Read, W: Write> Read for RawDump<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.sink.write_all(&buf[..n])?;
            self.sink.flush()?;
            self.written += n as u64;
        }
        Ok(n)
    }
}
