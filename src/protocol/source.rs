//! # Byte Source
//!
//! A sequential byte reader with a single byte of pushback.
//!
//! The command grammar needs to look at the first non-digit byte after a
//! numeric field without consuming it. [`ByteSource::unread`] puts that
//! byte back so the next [`ByteSource::next_byte`] returns it again.
//!
//! Reads are unbuffered apart from the pushback slot. Wrap slow readers
//! (files, serial ports) in [`std::io::BufReader`] before handing them over.

use std::io::{self, Read};

/// Payload bytes are copied through a stack buffer of this size.
const PAYLOAD_CHUNK: usize = 4096;

/// # Byte Source
///
/// Owns the underlying reader and tracks the absolute offset of the next
/// byte, for error reporting.
///
/// ## Example
///
/// ```
/// use pclview::protocol::ByteSource;
///
/// let mut source = ByteSource::new(&b"7W"[..]);
///
/// let byte = source.next_byte()?.unwrap();
/// assert_eq!(byte, b'7');
/// source.unread(byte);
/// assert_eq!(source.next_byte()?, Some(b'7'));
/// assert_eq!(source.next_byte()?, Some(b'W'));
/// assert_eq!(source.next_byte()?, None);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct ByteSource<R> {
    reader: R,
    pushback: Option<u8>,
    position: u64,
}

impl<R: Read> ByteSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pushback: None,
            position: 0,
        }
    }

    /// Read one byte. `Ok(None)` means end of stream.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.pushback.take() {
            self.position += 1;
            return Ok(Some(byte));
        }

        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.position += 1;
                    return Ok(Some(buf[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Push back the byte that was just read.
    ///
    /// Only one byte can be pending. Calling this twice without a read in
    /// between is a logic error.
    pub fn unread(&mut self, byte: u8) {
        debug_assert!(self.pushback.is_none(), "pushback slot already full");
        debug_assert!(self.position > 0, "unread before any read");

        self.pushback = Some(byte);
        self.position -= 1;
    }

    /// Append up to `len` bytes to `buf`, stopping early only at end of
    /// stream. Returns the number of bytes appended.
    ///
    /// `buf` grows as data arrives, so a bogus length in a corrupt stream
    /// does not trigger a huge allocation up front.
    pub fn read_payload(&mut self, len: usize, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.pump(len, |chunk| buf.extend_from_slice(chunk))
    }

    /// Consume up to `len` bytes without keeping them. Returns the number
    /// of bytes consumed.
    pub fn skip(&mut self, len: usize) -> io::Result<usize> {
        self.pump(len, |_| {})
    }

    /// Feed up to `len` bytes to `sink`, chunk by chunk.
    fn pump<F: FnMut(&[u8])>(&mut self, len: usize, mut sink: F) -> io::Result<usize> {
        let mut received = 0;

        if len > 0 {
            if let Some(byte) = self.pushback.take() {
                sink(std::slice::from_ref(&byte));
                received += 1;
            }
        }

        let mut chunk = [0u8; PAYLOAD_CHUNK];
        while received < len {
            let want = (len - received).min(PAYLOAD_CHUNK);
            match self.reader.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(n) => {
                    sink(&chunk[..n]);
                    received += n;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.position += received as u64;
                    return Err(e);
                }
            }
        }

        self.position += received as u64;
        Ok(received)
    }

    /// Absolute offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Give back the underlying reader. A pending pushback byte is lost.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
