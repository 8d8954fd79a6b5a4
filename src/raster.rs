//! # Decoded Raster
//!
//! The decoder's output: scanlines in the order their data commands
//! appeared in the stream.
//!
//! ## Bit Packing
//!
//! Each scanline byte covers 8 horizontal pixels:
//! - Bit 7 (MSB) = leftmost pixel
//! - Bit 0 (LSB) = rightmost pixel
//! - 1 = black, 0 = white
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```
//!
//! Rows may have different lengths. The raster is as wide as its widest row.

use std::ops::Deref;

/// One row of packed monochrome pixels.
///
/// Built once from a complete payload and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scanline {
    data: Box<[u8]>,
}

impl Scanline {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: data.into_boxed_slice(),
        }
    }

    /// Declared byte length of the row.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Width in pixels (8 per byte).
    #[inline]
    pub fn width_dots(&self) -> usize {
        self.data.len() * 8
    }

    /// Whether the pixel at `x` is black. Pixels past the end are white.
    pub fn is_black(&self, x: usize) -> bool {
        match self.data.get(x / 8) {
            Some(byte) => (byte >> (7 - (x % 8))) & 1 == 1,
            None => false,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data.into_vec()
    }
}

impl Deref for Scanline {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for Scanline {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

/// # Raster
///
/// Ordered scanlines from one decode run (or one page of a capture).
///
/// ## Geometry
///
/// ```text
/// width_dots  = 8 × widest row in bytes
/// height_dots = number of rows
/// ```
///
/// ## Example
///
/// ```
/// use pclview::raster::Raster;
///
/// let raster = Raster::from_rows(vec![vec![0xFF, 0x00], vec![0x80]]);
/// assert_eq!(raster.row_count(), 2);
/// assert_eq!(raster.width_bytes(), 2);
/// assert_eq!(raster.width_dots(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Raster {
    rows: Vec<Scanline>,
}

impl Raster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows<T: Into<Scanline>>(rows: Vec<T>) -> Self {
        Self {
            rows: rows.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn push(&mut self, row: Scanline) {
        self.rows.push(row);
    }

    /// Move every row out, leaving this raster empty.
    pub(crate) fn take(&mut self) -> Raster {
        std::mem::take(self)
    }

    pub fn rows(&self) -> &[Scanline] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Length of the widest row, in bytes.
    pub fn width_bytes(&self) -> usize {
        self.rows.iter().map(Scanline::len).max().unwrap_or(0)
    }

    /// Image width in pixels.
    pub fn width_dots(&self) -> usize {
        self.width_bytes() * 8
    }

    /// Image height in pixels (one per row).
    pub fn height_dots(&self) -> usize {
        self.rows.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scanline> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Scanline> {
        self.rows
    }
}

impl<'a> IntoIterator for &'a Raster {
    type Item = &'a Scanline;
    type IntoIter = std::slice::Iter<'a, Scanline>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for Raster {
    type Item = Scanline;
    type IntoIter = std::vec::IntoIter<Scanline>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
