//! # Raster Rendering
//!
//! Expands decoded scanlines into a monochrome image and writes it to disk.
//!
//! ## Pixel Mapping
//!
//! ```text
//! (0,0) ──────────────────────► X   (8 × widest row, in bytes)
//!   │   row 0: byte 0 bit 7 → x=0, bit 6 → x=1, ... byte 1 bit 7 → x=8
//!   │   row 1
//!   ▼
//!   Y   (one pixel per scanline)
//! ```
//!
//! Set bits are black, clear bits white. Rows shorter than the widest are
//! padded with white on the right.
//!
//! ## Export Formats
//!
//! | Extension | Format |
//! |-----------|--------|
//! | `.png` | PNG (default when the path has no extension) |
//! | `.jpg`, `.jpeg` | JPEG |
//! | `.bmp` | BMP |
//! | `.tif`, `.tiff` | TIFF |

use std::path::{Path, PathBuf};

use image::{GrayImage, ImageEncoder, ImageFormat, Luma};
use tracing::debug;

use crate::error::PclError;
use crate::raster::Raster;

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// Formats accepted by [`save`].
const EXPORT_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// Expand a raster into an 8-bit grayscale image.
///
/// Fails with [`PclError::Image`] if either dimension does not fit in a
/// `u32`. An empty raster gives a 0x0 image.
///
/// ## Example
///
/// ```
/// use pclview::raster::Raster;
/// use pclview::render;
///
/// let raster = Raster::from_rows(vec![vec![0x80], vec![0x01, 0xFF]]);
/// let img = render::to_image(&raster)?;
///
/// assert_eq!(img.dimensions(), (16, 2));
/// assert_eq!(img.get_pixel(0, 0).0, [0]);   // MSB set: black
/// assert_eq!(img.get_pixel(1, 0).0, [255]);
/// assert_eq!(img.get_pixel(8, 0).0, [255]); // past the short row: white
/// # Ok::<(), pclview::PclError>(())
/// ```
pub fn to_image(raster: &Raster) -> Result<GrayImage, PclError> {
    let (width, height) = image_size(raster.width_dots(), raster.height_dots())?;

    let mut img = GrayImage::from_pixel(width, height, WHITE);

    for (y, row) in (0..height).zip(raster.iter()) {
        for (x, dot) in (0..width).zip(0..row.width_dots()) {
            if row.is_black(dot) {
                img.put_pixel(x, y, BLACK);
            }
        }
    }

    Ok(img)
}

/// Image dimensions for a raster of the given size in dots.
fn image_size(width_dots: usize, height_dots: usize) -> Result<(u32, u32), PclError> {
    match (u32::try_from(width_dots), u32::try_from(height_dots)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(PclError::Image(format!(
            "Raster of {}x{} dots is too large for an image",
            width_dots, height_dots
        ))),
    }
}

/// Encode a raster as PNG bytes.
pub fn to_png_bytes(raster: &Raster) -> Result<Vec<u8>, PclError> {
    ensure_drawable(raster)?;
    let img = to_image(raster)?;

    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .map_err(|e| PclError::Image(format!("Failed to encode PNG: {}", e)))?;

    Ok(png_bytes)
}

/// Resolve the path an image will be written to.
///
/// A path without an extension gets `.png` appended.
pub fn output_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("png")
    }
}

/// Render a raster and write it to `path`, choosing the format from the
/// file extension. Returns the path actually written.
pub fn save(raster: &Raster, path: &Path) -> Result<PathBuf, PclError> {
    ensure_drawable(raster)?;

    let path = output_path(path);
    let format = ImageFormat::from_path(&path)
        .ok()
        .filter(|format| EXPORT_FORMATS.contains(format))
        .ok_or_else(|| {
            PclError::Image(format!(
                "Unsupported image format for {} (use png, jpg, bmp or tiff)",
                path.display()
            ))
        })?;

    let img = to_image(raster)?;
    img.save_with_format(&path, format)
        .map_err(|e| PclError::Image(format!("Failed to save {}: {}", path.display(), e)))?;

    debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "saved image"
    );
    Ok(path)
}

fn ensure_drawable(raster: &Raster) -> Result<(), PclError> {
    if raster.width_dots() == 0 || raster.height_dots() == 0 {
        return Err(PclError::Image(
            "Nothing to render: no graphics rows were decoded".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_dimensions() {
        let raster = Raster::from_rows(vec![vec![0u8; 64]; 276]);
        let img = to_image(&raster).unwrap();
        assert_eq!(img.dimensions(), (512, 276));
    }

    #[test]
    fn test_bit_order_msb_first() {
        let raster = Raster::from_rows(vec![vec![0b1010_0001u8]]);
        let img = to_image(&raster).unwrap();

        let pixels: Vec<u8> = (0..8).map(|x| img.get_pixel(x, 0).0[0]).collect();
        assert_eq!(pixels, vec![0, 255, 0, 255, 255, 255, 255, 0]);
    }

    #[test]
    fn test_short_rows_padded_white() {
        let raster = Raster::from_rows(vec![vec![0xFFu8, 0xFF], vec![0xFF]]);
        let img = to_image(&raster).unwrap();

        assert_eq!(img.get_pixel(15, 0).0, [0]);
        assert_eq!(img.get_pixel(7, 1).0, [0]);
        assert_eq!(img.get_pixel(8, 1).0, [255]);
        assert_eq!(img.get_pixel(15, 1).0, [255]);
    }

    #[test]
    fn test_empty_raster_image() {
        let img = to_image(&Raster::new()).unwrap();
        assert_eq!(img.dimensions(), (0, 0));
    }

    #[test]
    fn test_image_size_limits() {
        assert_eq!(image_size(512, 276).unwrap(), (512, 276));
        assert_eq!(image_size(u32::MAX as usize, 1).unwrap(), (u32::MAX, 1));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_image_size_too_large() {
        let err = image_size(u32::MAX as usize + 8, 1).unwrap_err();
        assert!(matches!(err, PclError::Image(_)));
        assert!(err.to_string().contains("too large"));

        assert!(image_size(8, u32::MAX as usize + 1).is_err());
    }

    #[test]
    fn test_png_bytes_signature() {
        let raster = Raster::from_rows(vec![vec![0xAAu8; 4]; 4]);
        let png = to_png_bytes(&raster).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_png_roundtrip_pixels() {
        let raster = Raster::from_rows(vec![vec![0xF0u8], vec![0x0F]]);
        let png = to_png_bytes(&raster).unwrap();

        let decoded = image::load_from_memory(&png).unwrap().to_luma8();
        assert_eq!(decoded, to_image(&raster).unwrap());
    }

    #[test]
    fn test_empty_raster_is_error() {
        assert!(matches!(
            to_png_bytes(&Raster::new()),
            Err(PclError::Image(_))
        ));

        let zero_width = Raster::from_rows(vec![Vec::<u8>::new()]);
        assert!(matches!(to_png_bytes(&zero_width), Err(PclError::Image(_))));
    }

    #[test]
    fn test_output_path_appends_png() {
        assert_eq!(output_path(Path::new("shot")), PathBuf::from("shot.png"));
        assert_eq!(output_path(Path::new("shot.bmp")), PathBuf::from("shot.bmp"));
    }

    #[test]
    fn test_save_rejects_unknown_extension() {
        let raster = Raster::from_rows(vec![vec![0xFFu8]]);
        let err = save(&raster, Path::new("shot.xyz")).unwrap_err();
        assert!(err.to_string().contains("Unsupported image format"));
    }
}
