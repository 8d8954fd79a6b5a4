//! # pclview - PCL Raster Printout Decoder
//!
//! Test instruments (spectrum analyzers, network analyzers, radio test
//! sets) can "print screen" to a PCL raster printer. pclview stands in for
//! that printer: it decodes the byte stream into monochrome scanlines and
//! renders them as an image. It provides:
//!
//! - **Protocol implementation**: recognizer and builders for the raster
//!   subset of PCL instruments emit
//! - **Decoding**: length-framed scanline extraction with graphics-mode tracking
//! - **Rendering**: 1-bit-per-pixel expansion to PNG, JPEG, BMP or TIFF
//! - **Transport**: raw serial capture from the instrument's printer port
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::fs::File;
//! use std::path::Path;
//!
//! let raster = pclview::decode(File::open("screenshot.pcl")?)?;
//! println!("{} x {} pixels", raster.width_dots(), raster.height_dots());
//!
//! pclview::render::save(&raster, Path::new("screenshot.png"))?;
//! # Ok::<(), pclview::PclError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Command vocabulary, byte source, recognizer |
//! | [`decoder`] | Stream decoder and statistics |
//! | [`raster`] | Scanline and raster types |
//! | [`render`] | Image rendering and export |
//! | [`transport`] | Serial capture |
//! | [`config`] | Decoder and serial settings |
//! | [`error`] | Error types |
//!
//! ## Supported Instruments
//!
//! Known to work with HP/Agilent E8285A and 8752A output. Other instruments
//! whose printer output uses uncompressed PCL raster transfer should work
//! too.

pub mod config;
pub mod decoder;
pub mod error;
pub mod protocol;
pub mod raster;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use config::DecoderConfig;
pub use decoder::{Decoder, decode, decode_bytes, decode_with};
pub use error::PclError;
pub use raster::{Raster, Scanline};
