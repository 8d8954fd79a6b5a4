//! # Decode Tests
//!
//! End-to-end checks of the decoder against streams shaped like real
//! instrument printouts, plus property tests for framing.
//!
//! ## Test Coverage
//!
//! - **Instrument streams**: reset/config preamble, raster block, trailing
//!   form feed, rendered to an image of the expected size
//! - **Framing**: payloads containing ESC, truncation, stray data
//! - **Properties**: encode-then-decode reproduces rows; arbitrary input
//!   never panics

use pclview::config::{DecoderConfig, OutOfContextPolicy};
use pclview::decoder::{Decoder, GraphicsState};
use pclview::protocol::commands;
use pclview::raster::Raster;
use pclview::{PclError, decode, decode_bytes, decode_with, render};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Rows of a 512-dot display with a border and a diagonal line.
fn screen_rows(height: usize) -> Vec<Vec<u8>> {
    (0..height)
        .map(|y| {
            let mut row = vec![0u8; 64];
            if y == 0 || y == height - 1 {
                row.fill(0xFF);
            }
            row[0] |= 0x80;
            row[63] |= 0x01;
            let x = y % 512;
            row[x / 8] |= 0x80 >> (x % 8);
            row
        })
        .collect()
}

/// A printout the way an instrument sends it: reset, page setup,
/// resolution, raster block, form feed.
fn instrument_printout(rows: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(b"\x1bE"); // printer reset, not part of the vocabulary
    out.extend(commands::configure_window(2));
    out.extend(b"\x1b&l0O"); // orientation, not part of the vocabulary
    out.extend(commands::resolution(75));
    out.extend(commands::start_graphics(1));
    out.extend(commands::compression_mode(0));
    for row in rows {
        out.extend(commands::graphics_data(row));
    }
    out.extend(commands::end_graphics());
    out.push(0x0C);
    out
}

// ============================================================================
// INSTRUMENT STREAMS
// ============================================================================

#[test]
fn test_instrument_printout_geometry() {
    let rows = screen_rows(276);
    let bytes = instrument_printout(&rows);

    let mut decoder = Decoder::new(&bytes[..]);
    decoder.run().unwrap();

    let stats = decoder.stats().clone();
    assert_eq!(stats.rows, 276);
    assert_eq!(stats.graphics_blocks, 1);
    assert_eq!(stats.resolution_dpi, Some(75));
    assert_eq!(stats.window_parameter, Some(2));
    assert_eq!(stats.compression_mode, Some(0));
    assert_eq!(stats.unknown_commands, 2);
    assert_eq!(stats.bytes_read, bytes.len() as u64);
    assert_eq!(decoder.state(), GraphicsState::Idle);

    let raster = decoder.finish();
    assert_eq!(raster.width_dots(), 512);
    assert_eq!(raster.height_dots(), 276);

    let decoded: Vec<Vec<u8>> = raster.into_iter().map(|row| row.into_bytes()).collect();
    assert_eq!(decoded, rows);
}

#[test]
fn test_instrument_printout_renders() {
    let rows = screen_rows(40);
    let raster = decode_bytes(&instrument_printout(&rows)).unwrap();
    let img = render::to_image(&raster).unwrap();

    assert_eq!(img.dimensions(), (512, 40));
    // Border
    assert_eq!(img.get_pixel(0, 20).0, [0]);
    assert_eq!(img.get_pixel(511, 20).0, [0]);
    assert_eq!(img.get_pixel(100, 0).0, [0]);
    // Diagonal and background
    assert_eq!(img.get_pixel(20, 20).0, [0]);
    assert_eq!(img.get_pixel(21, 20).0, [255]);
}

#[test]
fn test_save_writes_requested_format() {
    let raster = decode_bytes(&instrument_printout(&screen_rows(8))).unwrap();
    let dir = std::env::temp_dir().join(format!("pclview-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let png = render::save(&raster, &dir.join("shot")).unwrap();
    let bmp = render::save(&raster, &dir.join("shot.bmp")).unwrap();

    assert_eq!(png.extension().unwrap(), "png");
    assert_eq!(image::image_dimensions(&png).unwrap(), (512, 8));
    assert_eq!(image::image_dimensions(&bmp).unwrap(), (512, 8));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_two_printouts_as_pages() {
    let first = screen_rows(3);
    let second = vec![vec![0xF0u8; 10]; 2];
    let mut bytes = instrument_printout(&first);
    bytes.extend(instrument_printout(&second));

    let mut decoder = Decoder::new(&bytes[..]);
    let page1 = decoder.next_page().unwrap().unwrap();
    let page2 = decoder.next_page().unwrap().unwrap();

    assert_eq!(page1, Raster::from_rows(first));
    assert_eq!(page2, Raster::from_rows(second));
    assert!(decoder.next_page().unwrap().is_none());
    assert_eq!(decoder.stats().graphics_blocks, 2);
}

// ============================================================================
// FRAMING
// ============================================================================

#[test]
fn test_three_byte_example() {
    let mut bytes = b"\x1b*r1A\x1b*b3W".to_vec();
    bytes.extend([0xAA, 0x00, 0xFF]);
    bytes.extend(b"\x1b*r0B");

    let raster = decode(std::io::Cursor::new(bytes)).unwrap();

    assert_eq!(raster, Raster::from_rows(vec![vec![0xAAu8, 0x00, 0xFF]]));
}

#[test]
fn test_rows_full_of_escape_bytes() {
    let rows = vec![vec![0x1Bu8; 16], b"\x1b*b999W".to_vec(), vec![0x1B, b'*']];
    let raster = decode_bytes(&instrument_printout(&rows)).unwrap();

    assert_eq!(raster, Raster::from_rows(rows));
}

#[test]
fn test_truncated_printout() {
    let mut bytes = instrument_printout(&screen_rows(10));
    // Cut inside the last row's payload
    bytes.truncate(bytes.len() - commands::end_graphics().len() - 1 - 30);

    let mut decoder = Decoder::new(&bytes[..]);
    let err = decoder.run().unwrap_err();

    assert!(matches!(
        err,
        PclError::TruncatedPayload {
            row: 9,
            expected: 64,
            received: 34,
            ..
        }
    ));
    assert_eq!(decoder.raster().row_count(), 9);
    assert!(err.to_string().contains("row 9"));
}

#[test]
fn test_data_before_start_is_skipped() {
    let mut bytes = commands::graphics_data(&[0x55; 4]);
    bytes.extend(instrument_printout(&[vec![0x01]]));

    let raster = decode_bytes(&bytes).unwrap();
    assert_eq!(raster, Raster::from_rows(vec![vec![0x01u8]]));

    let strict = decode_with(&bytes[..], DecoderConfig::STRICT);
    assert!(matches!(strict, Err(PclError::DataOutsideGraphics { offset: 0, length: 4 })));
}

#[test]
fn test_oversized_row_header_stops_decoding() {
    let mut bytes = instrument_printout(&screen_rows(2));
    // A header past u32::MAX followed by what looks like a complete row
    let end = bytes.len() - commands::end_graphics().len() - 1;
    let mut tail = b"\x1b*b4294967296W".to_vec();
    tail.extend(commands::graphics_data(&[0x42]));
    bytes.splice(end..end, tail);

    let mut decoder = Decoder::new(&bytes[..]);
    let err = decoder.run().unwrap_err();

    assert!(matches!(err, PclError::PayloadTooLarge { row: 2, .. }));
    assert_eq!(decoder.raster().row_count(), 2);
    assert!(err.to_string().contains("row 2"));
}

#[test]
fn test_config_from_json() {
    let config: DecoderConfig = serde_json::from_str(r#"{"out_of_context":"reject"}"#).unwrap();
    assert_eq!(config.out_of_context, OutOfContextPolicy::Reject);
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn arb_rows() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..200), 0..40)
}

proptest! {
    #[test]
    fn roundtrip_preserves_rows(rows in arb_rows(), dpi in 0u32..1200) {
        let raster = Raster::from_rows(rows.clone());
        let bytes = commands::encode_raster(&raster, dpi);

        let decoded = decode_bytes(&bytes).unwrap();

        prop_assert_eq!(decoded.row_count(), rows.len());
        prop_assert_eq!(decoded, raster);
    }

    #[test]
    fn roundtrip_over_several_blocks(blocks in prop::collection::vec(arb_rows(), 1..5)) {
        let mut bytes = Vec::new();
        let mut expected = Vec::new();
        for rows in &blocks {
            bytes.extend(commands::encode_raster(&Raster::from_rows(rows.clone()), 75));
            bytes.extend(b"\r\n");
            expected.extend(rows.iter().cloned());
        }

        let decoded = decode_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded, Raster::from_rows(expected));
    }

    #[test]
    fn decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..2000)) {
        let mut decoder = Decoder::new(&bytes[..]);
        match decoder.run() {
            Ok(()) => prop_assert_eq!(decoder.stats().bytes_read, bytes.len() as u64),
            Err(PclError::TruncatedPayload { .. } | PclError::PayloadTooLarge { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn text_without_escape_yields_no_rows(
        bytes in prop::collection::vec(any::<u8>().prop_filter("no ESC", |b| *b != 0x1B), 0..500)
    ) {
        let raster = decode_bytes(&bytes).unwrap();
        prop_assert!(raster.is_empty());
    }
}
