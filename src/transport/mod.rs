//! # Instrument Transport Layer
//!
//! This module provides ways to receive a printout straight from an
//! instrument instead of from a saved file.
//!
//! ## Available Transports
//!
//! - [`serial`]: RS-232 printer port via a TTY device (Unix)
//!
//! [`dump`] keeps a copy of the raw bytes a transport delivers.

pub mod dump;
pub mod serial;

pub use dump::RawDump;
pub use serial::{SerialCapture, list_devices};
