//! # Configuration
//!
//! Settings for decoding and for live capture from an instrument.
//!
//! ## Usage
//!
//! ```
//! use pclview::config::{DecoderConfig, OutOfContextPolicy, SerialConfig};
//!
//! let decoder = DecoderConfig::STRICT;
//! assert_eq!(decoder.out_of_context, OutOfContextPolicy::Reject);
//!
//! let serial = SerialConfig::new("/dev/ttyUSB0", 19200)?;
//! assert_eq!(serial.baud, 19200);
//! # Ok::<(), pclview::PclError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PclError;

// ============================================================================
// DECODER
// ============================================================================

/// What to do with graphics data that arrives outside a raster block.
///
/// Instruments never send this, but the payload length is the only
/// framing, so the bytes must be consumed either way or every later
/// command would be misread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfContextPolicy {
    /// Read and drop the declared payload, then carry on.
    #[default]
    Discard,
    /// Abort decoding with [`PclError::DataOutsideGraphics`].
    Reject,
}

/// Decoder behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecoderConfig {
    pub out_of_context: OutOfContextPolicy,
}

impl DecoderConfig {
    /// Tolerant decoding: stray graphics data is skipped.
    pub const LENIENT: Self = Self {
        out_of_context: OutOfContextPolicy::Discard,
    };

    /// Stray graphics data is an error.
    pub const STRICT: Self = Self {
        out_of_context: OutOfContextPolicy::Reject,
    };
}

// ============================================================================
// SERIAL CAPTURE
// ============================================================================

/// Default serial device
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Default line speed. Most instruments ship configured for 9600 baud.
pub const DEFAULT_BAUD: u32 = 9600;

/// Line speeds offered by instrument printer ports.
pub const SUPPORTED_BAUD_RATES: &[u32] = &[300, 600, 1200, 2400, 4800, 9600, 19200, 38400, 57600];

/// # Serial Capture Configuration
///
/// The port is always opened 8N1 without flow control; only the device
/// and speed vary between setups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Path to the TTY device (e.g., "/dev/ttyUSB0")
    pub device: String,
    /// Line speed in baud
    pub baud: u32,
}

impl SerialConfig {
    /// Create a configuration, rejecting unsupported baud rates.
    pub fn new(device: impl Into<String>, baud: u32) -> Result<Self, PclError> {
        let config = Self {
            device: device.into(),
            baud,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PclError> {
        if self.device.is_empty() {
            return Err(PclError::Config("serial device path is empty".to_string()));
        }
        if !SUPPORTED_BAUD_RATES.contains(&self.baud) {
            return Err(PclError::Config(format!(
                "unsupported baud rate {} (supported: {:?})",
                self.baud, SUPPORTED_BAUD_RATES
            )));
        }
        Ok(())
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: DEFAULT_BAUD,
        }
    }
}
