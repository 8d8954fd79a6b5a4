//! # Serial Capture
//!
//! Reads a printout directly from an instrument's serial printer port.
//!
//! The instrument believes it is talking to a printer: it pushes the PCL
//! stream whenever its "print screen" key is pressed and never expects a
//! reply, so the port is opened read-only.
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so bitmap bytes arrive unmodified:
//!
//! - **No input processing**: Disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No software flow control**: IXON/IXOFF/IXANY off, because 0x11 and
//!   0x13 occur in bitmap data
//! - **8-bit characters**: CS8, no parity, receiver enabled, modem lines ignored
//! - **No echo, non-canonical**: ECHO, ICANON, ISIG, IEXTEN off
//! - **Blocking reads**: VMIN = 1, VTIME = 0
//!
//! ## Setup (Linux)
//!
//! ```bash
//! # USB serial adapters show up as /dev/ttyUSB*
//! $ ls /dev/ttyUSB*
//! # The user needs to be in the dialout group
//! $ sudo usermod -aG dialout $USER
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
#[cfg(unix)]
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::SerialConfig;
use crate::error::PclError;

/// # Serial Capture Port
///
/// A raw-mode TTY opened for reading. Implements [`Read`]; wrap it in a
/// `BufReader` and hand it to a [`Decoder`](crate::decoder::Decoder).
///
/// ## Example
///
/// ```no_run
/// use std::io::BufReader;
/// use pclview::config::SerialConfig;
/// use pclview::decoder::Decoder;
/// use pclview::transport::SerialCapture;
///
/// let port = SerialCapture::open(&SerialConfig::default())?;
/// let mut decoder = Decoder::new(BufReader::new(port));
///
/// while let Some(page) = decoder.next_page()? {
///     println!("received {} rows", page.row_count());
/// }
/// # Ok::<(), pclview::PclError>(())
/// ```
pub struct SerialCapture {
    file: File,
}

impl SerialCapture {
    /// Open and configure a serial device.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The baud rate is not supported
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout group)
    /// - TTY configuration fails
    pub fn open(config: &SerialConfig) -> Result<Self, PclError> {
        config.validate()?;
        let path = Path::new(&config.device);

        let file = OpenOptions::new().read(true).open(path).map_err(|e| {
            PclError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;

        configure_tty_raw(&file, config.baud)?;

        info!(device = %path.display(), baud = config.baud, "serial port open");
        Ok(Self { file })
    }
}

impl Read for SerialCapture {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

/// Candidate serial devices: `/dev/tty` followed by an uppercase letter
/// (`ttyS0`, `ttyUSB0`, `ttyACM0`), sorted by path.
///
/// Virtual consoles (`tty1`) and the controlling terminal (`tty`) are left
/// out. Listed devices are not opened, so some may still be unusable.
pub fn list_devices() -> io::Result<Vec<PathBuf>> {
    list_devices_in(Path::new("/dev"))
}

fn list_devices_in(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut devices = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if is_serial_name(&entry.file_name().to_string_lossy()) {
            devices.push(entry.path());
        }
    }
    devices.sort();
    Ok(devices)
}

fn is_serial_name(name: &str) -> bool {
    name.strip_prefix("tty")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Map a numeric baud rate to its termios speed constant.
#[cfg(unix)]
fn speed_constant(baud: u32) -> Option<libc::speed_t> {
    let speed = match baud {
        300 => libc::B300,
        600 => libc::B600,
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        _ => return None,
    };
    Some(speed)
}

/// Configure a serial device for raw 8N1 reception at `baud`.
#[cfg(unix)]
fn configure_tty_raw(file: &File, baud: u32) -> Result<(), PclError> {
    use std::mem::MaybeUninit;

    let fd = file.as_raw_fd();
    let speed = speed_constant(baud)
        .ok_or_else(|| PclError::Config(format!("unsupported baud rate {}", baud)))?;

    // Get current terminal attributes
    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(PclError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB);
    termios.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;

    // Block until at least one byte arrives
    termios.c_cc[libc::VMIN] = 1;
    termios.c_cc[libc::VTIME] = 0;

    let speed_ok = unsafe {
        libc::cfsetispeed(&mut termios, speed) == 0 && libc::cfsetospeed(&mut termios, speed) == 0
    };
    if !speed_ok {
        return Err(PclError::Transport(format!(
            "cfsetspeed({}) failed: {}",
            baud,
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(PclError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &File, _baud: u32) -> Result<(), PclError> {
    Err(PclError::Transport(
        "Serial capture is only supported on Unix".to_string(),
    ))
}
