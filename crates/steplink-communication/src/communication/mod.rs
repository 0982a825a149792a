//! Byte-stream transports
//!
//! A [`Transport`] owns at most one open connection to a named port and
//! exchanges newline-terminated ASCII lines with the device.

pub mod memory;
pub mod serial;

pub use memory::{MemoryDevice, MemoryTransport, TransportCall};
pub use serial::{list_ports, SerialPortInfo, SerialTransport};

use steplink_core::ConnectionError;
use std::time::Duration;

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default timeout of one read attempt
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Longest partial line kept while waiting for its newline
pub const MAX_PENDING_BYTES: usize = 4096;

/// Parameters used when opening a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Serial baud rate
    pub baud_rate: u32,
    /// Upper bound on a single read attempt
    pub read_timeout: Duration,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Connection to the controller board
///
/// Implementations keep at most one handle open. Reads never block longer
/// than the read timeout given to [`Transport::open`].
pub trait Transport: Send {
    /// Enumerate candidate ports. May be empty.
    fn list_available(&self) -> Result<Vec<SerialPortInfo>, ConnectionError>;

    /// Open `port`, closing any handle that is already open first.
    fn open(&mut self, port: &str, params: &ConnectionParams) -> Result<(), ConnectionError>;

    /// Close the handle if one is open. Safe to call repeatedly.
    fn close(&mut self);

    /// Whether a handle is open.
    fn is_open(&self) -> bool;

    /// Name of the open port.
    fn port_name(&self) -> Option<&str>;

    /// Write one line of ASCII text as raw bytes.
    fn write_line(&mut self, line: &str) -> Result<(), ConnectionError>;

    /// Next complete, trimmed, non-empty line, if one arrived in time.
    fn try_read_line(&mut self) -> Result<Option<String>, ConnectionError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn list_available(&self) -> Result<Vec<SerialPortInfo>, ConnectionError> {
        (**self).list_available()
    }

    fn open(&mut self, port: &str, params: &ConnectionParams) -> Result<(), ConnectionError> {
        (**self).open(port, params)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn port_name(&self) -> Option<&str> {
        (**self).port_name()
    }

    fn write_line(&mut self, line: &str) -> Result<(), ConnectionError> {
        (**self).write_line(line)
    }

    fn try_read_line(&mut self) -> Result<Option<String>, ConnectionError> {
        (**self).try_read_line()
    }
}

/// Accumulates raw inbound bytes and splits them into lines
///
/// Decoding is permissive: bytes outside ASCII are dropped. Bytes without a
/// trailing newline stay buffered until a later read completes the line.
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes
    ///
    /// A partial line longer than [`MAX_PENDING_BYTES`] is discarded.
    pub fn extend(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
        if self.pending.len() > MAX_PENDING_BYTES && !self.pending.contains(&b'\n') {
            tracing::warn!(
                "Discarding {} bytes of inbound data with no line end",
                self.pending.len()
            );
            self.pending.clear();
        }
    }

    /// Take the next non-empty line, trimmed
    pub fn next_line(&mut self) -> Option<String> {
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let text: String = raw
                .into_iter()
                .filter(u8::is_ascii)
                .map(char::from)
                .collect();
            let line = text.trim();
            if !line.is_empty() {
                return Some(line.to_string());
            }
        }
        None
    }

    /// Number of buffered bytes not yet returned as a line
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
