//! Serial port transport
//!
//! Direct hardware connection to the motor controller board over USB serial.
//!
//! Supports:
//! - Port enumeration and discovery
//! - Baud rate and read timeout configuration
//! - Line-oriented writes and bounded reads

use super::{ConnectionParams, LineBuffer, Transport};
use steplink_core::ConnectionError;
use std::io::{self, Read, Write};

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// Serial number if available
    pub serial_number: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            serial_number: None,
            vid: None,
            pid: None,
        }
    }

    /// Set manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Set serial number
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Set USB IDs
    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }
}

/// List serial ports that look like a controller board
///
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn list_ports() -> Result<Vec<SerialPortInfo>, ConnectionError> {
    let ports = serialport::available_ports().map_err(|e| {
        tracing::error!("Failed to enumerate serial ports: {}", e);
        ConnectionError::EnumerationFailed {
            reason: e.to_string(),
        }
    })?;

    Ok(ports
        .iter()
        .filter(|port| is_controller_port(&port.port_name))
        .map(|port| {
            let info = SerialPortInfo::new(&port.port_name, port_description(port));
            match &port.port_type {
                serialport::SerialPortType::UsbPort(usb_info) => {
                    let mut info = info.with_usb_ids(usb_info.vid, usb_info.pid);
                    if let Some(ref mfg) = usb_info.manufacturer {
                        info = info.with_manufacturer(mfg);
                    }
                    if let Some(ref serial) = usb_info.serial_number {
                        info = info.with_serial_number(serial);
                    }
                    info
                }
                _ => info,
            }
        })
        .collect())
}

/// Check if a port name matches a USB serial adapter or on-board COM port
pub(crate) fn is_controller_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    if port_name.starts_with("/dev/ttyUSB") || port_name.starts_with("/dev/ttyACM") {
        return true;
    }

    port_name.starts_with("/dev/cu.usbserial-") || port_name.starts_with("/dev/cu.usbmodem")
}

fn port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Transport backed by a real serial port
#[derive(Default)]
pub struct SerialTransport {
    port: Option<Box<dyn serialport::SerialPort>>,
    port_name: Option<String>,
    buffer: LineBuffer,
}

impl SerialTransport {
    /// Create a transport with no port open
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port_name", &self.port_name)
            .field("pending", &self.buffer.pending_len())
            .finish()
    }
}

impl Transport for SerialTransport {
    fn list_available(&self) -> Result<Vec<SerialPortInfo>, ConnectionError> {
        list_ports()
    }

    fn open(&mut self, port: &str, params: &ConnectionParams) -> Result<(), ConnectionError> {
        if self.is_open() {
            self.close();
        }

        let handle = serialport::new(port, params.baud_rate)
            .timeout(params.read_timeout)
            .open()
            .map_err(|e| {
                tracing::warn!("Failed to open serial port {}: {}", port, e);
                ConnectionError::OpenFailed {
                    port: port.to_string(),
                    reason: e.to_string(),
                }
            })?;

        tracing::info!("Opened {} at {} baud", port, params.baud_rate);
        self.port = Some(handle);
        self.port_name = Some(port.to_string());
        self.buffer.clear();
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::info!(
                "Closed {}",
                self.port_name.as_deref().unwrap_or("serial port")
            );
        }
        self.port_name = None;
        self.buffer.clear();
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    fn write_line(&mut self, line: &str) -> Result<(), ConnectionError> {
        let port = self.port.as_mut().ok_or(ConnectionError::NotConnected)?;

        if !line.is_ascii() {
            return Err(ConnectionError::WriteFailed {
                reason: "command contains non-ASCII characters".to_string(),
            });
        }

        port.write_all(line.as_bytes())
            .and_then(|_| port.flush())
            .map_err(|e| ConnectionError::WriteFailed {
                reason: e.to_string(),
            })
    }

    fn try_read_line(&mut self) -> Result<Option<String>, ConnectionError> {
        if let Some(line) = self.buffer.next_line() {
            return Ok(Some(line));
        }

        let Some(port) = self.port.as_mut() else {
            return Ok(None);
        };

        read_available(&mut **port, &mut self.buffer)?;
        Ok(self.buffer.next_line())
    }
}

/// Move whatever the port has already received into `buffer`
///
/// Returns without touching the port's read timeout when nothing is waiting.
fn read_available(
    port: &mut dyn serialport::SerialPort,
    buffer: &mut LineBuffer,
) -> Result<(), ConnectionError> {
    let available = port
        .bytes_to_read()
        .map_err(|e| ConnectionError::ReadFailed {
            reason: e.to_string(),
        })? as usize;
    if available == 0 {
        return Ok(());
    }

    let mut chunk = [0u8; 256];
    let len = available.min(chunk.len());
    match port.read(&mut chunk[..len]) {
        Ok(n) => buffer.extend(&chunk[..n]),
        Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {}
        Err(e) => {
            return Err(ConnectionError::ReadFailed {
                reason: e.to_string(),
            })
        }
    }
    Ok(())
}
