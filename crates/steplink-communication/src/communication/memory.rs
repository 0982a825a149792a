//! In-memory transport
//!
//! A scripted stand-in for the controller board. Every call the session makes
//! is recorded, and inbound bytes are fed through a [`MemoryDevice`] handle,
//! so tests and simulations can drive the engine without hardware.

use super::{ConnectionParams, LineBuffer, SerialPortInfo, Transport};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use steplink_core::ConnectionError;

/// One call observed by a [`MemoryTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// A port was opened
    Open(String),
    /// An open port was closed
    Close(String),
    /// A line was written (including its newline)
    Write(String),
}

#[derive(Debug, Default)]
struct DeviceState {
    ports: Vec<String>,
    refused: HashSet<String>,
    fail_writes: bool,
    fail_reads: bool,
    inbound: LineBuffer,
    calls: Vec<TransportCall>,
}

/// Handle for scripting and inspecting a [`MemoryTransport`]
#[derive(Debug, Clone, Default)]
pub struct MemoryDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl MemoryDevice {
    /// Queue raw bytes as if the device had sent them
    pub fn push_bytes(&self, data: &[u8]) {
        self.state.lock().inbound.extend(data);
    }

    /// Queue one line; a newline is appended
    pub fn push_line(&self, line: &str) {
        let mut state = self.state.lock();
        state.inbound.extend(line.as_bytes());
        state.inbound.extend(b"\n");
    }

    /// Ports reported by enumeration
    pub fn set_ports<I, S>(&self, ports: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().ports = ports.into_iter().map(Into::into).collect();
    }

    /// Make opening `port` fail
    pub fn refuse(&self, port: impl Into<String>) {
        self.state.lock().refused.insert(port.into());
    }

    /// Make every write fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Make every read fail (or succeed again)
    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Every call recorded so far
    pub fn calls(&self) -> Vec<TransportCall> {
        self.state.lock().calls.clone()
    }

    /// Lines written so far, including newlines
    pub fn written(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::Write(line) => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

/// Transport that talks to a [`MemoryDevice`] instead of hardware
#[derive(Debug, Default)]
pub struct MemoryTransport {
    device: MemoryDevice,
    open_port: Option<String>,
}

impl MemoryTransport {
    /// Create a transport and its device handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle sharing this transport's device state
    pub fn device(&self) -> MemoryDevice {
        self.device.clone()
    }
}

impl Transport for MemoryTransport {
    fn list_available(&self) -> Result<Vec<SerialPortInfo>, ConnectionError> {
        Ok(self
            .device
            .state
            .lock()
            .ports
            .iter()
            .map(|name| SerialPortInfo::new(name, "Memory Device"))
            .collect())
    }

    fn open(&mut self, port: &str, _params: &ConnectionParams) -> Result<(), ConnectionError> {
        if self.is_open() {
            self.close();
        }

        let mut state = self.device.state.lock();
        if state.refused.contains(port) {
            return Err(ConnectionError::OpenFailed {
                port: port.to_string(),
                reason: "Device refused connection".to_string(),
            });
        }
        state.calls.push(TransportCall::Open(port.to_string()));
        self.open_port = Some(port.to_string());
        Ok(())
    }

    fn close(&mut self) {
        if let Some(port) = self.open_port.take() {
            self.device.state.lock().calls.push(TransportCall::Close(port));
        }
    }

    fn is_open(&self) -> bool {
        self.open_port.is_some()
    }

    fn port_name(&self) -> Option<&str> {
        self.open_port.as_deref()
    }

    fn write_line(&mut self, line: &str) -> Result<(), ConnectionError> {
        if self.open_port.is_none() {
            return Err(ConnectionError::NotConnected);
        }

        let mut state = self.device.state.lock();
        if state.fail_writes {
            return Err(ConnectionError::WriteFailed {
                reason: "Device write error".to_string(),
            });
        }
        state.calls.push(TransportCall::Write(line.to_string()));
        Ok(())
    }

    fn try_read_line(&mut self) -> Result<Option<String>, ConnectionError> {
        if self.open_port.is_none() {
            return Ok(None);
        }
        let mut state = self.device.state.lock();
        if state.fail_reads {
            return Err(ConnectionError::ReadFailed {
                reason: "Device read error".to_string(),
            });
        }
        Ok(state.inbound.next_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_in_order() {
        let mut transport = MemoryTransport::new();
        let device = transport.device();
        let params = ConnectionParams::default();

        transport.open("COM1", &params).unwrap();
        transport.write_line("G\n").unwrap();
        transport.open("COM2", &params).unwrap();
        transport.close();
        transport.close();

        assert_eq!(
            device.calls(),
            vec![
                TransportCall::Open("COM1".to_string()),
                TransportCall::Write("G\n".to_string()),
                TransportCall::Close("COM1".to_string()),
                TransportCall::Open("COM2".to_string()),
                TransportCall::Close("COM2".to_string()),
            ]
        );
    }

    #[test]
    fn test_scripted_failures() {
        let mut transport = MemoryTransport::new();
        let device = transport.device();
        let params = ConnectionParams::default();

        device.refuse("COM9");
        assert!(matches!(
            transport.open("COM9", &params),
            Err(ConnectionError::OpenFailed { .. })
        ));
        assert_eq!(
            transport.write_line("X0\n"),
            Err(ConnectionError::NotConnected)
        );

        transport.open("COM1", &params).unwrap();
        device.fail_writes(true);
        assert!(transport.write_line("X0\n").is_err());
        device.fail_reads(true);
        assert!(transport.try_read_line().is_err());
        device.fail_reads(false);

        device.push_bytes(b"20");
        assert_eq!(transport.try_read_line(), Ok(None));
        device.push_bytes(b"0\r\n");
        assert_eq!(transport.try_read_line(), Ok(Some("200".to_string())));
    }
}
