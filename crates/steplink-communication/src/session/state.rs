//! Session-wide state

use std::fmt;
use std::num::NonZeroU32;
use steplink_core::angular_resolution;

/// Link state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No port open
    #[default]
    Disconnected,
    /// A port is open
    Connected {
        /// Port name
        port: String,
    },
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connected { port } => write!(f, "Connected to {}", port),
        }
    }
}

/// State shared by every axis of one session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Link state
    pub connection: ConnectionState,
    /// Steps per revolution last reported by the board
    pub calibration: Option<NonZeroU32>,
    /// Last value sent with `Z`
    pub disable_after_motion: bool,
}

impl SessionState {
    /// Whether a port is open
    pub fn is_connected(&self) -> bool {
        matches!(self.connection, ConnectionState::Connected { .. })
    }

    /// Name of the open port
    pub fn port(&self) -> Option<&str> {
        match &self.connection {
            ConnectionState::Connected { port } => Some(port),
            ConnectionState::Disconnected => None,
        }
    }

    /// Degrees per step, once the calibration is known
    pub fn angular_resolution(&self) -> Option<f64> {
        self.calibration.map(angular_resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = SessionState::default();
        assert!(!state.is_connected());
        assert_eq!(state.port(), None);
        assert_eq!(state.angular_resolution(), None);
        assert!(!state.disable_after_motion);
    }

    #[test]
    fn test_connected_port() {
        let state = SessionState {
            connection: ConnectionState::Connected {
                port: "/dev/ttyUSB0".to_string(),
            },
            calibration: NonZeroU32::new(400),
            disable_after_motion: true,
        };
        assert_eq!(state.port(), Some("/dev/ttyUSB0"));
        assert_eq!(state.angular_resolution(), Some(0.9));
        assert_eq!(state.connection.to_string(), "Connected to /dev/ttyUSB0");
    }
}
