//! Error handling for steplink
//!
//! Provides the error types for every layer of the protocol engine:
//! - Connection errors (port lifecycle and I/O)
//! - Validation errors (caller-side argument checks, never transmitted)
//! - Protocol errors (inbound lines that could not be interpreted)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::types::AxisId;
use thiserror::Error;

/// Connection error type
///
/// Represents failures of the serial link. None of these are fatal: the
/// session surfaces them as status events and stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The port could not be opened or did not report itself open
    #[error("Failed to open port {port}: {reason}")]
    OpenFailed {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// No port is open
    #[error("Serial port not connected.")]
    NotConnected,

    /// Writing to the open port failed
    #[error("Write failed: {reason}")]
    WriteFailed {
        /// The reason for the write failure.
        reason: String,
    },

    /// Reading from the open port failed for a reason other than a timeout
    #[error("Read failed: {reason}")]
    ReadFailed {
        /// The reason for the read failure.
        reason: String,
    },

    /// The system port list could not be obtained
    #[error("Failed to enumerate ports: {reason}")]
    EnumerationFailed {
        /// The reason enumeration failed.
        reason: String,
    },
}

/// Validation error type
///
/// Raised while turning an intent into a wire command. A validation error
/// means nothing was written to the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A command argument is not a positive integer
    #[error("Invalid {name} value: {value}")]
    InvalidArgument {
        /// The argument name.
        name: &'static str,
        /// The rejected value as the caller supplied it.
        value: String,
    },

    /// Sweep steps per tick is not a positive integer
    #[error("Invalid sweep steps: {value}")]
    InvalidSweepSteps {
        /// The rejected value.
        value: i64,
    },

    /// Sweep delay is not a positive number of milliseconds
    #[error("Invalid sweep delay: {value}")]
    InvalidSweepDelay {
        /// The rejected value.
        value: i64,
    },

    /// Manual control was requested while the axis is sweeping
    #[error("{axis} is in sweep mode; manual control is disabled")]
    ManualControlLocked {
        /// The sweeping axis.
        axis: AxisId,
    },
}

/// Protocol error type
///
/// Never surfaced as a failure: an uninterpretable inbound line is treated as
/// opaque status text. The type exists so the condition can be logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// An inbound line looked like a report but could not be used
    #[error("Ignored malformed inbound line: {line}")]
    MalformedInboundIgnored {
        /// The raw line.
        line: String,
    },
}

/// Main error type for steplink
///
/// A unified error type for every fallible session operation. Malformed
/// inbound lines are not errors of an operation; [`ProtocolError`] only
/// describes them in logs and status text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this error means the session has no open port
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Error::Connection(ConnectionError::NotConnected))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_messages() {
        let err = ConnectionError::OpenFailed {
            port: "/dev/ttyUSB0".to_string(),
            reason: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to open port /dev/ttyUSB0: busy");
        assert_eq!(
            ConnectionError::NotConnected.to_string(),
            "Serial port not connected."
        );
    }

    #[test]
    fn test_error_classification() {
        let err: Error = ConnectionError::NotConnected.into();
        assert!(err.is_connection_error());
        assert!(err.is_not_connected());
        assert!(!err.is_validation_error());

        let err: Error = ValidationError::InvalidSweepSteps { value: 0 }.into();
        assert!(err.is_validation_error());
        assert_eq!(err.to_string(), "Invalid sweep steps: 0");
        assert_eq!(
            err,
            Error::Validation(ValidationError::InvalidSweepSteps { value: 0 })
        );
    }

    #[test]
    fn test_manual_lock_message_names_axis() {
        let err = ValidationError::ManualControlLocked {
            axis: AxisId::Polar,
        };
        assert_eq!(
            err.to_string(),
            "POL is in sweep mode; manual control is disabled"
        );
    }
}
