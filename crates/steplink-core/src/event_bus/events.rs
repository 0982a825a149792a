//! Event type definitions for the event bus.
//!
//! Every event renders (via `Display`) to the status text a presentation
//! shell shows for it. Events are cloneable and serializable for logging.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{AngleDisplay, AxisId, Direction};

/// Severity of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MessageLevel {
    /// Informational
    #[default]
    Info,
    /// Something failed or was rejected
    Error,
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Port opened, closed, or failed to open.
    Connection,
    /// Command sent or failed to send.
    Command,
    /// Text received from the device.
    Inbound,
    /// Steps-per-revolution updates.
    Calibration,
    /// Sweep mode transitions.
    Sweep,
    /// Per-axis display changes (direction, angle).
    Axis,
    /// Rejected intents.
    Validation,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventCategory::Connection => write!(f, "Connection"),
            EventCategory::Command => write!(f, "Command"),
            EventCategory::Inbound => write!(f, "Inbound"),
            EventCategory::Calibration => write!(f, "Calibration"),
            EventCategory::Sweep => write!(f, "Sweep"),
            EventCategory::Axis => write!(f, "Axis"),
            EventCategory::Validation => write!(f, "Validation"),
        }
    }
}

/// Status events emitted by a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A port was opened.
    Connected {
        /// Port name.
        port: String,
    },
    /// The port was closed.
    Disconnected,
    /// Opening a port failed; the session stays disconnected.
    ConnectionFailed {
        /// Port name.
        port: String,
        /// Why it failed.
        reason: String,
    },
    /// A command line was written to the device.
    CommandSent {
        /// The command text without its newline.
        command: String,
    },
    /// A command could not be written.
    CommandFailed {
        /// Why it failed.
        reason: String,
    },
    /// Reading from the open port failed.
    ReadFailed {
        /// Why it failed.
        reason: String,
    },
    /// A non-empty line arrived from the device.
    LineReceived {
        /// The trimmed line.
        line: String,
        /// Display severity derived from the reply text.
        level: MessageLevel,
    },
    /// The device reported its steps per revolution.
    CalibrationUpdated {
        /// Steps per full revolution.
        steps_per_rev: u32,
        /// Degrees per step.
        angular_resolution: f64,
    },
    /// An axis angle display was recomputed.
    AngleUpdated {
        /// The axis.
        axis: AxisId,
        /// The new angle display.
        angle: AngleDisplay,
    },
    /// An axis direction flag changed.
    DirectionChanged {
        /// The axis.
        axis: AxisId,
        /// The new flag.
        direction: Direction,
    },
    /// An intent was rejected before anything was sent.
    ValidationFailed {
        /// Why it was rejected.
        reason: String,
    },
    /// Sweep mode was armed on an axis.
    SweepStarted {
        /// The axis.
        axis: AxisId,
        /// Steps issued per tick.
        steps_per_tick: u32,
        /// Milliseconds between ticks.
        delay_ms: u32,
    },
    /// Sweep mode was turned off on request or by disconnect.
    SweepStopped {
        /// The axis.
        axis: AxisId,
    },
    /// Sweep mode disabled itself because its parameters became invalid.
    SweepHalted {
        /// The axis.
        axis: AxisId,
        /// Why it halted.
        reason: String,
    },
}

impl SessionEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            SessionEvent::Connected { .. }
            | SessionEvent::Disconnected
            | SessionEvent::ConnectionFailed { .. }
            | SessionEvent::ReadFailed { .. } => EventCategory::Connection,
            SessionEvent::CommandSent { .. } | SessionEvent::CommandFailed { .. } => {
                EventCategory::Command
            }
            SessionEvent::LineReceived { .. } => EventCategory::Inbound,
            SessionEvent::CalibrationUpdated { .. } => EventCategory::Calibration,
            SessionEvent::AngleUpdated { .. } | SessionEvent::DirectionChanged { .. } => {
                EventCategory::Axis
            }
            SessionEvent::ValidationFailed { .. } => EventCategory::Validation,
            SessionEvent::SweepStarted { .. }
            | SessionEvent::SweepStopped { .. }
            | SessionEvent::SweepHalted { .. } => EventCategory::Sweep,
        }
    }

    /// Display severity of this event
    pub fn level(&self) -> MessageLevel {
        match self {
            SessionEvent::ConnectionFailed { .. }
            | SessionEvent::CommandFailed { .. }
            | SessionEvent::ReadFailed { .. }
            | SessionEvent::ValidationFailed { .. }
            | SessionEvent::SweepHalted { .. } => MessageLevel::Error,
            SessionEvent::LineReceived { level, .. } => *level,
            _ => MessageLevel::Info,
        }
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Connected { port } => {
                write!(f, "Connected to {}, requesting steps/rev...", port)
            }
            SessionEvent::Disconnected => write!(f, "Disconnected"),
            SessionEvent::ConnectionFailed { port, reason } => {
                write!(f, "Failed to open {}: {}", port, reason)
            }
            SessionEvent::CommandSent { command } => write!(f, "Sent: {}", command),
            SessionEvent::CommandFailed { reason } => {
                write!(f, "Error sending command: {}", reason)
            }
            SessionEvent::ReadFailed { reason } => write!(f, "Error reading data: {}", reason),
            SessionEvent::LineReceived { line, .. } => write!(f, "Received: {}", line),
            SessionEvent::CalibrationUpdated {
                steps_per_rev,
                angular_resolution,
            } => write!(
                f,
                "Steps/Rev: {} | Angular Res: {:.2}°",
                steps_per_rev, angular_resolution
            ),
            SessionEvent::AngleUpdated { axis, angle } => write!(f, "{} angle: {}", axis, angle),
            SessionEvent::DirectionChanged { axis, direction } => {
                write!(f, "{} {}", axis, axis.profile().direction_status(*direction))
            }
            SessionEvent::ValidationFailed { reason } => write!(f, "{}", reason),
            SessionEvent::SweepStarted {
                axis,
                steps_per_tick,
                delay_ms,
            } => write!(
                f,
                "{} sweep: {} steps every {} ms",
                axis, steps_per_tick, delay_ms
            ),
            SessionEvent::SweepStopped { axis } => write!(f, "{} sweep stopped", axis),
            SessionEvent::SweepHalted { axis, reason } => {
                write!(f, "{}. Stopping {} sweep.", reason, axis)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_texts() {
        let event = SessionEvent::CommandSent {
            command: "X0".to_string(),
        };
        assert_eq!(event.to_string(), "Sent: X0");

        let event = SessionEvent::CalibrationUpdated {
            steps_per_rev: 200,
            angular_resolution: 1.8,
        };
        assert_eq!(event.to_string(), "Steps/Rev: 200 | Angular Res: 1.80°");

        let event = SessionEvent::DirectionChanged {
            axis: AxisId::Azimuth,
            direction: Direction::High,
        };
        assert_eq!(event.to_string(), "AZI STATUS: CW");
    }

    #[test]
    fn test_categories_and_levels() {
        let failed = SessionEvent::ConnectionFailed {
            port: "COM3".to_string(),
            reason: "Access denied".to_string(),
        };
        assert_eq!(failed.category(), EventCategory::Connection);
        assert_eq!(failed.level(), MessageLevel::Error);
        assert_eq!(failed.to_string(), "Failed to open COM3: Access denied");

        let halted = SessionEvent::SweepHalted {
            axis: AxisId::Polar,
            reason: "Invalid sweep steps: 0".to_string(),
        };
        assert_eq!(halted.category(), EventCategory::Sweep);
        assert_eq!(halted.level(), MessageLevel::Error);
    }

    #[test]
    fn test_event_serializes() {
        let event = SessionEvent::AngleUpdated {
            axis: AxisId::Elevation,
            angle: AngleDisplay::Known(36.0),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
