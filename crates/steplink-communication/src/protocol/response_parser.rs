//! Controller board reply parser
//!
//! The board answers `G` with a bare number and echoes most other commands
//! as free text. Only the bare number carries meaning for the engine; the
//! rest is classified so a status display can tell errors from chatter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use steplink_core::{AxisId, Direction, MessageLevel, ProtocolError};

/// A classified inbound line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceReply {
    /// Bare number: steps per revolution
    StepsPerRev(NonZeroU32),
    /// `StepsPerRev set to N`
    StepsPerRevSet(u32),
    /// `disableAfterMotion = true|false...`
    DisableAfterMotion(bool),
    /// `<AXIS> direction => d`
    DirectionSet {
        /// Axis named in the reply
        axis: AxisId,
        /// Reported flag
        direction: Direction,
    },
    /// `Stop ALL ...` (no axis) or `Stop <AXIS> motor.`
    Stopped(Option<AxisId>),
    /// The board rejected a command
    Rejected(String),
    /// Anything else
    Message(String),
}

impl DeviceReply {
    /// Display severity of this reply
    pub fn level(&self) -> MessageLevel {
        match self {
            DeviceReply::Rejected(_) => MessageLevel::Error,
            _ => MessageLevel::Info,
        }
    }

    /// The steps-per-revolution report, if this is one
    pub fn calibration(&self) -> Option<NonZeroU32> {
        match self {
            DeviceReply::StepsPerRev(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceReply::StepsPerRev(value) => write!(f, "steps_per_rev:{}", value),
            DeviceReply::StepsPerRevSet(value) => write!(f, "steps_per_rev_set:{}", value),
            DeviceReply::DisableAfterMotion(on) => write!(f, "disable_after_motion:{}", on),
            DeviceReply::DirectionSet { axis, direction } => {
                write!(f, "direction:{}={}", axis, direction.as_wire())
            }
            DeviceReply::Stopped(Some(axis)) => write!(f, "stopped:{}", axis),
            DeviceReply::Stopped(None) => write!(f, "stopped:all"),
            DeviceReply::Rejected(msg) => write!(f, "rejected:{}", msg),
            DeviceReply::Message(msg) => write!(f, "message:{}", msg),
        }
    }
}

const REJECTION_PREFIXES: [&str; 5] = [
    "Invalid",
    "Unknown cmd",
    "Missing arguments",
    "Motor index incorrect",
    "Use X0..X3",
];

/// Controller board reply parser
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplyParser;

impl ReplyParser {
    /// Create a new reply parser
    pub fn new() -> Self {
        Self
    }

    /// Parse one inbound line; `None` for blank input
    pub fn parse(&self, line: &str) -> Option<DeviceReply> {
        let line = line.trim();

        if line.is_empty() {
            return None;
        }

        if line.bytes().all(|b| b.is_ascii_digit()) {
            return Some(self.parse_calibration(line));
        }

        if let Some(value) = line.strip_prefix("StepsPerRev set to ") {
            if let Ok(value) = value.trim().parse::<u32>() {
                return Some(DeviceReply::StepsPerRevSet(value));
            }
        }

        if let Some(rest) = line.strip_prefix("disableAfterMotion = ") {
            return Some(DeviceReply::DisableAfterMotion(rest.starts_with("true")));
        }

        if let Some(reply) = self.parse_direction(line) {
            return Some(reply);
        }

        if let Some(rest) = line.strip_prefix("Stop ") {
            if rest.starts_with("ALL") {
                return Some(DeviceReply::Stopped(None));
            }
            if let Some(label) = rest.strip_suffix(" motor.") {
                if let Some(axis) = axis_by_label(label) {
                    return Some(DeviceReply::Stopped(Some(axis)));
                }
            }
        }

        if REJECTION_PREFIXES.iter().any(|p| line.starts_with(p)) {
            return Some(DeviceReply::Rejected(line.to_string()));
        }

        Some(DeviceReply::Message(line.to_string()))
    }

    fn parse_calibration(&self, line: &str) -> DeviceReply {
        match line.parse::<u32>().ok().and_then(NonZeroU32::new) {
            Some(value) => DeviceReply::StepsPerRev(value),
            None => {
                let err = ProtocolError::MalformedInboundIgnored {
                    line: line.to_string(),
                };
                tracing::debug!("{}", err);
                DeviceReply::Message(line.to_string())
            }
        }
    }

    fn parse_direction(&self, line: &str) -> Option<DeviceReply> {
        let (label, value) = line.split_once(" direction => ")?;
        let axis = axis_by_label(label)?;
        let direction = match value.trim() {
            "0" => Direction::Low,
            "1" => Direction::High,
            _ => return None,
        };
        Some(DeviceReply::DirectionSet { axis, direction })
    }
}

fn axis_by_label(label: &str) -> Option<AxisId> {
    AxisId::ALL
        .into_iter()
        .find(|axis| axis.short_label() == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        let parser = ReplyParser::new();
        assert_eq!(parser.parse(""), None);
        assert_eq!(parser.parse("  \r"), None);
    }

    #[test]
    fn test_zero_and_overflow_are_not_calibration() {
        let parser = ReplyParser::new();
        assert_eq!(
            parser.parse("0"),
            Some(DeviceReply::Message("0".to_string()))
        );
        assert_eq!(
            parser.parse("99999999999"),
            Some(DeviceReply::Message("99999999999".to_string()))
        );
    }

    #[test]
    fn test_direction_with_unknown_axis_is_message() {
        let parser = ReplyParser::new();
        assert_eq!(
            parser.parse("XYZ direction => 1"),
            Some(DeviceReply::Message("XYZ direction => 1".to_string()))
        );
    }
}
