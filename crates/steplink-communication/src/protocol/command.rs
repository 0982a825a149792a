//! Command encoder
//!
//! Maps control intents to the board's wire commands:
//!
//! | Command | Wire form |
//! |---|---|
//! | Set direction | `D<axis> <0|1>` |
//! | Set speed | `F<axis> <rpm>` |
//! | Move steps | `S<axis> <steps>` |
//! | Stop one axis | `X<axis>` |
//! | Stop all axes | `X0` |
//! | Sweep on/off | `W <axis> <0|1>` |
//! | Query steps/rev | `G` |
//! | Set steps/rev | `R <value>` |
//! | Disable after motion | `Z <0|1>` |
//!
//! Numeric arguments are carried as [`NonZeroU32`], so a constructed command
//! is always valid; the checked constructors reject anything else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use steplink_core::{AxisId, Direction, ValidationError};

/// Check that `value` is a positive integer that fits the wire format
pub fn positive(name: &'static str, value: i64) -> Result<NonZeroU32, ValidationError> {
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| ValidationError::InvalidArgument {
            name,
            value: value.to_string(),
        })
}

/// Parse user text as a positive integer
///
/// Only ASCII decimal digits are accepted (after trimming), so signs,
/// decimal points and exponents are rejected.
pub fn parse_positive(name: &'static str, text: &str) -> Result<NonZeroU32, ValidationError> {
    let trimmed = text.trim();
    let invalid = || ValidationError::InvalidArgument {
        name,
        value: trimmed.to_string(),
    };

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    trimmed
        .parse::<u32>()
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(invalid)
}

/// One wire command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// `D<axis> <0|1>`
    SetDirection {
        /// Target axis
        axis: AxisId,
        /// New direction flag
        direction: Direction,
    },
    /// `F<axis> <rpm>`
    SetSpeed {
        /// Target axis
        axis: AxisId,
        /// Revolutions per minute
        rpm: NonZeroU32,
    },
    /// `S<axis> <steps>`
    MoveSteps {
        /// Target axis
        axis: AxisId,
        /// Steps to move
        steps: NonZeroU32,
    },
    /// `X<axis>`
    Stop(AxisId),
    /// `X0`
    StopAll,
    /// `W <axis> <0|1>`
    Sweep {
        /// Target axis
        axis: AxisId,
        /// Whether sweep mode is on
        enabled: bool,
    },
    /// `G`
    QueryCalibration,
    /// `R <value>`
    SetCalibration(NonZeroU32),
    /// `Z <0|1>`
    DisableAfterMotion(bool),
}

impl Command {
    /// Checked `F` command
    pub fn set_speed(axis: AxisId, rpm: i64) -> Result<Self, ValidationError> {
        Ok(Command::SetSpeed {
            axis,
            rpm: positive("RPM", rpm)?,
        })
    }

    /// Checked `S` command
    pub fn move_steps(axis: AxisId, steps: i64) -> Result<Self, ValidationError> {
        Ok(Command::MoveSteps {
            axis,
            steps: positive("steps", steps)?,
        })
    }

    /// Checked `R` command
    pub fn set_calibration(value: i64) -> Result<Self, ValidationError> {
        Ok(Command::SetCalibration(positive(
            "steps per revolution",
            value,
        )?))
    }

    /// Leading verb character
    pub fn verb(&self) -> char {
        match self {
            Command::SetDirection { .. } => 'D',
            Command::SetSpeed { .. } => 'F',
            Command::MoveSteps { .. } => 'S',
            Command::Stop(_) | Command::StopAll => 'X',
            Command::Sweep { .. } => 'W',
            Command::QueryCalibration => 'G',
            Command::SetCalibration(_) => 'R',
            Command::DisableAfterMotion(_) => 'Z',
        }
    }

    /// The full wire line, newline included
    pub fn encode(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetDirection { axis, direction } => {
                write!(f, "D{} {}", axis.number(), direction.as_wire())
            }
            Command::SetSpeed { axis, rpm } => write!(f, "F{} {}", axis.number(), rpm),
            Command::MoveSteps { axis, steps } => write!(f, "S{} {}", axis.number(), steps),
            Command::Stop(axis) => write!(f, "X{}", axis.number()),
            Command::StopAll => write!(f, "X0"),
            Command::Sweep { axis, enabled } => {
                write!(f, "W {} {}", axis.number(), u8::from(*enabled))
            }
            Command::QueryCalibration => write!(f, "G"),
            Command::SetCalibration(value) => write!(f, "R {}", value),
            Command::DisableAfterMotion(enabled) => write!(f, "Z {}", u8::from(*enabled)),
        }
    }
}
