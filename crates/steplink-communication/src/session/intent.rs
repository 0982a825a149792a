//! User-level control intents
//!
//! Numeric arguments are kept as the caller supplied them; the session
//! validates them before anything is written.

use serde::{Deserialize, Serialize};
use steplink_core::AxisId;

/// One control action requested by a presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Flip an axis direction flag
    ToggleDirection(AxisId),
    /// Set an axis speed in RPM
    SetSpeed {
        /// Target axis
        axis: AxisId,
        /// Requested speed
        rpm: i64,
    },
    /// Move an axis by a number of steps
    MoveSteps {
        /// Target axis
        axis: AxisId,
        /// Requested step count
        steps: i64,
    },
    /// Stop one axis
    Stop(AxisId),
    /// Stop all axes
    StopAll,
    /// Enter or leave sweep mode
    SetSweep {
        /// Target axis
        axis: AxisId,
        /// On or off
        enabled: bool,
        /// Steps per tick (ignored when turning off)
        steps_per_tick: i64,
        /// Milliseconds between ticks (ignored when turning off)
        delay_ms: i64,
    },
    /// Store a new steps-per-revolution value on the board
    SetCalibration(i64),
    /// Ask the board for its steps-per-revolution value
    QueryCalibration,
    /// Set whether the board releases its coils after each move
    SetDisableAfterMotion(bool),
}
