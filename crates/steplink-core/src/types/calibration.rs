//! Step-to-angle conversion
//!
//! The device reports how many steps make a full revolution. Everything
//! angular is derived from that value; before it is known, angles are unknown.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Degrees moved by a single step
pub fn angular_resolution(steps_per_rev: NonZeroU32) -> f64 {
    360.0 / f64::from(steps_per_rev.get())
}

/// Angle covered by a step count, or unknown without calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AngleDisplay {
    /// Angle in degrees
    Known(f64),
    /// No calibration yet, or no usable step count
    Unknown,
}

impl AngleDisplay {
    /// Compute `360 * steps / steps_per_rev`
    ///
    /// Negative step counts have no angle.
    pub fn for_steps(steps: i64, steps_per_rev: Option<NonZeroU32>) -> Self {
        match steps_per_rev {
            Some(spr) if steps >= 0 => {
                AngleDisplay::Known(steps as f64 * 360.0 / f64::from(spr.get()))
            }
            _ => AngleDisplay::Unknown,
        }
    }

    /// Degrees, if known
    pub fn degrees(&self) -> Option<f64> {
        match self {
            AngleDisplay::Known(deg) => Some(*deg),
            AngleDisplay::Unknown => None,
        }
    }

    /// Whether the angle is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, AngleDisplay::Unknown)
    }
}

impl fmt::Display for AngleDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleDisplay::Known(deg) => write!(f, "{:.2}°", deg),
            AngleDisplay::Unknown => write!(f, "N/A°"),
        }
    }
}
