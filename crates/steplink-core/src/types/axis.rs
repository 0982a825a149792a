//! Axis identifiers and per-axis presentation metadata
//!
//! The device numbers its motors 1..=3. Each axis maps the raw direction
//! flag to its own pair of human labels; that mapping lives in a single
//! table ([`AXIS_PROFILES`]) keyed by [`AxisId`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default RPM when none is given
pub const DEFAULT_RPM: u32 = 100;

/// Default sweep steps per tick
pub const DEFAULT_SWEEP_STEPS: u32 = 100;

/// Default sweep delay in milliseconds
pub const DEFAULT_SWEEP_DELAY_MS: u32 = 1000;

/// Default value offered when setting steps per revolution
pub const DEFAULT_CALIBRATION_INPUT: u32 = 200;

/// One of the three independently controlled motors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AxisId {
    /// Azimuth motor
    Azimuth = 1,
    /// Polarization motor
    Polar = 2,
    /// Elevation motor
    Elevation = 3,
}

impl AxisId {
    /// All axes in device order
    pub const ALL: [AxisId; 3] = [AxisId::Azimuth, AxisId::Polar, AxisId::Elevation];

    /// Wire number of this axis (1..=3)
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Look up an axis by its wire number
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(AxisId::Azimuth),
            2 => Some(AxisId::Polar),
            3 => Some(AxisId::Elevation),
            _ => None,
        }
    }

    /// Zero-based slot used to index per-axis arrays
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Presentation metadata for this axis
    pub fn profile(self) -> &'static AxisProfile {
        &AXIS_PROFILES[self.index()]
    }

    /// Short label used by the device and the status texts ("AZI", "POL", "ELE")
    pub fn short_label(self) -> &'static str {
        self.profile().short_label
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_label())
    }
}

impl FromStr for AxisId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "azi" | "azimuth" => Ok(AxisId::Azimuth),
            "2" | "pol" | "polar" => Ok(AxisId::Polar),
            "3" | "ele" | "elevation" => Ok(AxisId::Elevation),
            other => Err(format!("Unknown axis: {}", other)),
        }
    }
}

/// Raw direction flag as sent on the wire
///
/// The numeric value drives the device's direction pin; what it means
/// physically depends on the axis (see [`AxisProfile::direction_label`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Flag 0
    #[default]
    Low,
    /// Flag 1
    High,
}

impl Direction {
    /// The opposite flag
    pub fn toggled(self) -> Self {
        match self {
            Direction::Low => Direction::High,
            Direction::High => Direction::Low,
        }
    }

    /// Wire value (0 or 1)
    pub fn as_wire(self) -> u8 {
        match self {
            Direction::Low => 0,
            Direction::High => 1,
        }
    }
}

/// Presentation metadata for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisProfile {
    /// The axis described
    pub axis: AxisId,
    /// Short label ("AZI", "POL", "ELE")
    pub short_label: &'static str,
    /// Labels for direction flag 0 and 1
    pub direction_labels: [&'static str; 2],
    /// Manual steps value offered before the user edits it
    pub default_steps: u32,
}

impl AxisProfile {
    /// Human label for a direction flag on this axis
    pub fn direction_label(&self, direction: Direction) -> &'static str {
        self.direction_labels[direction.as_wire() as usize]
    }

    /// Status text for a direction flag, e.g. `STATUS: CCW`
    pub fn direction_status(&self, direction: Direction) -> String {
        format!("STATUS: {}", self.direction_label(direction))
    }
}

/// Per-axis presentation table, indexed by [`AxisId::index`]
pub const AXIS_PROFILES: [AxisProfile; 3] = [
    AxisProfile {
        axis: AxisId::Azimuth,
        short_label: "AZI",
        direction_labels: ["CCW", "CW"],
        default_steps: 200,
    },
    AxisProfile {
        axis: AxisId::Polar,
        short_label: "POL",
        direction_labels: ["CW", "CCW"],
        default_steps: 2000,
    },
    AxisProfile {
        axis: AxisId::Elevation,
        short_label: "ELE",
        direction_labels: ["UP", "DOWN"],
        default_steps: 200,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_table_is_indexed_by_axis() {
        for axis in AxisId::ALL {
            assert_eq!(axis.profile().axis, axis);
            assert_eq!(AxisId::from_number(axis.number()), Some(axis));
        }
        assert_eq!(AxisId::from_number(0), None);
        assert_eq!(AxisId::from_number(4), None);
    }

    #[test]
    fn test_direction_labels() {
        let azi = AxisId::Azimuth.profile();
        assert_eq!(azi.direction_label(Direction::Low), "CCW");
        assert_eq!(azi.direction_label(Direction::High), "CW");

        let pol = AxisId::Polar.profile();
        assert_eq!(pol.direction_label(Direction::Low), "CW");
        assert_eq!(pol.direction_label(Direction::High), "CCW");

        let ele = AxisId::Elevation.profile();
        assert_eq!(ele.direction_status(Direction::Low), "STATUS: UP");
        assert_eq!(ele.direction_status(Direction::High), "STATUS: DOWN");
    }

    #[test]
    fn test_direction_toggle() {
        assert_eq!(Direction::default(), Direction::Low);
        assert_eq!(Direction::Low.toggled(), Direction::High);
        assert_eq!(Direction::Low.toggled().toggled(), Direction::Low);
        assert_eq!(Direction::High.as_wire(), 1);
    }

    #[test]
    fn test_parse_axis_names() {
        assert_eq!("azi".parse::<AxisId>(), Ok(AxisId::Azimuth));
        assert_eq!("POL".parse::<AxisId>(), Ok(AxisId::Polar));
        assert_eq!("3".parse::<AxisId>(), Ok(AxisId::Elevation));
        assert!("x".parse::<AxisId>().is_err());
    }
}
