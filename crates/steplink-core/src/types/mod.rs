//! Shared domain types
//!
//! Axis identifiers and their presentation table, direction flags, and the
//! calibration math that converts step counts into angles.

pub mod axis;
pub mod calibration;

pub use axis::{
    AxisId, AxisProfile, Direction, AXIS_PROFILES, DEFAULT_CALIBRATION_INPUT, DEFAULT_RPM,
    DEFAULT_SWEEP_DELAY_MS, DEFAULT_SWEEP_STEPS,
};
pub use calibration::{angular_resolution, AngleDisplay};
