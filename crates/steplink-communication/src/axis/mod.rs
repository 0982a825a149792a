//! Per-axis control
//!
//! Each of the three motors has an [`AxisController`] owning its direction,
//! calibration mirror and [`SweepScheduler`].

pub mod controller;
pub mod sweep;

pub use controller::AxisController;
pub use sweep::{SweepConfig, SweepScheduler};
