//! Axis controller
//!
//! Holds the state of one motor as the host sees it: direction flag, the
//! staged manual step count, a mirror of the calibration, and the sweep
//! scheduler. Methods return the wire command to send; they never write.

use super::sweep::{SweepConfig, SweepScheduler};
use crate::protocol::Command;
use std::num::NonZeroU32;
use std::time::Instant;
use steplink_core::{AngleDisplay, AxisId, AxisProfile, Direction, ValidationError};

/// Host-side state for one axis
#[derive(Debug, Clone)]
pub struct AxisController {
    axis: AxisId,
    direction: Direction,
    steps: i64,
    calibration: Option<NonZeroU32>,
    sweep: SweepScheduler,
}

impl AxisController {
    /// Create a controller in its initial state (direction 0, sweep off)
    pub fn new(axis: AxisId) -> Self {
        Self {
            axis,
            direction: Direction::default(),
            steps: i64::from(axis.profile().default_steps),
            calibration: None,
            sweep: SweepScheduler::new(axis),
        }
    }

    /// The axis this controller drives
    pub fn axis(&self) -> AxisId {
        self.axis
    }

    /// Presentation metadata for the axis
    pub fn profile(&self) -> &'static AxisProfile {
        self.axis.profile()
    }

    /// Current direction flag
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Human label of the current direction ("CW", "UP", ...)
    pub fn direction_label(&self) -> &'static str {
        self.profile().direction_label(self.direction)
    }

    /// Fail if sweep mode holds the manual controls
    pub fn ensure_manual(&self) -> Result<(), ValidationError> {
        if self.sweep.is_enabled() {
            Err(ValidationError::ManualControlLocked { axis: self.axis })
        } else {
            Ok(())
        }
    }

    /// Flip the direction flag and return the `D` command for it
    pub fn toggle_direction(&mut self) -> Result<Command, ValidationError> {
        self.ensure_manual()?;
        self.direction = self.direction.toggled();
        Ok(Command::SetDirection {
            axis: self.axis,
            direction: self.direction,
        })
    }

    /// `F` command for a new speed
    pub fn set_speed(&self, rpm: i64) -> Result<Command, ValidationError> {
        self.ensure_manual()?;
        Command::set_speed(self.axis, rpm)
    }

    /// Stage a manual step count and return the angle it covers
    pub fn set_steps(&mut self, steps: i64) -> AngleDisplay {
        self.steps = steps;
        self.angle_display()
    }

    /// Staged manual step count
    pub fn steps(&self) -> i64 {
        self.steps
    }

    /// Stage `steps` and return the `S` command for it
    pub fn move_steps(&mut self, steps: i64) -> Result<Command, ValidationError> {
        self.ensure_manual()?;
        let command = Command::move_steps(self.axis, steps)?;
        self.steps = steps;
        Ok(command)
    }

    /// `X` command for this axis; available in every mode
    pub fn stop(&self) -> Command {
        Command::Stop(self.axis)
    }

    /// Update the calibration mirror and return the recomputed angle
    pub fn set_calibration(&mut self, steps_per_rev: Option<NonZeroU32>) -> AngleDisplay {
        self.calibration = steps_per_rev;
        self.angle_display()
    }

    /// Calibration mirror
    pub fn calibration(&self) -> Option<NonZeroU32> {
        self.calibration
    }

    /// Angle covered by the staged step count
    pub fn angle_display(&self) -> AngleDisplay {
        AngleDisplay::for_steps(self.steps, self.calibration)
    }

    /// Enter or leave sweep mode, returning the `W` command
    ///
    /// Entering validates both parameters first; an invalid request leaves
    /// the axis in manual mode and produces no command. Leaving always
    /// succeeds and disarms the scheduler immediately.
    pub fn set_sweep_enabled(
        &mut self,
        enabled: bool,
        steps_per_tick: i64,
        delay_ms: i64,
        now: Instant,
    ) -> Result<Command, ValidationError> {
        if enabled {
            self.sweep.arm(steps_per_tick, delay_ms, now)?;
        } else {
            self.sweep.disarm();
        }
        Ok(Command::Sweep {
            axis: self.axis,
            enabled,
        })
    }

    /// Whether sweep mode is on
    pub fn is_sweeping(&self) -> bool {
        self.sweep.is_enabled()
    }

    /// Current sweep parameters
    pub fn sweep_config(&self) -> SweepConfig {
        self.sweep.config()
    }

    /// Edit the sweep step count; checked on the next tick
    pub fn set_sweep_steps(&mut self, steps_per_tick: i64) {
        self.sweep.set_steps(steps_per_tick);
    }

    /// Edit the sweep delay; checked on the next tick
    pub fn set_sweep_delay(&mut self, delay_ms: i64, now: Instant) {
        self.sweep.set_delay(delay_ms, now);
    }

    /// Run one sweep tick now, regardless of the timer
    pub fn sweep_tick(&mut self) -> Option<Result<Command, ValidationError>> {
        self.sweep.fire()
    }

    /// Run a sweep tick if the timer is due
    pub fn poll_sweep(&mut self, now: Instant) -> Option<Result<Command, ValidationError>> {
        self.sweep.poll(now)
    }

    /// Leave sweep mode without producing a command. Returns whether it was on.
    pub fn halt_sweep(&mut self) -> bool {
        self.sweep.disarm()
    }
}
