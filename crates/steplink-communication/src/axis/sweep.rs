//! Sweep scheduler
//!
//! While enabled, an axis re-issues the same short move every `delay_ms`.
//! The parameters are re-checked on every tick; if either stopped being a
//! positive integer the scheduler disables itself and reports why.

use crate::protocol::{positive, Command};
use crate::scheduler::PeriodicTask;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use steplink_core::{AxisId, ValidationError, DEFAULT_SWEEP_DELAY_MS, DEFAULT_SWEEP_STEPS};

/// Sweep parameters for one axis
///
/// Values are stored as given so that a later edit to an invalid value can
/// be detected by the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Steps issued per tick
    pub steps_per_tick: i64,
    /// Milliseconds between ticks
    pub delay_ms: i64,
    /// Whether the scheduler is armed
    pub enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            steps_per_tick: i64::from(DEFAULT_SWEEP_STEPS),
            delay_ms: i64::from(DEFAULT_SWEEP_DELAY_MS),
            enabled: false,
        }
    }
}

impl SweepConfig {
    /// Steps per tick as a wire value
    pub fn validated_steps(&self) -> Result<NonZeroU32, ValidationError> {
        positive("sweep steps", self.steps_per_tick).map_err(|_| {
            ValidationError::InvalidSweepSteps {
                value: self.steps_per_tick,
            }
        })
    }

    /// Delay as a wire value
    pub fn validated_delay(&self) -> Result<NonZeroU32, ValidationError> {
        positive("sweep delay", self.delay_ms).map_err(|_| ValidationError::InvalidSweepDelay {
            value: self.delay_ms,
        })
    }
}

/// Periodic move generator for one axis
#[derive(Debug, Clone)]
pub struct SweepScheduler {
    axis: AxisId,
    config: SweepConfig,
    task: PeriodicTask,
}

impl SweepScheduler {
    /// Create a disabled scheduler with default parameters
    pub fn new(axis: AxisId) -> Self {
        let config = SweepConfig::default();
        Self {
            axis,
            task: PeriodicTask::new(Duration::from_millis(config.delay_ms as u64)),
            config,
        }
    }

    /// Current parameters
    pub fn config(&self) -> SweepConfig {
        self.config
    }

    /// Whether sweep mode is on
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Next scheduled tick, if armed
    pub fn next_due(&self) -> Option<Instant> {
        self.task.next_due()
    }

    /// Validate both parameters without changing anything
    pub fn check(
        steps_per_tick: i64,
        delay_ms: i64,
    ) -> Result<(NonZeroU32, NonZeroU32), ValidationError> {
        let candidate = SweepConfig {
            steps_per_tick,
            delay_ms,
            enabled: false,
        };
        Ok((candidate.validated_steps()?, candidate.validated_delay()?))
    }

    /// Store parameters and start ticking; nothing changes if they are invalid
    pub fn arm(
        &mut self,
        steps_per_tick: i64,
        delay_ms: i64,
        now: Instant,
    ) -> Result<(NonZeroU32, NonZeroU32), ValidationError> {
        let (steps, delay) = Self::check(steps_per_tick, delay_ms)?;
        self.config = SweepConfig {
            steps_per_tick,
            delay_ms,
            enabled: true,
        };
        self.task
            .set_interval(Duration::from_millis(u64::from(delay.get())), now);
        self.task.start(now);
        tracing::debug!(
            "{} sweep armed: {} steps every {} ms",
            self.axis,
            steps,
            delay
        );
        Ok((steps, delay))
    }

    /// Stop ticking. Returns whether the scheduler was enabled.
    pub fn disarm(&mut self) -> bool {
        let was_enabled = self.config.enabled;
        self.config.enabled = false;
        self.task.cancel();
        was_enabled
    }

    /// Change the steps per tick; applies from the next tick
    pub fn set_steps(&mut self, steps_per_tick: i64) {
        self.config.steps_per_tick = steps_per_tick;
    }

    /// Change the delay; a running scheduler restarts its timer from `now`
    pub fn set_delay(&mut self, delay_ms: i64, now: Instant) {
        self.config.delay_ms = delay_ms;
        if let Ok(delay) = self.config.validated_delay() {
            self.task
                .set_interval(Duration::from_millis(u64::from(delay.get())), now);
        }
    }

    /// Run one tick immediately
    ///
    /// `None` when disabled. Otherwise the move command, or the validation
    /// error that just disabled the scheduler.
    pub fn fire(&mut self) -> Option<Result<Command, ValidationError>> {
        if !self.config.enabled {
            return None;
        }

        let checked = self
            .config
            .validated_steps()
            .and_then(|steps| self.config.validated_delay().map(|_| steps));

        match checked {
            Ok(steps) => Some(Ok(Command::MoveSteps {
                axis: self.axis,
                steps,
            })),
            Err(err) => {
                tracing::warn!("{} sweep halted: {}", self.axis, err);
                self.disarm();
                Some(Err(err))
            }
        }
    }

    /// Run a tick if one is due at `now`
    pub fn poll(&mut self, now: Instant) -> Option<Result<Command, ValidationError>> {
        if self.config.enabled && self.task.poll(now) {
            self.fire()
        } else {
            None
        }
    }
}
