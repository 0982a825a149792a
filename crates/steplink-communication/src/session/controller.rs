//! Session controller
//!
//! Owns the transport, the three axis controllers and the session state.
//! Everything runs on the caller's thread: [`Session::tick`] drives the
//! inbound poll, the deferred calibration query and the sweep timers, and
//! [`Session::dispatch`] handles one user intent.

use super::intent::Intent;
use super::state::{ConnectionState, SessionState};
use crate::axis::{AxisController, SweepScheduler};
use crate::communication::{ConnectionParams, SerialPortInfo, Transport};
use crate::protocol::{Command, DeviceReply, ReplyParser};
use crate::scheduler::{OneShotTask, PeriodicTask};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use steplink_core::{
    angular_resolution, AngleDisplay, AxisId, ConnectionError, Error, EventBus, EventBusConfig,
    Result, SessionEvent, ValidationError,
};

/// Default cadence of the inbound poll
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default delay between `R` and the follow-up `G`
pub const DEFAULT_CALIBRATION_FOLLOWUP: Duration = Duration::from_millis(1);

/// Session tuning
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Port parameters
    pub connection: ConnectionParams,
    /// How often the inbound poll runs
    pub poll_interval: Duration,
    /// Delay between setting the calibration and re-querying it
    pub calibration_followup: Duration,
    /// Event bus parameters
    pub events: EventBusConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionParams::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            calibration_followup: DEFAULT_CALIBRATION_FOLLOWUP,
            events: EventBusConfig::default(),
        }
    }
}

/// A control session with one controller board
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,
    state: SessionState,
    axes: [AxisController; 3],
    events: EventBus,
    parser: ReplyParser,
    inbound_poll: PeriodicTask,
    calibration_followup: OneShotTask,
}

impl<T: Transport> Session<T> {
    /// Create a disconnected session
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let events = EventBus::with_config(config.events.clone());
        Self {
            transport,
            inbound_poll: PeriodicTask::new(config.poll_interval),
            config,
            state: SessionState::default(),
            axes: AxisId::ALL.map(AxisController::new),
            events,
            parser: ReplyParser::new(),
            calibration_followup: OneShotTask::new(),
        }
    }

    /// Status event bus
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Session-wide state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Session tuning
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether a port is open
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Controller for `axis`
    pub fn axis(&self, axis: AxisId) -> &AxisController {
        &self.axes[axis.index()]
    }

    fn axis_mut(&mut self, axis: AxisId) -> &mut AxisController {
        &mut self.axes[axis.index()]
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport, mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Enumerate candidate ports
    pub fn list_ports(&self) -> Result<Vec<SerialPortInfo>> {
        self.transport.list_available().map_err(|err| {
            tracing::error!("Port enumeration failed: {}", err);
            Error::from(err)
        })
    }

    /// Open `port` and run the connect handshake
    ///
    /// An open port is closed first. On success the board is asked for its
    /// steps per revolution and told to keep its coils energised; failures
    /// of those two commands are reported as events but do not fail the
    /// connect.
    pub fn connect(&mut self, port: &str, now: Instant) -> Result<()> {
        if self.state.is_connected() || self.transport.is_open() {
            self.disconnect();
        }

        tracing::info!(
            "Connecting to {} at {} baud",
            port,
            self.config.connection.baud_rate
        );
        if let Err(err) = self.transport.open(port, &self.config.connection) {
            tracing::warn!("Failed to open {}: {}", port, err);
            self.emit(SessionEvent::ConnectionFailed {
                port: port.to_string(),
                reason: failure_reason(&err),
            });
            return Err(err.into());
        }

        self.state.connection = ConnectionState::Connected {
            port: port.to_string(),
        };
        self.inbound_poll.start(now);
        tracing::info!("Connected to {}", port);
        self.emit(SessionEvent::Connected {
            port: port.to_string(),
        });

        for intent in [Intent::QueryCalibration, Intent::SetDisableAfterMotion(true)] {
            if let Err(err) = self.dispatch(intent, now) {
                tracing::warn!("Connect handshake command failed: {}", err);
            }
        }
        Ok(())
    }

    /// Close the port
    ///
    /// Stops every sweep locally (no `W` is sent) and forgets the
    /// calibration, since the next board may differ.
    pub fn disconnect(&mut self) {
        let was_connected = self.state.is_connected();
        self.inbound_poll.cancel();
        self.calibration_followup.cancel();
        self.transport.close();
        self.state.connection = ConnectionState::Disconnected;

        let halted: Vec<AxisId> = self
            .axes
            .iter_mut()
            .filter_map(|axis| axis.halt_sweep().then(|| axis.axis()))
            .collect();
        for axis in halted {
            self.emit(SessionEvent::SweepStopped { axis });
        }

        if self.state.calibration.is_some() {
            self.apply_calibration(None);
        }

        if was_connected {
            tracing::info!("Disconnected");
            self.emit(SessionEvent::Disconnected);
        }
    }

    /// Validate and send one intent
    ///
    /// Arguments are validated first, then the connection is checked, and
    /// only then is any local state changed and the command written. A failed
    /// write leaves the state as it was, except that disabling a sweep always
    /// stops it locally. Every failure is also published as an event.
    pub fn dispatch(&mut self, intent: Intent, now: Instant) -> Result<Command> {
        let outcome = self.execute(intent, now);
        if let Err(err) = &outcome {
            self.report_failure(err);
        }
        outcome
    }

    /// Send `R <value>` and schedule a `G` to read it back
    pub fn set_calibration_target(&mut self, value: i64, now: Instant) -> Result<Command> {
        self.dispatch(Intent::SetCalibration(value), now)
    }

    /// Stage the manual step count of an axis without sending anything
    pub fn set_steps(&mut self, axis: AxisId, steps: i64) -> AngleDisplay {
        let angle = self.axis_mut(axis).set_steps(steps);
        self.emit(SessionEvent::AngleUpdated { axis, angle });
        angle
    }

    /// Edit the sweep step count of an axis; checked on its next tick
    pub fn set_sweep_steps(&mut self, axis: AxisId, steps_per_tick: i64) {
        self.axis_mut(axis).set_sweep_steps(steps_per_tick);
    }

    /// Edit the sweep delay of an axis; a running sweep restarts its timer
    pub fn set_sweep_delay(&mut self, axis: AxisId, delay_ms: i64, now: Instant) {
        self.axis_mut(axis).set_sweep_delay(delay_ms, now);
    }

    /// Read and handle at most one inbound line
    pub fn poll_inbound(&mut self) -> Option<DeviceReply> {
        if !self.state.is_connected() {
            return None;
        }

        let line = match self.transport.try_read_line() {
            Ok(Some(line)) => line,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("Error reading data: {}", err);
                self.emit(SessionEvent::ReadFailed {
                    reason: failure_reason(&err),
                });
                return None;
            }
        };

        let reply = self.parser.parse(&line)?;
        tracing::debug!("Received: {} ({})", line, reply);
        self.emit(SessionEvent::LineReceived {
            line,
            level: reply.level(),
        });

        if let Some(steps_per_rev) = reply.calibration() {
            self.apply_calibration(Some(steps_per_rev));
        }
        Some(reply)
    }

    /// Run one sweep tick of `axis` now, regardless of its timer
    pub fn sweep_tick(&mut self, axis: AxisId) -> Option<Command> {
        let outcome = self.axis_mut(axis).sweep_tick();
        self.handle_sweep_outcome(axis, outcome)
    }

    /// One cooperative step: run whatever is due at `now`
    pub fn tick(&mut self, now: Instant) {
        if self.inbound_poll.poll(now) {
            self.poll_inbound();
        }

        if self.calibration_followup.poll(now) {
            if let Err(err) = self.dispatch(Intent::QueryCalibration, now) {
                tracing::debug!("Calibration read-back failed: {}", err);
            }
        }

        for axis in AxisId::ALL {
            let outcome = self.axis_mut(axis).poll_sweep(now);
            self.handle_sweep_outcome(axis, outcome);
        }
    }

    /// Human-readable summary of the session
    pub fn status_lines(&self) -> Vec<String> {
        let mut lines = vec![self.state.connection.to_string()];
        lines.push(match self.state.calibration {
            Some(value) => format!(
                "Steps/Rev: {} | Angular Res: {:.2}°",
                value,
                angular_resolution(value)
            ),
            None => "Steps/Rev: unknown".to_string(),
        });
        lines.push(format!(
            "Disable after motion: {}",
            if self.state.disable_after_motion {
                "on"
            } else {
                "off"
            }
        ));

        for axis in &self.axes {
            let sweep = axis.sweep_config();
            let sweep_text = if sweep.enabled {
                format!(
                    "sweep {} steps / {} ms",
                    sweep.steps_per_tick, sweep.delay_ms
                )
            } else {
                "manual".to_string()
            };
            lines.push(format!(
                "{} {} | steps {} | angle {} | {}",
                axis.axis(),
                axis.profile().direction_status(axis.direction()),
                axis.steps(),
                axis.angle_display(),
                sweep_text
            ));
        }
        lines
    }

    fn execute(&mut self, intent: Intent, now: Instant) -> Result<Command> {
        match intent {
            Intent::ToggleDirection(axis) => {
                self.axis(axis).ensure_manual()?;
                self.ensure_connected()?;
                let snapshot = self.axis(axis).clone();
                let command = self.axis_mut(axis).toggle_direction()?;
                let command = self.send_or_restore(snapshot, command)?;
                self.emit(SessionEvent::DirectionChanged {
                    axis,
                    direction: self.axis(axis).direction(),
                });
                Ok(command)
            }
            Intent::SetSpeed { axis, rpm } => {
                let command = self.axis(axis).set_speed(rpm)?;
                self.ensure_connected()?;
                self.send(command)
            }
            Intent::MoveSteps { axis, steps } => {
                self.axis(axis).ensure_manual()?;
                Command::move_steps(axis, steps)?;
                self.ensure_connected()?;
                let snapshot = self.axis(axis).clone();
                let command = self.axis_mut(axis).move_steps(steps)?;
                let command = self.send_or_restore(snapshot, command)?;
                let angle = self.axis(axis).angle_display();
                self.emit(SessionEvent::AngleUpdated { axis, angle });
                Ok(command)
            }
            Intent::Stop(axis) => {
                self.ensure_connected()?;
                let command = self.axis(axis).stop();
                self.send(command)
            }
            Intent::StopAll => {
                self.ensure_connected()?;
                self.send(Command::StopAll)
            }
            Intent::SetSweep {
                axis,
                enabled: true,
                steps_per_tick,
                delay_ms,
            } => {
                let (steps, delay) = SweepScheduler::check(steps_per_tick, delay_ms)?;
                self.ensure_connected()?;
                let snapshot = self.axis(axis).clone();
                let command =
                    self.axis_mut(axis)
                        .set_sweep_enabled(true, steps_per_tick, delay_ms, now)?;
                let command = self.send_or_restore(snapshot, command)?;
                self.emit(SessionEvent::SweepStarted {
                    axis,
                    steps_per_tick: steps.get(),
                    delay_ms: delay.get(),
                });
                Ok(command)
            }
            Intent::SetSweep {
                axis,
                enabled: false,
                steps_per_tick,
                delay_ms,
            } => {
                let was_sweeping = self.axis(axis).is_sweeping();
                let command =
                    self.axis_mut(axis)
                        .set_sweep_enabled(false, steps_per_tick, delay_ms, now)?;
                if was_sweeping {
                    self.emit(SessionEvent::SweepStopped { axis });
                }
                self.ensure_connected()?;
                self.send(command)
            }
            Intent::SetCalibration(value) => {
                let command = Command::set_calibration(value)?;
                self.ensure_connected()?;
                let command = self.send(command)?;
                self.calibration_followup
                    .schedule(now, self.config.calibration_followup);
                Ok(command)
            }
            Intent::QueryCalibration => {
                self.ensure_connected()?;
                self.send(Command::QueryCalibration)
            }
            Intent::SetDisableAfterMotion(on) => {
                self.ensure_connected()?;
                let command = self.send(Command::DisableAfterMotion(on))?;
                self.state.disable_after_motion = on;
                Ok(command)
            }
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.state.is_connected() && self.transport.is_open() {
            Ok(())
        } else {
            Err(ConnectionError::NotConnected.into())
        }
    }

    fn send(&mut self, command: Command) -> Result<Command> {
        self.transport.write_line(&command.encode())?;
        tracing::debug!("Sent: {}", command);
        self.emit(SessionEvent::CommandSent {
            command: command.to_string(),
        });
        Ok(command)
    }

    /// Send a command whose local change is already applied; put the axis
    /// back as it was if the write fails.
    fn send_or_restore(&mut self, snapshot: AxisController, command: Command) -> Result<Command> {
        match self.send(command) {
            Ok(command) => Ok(command),
            Err(err) => {
                let axis = snapshot.axis();
                self.axes[axis.index()] = snapshot;
                Err(err)
            }
        }
    }

    fn handle_sweep_outcome(
        &mut self,
        axis: AxisId,
        outcome: Option<std::result::Result<Command, ValidationError>>,
    ) -> Option<Command> {
        match outcome? {
            Ok(command) => match self.send(command) {
                Ok(command) => Some(command),
                Err(err) => {
                    self.report_failure(&err);
                    None
                }
            },
            Err(err) => {
                self.emit(SessionEvent::SweepHalted {
                    axis,
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    fn apply_calibration(&mut self, steps_per_rev: Option<NonZeroU32>) {
        self.state.calibration = steps_per_rev;
        if let Some(value) = steps_per_rev {
            tracing::info!("Board reports {} steps per revolution", value);
            self.emit(SessionEvent::CalibrationUpdated {
                steps_per_rev: value.get(),
                angular_resolution: angular_resolution(value),
            });
        }

        for axis in AxisId::ALL {
            let angle = self.axis_mut(axis).set_calibration(steps_per_rev);
            self.emit(SessionEvent::AngleUpdated { axis, angle });
        }
    }

    fn report_failure(&self, err: &Error) {
        tracing::warn!("{}", err);
        let event = match err {
            Error::Validation(err) => SessionEvent::ValidationFailed {
                reason: err.to_string(),
            },
            Error::Connection(err) => SessionEvent::CommandFailed {
                reason: failure_reason(err),
            },
        };
        self.emit(event);
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.publish(event).is_err() {
            tracing::trace!("Session event dropped: no subscribers");
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if self.transport.is_open() {
            self.transport.close();
        }
    }
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("axes", &self.axes)
            .finish_non_exhaustive()
    }
}

fn failure_reason(err: &ConnectionError) -> String {
    match err {
        ConnectionError::OpenFailed { reason, .. }
        | ConnectionError::WriteFailed { reason }
        | ConnectionError::ReadFailed { reason }
        | ConnectionError::EnumerationFailed { reason } => reason.clone(),
        ConnectionError::NotConnected => err.to_string(),
    }
}
