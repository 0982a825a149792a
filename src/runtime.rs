//! Async host for a [`Session`]
//!
//! The session itself is synchronous. [`SessionRunner`] drives it from a
//! single tokio task: a fixed-period interval calls [`Session::tick`] and
//! commands arrive over an mpsc channel. Both share one `select!` loop, so
//! the session is never touched from two places at once.

use std::time::Duration;
use steplink_communication::{Intent, Session, Transport};
use steplink_core::AxisId;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Requests accepted by a [`SessionRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerCommand {
    /// Open a port
    Connect(String),
    /// Close the port
    Disconnect,
    /// Dispatch one intent
    Intent(Intent),
    /// Move an axis by its staged step count
    MoveStaged(AxisId),
    /// Start sweeping with the axis's current sweep parameters
    StartSweep(AxisId),
    /// Stage a manual step count
    SetSteps {
        /// Target axis
        axis: AxisId,
        /// Step count
        steps: i64,
    },
    /// Edit the sweep steps per tick
    SetSweepSteps {
        /// Target axis
        axis: AxisId,
        /// Steps per tick
        steps_per_tick: i64,
    },
    /// Edit the sweep delay
    SetSweepDelay {
        /// Target axis
        axis: AxisId,
        /// Delay in milliseconds
        delay_ms: i64,
    },
    /// Log the available ports
    ListPorts,
    /// Log the session summary
    Status,
    /// Disconnect and stop the loop
    Shutdown,
}

/// Drives a session on the current tokio task
pub struct SessionRunner<T: Transport> {
    session: Session<T>,
    tick: Duration,
}

impl<T: Transport> SessionRunner<T> {
    /// Create a runner ticking the session every `tick`
    pub fn new(session: Session<T>, tick: Duration) -> Self {
        Self { session, tick }
    }

    /// The hosted session
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Run until [`RunnerCommand::Shutdown`] arrives or every sender is dropped
    ///
    /// The session is disconnected on exit and handed back.
    pub async fn run(mut self, mut commands: mpsc::Receiver<RunnerCommand>) -> Session<T> {
        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::debug!("Session runner started, tick {:?}", self.tick);

        loop {
            tokio::select! {
                at = ticker.tick() => self.session.tick(at.into_std()),
                command = commands.recv() => match command {
                    Some(RunnerCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
            }
        }

        self.session.disconnect();
        tracing::debug!("Session runner stopped");
        self.session
    }

    /// Apply one command to the session
    pub fn handle(&mut self, command: RunnerCommand) {
        let now = Instant::now().into_std();
        match command {
            RunnerCommand::Connect(port) => {
                // Failure is already published as an event.
                let _ = self.session.connect(&port, now);
            }
            RunnerCommand::Disconnect => self.session.disconnect(),
            RunnerCommand::Intent(intent) => self.dispatch(intent, now),
            RunnerCommand::MoveStaged(axis) => {
                let steps = self.session.axis(axis).steps();
                self.dispatch(Intent::MoveSteps { axis, steps }, now);
            }
            RunnerCommand::StartSweep(axis) => {
                let config = self.session.axis(axis).sweep_config();
                self.dispatch(
                    Intent::SetSweep {
                        axis,
                        enabled: true,
                        steps_per_tick: config.steps_per_tick,
                        delay_ms: config.delay_ms,
                    },
                    now,
                );
            }
            RunnerCommand::SetSteps { axis, steps } => {
                self.session.set_steps(axis, steps);
            }
            RunnerCommand::SetSweepSteps {
                axis,
                steps_per_tick,
            } => self.session.set_sweep_steps(axis, steps_per_tick),
            RunnerCommand::SetSweepDelay { axis, delay_ms } => {
                self.session.set_sweep_delay(axis, delay_ms, now)
            }
            RunnerCommand::ListPorts => match self.session.list_ports() {
                Ok(ports) if ports.is_empty() => tracing::info!("No serial ports found"),
                Ok(ports) => {
                    for port in ports {
                        tracing::info!("{} ({})", port.port_name, port.description);
                    }
                }
                Err(err) => tracing::warn!("{}", err),
            },
            RunnerCommand::Status => {
                for line in self.session.status_lines() {
                    tracing::info!("{}", line);
                }
            }
            RunnerCommand::Shutdown => self.session.disconnect(),
        }
    }

    fn dispatch(&mut self, intent: Intent, now: std::time::Instant) {
        if let Err(err) = self.session.dispatch(intent, now) {
            tracing::debug!("Intent {:?} not sent: {}", intent, err);
        }
    }
}
