//! # steplink-communication
//!
//! Serial protocol engine for a three-axis stepper controller board
//! (azimuth, polar, elevation).
//!
//! - [`communication`]: byte transports (serial port and in-memory)
//! - [`protocol`]: command encoder and reply parser
//! - [`axis`]: per-axis state and sweep scheduling
//! - [`session`]: the control session tying it all together

pub mod axis;
pub mod communication;
pub mod protocol;
pub mod scheduler;
pub mod session;

pub use axis::{AxisController, SweepConfig, SweepScheduler};
pub use communication::{
    list_ports, ConnectionParams, LineBuffer, MemoryDevice, MemoryTransport, SerialPortInfo,
    SerialTransport, Transport, TransportCall, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT,
};
pub use protocol::{parse_positive, positive, Command, DeviceReply, ReplyParser};
pub use scheduler::{OneShotTask, PeriodicTask};
pub use session::{ConnectionState, Intent, Session, SessionConfig, SessionState};
