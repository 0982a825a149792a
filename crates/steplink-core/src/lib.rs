//! # steplink Core
//!
//! Core types, errors, and the status event bus shared by the steplink crates.
//! Provides the axis model (identifiers, direction labels, calibration math)
//! and the error taxonomy used by the protocol engine.

pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{ConnectionError, Error, ProtocolError, Result, ValidationError};

pub use event_bus::{
    EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter, MessageLevel,
    SessionEvent, SubscriptionId, TimestampedEvent,
};

pub use types::{
    angular_resolution, AngleDisplay, AxisId, AxisProfile, Direction, AXIS_PROFILES,
    DEFAULT_CALIBRATION_INPUT, DEFAULT_RPM, DEFAULT_SWEEP_DELAY_MS, DEFAULT_SWEEP_STEPS,
};
