//! Control session
//!
//! [`Session`] ties a [`Transport`](crate::communication::Transport) to the
//! three axis controllers. It is single-threaded: the host calls
//! [`Session::dispatch`] for user actions and [`Session::tick`] on a timer.

pub mod controller;
pub mod intent;
pub mod state;

pub use controller::{
    Session, SessionConfig, DEFAULT_CALIBRATION_FOLLOWUP, DEFAULT_POLL_INTERVAL,
};
pub use intent::Intent;
pub use state::{ConnectionState, SessionState};
