//! # steplink
//!
//! Host-side control for a three-axis stepper controller board (azimuth,
//! polar, elevation) over a USB serial link.
//!
//! ## Architecture
//!
//! steplink is organized as a workspace with multiple crates:
//!
//! 1. **steplink-core** - Axis types, errors, status events and the event bus
//! 2. **steplink-communication** - Transports, wire protocol, axis and session controllers
//! 3. **steplink-settings** - TOML configuration
//! 4. **steplink** - Async session runner and the console binary

pub mod console;
pub mod runtime;

pub use steplink_communication::{
    list_ports, AxisController, Command, ConnectionParams, DeviceReply, Intent, MemoryDevice,
    MemoryTransport, SerialPortInfo, SerialTransport, Session, SessionConfig, SessionState,
    Transport,
};
pub use steplink_core::{
    AngleDisplay, AxisId, Direction, Error, EventBus, EventCategory, EventFilter, MessageLevel,
    Result, SessionEvent,
};
pub use steplink_settings::Config;

pub use console::{parse_line, ConsoleCommand, HELP_TEXT};
pub use runtime::{RunnerCommand, SessionRunner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
