//! steplink Settings Crate
//!
//! Engine configuration: serial parameters, poll cadence and event bus sizing.
//!
//! The engine keeps no files, so configuration travels as TOML text:
//! [`Config::from_toml_str`] and [`Config::to_toml_string`] are for embedding
//! hosts. The `steplink` console always runs with [`Config::default`].

pub mod config;
pub mod error;

pub use config::{Config, ConnectionSettings, EventSettings, PollingSettings, STANDARD_BAUD_RATES};
pub use error::{ConfigError, SettingsError};
