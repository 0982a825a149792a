//! Controller board wire protocol
//!
//! Outbound: one ASCII line per command, `<Verb><axis?> <args...>\n`.
//! Inbound: a digit-only line reports steps per revolution; everything else
//! is human-readable status text.

pub mod command;
pub mod response_parser;

pub use command::{parse_positive, positive, Command};
pub use response_parser::{DeviceReply, ReplyParser};
