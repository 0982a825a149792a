//! # Event Bus Module
//!
//! Status events flowing from the session to whatever renders them.
//!
//! ## Overview
//!
//! - The session publishes typed [`SessionEvent`]s without knowing subscribers
//! - Subscribers filter by [`EventCategory`] and receive events synchronously
//! - Async consumers can poll a broadcast receiver instead
//!
//! Each session owns its bus; there is no process-wide instance.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use steplink_core::event_bus::{EventBus, EventCategory, EventFilter, SessionEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Calibration]),
//!     |event| println!("{}", event),
//! );
//!
//! bus.publish(SessionEvent::Disconnected).ok();
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
