//! Event Bus implementation.
//!
//! Provides the EventBus struct a session uses to fan status events out to
//! synchronous handlers and async receivers.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{EventCategory, SessionEvent};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &SessionEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Box<dyn Fn(SessionEvent) + Send + Sync>;

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for broadcast.
    pub channel_capacity: usize,
    /// Whether to keep event history.
    pub enable_history: bool,
    /// Maximum number of events to retain in history.
    pub max_history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            enable_history: true,
            max_history_size: 256,
        }
    }
}

/// Event with the wall-clock time it was published
#[derive(Debug, Clone)]
pub struct TimestampedEvent {
    /// The event.
    pub event: SessionEvent,
    /// When it was published.
    pub timestamp: DateTime<Utc>,
}

/// Error types for event bus operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventBusError {
    /// No subscribers are listening
    #[error("No active subscribers")]
    NoSubscribers,
}

/// Fan-out point for session status events
pub struct EventBus {
    /// Broadcast channel sender
    sender: broadcast::Sender<SessionEvent>,
    /// Registered synchronous handlers
    handlers: Arc<RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>>,
    /// Event history (optional)
    history: Arc<RwLock<VecDeque<TimestampedEvent>>>,
    /// Configuration
    config: EventBusConfig,
}

impl EventBus {
    /// Create a new event bus with default configuration
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create a new event bus with custom configuration
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(VecDeque::new())),
            config,
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of async receivers that will receive the event,
    /// or an error if nobody at all is listening. History is recorded either way.
    pub fn publish(&self, event: SessionEvent) -> Result<usize, EventBusError> {
        if self.config.enable_history {
            self.add_to_history(&event);
        }

        let handlers = self.handlers.read();
        for (_, (filter, handler)) in handlers.iter() {
            if filter.matches(&event) {
                handler(event.clone());
            }
        }

        match self.sender.send(event) {
            Ok(count) => Ok(count),
            Err(_) => {
                if handlers.is_empty() {
                    Err(EventBusError::NoSubscribers)
                } else {
                    Ok(0)
                }
            }
        }
    }

    /// Subscribe to events with a synchronous handler
    ///
    /// The handler runs on the publishing context and must not subscribe or
    /// unsubscribe from inside the callback.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(SessionEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        let mut handlers = self.handlers.write();
        handlers.insert(id, (filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for manual event polling
    pub fn receiver(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let removed = handlers.remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of synchronous subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Recent events, oldest first
    pub fn history(&self) -> Vec<TimestampedEvent> {
        self.history.read().iter().cloned().collect()
    }

    /// The most recently published event, if history is enabled
    pub fn last_event(&self) -> Option<SessionEvent> {
        self.history.read().back().map(|e| e.event.clone())
    }

    /// Clear event history
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn add_to_history(&self, event: &SessionEvent) {
        let mut history = self.history.write();
        history.push_back(TimestampedEvent {
            event: event.clone(),
            timestamp: Utc::now(),
        });

        while history.len() > self.config.max_history_size {
            history.pop_front();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AxisId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sent(command: &str) -> SessionEvent {
        SessionEvent::CommandSent {
            command: command.to_string(),
        }
    }

    #[test]
    fn test_event_bus_creation() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();

        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_event_delivery() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let _id = bus.subscribe(EventFilter::All, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(sent("G")).expect("Should publish");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_subscribers_still_records_history() {
        let bus = EventBus::new();
        assert!(matches!(
            bus.publish(sent("G")),
            Err(EventBusError::NoSubscribers)
        ));
        assert_eq!(bus.last_event(), Some(sent("G")));
    }

    #[test]
    fn test_event_filtering() {
        let bus = EventBus::new();
        let command_count = Arc::new(AtomicUsize::new(0));
        let sweep_count = Arc::new(AtomicUsize::new(0));

        let cc = command_count.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Command]),
            move |_| {
                cc.fetch_add(1, Ordering::SeqCst);
            },
        );

        let sc = sweep_count.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Sweep]),
            move |_| {
                sc.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.publish(sent("X0")).ok();
        bus.publish(SessionEvent::SweepStopped {
            axis: AxisId::Polar,
        })
        .ok();
        bus.publish(SessionEvent::Disconnected).ok();

        assert_eq!(command_count.load(Ordering::SeqCst), 1);
        assert_eq!(sweep_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_history_max_size() {
        let config = EventBusConfig {
            max_history_size: 5,
            ..Default::default()
        };
        let bus = EventBus::with_config(config);

        for i in 0..10 {
            bus.publish(sent(&format!("S1 {}", i))).ok();
        }

        let history = bus.history();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].event, sent("S1 5"));

        bus.clear_history();
        assert!(bus.history().is_empty());
    }

    #[test]
    fn test_history_disabled() {
        let bus = EventBus::with_config(EventBusConfig {
            enable_history: false,
            ..Default::default()
        });
        bus.publish(sent("G")).ok();
        assert!(bus.history().is_empty());
        assert_eq!(bus.last_event(), None);
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        bus.publish(SessionEvent::Connected {
            port: "/dev/ttyUSB0".to_string(),
        })
        .ok();

        match receiver.try_recv() {
            Ok(SessionEvent::Connected { port }) => assert_eq!(port, "/dev/ttyUSB0"),
            other => panic!("Wrong event received: {:?}", other),
        }
    }
}
