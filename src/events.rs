//! Connection lifecycle events and observers.
//!
//! Every state change the driver reports is turned into a [`LifecycleEvent`]
//! and fanned out to the handle's observers. The built-in [`LogObserver`]
//! writes one `tracing` line per event; errors additionally get their full
//! detail at debug level. No event is swallowed.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

/// A connection lifecycle state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The driver started a connection attempt.
    Connecting {
        /// Target database name.
        database: String,
    },
    /// The driver established a connection.
    Connected {
        /// Canonical URI of the connection.
        uri: String,
    },
    /// The connection is open and ready for use.
    Open {
        /// Canonical URI of the connection.
        uri: String,
    },
    /// The driver is re-establishing a dropped connection.
    Reconnecting {
        /// Canonical URI of the connection.
        uri: String,
    },
    /// The connection was lost.
    Disconnected {
        /// Canonical URI of the connection.
        uri: String,
        /// Driver-reported cause, when one was given.
        error: Option<String>,
    },
    /// The driver reported an error.
    Error {
        /// Canonical URI of the connection.
        uri: String,
        /// Full error detail.
        message: String,
    },
}

impl LifecycleEvent {
    /// Stable event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connecting { .. } => "connecting",
            Self::Connected { .. } => "connected",
            Self::Open { .. } => "open",
            Self::Reconnecting { .. } => "reconnecting",
            Self::Disconnected { .. } => "disconnected",
            Self::Error { .. } => "error",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting { database } => {
                write!(f, "connecting to MongoDB database {database}")
            }
            Self::Connected { uri } => write!(f, "connected to MongoDB on URI: {uri}"),
            Self::Open { uri } => write!(f, "connection to MongoDB is now open on URI: {uri}"),
            Self::Reconnecting { uri } => write!(f, "reconnecting to MongoDB on URI: {uri}"),
            Self::Disconnected { uri, error } => match error {
                Some(error) => {
                    write!(f, "disconnected from MongoDB on URI: {uri} - error: {error}")
                }
                None => write!(f, "disconnected from MongoDB on URI: {uri}"),
            },
            Self::Error { uri, message } => write!(f, "mongo {uri} error: {message}"),
        }
    }
}

/// Observer of connection lifecycle events.
pub trait LifecycleObserver: Send + Sync {
    /// Called once for every emitted event.
    fn on_event(&self, event: &LifecycleEvent);
}

/// Fan-out point for lifecycle events.
///
/// Cloning is cheap; clones share the observer list.
#[derive(Clone, Default)]
pub struct EventSink {
    observers: Arc<RwLock<Vec<Arc<dyn LifecycleObserver>>>>,
}

impl EventSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn subscribe(&self, observer: Arc<dyn LifecycleObserver>) {
        self.observers.write().push(observer);
    }

    /// Deliver an event to every registered observer.
    pub fn emit(&self, event: LifecycleEvent) {
        // Snapshot under the lock so an observer can subscribe re-entrantly.
        let observers = self.observers.read().clone();
        for observer in &observers {
            observer.on_event(&event);
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Observer that writes one log line per lifecycle event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl LifecycleObserver for LogObserver {
    fn on_event(&self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::Error { message, .. } => {
                error!("{event}");
                debug!(detail = %message, "mongo error detail");
            }
            LifecycleEvent::Disconnected { .. } => warn!("{event}"),
            LifecycleEvent::Reconnecting { .. } => warn!("{event}"),
            LifecycleEvent::Connecting { .. }
            | LifecycleEvent::Connected { .. }
            | LifecycleEvent::Open { .. } => info!("{event}"),
        }
    }
}
