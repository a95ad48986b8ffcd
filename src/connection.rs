//! Connection handle.
//!
//! A [`Connection`] is handed to the caller before the connection exists: it
//! owns the observer list and a slot the driver fills in once the client is
//! built. Clones share state, so the handle returned from a connect call and
//! the one captured by the driver's background task see the same events and
//! the same client.
//!
//! The handle does not own teardown; dropping it does not close anything.

use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use mongodb::Client;

use crate::events::{EventSink, LifecycleEvent, LifecycleObserver, LogObserver};

#[derive(Default)]
struct Inner {
    events: EventSink,
    client: OnceLock<Client>,
    opened: AtomicBool,
    logging: AtomicBool,
}

/// A connection handle with event-emission capability.
#[derive(Clone, Default)]
pub struct Connection {
    inner: Arc<Inner>,
}

impl Connection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a lifecycle observer.
    pub fn subscribe(&self, observer: Arc<dyn LifecycleObserver>) {
        self.inner.events.subscribe(observer);
    }

    /// Deliver an event to every observer on this handle.
    pub fn emit(&self, event: LifecycleEvent) {
        self.inner.events.emit(event);
    }

    /// The handle's event sink. Useful for driver implementations that need
    /// to emit from contexts which cannot hold the handle itself.
    #[must_use]
    pub fn events(&self) -> EventSink {
        self.inner.events.clone()
    }

    /// The driver client, once the asynchronous open has built one.
    #[must_use]
    pub fn client(&self) -> Option<&Client> {
        self.inner.client.get()
    }

    /// Store the driver client. Later calls are ignored; the first client
    /// wins.
    pub fn attach_client(&self, client: Client) {
        let _ = self.inner.client.set(client);
    }

    /// Whether an open has been triggered on this handle.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.opened.load(Ordering::SeqCst)
    }

    /// Mark the handle opened. Returns the previous state.
    pub(crate) fn mark_open(&self) -> bool {
        self.inner.opened.swap(true, Ordering::SeqCst)
    }

    /// Attach the logging observer. Idempotent per handle.
    pub(crate) fn attach_logging(&self) {
        if !self.inner.logging.swap(true, Ordering::SeqCst) {
            self.subscribe(Arc::new(LogObserver));
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("open", &self.is_open())
            .field("client", &self.client().is_some())
            .field("observers", &self.inner.events.observer_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        count: Mutex<usize>,
    }

    impl LifecycleObserver for Recorder {
        fn on_event(&self, _event: &LifecycleEvent) {
            *self.count.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_mark_open_reports_previous_state() {
        let conn = Connection::new();
        assert!(!conn.is_open());
        assert!(!conn.mark_open());
        assert!(conn.mark_open());
        assert!(conn.is_open());
    }

    #[test]
    fn test_attach_logging_is_idempotent() {
        let conn = Connection::new();
        conn.attach_logging();
        conn.attach_logging();
        assert_eq!(conn.events().observer_count(), 1);
    }

    #[test]
    fn test_clones_share_events_and_state() {
        let conn = Connection::new();
        let clone = conn.clone();

        let recorder = Arc::new(Recorder::default());
        conn.subscribe(recorder.clone());
        clone.emit(LifecycleEvent::Open {
            uri: "mongodb://h/db".to_string(),
        });
        assert_eq!(*recorder.count.lock().unwrap(), 1);

        clone.mark_open();
        assert!(conn.is_open());
    }

    #[test]
    fn test_client_slot_starts_empty() {
        let conn = Connection::new();
        assert!(conn.client().is_none());
    }
}
