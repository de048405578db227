//! Testing utilities for Kalla.
//!
//! # Features
//!
//! - [`RecordingHandler`]: a handler type whose methods record every event
//!   they receive
//! - [`CountingHandler`]: a handler type that counts invocations
//! - [`failing_factory`] / [`absent_factory`]: factories scripted to fail
//!   instance resolution

use crate::instance::InstanceFactory;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A handler type whose [`receive`](RecordingHandler::receive) method records
/// every event it is invoked with.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = Arc::new(RecordingHandler::<MyEvent>::new());
/// let method = MethodRef::sync("receive", RecordingHandler::<MyEvent>::receive);
/// let descriptor = HandlerDescriptor::build(method, InstanceFactory::shared(recorder.clone()))?;
///
/// // ... dispatch ...
///
/// assert_eq!(recorder.count(), 1);
/// ```
pub struct RecordingHandler<E: Clone> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E: Clone> RecordingHandler<E> {
    /// Create a new recording handler.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The handler method: records the received event.
    pub fn receive(&self, event: &E) {
        self.events.lock().unwrap().push(event.clone());
    }

    /// Get a clone of the recorded events.
    pub fn events(&self) -> Vec<E> {
        self.events.lock().unwrap().clone()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl<E: Clone> Default for RecordingHandler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Clone for RecordingHandler<E> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

/// A handler type that counts invocations of its
/// [`bump`](CountingHandler::bump) method.
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The handler method: increments the counter for any event.
    pub fn bump<E>(&self, _event: &E) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Default for CountingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CountingHandler {
    fn clone(&self) -> Self {
        Self {
            count: self.count.clone(),
        }
    }
}

/// A factory that fails every resolution with the given message.
pub fn failing_factory(message: &'static str) -> InstanceFactory {
    InstanceFactory::from_fn(move || Err(io::Error::other(message).into()))
}

/// A factory that resolves to no instance at all.
pub fn absent_factory() -> InstanceFactory {
    InstanceFactory::from_fn(|| Ok(None))
}
