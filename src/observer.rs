//! Diagnostic observers for resolution events.
//!
//! Observers see every build the container performs (cache hits are not
//! reported). Calls are synchronous, so keep implementations cheap.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::DiError;
use crate::key::RegistrationKey;

/// Observer trait for resolution events.
///
/// # Examples
///
/// ```
/// use swift_ioc::{Container, DiError, DiObserver, Lifetime, RegistrationKey, Resolver};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder(Mutex<Vec<String>>);
///
/// impl DiObserver for Recorder {
///     fn resolved(&self, key: &RegistrationKey, _duration: Duration) {
///         self.0.lock().unwrap().push(key.to_string());
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let container = Container::new();
/// container.add_observer(recorder.clone());
/// container.register_factory::<u32, _>(|_| Ok(Arc::new(7)), None, Lifetime::PerRequest).unwrap();
///
/// container.get::<u32>().unwrap();
/// assert_eq!(recorder.0.lock().unwrap().as_slice(), ["u32"]);
/// ```
pub trait DiObserver: Send + Sync {
    /// A build for `key` is starting.
    fn resolving(&self, _key: &RegistrationKey) {}

    /// A build for `key` finished successfully.
    fn resolved(&self, _key: &RegistrationKey, _duration: Duration) {}

    /// A build for `key` failed.
    fn resolution_failed(&self, _key: &RegistrationKey, _error: &DiError) {}
}

/// Observer that forwards resolution events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl LoggingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &RegistrationKey) {
        tracing::debug!(service = %key, "resolving");
    }

    fn resolved(&self, key: &RegistrationKey, duration: Duration) {
        tracing::debug!(service = %key, elapsed_us = duration.as_micros() as u64, "resolved");
    }

    fn resolution_failed(&self, key: &RegistrationKey, error: &DiError) {
        tracing::warn!(service = %key, %error, "resolution failed");
    }
}

/// Registered observers of one container.
#[derive(Default)]
pub(crate) struct Observers {
    list: RwLock<Vec<Arc<dyn DiObserver>>>,
}

impl Observers {
    pub(crate) fn add(&self, observer: Arc<dyn DiObserver>) {
        self.list.write().push(observer);
    }

    #[inline(always)]
    pub(crate) fn has_observers(&self) -> bool {
        !self.list.read().is_empty()
    }

    pub(crate) fn resolving(&self, key: &RegistrationKey) {
        for observer in self.list.read().iter() {
            observer.resolving(key);
        }
    }

    pub(crate) fn resolved(&self, key: &RegistrationKey, duration: Duration) {
        for observer in self.list.read().iter() {
            observer.resolved(key, duration);
        }
    }

    pub(crate) fn resolution_failed(&self, key: &RegistrationKey, error: &DiError) {
        for observer in self.list.read().iter() {
            observer.resolution_failed(key, error);
        }
    }
}
