//! Scoped service resolution.
//!
//! This module contains the Scope handle and the per-scope instance store.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::DiResult;
use crate::key::{RegistrationKey, ServiceId};
use crate::service::AnyArc;
use crate::traits::{Resolver, ResolverCore};

use super::Container;

/// Instances of `Scoped` registrations built inside one scope.
#[derive(Default)]
pub(crate) struct ScopeStore {
    instances: Mutex<HashMap<RegistrationKey, AnyArc, ahash::RandomState>>,
}

impl ScopeStore {
    #[inline]
    pub(crate) fn get(&self, key: &RegistrationKey) -> Option<AnyArc> {
        self.instances.lock().get(key).cloned()
    }

    /// Stores `instance` unless another build for `key` was stored first;
    /// returns the stored instance.
    pub(crate) fn insert_first(&self, key: &RegistrationKey, instance: AnyArc) -> AnyArc {
        self.instances
            .lock()
            .entry(key.clone())
            .or_insert(instance)
            .clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.instances.lock().len()
    }

    fn clear(&self) -> usize {
        let mut instances = self.instances.lock();
        let count = instances.len();
        instances.clear();
        count
    }
}

/// Scope handle for sharing `Scoped` instances.
///
/// Every `Scoped` registration resolved through the same `Scope` (directly,
/// or by factories and constructors running under it) yields one shared
/// instance per key. `Singleton` and `PerRequest` registrations behave as
/// they do on the container. Ending the scope (explicitly or by dropping the
/// handle) discards its instances.
///
/// # Examples
///
/// ```
/// use swift_ioc::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Session;
///
/// let container = Container::new();
/// container
///     .register_factory::<Session, _>(|_| Ok(Arc::new(Session)), None, Lifetime::Scoped)
///     .unwrap();
///
/// let scope = container.begin_scope();
/// let a = scope.get::<Session>().unwrap();
/// let b = scope.get::<Session>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// scope.end();
///
/// // Outside any scope, Scoped behaves like PerRequest.
/// let c = container.get::<Session>().unwrap();
/// let d = container.get::<Session>().unwrap();
/// assert!(!Arc::ptr_eq(&c, &d));
/// ```
pub struct Scope {
    container: Container,
    store: ScopeStore,
}

impl Scope {
    pub(crate) fn new(container: Container) -> Self {
        tracing::debug!("scope started");
        Self {
            container,
            store: ScopeStore::default(),
        }
    }

    /// The container this scope resolves from.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Number of scoped instances built so far.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ends the scope, discarding its instances.
    pub fn end(self) {}
}

impl Drop for Scope {
    fn drop(&mut self) {
        let discarded = self.store.clear();
        tracing::debug!(discarded, "scope ended");
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &RegistrationKey) -> DiResult<Option<AnyArc>> {
        self.container.resolve_key(key, Some(&self.store), None)
    }

    fn resolve_all_any(&self, service: ServiceId) -> DiResult<Vec<AnyArc>> {
        self.container.resolve_all(service, Some(&self.store), None)
    }
}

impl Resolver for Scope {}
