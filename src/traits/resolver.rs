//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::{RegistrationKey, ServiceId};
use crate::service::{downcast, AnyArc};

/// Core resolver trait for object-safe service resolution.
///
/// Implementors carry the call-path state (active scope and in-progress
/// resolution chain) so nested resolves see the same state as their caller.
/// Most users should use the [`Resolver`] trait instead.
pub trait ResolverCore: Send + Sync {
    /// Resolves one registration.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(_))` - The instance, erased as `Arc<dyn Any>` around an `Arc<S>`
    /// * `Ok(None)` - The registration's build legitimately produced nothing
    /// * `Err(DiError)` - Not registered, circular, construction failure, ...
    fn resolve_any(&self, key: &RegistrationKey) -> DiResult<Option<AnyArc>>;

    /// Resolves every registration of `service` in registration order,
    /// skipping builds that produced nothing.
    fn resolve_all_any(&self, service: ServiceId) -> DiResult<Vec<AnyArc>>;
}

/// High-level resolver interface with generic methods for type-safe service
/// resolution.
///
/// `Container`, `Scope` and the `ResolverContext` handed to factories all
/// implement this trait. `S` may be a concrete type or a trait object.
///
/// # Examples
///
/// ```
/// use swift_ioc::{implements, Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// let container = Container::new();
/// container.register_instance::<dyn Greeter>(Arc::new(English), None).unwrap();
/// container.register_instance::<dyn Greeter>(Arc::new(English), Some("en")).unwrap();
///
/// assert_eq!(container.get::<dyn Greeter>().unwrap().greet(), "hello");
/// assert_eq!(container.get_named::<dyn Greeter>("en").unwrap().greet(), "hello");
/// assert_eq!(container.get_all::<dyn Greeter>().unwrap().len(), 2);
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the unnamed registration of `S`; `Ok(None)` if its build
    /// produced nothing.
    fn try_get<S>(&self) -> DiResult<Option<Arc<S>>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.try_get_named::<S>(None)
    }

    /// Resolves the registration of `S` under `key`.
    fn try_get_named<S>(&self, key: Option<&str>) -> DiResult<Option<Arc<S>>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.resolve_any(&RegistrationKey::with_key::<S>(key))?
            .map(downcast::<S>)
            .transpose()
    }

    /// Resolves the unnamed registration of `S`, treating an absent build as
    /// [`DiError::NoInstance`].
    fn get<S>(&self) -> DiResult<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let key = RegistrationKey::of::<S>();
        match self.resolve_any(&key)? {
            Some(any) => downcast::<S>(any),
            None => Err(DiError::NoInstance(key)),
        }
    }

    /// Resolves the registration of `S` under `key`.
    fn get_named<S>(&self, key: &str) -> DiResult<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let key = RegistrationKey::named::<S>(key);
        match self.resolve_any(&key)? {
            Some(any) => downcast::<S>(any),
            None => Err(DiError::NoInstance(key)),
        }
    }

    /// Resolves the unnamed registration of `S`.
    ///
    /// # Panics
    ///
    /// Panics if resolution fails.
    fn get_required<S>(&self) -> Arc<S>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        match self.get::<S>() {
            Ok(service) => service,
            Err(e) => panic!(
                "Failed to resolve required service {}: {}",
                std::any::type_name::<S>(),
                e
            ),
        }
    }

    /// Resolves every registration of `S`, unnamed and named, in
    /// registration order. Empty when nothing is registered.
    fn get_all<S>(&self) -> DiResult<Vec<Arc<S>>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.resolve_all_any(ServiceId::of::<S>())?
            .into_iter()
            .map(downcast::<S>)
            .collect()
    }
}
