//! The container: registry, lifetimes and the resolution algorithm.
//!
//! This module contains the [`Container`] type together with the [`Scope`]
//! handle and the [`ResolverContext`] passed to factories and constructors.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{ReentrantMutex, RwLock};

use crate::binding::ServiceBinding;
use crate::config::ContainerOptions;
use crate::error::{DiError, DiResult};
use crate::injectable::Injectable;
use crate::internal::{Frame, ThreadDepth};
use crate::key::{RegistrationKey, ServiceId};
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::registration::{
    Activator, FactoryActivator, RegisterOptions, Registration, RegistrationInfo, Registry,
    TypeActivator,
};
use crate::service::{erase, AnyArc, Implements};
use crate::traits::{Resolver, ResolverCore};

pub mod context;
pub mod scope;

pub use context::ResolverContext;
pub use scope::Scope;
pub(crate) use scope::ScopeStore;

/// Dependency injection container.
///
/// The container owns the registry, drives the lifetime rules and performs
/// recursive dependency resolution with circular-dependency detection. It is
/// cheap to clone (clones share the same registry) and safe to use from many
/// threads at once without external locking.
///
/// Resolving directly through the container means no scope is active, so
/// `Scoped` registrations behave like `PerRequest`. Use
/// [`begin_scope`](Self::begin_scope) to share scoped instances.
///
/// # Examples
///
/// ```
/// use swift_ioc::{Constructor, Container, Injectable, RegisterOptions, Resolver, TypeInfo};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// impl Injectable for UserService {
///     fn type_info() -> TypeInfo<Self> {
///         TypeInfo::new().constructor(Constructor::new(|(db,): (Arc<Database>,)| UserService { db }))
///     }
/// }
///
/// let container = Container::new();
/// container
///     .register_instance(Arc::new(Database { url: "postgres://localhost".to_string() }), None)
///     .unwrap();
/// container
///     .register::<UserService, UserService>(RegisterOptions::per_request().resolve_constructor_dependencies())
///     .unwrap();
///
/// let users = container.get::<UserService>().unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    registry: RwLock<Registry>,
    options: ContainerOptions,
    observers: Observers,
    /// Held while constructing eager singletons. Reentrant so an eager
    /// construction may itself register further eager services.
    eager_init: ReentrantMutex<()>,
    next_seq: AtomicU64,
}

impl Container {
    /// Creates an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// Creates an empty container with `options`.
    pub fn with_options(options: ContainerOptions) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                registry: RwLock::new(Registry::new()),
                options,
                observers: Observers::default(),
                eager_init: ReentrantMutex::new(()),
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Attaches an observer that sees every build the container performs.
    pub fn add_observer(&self, observer: Arc<dyn DiObserver>) {
        self.inner.observers.add(observer);
    }

    // ----- Registration -----

    /// Registers implementation `I` as service `S`.
    ///
    /// Fails with [`DiError::DuplicateRegistration`] if `(S, key)` is already
    /// registered. With `initialize_on_register` on a `Singleton`, the
    /// instance is built before returning and a construction failure removes
    /// the registration again and is returned here.
    ///
    /// # Examples
    ///
    /// ```
    /// use swift_ioc::{implements, Container, Injectable, RegisterOptions, Resolver, TypeInfo};
    ///
    /// trait Clock: Send + Sync {
    ///     fn now(&self) -> u64;
    /// }
    ///
    /// #[derive(Default)]
    /// struct FixedClock;
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> u64 { 42 }
    /// }
    /// impl Injectable for FixedClock {
    ///     fn type_info() -> TypeInfo<Self> { TypeInfo::with_default() }
    /// }
    /// implements!(dyn Clock => [FixedClock]);
    ///
    /// let container = Container::new();
    /// container.register::<dyn Clock, FixedClock>(RegisterOptions::singleton()).unwrap();
    /// assert_eq!(container.get::<dyn Clock>().unwrap().now(), 42);
    /// ```
    pub fn register<S, I>(&self, options: RegisterOptions) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        let key = RegistrationKey::with_key::<S>(options.key.as_deref());
        let activator: Arc<dyn Activator> = Arc::new(TypeActivator::<S, I>::new(
            options.resolve_constructor_dependencies,
            options.inject_properties,
        ));
        let registration = Arc::new(Registration::activated(
            key,
            self.next_seq(),
            options.lifetime,
            activator,
        ));

        self.inner.registry.write().insert_unique(registration.clone())?;
        self.log_registered(&registration);

        if options.initialize_on_register && options.lifetime == Lifetime::Singleton {
            self.initialize_eagerly(std::slice::from_ref(&registration))?;
        }
        Ok(())
    }

    /// Registers a pre-built instance as the `Singleton` for `(S, key)`.
    /// No construction logic ever runs for this entry.
    pub fn register_instance<S>(&self, instance: Arc<S>, key: Option<&str>) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let registration = Arc::new(Registration::instance(
            RegistrationKey::with_key::<S>(key),
            self.next_seq(),
            std::any::type_name::<S>(),
            erase(instance),
        ));
        self.inner.registry.write().insert_unique(registration.clone())?;
        self.log_registered(&registration);
        Ok(())
    }

    /// Registers a factory for `(S, key)`. `lifetime` governs caching of its
    /// results exactly as for type registrations.
    ///
    /// # Examples
    ///
    /// ```
    /// use swift_ioc::{Container, Lifetime, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct Config { port: u16 }
    /// struct Server { port: u16 }
    ///
    /// let container = Container::new();
    /// container.register_instance(Arc::new(Config { port: 8080 }), None).unwrap();
    /// container
    ///     .register_factory::<Server, _>(
    ///         |ctx| Ok(Arc::new(Server { port: ctx.get::<Config>()?.port })),
    ///         None,
    ///         Lifetime::Singleton,
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(container.get::<Server>().unwrap().port, 8080);
    /// ```
    pub fn register_factory<S, F>(
        &self,
        factory: F,
        key: Option<&str>,
        lifetime: Lifetime,
    ) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<Arc<S>> + Send + Sync + 'static,
    {
        self.register_activator(
            RegistrationKey::with_key::<S>(key),
            lifetime,
            Arc::new(FactoryActivator::<S>::new(move |ctx: &ResolverContext<'_>| {
                factory(ctx).map(Some)
            })),
        )
    }

    /// Like [`register_factory`](Self::register_factory) for factories that
    /// may legitimately produce nothing. An absent result is never cached.
    pub fn register_optional_factory<S, F>(
        &self,
        factory: F,
        key: Option<&str>,
        lifetime: Lifetime,
    ) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<Option<Arc<S>>> + Send + Sync + 'static,
    {
        self.register_activator(
            RegistrationKey::with_key::<S>(key),
            lifetime,
            Arc::new(FactoryActivator::<S>::new(factory)),
        )
    }

    /// Registers every binding under the shared `options`.
    ///
    /// All keys are checked first, including duplicates inside the batch;
    /// on any conflict nothing is registered. Eager initialization applies
    /// to the whole batch and a failure rolls the whole batch back.
    pub fn register_batch<B>(&self, bindings: B, options: RegisterOptions) -> DiResult<()>
    where
        B: IntoIterator<Item = ServiceBinding>,
    {
        let registrations: Vec<Arc<Registration>> = bindings
            .into_iter()
            .map(|binding| {
                let key = RegistrationKey::new(binding.service(), options.key.as_deref());
                Arc::new(Registration::activated(
                    key,
                    self.next_seq(),
                    options.lifetime,
                    binding.activator(&options),
                ))
            })
            .collect();

        {
            let mut registry = self.inner.registry.write();
            let mut seen = HashSet::with_capacity(registrations.len());
            for registration in &registrations {
                if registry.contains_key(registration.key()) || !seen.insert(registration.key()) {
                    return Err(DiError::DuplicateRegistration(registration.key().clone()));
                }
            }
            for registration in &registrations {
                registry.insert_unique(registration.clone())?;
            }
        }
        tracing::debug!(
            count = registrations.len(),
            lifetime = %options.lifetime,
            "batch registered"
        );

        if options.initialize_on_register && options.lifetime == Lifetime::Singleton {
            self.initialize_eagerly(&registrations)?;
        }
        Ok(())
    }

    /// Removes the registration of `(S, key)`. Returns whether one existed;
    /// removing an absent key is not an error.
    pub fn unregister<S>(&self, key: Option<&str>) -> bool
    where
        S: ?Sized + 'static,
    {
        let key = RegistrationKey::with_key::<S>(key);
        let removed = self.inner.registry.write().remove(&key).is_some();
        if removed {
            tracing::debug!(service = %key, "service unregistered");
        }
        removed
    }

    /// Rebuilds and replaces the cached singleton of `(S, key)`.
    ///
    /// Fails with [`DiError::NotRegistered`] if absent, with
    /// [`DiError::InvalidLifetime`] if the registration is not a `Singleton`,
    /// and with [`DiError::ConstructionFailure`] for direct-instance
    /// registrations, which have nothing to rebuild from.
    pub fn reinitialize<S>(&self, key: Option<&str>) -> DiResult<()>
    where
        S: ?Sized + 'static,
    {
        let key = RegistrationKey::with_key::<S>(key);
        let registration = self.lookup(&key)?;

        if registration.lifetime() != Lifetime::Singleton {
            return Err(DiError::InvalidLifetime {
                key,
                lifetime: registration.lifetime(),
            });
        }
        let activator = registration.activator().ok_or_else(|| {
            DiError::construction(key.service_name(), "direct instances cannot be rebuilt")
        })?;

        let rebuilt = self.build(&registration, activator, None, None)?;
        registration.replace(rebuilt);
        tracing::debug!(service = %key, "singleton reinitialized");
        Ok(())
    }

    /// Whether `(S, key)` is registered. No side effects.
    pub fn is_registered<S>(&self, key: Option<&str>) -> bool
    where
        S: ?Sized + 'static,
    {
        self.inner
            .registry
            .read()
            .contains_key(&RegistrationKey::with_key::<S>(key))
    }

    /// Removes every registration, cached singletons included.
    pub fn clear(&self) {
        let mut registry = self.inner.registry.write();
        let count = registry.len();
        registry.clear();
        tracing::debug!(count, "registry cleared");
    }

    /// Snapshots of all registrations in registration order.
    pub fn registrations(&self) -> Vec<RegistrationInfo> {
        self.inner
            .registry
            .read()
            .all()
            .iter()
            .map(|registration| registration.info())
            .collect()
    }

    /// Begins a scope. `Scoped` registrations resolved through the returned
    /// handle share one instance per key until the scope ends.
    ///
    /// Each call creates a fresh, empty scope; scopes do not nest.
    ///
    /// # Examples
    ///
    /// ```
    /// use swift_ioc::{Container, Lifetime, Resolver};
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// struct RequestId(usize);
    ///
    /// let counter = Arc::new(AtomicUsize::new(0));
    /// let container = Container::new();
    /// let c = counter.clone();
    /// container
    ///     .register_factory::<RequestId, _>(
    ///         move |_| Ok(Arc::new(RequestId(c.fetch_add(1, Ordering::SeqCst)))),
    ///         None,
    ///         Lifetime::Scoped,
    ///     )
    ///     .unwrap();
    ///
    /// let scope1 = container.begin_scope();
    /// let scope2 = container.begin_scope();
    ///
    /// let a = scope1.get::<RequestId>().unwrap();
    /// let b = scope1.get::<RequestId>().unwrap();
    /// let c = scope2.get::<RequestId>().unwrap();
    ///
    /// assert!(Arc::ptr_eq(&a, &b));
    /// assert!(!Arc::ptr_eq(&a, &c));
    /// ```
    pub fn begin_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    // ----- Internals -----

    #[inline]
    fn next_seq(&self) -> u64 {
        self.inner.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    fn register_activator(
        &self,
        key: RegistrationKey,
        lifetime: Lifetime,
        activator: Arc<dyn Activator>,
    ) -> DiResult<()> {
        let registration = Arc::new(Registration::activated(
            key,
            self.next_seq(),
            lifetime,
            activator,
        ));
        self.inner.registry.write().insert_unique(registration.clone())?;
        self.log_registered(&registration);
        Ok(())
    }

    fn log_registered(&self, registration: &Registration) {
        tracing::debug!(
            service = %registration.key(),
            lifetime = %registration.lifetime(),
            "service registered"
        );
    }

    /// Builds and caches eager singletons, removing all of `registrations`
    /// again if any build fails.
    fn initialize_eagerly(&self, registrations: &[Arc<Registration>]) -> DiResult<()> {
        let _serialized = self
            .inner
            .options
            .serialize_eager_initialization
            .then(|| self.inner.eager_init.lock());

        for registration in registrations {
            if let Err(error) = self.resolve_registration(registration, None, None) {
                let mut registry = self.inner.registry.write();
                for entry in registrations {
                    registry.remove_exact(entry);
                }
                tracing::warn!(
                    service = %registration.key(),
                    %error,
                    "eager initialization failed, registration rolled back"
                );
                return Err(error);
            }
        }
        Ok(())
    }

    #[inline]
    fn lookup(&self, key: &RegistrationKey) -> DiResult<Arc<Registration>> {
        self.inner
            .registry
            .read()
            .get(key)
            .ok_or_else(|| DiError::NotRegistered(key.clone()))
    }

    /// Resolves `key` with the call-path state of the caller.
    pub(crate) fn resolve_key(
        &self,
        key: &RegistrationKey,
        scope: Option<&ScopeStore>,
        parent: Option<&Frame<'_>>,
    ) -> DiResult<Option<AnyArc>> {
        let registration = self.lookup(key)?;
        self.resolve_registration(&registration, scope, parent)
    }

    /// Resolves every registration of `service` in registration order.
    pub(crate) fn resolve_all(
        &self,
        service: ServiceId,
        scope: Option<&ScopeStore>,
        parent: Option<&Frame<'_>>,
    ) -> DiResult<Vec<AnyArc>> {
        let registrations = self.inner.registry.read().for_service(service);
        let mut instances = Vec::with_capacity(registrations.len());
        for registration in &registrations {
            if let Some(instance) = self.resolve_registration(registration, scope, parent)? {
                instances.push(instance);
            }
        }
        Ok(instances)
    }

    fn resolve_registration(
        &self,
        registration: &Arc<Registration>,
        scope: Option<&ScopeStore>,
        parent: Option<&Frame<'_>>,
    ) -> DiResult<Option<AnyArc>> {
        if let Some(instance) = registration.cached() {
            tracing::trace!(service = %registration.key(), "singleton cache hit");
            return Ok(Some(instance));
        }

        let activator = registration.activator().ok_or_else(|| {
            DiError::construction(
                registration.key().service_name(),
                "registration holds no instance",
            )
        })?;

        match (registration.lifetime(), scope) {
            (Lifetime::Singleton, _) => {
                let built = self.build(registration, activator, scope, parent)?;
                Ok(built.map(|instance| registration.cache_first(instance)))
            }
            (Lifetime::Scoped, Some(store)) => {
                if let Some(instance) = store.get(registration.key()) {
                    tracing::trace!(service = %registration.key(), "scope cache hit");
                    return Ok(Some(instance));
                }
                let built = self.build(registration, activator, scope, parent)?;
                Ok(built.map(|instance| store.insert_first(registration.key(), instance)))
            }
            // No active scope: Scoped behaves like PerRequest.
            (Lifetime::Scoped, None) | (Lifetime::PerRequest, _) => {
                self.build(registration, activator, scope, parent)
            }
        }
    }

    /// Builds a fresh instance under circular-dependency tracking.
    fn build(
        &self,
        registration: &Registration,
        activator: &Arc<dyn Activator>,
        scope: Option<&ScopeStore>,
        parent: Option<&Frame<'_>>,
    ) -> DiResult<Option<AnyArc>> {
        let key = registration.key();
        let max_depth = self.inner.options.max_resolution_depth;
        let frame = Frame::enter(parent, key, max_depth)?;
        let _active = ThreadDepth::enter(max_depth)?;
        let ctx = ResolverContext::new(self, scope, &frame);

        let observers = &self.inner.observers;
        if !observers.has_observers() {
            return activator.activate(&ctx);
        }

        let start = Instant::now();
        observers.resolving(key);
        let result = activator.activate(&ctx);
        match &result {
            Ok(_) => observers.resolved(key, start.elapsed()),
            Err(error) => observers.resolution_failed(key, error),
        }
        result
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registrations", &self.inner.registry.read().len())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl ResolverCore for Container {
    fn resolve_any(&self, key: &RegistrationKey) -> DiResult<Option<AnyArc>> {
        self.resolve_key(key, None, None)
    }

    fn resolve_all_any(&self, service: ServiceId) -> DiResult<Vec<AnyArc>> {
        self.resolve_all(service, None, None)
    }
}

impl Resolver for Container {}
