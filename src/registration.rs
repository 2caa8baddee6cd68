//! Service registration types.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::container::ResolverContext;
use crate::error::{DiError, DiResult};
use crate::injectable::{Constructor, Injectable, TypeInfo};
use crate::key::{RegistrationKey, ServiceId};
use crate::lifetime::Lifetime;
use crate::service::{erase, AnyArc, Implements};
use crate::traits::ResolverCore;

/// Options for [`Container::register`](crate::Container::register).
///
/// Defaults: unnamed, `Singleton`, lazy, parameterless construction, no
/// property injection.
///
/// # Examples
///
/// ```rust
/// use swift_ioc::{Lifetime, RegisterOptions};
///
/// let options = RegisterOptions::per_request()
///     .named("primary")
///     .resolve_constructor_dependencies()
///     .inject_properties();
///
/// assert_eq!(options.lifetime, Lifetime::PerRequest);
/// assert_eq!(options.key.as_deref(), Some("primary"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    pub key: Option<String>,
    pub lifetime: Lifetime,
    pub initialize_on_register: bool,
    pub resolve_constructor_dependencies: bool,
    pub inject_properties: bool,
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton() -> Self {
        Self::new().lifetime(Lifetime::Singleton)
    }

    pub fn per_request() -> Self {
        Self::new().lifetime(Lifetime::PerRequest)
    }

    pub fn scoped() -> Self {
        Self::new().lifetime(Lifetime::Scoped)
    }

    pub fn named(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Build the instance while registering. Only honored for `Singleton`.
    pub fn initialize_on_register(mut self) -> Self {
        self.initialize_on_register = true;
        self
    }

    /// Build through the widest constructor whose dependencies resolve,
    /// instead of the parameterless one.
    pub fn resolve_constructor_dependencies(mut self) -> Self {
        self.resolve_constructor_dependencies = true;
        self
    }

    /// Populate the type's injectable properties after construction.
    pub fn inject_properties(mut self) -> Self {
        self.inject_properties = true;
        self
    }
}

/// Instantiation procedure of a registration.
pub(crate) trait Activator: Send + Sync {
    /// Builds a fresh instance. `Ok(None)` means the build legitimately
    /// produced nothing.
    fn activate(&self, ctx: &ResolverContext<'_>) -> DiResult<Option<AnyArc>>;

    fn implementation_name(&self) -> &'static str;
}

/// Registration entry with lifetime, construction strategy and singleton cache
pub(crate) struct Registration {
    key: RegistrationKey,
    /// Insertion sequence, orders `get_all` results
    seq: u64,
    lifetime: Lifetime,
    implementation: &'static str,
    /// `None` for direct-instance registrations
    activator: Option<Arc<dyn Activator>>,
    instance: RwLock<Option<AnyArc>>,
}

impl Registration {
    pub(crate) fn activated(
        key: RegistrationKey,
        seq: u64,
        lifetime: Lifetime,
        activator: Arc<dyn Activator>,
    ) -> Self {
        Self {
            key,
            seq,
            lifetime,
            implementation: activator.implementation_name(),
            activator: Some(activator),
            instance: RwLock::new(None),
        }
    }

    pub(crate) fn instance(
        key: RegistrationKey,
        seq: u64,
        implementation: &'static str,
        instance: AnyArc,
    ) -> Self {
        Self {
            key,
            seq,
            lifetime: Lifetime::Singleton,
            implementation,
            activator: None,
            instance: RwLock::new(Some(instance)),
        }
    }

    pub(crate) fn key(&self) -> &RegistrationKey {
        &self.key
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub(crate) fn activator(&self) -> Option<&Arc<dyn Activator>> {
        self.activator.as_ref()
    }

    /// The cached singleton, if built.
    #[inline(always)]
    pub(crate) fn cached(&self) -> Option<AnyArc> {
        self.instance.read().clone()
    }

    /// Caches `built` unless another build got there first; returns the
    /// instance that is now cached.
    pub(crate) fn cache_first(&self, built: AnyArc) -> AnyArc {
        let mut slot = self.instance.write();
        match slot.as_ref() {
            Some(existing) => existing.clone(),
            None => {
                *slot = Some(built.clone());
                built
            }
        }
    }

    /// Replaces the cached singleton unconditionally.
    pub(crate) fn replace(&self, instance: Option<AnyArc>) {
        *self.instance.write() = instance;
    }

    pub(crate) fn info(&self) -> RegistrationInfo {
        RegistrationInfo {
            key: self.key.clone(),
            lifetime: self.lifetime,
            implementation: self.implementation,
            has_instance: self.instance.read().is_some(),
        }
    }
}

/// Snapshot of one registration, for diagnostics.
#[derive(Debug, Clone)]
pub struct RegistrationInfo {
    pub key: RegistrationKey,
    pub lifetime: Lifetime,
    /// `type_name` of the implementation, or of the service for factories
    pub implementation: &'static str,
    /// Whether a singleton instance is currently cached
    pub has_instance: bool,
}

/// Service registry holding all registrations
#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<RegistrationKey, Arc<Registration>, ahash::RandomState>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &RegistrationKey) -> Option<Arc<Registration>> {
        self.entries.get(key).cloned()
    }

    pub(crate) fn contains_key(&self, key: &RegistrationKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a registration, rejecting a key that is already present.
    pub(crate) fn insert_unique(&mut self, registration: Arc<Registration>) -> DiResult<()> {
        if self.entries.contains_key(registration.key()) {
            return Err(DiError::DuplicateRegistration(registration.key().clone()));
        }
        self.entries.insert(registration.key().clone(), registration);
        Ok(())
    }

    pub(crate) fn remove(&mut self, key: &RegistrationKey) -> Option<Arc<Registration>> {
        self.entries.remove(key)
    }

    /// Removes `key` only if it still maps to `registration`.
    pub(crate) fn remove_exact(&mut self, registration: &Arc<Registration>) -> bool {
        match self.entries.get(registration.key()) {
            Some(current) if Arc::ptr_eq(current, registration) => {
                self.entries.remove(registration.key());
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// All registrations of `service`, in insertion order.
    pub(crate) fn for_service(&self, service: ServiceId) -> Vec<Arc<Registration>> {
        let mut matching: Vec<_> = self
            .entries
            .values()
            .filter(|registration| registration.key().service() == service)
            .cloned()
            .collect();
        matching.sort_by_key(|registration| registration.seq());
        matching
    }

    /// All registrations, in insertion order.
    pub(crate) fn all(&self) -> Vec<Arc<Registration>> {
        let mut all: Vec<_> = self.entries.values().cloned().collect();
        all.sort_by_key(|registration| registration.seq());
        all
    }
}

// ----- Activators -----

type FactoryFn<S> = dyn Fn(&ResolverContext<'_>) -> DiResult<Option<Arc<S>>> + Send + Sync;

/// Activator backed by a caller-supplied factory.
pub(crate) struct FactoryActivator<S: ?Sized> {
    factory: Box<FactoryFn<S>>,
}

impl<S: ?Sized + Send + Sync + 'static> FactoryActivator<S> {
    pub(crate) fn new<F>(factory: F) -> Self
    where
        F: Fn(&ResolverContext<'_>) -> DiResult<Option<Arc<S>>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
        }
    }
}

impl<S: ?Sized + Send + Sync + 'static> Activator for FactoryActivator<S> {
    fn activate(&self, ctx: &ResolverContext<'_>) -> DiResult<Option<AnyArc>> {
        Ok((self.factory)(ctx)?.map(erase))
    }

    fn implementation_name(&self) -> &'static str {
        std::any::type_name::<S>()
    }
}

type Procedure<T> = Arc<dyn Fn(Vec<AnyArc>) -> DiResult<T> + Send + Sync>;

/// Parameterless instantiation procedure, selected once per registration.
enum Parameterless<T> {
    Constructor(Procedure<T>),
    Fallback(fn() -> T),
    Missing,
}

/// Activator that constructs `I` from its [`TypeInfo`] and serves it as `S`.
pub(crate) struct TypeActivator<S: ?Sized, I> {
    info: TypeInfo<I>,
    resolve_dependencies: bool,
    inject_properties: bool,
    parameterless: OnceCell<Parameterless<I>>,
    /// Index of the constructor that last succeeded with dependencies
    selected: OnceCell<usize>,
    _service: PhantomData<fn() -> Arc<S>>,
}

impl<S, I> TypeActivator<S, I>
where
    S: ?Sized + Send + Sync + 'static,
    I: Injectable + Implements<S>,
{
    pub(crate) fn new(resolve_dependencies: bool, inject_properties: bool) -> Self {
        Self {
            info: I::type_info(),
            resolve_dependencies,
            inject_properties,
            parameterless: OnceCell::new(),
            selected: OnceCell::new(),
            _service: PhantomData,
        }
    }

    fn construct_parameterless(&self) -> DiResult<I> {
        let procedure = self.parameterless.get_or_init(|| {
            match self.info.constructors().iter().find(|c| c.arity() == 0) {
                Some(constructor) => Parameterless::Constructor(constructor.procedure()),
                None => match self.info.fallback_fn() {
                    Some(fallback) => Parameterless::Fallback(fallback),
                    None => Parameterless::Missing,
                },
            }
        });

        match procedure {
            Parameterless::Constructor(invoke) => invoke(Vec::new()),
            Parameterless::Fallback(fallback) => Ok(fallback()),
            Parameterless::Missing => Err(DiError::construction(
                std::any::type_name::<I>(),
                "no parameterless constructor or fallback",
            )),
        }
    }

    fn construct_with_dependencies(&self, ctx: &ResolverContext<'_>) -> DiResult<I> {
        let constructors = self.info.constructors();

        if let Some(&index) = self.selected.get() {
            let constructor = &constructors[index];
            let arguments = resolve_arguments(constructor, ctx)?;
            return constructor.invoke(arguments);
        }

        for (index, constructor) in constructors.iter().enumerate() {
            let attempt =
                resolve_arguments(constructor, ctx).and_then(|args| constructor.invoke(args));
            match attempt {
                Ok(instance) => {
                    tracing::trace!(
                        implementation = std::any::type_name::<I>(),
                        arity = constructor.arity(),
                        "constructor selected"
                    );
                    let _ = self.selected.set(index);
                    return Ok(instance);
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    tracing::debug!(
                        implementation = std::any::type_name::<I>(),
                        arity = constructor.arity(),
                        %error,
                        "constructor candidate failed, trying next"
                    );
                }
            }
        }

        match self.info.fallback_fn() {
            Some(fallback) => Ok(fallback()),
            None => Err(DiError::construction(
                std::any::type_name::<I>(),
                "no suitable constructor found",
            )),
        }
    }

    fn inject(&self, instance: &mut I, ctx: &ResolverContext<'_>) -> DiResult<()> {
        for property in self.info.properties() {
            if let Some(value) = ctx.resolve_any(property.key())? {
                property.assign(instance, value)?;
            }
        }
        Ok(())
    }
}

fn resolve_arguments<T: 'static>(
    constructor: &Constructor<T>,
    ctx: &ResolverContext<'_>,
) -> DiResult<Vec<AnyArc>> {
    constructor
        .parameters()
        .iter()
        .map(|&service| {
            let key = RegistrationKey::new(service, None);
            ctx.resolve_any(&key)?.ok_or_else(|| DiError::NoInstance(key))
        })
        .collect()
}

impl<S, I> Activator for TypeActivator<S, I>
where
    S: ?Sized + Send + Sync + 'static,
    I: Injectable + Implements<S>,
{
    fn activate(&self, ctx: &ResolverContext<'_>) -> DiResult<Option<AnyArc>> {
        let mut instance = if self.resolve_dependencies {
            self.construct_with_dependencies(ctx)?
        } else {
            self.construct_parameterless()?
        };

        if self.inject_properties {
            self.inject(&mut instance, ctx)?;
        }

        let service: Arc<S> = <I as Implements<S>>::into_service(Arc::new(instance));
        Ok(Some(erase(service)))
    }

    fn implementation_name(&self) -> &'static str {
        std::any::type_name::<I>()
    }
}
