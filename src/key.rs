//! Registration key types for the dependency injection container.

use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of an abstract service contract.
///
/// Wraps the `TypeId` of the service (a concrete type or a trait object such
/// as `dyn Logger`) together with its `type_name` for diagnostics. Equality
/// and hashing only look at the `TypeId`.
///
/// # Examples
///
/// ```rust
/// use swift_ioc::ServiceId;
///
/// trait Logger: Send + Sync {}
///
/// let id = ServiceId::of::<dyn Logger>();
/// assert!(id.name().contains("Logger"));
/// assert_eq!(id, ServiceId::of::<dyn Logger>());
/// assert_ne!(id, ServiceId::of::<String>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ServiceId {
    id: TypeId,
    name: &'static str,
}

impl ServiceId {
    /// Returns the identity of `S`.
    #[inline(always)]
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    /// The underlying `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The `type_name` of the service, for display only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceId {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceId {}

impl Hash for ServiceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Key for registry storage and lookup.
///
/// A key combines the service identity with an optional string
/// discriminator, so one service can carry several named registrations next
/// to its default (unnamed) one. Keys are immutable and their hash is
/// computed once at construction.
///
/// # Examples
///
/// ```rust
/// use swift_ioc::RegistrationKey;
///
/// let default_key = RegistrationKey::of::<u32>();
/// let port_key = RegistrationKey::named::<u32>("port");
///
/// assert_eq!(default_key.discriminator(), None);
/// assert_eq!(port_key.discriminator(), Some("port"));
/// assert_ne!(default_key, port_key);
/// assert_eq!(port_key, RegistrationKey::new(swift_ioc::ServiceId::of::<u32>(), Some("port")));
/// assert_eq!(port_key.to_string(), "u32[port]");
/// ```
#[derive(Clone)]
pub struct RegistrationKey {
    service: ServiceId,
    discriminator: Option<Arc<str>>,
    hash: u64,
}

impl RegistrationKey {
    /// Creates a key for `service`, optionally discriminated by `key`.
    pub fn new(service: ServiceId, key: Option<&str>) -> Self {
        let discriminator: Option<Arc<str>> = key.map(Arc::from);

        let mut hasher = DefaultHasher::new();
        service.hash(&mut hasher);
        discriminator.as_deref().hash(&mut hasher);

        Self {
            service,
            discriminator,
            hash: hasher.finish(),
        }
    }

    /// Key of the default (unnamed) registration of `S`.
    #[inline]
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self::new(ServiceId::of::<S>(), None)
    }

    /// Key of the registration of `S` named `name`.
    #[inline]
    pub fn named<S: ?Sized + 'static>(name: &str) -> Self {
        Self::new(ServiceId::of::<S>(), Some(name))
    }

    /// Key of `S` with an optional discriminator.
    #[inline]
    pub fn with_key<S: ?Sized + 'static>(key: Option<&str>) -> Self {
        Self::new(ServiceId::of::<S>(), key)
    }

    pub fn service(&self) -> ServiceId {
        self.service
    }

    /// The service `type_name`, for diagnostics.
    pub fn service_name(&self) -> &'static str {
        self.service.name()
    }

    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    pub fn is_named(&self) -> bool {
        self.discriminator.is_some()
    }
}

impl PartialEq for RegistrationKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.service == other.service
            && self.discriminator == other.discriminator
    }
}

impl Eq for RegistrationKey {}

impl Hash for RegistrationKey {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationKey")
            .field("service", &self.service.name())
            .field("discriminator", &self.discriminator())
            .finish()
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.discriminator() {
            Some(key) => write!(f, "{}[{}]", self.service.name(), key),
            None => f.write_str(self.service.name()),
        }
    }
}
