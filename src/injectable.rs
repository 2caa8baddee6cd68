//! Construction capabilities for type-based registrations.
//!
//! The container never reflects over types. A type registered with
//! [`Container::register`](crate::Container::register) describes itself
//! through [`Injectable::type_info`]: its constructor candidates (each with
//! the list of services it needs), an optional parameterless fallback, and
//! the properties that accept injected services after construction.

use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::{RegistrationKey, ServiceId};
use crate::service::{downcast, AnyArc};

/// A type the container can construct from a registration.
///
/// # Examples
///
/// ```rust
/// use swift_ioc::{Constructor, Injectable, TypeInfo};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Scheduler { clock: Option<Arc<Clock>> }
///
/// impl Injectable for Clock {
///     fn type_info() -> TypeInfo<Self> {
///         TypeInfo::new().parameterless(|| Clock)
///     }
/// }
///
/// impl Injectable for Scheduler {
///     fn type_info() -> TypeInfo<Self> {
///         TypeInfo::new()
///             .constructor(Constructor::new(|(clock,): (Arc<Clock>,)| Scheduler { clock: Some(clock) }))
///             .parameterless(|| Scheduler { clock: None })
///     }
/// }
///
/// let info = Scheduler::type_info();
/// assert_eq!(info.constructors()[0].arity(), 1);
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    fn type_info() -> TypeInfo<Self>;
}

type Invoke<T> = Arc<dyn Fn(Vec<AnyArc>) -> DiResult<T> + Send + Sync>;
type Assign<T> = Arc<dyn Fn(&mut T, AnyArc) -> DiResult<()> + Send + Sync>;

/// A tuple of service handles a constructor receives.
///
/// Implemented for `()` and for tuples of `Arc<S>` up to eight elements,
/// where each `S` may be a concrete type or a trait object.
pub trait Dependencies: Sized + 'static {
    /// Service identities in parameter order.
    fn services() -> Vec<ServiceId>;

    /// Rebuilds the tuple from resolved instances in parameter order.
    fn from_resolved(values: Vec<AnyArc>) -> DiResult<Self>;
}

impl Dependencies for () {
    fn services() -> Vec<ServiceId> {
        Vec::new()
    }

    fn from_resolved(_values: Vec<AnyArc>) -> DiResult<Self> {
        Ok(())
    }
}

macro_rules! impl_dependencies {
    ($($name:ident),+) => {
        impl<$($name: ?Sized + Send + Sync + 'static),+> Dependencies for ($(Arc<$name>,)+) {
            fn services() -> Vec<ServiceId> {
                vec![$(ServiceId::of::<$name>()),+]
            }

            #[allow(non_snake_case)]
            fn from_resolved(values: Vec<AnyArc>) -> DiResult<Self> {
                let mut values = values.into_iter();
                $(
                    let $name = match values.next() {
                        Some(value) => downcast::<$name>(value)?,
                        None => {
                            return Err(DiError::construction(
                                std::any::type_name::<$name>(),
                                "missing constructor argument",
                            ))
                        }
                    };
                )+
                Ok(($($name,)+))
            }
        }
    };
}

impl_dependencies!(A);
impl_dependencies!(A, B);
impl_dependencies!(A, B, C);
impl_dependencies!(A, B, C, D);
impl_dependencies!(A, B, C, D, E);
impl_dependencies!(A, B, C, D, E, F);
impl_dependencies!(A, B, C, D, E, F, G);
impl_dependencies!(A, B, C, D, E, F, G, H);

/// One constructor candidate of `T`.
pub struct Constructor<T> {
    parameters: Vec<ServiceId>,
    invoke: Invoke<T>,
}

impl<T: 'static> Constructor<T> {
    /// Constructor that always succeeds once its dependencies resolve.
    pub fn new<D, F>(build: F) -> Self
    where
        D: Dependencies,
        F: Fn(D) -> T + Send + Sync + 'static,
    {
        Self {
            parameters: D::services(),
            invoke: Arc::new(move |values: Vec<AnyArc>| Ok(build(D::from_resolved(values)?))),
        }
    }

    /// Constructor whose invocation may fail. A failure makes the container
    /// move on to the next candidate.
    pub fn fallible<D, F, E>(build: F) -> Self
    where
        D: Dependencies,
        F: Fn(D) -> Result<T, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self {
            parameters: D::services(),
            invoke: Arc::new(move |values: Vec<AnyArc>| {
                build(D::from_resolved(values)?)
                    .map_err(|e| DiError::construction(std::any::type_name::<T>(), e.to_string()))
            }),
        }
    }

    /// Zero-argument constructor.
    pub fn parameterless<F>(build: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(move |(): ()| build())
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Services this constructor needs, in parameter order.
    pub fn parameters(&self) -> &[ServiceId] {
        &self.parameters
    }

    pub(crate) fn invoke(&self, values: Vec<AnyArc>) -> DiResult<T> {
        (self.invoke)(values)
    }

    pub(crate) fn procedure(&self) -> Invoke<T> {
        self.invoke.clone()
    }
}

/// A property that receives an injected service after construction.
pub struct InjectableProperty<T> {
    name: &'static str,
    key: RegistrationKey,
    assign: Assign<T>,
}

impl<T: 'static> InjectableProperty<T> {
    /// Declares property `name` receiving service `P` (optionally a named
    /// registration of it) through `set`.
    pub fn new<P, F>(name: &'static str, key: Option<&str>, set: F) -> Self
    where
        P: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<P>) + Send + Sync + 'static,
    {
        Self {
            name,
            key: RegistrationKey::with_key::<P>(key),
            assign: Arc::new(move |target: &mut T, value: AnyArc| {
                set(target, downcast::<P>(value)?);
                Ok(())
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Key the injected value is resolved with.
    pub fn key(&self) -> &RegistrationKey {
        &self.key
    }

    pub fn descriptor(&self) -> PropertyDescriptor {
        PropertyDescriptor {
            name: self.name,
            service: self.key.service(),
            key: self.key.discriminator().map(str::to_owned),
        }
    }

    pub(crate) fn assign(&self, target: &mut T, value: AnyArc) -> DiResult<()> {
        (self.assign)(target, value)
    }
}

/// Description of an injectable property: its name, declared service type
/// and optional registration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub service: ServiceId,
    pub key: Option<String>,
}

/// Construction capabilities of `T`, built with a small builder.
///
/// Constructor candidates are kept ordered by descending arity (stable for
/// equal arity), which is the order the container tries them in.
pub struct TypeInfo<T> {
    constructors: Vec<Constructor<T>>,
    properties: Vec<InjectableProperty<T>>,
    fallback: Option<fn() -> T>,
}

impl<T: 'static> TypeInfo<T> {
    pub fn new() -> Self {
        Self {
            constructors: Vec::new(),
            properties: Vec::new(),
            fallback: None,
        }
    }

    /// Adds a constructor candidate.
    pub fn constructor(mut self, constructor: Constructor<T>) -> Self {
        let arity = constructor.arity();
        let position = self
            .constructors
            .iter()
            .position(|existing| existing.arity() < arity)
            .unwrap_or(self.constructors.len());
        self.constructors.insert(position, constructor);
        self
    }

    /// Adds a zero-argument constructor candidate.
    pub fn parameterless<F>(self, build: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.constructor(Constructor::parameterless(build))
    }

    /// Generic no-argument construction used when no zero-argument
    /// candidate exists.
    pub fn fallback(mut self, build: fn() -> T) -> Self {
        self.fallback = Some(build);
        self
    }

    /// Declares an injectable property.
    pub fn property<P, F>(mut self, name: &'static str, key: Option<&str>, set: F) -> Self
    where
        P: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<P>) + Send + Sync + 'static,
    {
        self.properties.push(InjectableProperty::new(name, key, set));
        self
    }

    pub fn constructors(&self) -> &[Constructor<T>] {
        &self.constructors
    }

    pub fn properties(&self) -> &[InjectableProperty<T>] {
        &self.properties
    }

    /// The injectable-property lookup: name, declared service and key of
    /// every flagged property.
    pub fn property_descriptors(&self) -> Vec<PropertyDescriptor> {
        self.properties.iter().map(InjectableProperty::descriptor).collect()
    }

    pub(crate) fn fallback_fn(&self) -> Option<fn() -> T> {
        self.fallback
    }
}

impl<T: Default + 'static> TypeInfo<T> {
    /// `TypeInfo` whose fallback is `T::default`.
    pub fn with_default() -> Self {
        Self::new().fallback(T::default)
    }
}

impl<T: 'static> Default for TypeInfo<T> {
    fn default() -> Self {
        Self::new()
    }
}
