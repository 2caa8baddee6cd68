//! Service/implementation pairs for batch registration.

use std::fmt;
use std::sync::Arc;

use crate::injectable::Injectable;
use crate::key::ServiceId;
use crate::registration::{Activator, RegisterOptions, TypeActivator};
use crate::service::Implements;

/// One `(service, implementation)` pair discovered outside the container,
/// registered through [`Container::register_batch`](crate::Container::register_batch).
///
/// # Examples
///
/// ```
/// use swift_ioc::{implements, Container, Injectable, RegisterOptions, Resolver, ServiceBinding, TypeInfo};
///
/// trait Handler: Send + Sync {}
///
/// #[derive(Default)]
/// struct Create;
/// #[derive(Default)]
/// struct Delete;
/// impl Handler for Create {}
/// impl Handler for Delete {}
/// impl Injectable for Create { fn type_info() -> TypeInfo<Self> { TypeInfo::with_default() } }
/// impl Injectable for Delete { fn type_info() -> TypeInfo<Self> { TypeInfo::with_default() } }
/// implements!(dyn Handler => [Create, Delete]);
///
/// let container = Container::new();
/// container
///     .register_batch(
///         [ServiceBinding::new::<Create, Create>(), ServiceBinding::new::<Delete, Delete>()],
///         RegisterOptions::per_request(),
///     )
///     .unwrap();
///
/// assert!(container.is_registered::<Create>(None));
/// assert!(container.is_registered::<Delete>(None));
/// ```
#[derive(Clone, Copy)]
pub struct ServiceBinding {
    service: ServiceId,
    implementation: &'static str,
    activator: fn(&RegisterOptions) -> Arc<dyn Activator>,
}

impl ServiceBinding {
    /// Binds implementation `I` to service `S`.
    pub fn new<S, I>() -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        I: Injectable + Implements<S>,
    {
        Self {
            service: ServiceId::of::<S>(),
            implementation: std::any::type_name::<I>(),
            activator: type_activator::<S, I>,
        }
    }

    pub fn service(&self) -> ServiceId {
        self.service
    }

    pub fn implementation(&self) -> &'static str {
        self.implementation
    }

    pub(crate) fn activator(&self, options: &RegisterOptions) -> Arc<dyn Activator> {
        (self.activator)(options)
    }
}

fn type_activator<S, I>(options: &RegisterOptions) -> Arc<dyn Activator>
where
    S: ?Sized + Send + Sync + 'static,
    I: Injectable + Implements<S>,
{
    Arc::new(TypeActivator::<S, I>::new(
        options.resolve_constructor_dependencies,
        options.inject_properties,
    ))
}

impl fmt::Debug for ServiceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBinding")
            .field("service", &self.service.name())
            .field("implementation", &self.implementation)
            .finish()
    }
}
