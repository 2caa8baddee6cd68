//! Service contracts and type-erased instance storage.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};

// Type-erased Arc for storage. Always holds an `Arc<S>` for the service `S`
// it was registered under, so sized types and trait objects share one path.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Declares that an implementation type can serve as service `S`.
///
/// Every type implements itself. For trait-object services, use the
/// [`implements!`](crate::implements) macro, which emits the unsizing
/// conversion from `Arc<Impl>` to `Arc<dyn Trait>`.
///
/// # Examples
///
/// ```rust
/// use swift_ioc::{implements, Implements};
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
/// implements!(dyn Greeter => [English]);
///
/// let greeter: Arc<dyn Greeter> = Implements::<dyn Greeter>::into_service(Arc::new(English));
/// assert_eq!(greeter.greet(), "hello");
/// ```
pub trait Implements<S: ?Sized + 'static>: Send + Sync + 'static {
    fn into_service(self: Arc<Self>) -> Arc<S>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    #[inline(always)]
    fn into_service(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Implements [`Implements`] for one or more types serving a trait-object service.
///
/// ```rust
/// use swift_ioc::implements;
///
/// trait Store: Send + Sync {}
/// struct MemoryStore;
/// struct DiskStore;
/// impl Store for MemoryStore {}
/// impl Store for DiskStore {}
///
/// implements!(dyn Store => [MemoryStore, DiskStore]);
/// ```
#[macro_export]
macro_rules! implements {
    ($service:ty => [$($implementation:ty),+ $(,)?]) => {
        $(
            impl $crate::Implements<$service> for $implementation {
                #[inline(always)]
                fn into_service(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$service> {
                    self
                }
            }
        )+
    };
}

#[inline]
pub(crate) fn erase<S: ?Sized + Send + Sync + 'static>(service: Arc<S>) -> AnyArc {
    Arc::new(service)
}

#[inline]
pub(crate) fn downcast<S: ?Sized + Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<S>> {
    any.downcast::<Arc<S>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<S>()))
}
