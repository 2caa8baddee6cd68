//! Resolver context for dependency injection.
//!
//! This module contains the ResolverContext type which provides the
//! interface factories and constructors use to resolve their dependencies.

use crate::error::DiResult;
use crate::internal::Frame;
use crate::key::{RegistrationKey, ServiceId};
use crate::service::AnyArc;
use crate::traits::{Resolver, ResolverCore};

use super::{Container, ScopeStore};

/// Context passed to factory functions for resolving dependencies.
///
/// The context carries the state of the resolution in progress: the active
/// scope (if any) and the chain of services currently being built. Nested
/// resolves through the context extend that chain, which is how circular
/// dependencies are detected. Resolving through the container directly from
/// inside a factory starts a new, unrelated chain and loses the scope; a
/// cycle wired that way is not reported as `Circular` and instead fails with
/// `DepthExceeded` once the nested builds on the thread pass
/// `max_resolution_depth`.
///
/// # Examples
///
/// ```
/// use swift_ioc::{Container, DiError, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Ping;
/// struct Pong;
///
/// let container = Container::new();
/// container
///     .register_factory::<Ping, _>(|ctx| { ctx.get::<Pong>()?; Ok(Arc::new(Ping)) }, None, Lifetime::PerRequest)
///     .unwrap();
/// container
///     .register_factory::<Pong, _>(|ctx| { ctx.get::<Ping>()?; Ok(Arc::new(Pong)) }, None, Lifetime::PerRequest)
///     .unwrap();
///
/// assert!(matches!(container.get::<Ping>(), Err(DiError::Circular(_))));
/// ```
pub struct ResolverContext<'a> {
    container: &'a Container,
    scope: Option<&'a ScopeStore>,
    frame: &'a Frame<'a>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(
        container: &'a Container,
        scope: Option<&'a ScopeStore>,
        frame: &'a Frame<'a>,
    ) -> Self {
        Self {
            container,
            scope,
            frame,
        }
    }

    /// The container this resolution runs in.
    ///
    /// Resolving through it leaves the current chain and scope behind; use
    /// the context itself for dependencies.
    pub fn container(&self) -> &Container {
        self.container
    }

    /// Key of the service currently being built.
    pub fn key(&self) -> &RegistrationKey {
        self.frame.key()
    }

    /// Number of services on the current resolution chain, this one included.
    pub fn depth(&self) -> usize {
        self.frame.depth()
    }

    /// Whether the resolution runs inside a scope.
    pub fn in_scope(&self) -> bool {
        self.scope.is_some()
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn resolve_any(&self, key: &RegistrationKey) -> DiResult<Option<AnyArc>> {
        self.container.resolve_key(key, self.scope, Some(self.frame))
    }

    fn resolve_all_any(&self, service: ServiceId) -> DiResult<Vec<AnyArc>> {
        self.container.resolve_all(service, self.scope, Some(self.frame))
    }
}

impl<'a> Resolver for ResolverContext<'a> {}
