//! Service lifetime definitions.

use std::fmt;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Service lifetimes controlling instance caching behavior
///
/// # Examples
///
/// ```rust
/// use swift_ioc::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Database;
/// struct RequestModel;
///
/// let container = Container::new();
/// container.register_factory::<Database, _>(|_| Ok(Arc::new(Database)), None, Lifetime::Singleton).unwrap();
/// container.register_factory::<RequestModel, _>(|_| Ok(Arc::new(RequestModel)), None, Lifetime::PerRequest).unwrap();
///
/// // Singleton: same instance everywhere
/// let db1 = container.get::<Database>().unwrap();
/// let db2 = container.get::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// // PerRequest: always a fresh instance
/// let m1 = container.get::<RequestModel>().unwrap();
/// let m2 = container.get::<RequestModel>().unwrap();
/// assert!(!Arc::ptr_eq(&m1, &m2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub enum Lifetime {
    /// New instance per resolution, never cached
    PerRequest,
    /// Single instance per registration, built once and cached until the
    /// registration is removed or reinitialized
    #[default]
    Singleton,
    /// Single instance per active scope. Without an active scope this
    /// behaves exactly like `PerRequest`.
    Scoped,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifetime::PerRequest => "PerRequest",
            Lifetime::Singleton => "Singleton",
            Lifetime::Scoped => "Scoped",
        };
        f.write_str(name)
    }
}
