//! # swift-ioc
//!
//! A keyed dependency injection container with Singleton, PerRequest and
//! Scoped lifetimes, constructor-dependency resolution, property injection
//! and circular-dependency detection.
//!
//! ## Features
//!
//! - **Keyed registrations**: any number of named registrations per service next to the default one
//! - **Trait support**: services may be trait objects such as `dyn Logger`
//! - **Thread-safe**: one container can be shared by many threads and tasks without external locking
//! - **Circular dependency detection**: cycles fail with the full chain, e.g. `A -> B -> A`
//! - **Scopes**: `Scoped` instances are shared inside a scope handle and discarded when it ends
//! - **No reflection**: types describe their constructors and injectable properties through [`Injectable`]
//!
//! ## Quick Start
//!
//! ```rust
//! use swift_ioc::{Constructor, Container, Injectable, Lifetime, RegisterOptions, Resolver, TypeInfo};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! impl Injectable for UserService {
//!     fn type_info() -> TypeInfo<Self> {
//!         TypeInfo::new().constructor(Constructor::new(|(db,): (Arc<Database>,)| UserService { db }))
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .register_factory::<Database, _>(
//!         |_| Ok(Arc::new(Database { connection_string: "postgres://localhost".to_string() })),
//!         None,
//!         Lifetime::Singleton,
//!     )
//!     .unwrap();
//! container
//!     .register::<UserService, UserService>(RegisterOptions::per_request().resolve_constructor_dependencies())
//!     .unwrap();
//!
//! let user_service = container.get_required::<UserService>();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: Created once per registration and shared by every resolve (the default)
//! - **PerRequest**: Created fresh on every resolution
//! - **Scoped**: Created once per scope; without an active scope it behaves like PerRequest
//!
//! ## Trait Resolution
//!
//! ```rust
//! use swift_ioc::{implements, Container, Injectable, RegisterOptions, Resolver, TypeInfo};
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! #[derive(Default)]
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[LOG] {}", message)
//!     }
//! }
//! impl Injectable for ConsoleLogger {
//!     fn type_info() -> TypeInfo<Self> {
//!         TypeInfo::with_default()
//!     }
//! }
//! implements!(dyn Logger => [ConsoleLogger]);
//!
//! let container = Container::new();
//! container.register::<dyn Logger, ConsoleLogger>(RegisterOptions::singleton()).unwrap();
//! container
//!     .register::<dyn Logger, ConsoleLogger>(RegisterOptions::singleton().named("audit"))
//!     .unwrap();
//!
//! let logger = container.get::<dyn Logger>().unwrap();
//! assert_eq!(logger.log("Hello, World!"), "[LOG] Hello, World!");
//! assert_eq!(container.get_all::<dyn Logger>().unwrap().len(), 2);
//! ```
//!
//! ## Property Injection
//!
//! ```rust
//! use swift_ioc::{Container, Injectable, RegisterOptions, Resolver, TypeInfo};
//! use std::sync::Arc;
//!
//! struct Metrics;
//!
//! #[derive(Default)]
//! struct Handler {
//!     metrics: Option<Arc<Metrics>>,
//! }
//!
//! impl Injectable for Handler {
//!     fn type_info() -> TypeInfo<Self> {
//!         TypeInfo::with_default().property::<Metrics, _>("metrics", None, |h: &mut Handler, m| h.metrics = Some(m))
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_instance(Arc::new(Metrics), None).unwrap();
//! container
//!     .register::<Handler, Handler>(RegisterOptions::per_request().inject_properties())
//!     .unwrap();
//!
//! assert!(container.get::<Handler>().unwrap().metrics.is_some());
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod global;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod traits;

mod binding;
mod container;
mod injectable;
mod registration;
mod service;

// Internal modules
mod internal;

// Re-export core types
pub use binding::ServiceBinding;
pub use config::ContainerOptions;
pub use container::{Container, ResolverContext, Scope};
pub use error::{DiError, DiResult};
pub use injectable::{
    Constructor, Dependencies, Injectable, InjectableProperty, PropertyDescriptor, TypeInfo,
};
pub use key::{RegistrationKey, ServiceId};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, LoggingObserver};
pub use registration::{RegisterOptions, RegistrationInfo};
pub use service::Implements;
pub use traits::{Resolver, ResolverCore};
