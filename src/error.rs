//! Error types for the dependency injection container.

use thiserror::Error;

use crate::key::RegistrationKey;
use crate::lifetime::Lifetime;

/// Dependency injection errors
///
/// Every failure is surfaced synchronously to the caller of the operation
/// that triggered it. Nothing is retried internally.
///
/// # Examples
///
/// ```rust
/// use swift_ioc::{Container, DiError, RegistrationKey, Resolver};
///
/// struct Unregistered;
///
/// let container = Container::new();
/// match container.get::<Unregistered>() {
///     Err(DiError::NotRegistered(key)) => {
///         assert!(key.service_name().ends_with("Unregistered"));
///     }
///     _ => unreachable!(),
/// }
///
/// let circular = DiError::Circular(vec![
///     RegistrationKey::of::<u8>(),
///     RegistrationKey::of::<u16>(),
///     RegistrationKey::of::<u8>(),
/// ]);
/// assert_eq!(circular.to_string(), "Circular dependency: u8 -> u16 -> u8");
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// A registration already exists for this key
    #[error("Service already registered: {0}")]
    DuplicateRegistration(RegistrationKey),
    /// No registration exists for this key
    #[error("Service not registered: {0}")]
    NotRegistered(RegistrationKey),
    /// Circular dependency detected.
    ///
    /// The chain holds the whole resolution stack, deepest first: the key
    /// that was re-entered comes first and the root of the resolve comes
    /// last.
    #[error("Circular dependency: {}", render_chain(.0))]
    Circular(Vec<RegistrationKey>),
    /// Operation requires a different lifetime
    #[error("Lifetime error: {key} is registered as {lifetime}, expected Singleton")]
    InvalidLifetime {
        key: RegistrationKey,
        lifetime: Lifetime,
    },
    /// No usable construction strategy for a type
    #[error("Cannot construct {service}: {reason}")]
    ConstructionFailure {
        service: &'static str,
        reason: String,
    },
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Maximum resolution depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// The registration was resolved but its build produced no instance
    #[error("No instance produced for: {0}")]
    NoInstance(RegistrationKey),
    /// Invalid container options
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl DiError {
    pub(crate) fn construction(service: &'static str, reason: impl Into<String>) -> Self {
        DiError::ConstructionFailure {
            service,
            reason: reason.into(),
        }
    }

    /// For `Circular` errors, the resolution stack in resolution order (root
    /// first, ending with the re-entered key).
    pub fn cycle_path(&self) -> Option<Vec<&RegistrationKey>> {
        match self {
            DiError::Circular(chain) => Some(chain.iter().rev().collect()),
            _ => None,
        }
    }

    /// Whether this error must abort a resolution instead of triggering
    /// constructor fallback.
    pub(crate) fn is_fatal(&self) -> bool {
        matches!(self, DiError::Circular(_) | DiError::DepthExceeded(_))
    }
}

fn render_chain(chain: &[RegistrationKey]) -> String {
    chain
        .iter()
        .rev()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
