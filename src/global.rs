//! Process-wide container accessor.
//!
//! Kept for code that cannot have a container passed to it. Everything else
//! should create a [`Container`] and hand it to whoever needs it; nothing in
//! this crate goes through the global.
//!
//! ```
//! use swift_ioc::{global, Container};
//!
//! global::set_instance(Container::new());
//! let container = global::instance();
//! assert!(container.registrations().is_empty());
//! global::reset();
//! ```

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::container::Container;

static GLOBAL: Lazy<RwLock<Option<Container>>> = Lazy::new(|| RwLock::new(None));

/// Returns the process-wide container, creating a default one on first use.
pub fn instance() -> Container {
    if let Some(container) = GLOBAL.read().as_ref() {
        return container.clone();
    }
    GLOBAL.write().get_or_insert_with(Container::new).clone()
}

/// Replaces the process-wide container, returning the previous one.
pub fn set_instance(container: Container) -> Option<Container> {
    tracing::debug!("global container replaced");
    GLOBAL.write().replace(container)
}

/// Drops the process-wide container; the next [`instance`] call creates a
/// fresh one.
pub fn reset() -> Option<Container> {
    GLOBAL.write().take()
}
