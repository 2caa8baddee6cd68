//! Container configuration.
//!
//! Options tune how a container resolves; they never describe what is
//! registered in it.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};
use crate::internal::DEFAULT_MAX_DEPTH;

/// Default prefix for environment variables read by [`ContainerOptions::from_env`].
pub const ENV_PREFIX: &str = "SWIFT_IOC";

/// Options for a [`Container`](crate::Container).
///
/// # Examples
///
/// ```rust
/// use swift_ioc::{Container, ContainerOptions};
///
/// let options = ContainerOptions::default()
///     .max_resolution_depth(64)
///     .serialize_eager_initialization(false);
///
/// let container = Container::with_options(options);
/// assert_eq!(container.options().max_resolution_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Longest resolution chain before `DepthExceeded` is raised
    pub max_resolution_depth: usize,
    /// Run eager (`initialize_on_register`) singleton construction one at a
    /// time across the whole container
    pub serialize_eager_initialization: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_resolution_depth: DEFAULT_MAX_DEPTH,
            serialize_eager_initialization: true,
        }
    }
}

impl ContainerOptions {
    pub fn max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    pub fn serialize_eager_initialization(mut self, serialize: bool) -> Self {
        self.serialize_eager_initialization = serialize;
        self
    }

    /// Reads options from `SWIFT_IOC_*` environment variables, keeping
    /// defaults for the ones that are unset.
    ///
    /// - `SWIFT_IOC_MAX_RESOLUTION_DEPTH`: positive integer
    /// - `SWIFT_IOC_SERIALIZE_EAGER_INITIALIZATION`: `true` / `false`
    pub fn from_env() -> DiResult<Self> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Like [`from_env`](Self::from_env) with a custom variable prefix.
    pub fn from_env_with_prefix(prefix: &str) -> DiResult<Self> {
        let mut options = Self::default();
        let var = |name: &str| env::var(format!("{}_{}", prefix.to_uppercase(), name)).ok();

        if let Some(raw) = var("MAX_RESOLUTION_DEPTH") {
            options.max_resolution_depth = match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => depth,
                _ => {
                    return Err(DiError::Configuration(format!(
                        "MAX_RESOLUTION_DEPTH must be a positive integer, got {:?}",
                        raw
                    )))
                }
            };
        }

        if let Some(raw) = var("SERIALIZE_EAGER_INITIALIZATION") {
            options.serialize_eager_initialization = raw.trim().parse::<bool>().map_err(|_| {
                DiError::Configuration(format!(
                    "SERIALIZE_EAGER_INITIALIZATION must be true or false, got {:?}",
                    raw
                ))
            })?;
        }

        options.validate()?;
        Ok(options)
    }

    /// Parses options from JSON. Missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| DiError::Configuration(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> DiResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(DiError::Configuration(
                "max_resolution_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ContainerOptions::default();
        assert_eq!(options.max_resolution_depth, DEFAULT_MAX_DEPTH);
        assert!(options.serialize_eager_initialization);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn zero_depth_is_rejected() {
        let options = ContainerOptions::default().max_resolution_depth(0);
        assert!(matches!(options.validate(), Err(DiError::Configuration(_))));
    }

    // Each test uses its own prefix so parallel tests never observe each
    // other's variables.
    #[test]
    fn env_overrides_defaults() {
        env::set_var("IOC_ENV_OK_MAX_RESOLUTION_DEPTH", "32");
        env::set_var("IOC_ENV_OK_SERIALIZE_EAGER_INITIALIZATION", "false");

        let options = ContainerOptions::from_env_with_prefix("ioc_env_ok").unwrap();
        assert_eq!(options.max_resolution_depth, 32);
        assert!(!options.serialize_eager_initialization);
    }

    #[test]
    fn env_rejects_garbage() {
        env::set_var("IOC_ENV_BAD_MAX_RESOLUTION_DEPTH", "deep");
        assert!(matches!(
            ContainerOptions::from_env_with_prefix("IOC_ENV_BAD"),
            Err(DiError::Configuration(_))
        ));
    }

    #[test]
    fn unset_env_keeps_defaults() {
        let options = ContainerOptions::from_env_with_prefix("IOC_ENV_UNSET").unwrap();
        assert_eq!(options, ContainerOptions::default());
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let options = ContainerOptions::from_json(r#"{ "max_resolution_depth": 8 }"#).unwrap();
        assert_eq!(options.max_resolution_depth, 8);
        assert!(options.serialize_eager_initialization);
    }
}
