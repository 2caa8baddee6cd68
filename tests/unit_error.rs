/// Unit tests for DiError and DiResult types

use swift_ioc::{DiError, DiResult, Lifetime, RegistrationKey};
use std::error::Error;

#[test]
fn test_error_display_duplicate_registration() {
    let error = DiError::DuplicateRegistration(RegistrationKey::named::<u32>("port"));
    assert_eq!(error.to_string(), "Service already registered: u32[port]");
}

#[test]
fn test_error_display_not_registered() {
    let error = DiError::NotRegistered(RegistrationKey::of::<u64>());
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Service not registered: u64");
    assert!(!display_str.contains('['));
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch("alloc::string::String");
    assert_eq!(error.to_string(), "Type mismatch for: alloc::string::String");
}

#[test]
fn test_error_display_circular_is_root_first() {
    // Stored deepest first
    let error = DiError::Circular(vec![
        RegistrationKey::of::<u8>(),
        RegistrationKey::of::<u16>(),
        RegistrationKey::named::<u32>("x"),
        RegistrationKey::of::<u8>(),
    ]);
    assert_eq!(
        error.to_string(),
        "Circular dependency: u8 -> u32[x] -> u16 -> u8"
    );
}

#[test]
fn test_cycle_path_only_for_circular() {
    let circular = DiError::Circular(vec![
        RegistrationKey::of::<u8>(),
        RegistrationKey::of::<u16>(),
    ]);
    let path = circular.cycle_path().unwrap();
    assert_eq!(path[0], &RegistrationKey::of::<u16>());
    assert_eq!(path[1], &RegistrationKey::of::<u8>());

    assert!(DiError::DepthExceeded(4).cycle_path().is_none());
}

#[test]
fn test_error_display_invalid_lifetime() {
    let error = DiError::InvalidLifetime {
        key: RegistrationKey::of::<u8>(),
        lifetime: Lifetime::PerRequest,
    };
    assert_eq!(
        error.to_string(),
        "Lifetime error: u8 is registered as PerRequest, expected Singleton"
    );
}

#[test]
fn test_error_display_construction_failure() {
    let error = DiError::ConstructionFailure {
        service: "app::Mailer",
        reason: "no suitable constructor found".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Cannot construct app::Mailer: no suitable constructor found"
    );
}

#[test]
fn test_error_display_misc() {
    assert_eq!(DiError::DepthExceeded(1024).to_string(), "Max depth 1024 exceeded");
    assert_eq!(
        DiError::NoInstance(RegistrationKey::of::<i8>()).to_string(),
        "No instance produced for: i8"
    );
    assert_eq!(
        DiError::Configuration("bad".to_string()).to_string(),
        "Invalid configuration: bad"
    );
}

#[test]
fn test_error_is_std_error() {
    let error = DiError::TypeMismatch("Foo");
    let dyn_error: &dyn Error = &error;
    assert!(dyn_error.source().is_none());
}

#[test]
fn test_error_clone_and_debug() {
    let error = DiError::NotRegistered(RegistrationKey::of::<u8>());
    let cloned = error.clone();
    assert_eq!(error.to_string(), cloned.to_string());
    assert!(format!("{:?}", cloned).contains("NotRegistered"));
}

#[test]
fn test_di_result_alias() {
    fn parse(ok: bool) -> DiResult<u8> {
        if ok {
            Ok(1)
        } else {
            Err(DiError::Configuration("nope".to_string()))
        }
    }

    assert_eq!(parse(true).unwrap(), 1);
    assert!(parse(false).is_err());
}
