/// Property-based tests for service registration
///
/// These tests use proptest to generate random registration sequences and
/// verify invariants that hold for every container state.

use swift_ioc::{Container, DiError, DiResult, Lifetime, Resolver};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct TestService {
    key: Option<String>,
}

fn lifetime_strategy() -> impl Strategy<Value = Lifetime> {
    prop_oneof![
        Just(Lifetime::Singleton),
        Just(Lifetime::PerRequest),
        Just(Lifetime::Scoped),
    ]
}

fn key_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z]{1,4}")
}

fn register(container: &Container, key: Option<&str>, lifetime: Lifetime) -> DiResult<()> {
    let owned = key.map(str::to_owned);
    container.register_factory::<TestService, _>(
        move |_| Ok(Arc::new(TestService { key: owned.clone() })),
        key,
        lifetime,
    )
}

// Property: at most one registration per key; the first one wins
proptest! {
    #[test]
    fn duplicate_keys_are_rejected(keys in prop::collection::vec(key_strategy(), 1..20)) {
        let container = Container::new();
        let mut seen = HashSet::new();

        for key in &keys {
            let result = register(&container, key.as_deref(), Lifetime::Singleton);
            if seen.insert(key.clone()) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert!(
                    matches!(result, Err(DiError::DuplicateRegistration(_))),
                    "expected DuplicateRegistration"
                );
            }
        }

        prop_assert_eq!(container.registrations().len(), seen.len());
        prop_assert_eq!(container.get_all::<TestService>().unwrap().len(), seen.len());

        for key in &seen {
            let resolved = container.try_get_named::<TestService>(key.as_deref()).unwrap().unwrap();
            prop_assert_eq!(&resolved.key, key);
        }
    }
}

// Property: singleton identity and per-request freshness hold for any key
proptest! {
    #[test]
    fn lifetime_sharing_rules(
        key in key_strategy(),
        lifetime in lifetime_strategy(),
        resolves in 2usize..6,
    ) {
        let container = Container::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        container
            .register_factory::<TestService, _>(
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(TestService { key: None }))
                },
                key.as_deref(),
                lifetime,
            )
            .unwrap();

        let first = container.try_get_named::<TestService>(key.as_deref()).unwrap().unwrap();
        for _ in 1..resolves {
            let next = container.try_get_named::<TestService>(key.as_deref()).unwrap().unwrap();
            prop_assert_eq!(Arc::ptr_eq(&first, &next), lifetime == Lifetime::Singleton);
        }

        let expected_calls = if lifetime == Lifetime::Singleton { 1 } else { resolves };
        prop_assert_eq!(calls.load(Ordering::SeqCst), expected_calls);

        // Inside a scope Scoped also shares
        let scope = container.begin_scope();
        let a = scope.try_get_named::<TestService>(key.as_deref()).unwrap().unwrap();
        let b = scope.try_get_named::<TestService>(key.as_deref()).unwrap().unwrap();
        prop_assert_eq!(Arc::ptr_eq(&a, &b), lifetime != Lifetime::PerRequest);
    }
}

// Property: unregister removes exactly one key and is idempotent
proptest! {
    #[test]
    fn unregister_removes_only_its_key(
        keys in prop::collection::hash_set(key_strategy(), 1..10),
        victim_index in any::<prop::sample::Index>(),
    ) {
        let container = Container::new();
        let keys: Vec<_> = keys.into_iter().collect();
        for key in &keys {
            register(&container, key.as_deref(), Lifetime::PerRequest).unwrap();
        }

        let victim = victim_index.get(&keys).clone();
        prop_assert!(container.unregister::<TestService>(victim.as_deref()));
        prop_assert!(!container.unregister::<TestService>(victim.as_deref()));

        prop_assert!(matches!(
            container.try_get_named::<TestService>(victim.as_deref()),
            Err(DiError::NotRegistered(_))
        ), "expected NotRegistered");

        for key in keys.iter().filter(|k| **k != victim) {
            prop_assert!(container.is_registered::<TestService>(key.as_deref()));
        }
        prop_assert_eq!(container.get_all::<TestService>().unwrap().len(), keys.len() - 1);
    }
}
