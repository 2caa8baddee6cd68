use swift_ioc::{
    Constructor, Container, ContainerOptions, DiError, Injectable, Lifetime, RegisterOptions,
    RegistrationKey, Resolver, TypeInfo,
};
use std::sync::Arc;
use std::thread;

fn chain_names(chain: &[RegistrationKey]) -> Vec<&'static str> {
    chain
        .iter()
        .map(|key| key.service_name().rsplit("::").next().unwrap_or(""))
        .collect()
}

#[test]
fn test_self_circular_dependency() {
    struct SelfReferencing;

    let container = Container::new();
    container
        .register_factory::<SelfReferencing, _>(
            |ctx| {
                ctx.get::<SelfReferencing>()?;
                Ok(Arc::new(SelfReferencing))
            },
            None,
            Lifetime::PerRequest,
        )
        .unwrap();

    match container.get::<SelfReferencing>() {
        Err(DiError::Circular(chain)) => {
            assert_eq!(chain_names(&chain), vec!["SelfReferencing", "SelfReferencing"]);
        }
        _ => panic!("expected Circular"),
    }
}

struct ServiceA {
    _b: Arc<ServiceB>,
}

struct ServiceB {
    _a: Arc<ServiceA>,
}

impl Injectable for ServiceA {
    fn type_info() -> TypeInfo<Self> {
        TypeInfo::new().constructor(Constructor::new(|(b,): (Arc<ServiceB>,)| ServiceA { _b: b }))
    }
}

impl Injectable for ServiceB {
    fn type_info() -> TypeInfo<Self> {
        TypeInfo::new().constructor(Constructor::new(|(a,): (Arc<ServiceA>,)| ServiceB { _a: a }))
    }
}

#[test]
fn test_two_type_constructor_cycle() {
    let container = Container::new();
    let options = RegisterOptions::per_request().resolve_constructor_dependencies();
    container.register::<ServiceA, ServiceA>(options.clone()).unwrap();
    container.register::<ServiceB, ServiceB>(options).unwrap();

    let error = match container.get::<ServiceA>() {
        Err(error) => error,
        Ok(_) => panic!("expected Circular"),
    };

    match &error {
        DiError::Circular(chain) => {
            // Deepest first: the re-entered key leads, its first occurrence ends
            assert_eq!(chain_names(chain), vec!["ServiceA", "ServiceB", "ServiceA"]);
        }
        other => panic!("expected Circular, got {:?}", other),
    }

    let path: Vec<_> = error
        .cycle_path()
        .unwrap()
        .into_iter()
        .map(|key| key.service_name().rsplit("::").next().unwrap_or(""))
        .collect();
    assert_eq!(path, vec!["ServiceA", "ServiceB", "ServiceA"]);

    let message = error.to_string();
    assert!(message.starts_with("Circular dependency: "));
    assert!(message.contains("ServiceA"));
    assert!(message.contains("ServiceB"));
    assert!(message.contains(" -> "));
}

struct Left;
struct Middle;
struct Right;

#[test]
fn test_cycle_below_root_reports_whole_stack() {
    let container = Container::new();
    container
        .register_factory::<Left, _>(
            |ctx| {
                ctx.get::<Middle>()?;
                Ok(Arc::new(Left))
            },
            None,
            Lifetime::PerRequest,
        )
        .unwrap();
    container
        .register_factory::<Middle, _>(
            |ctx| {
                ctx.get::<Right>()?;
                Ok(Arc::new(Middle))
            },
            None,
            Lifetime::PerRequest,
        )
        .unwrap();
    container
        .register_factory::<Right, _>(
            |ctx| {
                ctx.get::<Middle>()?;
                Ok(Arc::new(Right))
            },
            None,
            Lifetime::PerRequest,
        )
        .unwrap();

    match container.get::<Left>() {
        Err(error @ DiError::Circular(_)) => {
            if let DiError::Circular(chain) = &error {
                // Left is not part of the cycle but is still on the stack
                assert_eq!(chain_names(chain), vec!["Middle", "Right", "Middle", "Left"]);
            }

            let path: Vec<_> = error
                .cycle_path()
                .unwrap()
                .into_iter()
                .map(|key| key.service_name().rsplit("::").next().unwrap_or(""))
                .collect();
            assert_eq!(path, vec!["Left", "Middle", "Right", "Middle"]);

            let message = error.to_string();
            let left = message.find("Left").unwrap();
            let middle = message.find("Middle").unwrap();
            let right = message.find("Right").unwrap();
            assert!(left < middle && middle < right);
        }
        _ => panic!("expected Circular"),
    }
}

/// Has a parameterless fallback constructor that must not hide the cycle.
struct Eager {
    _other: Option<Arc<Lazy>>,
}

struct Lazy {
    _eager: Arc<Eager>,
}

impl Injectable for Eager {
    fn type_info() -> TypeInfo<Self> {
        TypeInfo::new()
            .constructor(Constructor::new(|(other,): (Arc<Lazy>,)| Eager { _other: Some(other) }))
            .parameterless(|| Eager { _other: None })
    }
}

impl Injectable for Lazy {
    fn type_info() -> TypeInfo<Self> {
        TypeInfo::new()
            .constructor(Constructor::new(|(eager,): (Arc<Eager>,)| Lazy { _eager: eager }))
    }
}

#[test]
fn test_cycle_is_never_swallowed_by_constructor_fallback() {
    let container = Container::new();
    let options = RegisterOptions::per_request().resolve_constructor_dependencies();
    container.register::<Eager, Eager>(options.clone()).unwrap();
    container.register::<Lazy, Lazy>(options).unwrap();

    assert!(matches!(container.get::<Eager>(), Err(DiError::Circular(_))));
    assert!(matches!(container.get::<Lazy>(), Err(DiError::Circular(_))));
}

trait Store: Send + Sync {
    fn describe(&self) -> String;
}

struct Base;

impl Store for Base {
    fn describe(&self) -> String {
        "base".to_string()
    }
}

struct Cached {
    inner: Arc<dyn Store>,
}

impl Store for Cached {
    fn describe(&self) -> String {
        format!("cached({})", self.inner.describe())
    }
}

#[test]
fn test_keyed_decorator_of_same_service_is_not_a_cycle() {
    let container = Container::new();
    container
        .register_instance::<dyn Store>(Arc::new(Base), Some("base"))
        .unwrap();
    container
        .register_factory::<dyn Store, _>(
            |ctx| {
                let inner = ctx.get_named::<dyn Store>("base")?;
                Ok(Arc::new(Cached { inner }) as Arc<dyn Store>)
            },
            None,
            Lifetime::Singleton,
        )
        .unwrap();

    assert_eq!(container.get::<dyn Store>().unwrap().describe(), "cached(base)");
}

#[test]
fn test_state_is_clean_after_cycle() {
    struct Node;

    let container = Container::new();
    container
        .register_factory::<Node, _>(
            |ctx| {
                ctx.get::<Node>()?;
                Ok(Arc::new(Node))
            },
            None,
            Lifetime::PerRequest,
        )
        .unwrap();
    container
        .register_factory::<u64, _>(
            |ctx| Ok(Arc::new(ctx.depth() as u64)),
            None,
            Lifetime::PerRequest,
        )
        .unwrap();

    assert!(matches!(container.get::<Node>(), Err(DiError::Circular(_))));
    assert!(matches!(container.get::<Node>(), Err(DiError::Circular(_))));

    // An unrelated resolve starts at depth one
    assert_eq!(*container.get::<u64>().unwrap(), 1);
}

#[test]
fn test_resolving_through_container_from_factory_starts_new_chain() {
    struct Outer;
    struct Inner;

    let container = Container::new();
    let handle = container.clone();
    container
        .register_factory::<Inner, _>(|_| Ok(Arc::new(Inner)), None, Lifetime::PerRequest)
        .unwrap();
    container
        .register_factory::<Outer, _>(
            move |_| {
                handle.get::<Inner>()?;
                Ok(Arc::new(Outer))
            },
            None,
            Lifetime::PerRequest,
        )
        .unwrap();

    assert!(container.get::<Outer>().is_ok());
}

#[test]
fn test_depth_limit_stops_runaway_recursion() {
    struct Level(u32);

    let container = Container::with_options(ContainerOptions::default().max_resolution_depth(8));

    // Every level asks for the next distinct key, so no key repeats.
    container
        .register_factory::<Level, _>(
            |ctx| {
                let next = format!("{}", ctx.depth());
                ctx.get_named::<Level>(&next)?;
                Ok(Arc::new(Level(0)))
            },
            None,
            Lifetime::PerRequest,
        )
        .unwrap();
    for depth in 1..=16 {
        container
            .register_factory::<Level, _>(
                move |ctx| {
                    let next = format!("{}", ctx.depth());
                    match ctx.get_named::<Level>(&next) {
                        Ok(_) | Err(DiError::NotRegistered(_)) => Ok(Arc::new(Level(depth))),
                        Err(e) => Err(e),
                    }
                },
                Some(&depth.to_string()),
                Lifetime::PerRequest,
            )
            .unwrap();
    }

    assert!(matches!(container.get::<Level>(), Err(DiError::DepthExceeded(8))));
}

const SMALL_STACK: usize = 2 * 1024 * 1024;

fn on_small_stack<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .stack_size(SMALL_STACK)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

struct Chained;

/// Keys "0".."len-1", each resolving the next; the last one stops there.
fn chained_container(len: usize) -> Container {
    let container = Container::new();
    for level in 0..len {
        let next = (level + 1).to_string();
        container
            .register_factory::<Chained, _>(
                move |ctx| match ctx.get_named::<Chained>(&next) {
                    Ok(_) | Err(DiError::NotRegistered(_)) => Ok(Arc::new(Chained)),
                    Err(e) => Err(e),
                },
                Some(&level.to_string()),
                Lifetime::PerRequest,
            )
            .unwrap();
    }
    container
}

#[test]
fn test_default_depth_limit_fires_before_stack_overflow() {
    let limit = ContainerOptions::default().max_resolution_depth;

    let (shallow_ok, deep) = on_small_stack(move || {
        let shallow_ok = chained_container(limit).get_named::<Chained>("0").is_ok();
        let deep = chained_container(1000).get_named::<Chained>("0").err();
        (shallow_ok, deep)
    });

    assert!(shallow_ok);
    assert!(matches!(deep, Some(DiError::DepthExceeded(l)) if l == limit));
}

#[test]
fn test_cycle_through_captured_container_is_bounded() {
    struct Looping;

    let limit = ContainerOptions::default().max_resolution_depth;

    let result = on_small_stack(|| {
        let container = Container::new();
        let handle = container.clone();
        container
            .register_factory::<Looping, _>(
                move |_| {
                    handle.get::<Looping>()?;
                    Ok(Arc::new(Looping))
                },
                None,
                Lifetime::PerRequest,
            )
            .unwrap();

        let result = container.get::<Looping>().map(|_| ()).err();
        container.clear();
        result
    });

    assert!(matches!(result, Some(DiError::DepthExceeded(l)) if l == limit));
}
