#![no_main]

use libfuzzer_sys::fuzz_target;
use swift_ioc::{Container, DiError, Lifetime, Resolver};
use std::sync::Arc;

const KEYS: [Option<&str>; 4] = [None, Some("a"), Some("b"), Some("c")];

fn lifetime(byte: u8) -> Lifetime {
    match byte % 3 {
        0 => Lifetime::Singleton,
        1 => Lifetime::PerRequest,
        _ => Lifetime::Scoped,
    }
}

// Each pair of bytes is one operation against a shared container. Factories
// for key N depend on key N+1, so the byte stream also wires cycles.
fuzz_target!(|data: &[u8]| {
    let container = Container::new();
    let mut scope = None;

    for op in data.chunks_exact(2) {
        let key = KEYS[(op[1] & 0b11) as usize];
        match op[0] % 8 {
            0 => {
                let next = KEYS[((op[1] & 0b11) as usize + 1) % KEYS.len()];
                let _ = container.register_factory::<u32, _>(
                    move |ctx| Ok(Arc::new(ctx.try_get_named::<u32>(next)?.map_or(0, |v| *v) + 1)),
                    key,
                    lifetime(op[1] >> 2),
                );
            }
            1 => {
                let _ = container.register_instance(Arc::new(op[1] as u32), key);
            }
            2 => {
                container.unregister::<u32>(key);
            }
            3 => match container.try_get_named::<u32>(key) {
                Ok(_) | Err(DiError::NotRegistered(_)) | Err(DiError::Circular(_)) => {}
                Err(other) => panic!("unexpected error: {}", other),
            },
            4 => {
                if let Ok(all) = container.get_all::<u32>() {
                    assert!(all.len() <= KEYS.len());
                }
            }
            5 => {
                scope = Some(container.begin_scope());
            }
            6 => {
                if let Some(active) = &scope {
                    let first = active.try_get_named::<u32>(key);
                    let second = active.try_get_named::<u32>(key);
                    assert_eq!(first.is_ok(), second.is_ok());
                }
            }
            _ => {
                let _ = container.reinitialize::<u32>(key);
            }
        }
    }

    assert!(container.registrations().len() <= KEYS.len());
});
