#![no_main]

use libfuzzer_sys::fuzz_target;
use modular_di::{Args, DependencyRegistry, DiError, Key, Value};
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let mut args = Args::new();
    let mut expect_primitive_error = false;
    let mut last_named_instance: Option<Arc<TestService>> = None;
    let mut last_positional_instance: Option<Arc<TestService>> = None;

    // Each byte pair picks a value kind and a slot
    for chunk in data.chunks(2).take(32) {
        let kind = chunk[0] % 6;
        let slot = chunk.get(1).copied().unwrap_or(0) % 4;
        let name = format!("k{}", slot);

        args = match kind {
            0 => args.kwarg(name, slot as i64),
            1 => args.kwarg(name, format!("v{}", slot)),
            2 => {
                let service = Arc::new(TestService { id: slot as u32 });
                last_named_instance = Some(service.clone());
                args.kwarg_arc(name, service)
            }
            3 => {
                let service = Arc::new(TestService { id: slot as u32 });
                last_positional_instance = Some(service.clone());
                args.arg_arc(service)
            }
            4 => {
                expect_primitive_error = true;
                args.arg(slot as u64)
            }
            _ => args.kwarg_value(name, Value::unit()),
        };
    }

    match DependencyRegistry::new(args.clone()) {
        Ok(registry) => {
            assert!(!expect_primitive_error);

            // Named instances are applied after positional ones
            let expected = last_named_instance.or(last_positional_instance);
            match (expected, registry.resolve::<TestService>()) {
                (Some(expected), Ok(resolved)) => assert!(Arc::ptr_eq(&expected, &resolved)),
                (None, Err(DiError::NotFound(_))) => {}
                (expected, resolved) => panic!(
                    "type index mismatch: expected {:?}, got {:?}",
                    expected.map(|s| s.id),
                    resolved.map(|s| s.id)
                ),
            }

            // Primitives are never indexed by type
            assert!(!registry.contains(&Key::of::<i64>()));
            assert!(!registry.contains(&Key::of::<String>()));

            for (name, value) in args.named_values() {
                assert!(registry.get_by_name(name).is_some());
                if !value.is_primitive() {
                    assert!(registry.get_by_type(value.type_id()).is_some());
                }
            }
        }
        Err(DiError::InvalidArgument(_)) => assert!(expect_primitive_error),
        Err(other) => panic!("unexpected error: {}", other),
    }
});

#[derive(Debug)]
struct TestService {
    id: u32,
}
