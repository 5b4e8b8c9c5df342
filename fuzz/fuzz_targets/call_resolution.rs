#![no_main]

use libfuzzer_sys::fuzz_target;
use modular_di::{resolve, Args, DependencyRegistry, DiError, Signature, TransactionContext};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let param_count = (data[0] % 5) as usize;
    let positional_count = (data[1] % 7) as usize;
    let registered_mask = data[2];

    let names: Vec<String> = (0..param_count).map(|i| format!("p{}", i)).collect();
    let signature = names
        .iter()
        .fold(Signature::new("target"), |sig, name| sig.untyped(name.clone()));

    let registry_args = names
        .iter()
        .enumerate()
        .filter(|(i, _)| registered_mask & (1 << *i) != 0)
        .fold(Args::new(), |args, (i, name)| args.kwarg(name.clone(), 100 + i as i64));
    let registry = DependencyRegistry::new(registry_args).unwrap();

    let overrides = data[3..]
        .iter()
        .take(positional_count)
        .fold(Args::new(), |args, byte| args.arg(*byte as i64));
    let given = overrides.positional().len();

    let first = resolve(&signature, &registry, &overrides);
    let second = resolve(&signature, &registry, &overrides);
    assert_eq!(first, second);

    for (i, name) in names.iter().enumerate() {
        let expected = overrides
            .positional()
            .get(i)
            .and_then(|v| v.downcast_ref::<i64>().copied())
            .or_else(|| (registered_mask & (1 << i) != 0).then(|| 100 + i as i64));
        match expected {
            Some(value) => assert_eq!(first.value::<i64>(name).unwrap(), value),
            None => assert!(!first.contains(name)),
        }
    }

    let func = signature.bind(|_ctx, args| Ok(args.len()));
    let mut ctx = TransactionContext::with_registry(registry);
    match ctx.call_as::<usize, _>(&func, overrides) {
        Ok(bound) => {
            assert!(given <= param_count);
            assert_eq!(*bound, first.len());
        }
        Err(DiError::TooManyArguments { expected, given: g, .. }) => {
            assert_eq!(expected, param_count);
            assert_eq!(g, given);
            assert!(given > param_count);
        }
        Err(other) => panic!("unexpected error: {}", other),
    }
});
