#![no_main]

use libfuzzer_sys::fuzz_target;
use modular_di::{Application, Args, DiError, Signature, Value};
use std::sync::{Arc, Mutex};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut app = Application::default();

    // One middleware per byte: pass through, short-circuit or fail
    let layers: Vec<u8> = data.iter().take(8).map(|b| b % 4).collect();
    for (index, action) in layers.iter().copied().enumerate() {
        let log = log.clone();
        app.transaction_middleware(move |ctx, next| {
            log.lock().unwrap().push(index);
            match action {
                0 => Ok(Value::new(index)),
                1 => Err(DiError::user(format!("layer {}", index))),
                _ => next.run(ctx),
            }
        });
    }

    let exit_calls = Arc::new(Mutex::new(0usize));
    let e = exit_calls.clone();
    app.on_exit_transaction_context(move |_ctx, _error| {
        *e.lock().unwrap() += 1;
        Ok(())
    });

    let target = Signature::new("target").bind(|_ctx, _args| Ok(usize::MAX));
    let result = app.transaction(Args::new(), |ctx| ctx.call_as::<usize, _>(&target, Args::new()));

    // Layers run in registration order up to the first one that stops
    let stop = layers.iter().position(|action| *action < 2);
    let expected_log: Vec<usize> = match stop {
        Some(stop) => (0..=stop).collect(),
        None => (0..layers.len()).collect(),
    };
    assert_eq!(*log.lock().unwrap(), expected_log);
    assert_eq!(*exit_calls.lock().unwrap(), 1);

    match (stop.map(|i| (i, layers[i])), result) {
        (None, Ok(value)) => assert_eq!(*value, usize::MAX),
        (Some((index, 0)), Ok(value)) => assert_eq!(*value, index),
        (Some((index, 1)), Err(error)) => {
            assert_eq!(error.to_string(), format!("layer {}", index))
        }
        (expected, outcome) => {
            panic!("unexpected outcome {:?} for {:?}", outcome.map(|v| *v), expected)
        }
    }
});
