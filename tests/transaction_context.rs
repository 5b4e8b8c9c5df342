use modular_di::{
    Application, Args, DependencyRegistry, DiError, Injectable, Phase, Signature,
    TransactionContext,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

fn add() -> impl Injectable {
    Signature::new("add")
        .untyped("a")
        .untyped("b")
        .bind(|_ctx, args| Ok(args.value::<i64>("a")? + args.value::<i64>("b")?))
}

fn context_with(args: Args) -> TransactionContext {
    TransactionContext::with_registry(DependencyRegistry::new(args).unwrap())
}

#[test]
fn test_call_with_kwargs() {
    let mut ctx = TransactionContext::new();
    let sum = ctx
        .call_as::<i64, _>(&add(), Args::new().kwarg("a", 1i64).kwarg("b", 2i64))
        .unwrap();
    assert_eq!(*sum, 3);
}

#[test]
fn test_call_with_args() {
    let mut ctx = TransactionContext::new();
    let sum = ctx.call_as::<i64, _>(&add(), Args::new().arg(1i64).arg(2i64)).unwrap();
    assert_eq!(*sum, 3);
}

#[test]
fn test_call_with_dependencies() {
    let mut ctx = context_with(Args::new().kwarg("a", 1i64).kwarg("b", 2i64));
    let sum = ctx.call_as::<i64, _>(&add(), Args::new()).unwrap();
    assert_eq!(*sum, 3);
}

#[test]
fn test_call_with_arg_and_dependency() {
    let mut ctx = context_with(Args::new().kwarg("a", 10i64).kwarg("b", 20i64));
    let sum = ctx.call_as::<i64, _>(&add(), Args::new().arg(1i64)).unwrap();
    assert_eq!(*sum, 21);
}

#[test]
fn test_call_with_kwarg_and_dependency() {
    let mut ctx = context_with(Args::new().kwarg("a", 10i64).kwarg("b", 20i64));
    let sum = ctx.call_as::<i64, _>(&add(), Args::new().kwarg("b", 2i64)).unwrap();
    assert_eq!(*sum, 12);
}

#[test]
fn test_call_as_wrong_type() {
    let mut ctx = TransactionContext::new();
    let result = ctx.call_as::<String, _>(&add(), Args::new().arg(1i64).arg(2i64));
    assert!(matches!(result, Err(DiError::TypeMismatch(_))));
}

#[test]
fn test_function_receives_live_context() {
    let record = Signature::new("record").untyped("item").bind(|ctx, args| {
        let item = args.value::<String>("item")?;
        ctx.state_mut().insert("last", item.clone());
        ctx.insert("recorded", modular_di::Value::new(item));
        Ok(())
    });

    let mut ctx = TransactionContext::new();
    ctx.call(&record, Args::new().arg("apple".to_string())).unwrap();

    assert_eq!(ctx.state().get::<String>("last").map(String::as_str), Some("apple"));
    assert_eq!(ctx.named::<String>("recorded").unwrap().as_str(), "apple");
}

#[test]
fn test_nested_calls_run_through_pipeline() {
    let depth = Arc::new(Mutex::new(0usize));
    let mut app = Application::default();
    let d = depth.clone();
    app.transaction_middleware(move |ctx, next| {
        *d.lock().unwrap() += 1;
        next.run(ctx)
    });

    let inner = Arc::new(add());
    let outer_inner = inner.clone();
    let outer = Signature::new("outer").bind(move |ctx, _args| {
        let sum = ctx.call_as::<i64, _>(&outer_inner, Args::new().arg(2i64).arg(3i64))?;
        Ok(*sum * 10)
    });

    let mut ctx = app.transaction_context(Args::new()).unwrap();
    assert_eq!(*ctx.call_as::<i64, _>(&outer, Args::new()).unwrap(), 50);
    assert_eq!(*depth.lock().unwrap(), 2);
}

#[test]
fn test_scope_runs_hooks_once() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut app = Application::default();
    let c = calls.clone();
    app.on_enter_transaction_context(move |_ctx| {
        c.lock().unwrap().push("enter");
        Ok(())
    });
    let c = calls.clone();
    app.on_exit_transaction_context(move |_ctx, error| {
        assert!(error.is_none());
        c.lock().unwrap().push("exit");
        Ok(())
    });

    let mut ctx = app.transaction_context(Args::new()).unwrap();
    assert_eq!(ctx.phase(), Phase::Created);
    let value = ctx.scope(|ctx| {
        assert_eq!(ctx.phase(), Phase::Entered);
        Ok("done")
    });

    assert_eq!(value.unwrap(), "done");
    assert_eq!(ctx.phase(), Phase::Exited);
    assert_eq!(*calls.lock().unwrap(), vec!["enter", "exit"]);

    // A context is entered once
    assert!(matches!(ctx.scope(|_ctx| Ok(())), Err(DiError::ScopeState(_))));
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[test]
fn test_failing_enter_hook_aborts_entry() {
    let exited = Arc::new(Mutex::new(false));
    let second_enter = Arc::new(Mutex::new(false));
    let mut app = Application::default();

    app.on_enter_transaction_context(|_ctx| Err(DiError::user("not allowed")));
    let s = second_enter.clone();
    app.on_enter_transaction_context(move |_ctx| {
        *s.lock().unwrap() = true;
        Ok(())
    });
    let e = exited.clone();
    app.on_exit_transaction_context(move |_ctx, _error| {
        *e.lock().unwrap() = true;
        Ok(())
    });

    let body_ran = Arc::new(Mutex::new(false));
    let b = body_ran.clone();
    let mut ctx = app.transaction_context(Args::new()).unwrap();
    let result = ctx.scope(|_ctx| {
        *b.lock().unwrap() = true;
        Ok(())
    });

    assert_eq!(result.unwrap_err().to_string(), "not allowed");
    assert_eq!(ctx.phase(), Phase::Exited);
    assert!(!*body_ran.lock().unwrap());
    assert!(!*second_enter.lock().unwrap());
    assert!(!*exited.lock().unwrap());
}

#[test]
fn test_exit_hook_error_after_success() {
    let ran = Arc::new(Mutex::new(Vec::new()));
    let mut app = Application::default();
    let r = ran.clone();
    app.on_exit_transaction_context(move |_ctx, _error| {
        r.lock().unwrap().push(1);
        Err(DiError::user("first hook failed"))
    });
    let r = ran.clone();
    app.on_exit_transaction_context(move |_ctx, _error| {
        r.lock().unwrap().push(2);
        Err(DiError::user("second hook failed"))
    });

    let result = app.transaction(Args::new(), |_ctx| Ok(()));
    assert_eq!(result.unwrap_err().to_string(), "first hook failed");
    assert_eq!(*ran.lock().unwrap(), vec![1, 2]);
}

#[test]
fn test_block_error_wins_over_exit_hook_error() {
    let mut app = Application::default();
    app.on_exit_transaction_context(|_ctx, _error| Err(DiError::user("hook failed")));

    let result: Result<(), _> =
        app.transaction(Args::new(), |_ctx| Err(DiError::user("block failed")));
    assert_eq!(result.unwrap_err().to_string(), "block failed");
}

#[test]
fn test_manual_enter_exit() {
    let mut ctx = TransactionContext::new();
    ctx.enter().unwrap();
    let sum = ctx.call_as::<i64, _>(&add(), Args::new().arg(4i64).arg(5i64));
    let sum = ctx.exit(sum).unwrap();
    assert_eq!(*sum, 9);
    assert!(matches!(ctx.exit(Ok(())), Err(DiError::ScopeState(_))));
}

#[test]
fn test_panic_reaches_exit_hooks_then_resumes() {
    let seen = Arc::new(Mutex::new(None));
    let mut app = Application::default();
    let s = seen.clone();
    app.on_exit_transaction_context(move |_ctx, error| {
        *s.lock().unwrap() = error.cloned();
        Ok(())
    });

    let explode = Signature::new("explode").bind(|_ctx, _args| -> Result<(), DiError> {
        panic!("kaboom");
    });

    let mut ctx = app.transaction_context(Args::new()).unwrap();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        ctx.scope(|ctx| ctx.call(&explode, Args::new()))
    }));

    assert!(outcome.is_err());
    assert_eq!(ctx.phase(), Phase::Exited);
    match seen.lock().unwrap().take() {
        Some(DiError::Panicked(message)) => assert_eq!(message, "kaboom"),
        other => panic!("expected panic error, got {:?}", other),
    };
}
