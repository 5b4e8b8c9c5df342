use modular_di::{
    Application, Args, DependencyRegistry, DiError, Key, Signature, TransactionContext,
};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct Foo;

fn add() -> impl modular_di::Injectable {
    Signature::new("add")
        .untyped("a")
        .untyped("b")
        .bind(|_ctx, args| Ok(args.value::<i64>("a")? + args.value::<i64>("b")?))
}

#[test]
fn test_positional_instance_indexed_by_type() {
    let foo = Arc::new(Foo);
    let registry = DependencyRegistry::new(Args::new().arg_arc(foo.clone())).unwrap();

    let resolved = registry.resolve::<Foo>().unwrap();
    assert!(Arc::ptr_eq(&resolved, &foo)); // Same instance
}

#[test]
fn test_named_primitive_not_indexed_by_type() {
    let registry = DependencyRegistry::new(Args::new().kwarg("x", 1i64)).unwrap();

    assert_eq!(*registry.named::<i64>("x").unwrap(), 1);
    match registry.get(Key::of::<i64>()) {
        Err(DiError::NotFound(key)) => assert_eq!(key, Key::of::<i64>()),
        other => panic!("expected not found, got {:?}", other),
    }
}

#[test]
fn test_primitive_positional_fails() {
    let result = DependencyRegistry::new(Args::new().arg("hello".to_string()));
    assert!(matches!(result, Err(DiError::InvalidArgument(_))));
}

#[test]
fn test_add_with_named_overrides() {
    let mut ctx = TransactionContext::new();
    let sum = ctx
        .call_as::<i64, _>(&add(), Args::new().kwarg("a", 1i64).kwarg("b", 2i64))
        .unwrap();
    assert_eq!(*sum, 3);
}

#[test]
fn test_add_with_positional_overrides() {
    let mut ctx = TransactionContext::new();
    let sum = ctx
        .call_as::<i64, _>(&add(), Args::new().arg(1i64).arg(2i64))
        .unwrap();
    assert_eq!(*sum, 3);
}

#[test]
fn test_add_positional_and_registry() {
    let app = Application::default();
    let mut ctx = app
        .transaction_context(Args::new().kwarg("a", 10i64).kwarg("b", 20i64))
        .unwrap();

    let sum = ctx.call_as::<i64, _>(&add(), Args::new().arg(1i64)).unwrap();
    assert_eq!(*sum, 21);
}

#[test]
fn test_missing_argument_fails_at_call_time() {
    let mut ctx = TransactionContext::new();
    let error = ctx.call(&add(), Args::new().arg(1i64)).unwrap_err();
    assert_eq!(error.to_string(), "add() missing required argument: 'b'");
}

#[test]
fn test_context_registry_is_distinct_but_shares_instances() {
    let foo = Arc::new(Foo);
    let app = Application::new(Args::new().arg_arc(foo.clone())).unwrap();
    let mut ctx = app.transaction_context(Args::new()).unwrap();

    assert!(!std::ptr::eq(ctx.registry(), app.registry()));
    assert!(Arc::ptr_eq(&ctx.resolve::<Foo>().unwrap(), &app.resolve::<Foo>().unwrap()));

    ctx.insert("late", modular_di::Value::new(Foo));
    assert!(ctx.get("late").is_ok());
    assert!(app.get("late").is_err());
}

#[test]
fn test_exit_hooks_see_error_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut app = Application::default();

    for name in ["first", "second"] {
        let seen = seen.clone();
        app.on_exit_transaction_context(move |_ctx, error| {
            seen.lock()
                .unwrap()
                .push((name, error.map(|e| e.to_string())));
            Ok(())
        });
    }

    let fail = Signature::new("fail").bind(|_ctx, _args| -> Result<(), DiError> {
        Err(DiError::user("E"))
    });

    let result = app.transaction(Args::new(), |ctx| ctx.call(&fail, Args::new()));
    assert_eq!(result.unwrap_err().to_string(), "E");
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("first", Some("E".to_string())), ("second", Some("E".to_string()))]
    );
}

#[test]
fn test_middleware_pre_and_post_order() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut app = Application::default();

    for name in ["M1", "M2"] {
        let buffer = buffer.clone();
        app.transaction_middleware(move |ctx, next| {
            buffer.lock().unwrap().push(format!("{}-pre", name));
            let result = next.run(ctx);
            buffer.lock().unwrap().push(format!("{}-post", name));
            result
        });
    }

    let b = buffer.clone();
    let target = Signature::new("F").bind(move |_ctx, _args| {
        b.lock().unwrap().push("F".to_string());
        Ok(())
    });

    let mut ctx = app.transaction_context(Args::new()).unwrap();
    ctx.call(&target, Args::new()).unwrap();

    assert_eq!(
        *buffer.lock().unwrap(),
        vec!["M1-pre", "M2-pre", "F", "M2-post", "M1-post"]
    );
}
