use modular_di::{parameters, Annotation, Args, DependencyRegistry, DiError, Key, Signature, Value};
use std::sync::Arc;

#[derive(Debug)]
struct FooService;

fn foo() -> Signature {
    Signature::new("foo")
        .param::<i64>("a")
        .param::<String>("b")
        .param::<FooService>("c")
}

#[test]
fn test_create_registry_with_types() {
    let foo_service = Arc::new(FooService);
    let registry =
        DependencyRegistry::new(Args::new().kwarg_arc("foo_service", foo_service.clone())).unwrap();

    assert!(registry.get(Key::of::<FooService>()).unwrap().is_same(&foo_service));
    assert!(registry.get("foo_service").unwrap().is_same(&foo_service));
}

#[test]
fn test_create_registry_with_primitive_arg_fails() {
    match DependencyRegistry::new(Args::new().arg(1i32)) {
        Err(DiError::InvalidArgument(type_name)) => assert_eq!(type_name, "i32"),
        other => panic!("expected invalid argument, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_every_primitive_rejected_positionally() {
    let primitives = vec![
        Value::new(true),
        Value::new('c'),
        Value::new(1u8),
        Value::new(1i128),
        Value::new(1usize),
        Value::new(1.5f32),
        Value::new(2.5f64),
        Value::new("str"),
        Value::new(String::from("string")),
        Value::unit(),
    ];

    for value in primitives {
        let type_name = value.type_name();
        let result = DependencyRegistry::new(Args::new().arg_value(value));
        assert!(
            matches!(result, Err(DiError::InvalidArgument(_))),
            "{} should be rejected",
            type_name
        );
    }
}

#[test]
fn test_create_registry_with_primitive_kwarg() {
    let registry = DependencyRegistry::new(Args::new().kwarg("x", 1i64)).unwrap();
    assert_eq!(registry.get("x").unwrap().downcast_ref::<i64>(), Some(&1));
}

#[test]
fn test_create_registry_with_class_instance_arg() {
    let service = Arc::new(FooService);
    let registry = DependencyRegistry::new(Args::new().arg_arc(service.clone())).unwrap();
    assert!(Arc::ptr_eq(&registry.resolve::<FooService>().unwrap(), &service));
}

#[test]
fn test_create_registry_with_class_instance_kwarg() {
    let service = Arc::new(FooService);
    let registry =
        DependencyRegistry::new(Args::new().kwarg_arc("service", service.clone())).unwrap();
    assert!(Arc::ptr_eq(&registry.resolve::<FooService>().unwrap(), &service));
    assert!(Arc::ptr_eq(&registry.named::<FooService>("service").unwrap(), &service));
}

#[test]
fn test_class_instance_arg_overridden_by_kwarg() {
    let service1 = Arc::new(FooService);
    let service2 = Arc::new(FooService);
    let registry = DependencyRegistry::new(
        Args::new().arg_arc(service1.clone()).kwarg_arc("service", service2.clone()),
    )
    .unwrap();

    let by_type = registry.resolve::<FooService>().unwrap();
    assert!(Arc::ptr_eq(&by_type, &service2));
    assert!(!Arc::ptr_eq(&by_type, &service1));
    assert!(Arc::ptr_eq(&registry.named::<FooService>("service").unwrap(), &service2));
}

#[test]
fn test_most_recent_named_registration_wins_type() {
    let first = Arc::new(FooService);
    let second = Arc::new(FooService);
    let registry = DependencyRegistry::new(
        Args::new().kwarg_arc("first", first.clone()).kwarg_arc("second", second.clone()),
    )
    .unwrap();

    assert!(Arc::ptr_eq(&registry.resolve::<FooService>().unwrap(), &second));
    assert!(Arc::ptr_eq(&registry.named::<FooService>("first").unwrap(), &first));
}

#[test]
fn test_get_function_parameters() {
    let func = foo().bind(|_ctx, _args| Ok(()));
    let params = parameters(&func);

    let names: Vec<_> = params.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(params[0].1, Annotation::of::<i64>());
    assert_eq!(params[1].1, Annotation::of::<String>());
    assert_eq!(params[2].1, Annotation::of::<FooService>());
}

#[test]
fn test_get_function_parameters_empty() {
    let func = Signature::new("noop").bind(|_ctx, _args| Ok(()));
    assert!(parameters(&func).is_empty());
}

#[test]
fn test_resolve_params_when_empty() {
    let func = foo().bind(|_ctx, _args| Ok(()));
    let args = DependencyRegistry::empty().resolve_params(&func, &Args::new());
    assert!(args.is_empty());
}

#[test]
fn test_resolve_params_by_name() {
    let func = foo().bind(|_ctx, _args| Ok(()));
    let overrides = Args::new().kwarg("a", 1i64).kwarg("b", "2".to_string());
    let registry = DependencyRegistry::new(overrides).unwrap();
    let args = registry.resolve_params(&func, &Args::new());

    assert_eq!(args.names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(args.value::<i64>("a").unwrap(), 1);
    assert_eq!(args.value::<String>("b").unwrap(), "2");
}

#[test]
fn test_resolve_params_with_func_args() {
    let func = foo().bind(|_ctx, _args| Ok(()));
    let args = DependencyRegistry::empty().resolve_params(&func, &Args::new().arg(10i64));

    assert_eq!(args.len(), 1);
    assert_eq!(args.value::<i64>("a").unwrap(), 10);
}

#[test]
fn test_resolve_params_with_func_kwargs() {
    let func = foo().bind(|_ctx, _args| Ok(()));
    let args = DependencyRegistry::empty().resolve_params(&func, &Args::new().kwarg("a", 10i64));

    assert_eq!(args.len(), 1);
    assert_eq!(args.value::<i64>("a").unwrap(), 10);
}

#[test]
fn test_resolve_arguments_by_type() {
    let func = foo().bind(|_ctx, _args| Ok(()));
    let service = Arc::new(FooService);
    let registry = DependencyRegistry::new(Args::new().arg_arc(service.clone())).unwrap();
    let args = registry.resolve_params(&func, &Args::new());

    assert_eq!(args.names().collect::<Vec<_>>(), vec!["c"]);
    assert!(Arc::ptr_eq(&args.required::<FooService>("c").unwrap(), &service));
}

#[test]
fn test_resolve_arguments_without_annotations() {
    let bar = Signature::new("bar").untyped("a").bind(|_ctx, _args| Ok(()));
    let registry = DependencyRegistry::new(Args::new().kwarg("a", 1i64)).unwrap();
    let args = registry.resolve_params(&bar, &Args::new());

    assert_eq!(args.value::<i64>("a").unwrap(), 1);
}

#[test]
fn test_untyped_parameter_never_resolved_by_type() {
    let bar = Signature::new("bar").untyped("service").bind(|_ctx, _args| Ok(()));
    let registry = DependencyRegistry::new(Args::new().arg(FooService)).unwrap();
    let args = registry.resolve_params(&bar, &Args::new());

    assert!(args.is_empty());
}

#[test]
fn test_keyed_lookup_dispatch() {
    let registry =
        DependencyRegistry::new(Args::new().arg(FooService).kwarg("port", 8080u16)).unwrap();

    assert!(registry.get(Key::of::<FooService>()).unwrap().is::<FooService>());
    assert!(registry.get(String::from("port")).unwrap().is::<u16>());
    assert!(matches!(registry.get("missing"), Err(DiError::NotFound(Key::Name(_)))));
    assert!(matches!(registry.get(Key::of::<u16>()), Err(DiError::NotFound(Key::Type(..)))));
}
