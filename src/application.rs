//! Application root: base registry plus the hooks, middleware and observers
//! copied into every transaction context.

use std::any::Any;
use std::sync::Arc;

use crate::args::Args;
use crate::context::{Next, Pipeline, TransactionContext};
use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::observer::TransactionObserver;
use crate::registry::DependencyRegistry;
use crate::traits::{EnterHook, ExitHook, Middleware};
use crate::value::Value;

#[cfg(feature = "config")]
use crate::config::ConfigProvider;

/// Long-lived application root.
///
/// Holds the base [`DependencyRegistry`] and the callables attached to every
/// [`TransactionContext`] it creates. Registration takes `&mut self`, so all
/// of it happens before the application is shared between threads. A
/// context keeps the hooks and middleware that were registered when it was
/// created.
///
/// # Examples
///
/// ```rust
/// use modular_di::{Application, Args, Signature};
/// use std::sync::Arc;
///
/// struct Database {
///     url: String,
/// }
///
/// let db = Arc::new(Database { url: "sqlite://memory".to_string() });
/// let mut app = Application::new(Args::new().arg_arc(db.clone())).unwrap();
///
/// app.on_enter_transaction_context(|ctx| {
///     ctx.state_mut().insert("entered", true);
///     Ok(())
/// })
/// .transaction_middleware(|ctx, next| {
///     ctx.state_mut().insert("wrapped", true);
///     next.run(ctx)
/// });
///
/// let query = Signature::new("query")
///     .param::<Database>("db")
///     .untyped("table")
///     .bind(|_ctx, args| {
///         let db = args.required::<Database>("db")?;
///         let table = args.value::<String>("table")?;
///         Ok(format!("{}/{}", db.url, table))
///     });
///
/// let location = app
///     .transaction(Args::new().kwarg("table", "users".to_string()), |ctx| {
///         assert!(ctx.state().flag("entered"));
///         ctx.call_as::<String, _>(&query, Args::new())
///     })
///     .unwrap();
///
/// assert_eq!(location.as_str(), "sqlite://memory/users");
/// ```
#[derive(Clone, Default)]
pub struct Application {
    registry: DependencyRegistry,
    pipeline: Arc<Pipeline>,
}

impl Application {
    /// Creates an application whose base registry is built from `args`.
    ///
    /// Fails with [`DiError::InvalidArgument`] if a positional value is a
    /// primitive.
    pub fn new(args: Args) -> DiResult<Self> {
        Ok(Self {
            registry: DependencyRegistry::new(args)?,
            pipeline: Arc::new(Pipeline::default()),
        })
    }

    /// Creates an application whose base registry holds every entry of
    /// `provider` as a named value.
    #[cfg(feature = "config")]
    pub fn from_config(provider: &ConfigProvider) -> DiResult<Self> {
        Self::new(provider.to_args())
    }

    pub fn registry(&self) -> &DependencyRegistry {
        &self.registry
    }

    /// Keyed lookup in the base registry.
    pub fn get(&self, key: impl Into<Key>) -> DiResult<Value> {
        self.registry.get(key)
    }

    /// Typed lookup by type in the base registry.
    pub fn resolve<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.registry.resolve::<T>()
    }

    /// Creates a transaction context.
    ///
    /// The context gets a copy of the base registry with `kwargs` layered on
    /// top, so the base registry is never modified. Instances are shared,
    /// not copied.
    pub fn transaction_context(&self, kwargs: Args) -> DiResult<TransactionContext> {
        let registry = self.registry.layered(kwargs)?;
        Ok(TransactionContext::from_parts(registry, Arc::clone(&self.pipeline)))
    }

    /// Creates a transaction context and runs `body` inside its scope.
    pub fn transaction<T, B>(&self, kwargs: Args, body: B) -> DiResult<T>
    where
        B: FnOnce(&mut TransactionContext) -> DiResult<T>,
    {
        self.transaction_context(kwargs)?.scope(body)
    }

    // ----- Closure registration -----

    /// Registers a closure run when a context is entered.
    pub fn on_enter_transaction_context<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut TransactionContext) -> DiResult<()> + Send + Sync + 'static,
    {
        self.add_enter_hook(hook)
    }

    /// Registers a closure run when a context is exited.
    pub fn on_exit_transaction_context<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut TransactionContext, Option<&DiError>) -> DiResult<()> + Send + Sync + 'static,
    {
        self.add_exit_hook(hook)
    }

    /// Registers a closure as the innermost middleware so far.
    pub fn transaction_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut TransactionContext, Next<'_>) -> DiResult<Value> + Send + Sync + 'static,
    {
        self.add_middleware(middleware)
    }

    // ----- Trait-object registration -----

    pub fn add_enter_hook<H: EnterHook + 'static>(&mut self, hook: H) -> &mut Self {
        Arc::make_mut(&mut self.pipeline).enter_hooks.push(Arc::new(hook));
        self
    }

    pub fn add_exit_hook<H: ExitHook + 'static>(&mut self, hook: H) -> &mut Self {
        Arc::make_mut(&mut self.pipeline).exit_hooks.push(Arc::new(hook));
        self
    }

    pub fn add_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        Arc::make_mut(&mut self.pipeline).middleware.push(Arc::new(middleware));
        self
    }

    /// Adds an observer for transactions created from now on.
    pub fn add_observer(&mut self, observer: Arc<dyn TransactionObserver>) -> &mut Self {
        Arc::make_mut(&mut self.pipeline).observers.add(observer);
        self
    }

    pub fn enter_hook_count(&self) -> usize {
        self.pipeline.enter_hooks.len()
    }

    pub fn exit_hook_count(&self) -> usize {
        self.pipeline.exit_hooks.len()
    }

    pub fn middleware_count(&self) -> usize {
        self.pipeline.middleware.len()
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("registry", &self.registry)
            .field("enter_hooks", &self.pipeline.enter_hooks.len())
            .field("exit_hooks", &self.pipeline.exit_hooks.len())
            .field("middleware", &self.pipeline.middleware.len())
            .finish()
    }
}
