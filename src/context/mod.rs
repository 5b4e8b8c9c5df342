//! Transaction contexts: per-operation registry, state and call pipeline.
//!
//! A [`TransactionContext`] owns the registry a call resolves against, a
//! [`StateBag`] for ad hoc data, and the hooks and middleware its
//! application had when the context was created.

mod pipeline;
mod state;

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::args::Args;
use crate::error::{DiError, DiResult};
use crate::internal::panic_message;
use crate::key::Key;
use crate::registry::DependencyRegistry;
use crate::resolver::{self, Arguments};
use crate::traits::Injectable;
use crate::value::Value;

pub use pipeline::Next;
pub(crate) use pipeline::Pipeline;
pub use state::StateBag;

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique transaction identifier, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl TransactionId {
    pub(crate) fn next() -> Self {
        TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn-{}", self.0)
    }
}

/// Where a context is in its enter/exit protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, not yet entered
    Created,
    /// Entered; calls are guarded by the exit hooks
    Entered,
    /// Exited, or entry was aborted by an enter hook
    Exited,
}

/// Mutable scope for one logical operation.
///
/// # Lifecycle
///
/// Contexts are usually created by
/// [`Application::transaction_context`](crate::Application::transaction_context)
/// and used as a scoped resource through [`scope`](Self::scope): enter hooks
/// run on entry, exit hooks run on exit whether or not the guarded block
/// failed, and the block's error is returned after every exit hook saw it.
/// A context is entered and exited once.
///
/// # Examples
///
/// ```
/// use modular_di::{Args, DependencyRegistry, Signature, TransactionContext};
///
/// let add = Signature::new("add")
///     .untyped("a")
///     .untyped("b")
///     .bind(|_ctx, args| Ok(args.value::<i64>("a")? + args.value::<i64>("b")?));
///
/// let registry =
///     DependencyRegistry::new(Args::new().kwarg("a", 10i64).kwarg("b", 20i64)).unwrap();
/// let mut ctx = TransactionContext::with_registry(registry);
///
/// // `a` comes from the positional override, `b` from the registry
/// let sum = ctx.call_as::<i64, _>(&add, Args::new().arg(1i64)).unwrap();
/// assert_eq!(*sum, 21);
/// ```
pub struct TransactionContext {
    id: TransactionId,
    registry: DependencyRegistry,
    state: StateBag,
    pipeline: Arc<Pipeline>,
    phase: Phase,
    entered_at: Option<Instant>,
}

impl TransactionContext {
    /// A context with an empty registry and no hooks or middleware.
    pub fn new() -> Self {
        Self::with_registry(DependencyRegistry::empty())
    }

    /// A context resolving against `registry`, with no hooks or middleware.
    pub fn with_registry(registry: DependencyRegistry) -> Self {
        Self::from_parts(registry, Arc::new(Pipeline::default()))
    }

    pub(crate) fn from_parts(registry: DependencyRegistry, pipeline: Arc<Pipeline>) -> Self {
        Self {
            id: TransactionId::next(),
            registry,
            state: StateBag::new(),
            pipeline,
            phase: Phase::Created,
            entered_at: None,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    // ----- Registry access -----

    pub fn registry(&self) -> &DependencyRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DependencyRegistry {
        &mut self.registry
    }

    /// Keyed lookup in this context's registry.
    pub fn get(&self, key: impl Into<Key>) -> DiResult<Value> {
        self.registry.get(key)
    }

    /// Typed lookup by type in this context's registry.
    pub fn resolve<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.registry.resolve::<T>()
    }

    /// Typed lookup by name in this context's registry.
    pub fn named<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        self.registry.named::<T>(name)
    }

    /// Registers `value` under `name` for the rest of this transaction.
    ///
    /// Object instances are also indexed by type. The application registry
    /// is not affected.
    pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, value: Value) {
        self.registry.insert(name, value);
    }

    // ----- Ad hoc state -----

    pub fn state(&self) -> &StateBag {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateBag {
        &mut self.state
    }

    // ----- Call pipeline -----

    /// Resolves the arguments of `func` and calls it through the middleware
    /// chain.
    ///
    /// The first registered middleware is the outermost layer. Errors from
    /// the function or any middleware are returned as they are.
    pub fn call<F>(&mut self, func: &F, overrides: Args) -> DiResult<Value>
    where
        F: Injectable + ?Sized,
    {
        let signature = func.signature();
        let given = overrides.positional().len();
        if given > signature.len() {
            return Err(DiError::TooManyArguments {
                function: signature.name().to_string(),
                expected: signature.len(),
                given,
            });
        }

        let arguments: Arguments = resolver::resolve(signature, &self.registry, &overrides);
        let pipeline = Arc::clone(&self.pipeline);
        let endpoint = |ctx: &mut TransactionContext| func.invoke(ctx, &arguments);

        if !pipeline.observers.has_observers() {
            return Next::new(&pipeline.middleware, &endpoint).run(self);
        }

        pipeline.observers.calling(self.id, signature.name());
        let started = Instant::now();
        let result = Next::new(&pipeline.middleware, &endpoint).run(self);
        pipeline
            .observers
            .called(self.id, signature.name(), started.elapsed(), result.as_ref().err());
        result
    }

    /// Like [`call`](Self::call), downcasting the result to `T`.
    pub fn call_as<T, F>(&mut self, func: &F, overrides: Args) -> DiResult<Arc<T>>
    where
        T: Any + Send + Sync,
        F: Injectable + ?Sized,
    {
        self.call(func, overrides)?.downcast::<T>()
    }

    // ----- Scoped-resource protocol -----

    /// Enters the context, running every enter hook in registration order.
    ///
    /// The first failing hook aborts entry: the remaining enter hooks and all
    /// exit hooks are skipped, and the context is marked exited.
    pub fn enter(&mut self) -> DiResult<()> {
        if self.phase != Phase::Created {
            return Err(DiError::ScopeState("transaction context can only be entered once"));
        }
        self.phase = Phase::Entered;
        self.entered_at = Some(Instant::now());

        let pipeline = Arc::clone(&self.pipeline);
        pipeline.observers.entered(self.id);
        for hook in &pipeline.enter_hooks {
            if let Err(error) = hook.on_enter(self) {
                self.phase = Phase::Exited;
                pipeline.observers.exited(self.id, self.elapsed(), Some(&error));
                return Err(error);
            }
        }
        Ok(())
    }

    /// Exits the context with the outcome of the guarded block.
    ///
    /// Every exit hook runs in registration order and sees the block's
    /// error, if any. A failed block's error is returned unchanged;
    /// otherwise the first exit-hook error, if any, is returned.
    pub fn exit<T>(&mut self, outcome: DiResult<T>) -> DiResult<T> {
        if self.phase != Phase::Entered {
            return Err(DiError::ScopeState("transaction context was not entered"));
        }
        self.phase = Phase::Exited;

        let pipeline = Arc::clone(&self.pipeline);
        let error = outcome.as_ref().err();
        let mut hook_error = None;
        for hook in &pipeline.exit_hooks {
            if let Err(e) = hook.on_exit(self, error) {
                hook_error.get_or_insert(e);
            }
        }
        pipeline
            .observers
            .exited(self.id, self.elapsed(), error.or(hook_error.as_ref()));

        match (outcome, hook_error) {
            (Err(error), _) => Err(error),
            (Ok(_), Some(error)) => Err(error),
            (Ok(value), None) => Ok(value),
        }
    }

    /// Runs `body` with this context entered, exiting afterwards.
    ///
    /// A panic inside `body` also runs the exit hooks, with
    /// [`DiError::Panicked`], before unwinding continues.
    ///
    /// # Examples
    ///
    /// ```
    /// use modular_di::{Application, Args, DiError, Signature};
    ///
    /// let mut app = Application::default();
    /// app.on_exit_transaction_context(|ctx, error| {
    ///     ctx.state_mut().insert("failed", error.is_some());
    ///     Ok(())
    /// });
    ///
    /// let fail = Signature::new("fail").bind(|_ctx, _args| -> Result<(), DiError> {
    ///     Err(DiError::user("boom"))
    /// });
    ///
    /// let mut ctx = app.transaction_context(Args::new()).unwrap();
    /// let result = ctx.scope(|ctx| ctx.call(&fail, Args::new()));
    ///
    /// assert_eq!(result.unwrap_err().to_string(), "boom");
    /// assert!(ctx.state().flag("failed"));
    /// ```
    pub fn scope<T, B>(&mut self, body: B) -> DiResult<T>
    where
        B: FnOnce(&mut TransactionContext) -> DiResult<T>,
    {
        self.enter()?;
        match panic::catch_unwind(AssertUnwindSafe(|| body(self))) {
            Ok(outcome) => self.exit(outcome),
            Err(payload) => {
                let error = DiError::Panicked(panic_message(&*payload));
                let _ = self.exit::<()>(Err(error));
                panic::resume_unwind(payload)
            }
        }
    }

    /// Time since the context was entered.
    pub fn elapsed(&self) -> Duration {
        self.entered_at
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }
}

impl Default for TransactionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionContext")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("registry", &self.registry)
            .field("state", &self.state)
            .field("middleware", &self.pipeline.middleware.len())
            .finish()
    }
}
