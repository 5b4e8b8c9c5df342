//! Middleware wrapping every call made through a transaction context.

use crate::context::{Next, TransactionContext};
use crate::error::DiResult;
use crate::value::Value;

/// A layer around [`TransactionContext::call`].
///
/// A middleware receives the context and the continuation to the rest of the
/// chain. Whatever it returns is what the layer above it sees: the value from
/// `next.run(ctx)`, a substitute, or an error. Not calling `next` skips every
/// layer below it, the target function included.
///
/// Closures of the right shape implement this trait, so most middleware is
/// registered with
/// [`Application::transaction_middleware`](crate::Application::transaction_middleware).
///
/// # Examples
///
/// ```rust
/// use modular_di::{Args, DiResult, Middleware, Next, Signature, TransactionContext, Value};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct CountCalls(AtomicUsize);
///
/// impl Middleware for CountCalls {
///     fn handle(&self, ctx: &mut TransactionContext, next: Next<'_>) -> DiResult<Value> {
///         self.0.fetch_add(1, Ordering::SeqCst);
///         next.run(ctx)
///     }
/// }
///
/// let mut app = modular_di::Application::default();
/// app.add_middleware(CountCalls(AtomicUsize::new(0)));
///
/// let ping = Signature::new("ping").bind(|_ctx, _args| Ok("pong"));
/// let mut ctx = app.transaction_context(Args::new()).unwrap();
/// let reply = ctx.call_as::<&str, _>(&ping, Args::new()).unwrap();
/// assert_eq!(*reply, "pong");
/// ```
pub trait Middleware: Send + Sync {
    fn handle(&self, ctx: &mut TransactionContext, next: Next<'_>) -> DiResult<Value>;
}

impl<F> Middleware for F
where
    F: Fn(&mut TransactionContext, Next<'_>) -> DiResult<Value> + Send + Sync,
{
    fn handle(&self, ctx: &mut TransactionContext, next: Next<'_>) -> DiResult<Value> {
        self(ctx, next)
    }
}
