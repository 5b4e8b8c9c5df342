//! Lifecycle hooks run when a transaction context is entered and exited.

use crate::context::TransactionContext;
use crate::error::{DiError, DiResult};

/// Runs when a transaction context is entered.
///
/// An error aborts entry: later enter hooks do not run and the error is
/// returned from [`TransactionContext::enter`].
pub trait EnterHook: Send + Sync {
    fn on_enter(&self, ctx: &mut TransactionContext) -> DiResult<()>;
}

/// Runs when a transaction context is exited, whether or not the guarded
/// block failed.
///
/// `error` is the failure of the guarded block, if any. Hooks observe it;
/// they cannot suppress it.
pub trait ExitHook: Send + Sync {
    fn on_exit(&self, ctx: &mut TransactionContext, error: Option<&DiError>) -> DiResult<()>;
}

impl<F> EnterHook for F
where
    F: Fn(&mut TransactionContext) -> DiResult<()> + Send + Sync,
{
    fn on_enter(&self, ctx: &mut TransactionContext) -> DiResult<()> {
        self(ctx)
    }
}

impl<F> ExitHook for F
where
    F: Fn(&mut TransactionContext, Option<&DiError>) -> DiResult<()> + Send + Sync,
{
    fn on_exit(&self, ctx: &mut TransactionContext, error: Option<&DiError>) -> DiResult<()> {
        self(ctx, error)
    }
}
