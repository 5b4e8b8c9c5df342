//! Hook and middleware lists, and the continuation passed through the chain.

use std::sync::Arc;

use crate::error::DiResult;
use crate::observer::Observers;
use crate::traits::{EnterHook, ExitHook, Middleware};
use crate::value::Value;

use super::TransactionContext;

/// Everything an application attaches to its transaction contexts.
///
/// Contexts share this through an `Arc`; the application replaces it
/// copy-on-write when something new is registered, so a context keeps the
/// lists it was created with.
#[derive(Clone, Default)]
pub(crate) struct Pipeline {
    pub(crate) enter_hooks: Vec<Arc<dyn EnterHook>>,
    pub(crate) exit_hooks: Vec<Arc<dyn ExitHook>>,
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) observers: Observers,
}

pub(crate) type Endpoint<'a> = &'a dyn Fn(&mut TransactionContext) -> DiResult<Value>;

/// Continuation to the rest of the middleware chain.
///
/// `run` consumes the continuation, so each layer can call into the layers
/// below it at most once.
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    endpoint: Endpoint<'a>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(middleware: &'a [Arc<dyn Middleware>], endpoint: Endpoint<'a>) -> Self {
        Self {
            middleware,
            endpoint,
        }
    }

    /// Runs the next middleware, or the target function if none remain.
    pub fn run(self, ctx: &mut TransactionContext) -> DiResult<Value> {
        match self.middleware.split_first() {
            Some((current, rest)) => current.handle(ctx, Next::new(rest, self.endpoint)),
            None => (self.endpoint)(ctx),
        }
    }

    /// Number of middleware layers still ahead of the target function.
    pub fn remaining(&self) -> usize {
        self.middleware.len()
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.middleware.len())
            .finish()
    }
}
