//! Closures bound to a declared signature.

use std::any::Any;
use std::fmt;

use crate::context::TransactionContext;
use crate::error::DiResult;
use crate::resolver::Arguments;
use crate::signature::Signature;
use crate::traits::Injectable;
use crate::value::Value;

/// A closure paired with the signature the resolver reads.
///
/// Created by [`Signature::bind`].
pub struct Function<F> {
    signature: Signature,
    body: F,
}

impl<F> fmt::Debug for Function<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature)
            .finish()
    }
}

impl Signature {
    /// Binds a body to this signature, producing an injectable function.
    ///
    /// The body gets the live transaction context and the resolved
    /// arguments. Its return value is wrapped in a [`Value`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modular_di::{Args, Signature, TransactionContext};
    ///
    /// let add = Signature::new("add")
    ///     .untyped("a")
    ///     .untyped("b")
    ///     .bind(|_ctx, args| Ok(args.value::<i64>("a")? + args.value::<i64>("b")?));
    ///
    /// let mut ctx = TransactionContext::new();
    /// let sum = ctx.call_as::<i64, _>(&add, Args::new().arg(1i64).arg(2i64)).unwrap();
    /// assert_eq!(*sum, 3);
    /// ```
    pub fn bind<F, R>(self, body: F) -> Function<F>
    where
        F: Fn(&mut TransactionContext, &Arguments) -> DiResult<R> + Send + Sync,
        R: Any + Send + Sync,
    {
        Function {
            signature: self,
            body,
        }
    }
}

impl<F, R> Injectable for Function<F>
where
    F: Fn(&mut TransactionContext, &Arguments) -> DiResult<R> + Send + Sync,
    R: Any + Send + Sync,
{
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn invoke(&self, ctx: &mut TransactionContext, args: &Arguments) -> DiResult<Value> {
        (self.body)(ctx, args).map(Value::new)
    }
}
