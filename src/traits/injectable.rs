//! Functions the container can call with resolved arguments.

use crate::context::TransactionContext;
use crate::error::DiResult;
use crate::resolver::Arguments;
use crate::signature::Signature;
use crate::value::Value;

/// A function whose parameters can be supplied by a registry.
///
/// The signature tells the resolver which names and types to look up;
/// `invoke` runs the body with whatever the resolver bound. Parameters the
/// resolver could not bind are absent from `args`, and the body reports them
/// through [`Arguments::required`] as a missing-argument error.
///
/// Most functions are built with [`Signature::bind`]; implement the trait
/// directly for types that carry their own state.
///
/// # Examples
///
/// ```rust
/// use modular_di::{Args, Arguments, DiResult, Injectable, Signature, TransactionContext, Value};
///
/// struct Greeter {
///     signature: Signature,
///     greeting: &'static str,
/// }
///
/// impl Injectable for Greeter {
///     fn signature(&self) -> &Signature {
///         &self.signature
///     }
///
///     fn invoke(&self, _ctx: &mut TransactionContext, args: &Arguments) -> DiResult<Value> {
///         let name: String = args.value("name")?;
///         Ok(Value::new(format!("{}, {}", self.greeting, name)))
///     }
/// }
///
/// let greeter = Greeter {
///     signature: Signature::new("greet").param::<String>("name"),
///     greeting: "Hello",
/// };
///
/// let mut ctx = TransactionContext::new();
/// let greeting = ctx
///     .call_as::<String, _>(&greeter, Args::new().arg("Ada".to_string()))
///     .unwrap();
/// assert_eq!(greeting.as_str(), "Hello, Ada");
/// ```
pub trait Injectable: Send + Sync {
    /// Declared parameters, in order.
    fn signature(&self) -> &Signature;

    /// Runs the function with resolved arguments.
    fn invoke(&self, ctx: &mut TransactionContext, args: &Arguments) -> DiResult<Value>;
}

impl<T: Injectable + ?Sized> Injectable for std::sync::Arc<T> {
    fn signature(&self) -> &Signature {
        (**self).signature()
    }

    fn invoke(&self, ctx: &mut TransactionContext, args: &Arguments) -> DiResult<Value> {
        (**self).invoke(ctx, args)
    }
}
