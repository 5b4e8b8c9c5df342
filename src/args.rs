//! Positional and named argument lists.

use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use crate::value::Value;

/// Ordered positional values plus ordered named values.
///
/// `Args` feeds registry construction (positional values are indexed by
/// type, named values by name), transaction-scoped seeding, and the explicit
/// overrides of [`TransactionContext::call`](crate::TransactionContext::call).
///
/// # Examples
///
/// ```rust
/// use modular_di::Args;
/// use std::sync::Arc;
///
/// struct Cache;
///
/// let cache = Arc::new(Cache);
/// let args = Args::new()
///     .arg_arc(cache.clone())
///     .kwarg("retries", 3u32)
///     .kwarg("region", "eu-west-1");
///
/// assert_eq!(args.positional().len(), 1);
/// assert_eq!(args.named("retries").unwrap().downcast_ref::<u32>(), Some(&3));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Args {
    positional: Vec<Value>,
    named: Vec<(Cow<'static, str>, Value)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional value.
    pub fn arg<T: Any + Send + Sync>(self, value: T) -> Self {
        self.arg_value(Value::new(value))
    }

    /// Appends a positional value sharing an existing allocation.
    pub fn arg_arc<T: Any + Send + Sync>(self, value: Arc<T>) -> Self {
        self.arg_value(Value::from_arc(value))
    }

    pub fn arg_value(mut self, value: Value) -> Self {
        self.positional.push(value);
        self
    }

    /// Appends a named value.
    pub fn kwarg<T: Any + Send + Sync>(self, name: impl Into<Cow<'static, str>>, value: T) -> Self {
        self.kwarg_value(name, Value::new(value))
    }

    /// Appends a named value sharing an existing allocation.
    pub fn kwarg_arc<T: Any + Send + Sync>(
        self,
        name: impl Into<Cow<'static, str>>,
        value: Arc<T>,
    ) -> Self {
        self.kwarg_value(name, Value::from_arc(value))
    }

    pub fn kwarg_value(mut self, name: impl Into<Cow<'static, str>>, value: Value) -> Self {
        self.named.push((name.into(), value));
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Named values in insertion order.
    pub fn named_values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.named.iter().map(|(name, value)| (name.as_ref(), value))
    }

    /// Looks up a named value; the last one given under `name` wins.
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.named
            .iter()
            .rev()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<Value>, Vec<(Cow<'static, str>, Value)>) {
        (self.positional, self.named)
    }
}
