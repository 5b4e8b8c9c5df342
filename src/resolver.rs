//! Parameter resolution against a dependency registry.

use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use crate::args::Args;
use crate::error::{DiError, DiResult};
use crate::internal::ParamVec;
use crate::registry::DependencyRegistry;
use crate::signature::{Annotation, Signature};
use crate::value::Value;

/// Concrete arguments for one call, in parameter order.
///
/// Only resolved parameters are present. Reading a parameter that was left
/// unresolved through [`required`](Self::required) or [`value`](Self::value)
/// fails with [`DiError::MissingArgument`], the equivalent of calling a
/// function without a required argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    function: Cow<'static, str>,
    values: ParamVec<(Cow<'static, str>, Value)>,
}

impl Arguments {
    pub(crate) fn new(function: Cow<'static, str>) -> Self {
        Self {
            function,
            values: ParamVec::new(),
        }
    }

    fn push(&mut self, name: Cow<'static, str>, value: Value) {
        self.values.push((name, value));
    }

    /// Name of the function these arguments were resolved for.
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Resolved parameter names, in parameter order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_ref(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A required parameter as a shared handle.
    pub fn required<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        self.get(name)
            .ok_or_else(|| DiError::MissingArgument {
                function: self.function.to_string(),
                parameter: name.to_string(),
            })?
            .downcast::<T>()
    }

    /// An optional parameter, for parameters that have a default.
    pub fn optional<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Option<Arc<T>>> {
        self.get(name).map(|value| value.downcast::<T>()).transpose()
    }

    /// A required parameter, cloned out of its shared handle.
    pub fn value<T: Any + Send + Sync + Clone>(&self, name: &str) -> DiResult<T> {
        self.required::<T>(name).map(|arc| (*arc).clone())
    }
}

/// Resolves the arguments for a call to the function described by `signature`.
///
/// For each parameter, in declaration order, the first match wins:
///
/// 1. the positional override at the parameter's position,
/// 2. the named override under the parameter's name,
/// 3. the registry entry under the parameter's name,
/// 4. the registry entry under the parameter's declared type.
///
/// Parameters with no match are left out. Positional overrides always bind
/// by position, whatever the other parameters resolve to. Resolution reads
/// its inputs only, so equal inputs give equal outputs.
///
/// # Examples
///
/// ```rust
/// use modular_di::{resolve, Args, DependencyRegistry, Signature};
///
/// let signature = Signature::new("add").untyped("a").untyped("b");
/// let registry =
///     DependencyRegistry::new(Args::new().kwarg("a", 10i64).kwarg("b", 20i64)).unwrap();
///
/// let args = resolve(&signature, &registry, &Args::new().arg(1i64));
/// assert_eq!(args.value::<i64>("a").unwrap(), 1);
/// assert_eq!(args.value::<i64>("b").unwrap(), 20);
/// ```
pub fn resolve(
    signature: &Signature,
    registry: &DependencyRegistry,
    overrides: &Args,
) -> Arguments {
    let mut arguments = Arguments::new(signature.name_cow().clone());
    let positional = overrides.positional();

    for (position, param) in signature.parameters().iter().enumerate() {
        let resolved = positional
            .get(position)
            .or_else(|| overrides.named(param.name()))
            .or_else(|| registry.get_by_name(param.name()))
            .or_else(|| match param.annotation() {
                Annotation::Typed(type_id, _) => registry.get_by_type(*type_id),
                Annotation::Untyped => None,
            });

        if let Some(value) = resolved {
            arguments.push(param.name_cow().clone(), value.clone());
        }
    }

    arguments
}
