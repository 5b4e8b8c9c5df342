//! Declared parameter metadata for injectable functions.
//!
//! Rust functions carry no runtime-inspectable parameter names, so every
//! injectable function declares its [`Signature`] explicitly when it is
//! defined. The resolver reads parameter names and their optional type
//! annotations from it.

use std::any::TypeId;
use std::borrow::Cow;

use crate::internal::ParamVec;
use crate::key::Key;
use crate::traits::Injectable;

/// Declared type of a parameter, or the untyped marker.
#[derive(Debug, Clone, Copy)]
pub enum Annotation {
    /// Parameter declares a type; may be resolved by type.
    ///
    /// The TypeId is the identity; the name only feeds diagnostics.
    Typed(TypeId, &'static str),
    /// Parameter has no declared type; resolved by name only.
    Untyped,
}

impl Annotation {
    /// Annotation for type `T`.
    pub fn of<T: 'static + ?Sized>() -> Self {
        Annotation::Typed(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    pub fn is_typed(&self) -> bool {
        matches!(self, Annotation::Typed(..))
    }

    /// The declared type, if any.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Annotation::Typed(id, _) => Some(*id),
            Annotation::Untyped => None,
        }
    }

    /// Type key for the declared type, if any.
    pub fn key(&self) -> Option<Key> {
        match self {
            Annotation::Typed(id, name) => Some(Key::Type(*id, name)),
            Annotation::Untyped => None,
        }
    }
}

// TypeId-only comparison, as for type keys
impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Annotation::Typed(a, _), Annotation::Typed(b, _)) => a == b,
            (Annotation::Untyped, Annotation::Untyped) => true,
            _ => false,
        }
    }
}

impl Eq for Annotation {}

/// A single formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: Cow<'static, str>,
    annotation: Annotation,
}

impl Parameter {
    pub fn new(name: impl Into<Cow<'static, str>>, annotation: Annotation) -> Self {
        Self {
            name: name.into(),
            annotation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_cow(&self) -> &Cow<'static, str> {
        &self.name
    }

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }
}

/// Function name plus its formal parameters in declaration order.
///
/// # Examples
///
/// ```rust
/// use modular_di::{Annotation, Signature};
///
/// struct Mailer;
///
/// let signature = Signature::new("send_welcome")
///     .param::<Mailer>("mailer")
///     .untyped("address");
///
/// assert_eq!(signature.len(), 2);
/// assert_eq!(signature.annotation("mailer"), Some(&Annotation::of::<Mailer>()));
/// assert_eq!(signature.annotation("address"), Some(&Annotation::Untyped));
/// assert_eq!(signature.annotation("missing"), None);
/// ```
#[derive(Debug, Clone)]
pub struct Signature {
    name: Cow<'static, str>,
    params: ParamVec<Parameter>,
}

impl Signature {
    /// Starts a signature for the function called `name`.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            params: ParamVec::new(),
        }
    }

    /// Adds a parameter declared with type `T`.
    pub fn param<T: 'static + ?Sized>(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.with(Parameter::new(name, Annotation::of::<T>()))
    }

    /// Adds a parameter with no declared type.
    pub fn untyped(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.with(Parameter::new(name, Annotation::Untyped))
    }

    pub fn with(mut self, parameter: Parameter) -> Self {
        self.params.push(parameter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_cow(&self) -> &Cow<'static, str> {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Annotation of the parameter called `name`.
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.params
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.annotation())
    }
}

/// Maps every formal parameter of `func` to its declared type, in order.
///
/// Untyped parameters map to [`Annotation::Untyped`]; a function without
/// parameters yields an empty list.
///
/// # Examples
///
/// ```rust
/// use modular_di::{parameters, Annotation, Signature};
///
/// let add = Signature::new("add")
///     .param::<i64>("a")
///     .untyped("b")
///     .bind(|_ctx, _args| Ok(()));
///
/// let params = parameters(&add);
/// assert_eq!(params, vec![("a", Annotation::of::<i64>()), ("b", Annotation::Untyped)]);
/// ```
pub fn parameters<F>(func: &F) -> Vec<(&str, Annotation)>
where
    F: Injectable + ?Sized,
{
    func.signature()
        .parameters()
        .iter()
        .map(|p| (p.name(), p.annotation().clone()))
        .collect()
}
