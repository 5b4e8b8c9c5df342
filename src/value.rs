//! Type-erased shared values stored in registries and passed to functions.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// A shared, type-erased value.
///
/// Cloning a `Value` clones the handle, not the value: every clone refers to
/// the same allocation. Equality is identity, matching what a registry
/// promises about the instances it hands out.
///
/// # Examples
///
/// ```rust
/// use modular_di::Value;
/// use std::sync::Arc;
///
/// struct Mailer;
///
/// let mailer = Arc::new(Mailer);
/// let value = Value::from_arc(mailer.clone());
/// assert!(Arc::ptr_eq(&value.downcast::<Mailer>().unwrap(), &mailer));
///
/// let port = Value::new(8080u16);
/// assert!(port.is_primitive());
/// assert_eq!(port.downcast_ref::<u16>(), Some(&8080));
/// ```
#[derive(Clone)]
pub struct Value {
    inner: AnyArc,
    type_id: TypeId,
    type_name: &'static str,
}

impl Value {
    /// Wraps a fresh value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Shares an existing allocation, keeping identity with `arc`.
    pub fn from_arc<T: Any + Send + Sync>(arc: Arc<T>) -> Self {
        Self {
            inner: arc,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The unit value, returned by functions with nothing to return.
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Runtime type of the wrapped value.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Key under which this value is indexed by type.
    pub fn type_key(&self) -> Key {
        Key::Type(self.type_id, self.type_name)
    }

    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns true for scalars that carry no useful type identity.
    pub fn is_primitive(&self) -> bool {
        is_primitive_type(self.type_id)
    }

    /// Downcasts to a shared handle of the concrete type.
    pub fn downcast<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.inner
            .clone()
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Identity comparison of the underlying allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::as_ptr(&self.inner) as *const () == Arc::as_ptr(&other.inner) as *const ()
    }

    /// Identity comparison against a typed handle.
    pub fn is_same<T: Any + Send + Sync>(&self, arc: &Arc<T>) -> bool {
        Arc::as_ptr(&self.inner) as *const () == Arc::as_ptr(arc) as *const ()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Value {}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.type_name)
            .field("ptr", &(Arc::as_ptr(&self.inner) as *const ()))
            .finish()
    }
}

/// Returns true if values of this type are primitive scalars.
///
/// Primitives may only be registered by name: positionally they would be
/// indexed by a type such as `i64`, which says nothing about what they mean.
pub fn is_primitive_type(type_id: TypeId) -> bool {
    [
        TypeId::of::<()>(),
        TypeId::of::<bool>(),
        TypeId::of::<char>(),
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<i128>(),
        TypeId::of::<isize>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<u128>(),
        TypeId::of::<usize>(),
        TypeId::of::<f32>(),
        TypeId::of::<f64>(),
        TypeId::of::<String>(),
        TypeId::of::<&'static str>(),
    ]
    .contains(&type_id)
}
