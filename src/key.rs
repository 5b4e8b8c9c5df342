//! Registry key types.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key for dependency storage and lookup.
///
/// A registry indexes every entry either by the runtime type of the value or
/// by the name it was registered under. `Key` is the tagged union of those two
/// lookup paths, and [`DependencyRegistry::get`](crate::DependencyRegistry::get)
/// dispatches on the tag.
///
/// # Examples
///
/// ```rust
/// use modular_di::{Args, DependencyRegistry, Key};
/// use std::sync::Arc;
///
/// struct Database { url: String }
///
/// let db = Arc::new(Database { url: "postgres://localhost".to_string() });
/// let registry = DependencyRegistry::new(
///     Args::new().kwarg_arc("db", db.clone()).kwarg("port", 5432u16),
/// ).unwrap();
///
/// // Type key
/// let by_type = registry.get(Key::of::<Database>()).unwrap();
/// // Name keys
/// let by_name = registry.get("db").unwrap();
/// let port = registry.get(Key::named("port")).unwrap();
///
/// assert!(by_type.ptr_eq(&by_name));
/// assert_eq!(port.downcast_ref::<u16>(), Some(&5432));
/// ```
#[derive(Debug, Clone)]
pub enum Key {
    /// Runtime type key with TypeId and name for diagnostics
    ///
    /// The TypeId is the identity; the name only feeds error messages.
    Type(TypeId, &'static str),
    /// Name key for values registered by name
    Name(Cow<'static, str>),
}

impl Key {
    /// Type key for `T`.
    #[inline(always)]
    pub fn of<T: 'static + ?Sized>() -> Key {
        Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    /// Name key.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Key {
        Key::Name(name.into())
    }

    /// Get the type name or registration name for display
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modular_di::Key;
    ///
    /// assert_eq!(Key::of::<u32>().display_name(), "u32");
    /// assert_eq!(Key::named("port").display_name(), "port");
    /// ```
    pub fn display_name(&self) -> &str {
        match self {
            Key::Type(_, name) => name,
            Key::Name(name) => name,
        }
    }

    /// Get the registration name for name keys, or None for type keys
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modular_di::Key;
    ///
    /// assert_eq!(Key::of::<String>().service_name(), None);
    /// assert_eq!(Key::named("database_url").service_name(), Some("database_url"));
    /// ```
    pub fn service_name(&self) -> Option<&str> {
        match self {
            Key::Type(_, _) => None,
            Key::Name(name) => Some(name),
        }
    }

    /// The TypeId for type keys.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Key::Type(id, _) => Some(*id),
            Key::Name(_) => None,
        }
    }
}

// TypeId-only comparison for type keys; the name is diagnostic
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Name(a), Key::Name(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state); // Discriminant
                id.hash(state);
            }
            Key::Name(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Type(_, name) => write!(f, "{}", name),
            Key::Name(name) => write!(f, "\"{}\"", name),
        }
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Key::Name(Cow::Borrowed(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(Cow::Owned(name))
    }
}

// Helper function for creating type keys
#[inline(always)]
pub fn key_of_type<T: 'static + ?Sized>() -> Key {
    Key::of::<T>()
}
