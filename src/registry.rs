//! Dependency registry keyed by runtime type and by name.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::args::Args;
use crate::error::{DiError, DiResult};
use crate::internal::Map;
use crate::key::Key;
use crate::resolver::{self, Arguments};
use crate::traits::Injectable;
use crate::value::Value;

/// Keyed store of dependencies, looked up by type or by name.
///
/// Built from [`Args`]: positional values are indexed by their runtime type,
/// named values by their name. A named value that is an object instance
/// (not a primitive) is also indexed by its runtime type, replacing whatever
/// was indexed under that type before. Positional values are applied first,
/// so named values win type collisions.
///
/// Primitives carry no useful type identity and are rejected positionally.
///
/// # Examples
///
/// ```rust
/// use modular_di::{Args, DependencyRegistry, DiError, Key};
/// use std::sync::Arc;
///
/// struct FooService;
///
/// let first = Arc::new(FooService);
/// let second = Arc::new(FooService);
/// let registry = DependencyRegistry::new(
///     Args::new().arg_arc(first.clone()).kwarg_arc("service", second.clone()).kwarg("x", 1i64),
/// ).unwrap();
///
/// assert!(Arc::ptr_eq(&registry.resolve::<FooService>().unwrap(), &second));
/// assert!(Arc::ptr_eq(&registry.named::<FooService>("service").unwrap(), &second));
/// assert_eq!(*registry.named::<i64>("x").unwrap(), 1);
/// assert!(matches!(registry.get(Key::of::<i64>()), Err(DiError::NotFound(_))));
///
/// assert!(matches!(
///     DependencyRegistry::new(Args::new().arg(1i64)),
///     Err(DiError::InvalidArgument("i64"))
/// ));
/// ```
#[derive(Clone, Default)]
pub struct DependencyRegistry {
    by_type: Map<TypeId, Value>,
    by_name: Map<Cow<'static, str>, Value>,
}

impl DependencyRegistry {
    /// Builds a registry from positional and named values.
    ///
    /// Fails with [`DiError::InvalidArgument`] if any positional value is
    /// a primitive.
    pub fn new(args: Args) -> DiResult<Self> {
        Self::empty().layered(args)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Copies this registry and layers `args` on top, using the
    /// construction rules. Entries from `args` win on key collisions.
    pub fn layered(&self, args: Args) -> DiResult<Self> {
        let mut registry = self.clone();
        let (positional, named) = args.into_parts();

        for value in positional {
            registry.insert_instance(value)?;
        }
        for (name, value) in named {
            registry.insert(name, value);
        }

        Ok(registry)
    }

    /// Indexes an object instance under its runtime type.
    pub fn insert_instance(&mut self, value: Value) -> DiResult<()> {
        if value.is_primitive() {
            return Err(DiError::InvalidArgument(value.type_name()));
        }
        self.by_type.insert(value.type_id(), value);
        Ok(())
    }

    /// Indexes a value under `name`, and under its runtime type if it is an
    /// object instance.
    pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, value: Value) {
        if !value.is_primitive() {
            self.by_type.insert(value.type_id(), value.clone());
        }
        self.by_name.insert(name.into(), value);
    }

    /// Keyed lookup dispatching on the key tag.
    pub fn get(&self, key: impl Into<Key>) -> DiResult<Value> {
        let key = key.into();
        self.find(&key)
            .cloned()
            .ok_or(DiError::NotFound(key))
    }

    pub fn find(&self, key: &Key) -> Option<&Value> {
        match key {
            Key::Type(id, _) => self.by_type.get(id),
            Key::Name(name) => self.by_name.get(name.as_ref()),
        }
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.find(key).is_some()
    }

    pub fn get_by_type(&self, type_id: TypeId) -> Option<&Value> {
        self.by_type.get(&type_id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.by_name.get(name)
    }

    /// Typed lookup by type.
    pub fn resolve<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.get(Key::of::<T>())?.downcast::<T>()
    }

    /// Typed lookup by name.
    pub fn named<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        self.get_by_name(name)
            .ok_or_else(|| DiError::NotFound(Key::named(name.to_string())))?
            .downcast::<T>()
    }

    /// Resolves the arguments for calling `func` against this registry.
    pub fn resolve_params<F>(&self, func: &F, overrides: &Args) -> Arguments
    where
        F: Injectable + ?Sized,
    {
        resolver::resolve(func.signature(), self, overrides)
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(|name| name.as_ref())
    }

    /// Total number of index entries, type and name.
    pub fn len(&self) -> usize {
        self.by_type.len() + self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty() && self.by_name.is_empty()
    }

    /// Human-readable dump of every index entry, sorted.
    pub fn to_debug_string(&self) -> String {
        let mut types: Vec<_> = self.by_type.values().map(|v| v.type_name()).collect();
        types.sort_unstable();
        let mut names: Vec<_> = self
            .by_name
            .iter()
            .map(|(name, v)| (name.as_ref(), v.type_name()))
            .collect();
        names.sort_unstable();

        let mut out = String::from("DependencyRegistry\n");
        for type_name in types {
            let _ = writeln!(out, "  [type] {}", type_name);
        }
        for (name, type_name) in names {
            let _ = writeln!(out, "  [name] {}: {}", name, type_name);
        }
        out
    }
}

impl std::fmt::Debug for DependencyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyRegistry")
            .field("types", &self.by_type.len())
            .field("names", &self.by_name.len())
            .finish()
    }
}
