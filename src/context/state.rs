//! Ad hoc per-transaction state.

use std::any::Any;
use std::fmt;

use crate::error::{DiError, DiResult};
use crate::internal::Map;
use crate::key::Key;

/// String-keyed bag of arbitrary values scoped to one transaction.
///
/// Separate from the dependency registry: this is where hooks and
/// middleware leave flags, buffers and other request-scoped data.
///
/// # Examples
///
/// ```rust
/// use modular_di::StateBag;
///
/// let mut state = StateBag::new();
/// state.insert("buffer", Vec::<i32>::new());
/// state.get_mut::<Vec<i32>>("buffer").unwrap().push(1);
/// state.insert("entered", true);
///
/// assert_eq!(state.get::<Vec<i32>>("buffer"), Some(&vec![1]));
/// assert!(state.flag("entered"));
/// assert!(!state.flag("exited"));
/// ```
#[derive(Default)]
pub struct StateBag {
    data: Map<String, Box<dyn Any + Send>>,
}

impl StateBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), Box::new(value));
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.data.get(key)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.data.get_mut(key)?.downcast_mut::<T>()
    }

    /// Like [`get`](Self::get) but tells a missing key from a wrong type.
    pub fn require<T: Any>(&self, key: &str) -> DiResult<&T> {
        self.data
            .get(key)
            .ok_or_else(|| DiError::NotFound(Key::named(key.to_string())))?
            .downcast_ref::<T>()
            .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.data.get(key)?.is::<T>() {
            return None;
        }
        self.data
            .remove(key)
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// True if `key` holds `true`.
    pub fn flag(&self, key: &str) -> bool {
        self.get::<bool>(key).copied().unwrap_or(false)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for StateBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("StateBag").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_distinguishes_missing_and_mismatch() {
        let mut state = StateBag::new();
        state.insert("count", 3usize);

        assert_eq!(*state.require::<usize>("count").unwrap(), 3);
        assert!(matches!(state.require::<usize>("other"), Err(DiError::NotFound(_))));
        assert!(matches!(state.require::<String>("count"), Err(DiError::TypeMismatch(_))));
    }

    #[test]
    fn test_remove_checks_type() {
        let mut state = StateBag::new();
        state.insert("name", "txn".to_string());

        assert_eq!(state.remove::<u32>("name"), None);
        assert!(state.contains("name"));
        assert_eq!(state.remove::<String>("name").as_deref(), Some("txn"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_insert_replaces() {
        let mut state = StateBag::new();
        state.insert("value", 1u8);
        state.insert("value", "two");

        assert_eq!(state.len(), 1);
        assert_eq!(state.get::<u8>("value"), None);
        assert_eq!(state.get::<&str>("value"), Some(&"two"));
    }
}
