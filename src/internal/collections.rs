//! Collection aliases switched by the performance features.

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

// Most functions take a handful of parameters; keep them inline
#[cfg(feature = "smallvec")]
pub(crate) type ParamVec<T> = smallvec::SmallVec<[T; 4]>;
#[cfg(not(feature = "smallvec"))]
pub(crate) type ParamVec<T> = Vec<T>;
