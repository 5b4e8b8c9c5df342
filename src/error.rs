//! Error types for registries, resolution and transaction pipelines.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::key::Key;

/// Shared, type-erased error raised by consumer code.
pub type BoxError = Arc<dyn Error + Send + Sync>;

/// Dependency injection and pipeline errors
///
/// Represents the conditions that can occur while building registries,
/// resolving parameters, calling injectable functions, or driving a
/// transaction context through its enter/exit protocol.
///
/// Errors raised by consumer code (target functions, middleware and hooks)
/// travel through the pipeline as [`DiError::User`] and are never
/// translated; use [`DiError::downcast_ref`] to get the original back.
///
/// # Examples
///
/// ```rust
/// use modular_di::{Args, DependencyRegistry, DiError, Key};
///
/// let registry = DependencyRegistry::new(Args::new().kwarg("x", 1i64)).unwrap();
/// match registry.get(Key::of::<i64>()) {
///     Err(DiError::NotFound(key)) => assert_eq!(key.display_name(), "i64"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use modular_di::DiError;
///
/// #[derive(Debug)]
/// struct Overdrawn;
/// impl std::fmt::Display for Overdrawn {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "account overdrawn")
///     }
/// }
/// impl std::error::Error for Overdrawn {}
///
/// let error = DiError::user(Overdrawn);
/// assert!(error.downcast_ref::<Overdrawn>().is_some());
/// assert_eq!(error.to_string(), "account overdrawn");
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// No registry entry under the key
    NotFound(Key),
    /// A primitive value was registered positionally (carries its type name)
    InvalidArgument(&'static str),
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// A required parameter was left unresolved
    MissingArgument {
        function: String,
        parameter: String,
    },
    /// More positional overrides than the function declares parameters
    TooManyArguments {
        function: String,
        expected: usize,
        given: usize,
    },
    /// Enter/exit protocol violated
    ScopeState(&'static str),
    /// The guarded block panicked; only ever handed to exit hooks
    Panicked(String),
    /// Configuration could not be read or parsed
    InvalidConfig(String),
    /// Error raised by a target function, middleware or hook
    User(BoxError),
}

impl DiError {
    /// Wraps a consumer error without altering it.
    ///
    /// Accepts anything convertible into a boxed error, including plain
    /// `&str` and `String` messages.
    pub fn user<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        DiError::User(Arc::from(error.into()))
    }

    /// Returns the consumer error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        match self {
            DiError::User(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns true when the error originated in consumer code.
    pub fn is_user(&self) -> bool {
        matches!(self, DiError::User(_))
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotFound(key) => write!(f, "Dependency not found: {}", key),
            DiError::InvalidArgument(name) => write!(
                f,
                "Invalid argument: primitive value of type {} must be registered by name",
                name
            ),
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::MissingArgument { function, parameter } => write!(
                f,
                "{}() missing required argument: '{}'",
                function, parameter
            ),
            DiError::TooManyArguments { function, expected, given } => write!(
                f,
                "{}() takes {} positional arguments but {} were given",
                function, expected, given
            ),
            DiError::ScopeState(msg) => write!(f, "Scope error: {}", msg),
            DiError::Panicked(msg) => write!(f, "Panicked: {}", msg),
            DiError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            DiError::User(inner) => write!(f, "{}", inner),
        }
    }
}

impl Error for DiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DiError::User(inner) => Some(&**inner as &(dyn Error + 'static)),
            _ => None,
        }
    }
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout modular-di.
///
/// # Examples
///
/// ```rust
/// use modular_di::{DiResult, DiError, Key};
///
/// fn lookup() -> DiResult<()> {
///     Err(DiError::NotFound(Key::named("database")))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
