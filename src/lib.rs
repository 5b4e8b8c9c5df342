//! # modular-di
//!
//! Runtime dependency injection for functions, with transaction-scoped
//! contexts and a middleware pipeline around every call.
//!
//! ## Features
//!
//! - **Parameter injection**: functions declare a [`Signature`]; arguments are
//!   resolved from overrides, then by name, then by type
//! - **Dependency registry**: values indexed by runtime type and by name
//! - **Transaction contexts**: per-operation registry copies with enter/exit hooks
//! - **Middleware**: onion-style layers around every call, able to short-circuit
//! - **Observers**: pluggable logging and metrics for transactions and calls
//! - **Configuration**: environment, JSON and in-memory sources (feature `config`)
//!
//! ## Quick Start
//!
//! ```rust
//! use modular_di::{Application, Args, Signature};
//! use std::sync::Arc;
//!
//! struct Mailer {
//!     sender: String,
//! }
//!
//! let mailer = Arc::new(Mailer { sender: "noreply@example.com".to_string() });
//! let app = Application::new(Args::new().arg_arc(mailer)).unwrap();
//!
//! // `mailer` is resolved by type, `to` by name
//! let send = Signature::new("send")
//!     .param::<Mailer>("mailer")
//!     .untyped("to")
//!     .bind(|_ctx, args| {
//!         let mailer = args.required::<Mailer>("mailer")?;
//!         let to = args.value::<String>("to")?;
//!         Ok(format!("{} -> {}", mailer.sender, to))
//!     });
//!
//! let line = app
//!     .transaction(Args::new().kwarg("to", "ada@example.com".to_string()), |ctx| {
//!         ctx.call_as::<String, _>(&send, Args::new())
//!     })
//!     .unwrap();
//! assert_eq!(line.as_str(), "noreply@example.com -> ada@example.com");
//! ```
//!
//! ## Resolution Order
//!
//! For each declared parameter, first match wins:
//!
//! 1. A positional override at the parameter's position
//! 2. A named override with the parameter's name
//! 3. A registry entry with the parameter's name
//! 4. A registry entry with the parameter's annotated type
//!
//! Parameters matching none of these are left out of the resolved
//! [`Arguments`]; the function reports them when it asks for them.
//!
//! ## Middleware
//!
//! ```rust
//! use modular_di::{Application, Args, Signature, Value};
//!
//! let mut app = Application::default();
//! app.transaction_middleware(|ctx, next| {
//!     if ctx.state().flag("maintenance") {
//!         return Ok(Value::new("unavailable"));
//!     }
//!     next.run(ctx)
//! });
//!
//! let ping = Signature::new("ping").bind(|_ctx, _args| Ok("pong"));
//!
//! let mut ctx = app.transaction_context(Args::new()).unwrap();
//! ctx.state_mut().insert("maintenance", true);
//! assert_eq!(*ctx.call_as::<&str, _>(&ping, Args::new()).unwrap(), "unavailable");
//! ```

// Module declarations
pub mod application;
pub mod args;
pub mod context;
pub mod error;
pub mod function;
pub mod key;
pub mod observer;
pub mod registry;
pub mod resolver;
pub mod signature;
pub mod traits;
pub mod value;

#[cfg(feature = "config")]
pub mod config;

// Internal modules
mod internal;

// Re-export core types
pub use application::Application;
pub use args::Args;
pub use context::{Next, Phase, StateBag, TransactionContext, TransactionId};
pub use error::{BoxError, DiError, DiResult};
pub use function::Function;
pub use key::{key_of_type, Key};
pub use observer::{LoggingObserver, MetricsObserver, TransactionObserver};
pub use registry::DependencyRegistry;
pub use resolver::{resolve, Arguments};
pub use signature::{parameters, Annotation, Parameter, Signature};
pub use traits::{EnterHook, ExitHook, Injectable, Middleware};
pub use value::{is_primitive_type, Value};

#[cfg(feature = "config")]
pub use config::{
    ConfigProvider, ConfigSource, ConfigValue, EnvironmentConfigSource, JsonConfigSource,
    MemoryConfigSource,
};
