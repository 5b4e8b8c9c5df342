//! Core traits for injectable functions, middleware and lifecycle hooks.

mod hooks;
mod injectable;
mod middleware;

pub use hooks::{EnterHook, ExitHook};
pub use injectable::Injectable;
pub use middleware::Middleware;
