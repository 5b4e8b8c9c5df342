//! Internal implementation details.

pub(crate) mod collections;
pub(crate) mod panic;

pub(crate) use collections::{Map, ParamVec};
pub(crate) use panic::panic_message;
