//! Backward DER assembly: a growing reverse buffer and the element writer on top of it.

pub mod buffer;
pub mod emitter;
pub mod oid;

pub use buffer::{InsufficientSpace, Mark, ReverseBuffer};
pub use emitter::{ConstructedTag, Element, TlvEmitter};
