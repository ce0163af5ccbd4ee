//! Iterative depth-first traversal shared by every read operation.

mod walker;

pub use walker::{ROOT_NAME, Walk, WalkEntry};
