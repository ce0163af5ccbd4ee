//! Paths and names.
//!
//! `NodePath` is the normalized, absolute form every operation works with.
//! Lexical normalization (`.`, `..`, repeated slashes) happens here; symlink
//! resolution needs the tree and lives in `tree`.

mod name;
mod node_path;

pub use name::{is_valid_name, slugify};
pub use node_path::NodePath;
