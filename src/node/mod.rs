//! Node model of the tree.
//!
//! A node is a directory (ordered, owned children), a file (text content) or
//! a symlink (stored target path). Nodes never point back to their parent;
//! ancestry is rebuilt from the root whenever it is needed.

mod directory;
mod node;

pub use directory::Directory;
pub use node::{Node, NodeKind, UnknownNodeKindError};
