//! The tree and every operation on it.
//!
//! Paths are resolved against the working directory and through symlinks
//! by the resolver; reads walk subtrees with [`crate::traversal::Walk`];
//! mutations check everything up front, edit, then notify the hook.

mod glob;
mod mutate;
mod mutation;
mod read;
mod render;
mod resolve;
mod search;
mod sed;
mod tree;
mod tree_error;

pub use mutation::{Mutation, MutationHook, Operation};
pub use read::NodeInfo;
pub use resolve::{Follow, MAX_SYMLINK_HOPS};
pub use search::{DirListing, GrepOptions, GrepOutput};
pub use sed::SedOptions;
pub use tree::Tree;
pub use tree_error::TreeError;
