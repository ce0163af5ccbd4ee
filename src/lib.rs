//! A virtual filesystem that lives in memory and round-trips through a
//! single markup string.
//!
//! ```
//! use loopy::Tree;
//!
//! let mut tree = Tree::new();
//! tree.mkdir("/docs", false)?
//!     .touch("/docs/readme", "a < b")?
//!     .ln("/docs/readme", "/latest")?;
//!
//! let raw = tree.to_string();
//! assert_eq!(
//!     raw,
//!     r#"<root><docs><readme>a &lt; b</readme></docs><latest @="/docs/readme"/></root>"#
//! );
//! let reloaded: Tree = raw.parse()?;
//! assert_eq!(reloaded.read("/latest")?, "a < b");
//! # Ok::<(), loopy::TreeError>(())
//! ```

#![allow(clippy::enum_variant_names)]

pub mod config;
mod ext;
pub mod markup;
pub mod node;
pub mod path;
pub mod shell;
pub mod store;
pub mod traversal;
pub mod tree;

pub use node::{Directory, Node, NodeKind};
pub use path::{NodePath, slugify};
pub use tree::{Tree, TreeError};
