//! The markup form of a tree.
//!
//! A tree is stored as one `<root>` element. Directories nest their
//! children, files hold their escaped content as text and symlinks are
//! self-closing tags carrying the escaped target in an `@` attribute:
//!
//! ```text
//! <root><docs><readme>hi &amp; welcome</readme><latest @="readme"/></docs><tmp><empty></empty></tmp></root>
//! ```

mod escape;
mod parser;
mod serializer;

pub use escape::{escape, unescape};
pub use parser::{ParseError, parse};
pub use serializer::serialize;

/// Sole content of an empty directory, distinguishing it from an empty file
pub const EMPTY_MARKER: &str = "empty";

/// Separates a symlink's name from its quoted target inside the tag
pub(crate) const LINK_OPENER: &str = " @=\"";
