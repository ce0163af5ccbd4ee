use std::str::FromStr;

use derive_more::{Display, IsVariant};
use snafu::Snafu;

use super::Directory;

/// Represents a vertex of the tree
#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum Node {
    Directory(Directory),
    File { content: String },
    Symlink { target: String },
}

impl Node {
    pub fn directory() -> Self {
        Node::Directory(Directory::new())
    }

    pub fn file(content: impl Into<String>) -> Self {
        Node::File {
            content: content.into(),
        }
    }

    pub fn symlink(target: impl Into<String>) -> Self {
        Node::Symlink {
            target: target.into(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Directory(_) => NodeKind::Directory,
            Node::File { .. } => NodeKind::File,
            Node::Symlink { .. } => NodeKind::Symlink,
        }
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub fn as_directory_mut(&mut self) -> Option<&mut Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    /// File content, `None` for directories and links
    pub fn content(&self) -> Option<&str> {
        match self {
            Node::File { content } => Some(content),
            _ => None,
        }
    }

    /// Stored link target, `None` for directories and files
    pub fn target(&self) -> Option<&str> {
        match self {
            Node::Symlink { target } => Some(target),
            _ => None,
        }
    }
}

/// The kind of a node, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKind {
    #[display("directory")]
    Directory,
    #[display("file")]
    File,
    #[display("link")]
    Symlink,
}

impl FromStr for NodeKind {
    type Err = UnknownNodeKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "d" | "dir" | "directory" => Ok(NodeKind::Directory),
            "f" | "file" => Ok(NodeKind::File),
            "l" | "link" | "symlink" => Ok(NodeKind::Symlink),
            _ => UnknownNodeKindSnafu { value }.fail(),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("Unknown node kind '{}', expected d, f or l", value))]
pub struct UnknownNodeKindError {
    value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Node::directory().kind(), NodeKind::Directory);
        assert_eq!(Node::file("x").kind(), NodeKind::File);
        assert_eq!(Node::symlink("/x").kind(), NodeKind::Symlink);
        assert!(Node::symlink("/x").is_symlink());
    }

    #[test]
    fn test_payload_accessors() {
        assert_eq!(Node::file("hello").content(), Some("hello"));
        assert_eq!(Node::file("hello").target(), None);
        assert_eq!(Node::symlink("../a").target(), Some("../a"));
        assert!(Node::directory().as_directory().is_some());
        assert!(Node::file("").as_directory().is_none());
    }

    #[rstest]
    #[case("d", NodeKind::Directory)]
    #[case("directory", NodeKind::Directory)]
    #[case("f", NodeKind::File)]
    #[case("l", NodeKind::Symlink)]
    #[case("link", NodeKind::Symlink)]
    fn test_kind_from_str(#[case] value: &str, #[case] expected: NodeKind) {
        assert_eq!(value.parse::<NodeKind>().unwrap(), expected);
    }

    #[test]
    fn test_kind_from_str_rejects_unknown() {
        let err = "socket".parse::<NodeKind>().unwrap_err();
        assert!(err.to_string().contains("socket"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(NodeKind::Directory.to_string(), "directory");
        assert_eq!(NodeKind::Symlink.to_string(), "link");
    }
}
