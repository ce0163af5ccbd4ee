use std::fmt;

use snafu::OptionExt;

use super::Tree;
use super::resolve::Follow;
use super::tree_error::{NotADirectorySnafu, NotAFileSnafu, NotALinkSnafu, TreeError};
use crate::node::{Node, NodeKind};
use crate::path::NodePath;
use crate::traversal::ROOT_NAME;

/// Metadata of a single node, as reported by [`Tree::info`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub name: String,
    pub path: NodePath,
    pub kind: NodeKind,
    /// Bytes of file content, 0 for directories and links
    pub content_length: usize,
    pub child_count: usize,
    pub target: Option<String>,
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name)?;
        writeln!(f, "path: {}", self.path)?;
        write!(f, "kind: {}", self.kind)?;
        match self.kind {
            NodeKind::Directory => write!(f, "\nchildren: {}", self.child_count),
            NodeKind::File => write!(f, "\nsize: {}", self.content_length),
            NodeKind::Symlink => match &self.target {
                Some(target) => write!(f, "\ntarget: {target}"),
                None => Ok(()),
            },
        }
    }
}

impl Tree {
    pub fn exists(&self, path: &str) -> bool {
        self.locate(path, Follow::Never).is_ok()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.resolve(path, Follow::Leaf)
            .is_ok_and(Node::is_directory)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.resolve(path, Follow::Leaf).is_ok_and(Node::is_file)
    }

    pub fn is_link(&self, path: &str) -> bool {
        self.resolve(path, Follow::Never).is_ok_and(Node::is_symlink)
    }

    /// Child names of a directory, in insertion order.
    pub fn ls(&self, path: &str) -> Result<Vec<String>, TreeError> {
        let (physical, node) = self.lookup(path, Follow::Leaf)?;
        let dir = node
            .as_directory()
            .context(NotADirectorySnafu { path: physical })?;
        Ok(dir.names().map(str::to_owned).collect())
    }

    /// Like [`Tree::ls`], with `/` appended to directories and `@` to symlinks.
    pub fn ls_classified(&self, path: &str) -> Result<Vec<String>, TreeError> {
        let (physical, node) = self.lookup(path, Follow::Leaf)?;
        let dir = node
            .as_directory()
            .context(NotADirectorySnafu { path: physical })?;
        Ok(dir
            .iter()
            .map(|(name, child)| match child {
                Node::Directory(_) => format!("{name}/"),
                Node::Symlink { .. } => format!("{name}@"),
                Node::File { .. } => name.to_owned(),
            })
            .collect())
    }

    /// Content of one file, following symlinks.
    pub fn read(&self, path: &str) -> Result<&str, TreeError> {
        let (physical, node) = self.lookup(path, Follow::Leaf)?;
        node.content().context(NotAFileSnafu { path: physical })
    }

    /// Contents of several files joined by newlines.
    ///
    /// Fails as a whole on the first path that cannot be read.
    pub fn cat<S: AsRef<str>>(&self, paths: &[S]) -> Result<String, TreeError> {
        let contents = paths
            .iter()
            .map(|path| self.read(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contents.join("\n"))
    }

    /// A byte window of a file, clamped to the content and shrunk to the
    /// nearest character boundaries.
    pub fn cat_range(&self, path: &str, start: usize, len: usize) -> Result<&str, TreeError> {
        let content = self.read(path)?;
        let start = floor_boundary(content, start);
        let end = floor_boundary(content, start.saturating_add(len));
        Ok(&content[start..end])
    }

    /// First `n` lines of a file.
    pub fn head(&self, path: &str, n: usize) -> Result<String, TreeError> {
        let content = self.read(path)?;
        Ok(content.lines().take(n).collect::<Vec<_>>().join("\n"))
    }

    /// Last `n` lines of a file.
    pub fn tail(&self, path: &str, n: usize) -> Result<String, TreeError> {
        let content = self.read(path)?;
        let lines: Vec<&str> = content.lines().collect();
        let skip = lines.len().saturating_sub(n);
        Ok(lines[skip..].join("\n"))
    }

    /// The stored target of a symlink.
    pub fn readlink(&self, path: &str) -> Result<&str, TreeError> {
        let (physical, node) = self.lookup(path, Follow::Never)?;
        node.target().context(NotALinkSnafu { path: physical })
    }

    /// Metadata of the node at `path` itself, not of a symlink's target.
    pub fn info(&self, path: &str) -> Result<NodeInfo, TreeError> {
        let (physical, node) = self.lookup(path, Follow::Never)?;
        Ok(NodeInfo {
            name: physical.name().unwrap_or(ROOT_NAME).to_owned(),
            kind: node.kind(),
            content_length: node.content().map_or(0, str::len),
            child_count: node.as_directory().map_or(0, |dir| dir.len()),
            target: node.target().map(str::to_owned),
            path: physical,
        })
    }
}

fn floor_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn tree() -> Tree {
        let mut tree = Tree::new();
        tree.mkdir("/docs", false)
            .unwrap()
            .touch("/docs/one", "1")
            .unwrap()
            .touch("/docs/two", "2")
            .unwrap()
            .touch("/docs/lines", "a\nb\nc\nd")
            .unwrap()
            .touch("/docs/uni", "héllo")
            .unwrap()
            .mkdir("/docs/sub", false)
            .unwrap()
            .ln("/docs", "/shortcut")
            .unwrap();
        tree
    }

    #[test]
    fn test_predicates() {
        let tree = tree();
        assert!(tree.exists("/docs/one"));
        assert!(!tree.exists("/docs/three"));
        assert!(tree.is_dir("/shortcut"));
        assert!(tree.is_link("/shortcut"));
        assert!(!tree.is_link("/docs"));
        assert!(tree.is_file("/shortcut/one"));
        assert!(!tree.is_file("/docs"));
        assert!(!tree.is_dir("/nowhere"));
    }

    #[test]
    fn test_ls_follows_links() {
        let tree = tree();
        let expected = vec!["one", "two", "lines", "uni", "sub"];
        assert_eq!(tree.ls("/docs").unwrap(), expected);
        assert_eq!(tree.ls("/shortcut").unwrap(), expected);
        assert_eq!(tree.ls("/").unwrap(), vec!["docs", "shortcut"]);
        assert!(matches!(
            tree.ls("/docs/one").unwrap_err(),
            TreeError::NotADirectoryError { .. }
        ));
    }

    #[test]
    fn test_ls_classified() {
        assert_eq!(tree().ls_classified("/").unwrap(), vec!["docs/", "shortcut@"]);
    }

    #[test]
    fn test_cat_joins_several_files() {
        let tree = tree();
        assert_eq!(tree.cat(&["/docs/one", "/docs/two"]).unwrap(), "1\n2");
        assert!(matches!(
            tree.cat(&["/docs/one", "/docs/missing"]).unwrap_err(),
            TreeError::NotFoundError { .. }
        ));
        assert!(matches!(
            tree.cat(&["/docs"]).unwrap_err(),
            TreeError::NotAFileError { .. }
        ));
    }

    #[rstest]
    #[case(0, 2, "h")]
    #[case(1, 2, "é")]
    #[case(2, 10, "éllo")]
    #[case(50, 3, "")]
    fn test_cat_range_snaps_to_char_boundaries(
        #[case] start: usize,
        #[case] len: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(tree().cat_range("/docs/uni", start, len).unwrap(), expected);
    }

    #[test]
    fn test_head_and_tail() {
        let tree = tree();
        assert_eq!(tree.head("/docs/lines", 2).unwrap(), "a\nb");
        assert_eq!(tree.tail("/docs/lines", 2).unwrap(), "c\nd");
        assert_eq!(tree.tail("/docs/lines", 10).unwrap(), "a\nb\nc\nd");
        assert_eq!(tree.head("/docs/one", 0).unwrap(), "");
    }

    #[test]
    fn test_readlink() {
        let tree = tree();
        assert_eq!(tree.readlink("/shortcut").unwrap(), "/docs");
        assert!(matches!(
            tree.readlink("/docs").unwrap_err(),
            TreeError::NotALinkError { .. }
        ));
    }

    #[test]
    fn test_info() {
        let tree = tree();
        let info = tree.info("/docs").unwrap();
        assert_eq!(info.kind, NodeKind::Directory);
        assert_eq!(info.child_count, 5);

        let link = tree.info("/shortcut").unwrap();
        assert_eq!(link.kind, NodeKind::Symlink);
        assert_eq!(link.target.as_deref(), Some("/docs"));
        assert_eq!(link.to_string(), "name: shortcut\npath: /shortcut\nkind: link\ntarget: /docs");

        let root = tree.info("/").unwrap();
        assert_eq!(root.name, "root");
        assert_eq!(tree.info("/docs/uni").unwrap().content_length, "héllo".len());
    }

    #[test]
    fn test_escaped_content_reads_back_exactly() {
        let mut tree = Tree::new();
        tree.touch("/code", "if (a < b && c > d) {}").unwrap();
        assert_eq!(tree.cat(&["/code"]).unwrap(), "if (a < b && c > d) {}");

        let reloaded: Tree = tree.to_string().parse().unwrap();
        assert_eq!(reloaded.read("/code").unwrap(), "if (a < b && c > d) {}");
    }
}
