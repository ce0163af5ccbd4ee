use std::fmt;
use std::str::FromStr;

use snafu::{OptionExt, ResultExt, ensure};
use tracing::debug;

use super::mutation::{Mutation, MutationHook, Operation};
use super::resolve::Follow;
use super::tree_error::{MalformedInputSnafu, NotADirectorySnafu, TreeError};
use crate::markup::{parse, serialize};
use crate::node::{Directory, Node};
use crate::path::NodePath;

/// An in-memory tree of directories, files and symlinks with a working
/// directory.
///
/// Mutations return `&mut Self` so they can be chained with `?`:
///
/// ```
/// use loopy::Tree;
///
/// let mut tree = Tree::new();
/// tree.mkdir("/notes", false)?
///     .touch("/notes/today", "buy milk")?
///     .ln("/notes/today", "/latest")?;
/// assert_eq!(tree.cat(&["/latest"])?, "buy milk");
/// # Ok::<(), loopy::TreeError>(())
/// ```
pub struct Tree {
    /// Always a directory
    pub(super) root: Node,
    pub(super) cwd: NodePath,
    hook: Option<MutationHook>,
}

impl Tree {
    pub fn new() -> Self {
        Self::from_directory(Directory::new())
    }

    pub fn from_directory(root: Directory) -> Self {
        Self {
            root: Node::Directory(root),
            cwd: NodePath::root(),
            hook: None,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn cwd(&self) -> &NodePath {
        &self.cwd
    }

    /// Changes the working directory, following symlinks.
    pub fn cd(&mut self, path: &str) -> Result<&mut Self, TreeError> {
        let physical = self.locate(path, Follow::Leaf)?;
        ensure!(
            self.node_at(&physical).is_some_and(Node::is_directory),
            NotADirectorySnafu { path: physical }
        );
        debug!("Changing directory to {}", physical);
        self.cwd = physical;
        Ok(self)
    }

    /// Installs a callback run after every successful mutation, replacing
    /// any previous one.
    pub fn set_hook(&mut self, hook: impl FnMut(&Mutation, &Tree) + 'static) {
        self.hook = Some(Box::new(hook));
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    pub(super) fn notify(&mut self, operation: Operation, paths: Vec<NodePath>) {
        let mutation = Mutation::new(operation, paths);
        debug!("Applied {} to {:?}", mutation.operation, mutation.paths);

        if let Some(mut hook) = self.hook.take() {
            hook(&mutation, self);
            self.hook = Some(hook);
        }
    }

    /// Looks up a physical path without following any symlink.
    pub(super) fn node_at(&self, path: &NodePath) -> Option<&Node> {
        path.segments()
            .iter()
            .try_fold(&self.root, |node, segment| node.as_directory()?.get(segment))
    }

    pub(super) fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for segment in path.segments() {
            node = node.as_directory_mut()?.get_mut(segment)?;
        }
        Some(node)
    }

    pub(super) fn dir_at_mut(&mut self, path: &NodePath) -> Result<&mut Directory, TreeError> {
        self.node_at_mut(path)
            .and_then(Node::as_directory_mut)
            .context(NotADirectorySnafu { path: path.clone() })
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Tree {
    type Err = TreeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let root = parse(raw).context(MalformedInputSnafu)?;
        Ok(Self::from_directory(root))
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Node::Directory(root) = &self.root else {
            return Err(fmt::Error);
        };
        f.write_str(&serialize(root))
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("cwd", &self.cwd)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
