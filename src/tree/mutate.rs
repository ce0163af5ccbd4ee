use snafu::{OptionExt, ensure};

use super::Tree;
use super::mutation::Operation;
use super::resolve::{Follow, Placement};
use super::tree_error::{
    AlreadyExistsSnafu, InvalidMoveSnafu, InvalidNameSnafu, NotAFileSnafu, NotEmptySnafu,
    NotFoundSnafu, RootSnafu, TreeError,
};
use crate::node::Node;
use crate::path::NodePath;

/// How `mv` and `cp` treat their source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    Move,
    Copy,
}

impl Tree {
    /// Creates a directory.
    ///
    /// With `parents`, missing ancestors are created too and an existing
    /// directory is left alone.
    pub fn mkdir(&mut self, path: &str, parents: bool) -> Result<&mut Self, TreeError> {
        let target = NodePath::normalize(path, &self.cwd);
        if parents && self.is_dir(&target.to_string()) {
            return Ok(self);
        }
        ensure!(!target.is_root(), AlreadyExistsSnafu { path: target });

        let placement = self.place(&target)?;
        if let Some(first) = placement.missing.first() {
            ensure!(
                parents,
                NotFoundSnafu {
                    path: placement.parent.join(first.as_str()),
                }
            );
        }
        self.ensure_vacant(&placement)?;

        let created = self.insert_at(&placement, Node::directory())?;
        self.notify(Operation::Mkdir, vec![created]);
        Ok(self)
    }

    /// Creates a file, together with any missing parent directories.
    ///
    /// On an existing node, empty `content` changes nothing; otherwise a
    /// file (or the file behind a symlink) is overwritten and a directory is
    /// an error.
    pub fn touch(&mut self, path: &str, content: &str) -> Result<&mut Self, TreeError> {
        let target = NodePath::normalize(path, &self.cwd);
        if !self.exists(&target.to_string()) {
            return self.create_file(&target, content, Operation::Touch);
        }
        if content.is_empty() {
            return Ok(self);
        }
        self.overwrite(&target.to_string(), content, Operation::Touch)
    }

    /// Replaces the content of a file, following symlinks. Missing files
    /// are created.
    pub fn write(&mut self, path: &str, content: &str) -> Result<&mut Self, TreeError> {
        match self.locate(path, Follow::Leaf) {
            Ok(physical) => self.overwrite(&physical.to_string(), content, Operation::Write),
            Err(TreeError::NotFoundError { .. }) => {
                let target = NodePath::normalize(path, &self.cwd);
                self.create_file(&target, content, Operation::Write)
            }
            Err(err) => Err(err),
        }
    }

    /// Removes a node. A symlink is removed itself, never its target.
    pub fn rm(&mut self, path: &str, recursive: bool) -> Result<&mut Self, TreeError> {
        let (physical, node) = self.lookup(path, Follow::Never)?;
        ensure!(!physical.is_root(), RootSnafu);
        if let Node::Directory(dir) = node {
            ensure!(
                recursive || dir.is_empty(),
                NotEmptySnafu { path: physical }
            );
        }

        self.detach(&physical)?;
        if self.cwd.starts_with(&physical) {
            self.cwd = physical.parent();
        }
        self.notify(Operation::Rm, vec![physical]);
        Ok(self)
    }

    /// Moves a node.
    ///
    /// An existing directory at `destination` receives the node under its
    /// own name. Otherwise `destination` is the new path, with missing
    /// parents created and a file or symlink already there replaced.
    /// Moving a node onto itself changes nothing.
    pub fn mv(&mut self, source: &str, destination: &str) -> Result<&mut Self, TreeError> {
        self.transfer(source, destination, Transfer::Move)
    }

    /// Copies a node deeply, with the destination rules of [`Tree::mv`].
    /// Symlinks are copied as symlinks. Copying a node onto itself or into
    /// its own subtree is rejected.
    pub fn cp(&mut self, source: &str, destination: &str) -> Result<&mut Self, TreeError> {
        self.transfer(source, destination, Transfer::Copy)
    }

    /// Creates a symlink at `link` storing `target` verbatim.
    ///
    /// When `link` is an existing directory, the symlink is created inside
    /// it, named after the last segment of `target`.
    pub fn ln(&mut self, target: &str, link: &str) -> Result<&mut Self, TreeError> {
        let placement = match self.lookup(link, Follow::Leaf) {
            Ok((dir, Node::Directory(_))) => {
                let base = NodePath::parse(target);
                let name = base.name().context(InvalidNameSnafu { name: target })?;
                Placement::inside(dir, name)?
            }
            _ => self.place(&NodePath::normalize(link, &self.cwd))?,
        };
        self.ensure_vacant(&placement)?;

        let created = self.insert_at(&placement, Node::symlink(target))?;
        self.notify(Operation::Ln, vec![created]);
        Ok(self)
    }

    fn transfer(
        &mut self,
        source: &str,
        destination: &str,
        mode: Transfer,
    ) -> Result<&mut Self, TreeError> {
        let (from, node) = self.lookup(source, Follow::Never)?;
        ensure!(!from.is_root(), RootSnafu);
        let name = from.name().context(RootSnafu)?;

        let placement = match self.lookup(destination, Follow::Leaf) {
            Ok((dir, Node::Directory(_))) => Placement::inside(dir, name)?,
            _ => self.place(&NodePath::normalize(destination, &self.cwd))?,
        };
        let to = placement.target();

        if to == from {
            return match mode {
                Transfer::Move => Ok(self),
                Transfer::Copy => InvalidMoveSnafu { path: from }.fail(),
            };
        }
        ensure!(!to.starts_with(&from), InvalidMoveSnafu { path: from });
        if let Some(Node::Directory(_)) = self.node_at(&to) {
            return AlreadyExistsSnafu { path: to }.fail();
        }

        let copy = match mode {
            Transfer::Copy => Some(node.clone()),
            Transfer::Move => None,
        };

        // Every check has passed: from here on the tree is edited.
        self.materialize(&placement)?;
        let moved = match copy {
            Some(copy) => copy,
            None => self.detach(&from)?,
        };
        self.dir_at_mut(&to.parent())?
            .insert(placement.name.as_str(), moved);

        let operation = match mode {
            Transfer::Move => {
                if let Some(rebased) = self.cwd.rebase(&from, &to) {
                    self.cwd = rebased;
                }
                Operation::Mv
            }
            Transfer::Copy => Operation::Cp,
        };
        self.notify(operation, vec![from, to]);
        Ok(self)
    }

    fn create_file(
        &mut self,
        target: &NodePath,
        content: &str,
        operation: Operation,
    ) -> Result<&mut Self, TreeError> {
        let placement = self.place(target)?;
        self.ensure_vacant(&placement)?;

        let created = self.insert_at(&placement, Node::file(content))?;
        self.notify(operation, vec![created]);
        Ok(self)
    }

    /// Replaces the content of the existing file at `path`, following symlinks.
    fn overwrite(
        &mut self,
        path: &str,
        content: &str,
        operation: Operation,
    ) -> Result<&mut Self, TreeError> {
        let physical = self.locate(path, Follow::Leaf)?;
        match self.node_at_mut(&physical) {
            Some(Node::File { content: existing }) => *existing = content.to_owned(),
            _ => return NotAFileSnafu { path: physical }.fail(),
        }
        self.notify(operation, vec![physical]);
        Ok(self)
    }

    /// Creates missing parents and inserts `node`, returning its path.
    fn insert_at(&mut self, placement: &Placement, node: Node) -> Result<NodePath, TreeError> {
        self.materialize(placement)?
            .insert(placement.name.as_str(), node);
        Ok(placement.target())
    }

    /// Unlinks the node at a physical path from its parent.
    fn detach(&mut self, physical: &NodePath) -> Result<Node, TreeError> {
        let name = physical.name().context(RootSnafu)?;
        self.dir_at_mut(&physical.parent())?
            .remove(name)
            .context(NotFoundSnafu {
                path: physical.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        let mut tree = Tree::new();
        tree.mkdir("/a/b", true)
            .unwrap()
            .touch("/a/b/file", "data")
            .unwrap()
            .touch("/a/other", "x")
            .unwrap()
            .mkdir("/dest", false)
            .unwrap();
        tree
    }

    fn assert_error(result: Result<&mut Tree, TreeError>, check: impl Fn(&TreeError) -> bool) {
        match result {
            Ok(_) => panic!("expected an error"),
            Err(err) => assert!(check(&err), "unexpected error: {err:?}"),
        }
    }

    #[test]
    fn test_mkdir_rules() {
        let mut tree = sample();
        assert_error(tree.mkdir("/x/y", false), |err| {
            matches!(err, TreeError::NotFoundError { path } if path.to_string() == "/x")
        });
        assert_error(tree.mkdir("/a", false), |err| {
            matches!(err, TreeError::AlreadyExistsError { .. })
        });
        assert_error(tree.mkdir("/a/b/file", true), |err| {
            matches!(err, TreeError::AlreadyExistsError { .. })
        });
        assert_error(tree.mkdir("/bad name", false), |err| {
            matches!(err, TreeError::InvalidNameError { .. })
        });

        tree.mkdir("/a", true).unwrap().mkdir("/x/y/z", true).unwrap();
        assert!(tree.is_dir("/x/y/z"));
        assert!(tree.is_dir("/"));
    }

    #[test]
    fn test_touch_rules() {
        let mut tree = sample();
        tree.touch("/new/deep/file", "").unwrap();
        assert_eq!(tree.read("/new/deep/file").unwrap(), "");

        tree.touch("/a/b/file", "").unwrap();
        assert_eq!(tree.read("/a/b/file").unwrap(), "data");
        tree.touch("/a/b/file", "fresh").unwrap();
        assert_eq!(tree.read("/a/b/file").unwrap(), "fresh");

        tree.touch("/a", "").unwrap();
        assert_error(tree.touch("/a", "content"), |err| {
            matches!(err, TreeError::NotAFileError { .. })
        });
    }

    #[test]
    fn test_write_follows_links_and_creates_files() {
        let mut tree = sample();
        tree.ln("/a/b/file", "/shortcut").unwrap();
        tree.write("/shortcut", "through").unwrap();
        assert_eq!(tree.read("/a/b/file").unwrap(), "through");
        assert!(tree.is_link("/shortcut"));

        tree.write("/fresh/file", "new").unwrap();
        assert_eq!(tree.read("/fresh/file").unwrap(), "new");

        assert_error(tree.write("/a", "x"), |err| {
            matches!(err, TreeError::NotAFileError { .. })
        });
    }

    #[test]
    fn test_rm_rules() {
        let mut tree = sample();
        assert_error(tree.rm("/", true), |err| matches!(err, TreeError::RootError));
        assert_error(tree.rm("/a", false), |err| {
            matches!(err, TreeError::NotEmptyError { .. })
        });

        tree.rm("/dest", false).unwrap();
        assert!(!tree.exists("/dest"));

        tree.cd("/a/b").unwrap();
        tree.rm("/a", true).unwrap();
        assert!(!tree.exists("/a"));
        assert_eq!(tree.cwd(), &NodePath::root());
    }

    #[test]
    fn test_rm_removes_link_not_target() {
        let mut tree = sample();
        tree.ln("/a/b", "/link").unwrap();
        tree.rm("/link", false).unwrap();
        assert!(!tree.exists("/link"));
        assert!(tree.exists("/a/b/file"));
    }

    #[test]
    fn test_mv_into_existing_directory() {
        let mut tree = sample();
        tree.mv("/a/other", "/dest").unwrap();
        assert_eq!(tree.read("/dest/other").unwrap(), "x");
        assert!(!tree.exists("/a/other"));
    }

    #[test]
    fn test_mv_renames_and_creates_parents() {
        let mut tree = sample();
        tree.mv("/a/b", "/moved/here").unwrap();
        assert_eq!(tree.read("/moved/here/file").unwrap(), "data");
        assert!(!tree.exists("/a/b"));
    }

    #[test]
    fn test_mv_replaces_file_in_place() {
        let mut tree = sample();
        tree.touch("/dest/keep", "").unwrap().touch("/dest/old", "old").unwrap();
        tree.touch("/dest/last", "").unwrap();
        tree.mv("/a/other", "/dest/old").unwrap();

        assert_eq!(tree.read("/dest/old").unwrap(), "x");
        assert_eq!(tree.ls("/dest").unwrap(), vec!["keep", "old", "last"]);
    }

    #[test]
    fn test_mv_rejects_invalid_moves_without_changes() {
        let mut tree = sample();
        tree.mkdir("/dest/a", false).unwrap();
        let before = tree.to_string();

        assert_error(tree.mv("/a", "/a/b/inside"), |err| {
            matches!(err, TreeError::InvalidMoveError { .. })
        });
        assert_error(tree.mv("/a", "/dest"), |err| {
            matches!(err, TreeError::AlreadyExistsError { .. })
        });
        assert_error(tree.mv("/missing", "/dest"), |err| {
            matches!(err, TreeError::NotFoundError { .. })
        });
        assert_error(tree.mv("/a/other", "/a/other/x"), |err| {
            matches!(err, TreeError::NotADirectoryError { .. })
        });
        assert_error(tree.mv("/a", "/a"), |err| {
            matches!(err, TreeError::InvalidMoveError { .. })
        });
        assert_eq!(tree.to_string(), before);

        tree.mv("/a/other", "/a/other").unwrap();
        assert_eq!(tree.to_string(), before);
    }

    #[test]
    fn test_mv_rebases_cwd() {
        let mut tree = sample();
        tree.cd("/a/b").unwrap();
        tree.mv("/a", "/dest").unwrap();
        assert_eq!(tree.cwd().to_string(), "/dest/a/b");
    }

    #[test]
    fn test_cp_is_deep_and_independent() {
        let mut tree = sample();
        tree.cp("/a", "/copy").unwrap();
        tree.write("/copy/b/file", "changed").unwrap();

        assert_eq!(tree.read("/a/b/file").unwrap(), "data");
        assert_eq!(tree.read("/copy/b/file").unwrap(), "changed");

        assert_error(tree.cp("/a", "/a"), |err| {
            matches!(err, TreeError::InvalidMoveError { .. })
        });
        assert_error(tree.cp("/a/other", "/a/other"), |err| {
            matches!(err, TreeError::InvalidMoveError { .. })
        });
    }

    #[test]
    fn test_cp_copies_links_as_links() {
        let mut tree = sample();
        tree.ln("/a/b/file", "/link").unwrap();
        tree.cp("/link", "/dest").unwrap();
        assert_eq!(tree.readlink("/dest/link").unwrap(), "/a/b/file");
    }

    #[test]
    fn test_ln_rules() {
        let mut tree = sample();
        tree.ln("/a/b/file", "/dest").unwrap();
        assert_eq!(tree.readlink("/dest/file").unwrap(), "/a/b/file");

        tree.ln("../a/other", "/links/other").unwrap();
        assert_eq!(tree.read("/links/other").unwrap(), "x");

        assert_error(tree.ln("/a", "/a/other"), |err| {
            matches!(err, TreeError::AlreadyExistsError { .. })
        });
    }

    #[test]
    fn test_symlink_loop_is_an_error_not_a_hang() {
        let mut tree = Tree::new();
        tree.ln("/b", "/a").unwrap().ln("/a", "/b").unwrap();
        assert!(matches!(
            tree.read("/a").unwrap_err(),
            TreeError::SymlinkLoopError { .. }
        ));
    }

    #[test]
    fn test_hook_receives_paths_of_transfers_and_edits() {
        use crate::tree::SedOptions;
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<(String, Vec<String>)>>> = Rc::default();
        let recorder = seen.clone();

        let mut tree = sample();
        tree.set_hook(move |mutation, _| {
            recorder.borrow_mut().push((
                mutation.operation.to_string(),
                mutation.paths.iter().map(ToString::to_string).collect(),
            ));
        });

        tree.cp("/a/other", "/dest").unwrap();
        tree.mv("/a/b", "/moved").unwrap();
        tree.sed("/dest/other", "x", "y", &SedOptions::default()).unwrap();
        tree.sed("/dest/other", "nothing", "z", &SedOptions::default()).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                ("cp".to_owned(), vec!["/a/other".to_owned(), "/dest/other".to_owned()]),
                ("mv".to_owned(), vec!["/a/b".to_owned(), "/moved".to_owned()]),
                ("sed".to_owned(), vec!["/dest/other".to_owned()]),
            ]
        );
    }
}
