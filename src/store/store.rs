use std::cell::RefCell;
use std::rc::Rc;

use snafu::ResultExt;
use tracing::{debug, error};

use super::store_error::{MalformedSnafu, StoreError};
use crate::tree::{Mutation, Tree, TreeError};

/// Somewhere a tree's serialized form can be kept between sessions
pub trait TreeStore {
    fn load(&self) -> Result<Tree, StoreError>;
    fn save(&self, tree: &Tree) -> Result<(), StoreError>;
}

/// Builds a tree from its serialized form.
pub fn load(raw: &str) -> Result<Tree, TreeError> {
    raw.parse()
}

/// The serialized form of a tree.
pub fn save(tree: &Tree) -> String {
    tree.to_string()
}

/// A hook that saves the whole tree to `store` after every mutation.
///
/// Failures are logged and otherwise ignored, so a broken store never
/// aborts an edit that already happened in memory.
pub fn sync_hook<S>(store: S) -> impl FnMut(&Mutation, &Tree) + 'static
where
    S: TreeStore + 'static,
{
    move |mutation, tree| match store.save(tree) {
        Ok(()) => debug!("Persisted tree after {}", mutation.operation),
        Err(err) => error!("Failed to persist tree after {}: {}", mutation.operation, err),
    }
}

/// Keeps the serialized tree in a shared string.
///
/// Clones share the same string, which makes it handy for hooks and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Rc<RefCell<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            data: Rc::new(RefCell::new(raw.into())),
        }
    }

    pub fn contents(&self) -> String {
        self.data.borrow().clone()
    }
}

impl TreeStore for MemoryStore {
    fn load(&self) -> Result<Tree, StoreError> {
        let data = self.data.borrow();
        if data.is_empty() {
            return Ok(Tree::new());
        }
        load(&data).context(MalformedSnafu)
    }

    fn save(&self, tree: &Tree) -> Result<(), StoreError> {
        *self.data.borrow_mut() = save(tree);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_save_are_inverse() {
        let mut tree = Tree::new();
        tree.touch("/a/b", "content").unwrap().ln("/a/b", "/c").unwrap();

        let raw = save(&tree);
        let reloaded = load(&raw).unwrap();
        assert_eq!(save(&reloaded), raw);
        assert_eq!(reloaded.root(), tree.root());
    }

    #[test]
    fn test_memory_store_starts_empty() {
        let tree = MemoryStore::new().load().unwrap();
        assert_eq!(save(&tree), "<root><empty></empty></root>");
    }

    #[test]
    fn test_memory_store_rejects_malformed_contents() {
        let err = MemoryStore::with_contents("<root>").load().unwrap_err();
        assert!(matches!(err, StoreError::MalformedError { .. }));
    }

    #[test]
    fn test_sync_hook_saves_after_each_mutation() {
        let store = MemoryStore::new();
        let mut tree = Tree::new();
        tree.set_hook(sync_hook(store.clone()));

        tree.mkdir("/docs", false).unwrap();
        assert_eq!(store.contents(), "<root><docs><empty></empty></docs></root>");

        tree.touch("/docs/readme", "hi").unwrap();
        assert_eq!(store.load().unwrap().read("/docs/readme").unwrap(), "hi");
    }
}
