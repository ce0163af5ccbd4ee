use std::rc::Rc;

use crate::node::Node;
use crate::path::NodePath;

/// Name shown for the root when it is the start of a walk
pub const ROOT_NAME: &str = "root";

/// Depth-first, pre-order walk over a subtree.
///
/// Children are visited in insertion order and symlinks are never followed.
/// Pending nodes live on an explicit stack, so the depth of the subtree is
/// only bounded by memory.
pub struct Walk<'a> {
    base: Rc<NodePath>,
    pending: Vec<WalkEntry<'a>>,
}

impl<'a> Walk<'a> {
    /// Walks `node` and everything below it. `path` is where `node` lives.
    pub fn new(path: NodePath, node: &'a Node) -> Self {
        let base = Rc::new(path);
        let start = WalkEntry {
            base: base.clone(),
            trail: None,
            node,
            depth: 0,
            last: true,
        };
        Self {
            base,
            pending: vec![start],
        }
    }

    /// Path of the start node
    pub fn base(&self) -> &NodePath {
        &self.base
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = WalkEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.pending.pop()?;

        if let Node::Directory(dir) = entry.node {
            let mut last = true;
            for (name, child) in dir.iter().rev() {
                self.pending.push(WalkEntry {
                    base: self.base.clone(),
                    trail: Some(Rc::new(TrailLink {
                        parent: entry.trail.clone(),
                        name,
                    })),
                    node: child,
                    depth: entry.depth + 1,
                    last,
                });
                last = false;
            }
        }

        Some(entry)
    }
}

/// A node produced by [`Walk`], with enough context to rebuild its path
#[derive(Clone)]
pub struct WalkEntry<'a> {
    base: Rc<NodePath>,
    trail: Option<Rc<TrailLink<'a>>>,
    node: &'a Node,
    depth: usize,
    last: bool,
}

impl<'a> WalkEntry<'a> {
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Depth below the start node, which has depth 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this is the last child of its parent
    pub fn is_last(&self) -> bool {
        self.last
    }

    pub fn name(&self) -> &str {
        match &self.trail {
            Some(link) => link.name,
            None => self.base.name().unwrap_or(ROOT_NAME),
        }
    }

    pub fn path(&self) -> NodePath {
        let mut names = Vec::with_capacity(self.depth);
        let mut link = self.trail.as_deref();
        while let Some(current) = link {
            names.push(current.name);
            link = current.parent.as_deref();
        }

        let mut path = (*self.base).clone();
        for name in names.into_iter().rev() {
            path.push(name);
        }
        path
    }
}

/// One step of the path from the start node down to an entry.
struct TrailLink<'a> {
    parent: Option<Rc<TrailLink<'a>>>,
    name: &'a str,
}

impl Drop for TrailLink<'_> {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(link) = parent {
            match Rc::try_unwrap(link) {
                Ok(mut inner) => parent = inner.parent.take(),
                Err(_) => break,
            }
        }
    }
}
