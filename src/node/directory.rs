use std::fmt;
use std::mem;

use hashlink::LinkedHashMap;
use hashlink::linked_hash_map::Iter;

use super::Node;

/// Ordered mapping from child name to owned child node.
///
/// Children keep their insertion order. Dropping, cloning and comparing a
/// directory never recurses, so subtrees of any depth are safe to handle.
#[derive(Default)]
pub struct Directory {
    entries: LinkedHashMap<String, Node>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.entries.get_mut(name)
    }

    /// Inserts a child, returning the node it replaced.
    ///
    /// A replaced child keeps its position; a new child is appended.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) -> Option<Node> {
        let name = name.into();
        match self.entries.get_mut(&name) {
            Some(slot) => Some(mem::replace(slot, node)),
            None => {
                self.entries.insert(name, node);
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.entries.remove(name)
    }

    pub fn names(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.iter().map(|(name, _)| name)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    fn raw_iter(&self) -> Iter<'_, String, Node> {
        self.entries.iter()
    }
}

impl Drop for Directory {
    fn drop(&mut self) {
        let mut pending: Vec<Node> = mem::take(&mut self.entries)
            .into_iter()
            .map(|(_, node)| node)
            .collect();

        while let Some(node) = pending.pop() {
            if let Node::Directory(mut dir) = node {
                pending.extend(
                    mem::take(&mut dir.entries)
                        .into_iter()
                        .map(|(_, child)| child),
                );
            }
        }
    }
}

impl Clone for Directory {
    fn clone(&self) -> Self {
        // Post-order: a directory copy is attached to its parent once all of
        // its children have been copied.
        let mut stack: Vec<(Option<&str>, Iter<'_, String, Node>, Directory)> =
            vec![(None, self.raw_iter(), Directory::new())];

        while let Some((_, children, copy)) = stack.last_mut() {
            match children.next() {
                Some((name, Node::Directory(dir))) => {
                    stack.push((Some(name.as_str()), dir.raw_iter(), Directory::new()));
                }
                Some((name, leaf)) => {
                    copy.entries.insert(name.clone(), leaf.clone());
                }
                None => {
                    let Some((name, _, finished)) = stack.pop() else {
                        break;
                    };
                    match (name, stack.last_mut()) {
                        (Some(name), Some((_, _, parent))) => {
                            parent
                                .entries
                                .insert(name.to_owned(), Node::Directory(finished));
                        }
                        _ => return finished,
                    }
                }
            }
        }

        Directory::new()
    }
}

impl PartialEq for Directory {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];

        while let Some((left, right)) = pending.pop() {
            if left.len() != right.len() {
                return false;
            }
            for ((left_name, left_node), (right_name, right_node)) in
                left.raw_iter().zip(right.raw_iter())
            {
                if left_name != right_name {
                    return false;
                }
                match (left_node, right_node) {
                    (Node::Directory(left_dir), Node::Directory(right_dir)) => {
                        pending.push((left_dir, right_dir));
                    }
                    (Node::Directory(_), _) | (_, Node::Directory(_)) => return false,
                    (leaf, other_leaf) => {
                        if leaf != other_leaf {
                            return false;
                        }
                    }
                }
            }
        }

        true
    }
}

impl Eq for Directory {}

impl fmt::Debug for Directory {
    /// Shallow: lists child names and kinds only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(name, node)| (name, node.kind())))
            .finish()
    }
}
