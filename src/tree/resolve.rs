use std::collections::VecDeque;

use snafu::{OptionExt, ensure};
use tracing::debug;

use super::Tree;
use super::tree_error::{
    AlreadyExistsSnafu, BrokenLinkSnafu, InvalidNameSnafu, NotADirectorySnafu, NotFoundSnafu,
    RootSnafu, SymlinkLoopSnafu, TreeError,
};
use crate::node::{Directory, Node};
use crate::path::{NodePath, is_valid_name};

/// Symlinks followed at most while resolving one path
pub const MAX_SYMLINK_HOPS: usize = 40;

/// Whether a symlink in the last segment of a path is dereferenced.
///
/// Symlinks in intermediate segments are always followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Follow {
    Never,
    Leaf,
}

/// Where a node is about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Placement {
    /// Physical path of the deepest existing directory
    pub parent: NodePath,
    /// Directories to create below `parent`
    pub missing: Vec<String>,
    pub name: String,
}

impl Placement {
    /// Placement for a node named `name` directly inside the existing
    /// directory `dir`.
    pub fn inside(dir: NodePath, name: &str) -> Result<Self, TreeError> {
        ensure!(is_valid_name(name), InvalidNameSnafu { name });
        Ok(Self {
            parent: dir,
            missing: Vec::new(),
            name: name.to_owned(),
        })
    }

    /// Physical path the new node will have
    pub fn target(&self) -> NodePath {
        let mut target = self.parent.clone();
        for segment in &self.missing {
            target.push(segment.as_str());
        }
        target.push(self.name.as_str());
        target
    }
}

impl Tree {
    /// Resolves `raw` to the physical path of an existing node.
    pub fn locate(&self, raw: &str, follow: Follow) -> Result<NodePath, TreeError> {
        let (path, _) = self.lookup(raw, follow)?;
        Ok(path)
    }

    /// Resolves `raw` to an existing node.
    pub fn resolve(&self, raw: &str, follow: Follow) -> Result<&Node, TreeError> {
        let (_, node) = self.lookup(raw, follow)?;
        Ok(node)
    }

    /// Resolves `raw` to both its physical path and its node.
    ///
    /// `.` and `..` in `raw` are normalized against the cwd before the
    /// lookup, so a path names the same node whether it is read or created.
    pub(super) fn lookup(&self, raw: &str, follow: Follow) -> Result<(NodePath, &Node), TreeError> {
        let normalized = NodePath::normalize(raw, &self.cwd);
        let pending = normalized
            .segments()
            .iter()
            .map(|segment| (segment.clone(), None))
            .collect();
        self.descend(NodePath::root(), pending, Vec::new(), follow, raw)
    }

    /// Physical path a symlink points to, following links on the way but
    /// not a link at the very end.
    pub(super) fn link_destination(&self, link: &NodePath, target: &str) -> Result<NodePath, TreeError> {
        let start = match target.starts_with('/') {
            true => NodePath::root(),
            false => link.parent(),
        };
        let pending = split(target)
            .map(|segment| (segment.to_owned(), Some(0)))
            .collect();
        let links = vec![(link.clone(), target.to_owned())];
        let (path, _) = self.descend(start, pending, links, Follow::Never, &link.to_string())?;
        Ok(path)
    }

    /// Segment-by-segment resolution with an explicit queue, so link
    /// targets are spliced in front of the segments still to visit.
    ///
    /// Only segments spliced in from a link target may be `..`; they step
    /// back from wherever the link physically lives.
    fn descend(
        &self,
        start: NodePath,
        mut pending: VecDeque<(String, Option<usize>)>,
        // Link path and target for every followed symlink, indexed by the
        // second field of `pending`
        mut links: Vec<(NodePath, String)>,
        follow: Follow,
        raw: &str,
    ) -> Result<(NodePath, &Node), TreeError> {
        // Each visited segment keeps its node, so `..` can step back
        // without another lookup from the root.
        let mut path = NodePath::root();
        let mut ancestors: Vec<&Node> = vec![&self.root];
        for segment in start.segments() {
            let node = ancestors
                .last()
                .and_then(|node| node.as_directory())
                .and_then(|dir| dir.get(segment))
                .context(NotFoundSnafu { path: start.clone() })?;
            path.push(segment.as_str());
            ancestors.push(node);
        }

        while let Some((segment, origin)) = pending.pop_front() {
            if segment == ".." {
                if path.pop().is_some() {
                    ancestors.pop();
                }
                continue;
            }

            let current = ancestors.last().copied().unwrap_or(&self.root);
            let dir = current
                .as_directory()
                .context(NotADirectorySnafu { path: path.clone() })?;

            let Some(child) = dir.get(&segment) else {
                return Err(match origin {
                    Some(index) => BrokenLinkSnafu {
                        link: links[index].0.clone(),
                        target: links[index].1.clone(),
                    }
                    .build(),
                    None => NotFoundSnafu {
                        path: path.join(segment),
                    }
                    .build(),
                });
            };

            match child {
                Node::Symlink { target } if !pending.is_empty() || follow == Follow::Leaf => {
                    ensure!(
                        links.len() < MAX_SYMLINK_HOPS,
                        SymlinkLoopSnafu { path: raw }
                    );
                    let link = path.join(segment);
                    debug!("Following symlink {} -> {}", link, target);

                    if target.starts_with('/') {
                        path = NodePath::root();
                        ancestors.truncate(1);
                    }
                    let index = links.len();
                    for part in split(target).rev() {
                        pending.push_front((part.to_owned(), Some(index)));
                    }
                    links.push((link, target.clone()));
                }
                _ => {
                    path.push(segment);
                    ancestors.push(child);
                }
            }
        }

        let node = ancestors.last().copied().unwrap_or(&self.root);
        Ok((path, node))
    }

    /// Finds where a node at `target` would be created.
    ///
    /// Existing ancestors are followed through symlinks; the first missing
    /// one and everything below it end up in [`Placement::missing`].
    pub(super) fn place(&self, target: &NodePath) -> Result<Placement, TreeError> {
        let name = target.name().context(RootSnafu)?;
        let parent = target.parent();

        let mut physical = NodePath::root();
        let mut current = &self.root;
        let mut missing = Vec::new();

        for (index, segment) in parent.segments().iter().enumerate() {
            let dir = current
                .as_directory()
                .context(NotADirectorySnafu { path: physical.clone() })?;
            match dir.get(segment) {
                None => {
                    missing = parent.segments()[index..].to_vec();
                    break;
                }
                Some(Node::Symlink { .. }) => {
                    let (resolved, node) =
                        self.lookup(&physical.join(segment.as_str()).to_string(), Follow::Leaf)?;
                    physical = resolved;
                    current = node;
                }
                Some(child) => {
                    physical.push(segment.as_str());
                    current = child;
                }
            }
        }

        ensure!(
            current.is_directory(),
            NotADirectorySnafu { path: physical }
        );
        for segment in missing.iter().map(String::as_str).chain([name]) {
            ensure!(is_valid_name(segment), InvalidNameSnafu { name: segment });
        }

        Ok(Placement {
            parent: physical,
            missing,
            name: name.to_owned(),
        })
    }

    /// Fails when something already occupies the placement's target.
    pub(super) fn ensure_vacant(&self, placement: &Placement) -> Result<(), TreeError> {
        let target = placement.target();
        ensure!(
            !placement.missing.is_empty() || self.node_at(&target).is_none(),
            AlreadyExistsSnafu { path: target }
        );
        Ok(())
    }

    /// Creates the missing directories of a placement and returns the
    /// directory the new node goes into.
    pub(super) fn materialize(&mut self, placement: &Placement) -> Result<&mut Directory, TreeError> {
        let mut path = placement.parent.clone();
        let mut dir = self.dir_at_mut(&placement.parent)?;
        for segment in &placement.missing {
            path.push(segment.as_str());
            dir.insert(segment.as_str(), Node::directory());
            dir = dir
                .get_mut(segment)
                .and_then(Node::as_directory_mut)
                .context(NotADirectorySnafu { path: path.clone() })?;
        }
        Ok(dir)
    }
}

/// Segments of a raw path, without empty ones and `.`
fn split(raw: &str) -> impl DoubleEndedIterator<Item = &str> {
    raw.split('/').filter(|segment| !segment.is_empty() && *segment != ".")
}
