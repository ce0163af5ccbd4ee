use regex::{Regex, RegexBuilder};
use snafu::ResultExt;

use super::Tree;
use super::glob::compile_glob;
use super::resolve::Follow;
use super::tree_error::{InvalidPatternSnafu, TreeError};
use crate::node::{Node, NodeKind};
use crate::path::NodePath;
use crate::traversal::Walk;

/// Flags of [`Tree::grep`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrepOptions {
    /// Match file content as well as names
    pub content: bool,
    pub ignore_case: bool,
    /// Report what does not match
    pub invert: bool,
    /// Report only how many results there are
    pub count: bool,
    /// Report `path:line:text` for each matching line of each file
    pub lines: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrepOutput {
    Matches(Vec<String>),
    Count(usize),
}

/// One directory of [`Tree::walk_dirs`], split like `os.walk`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub path: NodePath,
    pub dirs: Vec<String>,
    /// Files and symlinks
    pub files: Vec<String>,
}

impl Tree {
    /// Searches the subtree at `path` with a regex.
    ///
    /// Names are matched by default, file content too with `content`.
    /// Matching is case-sensitive unless `ignore_case` is set.
    pub fn grep(
        &self,
        pattern: &str,
        path: &str,
        options: &GrepOptions,
    ) -> Result<GrepOutput, TreeError> {
        let regex = build_regex(pattern, options.ignore_case)?;
        let (start, node) = self.lookup(path, Follow::Leaf)?;

        let mut results = Vec::new();
        for entry in Walk::new(start, node) {
            if options.lines {
                let Some(content) = entry.node().content() else {
                    continue;
                };
                let file = entry.path();
                results.extend(
                    content
                        .lines()
                        .enumerate()
                        .filter(|(_, line)| regex.is_match(line) != options.invert)
                        .map(|(index, line)| format!("{}:{}:{}", file, index + 1, line)),
                );
                continue;
            }

            let matched = regex.is_match(entry.name())
                || (options.content
                    && entry
                        .node()
                        .content()
                        .is_some_and(|content| regex.is_match(content)));
            if matched != options.invert {
                results.push(entry.path().to_string());
            }
        }

        Ok(match options.count {
            true => GrepOutput::Count(results.len()),
            false => GrepOutput::Matches(results),
        })
    }

    /// Paths of the nodes below `path` whose name matches `name` and whose
    /// own kind is `kind`. Symlinks count as their own kind.
    pub fn find(
        &self,
        path: &str,
        name: Option<&str>,
        kind: Option<NodeKind>,
        ignore_case: bool,
    ) -> Result<Vec<String>, TreeError> {
        let regex = name
            .map(|pattern| build_regex(pattern, ignore_case))
            .transpose()?;
        let (start, node) = self.lookup(path, Follow::Leaf)?;

        Ok(Walk::new(start, node)
            .filter(|entry| kind.is_none_or(|kind| entry.node().kind() == kind))
            .filter(|entry| {
                regex
                    .as_ref()
                    .is_none_or(|regex| regex.is_match(entry.name()))
            })
            .map(|entry| entry.path().to_string())
            .collect())
    }

    /// Paths below `path` matching a shell pattern. Relative patterns are
    /// anchored at `path`.
    pub fn glob(&self, pattern: &str, path: &str) -> Result<Vec<String>, TreeError> {
        let (start, node) = self.lookup(path, Follow::Leaf)?;
        let anchored = match pattern.starts_with('/') {
            true => pattern.to_owned(),
            false if start.is_root() => format!("/{pattern}"),
            false => format!("{start}/{pattern}"),
        };
        let regex = compile_glob(&anchored)?;

        Ok(Walk::new(start, node)
            .map(|entry| entry.path().to_string())
            .filter(|candidate| regex.is_match(candidate))
            .collect())
    }

    /// Number of nodes in the subtree, or with `content_size` the total
    /// bytes of file content.
    pub fn du(&self, path: &str, content_size: bool) -> Result<usize, TreeError> {
        let (start, node) = self.lookup(path, Follow::Leaf)?;
        let walk = Walk::new(start, node);
        Ok(match content_size {
            true => walk
                .filter_map(|entry| entry.node().content())
                .map(str::len)
                .sum(),
            false => walk.count(),
        })
    }

    /// Every directory of the subtree, pre-order, with its children split
    /// into directories and everything else.
    pub fn walk_dirs(&self, path: &str) -> Result<Vec<DirListing>, TreeError> {
        let (start, node) = self.lookup(path, Follow::Leaf)?;

        Ok(Walk::new(start, node)
            .filter_map(|entry| {
                let dir = entry.node().as_directory()?;
                let (dirs, files): (Vec<_>, Vec<_>) =
                    dir.iter().partition(|(_, child)| child.is_directory());
                Some(DirListing {
                    path: entry.path(),
                    dirs: dirs.into_iter().map(|(name, _)| name.to_owned()).collect(),
                    files: files.into_iter().map(|(name, _)| name.to_owned()).collect(),
                })
            })
            .collect())
    }

    /// Symlinks anywhere in the tree that lead to `path`.
    ///
    /// A link's target is resolved with every link on the way followed but
    /// not a link at its very end. Dangling targets are compared lexically.
    pub fn backlinks(&self, path: &str) -> Vec<String> {
        let wanted = self
            .locate(path, Follow::Never)
            .unwrap_or_else(|_| NodePath::normalize(path, &self.cwd));

        Walk::new(NodePath::root(), &self.root)
            .filter_map(|entry| {
                let Node::Symlink { target } = entry.node() else {
                    return None;
                };
                let link = entry.path();
                let points_to = self
                    .link_destination(&link, target)
                    .unwrap_or_else(|_| NodePath::normalize(target, &link.parent()));
                (points_to == wanted).then(|| link.to_string())
            })
            .collect()
    }
}

pub(super) fn build_regex(pattern: &str, ignore_case: bool) -> Result<Regex, TreeError> {
    RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .build()
        .context(InvalidPatternSnafu { pattern })
}
