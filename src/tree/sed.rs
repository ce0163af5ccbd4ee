use regex::{NoExpand, Regex};
use snafu::ensure;

use super::Tree;
use super::mutation::Operation;
use super::resolve::Follow;
use super::search::build_regex;
use super::tree_error::{NotAFileSnafu, TreeError};
use crate::node::Node;
use crate::path::NodePath;
use crate::traversal::Walk;

/// Flags of [`Tree::sed`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SedOptions {
    /// Edit every file below the path instead of a single file
    pub recursive: bool,
    /// Replacements per file, 0 for all of them
    pub count: usize,
    pub ignore_case: bool,
    /// Treat the pattern and the replacement as plain text
    pub literal: bool,
}

impl Tree {
    /// Replaces regex matches in file content.
    ///
    /// The replacement may refer to capture groups as `$1` or `${name}`
    /// unless `literal` is set. All edits are computed before the first one
    /// is applied.
    pub fn sed(
        &mut self,
        path: &str,
        pattern: &str,
        replacement: &str,
        options: &SedOptions,
    ) -> Result<&mut Self, TreeError> {
        let regex = match options.literal {
            true => build_regex(&regex::escape(pattern), options.ignore_case)?,
            false => build_regex(pattern, options.ignore_case)?,
        };
        let (start, node) = self.lookup(path, Follow::Leaf)?;
        if !options.recursive {
            ensure!(node.is_file(), NotAFileSnafu { path: start });
        }

        let edits: Vec<(NodePath, String)> = Walk::new(start, node)
            .filter_map(|entry| {
                let content = entry.node().content()?;
                let edited = replace(&regex, content, replacement, options);
                (edited != content).then(|| (entry.path(), edited))
            })
            .collect();

        let mut edited_paths = Vec::with_capacity(edits.len());
        for (path, edited) in edits {
            if let Some(Node::File { content }) = self.node_at_mut(&path) {
                *content = edited;
            }
            edited_paths.push(path);
        }

        if !edited_paths.is_empty() {
            self.notify(Operation::Sed, edited_paths);
        }
        Ok(self)
    }
}

fn replace(regex: &Regex, content: &str, replacement: &str, options: &SedOptions) -> String {
    match options.literal {
        true => regex
            .replacen(content, options.count, NoExpand(replacement))
            .into_owned(),
        false => regex
            .replacen(content, options.count, replacement)
            .into_owned(),
    }
}
