use std::fmt;

/// A normalized absolute path inside the tree.
///
/// Holds plain segments only: no empty segments, no `.` and no `..`.
/// The root is the empty sequence and displays as `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Lexically normalizes `raw` against `cwd`.
    ///
    /// Absolute paths start from the root, relative ones from `cwd`.
    /// `..` above the root stays at the root.
    pub fn normalize(raw: &str, cwd: &NodePath) -> Self {
        let mut path = if raw.starts_with('/') {
            NodePath::root()
        } else {
            cwd.clone()
        };

        for segment in raw.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    path.segments.pop();
                }
                name => path.segments.push(name.to_owned()),
            }
        }

        path
    }

    /// Normalizes `raw` as if the working directory were the root.
    pub fn parse(raw: &str) -> Self {
        Self::normalize(raw, &NodePath::root())
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, `None` for the root
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent path; the root is its own parent
    pub fn parent(&self) -> NodePath {
        let mut parent = self.clone();
        parent.segments.pop();
        parent
    }

    pub fn join(&self, name: impl Into<String>) -> NodePath {
        let mut joined = self.clone();
        joined.push(name);
        joined
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.segments.push(name.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Replaces the `from` prefix of this path with `to`.
    pub fn rebase(&self, from: &NodePath, to: &NodePath) -> Option<NodePath> {
        let rest = self.segments.strip_prefix(from.segments.as_slice())?;
        let mut rebased = to.clone();
        rebased.segments.extend(rest.iter().cloned());
        Some(rebased)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for NodePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}
