use super::Tree;
use super::resolve::Follow;
use super::tree_error::TreeError;
use crate::node::Node;
use crate::traversal::Walk;

const PREVIEW_CHARS: usize = 50;

impl Tree {
    /// Draws the subtree at `path` with box-drawing connectors.
    ///
    /// ```text
    /// root/
    /// ├── docs/
    /// │   └── readme: hello
    /// └── latest -> /docs/readme
    /// ```
    pub fn render(&self, path: &str) -> Result<String, TreeError> {
        let (start, node) = self.lookup(path, Follow::Leaf)?;

        let mut lines = Vec::new();
        // Whether each ancestor below the start was the last of its siblings
        let mut last_flags: Vec<bool> = Vec::new();

        for entry in Walk::new(start, node) {
            let label = label(entry.name(), entry.node());
            if entry.depth() == 0 {
                lines.push(label);
                continue;
            }

            last_flags.truncate(entry.depth() - 1);
            let mut line: String = last_flags
                .iter()
                .map(|&last| if last { "    " } else { "│   " })
                .collect();
            line.push_str(if entry.is_last() { "└── " } else { "├── " });
            line.push_str(&label);
            lines.push(line);
            last_flags.push(entry.is_last());
        }

        Ok(lines.join("\n"))
    }
}

fn label(name: &str, node: &Node) -> String {
    match node {
        Node::Directory(_) => format!("{name}/"),
        Node::Symlink { target } => format!("{name} -> {target}"),
        Node::File { content } if content.is_empty() => name.to_owned(),
        Node::File { content } => format!("{name}: {}", preview(content)),
    }
}

fn preview(content: &str) -> String {
    let mut preview: String = content
        .chars()
        .take(PREVIEW_CHARS)
        .map(|ch| if ch == '\n' { ' ' } else { ch })
        .collect();
    if content.chars().nth(PREVIEW_CHARS).is_some() {
        preview.push_str("...");
    }
    preview
}
