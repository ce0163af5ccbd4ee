use super::{EMPTY_MARKER, LINK_OPENER, escape::escape};
use crate::node::{Directory, Node};
use crate::path::NodePath;
use crate::traversal::{ROOT_NAME, Walk};

/// Serializes a root directory.
///
/// The walk is pre-order, so an element is closed as soon as the walk comes
/// back up to its depth.
pub fn serialize(root: &Directory) -> String {
    let mut out = String::new();
    open_tag(&mut out, ROOT_NAME);
    if root.is_empty() {
        empty_marker(&mut out);
    }

    let mut open: Vec<String> = Vec::new();
    for (name, child) in root.iter() {
        for entry in Walk::new(NodePath::root().join(name), child) {
            while open.len() > entry.depth() {
                if let Some(done) = open.pop() {
                    close_tag(&mut out, &done);
                }
            }
            write_node(&mut out, &mut open, entry.name(), entry.node());
        }
        while let Some(done) = open.pop() {
            close_tag(&mut out, &done);
        }
    }

    close_tag(&mut out, ROOT_NAME);
    out
}

/// Writes one node. A non-empty directory is left open on `open`.
fn write_node(out: &mut String, open: &mut Vec<String>, name: &str, node: &Node) {
    match node {
        Node::Directory(dir) if dir.is_empty() => {
            open_tag(out, name);
            empty_marker(out);
            close_tag(out, name);
        }
        Node::Directory(_) => {
            open_tag(out, name);
            open.push(name.to_owned());
        }
        Node::File { content } => {
            open_tag(out, name);
            out.push_str(&escape(content));
            close_tag(out, name);
        }
        Node::Symlink { target } => {
            out.push('<');
            out.push_str(name);
            out.push_str(LINK_OPENER);
            out.push_str(&escape(target));
            out.push_str("\"/>");
        }
    }
}

fn empty_marker(out: &mut String) {
    open_tag(out, EMPTY_MARKER);
    close_tag(out, EMPTY_MARKER);
}

fn open_tag(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
}

fn close_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;
    use rstest::*;

    fn sample() -> Directory {
        let mut docs = Directory::new();
        docs.insert("readme", Node::file("hi & welcome"));
        docs.insert("latest", Node::symlink("readme"));
        docs.insert("blank", Node::file(""));

        let mut root = Directory::new();
        root.insert("docs", Node::Directory(docs));
        root.insert("tmp", Node::directory());
        root
    }

    #[test]
    fn test_serialize_empty_root() {
        assert_eq!(serialize(&Directory::new()), "<root><empty></empty></root>");
    }

    #[test]
    fn test_serialize_all_kinds() {
        assert_eq!(
            serialize(&sample()),
            r#"<root><docs><readme>hi &amp; welcome</readme><latest @="readme"/><blank></blank></docs><tmp><empty></empty></tmp></root>"#
        );
    }

    #[test]
    fn test_tree_survives_round_trip() {
        let tree = sample();
        assert_eq!(parse(&serialize(&tree)).unwrap(), tree);
    }

    #[rstest]
    #[case("<root><empty></empty></root>")]
    #[case(r#"<root><a><b><c>deep</c></b><d @="/a/b/c"/></a><e></e></root>"#)]
    #[case(r#"<root><code>if (a &lt; b &amp;&amp; c &gt; d) {}</code></root>"#)]
    fn test_string_survives_round_trip(#[case] markup: &str) {
        assert_eq!(serialize(&parse(markup).unwrap()), markup);
    }

    #[test]
    fn test_serialize_closes_tags_when_climbing_several_levels() {
        let mut inner = Directory::new();
        inner.insert("leaf", Node::file("x"));
        let mut middle = Directory::new();
        middle.insert("inner", Node::Directory(inner));
        let mut root = Directory::new();
        root.insert("middle", Node::Directory(middle));
        root.insert("after", Node::file("y"));

        assert_eq!(
            serialize(&root),
            "<root><middle><inner><leaf>x</leaf></inner></middle><after>y</after></root>"
        );
    }

    #[test]
    fn test_serialize_deep_chain() {
        let depth = 10_000;
        let mut node = Node::file("leaf");
        for _ in 0..depth {
            let mut dir = Directory::new();
            dir.insert("d", node);
            node = Node::Directory(dir);
        }
        let mut root = Directory::new();
        root.insert("d", node);

        let markup = serialize(&root);
        assert_eq!(markup.matches("<d>").count(), depth + 1);
        assert_eq!(parse(&markup).unwrap(), root);
    }
}
