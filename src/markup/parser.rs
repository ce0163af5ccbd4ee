use snafu::{Snafu, ensure};

use super::{EMPTY_MARKER, LINK_OPENER, escape::unescape};
use crate::node::{Directory, Node};
use crate::path::is_valid_name;
use crate::traversal::ROOT_NAME;

/// Parses a serialized tree into its root directory.
///
/// Single forward scan with an explicit stack of open elements, so nesting
/// depth is not limited by the call stack.
pub fn parse(input: &str) -> Result<Directory, ParseError> {
    ensure!(!input.trim().is_empty(), EmptyInputSnafu);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Directory> = None;
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];

        if !rest.starts_with('<') {
            let text_len = rest.find('<').unwrap_or(rest.len());
            let text = &rest[..text_len];
            match stack.last_mut() {
                Some(frame) => frame.add_text(text, pos)?,
                None => ensure!(
                    text.trim().is_empty(),
                    TrailingDataSnafu { offset: pos }
                ),
            }
            pos += text_len;
            continue;
        }

        ensure!(root.is_none(), TrailingDataSnafu { offset: pos });

        let end = rest
            .find('>')
            .ok_or_else(|| UnterminatedTagSnafu { offset: pos }.build())?;
        let token = &rest[1..end];
        ensure!(!token.is_empty(), EmptyTagSnafu { offset: pos });

        if let Some(name) = token.strip_prefix('/') {
            let mut frame = stack.pop().ok_or_else(|| {
                UnexpectedCloseSnafu {
                    name,
                    offset: pos,
                }
                .build()
            })?;
            ensure!(
                frame.name == name,
                MismatchedTagSnafu {
                    expected: frame.name.clone(),
                    found: name,
                    offset: pos,
                }
            );
            match stack.last_mut() {
                Some(parent) => {
                    let node = frame.finish_child();
                    parent.add_child(frame.name, node, frame.offset)?;
                }
                None => root = Some(frame.finish_root()?),
            }
        } else if token.contains(LINK_OPENER) {
            let (name, target) = parse_symlink(token, pos)?;
            match stack.last_mut() {
                Some(parent) => parent.add_child(name.to_owned(), Node::symlink(target), pos)?,
                None => return RootNotDirectorySnafu.fail(),
            }
        } else if token == EMPTY_MARKER {
            let closing = format!("</{EMPTY_MARKER}>");
            ensure!(
                rest[end + 1..].starts_with(&closing),
                MisplacedMarkerSnafu { offset: pos }
            );
            let parent = stack
                .last_mut()
                .ok_or_else(|| NotRootSnafu { name: token }.build())?;
            parent.mark_empty(pos)?;
            pos += end + 1 + closing.len();
            continue;
        } else {
            match stack.is_empty() {
                true => ensure!(token == ROOT_NAME, NotRootSnafu { name: token }),
                false => ensure!(
                    is_valid_name(token),
                    InvalidNameSnafu {
                        name: token,
                        offset: pos,
                    }
                ),
            }
            stack.push(Frame::new(token, pos));
        }

        pos += end + 1;
    }

    if let Some(frame) = stack.pop() {
        return UnclosedSnafu {
            name: frame.name,
            offset: frame.offset,
        }
        .fail();
    }

    root.ok_or_else(|| MissingRootSnafu.build())
}

/// Splits `name @="target"/` into its name and unescaped target.
fn parse_symlink(token: &str, offset: usize) -> Result<(&str, String), ParseError> {
    let malformed = || {
        MalformedSymlinkSnafu {
            token,
            offset,
        }
        .build()
    };

    let (name, rest) = token.split_once(LINK_OPENER).ok_or_else(malformed)?;
    let (target, remainder) = rest.split_once('"').ok_or_else(malformed)?;
    ensure!(remainder == "/", MalformedSymlinkSnafu { token, offset });
    ensure!(is_valid_name(name), InvalidNameSnafu { name, offset });

    Ok((name, unescape(target)))
}

/// An element that has been opened but not closed yet
struct Frame {
    name: String,
    offset: usize,
    body: Body,
}

enum Body {
    Nothing,
    Text(String),
    Children(Directory),
    EmptyMarker,
}

impl Frame {
    fn new(name: &str, offset: usize) -> Self {
        Self {
            name: name.to_owned(),
            offset,
            body: Body::Nothing,
        }
    }

    fn add_text(&mut self, text: &str, offset: usize) -> Result<(), ParseError> {
        match &mut self.body {
            Body::Nothing => self.body = Body::Text(text.to_owned()),
            Body::Text(existing) => existing.push_str(text),
            Body::Children(_) | Body::EmptyMarker => {
                ensure!(text.trim().is_empty(), MixedContentSnafu { offset })
            }
        }
        Ok(())
    }

    fn add_child(&mut self, name: String, node: Node, offset: usize) -> Result<(), ParseError> {
        match &mut self.body {
            Body::Children(dir) => {
                ensure!(!dir.contains(&name), DuplicateNameSnafu { name, offset });
                dir.insert(name, node);
            }
            Body::Nothing => self.start_children(name, node),
            Body::Text(text) => {
                ensure!(text.trim().is_empty(), MixedContentSnafu { offset });
                self.start_children(name, node);
            }
            Body::EmptyMarker => return MisplacedMarkerSnafu { offset }.fail(),
        }
        Ok(())
    }

    fn start_children(&mut self, name: String, node: Node) {
        let mut dir = Directory::new();
        dir.insert(name, node);
        self.body = Body::Children(dir);
    }

    fn mark_empty(&mut self, offset: usize) -> Result<(), ParseError> {
        match &self.body {
            Body::Nothing => {}
            Body::Text(text) if text.trim().is_empty() => {}
            _ => return MisplacedMarkerSnafu { offset }.fail(),
        }
        self.body = Body::EmptyMarker;
        Ok(())
    }

    fn finish_child(&mut self) -> Node {
        match std::mem::replace(&mut self.body, Body::Nothing) {
            Body::Nothing => Node::file(""),
            Body::Text(text) => Node::file(unescape(&text)),
            Body::Children(dir) => Node::Directory(dir),
            Body::EmptyMarker => Node::directory(),
        }
    }

    fn finish_root(mut self) -> Result<Directory, ParseError> {
        match std::mem::replace(&mut self.body, Body::Nothing) {
            Body::Nothing | Body::EmptyMarker => Ok(Directory::new()),
            Body::Text(text) if text.trim().is_empty() => Ok(Directory::new()),
            Body::Text(_) => RootNotDirectorySnafu.fail(),
            Body::Children(dir) => Ok(dir),
        }
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum ParseError {
    #[snafu(display("Input is empty"))]
    EmptyInput,
    #[snafu(display("Unterminated tag at byte {}", offset))]
    UnterminatedTag { offset: usize },
    #[snafu(display("Empty tag at byte {}", offset))]
    EmptyTag { offset: usize },
    #[snafu(display("Invalid name '{}' at byte {}", name, offset))]
    InvalidName { name: String, offset: usize },
    #[snafu(display("Malformed symlink '<{}>' at byte {}", token, offset))]
    MalformedSymlink { token: String, offset: usize },
    #[snafu(display("Unexpected closing tag </{}> at byte {}", name, offset))]
    UnexpectedClose { name: String, offset: usize },
    #[snafu(display("Expected </{}> but found </{}> at byte {}", expected, found, offset))]
    MismatchedTag {
        expected: String,
        found: String,
        offset: usize,
    },
    #[snafu(display("Element <{}> opened at byte {} is never closed", name, offset))]
    Unclosed { name: String, offset: usize },
    #[snafu(display("Name '{}' appears twice in one directory (byte {})", name, offset))]
    DuplicateName { name: String, offset: usize },
    #[snafu(display("Text mixed with child elements at byte {}", offset))]
    MixedContent { offset: usize },
    #[snafu(display("Empty-directory marker must be the only content of its parent (byte {})", offset))]
    MisplacedMarker { offset: usize },
    #[snafu(display("Document element must be <root>, found <{}>", name))]
    NotRoot { name: String },
    #[snafu(display("The root element must be a directory"))]
    RootNotDirectory,
    #[snafu(display("Unexpected data after the root element at byte {}", offset))]
    TrailingData { offset: usize },
    #[snafu(display("Missing root element"))]
    MissingRoot,
}
