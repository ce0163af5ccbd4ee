use snafu::Snafu;

use crate::markup::ParseError;
use crate::path::NodePath;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TreeError {
    #[snafu(display("Malformed input"))]
    MalformedInputError { source: ParseError },
    #[snafu(display("No such file or directory: {}", path))]
    NotFoundError { path: NodePath },
    #[snafu(display("Not a directory: {}", path))]
    NotADirectoryError { path: NodePath },
    #[snafu(display("Not a file: {}", path))]
    NotAFileError { path: NodePath },
    #[snafu(display("Not a symlink: {}", path))]
    NotALinkError { path: NodePath },
    #[snafu(display("Already exists: {}", path))]
    AlreadyExistsError { path: NodePath },
    #[snafu(display("Directory not empty: {}", path))]
    NotEmptyError { path: NodePath },
    #[snafu(display("Broken symlink {} -> {}", link, target))]
    BrokenLinkError { link: NodePath, target: String },
    #[snafu(display("Too many levels of symbolic links: {}", path))]
    SymlinkLoopError { path: String },
    #[snafu(display("Invalid pattern '{}'", pattern))]
    InvalidPatternError {
        pattern: String,
        source: regex::Error,
    },
    #[snafu(display("Invalid glob '{}': {}", pattern, reason))]
    InvalidGlobError { pattern: String, reason: String },
    #[snafu(display("Invalid name '{}'", name))]
    InvalidNameError { name: String },
    #[snafu(display("Cannot remove or replace the root directory"))]
    RootError,
    #[snafu(display("Cannot move {} into itself", path))]
    InvalidMoveError { path: NodePath },
}
