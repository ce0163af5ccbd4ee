//! A small command shell over a tree.
//!
//! A line is split into words and the operators `|`, `;`, `&&` and `||`.
//! Pipes feed one command's output to the next; the sequencing operators
//! look at the status of the pipeline before them.

mod chain;
mod commands;
mod lexer;
mod shell;
mod shell_error;

pub use shell::{Shell, ShellOutput};
pub use shell_error::ShellError;
