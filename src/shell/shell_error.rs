use std::error::Error;

use snafu::Snafu;

use crate::tree::TreeError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum ShellError {
    #[snafu(display("Unterminated {} quote", quote))]
    UnterminatedQuoteError { quote: char },
    #[snafu(display("Nothing to escape at the end of the line"))]
    DanglingEscapeError,
    #[snafu(display("Unexpected character '{}'", character))]
    UnexpectedCharacterError { character: char },
    #[snafu(display("Syntax error near '{}'", operator))]
    UnexpectedOperatorError { operator: &'static str },
    #[snafu(display("Command not found"))]
    UnknownCommandError,
    #[snafu(display("{}", message))]
    UsageError { message: String },
    #[snafu(display("Invalid pattern '{}'", pattern))]
    PatternError {
        pattern: String,
        source: regex::Error,
    },
    #[snafu(display("{}", source))]
    TreeOperationError { source: TreeError },
}

impl ShellError {
    /// Exit status reported for this error: 2 when the line itself was
    /// wrong, 1 when a valid command failed.
    pub fn status(&self) -> i32 {
        match self {
            ShellError::PatternError { .. } | ShellError::TreeOperationError { .. } => 1,
            _ => 2,
        }
    }

    /// The message with the messages of its causes appended, on one line
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        // Display of the tree variant already is its source
        let mut cause = match self {
            ShellError::TreeOperationError { source } => source.source(),
            other => other.source(),
        };
        while let Some(error) = cause {
            message.push_str(": ");
            message.push_str(&error.to_string().replace('\n', " "));
            cause = error.source();
        }
        message
    }
}
