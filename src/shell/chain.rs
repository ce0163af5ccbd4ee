use snafu::ensure;

use super::lexer::Token;
use super::shell_error::{ShellError, UnexpectedOperatorSnafu};

/// Words of one command, name first
pub(super) type Words = Vec<String>;

/// Commands joined by `|`, each reading the previous one's output
pub(super) type Pipeline = Vec<Words>;

/// How a pipeline depends on the status of the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Connector {
    /// `;`
    Always,
    /// `&&`
    OnSuccess,
    /// `||`
    OnFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Chain {
    pub(super) first: Pipeline,
    pub(super) rest: Vec<(Connector, Pipeline)>,
}

impl Chain {
    /// Groups tokens into pipelines joined by sequencing operators.
    ///
    /// `|` binds tighter than `;`, `&&` and `||`, which all share one
    /// precedence and associate left. A trailing `;` is allowed. An empty
    /// token list gives `None`.
    pub(super) fn parse(tokens: Vec<Token>) -> Result<Option<Chain>, ShellError> {
        let mut pipelines: Vec<(Connector, Pipeline)> = Vec::new();
        let mut connector = Connector::Always;
        let mut pipeline: Pipeline = Vec::new();
        let mut words: Words = Vec::new();

        for token in tokens {
            let next = match token {
                Token::Word(word) => {
                    words.push(word);
                    continue;
                }
                Token::Pipe => {
                    ensure!(!words.is_empty(), UnexpectedOperatorSnafu { operator: "|" });
                    pipeline.push(std::mem::take(&mut words));
                    continue;
                }
                Token::And => Connector::OnSuccess,
                Token::Or => Connector::OnFailure,
                Token::Semi => Connector::Always,
            };

            ensure!(
                !words.is_empty(),
                UnexpectedOperatorSnafu {
                    operator: operator(next),
                }
            );
            pipeline.push(std::mem::take(&mut words));
            pipelines.push((connector, std::mem::take(&mut pipeline)));
            connector = next;
        }

        match (words.is_empty(), pipeline.is_empty()) {
            (false, _) => {
                pipeline.push(words);
                pipelines.push((connector, pipeline));
            }
            (true, false) => return UnexpectedOperatorSnafu { operator: "|" }.fail(),
            // Only a trailing `;` may end the line
            (true, true) => ensure!(
                connector == Connector::Always,
                UnexpectedOperatorSnafu {
                    operator: operator(connector),
                }
            ),
        }

        let mut pipelines = pipelines.into_iter();
        Ok(pipelines.next().map(|(_, first)| Chain {
            first,
            rest: pipelines.collect(),
        }))
    }
}

fn operator(connector: Connector) -> &'static str {
    match connector {
        Connector::Always => ";",
        Connector::OnSuccess => "&&",
        Connector::OnFailure => "||",
    }
}
