use tracing::debug;

use super::chain::{Chain, Connector, Pipeline};
use super::commands::execute;
use super::lexer::tokenize;
use super::shell_error::ShellError;
use crate::config::ShellConfig;
use crate::tree::Tree;

/// Name used for errors that belong to the line rather than a command
const SHELL_NAME: &str = "loopy";

/// What a command line printed and how it ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    pub stdout: String,
    /// One `command: message` line per failed pipeline
    pub stderr: String,
    pub status: i32,
}

impl ShellOutput {
    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    fn success(stdout: String) -> Self {
        Self {
            stdout,
            ..Default::default()
        }
    }

    fn failure(command: &str, error: &ShellError) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("{command}: {}", error.describe()),
            status: error.status(),
        }
    }

    /// Appends the result of the next pipeline, whose status wins
    fn append(&mut self, next: ShellOutput) {
        push_line(&mut self.stdout, next.stdout);
        push_line(&mut self.stderr, next.stderr);
        self.status = next.status;
    }
}

fn push_line(buffer: &mut String, text: String) {
    if text.is_empty() {
        return;
    }
    if !buffer.is_empty() {
        buffer.push('\n');
    }
    buffer.push_str(&text);
}

/// Runs command lines against a tree.
///
/// ```
/// use loopy::Tree;
/// use loopy::shell::Shell;
///
/// let mut tree = Tree::new();
/// let shell = Shell::new();
/// let output = shell.run("mkdir -p /a/b && touch /a/b/c hi; cat /a/b/c | wc -c", &mut tree);
/// assert_eq!(output.stdout, "2");
/// assert!(output.is_success());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Shell {
    config: ShellConfig,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ShellConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Runs one line. Errors never escape: they end up in `stderr` and
    /// `status` and the rest of the chain carries on as its operators say.
    pub fn run(&self, line: &str, tree: &mut Tree) -> ShellOutput {
        let chain = match tokenize(line).and_then(Chain::parse) {
            Ok(Some(chain)) => chain,
            Ok(None) => return ShellOutput::default(),
            Err(err) => return ShellOutput::failure(SHELL_NAME, &err),
        };

        let mut output = self.run_pipeline(&chain.first, tree);
        for (connector, pipeline) in &chain.rest {
            let proceed = match connector {
                Connector::Always => true,
                Connector::OnSuccess => output.is_success(),
                Connector::OnFailure => !output.is_success(),
            };
            if proceed {
                let next = self.run_pipeline(pipeline, tree);
                output.append(next);
            }
        }
        output
    }

    fn run_pipeline(&self, pipeline: &Pipeline, tree: &mut Tree) -> ShellOutput {
        let mut stdin = None;
        for words in pipeline {
            debug!("Running command: {}", words.join(" "));
            match execute(words, stdin.take(), tree, &self.config) {
                Ok(stdout) => stdin = Some(stdout),
                Err(err) => {
                    let name = words.first().map_or(SHELL_NAME, String::as_str);
                    debug!("Command {} failed: {}", name, err);
                    return ShellOutput::failure(name, &err);
                }
            }
        }
        ShellOutput::success(stdin.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn tree() -> Tree {
        let mut tree = Tree::new();
        tree.touch("/animals/dogs/lab", "friendly")
            .unwrap()
            .touch("/animals/dogs/beagle", "curious")
            .unwrap()
            .touch("/animals/cats/persian", "fluffy")
            .unwrap()
            .touch("/projects/loopy/README.md", "notes")
            .unwrap();
        tree
    }

    #[rstest]
    #[case("ls /animals | sort", "cats\ndogs")]
    #[case("find /animals -type f | grep -c dogs", "2")]
    #[case("cat /animals/dogs/lab | split -d i", "fr\nendly")]
    #[case("echo 'b a c' | split | sort -r | head -n 2", "c\nb")]
    #[case("cd /animals/dogs; pwd; ls", "/animals/dogs\nlab\nbeagle")]
    fn test_pipelines(#[case] line: &str, #[case] expected: &str) {
        let output = Shell::new().run(line, &mut tree());
        assert_eq!(output.stdout, expected);
        assert_eq!(output.stderr, "");
        assert!(output.is_success());
    }

    #[rstest]
    #[case("cat /missing && echo yes", "", 1)]
    #[case("cat /missing || echo fallback", "fallback", 0)]
    #[case("pwd && echo yes || echo no", "/\nyes", 0)]
    #[case("cat /missing && echo yes || echo no", "no", 0)]
    #[case("cat /missing; echo after", "after", 0)]
    #[case("echo first; cat /missing", "first", 1)]
    fn test_sequencing(#[case] line: &str, #[case] stdout: &str, #[case] status: i32) {
        let output = Shell::new().run(line, &mut tree());
        assert_eq!(output.stdout, stdout);
        assert_eq!(output.status, status);
    }

    #[test]
    fn test_errors_become_lines() {
        let mut tree = tree();
        let output = Shell::new().run("cat /missing; rm /animals; nope", &mut tree);
        assert_eq!(
            output.stderr,
            "cat: No such file or directory: /missing\n\
             rm: Directory not empty: /animals\n\
             nope: Command not found"
        );
        assert_eq!(output.status, 2);
        assert!(tree.exists("/animals"));
    }

    #[rstest]
    #[case("echo 'unterminated")]
    #[case("| wc")]
    #[case("ls &&")]
    fn test_syntax_errors(#[case] line: &str) {
        let output = Shell::new().run(line, &mut tree());
        assert!(output.stderr.starts_with("loopy: "));
        assert_eq!(output.status, 2);
    }

    #[test]
    fn test_failed_pipeline_discards_partial_output() {
        let output = Shell::new().run("ls / | grep '(' ", &mut tree());
        assert_eq!(output.stdout, "");
        assert!(output.stderr.starts_with("grep: Invalid pattern '('"));
        assert_eq!(output.status, 1);
    }

    #[test]
    fn test_blank_line_does_nothing() {
        assert_eq!(Shell::new().run("   ", &mut tree()), ShellOutput::default());
    }

    #[test]
    fn test_config_sets_default_head_length() {
        let config = ShellConfig {
            head_lines: 1,
            ..Default::default()
        };
        let output = Shell::with_config(config).run("ls / | head", &mut tree());
        assert_eq!(output.stdout, "animals");
    }

    #[test]
    fn test_mutations_persist_across_lines() {
        let shell = Shell::new();
        let mut tree = Tree::new();
        shell.run("mkdir /docs && cd /docs", &mut tree);
        shell.run("write readme 'hello there' && ln readme latest", &mut tree);

        let output = shell.run("cat /docs/latest; grep -n hello /docs", &mut tree);
        assert_eq!(output.stdout, "hello there\n/docs/readme:1:hello there");
    }
}
