use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use regex::RegexBuilder;
use snafu::{OptionExt, ResultExt};

use super::shell_error::{PatternSnafu, ShellError, TreeOperationSnafu, UnknownCommandSnafu};
use crate::config::ShellConfig;
use crate::node::NodeKind;
use crate::tree::{GrepOptions, GrepOutput, SedOptions, Tree};

/// The shell's command table, dispatched on the first word of a command
#[derive(Debug, Parser)]
#[command(multicall = true, disable_help_subcommand = true)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List a directory
    Ls {
        /// Mark directories with `/` and symlinks with `@`
        #[arg(short = 'F')]
        classify: bool,
        path: Option<String>,
    },
    /// Change the working directory, `/` by default
    Cd { path: Option<String> },
    /// Print the working directory
    Pwd,
    /// Print files, or the piped input without paths
    Cat { paths: Vec<String> },
    /// Print the first lines of a file or of the input
    Head {
        #[arg(short = 'n')]
        lines: Option<usize>,
        path: Option<String>,
    },
    /// Print the last lines of a file or of the input
    Tail {
        #[arg(short = 'n')]
        lines: Option<usize>,
        path: Option<String>,
    },
    /// Count lines, words and bytes
    Wc {
        #[arg(short = 'l')]
        lines: bool,
        #[arg(short = 'w')]
        words: bool,
        #[arg(short = 'c')]
        bytes: bool,
        path: Option<String>,
    },
    /// Sort the input lines
    Sort {
        #[arg(short = 'r')]
        reverse: bool,
        #[arg(short = 'u')]
        unique: bool,
    },
    /// Draw a subtree
    Tree { path: Option<String> },
    /// Find nodes by name and kind
    Find {
        path: Option<String>,
        /// Regex the node name must match
        #[arg(long)]
        name: Option<String>,
        /// Like --name, ignoring case
        #[arg(long, conflicts_with = "name")]
        iname: Option<String>,
        /// d, f or l
        #[arg(long = "type")]
        kind: Option<NodeKind>,
    },
    /// Search names and content, or filter the input lines
    Grep {
        #[arg(short = 'i')]
        ignore_case: bool,
        #[arg(short = 'v')]
        invert: bool,
        #[arg(short = 'c')]
        count: bool,
        /// Print `path:line:text` for every matching line
        #[arg(short = 'n')]
        line_numbers: bool,
        /// Match node names only
        #[arg(short = 'l')]
        names_only: bool,
        pattern: String,
        path: Option<String>,
    },
    /// Match paths against a shell pattern
    Glob { pattern: String, path: Option<String> },
    /// Count nodes, or content bytes with -c
    Du {
        #[arg(short = 'c')]
        content: bool,
        path: Option<String>,
    },
    /// Show node metadata
    Info { path: Option<String> },
    /// Create a file, keeping an existing one unless content is given
    Touch {
        path: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        content: Vec<String>,
    },
    /// Write a file from the arguments or the input
    Write {
        path: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        content: Vec<String>,
    },
    /// Create a directory
    Mkdir {
        #[arg(short = 'p')]
        parents: bool,
        path: String,
    },
    /// Remove a node
    Rm {
        #[arg(short = 'r')]
        recursive: bool,
        path: String,
    },
    /// Move or rename a node
    Mv { source: String, destination: String },
    /// Copy a node
    Cp { source: String, destination: String },
    /// Create a symlink at LINK pointing to TARGET
    Ln { target: String, link: String },
    /// Print a symlink's target
    Readlink { path: String },
    /// List the symlinks pointing at a path
    Backlinks { path: String },
    /// Replace regex matches in file content
    Sed {
        #[arg(short = 'i')]
        ignore_case: bool,
        #[arg(short = 'r')]
        recursive: bool,
        /// Treat pattern and replacement as plain text
        #[arg(short = 'F')]
        literal: bool,
        /// Replacements per file, 0 for all
        #[arg(short = 'c', default_value_t = 0)]
        count: usize,
        path: String,
        pattern: String,
        replacement: String,
    },
    /// Split the input into lines on a delimiter, whitespace by default
    Split {
        #[arg(short = 'd')]
        delimiter: Option<String>,
    },
    /// Print the arguments
    Echo {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// List the commands
    Help,
}

/// Runs one command.
///
/// `stdin` is the output of the previous command of a pipeline and `None`
/// for the first one.
pub(super) fn execute(
    words: &[String],
    stdin: Option<String>,
    tree: &mut Tree,
    config: &ShellConfig,
) -> Result<String, ShellError> {
    let name = words.first().context(UnknownCommandSnafu)?;
    CommandLine::command()
        .find_subcommand(name)
        .context(UnknownCommandSnafu)?;

    let words = match name.as_str() {
        "find" => expand_find_options(words),
        _ => words.to_vec(),
    };
    let command = match CommandLine::try_parse_from(words) {
        Ok(parsed) => parsed.command,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(err.render().to_string().trim_end().to_owned());
        }
        Err(err) => {
            return Err(ShellError::UsageError {
                message: usage_message(&err),
            });
        }
    };

    command.run(stdin, tree, config)
}

impl Command {
    fn run(self, stdin: Option<String>, tree: &mut Tree, config: &ShellConfig) -> Result<String, ShellError> {
        let output = match self {
            Command::Ls { classify, path } => {
                let path = path.as_deref().unwrap_or(".");
                let names = match classify {
                    true => tree.ls_classified(path),
                    false => tree.ls(path),
                }
                .context(TreeOperationSnafu)?;
                names.join("\n")
            }
            Command::Cd { path } => {
                tree.cd(path.as_deref().unwrap_or("/"))
                    .context(TreeOperationSnafu)?;
                String::new()
            }
            Command::Pwd => tree.cwd().to_string(),
            Command::Cat { paths } => match paths.is_empty() {
                true => stdin.unwrap_or_default(),
                false => tree.cat(&paths).context(TreeOperationSnafu)?,
            },
            Command::Head { lines, path } => {
                let count = lines.unwrap_or(config.head_lines);
                match path {
                    Some(path) => tree.head(&path, count).context(TreeOperationSnafu)?,
                    None => first_lines(&stdin.unwrap_or_default(), count),
                }
            }
            Command::Tail { lines, path } => {
                let count = lines.unwrap_or(config.tail_lines);
                match path {
                    Some(path) => tree.tail(&path, count).context(TreeOperationSnafu)?,
                    None => last_lines(&stdin.unwrap_or_default(), count),
                }
            }
            Command::Wc {
                lines,
                words,
                bytes,
                path,
            } => {
                let text = input(tree, path.as_deref(), stdin)?;
                word_count(&text, lines, words, bytes)
            }
            Command::Sort { reverse, unique } => {
                let text = stdin.unwrap_or_default();
                let mut lines: Vec<&str> = text.lines().collect();
                lines.sort_unstable();
                if unique {
                    lines.dedup();
                }
                if reverse {
                    lines.reverse();
                }
                lines.join("\n")
            }
            Command::Tree { path } => tree
                .render(path.as_deref().unwrap_or("."))
                .context(TreeOperationSnafu)?,
            Command::Find {
                path,
                name,
                iname,
                kind,
            } => tree
                .find(
                    path.as_deref().unwrap_or("."),
                    name.as_deref().or(iname.as_deref()),
                    kind,
                    iname.is_some(),
                )
                .context(TreeOperationSnafu)?
                .join("\n"),
            Command::Grep {
                ignore_case,
                invert,
                count,
                line_numbers,
                names_only,
                pattern,
                path,
            } => match (path, stdin) {
                (None, Some(stdin)) => {
                    let regex = RegexBuilder::new(&pattern)
                        .case_insensitive(ignore_case)
                        .build()
                        .context(PatternSnafu { pattern: &pattern })?;
                    let matched: Vec<String> = stdin
                        .lines()
                        .enumerate()
                        .filter(|(_, line)| regex.is_match(line) != invert)
                        .map(|(index, line)| match line_numbers {
                            true => format!("{}:{}", index + 1, line),
                            false => line.to_owned(),
                        })
                        .collect();
                    match count {
                        true => matched.len().to_string(),
                        false => matched.join("\n"),
                    }
                }
                (path, _) => {
                    let options = GrepOptions {
                        content: !names_only,
                        ignore_case,
                        invert,
                        count,
                        lines: line_numbers && !names_only,
                    };
                    match tree
                        .grep(&pattern, path.as_deref().unwrap_or("."), &options)
                        .context(TreeOperationSnafu)?
                    {
                        GrepOutput::Count(count) => count.to_string(),
                        GrepOutput::Matches(matches) => matches.join("\n"),
                    }
                }
            },
            Command::Glob { pattern, path } => tree
                .glob(&pattern, path.as_deref().unwrap_or("."))
                .context(TreeOperationSnafu)?
                .join("\n"),
            Command::Du { content, path } => tree
                .du(path.as_deref().unwrap_or("."), content)
                .context(TreeOperationSnafu)?
                .to_string(),
            Command::Info { path } => tree
                .info(path.as_deref().unwrap_or("."))
                .context(TreeOperationSnafu)?
                .to_string(),
            Command::Touch { path, content } => {
                let content = content_or_stdin(content, stdin);
                tree.touch(&path, &content).context(TreeOperationSnafu)?;
                String::new()
            }
            Command::Write { path, content } => {
                let content = content_or_stdin(content, stdin);
                tree.write(&path, &content).context(TreeOperationSnafu)?;
                String::new()
            }
            Command::Mkdir { parents, path } => {
                tree.mkdir(&path, parents).context(TreeOperationSnafu)?;
                String::new()
            }
            Command::Rm { recursive, path } => {
                tree.rm(&path, recursive).context(TreeOperationSnafu)?;
                String::new()
            }
            Command::Mv {
                source,
                destination,
            } => {
                tree.mv(&source, &destination)
                    .context(TreeOperationSnafu)?;
                String::new()
            }
            Command::Cp {
                source,
                destination,
            } => {
                tree.cp(&source, &destination)
                    .context(TreeOperationSnafu)?;
                String::new()
            }
            Command::Ln { target, link } => {
                tree.ln(&target, &link).context(TreeOperationSnafu)?;
                String::new()
            }
            Command::Readlink { path } => tree
                .readlink(&path)
                .context(TreeOperationSnafu)?
                .to_owned(),
            Command::Backlinks { path } => tree.backlinks(&path).join("\n"),
            Command::Sed {
                ignore_case,
                recursive,
                literal,
                count,
                path,
                pattern,
                replacement,
            } => {
                let options = SedOptions {
                    recursive,
                    count,
                    ignore_case,
                    literal,
                };
                tree.sed(&path, &pattern, &replacement, &options)
                    .context(TreeOperationSnafu)?;
                String::new()
            }
            Command::Split { delimiter } => {
                let text = stdin.unwrap_or_default();
                match delimiter.as_deref() {
                    Some(delimiter) if !delimiter.is_empty() => {
                        text.split(delimiter).collect::<Vec<_>>().join("\n")
                    }
                    _ => text.split_whitespace().collect::<Vec<_>>().join("\n"),
                }
            }
            Command::Echo { words } => words.join(" "),
            Command::Help => help_text(),
        };
        Ok(output)
    }
}

/// Content of the file at `path`, or the piped input without one
fn input(tree: &Tree, path: Option<&str>, stdin: Option<String>) -> Result<String, ShellError> {
    match path {
        Some(path) => Ok(tree.read(path).context(TreeOperationSnafu)?.to_owned()),
        None => Ok(stdin.unwrap_or_default()),
    }
}

fn content_or_stdin(words: Vec<String>, stdin: Option<String>) -> String {
    match (words.is_empty(), stdin) {
        (true, Some(stdin)) => stdin,
        _ => words.join(" "),
    }
}

fn first_lines(text: &str, count: usize) -> String {
    text.lines().take(count).collect::<Vec<_>>().join("\n")
}

fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(count)..].join("\n")
}

/// `lines words bytes`, or only the selected counts in that order
fn word_count(text: &str, lines: bool, words: bool, bytes: bool) -> String {
    let all = !(lines || words || bytes);
    let mut counts = Vec::new();
    if lines || all {
        counts.push(text.lines().count());
    }
    if words || all {
        counts.push(text.split_whitespace().count());
    }
    if bytes || all {
        counts.push(text.len());
    }
    counts
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accepts find's single-dash long options
fn expand_find_options(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|word| match word.as_str() {
            "-name" => "--name".to_owned(),
            "-iname" => "--iname".to_owned(),
            "-type" => "--type".to_owned(),
            _ => word.clone(),
        })
        .collect()
}

/// A clap error condensed to one line
fn usage_message(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let message = rendered
        .lines()
        .take_while(|line| !line.starts_with("Usage:"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("tip:") && !line.starts_with("For more information"))
        .collect::<Vec<_>>()
        .join(" ");
    message
        .strip_prefix("error: ")
        .unwrap_or(&message)
        .to_owned()
}

fn help_text() -> String {
    let table = CommandLine::command();
    let mut text = String::from("Available commands:");
    for command in table.get_subcommands() {
        let usage = command.clone().render_usage().to_string();
        let usage = usage.trim().trim_start_matches("Usage: ");
        let about = command
            .get_about()
            .map(ToString::to_string)
            .unwrap_or_default();
        text.push_str(&format!("\n  {usage:<48} {about}"));
    }
    text.push_str("\nChain commands with |, ;, && and ||. Run a command with -h for details.");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn run(line: &str, stdin: Option<&str>, tree: &mut Tree) -> Result<String, ShellError> {
        let words: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
        execute(&words, stdin.map(str::to_owned), tree, &ShellConfig::default())
    }

    fn tree() -> Tree {
        let mut tree = Tree::new();
        tree.touch("/animals/dogs/lab", "friendly")
            .unwrap()
            .touch("/animals/dogs/beagle", "curious")
            .unwrap()
            .touch("/animals/cats/persian", "fluffy")
            .unwrap()
            .touch("/notes", "alpha\nbeta\nalpha2")
            .unwrap();
        tree
    }

    #[test]
    fn test_command_table_is_consistent() {
        CommandLine::command().debug_assert();
    }

    #[rstest]
    #[case("ls /animals", "dogs\ncats")]
    #[case("ls -F /", "animals/\nnotes")]
    #[case("pwd", "/")]
    #[case("cat /animals/dogs/lab /notes", "friendly\nalpha\nbeta\nalpha2")]
    #[case("head -n 2 /notes", "alpha\nbeta")]
    #[case("tail -n1 /notes", "alpha2")]
    #[case("wc /notes", "3 3 17")]
    #[case("wc -lw /notes", "3 3")]
    #[case("find /animals -type f -name ^l", "/animals/dogs/lab")]
    #[case("find /animals -iname ^LA", "/animals/dogs/lab")]
    #[case("grep -n alpha /notes", "/notes:1:alpha\n/notes:3:alpha2")]
    #[case("grep -c uri /", "1")]
    #[case("grep -l o /animals", "/animals/dogs")]
    #[case("glob **/p* /", "/animals/cats/persian")]
    #[case("du /animals", "6")]
    #[case("du -c /animals", "21")]
    #[case("echo -x a", "-x a")]
    fn test_read_commands(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(run(line, None, &mut tree()).unwrap(), expected);
    }

    #[rstest]
    #[case("sort", "b\na\nb", "a\nb\nb")]
    #[case("sort -ru", "b\na\nb", "b\na")]
    #[case("split", "a b\tc", "a\nb\nc")]
    #[case("split -d ,", "a,b,,c", "a\nb\n\nc")]
    #[case("grep -v b", "a\nb\nc", "a\nc")]
    #[case("grep -ci A", "a\nb\nA", "2")]
    #[case("grep -n c", "a\nc", "2:c")]
    #[case("head -n 1", "x\ny", "x")]
    #[case("wc -c", "abc", "3")]
    #[case("cat", "piped", "piped")]
    fn test_stdin_commands(#[case] line: &str, #[case] stdin: &str, #[case] expected: &str) {
        assert_eq!(run(line, Some(stdin), &mut tree()).unwrap(), expected);
    }

    #[test]
    fn test_mutating_commands() {
        let mut tree = tree();
        run("mkdir -p /a/b", None, &mut tree).unwrap();
        run("touch /a/b/f hello world", None, &mut tree).unwrap();
        run("ln /a/b/f /a/link", None, &mut tree).unwrap();
        run("cp /a/b /a/c", None, &mut tree).unwrap();
        run("mv /a/c/f /a/c/g", None, &mut tree).unwrap();
        run("sed -c 1 /a/c/g o 0", None, &mut tree).unwrap();
        run("write /a/piped", Some("from stdin"), &mut tree).unwrap();

        assert_eq!(tree.read("/a/link").unwrap(), "hello world");
        assert_eq!(tree.read("/a/c/g").unwrap(), "hell0 world");
        assert_eq!(tree.read("/a/piped").unwrap(), "from stdin");
        assert_eq!(run("readlink /a/link", None, &mut tree).unwrap(), "/a/b/f");
        assert_eq!(run("backlinks /a/b/f", None, &mut tree).unwrap(), "/a/link");

        run("rm -r /a", None, &mut tree).unwrap();
        assert!(!tree.exists("/a"));
    }

    #[rstest]
    #[case("frobnicate")]
    #[case("ls --bogus")]
    #[case("mv /only-one")]
    #[case("head -n many /notes")]
    #[case("find -type q")]
    fn test_usage_errors(#[case] line: &str) {
        let err = run(line, None, &mut tree()).unwrap_err();
        assert_eq!(err.status(), 2);
        assert!(!err.describe().contains('\n'));
    }

    #[test]
    fn test_tree_errors_keep_their_message() {
        let err = run("cat /missing", None, &mut tree()).unwrap_err();
        assert_eq!(err.status(), 1);
        assert_eq!(err.describe(), "No such file or directory: /missing");
    }

    #[test]
    fn test_help_lists_commands() {
        let help = run("help", None, &mut tree()).unwrap();
        assert!(help.starts_with("Available commands:"));
        assert!(help.contains("grep"));
        assert!(help.contains("backlinks"));

        let ls_help = run("ls -h", None, &mut tree()).unwrap();
        assert!(ls_help.contains("List a directory"));
    }
}
