use regex::Regex;
use snafu::{ResultExt, ensure};

use super::tree_error::{InvalidGlobSnafu, InvalidPatternSnafu, TreeError};

/// Translates a shell pattern over full paths into an anchored regex.
///
/// `*` and `?` stay within one segment, `**` spans any number of segments
/// and `**/` may also match no directory at all.
pub(super) fn compile_glob(pattern: &str) -> Result<Regex, TreeError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut regex = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    regex.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    regex.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            '[' => {
                i = push_class(&chars, i, &mut regex, pattern)?;
                continue;
            }
            ch => regex.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4]))),
        }
        i += 1;
    }

    regex.push('$');
    Regex::new(&regex).context(InvalidPatternSnafu { pattern })
}

/// Translates the class starting at `chars[start] == '['` and returns the
/// index just past its closing `]`.
fn push_class(
    chars: &[char],
    start: usize,
    regex: &mut String,
    pattern: &str,
) -> Result<usize, TreeError> {
    let mut i = start + 1;
    let negated = chars.get(i) == Some(&'!');
    if negated {
        i += 1;
    }

    let mut body = String::new();
    // A `]` right after the opening bracket is a literal member
    if chars.get(i) == Some(&']') {
        body.push_str("\\]");
        i += 1;
    }
    while let Some(&ch) = chars.get(i) {
        if ch == ']' {
            break;
        }
        match ch {
            '\\' | '[' | '^' | '&' | '~' => {
                body.push('\\');
                body.push(ch);
            }
            _ => body.push(ch),
        }
        i += 1;
    }

    ensure!(
        i < chars.len(),
        InvalidGlobSnafu {
            pattern,
            reason: "unterminated character class",
        }
    );
    ensure!(
        !body.is_empty(),
        InvalidGlobSnafu {
            pattern,
            reason: "empty character class",
        }
    );

    regex.push('[');
    if negated {
        regex.push('^');
    }
    regex.push_str(&body);
    regex.push(']');
    Ok(i + 1)
}
