use snafu::ensure;

use super::shell_error::{DanglingEscapeSnafu, ShellError, UnexpectedCharacterSnafu, UnterminatedQuoteSnafu};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Token {
    Word(String),
    /// `|`
    Pipe,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `;`
    Semi,
}

/// Splits a command line into words and operators.
///
/// Single quotes keep everything literally. Inside double quotes a
/// backslash escapes `"` and `\` only. Outside quotes a backslash escapes
/// any character.
pub(super) fn tokenize(line: &str) -> Result<Vec<Token>, ShellError> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    // Distinguishes `''` (an empty word) from no word at all
    let mut in_word = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => flush(&mut tokens, &mut word, &mut in_word),
            '|' | ';' | '&' => {
                flush(&mut tokens, &mut word, &mut in_word);
                let token = match (ch, chars.peek()) {
                    ('|', Some('|')) => Token::Or,
                    ('&', Some('&')) => Token::And,
                    ('|', _) => Token::Pipe,
                    (';', _) => Token::Semi,
                    _ => return UnexpectedCharacterSnafu { character: ch }.fail(),
                };
                if matches!(token, Token::Or | Token::And) {
                    chars.next();
                }
                tokens.push(token);
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return UnterminatedQuoteSnafu { quote: '\'' }.fail(),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') if matches!(chars.peek(), Some('"' | '\\')) => {
                            word.extend(chars.next());
                        }
                        Some(c) => word.push(c),
                        None => return UnterminatedQuoteSnafu { quote: '"' }.fail(),
                    }
                }
            }
            '\\' => {
                let escaped = chars.next();
                ensure!(escaped.is_some(), DanglingEscapeSnafu);
                word.extend(escaped);
                in_word = true;
            }
            c => {
                word.push(c);
                in_word = true;
            }
        }
    }
    flush(&mut tokens, &mut word, &mut in_word);

    Ok(tokens)
}

fn flush(tokens: &mut Vec<Token>, word: &mut String, in_word: &mut bool) {
    if *in_word {
        tokens.push(Token::Word(std::mem::take(word)));
        *in_word = false;
    }
}
