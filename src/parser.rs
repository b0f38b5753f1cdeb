use std::fmt;

use tracing::debug;

use crate::ErrorCategory;
use crate::token::{Token, TokenKind};

/// Deepest brace nesting accepted before the parse is aborted.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `;` reached with no values accumulated.
    MissingValue { key: Option<String> },
    /// A directive still open when its block (or the input) ends.
    UnterminatedDirective { key: String },
    /// `{` reached with no directive name before it.
    BlockWithoutKey,
    /// Parenthesis outside an `if` directive.
    UnexpectedParen { key: Option<String> },
    /// `{` never closed.
    UnclosedBrace,
    /// `}` with no matching `{`.
    UnexpectedCloseBrace,
    /// Braces nested deeper than [`MAX_NESTING_DEPTH`].
    NestingTooDeep { limit: usize },
    /// Token that cannot appear in a statement.
    UnexpectedToken { token: String },
}

impl ParseErrorKind {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingValue { .. } | Self::UnterminatedDirective { .. } => {
                ErrorCategory::Validation
            }
            Self::BlockWithoutKey
            | Self::UnclosedBrace
            | Self::UnexpectedCloseBrace
            | Self::NestingTooDeep { .. } => ErrorCategory::Structural,
            Self::UnexpectedParen { .. } | Self::UnexpectedToken { .. } => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue { key: Some(key) } => {
                write!(f, "semicolon with no values after '{key}'")
            }
            Self::MissingValue { key: None } => write!(f, "semicolon with no values"),
            Self::UnterminatedDirective { key } => {
                write!(f, "directive '{key}' is not terminated by ';' or a block")
            }
            Self::BlockWithoutKey => write!(f, "block with no key"),
            Self::UnexpectedParen { key: Some(key) } => {
                write!(f, "parentheses only valid after 'if', found after '{key}'")
            }
            Self::UnexpectedParen { key: None } => {
                write!(f, "parentheses only valid after 'if'")
            }
            Self::UnclosedBrace => write!(f, "unclosed '{{'"),
            Self::UnexpectedCloseBrace => write!(f, "unexpected '}}'"),
            Self::NestingTooDeep { limit } => {
                write!(f, "blocks nested deeper than {limit} levels")
            }
            Self::UnexpectedToken { token } => write!(f, "unexpected token {token}"),
        }
    }
}

/// Error produced while nesting or typing the token stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
}

impl ParseError {
    const fn new(kind: ParseErrorKind, line: usize) -> Self {
        Self { kind, line }
    }
}

/// Nest and type a tokenized stream into comments, properties and entries.
///
/// # Errors
///
/// Returns `ParseError` on unbalanced braces, properties without
/// values, misplaced parentheses, or blocks without a name.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    let nested = nest(tokens)?;
    type_statements(nested)
}

/// Group everything between matching braces into `Nested` tokens.
///
/// # Errors
///
/// Returns `ParseError` on an unclosed `{`, a stray `}`, or nesting
/// deeper than [`MAX_NESTING_DEPTH`].
pub fn nest(tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    let mut nester = Nester {
        tokens: tokens.into_iter(),
        depth: 0,
    };
    let out = nester.level(None)?;
    debug!(tokens = out.len(), "nested braces");
    Ok(out)
}

struct Nester {
    tokens: std::vec::IntoIter<Token>,
    depth: usize,
}

impl Nester {
    /// Collect one brace level. `open` is the line of the `{` that
    /// started it, or `None` at the top level.
    fn level(&mut self, open: Option<usize>) -> Result<Vec<Token>, ParseError> {
        let mut out = Vec::new();
        while let Some(token) = self.tokens.next() {
            match token.kind {
                TokenKind::OpenBrace => {
                    if self.depth >= MAX_NESTING_DEPTH {
                        return Err(ParseError::new(
                            ParseErrorKind::NestingTooDeep {
                                limit: MAX_NESTING_DEPTH,
                            },
                            token.line,
                        ));
                    }
                    self.depth += 1;
                    let inner = self.level(Some(token.line))?;
                    self.depth -= 1;
                    out.push(Token::new(TokenKind::Nested(inner), token.line));
                }
                TokenKind::CloseBrace => {
                    return if open.is_some() {
                        Ok(out)
                    } else {
                        Err(ParseError::new(
                            ParseErrorKind::UnexpectedCloseBrace,
                            token.line,
                        ))
                    };
                }
                _ => out.push(token),
            }
        }
        match open {
            Some(line) => Err(ParseError::new(ParseErrorKind::UnclosedBrace, line)),
            None => Ok(out),
        }
    }
}

/// Type one nesting level into `Comment`, `Property` and `Entry` tokens,
/// recursing into every `Nested` group.
///
/// # Errors
///
/// Returns `ParseError` when a statement is malformed.
pub fn type_statements(tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    let out = Typer::default().run(tokens)?;
    debug!(statements = out.len(), "typed statements");
    Ok(out)
}

#[derive(Default)]
struct Typer {
    key: Option<(String, usize)>,
    values: Vec<String>,
    out: Vec<Token>,
}

impl Typer {
    fn run(mut self, tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
        for token in tokens {
            self.step(token)?;
        }
        self.finish()
    }

    fn current_key(&self) -> Option<String> {
        self.key.as_ref().map(|(key, _)| key.clone())
    }

    fn step(&mut self, token: Token) -> Result<(), ParseError> {
        let line = token.line;
        match token.kind {
            TokenKind::Word(text) => {
                if self.key.is_none() {
                    self.key = Some((text, line));
                } else {
                    self.values.push(text);
                }
            }
            TokenKind::Newline => {}
            TokenKind::Comment(_) => self.out.push(token),
            TokenKind::OpenParen | TokenKind::CloseParen => {
                if !matches!(&self.key, Some((key, _)) if key == "if") {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedParen {
                            key: self.current_key(),
                        },
                        line,
                    ));
                }
                let paren = if token.kind == TokenKind::OpenParen {
                    "("
                } else {
                    ")"
                };
                self.values.push(paren.to_string());
            }
            TokenKind::Semicolon => {
                if self.values.is_empty() {
                    return Err(ParseError::new(
                        ParseErrorKind::MissingValue {
                            key: self.current_key(),
                        },
                        line,
                    ));
                }
                let (key, start) = self.take_key(line);
                let values = std::mem::take(&mut self.values);
                self.out
                    .push(Token::new(TokenKind::Property { key, values }, start));
            }
            TokenKind::Nested(inner) => {
                if self.key.is_none() {
                    return Err(ParseError::new(ParseErrorKind::BlockWithoutKey, line));
                }
                let body = Self::default().run(inner)?;
                let (key, start) = self.take_key(line);
                let values = std::mem::take(&mut self.values);
                self.out
                    .push(Token::new(TokenKind::Entry { key, values, body }, start));
            }
            other => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedToken {
                        token: other.to_string(),
                    },
                    line,
                ));
            }
        }
        Ok(())
    }

    fn take_key(&mut self, line: usize) -> (String, usize) {
        self.key.take().unwrap_or_else(|| (String::new(), line))
    }

    fn finish(self) -> Result<Vec<Token>, ParseError> {
        match self.key {
            Some((key, line)) => Err(ParseError::new(
                ParseErrorKind::UnterminatedDirective { key },
                line,
            )),
            None => Ok(self.out),
        }
    }
}
