use std::fmt;

/// Token kinds produced by the pipeline stages.
///
/// Early stages only emit the terminal kinds; `Comment`, `Nested`,
/// `Property` and `Entry` are introduced by later passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Whitespace-delimited chunk of text.
    Word(String),
    /// End of a source line.
    Newline,
    /// Semicolon `;`.
    Semicolon,
    /// Opening brace `{`.
    OpenBrace,
    /// Closing brace `}`.
    CloseBrace,
    /// Opening paren `(`.
    OpenParen,
    /// Closing paren `)`.
    CloseParen,
    /// Comment start `#`.
    Octothorpe,
    /// Comment text, without the leading `#`.
    Comment(String),
    /// Tokens between a matched `{` `}` pair.
    Nested(Vec<Token>),
    /// `key value... ;`
    Property { key: String, values: Vec<String> },
    /// `key value... { body }`, with the body already typed.
    Entry {
        key: String,
        values: Vec<String>,
        body: Vec<Token>,
    },
}

impl TokenKind {
    /// Terminal kind for a single-character symbol, if it has one.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '#' => Some(Self::Octothorpe),
            ';' => Some(Self::Semicolon),
            '{' => Some(Self::OpenBrace),
            '}' => Some(Self::CloseBrace),
            '(' => Some(Self::OpenParen),
            ')' => Some(Self::CloseParen),
            _ => None,
        }
    }
}

/// A single token with its kind and 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, line: usize) -> Self {
        Self { kind, line }
    }

    /// Shorthand for a `Word` token.
    #[must_use]
    pub fn word(text: impl Into<String>, line: usize) -> Self {
        Self::new(TokenKind::Word(text.into()), line)
    }

    /// The word text, if this is a `Word` token.
    #[must_use]
    pub fn as_word(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Word(text) => Some(text),
            _ => None,
        }
    }
}

fn write_stream(f: &mut fmt::Formatter<'_>, tokens: &[Token]) -> fmt::Result {
    f.write_str("[")?;
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{token}")?;
    }
    f.write_str("]")
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(text) => write!(f, "STRING({text})"),
            Self::Newline => f.write_str("NEWLINE"),
            Self::Semicolon => f.write_str("SEMICOLON"),
            Self::OpenBrace => f.write_str("OPEN_BRACE"),
            Self::CloseBrace => f.write_str("CLOSE_BRACE"),
            Self::OpenParen => f.write_str("OPEN_PAREN"),
            Self::CloseParen => f.write_str("CLOSE_PAREN"),
            Self::Octothorpe => f.write_str("OCTOTHORPE"),
            Self::Comment(text) => write!(f, "COMMENT({text})"),
            Self::Nested(inner) => {
                f.write_str("NESTED_")?;
                write_stream(f, inner)
            }
            Self::Property { key, values } => {
                write!(f, "PROP_({key} {values:?})")
            }
            Self::Entry { key, values, body } => {
                write!(f, "ENTRY_({key} {values:?} ")?;
                write_stream(f, body)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// Render a token stream on one line, the way stage dumps show it.
#[must_use]
pub fn render_stream(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
