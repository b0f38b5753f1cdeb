//! Lexical stages of the pipeline.
//!
//! Each stage is a plain function from one token vector to the next.
//! [`tokenize`] runs them in order and hands back a stream of terminal
//! tokens and comments, ready for [`crate::parser::parse`].

use tracing::debug;

use crate::token::{Token, TokenKind};

/// Symbols split off the front of a word before comment extraction.
pub const COMMENT_PREFIXES: &[char] = &['#'];

/// Symbols split off the front of a word after comment extraction.
pub const BLOCK_PREFIXES: &[char] = &['{', '('];

/// Symbols split off the back of a word after comment extraction.
pub const BLOCK_SUFFIXES: &[char] = &['{', '}', ')', ';'];

/// Symbols renamed to terminal kinds after the second separation.
pub const TERMINALS: &[char] = &[';', '{', '}', '(', ')'];

const BOM: char = '\u{FEFF}';

/// Tokenize a source string.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    tokenize_lines(input.lines())
}

/// Tokenize an already materialized sequence of lines.
pub fn tokenize_lines<I, S>(lines: I) -> Vec<Token>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens = lex(lines);
    let tokens = separate_symbols(tokens, COMMENT_PREFIXES, &[]);
    let tokens = classify(tokens, COMMENT_PREFIXES);
    let tokens = extract_comments(tokens);
    let tokens = separate_symbols(tokens, BLOCK_PREFIXES, BLOCK_SUFFIXES);
    let tokens = classify(tokens, TERMINALS);
    debug!(tokens = tokens.len(), "tokenized source");
    tokens
}

/// Split lines into whitespace-delimited words, closing every line
/// with a `Newline` token. Lines are numbered from 1.
pub fn lex<I, S>(lines: I) -> Vec<Token>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = Vec::new();
    for (index, line) in lines.into_iter().enumerate() {
        let number = index + 1;
        let mut text = line.as_ref();
        if index == 0 {
            text = text.strip_prefix(BOM).unwrap_or(text);
        }
        for chunk in text.split_whitespace() {
            tokens.push(Token::word(chunk, number));
        }
        tokens.push(Token::new(TokenKind::Newline, number));
    }
    debug!(tokens = tokens.len(), "lexed lines");
    tokens
}

/// Peel single-character symbols off the edges of every word.
///
/// Leading `prefixes` come off one at a time, each as its own word.
/// Trailing `suffixes` are counted off the back and emitted after the
/// remaining core, in their original order. Other tokens pass through.
#[must_use]
pub fn separate_symbols(tokens: Vec<Token>, prefixes: &[char], suffixes: &[char]) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        let TokenKind::Word(text) = &token.kind else {
            out.push(token);
            continue;
        };
        let line = token.line;
        let mut rest = text.as_str();

        while let Some(symbol) = rest.chars().next().filter(|c| prefixes.contains(c)) {
            out.push(Token::word(symbol, line));
            rest = &rest[symbol.len_utf8()..];
        }

        let mut trailing = Vec::new();
        while let Some(symbol) = rest.chars().next_back().filter(|c| suffixes.contains(c)) {
            trailing.push(symbol);
            rest = &rest[..rest.len() - symbol.len_utf8()];
        }

        if !rest.is_empty() {
            out.push(Token::word(rest, line));
        }
        out.extend(
            trailing
                .into_iter()
                .rev()
                .map(|symbol| Token::word(symbol, line)),
        );
    }
    out
}

/// Rename words that are exactly one of `symbols` to their terminal kind.
#[must_use]
pub fn classify(tokens: Vec<Token>, symbols: &[char]) -> Vec<Token> {
    tokens
        .into_iter()
        .map(|token| {
            let kind = token
                .as_word()
                .and_then(single_char)
                .filter(|c| symbols.contains(c))
                .and_then(TokenKind::from_symbol);
            match kind {
                Some(kind) => Token::new(kind, token.line),
                None => token,
            }
        })
        .collect()
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Fold every `# ...` run up to the end of its line into one `Comment`.
///
/// A `#` inside a comment is kept as a literal word, so `## x` yields
/// the comment text `# x`.
#[must_use]
pub fn extract_comments(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut collecting: Option<(usize, Vec<String>)> = None;

    for token in tokens {
        let line = token.line;
        match token.kind {
            TokenKind::Octothorpe => match &mut collecting {
                Some((_, words)) => words.push("#".to_string()),
                None => collecting = Some((line, Vec::new())),
            },
            TokenKind::Word(text) => match &mut collecting {
                Some((_, words)) => words.push(text),
                None => out.push(Token::word(text, line)),
            },
            TokenKind::Newline => {
                if let Some((start, words)) = collecting.take() {
                    out.push(Token::new(TokenKind::Comment(words.join(" ")), start));
                }
                out.push(Token::new(TokenKind::Newline, line));
            }
            kind => out.push(Token::new(kind, line)),
        }
    }

    // Input that does not end in a newline token.
    if let Some((line, words)) = collecting {
        out.push(Token::new(TokenKind::Comment(words.join(" ")), line));
    }
    out
}
