//! nginx configuration parser and canonical formatter.
//!
//! Parses the `events`, `http`, `server`, `location`, `upstream` and
//! `if` subset of the nginx directive language into a typed document,
//! keeps comments attached to the directive that follows them, and
//! prints the document back in a canonical layout.
//!
//! # Quick start
//!
//! ## Parse and re-format a config
//!
//! ```
//! use nginx_fmt::{format, parse_str};
//!
//! let input = "http {\n  server {\n    listen 80;\n  }\n}\n";
//! let document = parse_str(input).unwrap();
//! assert_eq!(document.http.as_ref().unwrap().servers.len(), 1);
//! assert_eq!(format(&document), input);
//! ```
//!
//! ## Build a config programmatically
//!
//! ```
//! use nginx_fmt::{ConfigDocument, Http, Location, Property, Server, format};
//!
//! let document = ConfigDocument::new()
//!     .property(Property::new("worker_processes", "auto"))
//!     .http(Http::new().server(
//!         Server::new()
//!             .listen("80")
//!             .server_name("example.com")
//!             .location(Location::new("/").property(Property::new("root", "/srv"))),
//!     ));
//!
//! let output = format(&document);
//! assert!(output.contains("    listen 80;\n    server_name example.com;\n"));
//! assert!(output.contains("    location / {\n      root /srv;\n"));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{
    ConfigDocument, Condition, Events, Http, Location, Properties, Property, Server, Upstream,
};
pub use builder::{BuildError, BuildErrorKind, build};
pub use formatter::{FormatOptions, format, format_with};
pub use lexer::{tokenize, tokenize_lines};
pub use parser::{ParseError, ParseErrorKind, parse};
pub use token::{Token, TokenKind};

/// Broad class of a failure, shared by parse and build errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A directive is missing something it needs.
    Validation,
    /// Braces or blocks do not line up.
    Structural,
    /// A token is not allowed where it appears.
    Syntax,
    /// A block directive is not known in its context.
    UnsupportedDirective,
}

/// Unified error type covering parsing and document building.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A nesting or statement error.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// A document construction error.
    #[error("{0}")]
    Build(#[from] BuildError),
}

impl Error {
    /// Source line the error was reported at.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Parse(e) => e.line,
            Self::Build(e) => e.line,
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse(e) => e.kind.category(),
            Self::Build(e) => e.kind.category(),
        }
    }
}

/// Run the whole pipeline on a source string.
pub fn parse_str(input: &str) -> Result<ConfigDocument, Error> {
    parse_lines(input.lines())
}

/// Run the whole pipeline on an already materialized sequence of lines.
pub fn parse_lines<I, S>(lines: I) -> Result<ConfigDocument, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens = tokenize_lines(lines);
    let statements = parse(tokens)?;
    Ok(build(statements)?)
}

/// Parse `input` and format it with the default options.
pub fn format_str(input: &str) -> Result<String, Error> {
    parse_str(input).map(|document| format(&document))
}
