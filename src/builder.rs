//! Assembles the typed document tree from a typed statement stream.
//!
//! Every block type implements [`Block`]: properties and comments are
//! handled once in [`populate`], and each type matches the block
//! directives it accepts in [`Block::enter`].

use std::fmt;

use tracing::{debug, trace};

use crate::ast::{
    ConfigDocument, Condition, Events, Http, Location, Properties, Property, Server, Upstream,
};
use crate::ErrorCategory;
use crate::token::{Token, TokenKind};

/// Classifies a document build error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildErrorKind {
    /// Block directive not accepted in its enclosing block.
    UnsupportedDirective { key: String, context: &'static str },
    /// Second `events` or `http` block.
    DuplicateBlock { key: String },
    /// Block directive that needs an argument got none.
    MissingArgument { directive: String },
    /// Block directive that takes no argument got some.
    UnexpectedArgument { directive: String },
    /// `if` not followed by a non-empty `( ... )`.
    MalformedCondition,
    /// Token in a statement list that is not a comment, property or block.
    UnexpectedStatement { token: String },
}

impl BuildErrorKind {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedDirective { .. } => ErrorCategory::UnsupportedDirective,
            Self::DuplicateBlock { .. } => ErrorCategory::Structural,
            Self::MissingArgument { .. } | Self::UnexpectedArgument { .. } => {
                ErrorCategory::Validation
            }
            Self::MalformedCondition | Self::UnexpectedStatement { .. } => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for BuildErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDirective { key, context } => {
                write!(f, "unsupported directive '{key}' in {context}")
            }
            Self::DuplicateBlock { key } => write!(f, "duplicate '{key}' block"),
            Self::MissingArgument { directive } => {
                write!(f, "'{directive}' requires an argument")
            }
            Self::UnexpectedArgument { directive } => {
                write!(f, "'{directive}' takes no arguments")
            }
            Self::MalformedCondition => {
                write!(f, "'if' condition must be wrapped in parentheses")
            }
            Self::UnexpectedStatement { token } => {
                write!(f, "unexpected {token} where a statement was expected")
            }
        }
    }
}

/// Error produced while building the document tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}")]
pub struct BuildError {
    pub kind: BuildErrorKind,
    pub line: usize,
}

/// Build a document from the top-level typed statements.
///
/// # Errors
///
/// Returns `BuildError` when a block directive is not supported where
/// it appears, its arguments do not fit it, or the stream holds a token
/// that is not a typed statement.
pub fn build(statements: Vec<Token>) -> Result<ConfigDocument, BuildError> {
    let mut document = ConfigDocument::default();
    populate(&mut document, statements)?;
    debug!(
        properties = document.properties.len(),
        events = document.events.is_some(),
        http = document.http.is_some(),
        "built document"
    );
    Ok(document)
}

/// A block directive handed to its parent for construction.
#[derive(Debug)]
pub struct BlockEntry {
    pub key: String,
    pub values: Vec<String>,
    pub body: Vec<Token>,
    pub comment: String,
    pub line: usize,
}

impl BlockEntry {
    fn unsupported(&self, context: &'static str) -> BuildError {
        BuildError {
            kind: BuildErrorKind::UnsupportedDirective {
                key: self.key.clone(),
                context,
            },
            line: self.line,
        }
    }

    const fn error(&self, kind: BuildErrorKind) -> BuildError {
        BuildError {
            kind,
            line: self.line,
        }
    }

    fn no_arguments(&self) -> Result<(), BuildError> {
        if self.values.is_empty() {
            Ok(())
        } else {
            Err(self.error(BuildErrorKind::UnexpectedArgument {
                directive: self.key.clone(),
            }))
        }
    }

    fn joined_arguments(&self) -> Result<String, BuildError> {
        if self.values.is_empty() {
            Err(self.error(BuildErrorKind::MissingArgument {
                directive: self.key.clone(),
            }))
        } else {
            Ok(self.values.join(" "))
        }
    }
}

/// A node of the document tree that can be filled from statements.
pub trait Block {
    /// Name used in error messages.
    const CONTEXT: &'static str;

    fn properties_mut(&mut self) -> &mut Properties;

    /// Construct a child block. Types that accept no children keep the
    /// default, which rejects every entry.
    fn enter(&mut self, entry: BlockEntry) -> Result<(), BuildError> {
        Err(entry.unsupported(Self::CONTEXT))
    }
}

/// Feed one level of statements into `node`.
///
/// Comments accumulate until the next property or entry picks them up;
/// any left over when the level ends are dropped.
///
/// # Errors
///
/// Returns the first `BuildError` raised by `node` or its children.
pub fn populate<B: Block>(node: &mut B, statements: Vec<Token>) -> Result<(), BuildError> {
    let mut pending: Vec<String> = Vec::new();

    for statement in statements {
        match statement.kind {
            TokenKind::Comment(text) => pending.push(text),
            TokenKind::Property { key, values } => {
                let comment = flush(&mut pending);
                node.properties_mut().push(Property {
                    name: key,
                    value: values.join(" "),
                    comment,
                });
            }
            TokenKind::Entry { key, values, body } => {
                trace!(key = %key, context = B::CONTEXT, line = statement.line, "dispatching block");
                let comment = flush(&mut pending);
                node.enter(BlockEntry {
                    key,
                    values,
                    body,
                    comment,
                    line: statement.line,
                })?;
            }
            other => {
                return Err(BuildError {
                    kind: BuildErrorKind::UnexpectedStatement {
                        token: other.to_string(),
                    },
                    line: statement.line,
                });
            }
        }
    }

    if !pending.is_empty() {
        debug!(
            comment = %pending.join(" "),
            context = B::CONTEXT,
            "discarding trailing comment with no following directive"
        );
    }
    Ok(())
}

fn flush(pending: &mut Vec<String>) -> String {
    let comment = pending.join(" ");
    pending.clear();
    comment
}

fn condition(entry: BlockEntry) -> Result<Condition, BuildError> {
    let inner = match entry.values.as_slice() {
        [open, inner @ .., close] if open == "(" && close == ")" && !inner.is_empty() => {
            inner.join(" ")
        }
        _ => return Err(entry.error(BuildErrorKind::MalformedCondition)),
    };
    let mut node = Condition {
        comment: entry.comment,
        condition: inner,
        properties: Properties::new(),
    };
    populate(&mut node, entry.body)?;
    Ok(node)
}

impl Block for ConfigDocument {
    const CONTEXT: &'static str = "main";

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    fn enter(&mut self, entry: BlockEntry) -> Result<(), BuildError> {
        match entry.key.as_str() {
            "events" => {
                entry.no_arguments()?;
                if self.events.is_some() {
                    return Err(entry.error(BuildErrorKind::DuplicateBlock {
                        key: entry.key.clone(),
                    }));
                }
                let mut events = Events {
                    comment: entry.comment,
                    properties: Properties::new(),
                };
                populate(&mut events, entry.body)?;
                self.events = Some(events);
            }
            "http" => {
                entry.no_arguments()?;
                if self.http.is_some() {
                    return Err(entry.error(BuildErrorKind::DuplicateBlock {
                        key: entry.key.clone(),
                    }));
                }
                let mut http = Http {
                    comment: entry.comment,
                    ..Http::default()
                };
                populate(&mut http, entry.body)?;
                self.http = Some(http);
            }
            _ => return Err(entry.unsupported(Self::CONTEXT)),
        }
        Ok(())
    }
}

impl Block for Events {
    const CONTEXT: &'static str = "events";

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

impl Block for Http {
    const CONTEXT: &'static str = "http";

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    fn enter(&mut self, entry: BlockEntry) -> Result<(), BuildError> {
        match entry.key.as_str() {
            "server" => {
                entry.no_arguments()?;
                let mut server = Server {
                    comment: entry.comment,
                    ..Server::default()
                };
                populate(&mut server, entry.body)?;
                self.servers.push(server);
            }
            "upstream" => {
                let name = entry.joined_arguments()?;
                let mut upstream = Upstream {
                    comment: entry.comment,
                    name,
                    properties: Properties::new(),
                };
                populate(&mut upstream, entry.body)?;
                self.upstreams.push(upstream);
            }
            _ => return Err(entry.unsupported(Self::CONTEXT)),
        }
        Ok(())
    }
}

impl Block for Upstream {
    const CONTEXT: &'static str = "upstream";

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

impl Block for Server {
    const CONTEXT: &'static str = "server";

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    fn enter(&mut self, entry: BlockEntry) -> Result<(), BuildError> {
        match entry.key.as_str() {
            "location" => {
                let path = entry.joined_arguments()?;
                let mut location = Location {
                    comment: entry.comment,
                    path,
                    ..Location::default()
                };
                populate(&mut location, entry.body)?;
                self.locations.push(location);
            }
            "if" => self.conditions.push(condition(entry)?),
            _ => return Err(entry.unsupported(Self::CONTEXT)),
        }
        Ok(())
    }
}

impl Block for Location {
    const CONTEXT: &'static str = "location";

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    fn enter(&mut self, entry: BlockEntry) -> Result<(), BuildError> {
        match entry.key.as_str() {
            "if" => self.conditions.push(condition(entry)?),
            _ => return Err(entry.unsupported(Self::CONTEXT)),
        }
        Ok(())
    }
}

impl Block for Condition {
    const CONTEXT: &'static str = "if";

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn build_input(input: &str) -> Result<ConfigDocument, BuildError> {
        build(parse(tokenize(input)).expect("parse failed"))
    }

    #[test]
    fn top_level_property() {
        let doc = build_input("worker_processes 1;\n").expect("build failed");
        assert_eq!(
            doc.properties.as_slice(),
            &[Property::new("worker_processes", "1")]
        );
        assert!(doc.events.is_none());
        assert!(doc.http.is_none());
    }

    #[test]
    fn comment_attaches_to_next_property() {
        let doc = build_input("# hello\n# world\nworker_processes 1;\nuser nginx;\n").unwrap();
        let props = doc.properties.as_slice();
        assert_eq!(props[0].comment, "hello world");
        assert_eq!(props[1].comment, "");
    }

    #[test]
    fn comment_attaches_to_block() {
        let doc = build_input("# workers\nevents {\n  worker_connections 512;\n}\n").unwrap();
        let events = doc.events.expect("events missing");
        assert_eq!(events.comment, "workers");
        assert_eq!(
            events.properties.get("worker_connections").map(|p| p.value.as_str()),
            Some("512")
        );
    }

    #[test]
    fn trailing_comment_is_dropped() {
        let doc = build_input("events {\n  use epoll;\n  # nothing follows\n}\n").unwrap();
        let events = doc.events.unwrap();
        assert_eq!(events.properties.len(), 1);
        assert_eq!(events.properties.as_slice()[0].comment, "");
    }

    #[test]
    fn servers_keep_encounter_order() {
        let doc = build_input(
            "http {\n  server { listen 80; }\n  server { listen 81; }\n}\n",
        )
        .unwrap();
        let http = doc.http.unwrap();
        let listens: Vec<_> = http
            .servers
            .iter()
            .filter_map(|s| s.properties.get("listen"))
            .map(|p| p.value.as_str())
            .collect();
        assert_eq!(listens, ["80", "81"]);
    }

    #[test]
    fn location_path_joins_arguments() {
        let doc = build_input("http { server { location ~ ^/api/ { deny all; } } }").unwrap();
        let server = &doc.http.unwrap().servers[0];
        assert_eq!(server.locations[0].path, "~ ^/api/");
    }

    #[test]
    fn condition_in_location() {
        let doc = build_input(
            "http { server { location / { if ($request_method = POST) { return 405; } } } }",
        )
        .unwrap();
        let location = &doc.http.unwrap().servers[0].locations[0];
        assert_eq!(location.conditions[0].condition, "$request_method = POST");
        assert_eq!(
            location.conditions[0].properties.as_slice(),
            &[Property::new("return", "405")]
        );
    }

    #[test]
    fn upstream_is_modeled() {
        let doc = build_input(
            "http {\n  upstream backend {\n    server 10.0.0.1:8080;\n    server 10.0.0.2:8080;\n  }\n}\n",
        )
        .unwrap();
        let upstream = &doc.http.unwrap().upstreams[0];
        assert_eq!(upstream.name, "backend");
        assert_eq!(upstream.properties.len(), 2);
    }

    #[test]
    fn unsupported_top_level_block() {
        let err = build_input("foo { bar 1; }").unwrap_err();
        assert_eq!(
            err.kind,
            BuildErrorKind::UnsupportedDirective {
                key: "foo".into(),
                context: "main"
            }
        );
        assert_eq!(err.kind.category(), ErrorCategory::UnsupportedDirective);
    }

    #[test]
    fn nested_block_in_condition_is_unsupported() {
        let err = build_input("http { server { if ($a) { location / { } } } }").unwrap_err();
        assert!(matches!(
            err.kind,
            BuildErrorKind::UnsupportedDirective { ref key, context: "if" } if key == "location"
        ));
    }

    #[test]
    fn duplicate_http_block() {
        let err = build_input("http { }\nhttp { }\n").unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::DuplicateBlock { key: "http".into() });
        assert_eq!(err.line, 2);
    }

    #[test]
    fn location_requires_path() {
        let err = build_input("http { server { location { } } }").unwrap_err();
        assert_eq!(
            err.kind,
            BuildErrorKind::MissingArgument {
                directive: "location".into()
            }
        );
    }

    #[test]
    fn server_takes_no_arguments() {
        let err = build_input("http { server example.com { } }").unwrap_err();
        assert!(matches!(err.kind, BuildErrorKind::UnexpectedArgument { .. }));
    }

    #[test]
    fn untyped_tokens_are_rejected() {
        let err = build(vec![
            Token::word("stray", 1),
            Token::new(TokenKind::Semicolon, 1),
            Token::new(TokenKind::Nested(vec![Token::word("x", 2)]), 2),
        ])
        .unwrap_err();
        assert_eq!(
            err.kind,
            BuildErrorKind::UnexpectedStatement {
                token: "STRING(stray)".into()
            }
        );
        assert_eq!(err.line, 1);
        assert_eq!(err.kind.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn untyped_token_inside_block_is_rejected() {
        let events = Token::new(
            TokenKind::Entry {
                key: "events".into(),
                values: Vec::new(),
                body: vec![Token::new(TokenKind::Semicolon, 3)],
            },
            2,
        );
        let err = build(vec![events]).unwrap_err();
        assert!(matches!(err.kind, BuildErrorKind::UnexpectedStatement { .. }));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn condition_requires_parens() {
        let err = build_input("http { server { if () { return 403; } } }").unwrap_err();
        assert_eq!(err.kind, BuildErrorKind::MalformedCondition);
    }
}
