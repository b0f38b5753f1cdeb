//! Pretty-printer that serializes a document back into canonical text.
//!
//! Properties with comments come first, then the rest, each group sorted
//! by name. Child blocks follow in the order they were parsed, separated
//! by blank lines. Comments are re-wrapped to fit the line width.

use crate::ast::{ConfigDocument, Condition, Events, Http, Location, Properties, Server, Upstream};

/// Layout settings for [`format_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// One level of indentation.
    pub indent: String,
    /// Target line width for wrapped comments.
    pub line_width: usize,
    /// Columns kept free at the end of every comment line.
    pub comment_margin: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            line_width: 80,
            comment_margin: 12,
        }
    }
}

/// Format a document with the default options.
#[must_use]
pub fn format(document: &ConfigDocument) -> String {
    format_with(document, &FormatOptions::default())
}

/// Format a document with custom layout options.
#[must_use]
pub fn format_with(document: &ConfigDocument, options: &FormatOptions) -> String {
    let mut printer = Printer {
        out: String::new(),
        options,
    };

    printer.properties(0, &document.properties);
    if let Some(events) = &document.events {
        printer.blank();
        printer.events(0, events);
    }
    if let Some(http) = &document.http {
        printer.blank();
        printer.http(0, http);
    }

    let mut out = printer.out;
    while out.ends_with("\n\n") {
        out.pop();
    }
    // Trailing newline
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Split `comment` into lines of at most `width` columns, keeping
/// over-long words on a line of their own.
#[must_use]
pub fn wrap_comment(comment: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in comment.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

struct Printer<'a> {
    out: String,
    options: &'a FormatOptions,
}

impl Printer<'_> {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(&self.options.indent);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Separate the next item with one blank line, unless the output is
    /// empty, already blank, or a block was just opened.
    fn blank(&mut self) {
        if self.out.is_empty() || self.out.ends_with("\n\n") || self.out.ends_with("{\n") {
            return;
        }
        self.out.push('\n');
    }

    fn comment(&mut self, depth: usize, comment: &str) {
        let used = self.options.comment_margin + self.options.indent.len() * depth;
        let width = self.options.line_width.saturating_sub(used).max(1);
        for text in wrap_comment(comment, width) {
            self.line(depth, &format!("# {text}"));
        }
    }

    fn properties(&mut self, depth: usize, properties: &Properties) {
        let (mut commented, mut plain): (Vec<_>, Vec<_>) =
            properties.iter().partition(|p| p.has_comment());
        commented.sort_by(|a, b| a.name.cmp(&b.name));
        plain.sort_by(|a, b| a.name.cmp(&b.name));

        for property in commented {
            self.comment(depth, &property.comment);
            self.line(depth, &statement(&property.name, &property.value));
            self.blank();
        }
        for property in plain {
            self.line(depth, &statement(&property.name, &property.value));
        }
    }

    fn open(&mut self, depth: usize, comment: &str, header: &str) {
        self.comment(depth, comment);
        self.line(depth, &format!("{header} {{"));
    }

    fn close(&mut self, depth: usize) {
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        self.line(depth, "}");
    }

    fn events(&mut self, depth: usize, events: &Events) {
        self.open(depth, &events.comment, "events");
        self.properties(depth + 1, &events.properties);
        self.close(depth);
    }

    fn http(&mut self, depth: usize, http: &Http) {
        self.open(depth, &http.comment, "http");
        self.properties(depth + 1, &http.properties);
        for server in &http.servers {
            self.blank();
            self.server(depth + 1, server);
        }
        for upstream in &http.upstreams {
            self.blank();
            self.upstream(depth + 1, upstream);
        }
        self.close(depth);
    }

    fn upstream(&mut self, depth: usize, upstream: &Upstream) {
        self.open(depth, &upstream.comment, &format!("upstream {}", upstream.name));
        self.properties(depth + 1, &upstream.properties);
        self.close(depth);
    }

    fn server(&mut self, depth: usize, server: &Server) {
        self.open(depth, &server.comment, "server");
        self.properties(depth + 1, &server.properties);
        for location in &server.locations {
            self.blank();
            self.location(depth + 1, location);
        }
        self.conditions(depth + 1, &server.conditions);
        self.close(depth);
    }

    fn location(&mut self, depth: usize, location: &Location) {
        self.open(depth, &location.comment, &format!("location {}", location.path));
        self.properties(depth + 1, &location.properties);
        self.conditions(depth + 1, &location.conditions);
        self.close(depth);
    }

    fn conditions(&mut self, depth: usize, conditions: &[Condition]) {
        for condition in conditions {
            self.blank();
            self.open(
                depth,
                &condition.comment,
                &format!("if ({})", condition.condition),
            );
            self.properties(depth + 1, &condition.properties);
            self.close(depth);
        }
    }
}

fn statement(name: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{name};")
    } else {
        format!("{name} {value};")
    }
}
