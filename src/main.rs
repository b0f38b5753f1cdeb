//! CLI tool to validate and format nginx configuration files.

use std::fs;
use std::process::ExitCode;

use nginx_fmt::{lexer, parser, token};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("Usage: nginxfmt <command> [files...]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  validate  Check if config file(s) parse");
        eprintln!("  fmt       Format config file(s) and print to stdout");
        eprintln!("  check     Check if config file(s) are formatted");
        eprintln!("  stages    Print the token stream after every pipeline stage");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  nginxfmt validate nginx.conf");
        eprintln!("  nginxfmt fmt nginx.conf");
        eprintln!("  nginxfmt check nginx.conf");
        eprintln!();
        eprintln!("Set RUST_LOG=nginx_fmt=debug to trace the pipeline.");
        return ExitCode::from(2);
    }

    let command = args[1].as_str();
    let files = &args[2..];

    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        match command {
            "validate" => match nginx_fmt::parse_str(&content) {
                Ok(doc) => {
                    let servers = doc.http.as_ref().map_or(0, |h| h.servers.len());
                    let upstreams = doc.http.as_ref().map_or(0, |h| h.upstreams.len());
                    let events = if doc.events.is_some() { ", events" } else { "" };
                    eprintln!(
                        "{path}: valid ({} property(ies), \
                         {servers} server(s), \
                         {upstreams} upstream(s){events})",
                        doc.properties.len()
                    );
                }
                Err(e) => {
                    eprintln!("{path}: {e}");
                    had_error = true;
                }
            },
            "fmt" => match nginx_fmt::format_str(&content) {
                Ok(formatted) => {
                    print!("{formatted}");
                }
                Err(e) => {
                    eprintln!("{path}: {e}");
                    had_error = true;
                }
            },
            "check" => match nginx_fmt::format_str(&content) {
                Ok(formatted) => {
                    if formatted == content {
                        eprintln!("{path}: formatted");
                    } else {
                        eprintln!("{path}: not formatted");
                        had_error = true;
                    }
                }
                Err(e) => {
                    eprintln!("{path}: {e}");
                    had_error = true;
                }
            },
            "stages" => {
                if let Err(e) = print_stages(&content) {
                    eprintln!("{path}: {e}");
                    had_error = true;
                }
            }
            _ => {
                eprintln!("Unknown command: {command}");
                return ExitCode::from(2);
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Replay the pipeline one stage at a time, printing each stream.
fn print_stages(content: &str) -> Result<(), parser::ParseError> {
    let show = |name: &str, tokens: &[token::Token]| {
        println!("== {name}");
        println!("{}", token::render_stream(tokens));
        println!();
    };

    let tokens = lexer::lex(content.lines());
    show("lex", &tokens);
    let tokens = lexer::separate_symbols(tokens, lexer::COMMENT_PREFIXES, &[]);
    show("separate octothorpes", &tokens);
    let tokens = lexer::classify(tokens, lexer::COMMENT_PREFIXES);
    show("classify octothorpes", &tokens);
    let tokens = lexer::extract_comments(tokens);
    show("extract comments", &tokens);
    let tokens = lexer::separate_symbols(tokens, lexer::BLOCK_PREFIXES, lexer::BLOCK_SUFFIXES);
    show("separate symbols", &tokens);
    let tokens = lexer::classify(tokens, lexer::TERMINALS);
    show("classify terminals", &tokens);
    let tokens = parser::nest(tokens)?;
    show("nest braces", &tokens);
    let tokens = parser::type_statements(tokens)?;
    show("type statements", &tokens);
    Ok(())
}
