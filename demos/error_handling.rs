//! Demonstrate error handling for invalid nginx config input.

fn report(input: &str) {
    match nginx_fmt::parse_str(input) {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(nginx_fmt::Error::Parse(e)) => {
            println!("Parse error: {e}");
            println!("  Kind: {:?}", e.kind);
        }
        Err(nginx_fmt::Error::Build(e)) => {
            println!("Build error: {e}");
            println!("  Kind: {:?}", e.kind);
        }
    }
}

fn main() {
    // Unclosed brace
    report("http {\n  server {\n    listen 80;\n  }\n");
    println!();

    // Directive that nginx_fmt does not model
    report("http {\n  map $uri $new {\n    default 0;\n  }\n}\n");
    println!();

    // Every error carries a line and a category
    if let Err(e) = nginx_fmt::parse_str("events {\n  use ;\n}\n") {
        println!("Error: {e}");
        println!("  Line: {}", e.line());
        println!("  Category: {:?}", e.category());
    }
}
