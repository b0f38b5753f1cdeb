//! End-to-end tests on a complete configuration file.

mod common;

use common::roundtrip;
use nginx_fmt::{Error, ErrorCategory, format_str, parse_lines, parse_str};

const SOURCE: &str = "\
# Global settings
user  www-data;
worker_processes  auto;
pid /run/nginx.pid;

events {
    worker_connections  768;
    # multi_accept on;
}

http {
    sendfile on;
    tcp_nopush on;
    # MIME
    include /etc/nginx/mime.types;
    default_type application/octet-stream;

    upstream app_servers {
        server 127.0.0.1:8000;
        server 127.0.0.1:8001;
    }

    # Default site
    server {
        listen 80 default_server;
        server_name example.com www.example.com;
        root /var/www/html;

        location / {
            try_files $uri $uri/ =404;
        }

        location /api/ {
            proxy_pass http://app_servers;
            proxy_set_header Host $host;
        }

        if ($http_user_agent ~* bot) {
            return 403;
        }
    }
}
";

const FORMATTED: &str = "\
# Global settings
user www-data;

pid /run/nginx.pid;
worker_processes auto;

events {
  worker_connections 768;
}

http {
  # MIME
  include /etc/nginx/mime.types;

  default_type application/octet-stream;
  sendfile on;
  tcp_nopush on;

  # Default site
  server {
    listen 80 default_server;
    root /var/www/html;
    server_name example.com www.example.com;

    location / {
      try_files $uri $uri/ =404;
    }

    location /api/ {
      proxy_pass http://app_servers;
      proxy_set_header Host $host;
    }

    if ($http_user_agent ~* bot) {
      return 403;
    }
  }

  upstream app_servers {
    server 127.0.0.1:8000;
    server 127.0.0.1:8001;
  }
}
";

#[test]
fn full_config_formats_canonically() {
    let output = format_str(SOURCE).expect("format failed");
    assert_eq!(
        output, FORMATTED,
        "--- expected ---\n{FORMATTED}\n--- got ---\n{output}"
    );
}

#[test]
fn full_config_formatted_output_is_stable() {
    roundtrip(FORMATTED);
}

#[test]
fn full_config_tree() {
    let doc = parse_str(SOURCE).expect("parse failed");
    assert_eq!(doc.properties.len(), 3);
    assert_eq!(doc.properties.get("user").unwrap().comment, "Global settings");

    let events = doc.events.as_ref().expect("events");
    assert_eq!(events.properties.len(), 1);

    let http = doc.http.as_ref().expect("http");
    assert_eq!(http.properties.get("include").unwrap().comment, "MIME");
    assert_eq!(http.upstreams[0].name, "app_servers");
    assert_eq!(http.upstreams[0].properties.len(), 2);

    let server = &http.servers[0];
    assert_eq!(server.comment, "Default site");
    assert_eq!(
        server.properties.get("server_name").unwrap().value,
        "example.com www.example.com"
    );
    assert_eq!(server.locations.len(), 2);
    assert_eq!(server.locations[1].path, "/api/");
    assert_eq!(server.conditions[0].condition, "$http_user_agent ~* bot");
}

#[test]
fn parse_lines_matches_parse_str() {
    let lines: Vec<String> = SOURCE.lines().map(str::to_string).collect();
    assert_eq!(parse_lines(&lines).unwrap(), parse_str(SOURCE).unwrap());
}

#[test]
fn errors_report_source_line() {
    let broken = SOURCE.replace("root /var/www/html;", "root;");
    let err = parse_str(&broken).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(err.line(), 27);
    assert_eq!(err.to_string(), "semicolon with no values after 'root' at line 27");
}

#[test]
fn unsupported_block_reports_context() {
    let broken = SOURCE.replace("upstream app_servers {", "map $x $y {");
    let err = parse_str(&broken).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::UnsupportedDirective);
    assert_eq!(err.line(), 18);
    assert_eq!(err.to_string(), "unsupported directive 'map' in http at line 18");
}

#[test]
fn truncated_file_is_rejected() {
    let truncated = &SOURCE[..SOURCE.rfind('}').unwrap()];
    let err = parse_str(truncated).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Structural);
    assert_eq!(err.line(), 11);
}
