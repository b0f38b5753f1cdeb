//! Parse an nginx config string and re-format it.

fn main() {
    let input = "\
user  nginx ;
# worker tuning
worker_processes auto;
events { worker_connections 1024; }
http {
    server {
        server_name example.com;
        listen 80;
        location / { root /srv/www; }
    }
}
";

    let document = nginx_fmt::parse_str(input).expect("parse failed");

    println!("Top-level properties: {}", document.properties.len());
    for property in &document.properties {
        println!("  {} = {}", property.name, property.value);
    }
    if let Some(http) = &document.http {
        for server in &http.servers {
            if let Some(name) = server.properties.get("server_name") {
                println!("  Server: {}", name.value);
            }
            for location in &server.locations {
                println!("    Location: {}", location.path);
            }
        }
    }

    let output = nginx_fmt::format(&document);
    println!("\nFormatted output:\n{output}");
}
