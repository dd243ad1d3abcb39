//! Pre-flight sanitizer CLI for TechRiskAI.
//!
//! Shows exactly what would be sent to the LLM for a piece of text.
//!
//! Usage:
//!   cargo run -- <file.txt>            Sanitize a file, print JSON result
//!   cargo run -- <file.txt> --check    Exit 1 if the file contains secrets
//!   cat log.txt | cargo run            Read from stdin

use std::io::Read;
use techrisk_lib::safety;

fn main() {
    techrisk_lib::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let check_only = args.iter().any(|a| a == "--check");
    let path = args.iter().find(|a| !a.starts_with("--"));

    let text = match path {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Cannot read {}: {}", path, e);
            std::process::exit(2);
        }),
        None => {
            let mut buf = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
                eprintln!("Cannot read stdin: {}", e);
                std::process::exit(2);
            }
            buf
        }
    };

    if check_only {
        if safety::has_sensitive_data(&text) {
            eprintln!("Sensitive data found");
            std::process::exit(1);
        }
        eprintln!("No sensitive data found");
        return;
    }

    let result = safety::sanitize_input(&text);
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to encode result: {}", e);
            std::process::exit(2);
        }
    }
}
