//! Certificate inspection example.
//!
//! Prints the metadata of a PEM certificate given on the command line.
//!
//! Run with: cargo run --example inspect_pem -- leaf.pem

use std::env;
use std::fs;

use certinfo::extract_certificate_info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .ok_or("usage: inspect_pem <certificate.pem>")?;
    let pem = fs::read_to_string(&path)?;
    let info = extract_certificate_info(&pem)?;

    println!("┌─ {}", path);
    println!("├─ Subject:");
    if info.subject.is_empty() {
        println!("│  └─ (empty, identity carried by subjectAltName)");
    }
    for (key, value) in &info.subject {
        println!("│  ├─ {}: {}", key, value);
    }
    println!("├─ Issuer:");
    for (key, value) in &info.issuer {
        println!("│  ├─ {}: {}", key, value);
    }
    println!("├─ Version: {}", info.version);
    println!("├─ CA: {}", info.basic_constraints_ca);
    println!("├─ Not Before: {}", info.not_before);
    println!("└─ Not After: {}", info.not_after);

    Ok(())
}
