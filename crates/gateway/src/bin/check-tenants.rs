#!/usr/bin/env cargo
//! Tenant configuration checker for Candle
//!
//! The gateway silently falls back to the default tenant when `TENANTS_CONFIG`
//! is malformed. Run this before deploying a new value to see what the gateway
//! will actually serve.
//!
//! Usage:
//!   cargo run --bin check-tenants                 # reads TENANTS_CONFIG (or .env)
//!   cargo run --bin check-tenants -- tenants.json # reads a file

use std::env;
use std::fs;

use candle_shared::TenantConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let raw = if let Some(path) = env::args().nth(1) {
        fs::read_to_string(&path)?
    } else {
        match env::var("TENANTS_CONFIG") {
            Ok(value) => value,
            Err(_) => {
                eprintln!("Error: TENANTS_CONFIG is not set and no file was given");
                std::process::exit(1);
            }
        }
    };

    let tenants = match TenantConfig::parse_list(&raw) {
        Ok(tenants) => tenants,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("The gateway would serve only the default tenant.");
            std::process::exit(1);
        }
    };

    if tenants.is_empty() {
        eprintln!("Warning: tenant list is empty; every host gets the default tenant.");
    }

    let issues = TenantConfig::check_list(&tenants);
    for issue in &issues {
        let level = if issue.is_fatal() { "Error" } else { "Warning" };
        eprintln!("{}: {}", level, issue);
    }

    println!("\n===========================================");
    println!("Tenants ({}):", tenants.len());
    println!("===========================================");
    for tenant in &tenants {
        println!("{:<16} {:<40} {}", tenant.id, tenant.domain, tenant.name);
    }
    println!("===========================================\n");

    if issues.iter().any(|issue| issue.is_fatal()) {
        std::process::exit(1);
    }

    Ok(())
}
