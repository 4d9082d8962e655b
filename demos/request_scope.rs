//! Request-scoped logging example
//!
//! Simulates a few HTTP requests handled on worker threads. Each request gets
//! its own correlation id, stamped on every entry it logs.
//!
//! Run with: cargo run --example request_scope

use budget_logger::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn handle_request(factory: &LoggerFactory, method: &str, path: &str) -> Result<()> {
    let started = Instant::now();
    let request = RequestLogger::begin(factory)?
        .with_field("method", method)
        .with_field("path", path);

    request.info("Request received", None);

    let outcome: std::result::Result<u32, String> = request.time_operation("db.query", || {
        thread::sleep(Duration::from_millis(5));
        if path.ends_with("/missing") {
            Err("category not found".to_string())
        } else {
            Ok(12)
        }
    });

    let status = if outcome.is_ok() { 200 } else { 404 };
    request.request_completed(method, path, status, started.elapsed());
    Ok(())
}

fn main() -> Result<()> {
    println!("=== Budget Logger - Request Scope Example ===\n");

    let factory = Arc::new(LoggerFactory::new());
    factory.get_instance(Some(EnvBag::from_process().with_var("LOG_LEVEL", "debug")))?;

    let handles: Vec<_> = [
        ("GET", "/api/transactions"),
        ("GET", "/api/categories/missing"),
        ("POST", "/api/budgets"),
    ]
    .into_iter()
    .map(|(method, path)| {
        let factory = Arc::clone(&factory);
        thread::spawn(move || handle_request(&factory, method, path))
    })
    .collect();

    for handle in handles {
        match handle.join() {
            Ok(result) => result?,
            Err(_) => eprintln!("request handler panicked"),
        }
    }

    factory.shutdown();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
