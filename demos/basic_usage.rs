//! Basic logger usage example
//!
//! Demonstrates immediate (development) and buffered (production) logging to
//! the console, level filtering and metadata redaction.
//!
//! Run with: cargo run --example basic_usage

use budget_logger::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Budget Logger - Basic Usage Example ===\n");

    let factory = LoggerFactory::new();

    println!("1. Development: every entry is printed immediately:");
    let logger = factory.get_instance(Some(LoggerConfig::development()))?;
    logger.debug("Recomputing monthly balances", None);
    logger.info(
        "Transaction created",
        Meta::new()
            .with_field("operationType", "transaction.create")
            .with_field("amount", 42.5),
    );
    logger.warn("Groceries budget at 90%", None);
    logger.error(
        "Could not load exchange rates",
        Meta::new().with_field("error", "connection refused"),
    );

    println!("\n2. Sensitive metadata is redacted:");
    logger.info(
        "User signed in",
        Meta::new()
            .with_field("userId", "u-42")
            .with_field("password", "hunter2"),
    );

    println!("\n3. Production: JSON lines, flushed in batches:");
    let logger = factory.update_config(
        LoggerConfig::production()
            .with_buffer_size(3)
            .with_flush_interval(Duration::from_millis(500)),
    )?;
    logger.debug("Filtered out at the production default level", None);
    logger.info("First buffered entry", None);
    logger.info("Second buffered entry", None);
    println!("   (nothing printed yet, {} entries buffered)", logger.buffered_len());
    logger.info("Third entry fills the buffer", None);

    println!("\n4. Shutdown flushes what is left:");
    logger.warn("Left in the buffer until shutdown", None);
    factory.shutdown();

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
