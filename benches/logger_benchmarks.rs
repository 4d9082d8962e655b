//! Criterion benchmarks for budget_logger

use budget_logger::core::render;
use budget_logger::prelude::*;
use budget_logger::sanitize;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Renders every entry and discards the result
struct DiscardTransport;

impl Transport for DiscardTransport {
    fn write(&mut self, entry: &LogEntry, style: RenderStyle) -> Result<()> {
        black_box(render::render(entry, style, false)?);
        Ok(())
    }

    fn write_minimal(&mut self, entry: &LogEntry) -> Result<()> {
        black_box(render::render_minimal(entry));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "discard"
    }
}

fn logger(config: LoggerConfig) -> Logger {
    Logger::new(config, Box::new(DiscardTransport)).expect("Failed to build logger")
}

fn request_meta() -> Meta {
    Meta::new()
        .with_field("method", "GET")
        .with_field("path", "/api/transactions")
        .with_field("statusCode", 200u16)
        .with_field("duration", Duration::from_millis(14))
        .with_field("userId", "u-42")
}

// ============================================================================
// Logger Creation Benchmarks
// ============================================================================

fn bench_logger_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("development", |b| {
        b.iter(|| black_box(logger(LoggerConfig::development())));
    });

    group.bench_function("production_with_timer", |b| {
        b.iter(|| black_box(logger(LoggerConfig::production())));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_immediate_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("immediate_logging");
    group.throughput(Throughput::Elements(1));

    let logger = logger(LoggerConfig::development());

    group.bench_function("info_no_meta", |b| {
        b.iter(|| logger.info(black_box("Dashboard loaded"), None));
    });

    group.bench_function("info_request_meta", |b| {
        b.iter(|| logger.info(black_box("Request completed"), request_meta()));
    });

    group.finish();
}

fn bench_buffered_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered_logging");
    group.throughput(Throughput::Elements(1));

    for buffer_size in [1usize, 50, 1000] {
        let logger = logger(
            LoggerConfig::production()
                .with_buffer_size(buffer_size)
                .with_flush_interval(Duration::from_secs(60)),
        );
        group.bench_function(format!("buffer_{}", buffer_size), |b| {
            b.iter(|| logger.info(black_box("Transaction saved"), request_meta()));
        });
    }

    group.finish();
}

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = logger(LoggerConfig::production().with_level(LogLevel::Error));

    group.bench_function("filtered_debug", |b| {
        b.iter(|| logger.debug(black_box("Recomputing balances"), None));
    });

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");
    group.throughput(Throughput::Elements(400));

    let logger = Arc::new(logger(LoggerConfig::production()));

    group.bench_function("4_threads_x_100", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = Arc::clone(&logger);
                    thread::spawn(move || {
                        for _ in 0..100 {
                            logger.info("Category listed", None);
                        }
                    })
                })
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
        });
    });

    group.finish();
}

// ============================================================================
// Sanitization and Rendering Benchmarks
// ============================================================================

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");
    group.throughput(Throughput::Elements(1));

    let flat = request_meta().with_field("authToken", "secret-value");

    let mut nested_map = BTreeMap::new();
    nested_map.insert("password".to_string(), MetaValue::from("hunter2"));
    nested_map.insert("amounts".to_string(), MetaValue::from(vec![12.5, 40.0, 7.25]));
    let nested = request_meta().with_field("payload", MetaValue::Map(nested_map));

    group.bench_function("flat", |b| b.iter(|| black_box(sanitize(black_box(&flat)))));
    group.bench_function("nested", |b| b.iter(|| black_box(sanitize(black_box(&nested)))));

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.throughput(Throughput::Elements(1));

    let entry = LogEntry::new(
        LogLevel::Info,
        "Request completed",
        request_meta(),
        Environment::Production,
        "household-budget",
        "1.0.0",
    );

    group.bench_function("structured", |b| {
        b.iter(|| black_box(render::render_structured(black_box(&entry))));
    });
    group.bench_function("formatted", |b| {
        b.iter(|| black_box(render::render_formatted(black_box(&entry), false)));
    });
    group.bench_function("minimal", |b| {
        b.iter(|| black_box(render::render_minimal(black_box(&entry))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_logger_creation,
    bench_immediate_logging,
    bench_buffered_logging,
    bench_level_filtering,
    bench_concurrent_logging,
    bench_sanitize,
    bench_render,
);

criterion_main!(benches);
