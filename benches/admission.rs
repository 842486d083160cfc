//! Benchmarks for proposal validation and sizing

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;
use trade_gate::config::{SizingConfig, ValidationConfig};
use trade_gate::proposal::{validate, Confidence, Side, TradeProposal};
use trade_gate::risk::size;

fn proposal() -> TradeProposal {
    TradeProposal {
        symbol: "BTCUSDT".to_string(),
        side: Side::Long,
        entry: Some(dec!(50000)),
        stop: dec!(49000),
        target: dec!(52000),
        confidence: Confidence::High,
    }
}

fn benchmark_validate(c: &mut Criterion) {
    let config = ValidationConfig::default();
    let proposal = proposal();

    c.bench_function("validate_proposal", |b| {
        b.iter(|| validate(black_box(&proposal), black_box(dec!(50000)), &config))
    });
}

fn benchmark_validate_and_size(c: &mut Criterion) {
    let validation = ValidationConfig::default();
    let sizing = SizingConfig::default();
    let proposal = proposal();

    c.bench_function("validate_and_size", |b| {
        b.iter(|| {
            let validated = validate(black_box(&proposal), dec!(50000), &validation).ok()?;
            size(
                validated.proposal.confidence,
                black_box(dec!(10000)),
                validated.entry,
                validated.proposal.stop,
                &sizing,
            )
            .ok()
        })
    });
}

criterion_group!(benches, benchmark_validate, benchmark_validate_and_size);
criterion_main!(benches);
