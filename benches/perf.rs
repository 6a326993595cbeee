use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use combinadas::combinations::{AllocatorConfig, allocate, qualifying_pool};
use combinadas::dixon_coles::ScorelineMatrix;
use combinadas::fixture::Slate;
use combinadas::model_config::{GoalModelConfig, ModelConfig};
use combinadas::report::{Execution, generate_report};

fn slate() -> Slate {
    serde_json::from_str(SLATE_JSON).expect("valid fixture json")
}

fn bench_slate_parse(c: &mut Criterion) {
    c.bench_function("slate_parse", |b| {
        b.iter(|| {
            let slate: Slate = serde_json::from_str(black_box(SLATE_JSON)).unwrap();
            black_box(slate.fixtures.len());
        })
    });
}

fn bench_scoreline_matrix(c: &mut Criterion) {
    let cfg = GoalModelConfig::default();
    c.bench_function("scoreline_matrix_markets", |b| {
        b.iter(|| {
            let m = ScorelineMatrix::build(black_box(1.8), black_box(1.1), &cfg);
            black_box(m.markets());
        })
    });
}

fn bench_report(c: &mut Criterion) {
    let slate = slate();
    let cfg = ModelConfig::default();
    c.bench_function("report_sequential", |b| {
        b.iter(|| {
            let report = generate_report(black_box(&slate), &cfg, Execution::Sequential).unwrap();
            black_box(report.summary.total_picks);
        })
    });
    c.bench_function("report_parallel", |b| {
        b.iter(|| {
            let report = generate_report(black_box(&slate), &cfg, Execution::Parallel).unwrap();
            black_box(report.summary.total_picks);
        })
    });
}

fn bench_allocation(c: &mut Criterion) {
    let report = generate_report(&slate(), &ModelConfig::default(), Execution::Sequential)
        .expect("report");
    let cfg = AllocatorConfig::default();
    c.bench_function("qualifying_pool", |b| {
        b.iter(|| {
            let pool = qualifying_pool(black_box(&report), &cfg);
            black_box(pool.len());
        })
    });
    c.bench_function("allocate", |b| {
        b.iter(|| {
            let a = allocate(black_box(&report), &cfg).unwrap();
            black_box(a.parlays.len());
        })
    });
}

criterion_group!(
    perf,
    bench_slate_parse,
    bench_scoreline_matrix,
    bench_report,
    bench_allocation
);
criterion_main!(perf);

static SLATE_JSON: &str = include_str!("../tests/fixtures/jornada.json");
