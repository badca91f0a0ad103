//! Benchmarks for pipeline execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use logpipe::executor::PipelineExecutor;
use logpipe::metrics::{MetricsTracker, NoOpMetricsTracker};
use logpipe::testing::{test_document, test_factory};
use logpipe::watchdog::{ExecutionTimeWatchdog, WatchdogConfig};
use serde_json::json;
use std::sync::Arc;

fn document_benchmark(c: &mut Criterion) {
    let doc = test_document(json!({"http": {"request": {"method": "GET"}}, "message": "hello"}));

    c.bench_function("document_get_nested", |b| {
        b.iter(|| black_box(doc.get(black_box("http.request.method")).is_ok()));
    });

    c.bench_function("document_set_nested", |b| {
        b.iter(|| {
            let mut doc = doc.clone();
            doc.set(black_box("geo.location.lat"), 52.1);
            black_box(doc)
        });
    });
}

fn pipeline_benchmark(c: &mut Criterion) {
    let metrics: Arc<dyn MetricsTracker> = Arc::new(NoOpMetricsTracker);
    let watchdog =
        ExecutionTimeWatchdog::with_metrics(WatchdogConfig::default(), Arc::clone(&metrics))
            .unwrap();
    let executor = PipelineExecutor::new(watchdog, metrics);
    let pipeline = test_factory()
        .create_from_value(
            "bench",
            json!({"steps": [
                {"addField": {"config": {"path": "a", "value": 1}}},
                {"if": {
                    "condition": {"exists": {"field": "a"}},
                    "then": [{"addField": {"config": {"path": "b.c", "value": "x"}}}],
                    "else": [{"drop": {}}]
                }},
                {"fail": {"onFailure": [{"addField": {"config": {"path": "failed", "value": true}}}]}}
            ]}),
        )
        .unwrap();
    let doc = test_document(json!({"message": "hello"}));

    c.bench_function("execute_three_steps", |b| {
        b.iter(|| {
            let mut doc = doc.clone();
            black_box(executor.execute(&pipeline, &mut doc).unwrap())
        });
    });
}

criterion_group!(benches, document_benchmark, pipeline_benchmark);
criterion_main!(benches);
