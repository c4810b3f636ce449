//! Benchmarks for plugin initialization and latency snapshots.

use completion_foundation::prelude::*;
use completion_foundation::LatencyRecorder;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[derive(Debug)]
struct ReadyLoader;

#[async_trait]
impl PluginLoader for ReadyLoader {
    async fn setup(&self, _plugin: PluginKind, _config: &FoundationConfig) -> SetupResult<()> {
        Ok(())
    }
}

fn bench_initialize(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");

    c.bench_function("initialize_no_plugins", |b| {
        b.to_async(&runtime).iter(|| async {
            let foundation = Foundation::initialize(black_box(FoundationConfig::new()), &ReadyLoader)
                .await
                .expect("noop init");
            black_box(foundation);
        })
    });

    let both = FoundationConfig::new()
        .with_memory_plugin()
        .with_summary_plugin()
        .with_connection(
            ProviderConnection::new()
                .with_endpoint("https://llm.internal/v1")
                .with_credential("bench")
                .with_deployment("chat-large"),
        );
    c.bench_function("initialize_both_plugins", |b| {
        b.to_async(&runtime).iter(|| async {
            let foundation = Foundation::initialize(black_box(both.clone()), &ReadyLoader)
                .await
                .expect("init");
            black_box(foundation);
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut recorder = LatencyRecorder::new();
    for i in 0..10_000 {
        recorder.record((i % 997) as f64 * 0.37);
    }

    c.bench_function("snapshot_10k_samples", |b| {
        b.iter(|| black_box(recorder.snapshot()))
    });
}

criterion_group!(benches, bench_initialize, bench_snapshot);
criterion_main!(benches);
