//! Benchmarks for the per-event hot path: formatting and config reads.

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nowplaying_notify::notifier::{DeliveryRequest, DeliveryResponse, escape, format_message};
use nowplaying_notify::prelude::*;

/// Accepts every post without touching the network.
struct NullTransport;

#[async_trait]
impl Transport for NullTransport {
    async fn post(&self, _request: &DeliveryRequest) -> Result<DeliveryResponse> {
        Ok(DeliveryResponse {
            status: 200,
            body: String::new(),
        })
    }
}

fn item(name: &str) -> PlayingItem {
    PlayingItem::new()
        .with_name(name)
        .with_artist("Simon & Garfunkel")
        .with_album("Bridge over Troubled Water")
        .with_url("https://music.example.com/album/1234?i=5678")
}

/// Escaping with and without characters that need replacing
fn benchmark_escape(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape");
    for (label, input) in [
        ("plain", "The Boxer".repeat(8)),
        ("markup", "<Intro> & <Outro>".repeat(8)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &input, |b, input| {
            b.iter(|| black_box(escape(input)));
        });
    }
    group.finish();
}

/// Full message formatting
fn benchmark_format(c: &mut Criterion) {
    let with_url = item("The Boxer");
    let without_url = PlayingItem {
        url: None,
        ..item("Cecilia")
    };
    let empty = PlayingItem::new();

    let mut group = c.benchmark_group("format_message");
    group.bench_function("with_url", |b| b.iter(|| black_box(format_message(&with_url))));
    group.bench_function("without_url", |b| b.iter(|| black_box(format_message(&without_url))));
    group.bench_function("all_unknown", |b| b.iter(|| black_box(format_message(&empty))));
    group.finish();
}

/// Config snapshot read taken by every delivery
fn benchmark_config_read(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let bus = EventBus::new();
    let notifier = Notifier::builder(&bus)
        .with_config_store(DeliveryConfig::new("music", "xoxb-bench"))
        .with_transport(NullTransport)
        .with_runtime(runtime.handle().clone())
        .build()
        .unwrap();

    c.bench_function("config_snapshot", |b| {
        b.iter(|| black_box(notifier.config()));
    });
}

criterion_group!(benches, benchmark_escape, benchmark_format, benchmark_config_read);
criterion_main!(benches);
