//! Benchmarks for pipeline execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use provisionflow::classify::classify_remote;
use provisionflow::config::EngineConfig;
use provisionflow::errors::RemoteError;
use provisionflow::orchestrator::InvocationRequest;
use provisionflow::resources::{access_point, AccessPoint, OutpostsApi};
use provisionflow::testing::{drive_to_completion, FakeOutposts};
use std::sync::Arc;

const BUCKET: &str = "arn:aws:s3-outposts:us-west-2:123456789012:outpost/op-01ac5d28a6a232904/bucket/logs";

fn classify_benchmark(c: &mut Criterion) {
    let named = RemoteError::condition(404, "NoSuchAccessPoint", "missing");
    let bucketed = RemoteError::status(418, "teapot");

    c.bench_function("classify_named_condition", |b| {
        b.iter(|| classify_remote(black_box(&named)));
    });
    c.bench_function("classify_status_bucket", |b| {
        b.iter(|| classify_remote(black_box(&bucketed)));
    });
}

fn pipeline_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    c.bench_function("access_point_create_to_completion", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let fake = Arc::new(FakeOutposts::new());
                let api: Arc<dyn OutpostsApi> = fake;
                let orchestrator = access_point::handlers(api, &EngineConfig::default()).unwrap();
                let envelopes = drive_to_completion(
                    &orchestrator,
                    InvocationRequest::create(AccessPoint::new(BUCKET, "web")),
                    10,
                )
                .await;
                black_box(envelopes)
            })
        });
    });
}

criterion_group!(benches, classify_benchmark, pipeline_benchmark);
criterion_main!(benches);
