// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use toolkit::param::HttpRequestMethod;
use toolkit::{router, Response, RouteOptions, Router};

fn build(count: usize) -> Router {
    let mut router = Router::new();
    for i in 0..count {
        router
            .register(
                &format!("section{}/(:num)/(:any?)", i),
                RouteOptions::new().action(|_, _| Response::text("ok")),
            )
            .unwrap();
    }
    router
}

fn router_find_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("router_find_last");

    for count in [10, 100, 500].iter() {
        let router = build(*count);
        let path = format!("section{}/42/slug", count - 1);
        group.bench_with_input(BenchmarkId::from_parameter(count), &path, |b, path| {
            b.iter(|| {
                let _ = router.find(HttpRequestMethod::Get, black_box(path), false, false);
            });
        });
    }

    group.finish();
}

fn router_miss_benchmark(c: &mut Criterion) {
    let router = build(100);
    c.bench_function("router_miss", |b| {
        b.iter(|| {
            let _ = router.find(HttpRequestMethod::Get, black_box("nowhere/at/all"), false, false);
        });
    });
}

fn wildcards_benchmark(c: &mut Criterion) {
    c.bench_function("wildcards_translate", |b| {
        b.iter(|| router::wildcards(black_box("blog/(:num)/(:any)/(:all?)")));
    });
}

criterion_group!(
    benches,
    router_find_benchmark,
    router_miss_benchmark,
    wildcards_benchmark
);
criterion_main!(benches);
