// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

use toolkit::param::HttpRequestMethod;
use toolkit::{Request, UrlContext};

const FORM: &[u8] = b"name=%20Homer%20Simpson%20&email=homer%40simpson.com&quote=it%5C%27s&page=9";
const JSON: &[u8] =
    br#"{"name": " Homer ", "address": {"street": " 742 Evergreen Terrace ", "city": "Springfield "}, "kids": [" Bart", "Lisa ", " Maggie "]}"#;

/// 查询串与请求体的合并和清洗
fn body_merge_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_data_merge");

    for (name, body) in [("urlencoded", FORM), ("json", JSON)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), body, |b, body| {
            b.iter(|| {
                let request = Request::new(HttpRequestMethod::Post, "/signup?page=2&lang=de")
                    .with_body(black_box(body));
                let _ = black_box(request.get("page"));
                let _ = black_box(request.get("name"));
            });
        });
    }

    group.finish();
}

/// 在已有数据上反复写入需要清洗的值
fn set_and_replace_body_benchmark(c: &mut Criterion) {
    c.bench_function("request_set_then_body", |b| {
        b.iter(|| {
            let mut request = Request::new(HttpRequestMethod::Post, "/form?lang=en");
            request.set("token", json!(" abc "));
            request.set("tags", json!([" a ", "b\\'s "]));
            request.set_body(FORM.to_vec());
            request.set_body(JSON.to_vec());
            black_box(request.data().len())
        });
    });
}

/// 从请求推算 URL 上下文并生成链接
fn url_context_benchmark(c: &mut Criterion) {
    let request = Request::new(HttpRequestMethod::Get, "/blog/2024/hello-world?ref=feed")
        .with_header("Host", "example.com")
        .with_https(true);

    c.bench_function("request_url_context", |b| {
        b.iter(|| {
            let ctx = UrlContext::for_request(black_box(&request));
            black_box(ctx.to("archive/page:2"))
        });
    });
}

criterion_group!(
    benches,
    body_merge_benchmark,
    set_and_replace_body_benchmark,
    url_context_benchmark
);
criterion_main!(benches);
