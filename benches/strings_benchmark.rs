// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use toolkit::strings;

fn slug_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings_slug");

    let inputs = [
        ("ascii", "Hello World, this is a plain title"),
        ("umlauts", "Über große Bäume in Köln und Zürich"),
        ("noisy", "  --Ça va?? Ålesund & Œuvre (2024) !!--  "),
    ];
    for (name, input) in inputs {
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| strings::slug(black_box(input), "-", strings::SLUG_ALLOWED));
        });
    }

    group.bench_function("custom_allowed", |b| {
        b.iter(|| strings::slug(black_box("My Photo@2x.JPEG"), "-", "a-z0-9@._-"));
    });

    group.finish();
}

fn template_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings_template");

    for tokens in [1usize, 8, 32] {
        let keys: Vec<String> = (0..tokens).map(|i| format!("key{}", i)).collect();
        let text: String = keys.iter().map(|k| format!("{{{}}} and ", k)).collect();
        let data: Vec<(String, String)> = keys.iter().map(|k| (k.clone(), k.to_uppercase())).collect();

        group.bench_with_input(BenchmarkId::from_parameter(tokens), &text, |b, text| {
            b.iter(|| strings::template(black_box(text), data.iter().map(|(k, v)| (k, v))));
        });
    }

    group.finish();
}

criterion_group!(benches, slug_benchmark, template_benchmark);
criterion_main!(benches);
