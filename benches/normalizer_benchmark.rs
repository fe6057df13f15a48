//! Normalizer throughput over a synthetic catalogue

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fashion_etl_lib::application::ProductNormalizer;
use fashion_etl_lib::domain::RawProduct;
use fashion_etl_lib::domain::product::fields;

fn catalogue(size: usize) -> Vec<RawProduct> {
    (0..size)
        .map(|i| {
            // every tenth card is a placeholder and every seventh a repeat
            let title = if i % 10 == 0 {
                "Unknown Product".to_string()
            } else {
                format!("T-shirt {}", i - i % 7)
            };
            RawProduct::new()
                .with(fields::TITLE, title)
                .with(fields::PRICE, format!("{}.99", 10 + i % 90))
                .with(fields::RATING, format!("Rating: ⭐ {}.{} / 5", 1 + i % 4, i % 10))
                .with(fields::COLORS, format!("{} Colors", 1 + i % 8))
                .with(fields::SIZE, "M")
                .with(fields::GENDER, "Unisex")
                .with(fields::TIMESTAMP, "2025-05-01 12:00:00")
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let normalizer = ProductNormalizer::default();
    let mut group = c.benchmark_group("normalize");
    for size in [50, 1000, 5000] {
        let raw = catalogue(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| normalizer.normalize(black_box(raw)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
