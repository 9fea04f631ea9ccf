// Benchmarks for index build, k-NN queries and full search
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dimx::{
    Coordinates, DimensionConstraint, Price, Product, SearchEngine, SearchQuery, SellerSummary,
    SpatialIndex,
};
use rand::prelude::*;

const DIMENSIONS: [&str; 4] = ["price", "quality", "size", "weight"];

fn random_coordinates(rng: &mut impl Rng) -> Coordinates {
    DIMENSIONS
        .iter()
        .map(|d| (d.to_string(), rng.random_range(0.0..100.0)))
        .collect()
}

fn generate_products(n: usize) -> Vec<Product> {
    let mut rng = rand::rng();
    (0..n)
        .map(|i| {
            let seller = SellerSummary {
                id: format!("seller-{}", i % 50),
                reputation: rng.random_range(0.0..5.0),
                coordinates: random_coordinates(&mut rng),
            };
            Product::new(
                format!("p{}", i),
                format!("product number {}", i),
                random_coordinates(&mut rng),
                Price::new(rng.random_range(1.0..500.0)),
                seller,
            )
            .with_quality(rng.random_range(0.0..1.0))
            .with_availability(10)
        })
        .collect()
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for size in [1_000, 10_000, 50_000].iter() {
        let products = generate_products(*size);
        group.bench_with_input(BenchmarkId::new("kdtree", size), size, |b, _| {
            b.iter(|| SpatialIndex::build(black_box(products.clone())));
        });
    }

    group.finish();
}

fn benchmark_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");
    let index = SpatialIndex::build(generate_products(50_000));
    let mut rng = rand::rng();
    let query = random_coordinates(&mut rng);

    for k in [1, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::new("full", k), k, |b, &k| {
            b.iter(|| index.nearest(black_box(&query), k));
        });
    }

    let projected = vec!["price".to_string(), "quality".to_string()];
    group.bench_function("projected_k10", |b| {
        b.iter(|| index.nearest_projected(black_box(&query), 10, &projected));
    });

    group.finish();
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let engine = SearchEngine::default();
    engine.update_index(generate_products(50_000));

    let ranged = SearchQuery::new()
        .dimension("price", DimensionConstraint::range(40.0, 60.0))
        .dimension("quality", DimensionConstraint::preferred(80.0).with_weight(0.5))
        .page(20, 0);
    group.bench_function("two_dimensions", |b| {
        b.iter(|| engine.search(black_box(&ranged), None));
    });

    let text = SearchQuery::new().text("number 42").page(20, 0);
    group.bench_function("text_only", |b| {
        b.iter(|| engine.search(black_box(&text), None));
    });

    group.finish();
}

criterion_group!(benches, benchmark_build, benchmark_nearest, benchmark_search);
criterion_main!(benches);
