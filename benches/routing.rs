use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use datastack::{
    ConfigurationName, EntityTypeName, StoreHandle, StoreLocation, StoreRouter, VersionGraph,
    VersionId,
};

/// Router with 256 entity types split across two configurations, plus a
/// handful registered in both so the ambiguous path has something to hit.
fn make_router() -> StoreRouter {
    let router = StoreRouter::new();

    let hot = StoreHandle::new(ConfigurationName::named("hot"), StoreLocation::Memory);
    router.register_store(
        hot,
        (0..128).map(|i| EntityTypeName::new(format!("Hot{i:03}"))),
    );

    let cold = StoreHandle::new(
        ConfigurationName::named("cold"),
        StoreLocation::Url("file:///tmp/cold.db".to_string()),
    );
    router.register_store(
        cold,
        (0..128)
            .map(|i| EntityTypeName::new(format!("Cold{i:03}")))
            .chain((0..8).map(|i| EntityTypeName::new(format!("Hot{i:03}")))),
    );

    router
}

fn bench_resolve_inferred(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    group.throughput(Throughput::Elements(1));

    let router = make_router();
    let entity = EntityTypeName::new("Cold064");
    group.bench_function("resolve_inferred", |b| {
        b.iter(|| black_box(router.resolve(black_box(&entity), None, true)));
    });

    group.finish();
}

fn bench_resolve_hinted(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    group.throughput(Throughput::Elements(1));

    let router = make_router();
    let entity = EntityTypeName::new("Hot064");
    let hint = ConfigurationName::named("hot");
    group.bench_function("resolve_hinted", |b| {
        b.iter(|| black_box(router.resolve(black_box(&entity), Some(&hint), false)));
    });

    group.finish();
}

fn bench_resolve_ambiguous(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    group.throughput(Throughput::Elements(1));

    let router = make_router();
    // Hot000 belongs to both configurations.
    let entity = EntityTypeName::new("Hot000");
    group.bench_function("resolve_ambiguous", |b| {
        b.iter(|| black_box(router.resolve(black_box(&entity), None, true)));
    });

    group.finish();
}

fn bench_register_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    group.throughput(Throughput::Elements(1));

    let router = make_router();
    let entities: Vec<EntityTypeName> =
        (0..128).map(|i| EntityTypeName::new(format!("Hot{i:03}"))).collect();
    group.bench_function("register_store_128_entities", |b| {
        b.iter(|| {
            let handle =
                StoreHandle::new(ConfigurationName::named("hot"), StoreLocation::Memory);
            router.register_store(black_box(handle), entities.iter().cloned());
        });
    });

    group.finish();
}

fn bench_chain_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("migration");
    group.throughput(Throughput::Elements(64));

    let chain = VersionGraph::linear((0..64).map(|i| format!("v{i}")));
    let start = VersionId::new("v0");
    group.bench_function("walk_64_versions", |b| {
        b.iter(|| black_box(chain.steps_from(black_box(&start)).count()));
    });

    group.finish();
}

criterion_group!(
    routing,
    bench_resolve_inferred,
    bench_resolve_hinted,
    bench_resolve_ambiguous,
    bench_register_store,
    bench_chain_walk
);
criterion_main!(routing);
