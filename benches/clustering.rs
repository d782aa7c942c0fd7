use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grove::{
    Agglomerator, CategoricalDistance, Clusterer, DistanceMetric, FeatureRecord, FeatureSet,
    Linkage, NumericDistance, Schema,
};
use rand::prelude::*;

const WORDS: &[&str] = &[
    "create", "approve", "reject", "order", "invoice", "account", "ship", "review", "claim",
];

fn synthetic(n: usize) -> FeatureSet {
    let mut rng = StdRng::seed_from_u64(42);
    let records = (0..n)
        .map(|_| {
            let title = format!(
                "{} {}",
                WORDS[rng.random_range(0..WORDS.len())],
                WORDS[rng.random_range(0..WORDS.len())]
            );
            FeatureRecord::new(
                vec![rng.random::<f64>() * 40.0, rng.random::<f64>() * 8.0],
                vec![title],
            )
        })
        .collect();
    FeatureSet::from_records(
        Schema::new()
            .numeric("nodes", 1.0)
            .numeric("depth", 1.0)
            .categorical("title", 1.0),
        records,
    )
    .unwrap()
}

fn metric() -> DistanceMetric {
    DistanceMetric::combined(NumericDistance::unweighted(2), CategoricalDistance::unweighted(1))
}

fn bench_linkages(c: &mut Criterion) {
    let mut group = c.benchmark_group("agglomerate");
    let data = synthetic(200);

    for linkage in [Linkage::Single, Linkage::Average, Linkage::Ward, Linkage::NeighborJoining] {
        group.bench_function(format!("{linkage:?}_n200_k4"), |b| {
            b.iter(|| {
                let mut agg = Agglomerator::new(metric())
                    .with_linkage(linkage)
                    .with_n_clusters(4);
                agg.build_clusterer(black_box(&data)).unwrap();
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_linkages);
criterion_main!(benches);
