use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use remarka::classifier::{
    RuleBasedClassifier, RuleClassifierConfig, predict_batch, predict_batch_parallel,
};
use remarka::direction::{Direction, DirectionLabel};
use remarka::embedding::{EmbeddingStore, KeyedVectors};
use remarka::vector::{aggregate, cosine};

const DIMENSION: usize = 300;

fn generate_vector(seed: usize) -> Vec<f32> {
    (0..DIMENSION)
        .map(|j| ((seed as f32 * 0.1 + j as f32 * 0.01).sin() * 0.5 + 0.5) * 2.0 - 1.0)
        .collect()
}

fn generate_store(size: usize) -> KeyedVectors {
    let mut store = KeyedVectors::with_capacity(DIMENSION, size + 2).unwrap();
    store.insert("входить_VERB".to_string(), &generate_vector(0)).unwrap();
    store.insert("уходить_VERB".to_string(), &generate_vector(1)).unwrap();
    for i in 0..size {
        store
            .insert(format!("глагол{i}_VERB"), &generate_vector(i + 2))
            .unwrap();
    }
    store
}

fn generate_directions(count: usize, vocabulary: usize) -> Vec<Direction> {
    (0..count)
        .map(|i| {
            Direction::from(vec![
                "чацкий_S".to_string(),
                format!("глагол{}_VERB", (i * 7) % vocabulary),
                format!("глагол{}_VERB", (i * 13) % vocabulary),
            ])
        })
        .collect()
}

fn bench_vectors(c: &mut Criterion) {
    let store = generate_store(1000);
    let a = generate_vector(3);
    let b = generate_vector(4);
    let tokens = ["глагол1_VERB", "глагол2_VERB", "глагол3_VERB", "шептать_VERB"];

    let mut group = c.benchmark_group("vector");
    group.bench_function("cosine", |bencher| {
        bencher.iter(|| cosine(black_box(&a), black_box(&b)).unwrap())
    });
    group.bench_function("aggregate", |bencher| {
        bencher.iter(|| aggregate(&store, black_box(&tokens)).unwrap())
    });
    group.bench_function("nearest_neighbors", |bencher| {
        bencher.iter(|| store.nearest_neighbors(black_box("входить_VERB"), 10).unwrap())
    });
    group.finish();
}

fn bench_classifier(c: &mut Criterion) {
    let vocabulary = 5000;
    let store = Arc::new(generate_store(vocabulary));
    let classifier = RuleBasedClassifier::new(store, RuleClassifierConfig::default()).unwrap();
    let directions = generate_directions(2000, vocabulary);

    let mut group = c.benchmark_group("classifier");
    group.bench_function("predict_batch", |bencher| {
        bencher.iter(|| predict_batch(&classifier, black_box(&directions), DirectionLabel::Entrance))
    });
    group.bench_function("predict_batch_parallel", |bencher| {
        bencher.iter(|| {
            predict_batch_parallel(&classifier, black_box(&directions), DirectionLabel::Entrance)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_vectors, bench_classifier);
criterion_main!(benches);
