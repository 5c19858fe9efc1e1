//! Pipeline benchmark: raw record → validate → encode → predict → decide.

use churn_scorer::features::{FeatureLayout, ENCODER_VERSION};
use churn_scorer::model::{ClassifierSpec, LogisticClassifier, ModelManifest};
use churn_scorer::{validate, ChurnScorer, FeatureDeriver, ModelArtifact, RawRecord, ServiceConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::sync::Arc;

fn make_records(n: usize) -> Vec<RawRecord> {
    let geographies = ["France", "Germany", "Spain"];
    (0..n)
        .map(|i| {
            RawRecord(json!({
                "credit_score": 350 + (i * 7) % 500,
                "geography": geographies[i % 3],
                "gender": if i % 2 == 0 { "Female" } else { "Male" },
                "age": 18 + i % 70,
                "tenure": i % 11,
                "balance": if i % 4 == 0 { 0.0 } else { (i * 1237) as f64 % 250000.0 },
                "num_of_products": 1 + i % 4,
                "has_credit_card": i % 2,
                "is_active_member": (i / 2) % 2,
                "estimated_salary": 20000.0 + (i * 311) as f64 % 150000.0,
                "customer_id": 15600000 + i
            }))
        })
        .collect()
}

fn scorer(parallel: bool) -> ChurnScorer {
    let layout = FeatureLayout::current();
    let coefficients: Vec<f64> = (0..layout.len()).map(|i| (i as f64 - 8.0) * 0.01).collect();
    let manifest = ModelManifest {
        model_id: "bench".to_string(),
        encoder_version: ENCODER_VERSION.to_string(),
        feature_names: layout.names().to_vec(),
        numeric_scaling: None,
        positive_class_rate: None,
        classifier: ClassifierSpec::Logistic {
            coefficients: coefficients.clone(),
            intercept: -1.2,
        },
    };
    let classifier = LogisticClassifier::new(coefficients, -1.2).unwrap();
    let artifact = ModelArtifact::from_parts(manifest, Arc::new(classifier)).unwrap();
    let mut config = ServiceConfig::default();
    config.batch.parallel = parallel;
    ChurnScorer::new(artifact, &config).unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let deriver = FeatureDeriver::new();
    let record = make_records(1).remove(0);

    c.bench_function("validate_and_encode", |b| {
        b.iter(|| {
            let validated = validate(black_box(&record)).unwrap();
            black_box(deriver.derive(&validated).unwrap())
        })
    });
}

fn bench_score_batch(c: &mut Criterion) {
    let records = make_records(1000);
    let sequential = scorer(false);
    let parallel = scorer(true);

    let mut g = c.benchmark_group("score_batch_1000");
    g.bench_function("sequential", |b| {
        b.iter(|| black_box(sequential.score_batch(&records, None).unwrap()))
    });
    g.bench_function("rayon", |b| {
        b.iter(|| black_box(parallel.score_batch(&records, None).unwrap()))
    });
    g.finish();
}

criterion_group!(benches, bench_encode, bench_score_batch);
criterion_main!(benches);
