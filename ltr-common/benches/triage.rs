//! Classification latency benchmarks.
//!
//! A triage call is a handful of substring scans over the description, so
//! single calls should stay in the low-microsecond range even for the full
//! rubric shipped with the repository.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ltr_common::{
    CrossBorder, DataUsage, Exposure, ExternalCommunication, RevenueModel, TriageEngine,
    TriageInput, load_rubric,
};
use std::hint::black_box;
use std::path::Path;

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("no_signal", "검색 결과에 정렬 옵션을 추가합니다. 가격순, 인기순 정렬."),
    ("critical", "사용자의 주민등록번호를 수집하여 본인인증에 사용합니다."),
    ("medical_ad", "오늘만 50% 할인! 보톡스 전후사진과 리얼후기를 공개합니다."),
    ("medium", "사용자가 병원에 대한 리뷰를 작성할 수 있는 기능 추가."),
];

fn engine() -> TriageEngine {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../rubric.yaml");
    TriageEngine::new(load_rubric(&path).expect("repository rubric must load"))
}

fn complete(description: &str) -> TriageInput {
    TriageInput::new(description)
        .with_exposure(Exposure::Public)
        .with_data_usage(DataUsage::NoCollection)
        .with_revenue_model(RevenueModel::Free)
        .with_external_communication(ExternalCommunication::Internal)
        .with_cross_border(CrossBorder::DomesticOnly)
}

fn bench_single(c: &mut Criterion) {
    let engine = engine();
    let mut group = c.benchmark_group("triage/single");
    for (name, description) in DESCRIPTIONS {
        let input = complete(description);
        group.bench_with_input(BenchmarkId::new("input", name), &input, |b, input| {
            b.iter(|| engine.triage(black_box(input)))
        });
    }
    group.finish();
}

fn bench_unknown_fields(c: &mut Criterion) {
    let engine = engine();
    let input = TriageInput::new("새로운 기능을 추가합니다.");
    c.bench_function("triage/unknown_fields", |b| {
        b.iter(|| engine.triage(black_box(&input)))
    });
}

fn bench_long_description(c: &mut Criterion) {
    let engine = engine();
    let input = complete(&DESCRIPTIONS[0].1.repeat(200));
    c.bench_function("triage/long_description", |b| {
        b.iter(|| engine.triage(black_box(&input)))
    });
}

criterion_group!(benches, bench_single, bench_unknown_fields, bench_long_description);
criterion_main!(benches);
