use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fuzzrun::engine::project::resolve_project;
use fuzzrun::engine::reconciler::collapse;
use fuzzrun::engine::severity_filter::filter_by_severity;
use fuzzrun::engine_core::models::RemoteFinding;
use fuzzrun::engine_core::severity::{SeverityLevel, SeverityTable};

fn sample_reports(count: usize) -> Vec<RemoteFinding> {
    (0..count)
        .map(|i| RemoteFinding {
            display_name: format!("finding_{}", i % 50),
            nid: format!("fdn-{}", i),
            error_id: if i % 3 == 0 {
                "heap_buffer_overflow".to_string()
            } else {
                "memory_leak".to_string()
            },
            timestamp: format!("2024-05-01T{:02}:{:02}:00Z", (i / 60) % 24, i % 60),
            ..Default::default()
        })
        .collect()
}

fn bench_resolve_project(c: &mut Criterion) {
    c.bench_function("resolve_project_legacy", |b| {
        b.iter(|| {
            let _ = resolve_project(black_box("projects/test-73d94c96"));
        })
    });

    c.bench_function("resolve_project_nid", |b| {
        b.iter(|| {
            let _ = resolve_project(black_box("prj-ow6h1UIwHXTr"));
        })
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let reports = sample_reports(1_000);
    let table = SeverityTable::builtin();

    c.bench_function("collapse_1000_reports", |b| {
        b.iter(|| {
            let _ = collapse(black_box(reports.clone()));
        })
    });

    c.bench_function("collapse_and_filter_high", |b| {
        b.iter(|| {
            let collapsed = collapse(black_box(reports.clone()));
            let _ = filter_by_severity(collapsed, Some(SeverityLevel::High), &table);
        })
    });
}

criterion_group!(benches, bench_resolve_project, bench_reconcile);
criterion_main!(benches);
