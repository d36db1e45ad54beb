use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::sync::Arc;

use tableview::data::record::Record;
use tableview::data::table_view::TableView;

fn create_records(count: usize) -> Vec<Record> {
    let cities = [
        "Bamako", "Segou", "Mopti", "Sikasso", "Kayes", "Gao", "Koulikoro", "Tombouctou",
    ];
    let projects = ["Alpha", "Beta", "Gamma", "Delta"];

    (0..count)
        .map(|i| {
            Record::new(
                format!("r{i}"),
                json!({
                    "name": format!("Beneficiary {i:05}"),
                    "age": (i % 70) as i64,
                    "city": cities[i % cities.len()],
                    "project": {"name": projects[i % projects.len()]},
                    "tags": [format!("tag{}", i % 13), format!("tag{}", i % 7)],
                }),
            )
        })
        .collect()
}

fn benchmark_filter_and_search(c: &mut Criterion) {
    let records_10k = Arc::new(create_records(10_000));
    let records_50k = Arc::new(create_records(50_000));

    let mut group = c.benchmark_group("filter_search");

    group.bench_function("10k_rows", |b| {
        b.iter(|| {
            let mut view = TableView::new(Arc::clone(&records_10k), "name");
            view.set_filter("project.name", black_box("Alpha"));
            view.set_search(black_box("001"));
            assert!(view.filtered_count() > 0);
        });
    });

    group.bench_function("50k_rows", |b| {
        b.iter(|| {
            let mut view = TableView::new(Arc::clone(&records_50k), "name");
            view.set_filter("project.name", black_box("Alpha"));
            view.set_search(black_box("001"));
            assert!(view.filtered_count() > 0);
        });
    });

    group.finish();
}

fn benchmark_sort(c: &mut Criterion) {
    let records_10k = Arc::new(create_records(10_000));

    let mut group = c.benchmark_group("sort");

    group.bench_function("10k_rows_by_age", |b| {
        b.iter(|| {
            let mut view = TableView::new(Arc::clone(&records_10k), "name");
            view.toggle_sort(black_box("age"));
            assert_eq!(view.filtered_count(), 10_000);
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_filter_and_search, benchmark_sort);
criterion_main!(benches);
