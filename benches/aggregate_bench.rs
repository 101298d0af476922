use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use salesq::core::ops::{aggregate, pivot, top_n, RankBy};
use salesq::core::{load_bytes, Field, LoadOptions, Metric, Table};
use salesq::render::{summary_view, DashboardOptions, SvgRenderer};
use std::hint::black_box;

const REGIONS: [&str; 4] = ["West", "East", "Central", "South"];
const CATEGORIES: [&str; 3] = ["Furniture", "Office Supplies", "Technology"];
const SEGMENTS: [&str; 3] = ["Consumer", "Corporate", "Home Office"];

// Generate a sales CSV with `rows` orders spread over four years
fn generate_sales_csv(rows: usize) -> String {
    let mut data = String::from(
        "Row ID,Order Date,Ship Date,Ship Mode,Customer Name,Segment,State,Region,Category,Sub-Category,Product Name,Sales\n",
    );
    for i in 0..rows {
        let day = i % 28 + 1;
        let month = i % 12 + 1;
        let year = 2015 + i % 4;
        data.push_str(&format!(
            "{},{:02}/{:02}/{},{:02}/{:02}/{},Standard Class,Customer {},{},State {},{},{},Sub {},Product {},{:.2}\n",
            i + 1,
            day,
            month,
            year,
            day,
            month,
            year,
            i % 800,
            SEGMENTS[i % 3],
            i % 49,
            REGIONS[i % 4],
            CATEGORIES[i % 3],
            i % 17,
            i % 1800,
            (i % 997) as f64 * 1.37 + 0.5
        ));
    }
    data
}

fn table(rows: usize) -> Table {
    load_bytes(generate_sales_csv(rows), &LoadOptions::default()).unwrap()
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for size in [1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        let csv = generate_sales_csv(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &csv, |b, csv| {
            b.iter(|| load_bytes(black_box(csv.as_bytes().to_vec()), &LoadOptions::default()));
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for size in [1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        let t = table(size);

        group.bench_with_input(BenchmarkId::new("region", size), &t, |b, t| {
            b.iter(|| aggregate(black_box(t), &[Field::Region], Metric::Sales));
        });
        group.bench_with_input(BenchmarkId::new("year_month", size), &t, |b, t| {
            b.iter(|| aggregate(black_box(t), &[Field::Year, Field::Month], Metric::Sales));
        });
        group.bench_with_input(BenchmarkId::new("top_products", size), &t, |b, t| {
            b.iter(|| {
                let products = aggregate(black_box(t), &[Field::ProductName], Metric::Sales);
                top_n(&products, 10, RankBy::Sum)
            });
        });
        group.bench_with_input(BenchmarkId::new("pivot", size), &t, |b, t| {
            b.iter(|| pivot(black_box(t), Field::Region, Field::Category, Metric::Sales));
        });
    }

    group.finish();
}

fn bench_summary_view(c: &mut Criterion) {
    let t = table(10_000);
    let renderer = SvgRenderer::default();
    c.bench_function("summary_view", |b| {
        b.iter(|| summary_view(black_box(&t), &DashboardOptions::default(), &renderer));
    });
}

criterion_group!(benches, bench_load, bench_aggregate, bench_summary_view);
criterion_main!(benches);
