//! Record-parser throughput over a large synthetic table.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pricelist_core::{ExtractionOptions, Provenance, RawTable};
use pricelist_parse::RecordParser;

fn synthetic_table(rows: usize) -> RawTable {
    let mut grid = vec![vec![
        "SKU".to_string(),
        "Description".to_string(),
        "Price".to_string(),
    ]];
    for i in 0..rows {
        grid.push(vec![
            format!("A{i:05}"),
            format!("Boneless Cut {i}"),
            format!("${}.{:02}", 3 + i % 40, i % 100),
        ]);
    }
    RawTable::new(grid, Provenance::TextLayer, 0)
}

fn bench_parse(c: &mut Criterion) {
    let parser = RecordParser::new(ExtractionOptions::default());
    let table = synthetic_table(500);

    c.bench_function("parse_500_rows", |b| {
        b.iter(|| parser.parse_table(black_box(&table)));
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
