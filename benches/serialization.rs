use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dx_codec::{
    deserialize_machine, from_binary, from_dense, from_human, serialize_machine, to_binary,
    to_dense, to_human, validate, DxDocument, DxSection, DxValue,
};

fn products(size: usize) -> DxDocument {
    let mut doc = DxDocument::new();
    doc.context.insert("nm".to_string(), DxValue::from("Inventory"));
    doc.context.insert("vr".to_string(), DxValue::from(3));
    doc.refs.insert("A".to_string(), "Acme Corp".to_string());

    let mut section = DxSection::with_columns("products", &["id", "nm", "pr", "cmp"]).unwrap();
    for i in 0..size {
        section
            .push_row(vec![
                DxValue::from(i as i64),
                DxValue::from(format!("Product {}", i)),
                DxValue::from(9.99 + i as f64),
                DxValue::Ref("A".to_string()),
            ])
            .unwrap();
    }
    doc.insert_section(section);
    doc
}

fn benchmark_dense_simple(c: &mut Criterion) {
    let text = "nm=Test\nv=1.0\nac=true\ntags=[rust llm]";
    let doc = from_dense(text).unwrap();

    c.bench_function("parse_dense_simple", |b| {
        b.iter(|| from_dense(black_box(text)))
    });
    c.bench_function("write_dense_simple", |b| b.iter(|| to_dense(black_box(&doc))));
}

fn benchmark_dense_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_table");

    for size in [10, 50, 100, 500].iter() {
        let doc = products(*size);
        let text = to_dense(&doc).unwrap();

        group.bench_with_input(BenchmarkId::new("parse", size), size, |b, _| {
            b.iter(|| from_dense(black_box(&text)))
        });
        group.bench_with_input(BenchmarkId::new("write", size), size, |b, _| {
            b.iter(|| to_dense(black_box(&doc)))
        });
    }

    group.finish();
}

fn benchmark_human(c: &mut Criterion) {
    let mut group = c.benchmark_group("human");

    for size in [10, 100].iter() {
        let doc = products(*size);
        let text = to_human(&doc).unwrap();

        group.bench_with_input(BenchmarkId::new("format", size), size, |b, _| {
            b.iter(|| to_human(black_box(&doc)))
        });
        group.bench_with_input(BenchmarkId::new("parse", size), size, |b, _| {
            b.iter(|| from_human(black_box(&text)))
        });
    }

    group.finish();
}

fn benchmark_machine_formats(c: &mut Criterion) {
    let doc = products(100);
    let mut group = c.benchmark_group("machine");

    let json = serialize_machine(&doc).unwrap();
    let bytes = to_binary(&doc).unwrap();

    group.bench_function("json_encode", |b| {
        b.iter(|| serialize_machine(black_box(&doc)))
    });
    group.bench_function("json_decode", |b| {
        b.iter(|| deserialize_machine(black_box(&json)))
    });
    group.bench_function("binary_encode", |b| b.iter(|| to_binary(black_box(&doc))));
    group.bench_function("binary_decode", |b| {
        b.iter(|| from_binary(black_box(&bytes)))
    });

    group.finish();
}

fn benchmark_validate(c: &mut Criterion) {
    let text = to_dense(&products(100)).unwrap();

    c.bench_function("validate_dense_table", |b| {
        b.iter(|| validate(black_box(&text)))
    });
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let doc = products(10);

    c.bench_function("roundtrip_dense", |b| {
        b.iter(|| {
            let text = to_dense(black_box(&doc)).unwrap();
            let _back = from_dense(black_box(&text)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_dense_simple,
    benchmark_dense_table,
    benchmark_human,
    benchmark_machine_formats,
    benchmark_validate,
    benchmark_roundtrip
);
criterion_main!(benches);
