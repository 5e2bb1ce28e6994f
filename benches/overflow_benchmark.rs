//! Performance benchmarks for the recipient field
//!
//! Measures typing with chip commits and collapse/expand cycles for
//! different recipient counts.
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use recipient_chips::adapters::Rfc822Tokenizer;
use recipient_chips::config::FieldConfig;
use recipient_chips::traits::ChipResources;
use recipient_chips::widgets::RecipientField;

/// Generate `count` comma separated addresses
fn generate_addresses(count: usize) -> String {
    (0..count)
        .map(|i| format!("user{}@example.com, ", i))
        .collect()
}

fn focused_field() -> RecipientField {
    let mut field = RecipientField::new(Rfc822Tokenizer::new(), FieldConfig::default())
        .expect("valid config")
        .with_validator(|address: &str| address.contains('@'))
        .with_chip_resources(ChipResources::default());
    field.on_size_changed(300, 20).expect("size");
    field.on_focus_changed(true).expect("focus");
    field
}

/// Benchmark typing addresses one character at a time
fn bench_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("typing");

    for count in [1, 10, 50].iter() {
        let text = generate_addresses(*count);
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_recipients", count)),
            &text,
            |b, text| {
                b.iter(|| {
                    let mut field = focused_field();
                    let mut buf = [0; 4];
                    for c in text.chars() {
                        field.insert_text(c.encode_utf8(&mut buf)).expect("insert");
                    }
                    black_box(field.chips().len())
                });
            },
        );
    }

    group.finish();
}

/// Benchmark one blur/focus cycle over a populated field
fn bench_collapse_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("collapse_expand");

    for count in [5, 25, 50].iter() {
        let mut field = focused_field();
        field.paste_recipients(&generate_addresses(*count)).expect("paste");
        group.throughput(Throughput::Elements(*count as u64));

        group.bench_function(BenchmarkId::from_parameter(format!("{}_recipients", count)), |b| {
            b.iter(|| {
                field.on_focus_changed(false).expect("blur");
                field.on_focus_changed(true).expect("focus");
                black_box(field.chips().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_typing, bench_collapse_expand);

criterion_main!(benches);
