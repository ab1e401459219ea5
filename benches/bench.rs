use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use earnings_client::parser::LineKind;

use crate::{
    analysis::{network_reads, per_record, run_decoder, run_stream},
    consts::{EVENT_LINE, STATUS_DATA_LINE, generate_analysis},
};

pub(crate) mod consts;

/// Line classification on its own
fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let lines: &[(&str, &str)] = &[
        ("event_line", EVENT_LINE),
        ("data_line", STATUS_DATA_LINE),
        ("comment", ": keepalive"),
        ("empty_line", ""),
        ("no_space", "data:{}"),
    ];

    for &(name, line) in lines {
        group.bench_with_input(BenchmarkId::new("classify", name), line, |b, input| {
            b.iter(|| {
                let _ = black_box(LineKind::classify(black_box(input)));
            });
        });
    }

    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let chatty = generate_analysis(256, 1);
    let big_result = generate_analysis(4, 512);

    let chatty_reads = network_reads(&chatty);
    let big_result_reads = network_reads(&big_result);
    let chatty_records = per_record(&chatty);
    let big_result_records = per_record(&big_result);

    let mut group = c.benchmark_group("analysis");

    for (name, chunking, chunks) in [
        ("chatty", "network_reads", &chatty_reads),
        ("big_result", "network_reads", &big_result_reads),
        ("chatty", "per_record", &chatty_records),
        ("big_result", "per_record", &big_result_records),
    ] {
        let name = format!("{name}_{chunking}");
        group.bench_with_input(BenchmarkId::new("decoder", &name), chunks, |b, chunks| {
            b.iter(|| run_decoder(chunks));
        });

        group.bench_with_input(BenchmarkId::new("stream", &name), chunks, |b, chunks| {
            b.iter(|| run_stream(chunks));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_analysis);
criterion_main!(benches);
