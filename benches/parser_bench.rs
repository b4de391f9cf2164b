use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;
use stream_capitalizer::*;
use tokio::runtime::Runtime;

fn create_large_json(count: usize) -> Vec<u8> {
    let mut data = b"{\"items\": [".to_vec();
    for i in 0..count {
        if i > 0 {
            data.push(b',');
        }
        data.extend(
            format!(r#"{{"id":{},"value":"Value {} é","ok":true}}"#, i, i).as_bytes(),
        );
    }
    data.extend(b"]}");
    data
}

fn parse_chunked(data: &[u8], chunk_size: usize) -> usize {
    let mut parser = IncrementalParser::new();
    let mut events = 0;
    for chunk in data.chunks(chunk_size) {
        for event in parser.feed(chunk) {
            event.expect("benchmark input is valid");
            events += 1;
        }
    }
    events + parser.finish().expect("benchmark input is valid").len()
}

fn parser_chunk_size_benchmark(c: &mut Criterion) {
    let data = create_large_json(1000);
    let mut group = c.benchmark_group("incremental_parser");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for chunk_size in [1, 8, 64, 640, 4096].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            chunk_size,
            |b, &chunk_size| b.iter(|| parse_chunked(&data, chunk_size)),
        );
    }

    group.finish();
}

fn pipeline_benchmark(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("emit_pipeline");
    group.sample_size(10);

    for count in [100, 1000, 10_000].iter() {
        let data = create_large_json(*count);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, data| {
            let pipeline =
                EmitPipeline::new(PipelineConfig::new(64, Duration::ZERO), TokenTransformer::uppercase())
                    .unwrap();
            b.iter(|| {
                rt.block_on(async {
                    let report = pipeline
                        .run(&data[..], tokio::io::sink(), tokio::io::sink())
                        .await
                        .unwrap();
                    assert_eq!(report.tokens_emitted, 1 + count * 4);
                })
            });
        });
    }

    group.finish();
}

criterion_group!(benches, parser_chunk_size_benchmark, pipeline_benchmark);
criterion_main!(benches);
