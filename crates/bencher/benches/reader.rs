use bencher::{TestBody, TestCase};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use micro_text::codec::EncodingCodec;
use micro_text::reader::StreamTextReader;
use micro_text::text::TextSource;
use std::hint::black_box;

static SHORT_LINES: TestBody = TestBody::new(2, 4096, "\r\n");
static BUFFER_SIZED_LINES: TestBody = TestBody::new(1000, 64, "\n");
static OVERSIZED_LINES: TestBody = TestBody::new(1050, 64, "\r\n");

fn create_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::short_lines("line_len_2", SHORT_LINES),
        TestCase::long_lines("line_len_1000", BUFFER_SIZED_LINES),
        TestCase::long_lines("line_len_1050", OVERSIZED_LINES),
    ]
}

fn benchmark_read_line(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("read_line");

    for case in create_test_cases() {
        let content = case.body().content();
        group.throughput(Throughput::Bytes(case.body().byte_len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &content, |b, content| {
            b.iter_batched(
                || StreamTextReader::new(content.as_bytes(), EncodingCodec::utf8()).expect("slice source is readable"),
                |mut reader| {
                    while let Some(line) = reader.read_line().expect("reading from a slice can't fail") {
                        black_box(line);
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_read_into(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("read_into");

    for case in create_test_cases() {
        let content = case.body().content();
        group.throughput(Throughput::Bytes(case.body().byte_len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &content, |b, content| {
            let mut chars = vec!['\0'; 4096];
            b.iter_batched(
                || StreamTextReader::new(content.as_bytes(), EncodingCodec::utf8()).expect("slice source is readable"),
                |mut reader| {
                    while reader.read_into(&mut chars).expect("reading from a slice can't fail") > 0 {
                        black_box(&chars);
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(reader, benchmark_read_line, benchmark_read_into);
criterion_main!(reader);
