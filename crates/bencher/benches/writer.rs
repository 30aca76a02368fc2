use bencher::{TestBody, TestCase};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use micro_text::codec::EncodingCodec;
use micro_text::sink::BufferSink;
use micro_text::text::TextSink;
use micro_text::writer::PipeTextWriter;
use std::hint::black_box;

static SHORT_LINES: TestBody = TestBody::new(2, 4096, "\n");
static LONG_LINES: TestBody = TestBody::new(1050, 64, "\n");

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::short_lines("line_len_2", SHORT_LINES), TestCase::long_lines("line_len_1050", LONG_LINES)]
}

fn benchmark_write_line(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("write_line");

    for label in ["utf-8", "shift_jis"] {
        for case in create_test_cases() {
            let line = case.body().line();
            group.throughput(Throughput::Bytes(case.body().byte_len() as u64));
            group.bench_with_input(BenchmarkId::new(label, case.name()), &line, |b, line| {
                b.iter_batched(
                    || {
                        let codec = EncodingCodec::for_label(label).expect("label should be known");
                        PipeTextWriter::new(BufferSink::with_capacity(case.body().byte_len()), codec)
                            .expect("fresh sink is writable")
                    },
                    |mut writer| {
                        for _ in 0..case.body().line_count() {
                            writer.write_line(line).expect("buffer sink accepts every write");
                        }
                        writer.dispose();
                        black_box(writer.get_ref().as_bytes().len());
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

criterion_group!(writer, benchmark_write_line);
criterion_main!(writer);
