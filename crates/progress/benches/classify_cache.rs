//! crates/progress/benches/classify_cache.rs
//!
//! Benchmarks for fragment classification with and without shape memoisation.
//!
//! Run with: `cargo bench -p progress`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use progress::{LineClassifier, Session, SessionConfig, is_stats_shape};
use test_support::Transcript;

/// A transcript where most readings repeat, as on fast local copies.
fn repetitive_transcript(files: usize) -> Vec<String> {
    let mut transcript = Transcript::new().marker().root("bench");
    for index in 0..files {
        transcript = transcript.path(&format!("bench/file-{index}.bin"));
        for _ in 0..8 {
            transcript = transcript.progress(32_768, 0, 0.0, 0);
        }
        transcript = transcript.completed(1_048_576, 1_048_576.0, 1, files - index - 1, files);
    }
    transcript.into_fragments()
}

fn bench_shape_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape_test");
    let fragment = "    600,417,190  11%  100.56MB/s    0:00:05\r";

    group.bench_function("uncached", |b| {
        b.iter(|| is_stats_shape(black_box(fragment)));
    });
    group.bench_function("classifier", |b| {
        let mut classifier = LineClassifier::new("/bench");
        b.iter(|| classifier.classify(black_box(fragment)));
    });

    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    for files in [16, 256, 1024] {
        let fragments = repetitive_transcript(files);
        group.throughput(Throughput::Elements(fragments.len() as u64));
        group.bench_with_input(BenchmarkId::new("process", files), &fragments, |b, fragments| {
            b.iter(|| {
                let mut session = Session::new("/bench", SessionConfig::default());
                for fragment in fragments {
                    let _ = black_box(session.process(fragment));
                }
                session.last_snapshot().map(|snapshot| snapshot.total_transferred())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shape_test, bench_session);
criterion_main!(benches);
