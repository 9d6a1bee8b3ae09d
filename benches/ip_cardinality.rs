use ip_cardinality::{count_unique, format_address, parse_line, AdaptiveCounter, Config, ExactSet};
use criterion::measurement::WallTime;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion, Throughput,
};
use pprof::criterion::{Output, PProfProfiler};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Insert and merge operations are benchmarked against cardinalities ranging from 0 to
/// `DEFAULT_MAX_CARDINALITY` or environment variable `N` (if defined) with cardinality
/// multiplied by 16 with every iteration.
const DEFAULT_MAX_CARDINALITY: usize = 1 << 20;
/// Number of lines in the synthetic input of the pipeline benchmark
const PIPELINE_LINES: usize = 1 << 20;

criterion_group! {
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Protobuf));
    targets = benchmark
}
criterion_main!(benches);

fn benchmark(c: &mut Criterion) {
    let max_cardinality = std::env::var("N")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CARDINALITY);

    let cardinalities: Vec<usize> = std::iter::once(0)
        .chain((0..).map(|c| 1 << (4 * c)))
        .take_while(|&c| c <= max_cardinality)
        .collect();

    bench_parse(c);

    let mut group = c.benchmark_group("insert");
    for &cardinality in &cardinalities {
        group.throughput(Throughput::Elements(cardinality.max(1) as u64));
        bench_insert(&mut group, "exact", cardinality, false);
        bench_insert(&mut group, "bitmap", cardinality, true);
    }
    group.finish();

    let mut group = c.benchmark_group("merge");
    for &cardinality in &cardinalities {
        group.throughput(Throughput::Elements(cardinality.max(1) as u64));
        bench_merge(&mut group, cardinality);
    }
    group.finish();

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    let input = random_input(PIPELINE_LINES);
    group.throughput(Throughput::Bytes(input.len() as u64));
    for workers in [1, 2, 4, 8] {
        let config = Config::default().with_worker_count(workers);
        group.bench_with_input(BenchmarkId::new("workers", workers), &input, |b, input| {
            b.iter(|| count_unique(black_box(input.as_bytes()), &config).unwrap().unique)
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(1));
    for line in ["192.168.1.1", "  10.0.0.1  ", "255.255.255.255", "not.an.ip"] {
        group.bench_with_input(BenchmarkId::from_parameter(line.trim()), line, |b, line| {
            b.iter(|| parse_line(black_box(line.as_bytes())))
        });
    }
    group.finish();
}

fn bench_insert(
    group: &mut BenchmarkGroup<WallTime>,
    name: &str,
    cardinality: usize,
    promoted: bool,
) {
    group.bench_with_input(
        BenchmarkId::new(name, cardinality),
        &cardinality,
        |b, &cardinality| {
            let mut counter = AdaptiveCounter::new(usize::MAX);
            if promoted {
                counter.promote();
            }
            b.iter(|| {
                for key in 0..black_box(cardinality as u32) {
                    counter.insert(black_box(key.wrapping_mul(2_654_435_761)));
                }
            });
        },
    );
}

fn bench_merge(group: &mut BenchmarkGroup<WallTime>, cardinality: usize) {
    let local: ExactSet = (0..cardinality as u32).collect();
    group.bench_with_input(
        BenchmarkId::new("exact", cardinality),
        &local,
        |b, local| {
            b.iter(|| {
                let mut counter = AdaptiveCounter::new(usize::MAX);
                counter.merge(black_box(local));
                counter.count()
            });
        },
    );
}

fn random_input(lines: usize) -> String {
    let mut rng = StdRng::seed_from_u64(12345);
    (0..lines)
        .map(|_| format!("{}\n", format_address(rng.gen())))
        .collect()
}
