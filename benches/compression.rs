use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stlz_rs::{compress_symbols, Compressor, Config, Decompressor, SliceSource, TokenDictionary};

/// Generate repetitive text data
fn generate_repetitive_text(size: usize) -> Vec<u8> {
    let pattern = b"the quick brown fox jumps over the lazy dog ";
    pattern.repeat(size / pattern.len())
}

/// Generate source code-like data
fn generate_source_code(size: usize) -> Vec<u8> {
    let patterns: [&[u8]; 7] = [
        b"fn main() {\n",
        b"    let x = 42;\n",
        b"    println!(\"Hello, world!\");\n",
        b"    if x > 0 {\n",
        b"        return x;\n",
        b"    }\n",
        b"}\n",
    ];

    let mut result = Vec::new();
    let mut i = 0;
    while result.len() < size {
        result.extend_from_slice(patterns[i % patterns.len()]);
        i += 1;
    }
    result.truncate(size);
    result
}

/// Generate low-repetition data (simulating base64)
fn generate_low_repetition(size: usize) -> Vec<u8> {
    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut seed = 12345u64;

    (0..size)
        .map(|_| {
            // Simple LCG random
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            chars[(seed % chars.len() as u64) as usize]
        })
        .collect()
}

fn compress(config: Config, data: &[u8]) -> Vec<u8> {
    let mut compressed: Vec<u8> = Vec::with_capacity(data.len());
    Compressor::<u8>::new(config)
        .compress(SliceSource::new(data), &mut compressed)
        .unwrap();
    compressed
}

fn bench_compress(c: &mut Criterion, name: &str, generate: fn(usize) -> Vec<u8>) {
    let sizes = [1_000, 10_000, 100_000];
    let mut group = c.benchmark_group(name);

    for size in sizes.iter() {
        let data = generate(*size);
        group.throughput(Throughput::Bytes(data.len() as u64));

        for bits in [8u8, 12, 17] {
            let config = Config::new(bits).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("window_bits_{}", bits), size),
                &data,
                |b, data| b.iter(|| black_box(compress(config, black_box(data)))),
            );
        }
    }

    group.finish();
}

fn bench_repetitive(c: &mut Criterion) {
    bench_compress(c, "repetitive_text", generate_repetitive_text);
}

fn bench_source_code(c: &mut Criterion) {
    bench_compress(c, "source_code", generate_source_code);
}

fn bench_low_repetition(c: &mut Criterion) {
    bench_compress(c, "low_repetition", generate_low_repetition);
}

fn bench_decompress(c: &mut Criterion) {
    let sizes = [1_000, 10_000, 100_000];
    let mut group = c.benchmark_group("decompress");
    let config = Config::default();

    for size in sizes.iter() {
        let data = generate_source_code(*size);
        let compressed = compress(config, &data);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::new("source_code", size), &compressed, |b, compressed| {
            b.iter(|| {
                let mut output: Vec<u8> = Vec::with_capacity(data.len());
                Decompressor::<u8>::new(config)
                    .decompress(black_box(&compressed[..]), &mut output)
                    .unwrap();
                black_box(output)
            });
        });
    }

    group.finish();
}

fn bench_text_mode(c: &mut Criterion) {
    let sizes = [10_000, 100_000];
    let mut group = c.benchmark_group("text_mode");
    let config = Config::new(12).unwrap();

    for size in sizes.iter() {
        let data = generate_source_code(*size);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(BenchmarkId::new("tokenize_and_compress", size), &data, |b, data| {
            b.iter(|| {
                let mut dictionary = TokenDictionary::new();
                let ids = dictionary.encode(black_box(data));
                black_box(compress_symbols(&ids, dictionary.alphabet_size(), &config).unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_repetitive,
    bench_source_code,
    bench_low_repetition,
    bench_decompress,
    bench_text_mode
);
criterion_main!(benches);
