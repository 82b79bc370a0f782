use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jsc::compressor::CompressParams;
use jsc::{jsc_compress, jsc_decompress, ColorSpace};

fn gradient_gray(width: usize, height: usize) -> Vec<u8> {
    (0..width * height).map(|i| (i % 256) as u8).collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let width = 256;
    let height = 256;
    let pixels = gradient_gray(width, height);
    let params = CompressParams::default().with_quality(80);

    let mut compressed = Vec::with_capacity(width * height);
    jsc_compress(width, height, ColorSpace::Grayscale, &pixels, &params, &mut compressed).unwrap();

    c.bench_function("jsc_compress 256x256 grayscale q80", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(width * height);
            black_box(jsc_compress(width, height, ColorSpace::Grayscale, &pixels, &params, &mut out).unwrap());
        })
    });

    c.bench_function("jsc_decompress 256x256 grayscale q80", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(width * height);
            black_box(jsc_decompress(&compressed, &mut out).unwrap());
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
