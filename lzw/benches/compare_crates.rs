use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{prelude::StdRng, Rng, RngCore, SeedableRng};

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 1024;

// The other crates only output the raw LZW stream, without the GIF sub-blocks.
fn compare_encoding(c: &mut Criterion, name: &str, data: &[u8], color_depth: u8) {
    let mut group = c.benchmark_group(name);
    group.bench_function("lzw", |b| {
        b.iter(|| {
            let mut encoder =
                lzw::Encoder::new(lzw::LsbWriter::new(std::io::sink()), black_box(color_depth))
                    .unwrap();
            encoder.encode_bytes(data).unwrap();
        })
    });
    group.bench_function("weezl", |b| {
        b.iter(|| {
            let mut encoder =
                weezl::encode::Encoder::new(weezl::BitOrder::Lsb, black_box(color_depth));
            let mut stream_encoder = encoder.into_stream(std::io::sink());
            stream_encoder.encode(data).status.unwrap();
        })
    });
    group.bench_function("gif-lzw", |b| {
        let encoder = gif_lzw::encoder::ImageDataEncoder::new(color_depth as u32).unwrap();
        b.iter(|| {
            encoder
                .encode(black_box(data), WIDTH, HEIGHT, std::io::sink())
                .unwrap();
        })
    });
    group.finish();
}

pub fn encoding_random_data(c: &mut Criterion) {
    let data = prepare_random_data();

    compare_encoding(c, "encoding random data", &data, 8);
}

pub fn encoding_image_data(c: &mut Criterion) {
    let data = prepare_image_data();

    compare_encoding(c, "encoding image data", &data, 7);
}

pub fn encoding_uniform_data(c: &mut Criterion) {
    let data = vec![3; (WIDTH * HEIGHT) as usize];

    compare_encoding(c, "encoding uniform data", &data, 2);
}

fn prepare_random_data() -> Vec<u8> {
    let mut rand = StdRng::seed_from_u64(42);
    let mut data: Vec<u8> = vec![0; (WIDTH * HEIGHT) as usize];
    rand.fill_bytes(&mut data[..]);

    data
}

/// Prepares a vec of values in 0..128 looking like a quantized picture: smooth bands of color
/// with some dithering noise.
fn prepare_image_data() -> Vec<u8> {
    let mut rand = StdRng::seed_from_u64(42);
    (0..HEIGHT)
        .flat_map(|y| (0..WIDTH).map(move |x| (x, y)))
        .map(|(x, y)| {
            let band = (x / 16 + y / 32) % 120;
            (band + rand.gen_range(0..8)) as u8
        })
        .collect()
}

criterion_group!(
    benches,
    encoding_random_data,
    encoding_image_data,
    encoding_uniform_data
);
criterion_main!(benches);
