#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 1024;

#[test]
fn encode_image_gif_lzw() {
    let indices: Vec<u8> = (0..WIDTH * HEIGHT)
        .map(|i| ((i % WIDTH) / 8 + (i / WIDTH) / 16) as u8 % 128)
        .collect();

    let _profiler = dhat::Profiler::builder().testing().build();

    let start_stats = dhat::HeapStats::get();

    let encoder = gif_lzw::encoder::ImageDataEncoder::new(7).unwrap();
    encoder
        .encode(&indices, WIDTH, HEIGHT, std::io::sink())
        .unwrap();

    let stats = dhat::HeapStats::get();

    println!("{start_stats:?}");
    println!("{stats:?}");

    // Writing to a sink, the string table is the only sizable allocation.
    dhat::assert!(stats.total_blocks - start_stats.total_blocks <= 2);
    dhat::assert!(stats.max_bytes - start_stats.curr_bytes < 128 * 1024);
}
