use anyhow::{ensure, Result};
use gif_lzw::encoder::ImageDataEncoder;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 200;

fn main() -> Result<()> {
    env_logger::init();

    // Diagonal stripes over a 16 colors palette.
    let indices: Vec<u8> = (0..HEIGHT)
        .flat_map(|y| (0..WIDTH).map(move |x| ((x + y) / 10 % 16) as u8))
        .collect();

    let encoder = ImageDataEncoder::new(4)?;
    let encoded = encoder.encode_to_vec(&indices, WIDTH, HEIGHT)?;

    println!(
        "{} indices encoded into {} bytes",
        indices.len(),
        encoded.len()
    );

    // Drop the minimum code size and the sub-block framing before decoding.
    let mut data = vec![];
    let mut position = 1;
    while encoded[position] != 0 {
        let len = encoded[position] as usize;
        data.extend_from_slice(&encoded[position + 1..position + 1 + len]);
        position += len + 1;
    }

    let mut decoder = weezl::decode::Decoder::new(weezl::BitOrder::Lsb, encoded[0]);
    let decoded = decoder.decode(&data)?;

    ensure!(decoded == indices, "Decoded indices differ from the image");

    Ok(())
}
