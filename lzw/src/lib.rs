//! LZW encoder for GIF image data.
//!
//! This crate compresses the palette indices of an image into the "table based image data" of
//! a GIF file: the minimum code size, followed by the LZW compressed indices packed in
//! sub-blocks of at most 255 bytes, and the block terminator. It uses variable code size,
//! from `min_code_size + 1` up to 12 bits, and clears its string table whenever every 12 bit
//! code has been assigned.
//!
//! Color quantization and the rest of the GIF file (header, color tables, image descriptors)
//! are left to the caller: the output is meant to be copied as is after an image descriptor.
//!
//! It works with any [std::io::Write], or straight into a [Vec<u8>].
//!
//! # Examples
//!
//! ```
//! use gif_lzw::encoder::{EncodingError, ImageDataEncoder};
//!
//! fn main() -> Result<(), EncodingError> {
//!     // A 2x2 image using 4 colors.
//!     let indices = [0, 0, 1, 3];
//!
//!     let encoded = ImageDataEncoder::new(2)?.encode_to_vec(&indices, 2, 2)?;
//!     assert_eq!(encoded, [0x02, 0x03, 0x04, 0x32, 0x05, 0x00]);
//!
//!     // Or with the shortcut.
//!     assert_eq!(gif_lzw::encode(&indices, 2, 2, 2)?, encoded);
//!
//!     Ok(())
//! }
//! ```

pub mod encoder;
mod io;
mod pixels;
mod table;

use encoder::{EncodingError, ImageDataEncoder};

/// Encodes the palette indices of a `width` x `height` image as GIF image data.
///
/// Shortcut for [ImageDataEncoder::new] followed by [ImageDataEncoder::encode_to_vec].
///
/// # Errors
///
/// Fails if the color depth is above 8, if `indices` doesn't hold exactly `width * height`
/// indices, or if an index doesn't fit in the color depth.
pub fn encode(
    indices: &[u8],
    width: u32,
    height: u32,
    color_depth: u32,
) -> Result<Vec<u8>, EncodingError> {
    ImageDataEncoder::new(color_depth)?.encode_to_vec(indices, width, height)
}
