//! Contains the GIF image data encoder and the LZW compressor driving it.

use std::{fmt::Display, io::Write};

use log::{debug, trace};

use crate::{
    io::{BitWriter, LittleEndianWriter, SubBlockWriter},
    pixels::PixelSource,
    table::{CodeTable, Probe, MAX_CODE_COUNT},
};

const MAX_CODE_SIZE: u8 = 12;
const MAX_COLOR_DEPTH: u32 = 8;
const MAX_DIMENSION: u32 = u16::MAX as u32;

/// The error type for encoding operations.
///
/// Encapsulate [std::io::Error] and expose invalid input or output limit issues.
#[derive(Debug)]
pub enum EncodingError {
    /// An I/O error happened when writing data.
    Io(std::io::Error),
    /// Color depth out of bounds. It should be 8 bits at most.
    ColorDepth(u32),
    /// The number of indices doesn't match the image dimensions.
    InputSizeMismatch { expected: usize, actual: usize },
    /// Width or height can't be stored in a GIF image descriptor.
    UnsupportedDimensions { width: u32, height: u32 },
    /// An index can't be represented with the minimum code size.
    ///
    /// For a minimum code size of 2 for example, indices should be between 0 and 3:
    /// 4 and 5 are the clear and end of information codes.
    UnexpectedIndex { index: u8, min_code_size: u8 },
    /// The encoded data would not fit in the configured output limit.
    OutputCapacityExceeded { limit: usize },
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingError::Io(error) => std::fmt::Display::fmt(&error, f),
            EncodingError::ColorDepth(depth) => f.write_fmt(format_args!(
                "Color depth must be {MAX_COLOR_DEPTH} bits at most, was {depth}.",
            )),
            EncodingError::InputSizeMismatch { expected, actual } => f.write_fmt(format_args!(
                "Expected {expected} indices for the image dimensions, got {actual}.",
            )),
            EncodingError::UnsupportedDimensions { width, height } => f.write_fmt(format_args!(
                "Unsupported image dimensions {width}x{height}, each side must be {MAX_DIMENSION} at most.",
            )),
            EncodingError::UnexpectedIndex {
                index,
                min_code_size,
            } => f.write_fmt(format_args!(
                "Unexpected index {index}. For minimum code size {min_code_size}, indices should be < {}.",
                (1 << min_code_size)
            )),
            EncodingError::OutputCapacityExceeded { limit } => f.write_fmt(format_args!(
                "Encoded data doesn't fit in the output limit of {limit} bytes.",
            )),
        }
    }
}

impl std::error::Error for EncodingError {}

impl From<std::io::Error> for EncodingError {
    fn from(error: std::io::Error) -> Self {
        EncodingError::Io(error)
    }
}

#[derive(Debug)]
enum State {
    /// Extending the match of `prefix` with the next pixel.
    Running { prefix: u16 },
    /// Out of pixels, the last pending code still needs writing, if any pixel was read.
    Flushing { prefix: Option<u16> },
    Done,
}

/// LZW compression of a single image, GIF flavored.
///
/// Owns all the state of one run: the string table, the current write size and the bit
/// writer. Code size grows from `min_code_size + 1` up to 12 bits. Once every 12 bit code is
/// assigned, the table is cleared and a clear code tells the decoder to do the same.
pub(crate) struct Compressor<B>
where
    B: BitWriter,
{
    bit_writer: B,
    table: CodeTable,
    initial_write_size: u8,
    write_size: u8,
    max_code: u16,
    clear_code: u16,
    end_of_information: u16,
    resets: usize,
}

impl<B> Compressor<B>
where
    B: BitWriter,
{
    pub fn new(min_code_size: u8, bit_writer: B) -> Self {
        let clear_code = 1 << min_code_size;
        let initial_write_size = min_code_size + 1;

        Self {
            bit_writer,
            table: CodeTable::new(clear_code),
            initial_write_size,
            write_size: initial_write_size,
            max_code: max_code(initial_write_size),
            clear_code,
            end_of_information: clear_code + 1,
            resets: 0,
        }
    }

    /// Compresses all the pixels, then gives back the bit writer, flushed.
    pub fn compress<I>(mut self, pixels: I) -> Result<(B, usize), EncodingError>
    where
        I: Iterator<Item = u8>,
    {
        let mut pixels = pixels;
        self.emit(self.clear_code)?;

        let mut state = match pixels.next() {
            Some(k) => State::Running { prefix: k as u16 },
            None => State::Flushing { prefix: None },
        };

        loop {
            state = match state {
                State::Running { prefix } => match pixels.next() {
                    Some(k) => State::Running {
                        prefix: self.step(prefix, k)?,
                    },
                    None => State::Flushing {
                        prefix: Some(prefix),
                    },
                },
                State::Flushing { prefix } => {
                    if let Some(prefix) = prefix {
                        self.emit(prefix)?;
                    }
                    self.emit(self.end_of_information)?;

                    self.bit_writer.fill()?;
                    self.bit_writer.flush()?;
                    State::Done
                }
                State::Done => break,
            }
        }

        Ok((self.bit_writer, self.resets))
    }

    /// Matches `prefix` followed by `k` against the table, returns the new prefix.
    #[inline(always)]
    fn step(&mut self, prefix: u16, k: u8) -> Result<u16, EncodingError> {
        match self.table.lookup(prefix, k) {
            Probe::Match(code) => return Ok(code),
            Probe::Vacant(slot) => {
                self.emit(prefix)?;
                if self.table.insert(slot).is_none() {
                    self.reset()?;
                }
            }
            Probe::Exhausted => {
                self.emit(prefix)?;
                self.reset()?;
            }
        }

        Ok(k as u16)
    }

    #[inline(always)]
    fn emit(&mut self, code: u16) -> Result<(), EncodingError> {
        self.bit_writer.write(code, self.write_size)?;

        // If the next entry is going to be too big for the write size, increase it.
        if self.table.next_code() > self.max_code && self.write_size < MAX_CODE_SIZE {
            self.write_size += 1;
            self.max_code = max_code(self.write_size);
        }

        Ok(())
    }

    fn reset(&mut self) -> Result<(), EncodingError> {
        trace!(
            "Code table full, writing clear code at {} bits",
            self.write_size
        );
        self.table.clear();
        self.bit_writer.write(self.clear_code, self.write_size)?;

        self.write_size = self.initial_write_size;
        self.max_code = max_code(self.write_size);
        self.resets += 1;

        Ok(())
    }
}

/// Highest code writable with `write_size` bits. At 12 bits, this is past the last code, so
/// the write size never grows any further.
const fn max_code(write_size: u8) -> u16 {
    if write_size == MAX_CODE_SIZE {
        MAX_CODE_COUNT
    } else {
        (1 << write_size) - 1
    }
}

/// Encoder of GIF table based image data.
///
/// Takes the palette indices of an image and outputs the minimum code size byte, followed by the
/// LZW compressed indices split in sub-blocks, and the block terminator. The output can be
/// copied verbatim after an image descriptor.
///
/// It holds configuration only: every call to [ImageDataEncoder::encode] uses its own
/// compression state, so a single encoder can be shared between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDataEncoder {
    min_code_size: u8,
    output_limit: Option<usize>,
}

impl ImageDataEncoder {
    /// Creates an encoder for images with the given color depth.
    ///
    /// # Arguments
    ///
    /// * `color_depth` - Number of significant bits per palette index, 8 at most.
    ///   GIF doesn't allow a minimum code size below 2, so depths 0 and 1 are raised to 2.
    ///
    /// # Errors
    ///
    /// Fails with [EncodingError::ColorDepth] if the color depth is above 8.
    ///
    /// # Examples
    ///
    /// ```
    /// use gif_lzw::encoder::ImageDataEncoder;
    ///
    /// let encoder = ImageDataEncoder::new(1).unwrap();
    /// assert_eq!(encoder.min_code_size(), 2);
    /// ```
    pub fn new(color_depth: u32) -> Result<Self, EncodingError> {
        if color_depth > MAX_COLOR_DEPTH {
            return Err(EncodingError::ColorDepth(color_depth));
        }

        Ok(Self {
            min_code_size: color_depth.max(2) as u8,
            output_limit: None,
        })
    }

    /// Caps the number of bytes a single encoding can output, including the minimum code size
    /// and the terminator. Going over fails with [EncodingError::OutputCapacityExceeded].
    pub fn with_output_limit(self, limit: usize) -> Self {
        Self {
            output_limit: Some(limit),
            ..self
        }
    }

    /// The minimum code size, written as the first byte of the output.
    pub fn min_code_size(&self) -> u8 {
        self.min_code_size
    }

    /// Encodes the indices of a `width` x `height` image.
    ///
    /// # Arguments
    ///
    /// * `indices` - The palette indices, row by row. There must be exactly `width * height`.
    /// * `width` - Width of the image, 65535 at most.
    /// * `height` - Height of the image, 65535 at most.
    /// * `into` - The output where the image data should be written.
    ///
    /// # Errors
    ///
    /// The input is checked before anything is written. Writing can then only fail on an
    /// [std::io::Error], or if the output limit is reached.
    ///
    /// # Examples
    ///
    /// ```
    /// use gif_lzw::encoder::{EncodingError, ImageDataEncoder};
    ///
    /// fn main() -> Result<(), EncodingError> {
    ///     let indices = [0, 0, 1, 3];
    ///     let mut output = vec![];
    ///
    ///     ImageDataEncoder::new(2)?.encode(&indices, 2, 2, &mut output)?;
    ///
    ///     assert_eq!(output, [0x02, 0x03, 0x04, 0x32, 0x05, 0x00]);
    ///     Ok(())
    /// }
    /// ```
    pub fn encode<W: Write>(
        &self,
        indices: &[u8],
        width: u32,
        height: u32,
        into: W,
    ) -> Result<(), EncodingError> {
        self.validate(indices, width, height)?;

        let pixels = PixelSource::new(indices);
        let pixel_count = pixels.len();

        let mut blocks = SubBlockWriter::new(into, self.output_limit);
        blocks.write_byte(self.min_code_size)?;

        let compressor = Compressor::new(self.min_code_size, LittleEndianWriter::new(blocks));
        let (bit_writer, resets) = compressor.compress(pixels)?;

        let mut blocks = bit_writer.into_inner();
        blocks.write_byte(0)?;
        let written = blocks.finish()?;

        debug!(
            "Encoded {width}x{height} image ({pixel_count} pixels) into {written} bytes, {resets} table resets"
        );

        Ok(())
    }

    /// Encodes the indices of a `width` x `height` image.
    /// Convenient wrapper that creates a [Vec<u8>] under the hood.
    ///
    /// # Errors
    ///
    /// Same as [ImageDataEncoder::encode].
    ///
    /// # Examples
    ///
    /// ```
    /// use gif_lzw::encoder::{EncodingError, ImageDataEncoder};
    ///
    /// fn main() -> Result<(), EncodingError> {
    ///     let output = ImageDataEncoder::new(2)?.encode_to_vec(&[], 0, 0)?;
    ///
    ///     assert_eq!(output, [0x02, 0x01, 0x2C, 0x00]);
    ///     Ok(())
    /// }
    /// ```
    pub fn encode_to_vec(
        &self,
        indices: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, EncodingError> {
        let mut output = Vec::with_capacity(indices.len() / 2 + 16);
        self.encode(indices, width, height, &mut output)?;
        Ok(output)
    }

    fn validate(&self, indices: &[u8], width: u32, height: u32) -> Result<(), EncodingError> {
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(EncodingError::UnsupportedDimensions { width, height });
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or(EncodingError::UnsupportedDimensions { width, height })?;
        if indices.len() != expected {
            return Err(EncodingError::InputSizeMismatch {
                expected,
                actual: indices.len(),
            });
        }

        let clear_code = 1u16 << self.min_code_size;
        if let Some(&index) = indices.iter().find(|&&index| index as u16 >= clear_code) {
            return Err(EncodingError::UnexpectedIndex {
                index,
                min_code_size: self.min_code_size,
            });
        }

        Ok(())
    }
}
