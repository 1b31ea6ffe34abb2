use std::io::Write;

use log::trace;

use crate::encoder::EncodingError;

/// Payload size at which a sub-block is written out.
pub(crate) const SUB_BLOCK_SIZE: usize = 254;

/// Groups bytes into length prefixed GIF sub-blocks.
///
/// Also keeps count of every byte handed to the underlying [Write], so an optional output limit
/// can be enforced before anything past it gets written.
pub(crate) struct SubBlockWriter<W>
where
    W: Write,
{
    write: W,
    packet: [u8; SUB_BLOCK_SIZE],
    len: usize,
    written: usize,
    limit: Option<usize>,
}

impl<W> SubBlockWriter<W>
where
    W: Write,
{
    pub fn new(write: W, limit: Option<usize>) -> Self {
        let packet = [0; SUB_BLOCK_SIZE];
        Self {
            write,
            packet,
            len: 0,
            written: 0,
            limit,
        }
    }

    /// Writes a byte outside of any sub-block, such as the minimum code size or the terminator.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), EncodingError> {
        self.reserve(1)?;
        self.write.write_all(&[byte])?;
        Ok(())
    }

    #[inline]
    pub fn push(&mut self, byte: u8) -> Result<(), EncodingError> {
        self.packet[self.len] = byte;
        self.len += 1;

        if self.len >= SUB_BLOCK_SIZE {
            self.flush_packet()?;
        }

        Ok(())
    }

    /// Writes the pending bytes as one sub-block. Nothing is written when no byte is pending.
    pub fn flush_packet(&mut self) -> Result<(), EncodingError> {
        if self.len == 0 {
            return Ok(());
        }

        let len = self.len;
        self.reserve(len + 1)?;
        trace!("Writing sub-block of {len} bytes");

        self.write.write_all(&[len as u8])?;
        self.write.write_all(&self.packet[..len])?;
        self.len = 0;

        Ok(())
    }

    pub fn finish(mut self) -> Result<usize, EncodingError> {
        self.write.flush()?;
        Ok(self.written)
    }

    fn reserve(&mut self, amount: usize) -> Result<(), EncodingError> {
        if let Some(limit) = self.limit {
            if self.written + amount > limit {
                return Err(EncodingError::OutputCapacityExceeded { limit });
            }
        }
        self.written += amount;
        Ok(())
    }
}

pub(crate) trait BitWriter {
    fn write(&mut self, data: u16, amount: u8) -> Result<(), EncodingError>;

    /// Pads the pending bits with zeros up to a whole byte and writes it.
    fn fill(&mut self) -> Result<(), EncodingError>;

    fn flush(&mut self) -> Result<(), EncodingError>;
}

/// Packs codes least significant bit first, as GIF expects them.
pub(crate) struct LittleEndianWriter<W>
where
    W: Write,
{
    blocks: SubBlockWriter<W>,
    cursor: u8,
    byte_buffer: u32,
}

impl<W> LittleEndianWriter<W>
where
    W: Write,
{
    pub fn new(blocks: SubBlockWriter<W>) -> Self {
        let byte_buffer = 0;
        let cursor = 0;
        Self {
            blocks,
            byte_buffer,
            cursor,
        }
    }

    pub fn into_inner(self) -> SubBlockWriter<W> {
        self.blocks
    }
}

impl<W> BitWriter for LittleEndianWriter<W>
where
    W: Write,
{
    #[inline]
    fn write(&mut self, data: u16, amount: u8) -> Result<(), EncodingError> {
        let mask = (1 << amount) - 1;
        self.byte_buffer |= (data as u32 & mask) << self.cursor;
        self.cursor += amount;

        while self.cursor >= 8 {
            let byte = self.byte_buffer as u8;
            self.byte_buffer >>= 8;
            self.cursor -= 8;

            self.blocks.push(byte)?;
        }

        Ok(())
    }

    #[inline]
    fn fill(&mut self) -> Result<(), EncodingError> {
        if self.cursor > 0 {
            self.blocks.push(self.byte_buffer as u8)?;
            self.byte_buffer = 0;
            self.cursor = 0;
        }

        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> Result<(), EncodingError> {
        self.blocks.flush_packet()
    }
}
