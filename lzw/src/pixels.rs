/// Reads the palette indices of an image front to back, one symbol at a time.
pub(crate) struct PixelSource<'a> {
    indices: &'a [u8],
    cursor: usize,
}

impl<'a> PixelSource<'a> {
    pub fn new(indices: &'a [u8]) -> Self {
        Self { indices, cursor: 0 }
    }
}

impl<'a> Iterator for PixelSource<'a> {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let symbol = *self.indices.get(self.cursor)?;
        self.cursor += 1;
        Some(symbol)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.indices.len() - self.cursor;
        (size, Some(size))
    }
}

impl<'a> ExactSizeIterator for PixelSource<'a> {}
