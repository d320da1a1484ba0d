pub type Offset = u64;

/// Where a format's logical payload ends inside its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodingResult {
    /// Exclusive end offset of the image data.
    pub data_end: Offset,
}

impl DecodingResult {
    #[must_use]
    pub const fn new(data_end: Offset) -> Self {
        Self { data_end }
    }

    /// Bytes past `data_end` in a source of `size` bytes.
    #[must_use]
    pub const fn trailing_bytes(&self, size: u64) -> u64 {
        size.saturating_sub(self.data_end)
    }

    #[must_use]
    pub const fn has_trailing_data(&self, size: u64) -> bool {
        self.data_end < size
    }
}
