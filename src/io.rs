//! Byte source abstraction consumed by the format locators.
//!
//! The locators never open, close or truncate anything. They are handed a
//! readable, seekable stream by the caller and only move its position.

use std::io::{self, Read, Seek, SeekFrom};

/// A readable, seekable stream of bytes with a known length.
///
/// This trait decouples the locators from the way bytes are obtained. Every
/// `Read + Seek` type is a `ByteSource` through the blanket implementation
/// below, so files, in-memory cursors and buffered readers work directly.
///
/// # Example
///
/// ```
/// use detailer::ByteSource;
/// use std::io::{Cursor, SeekFrom};
///
/// let mut source = Cursor::new(vec![1u8, 2, 3, 4, 5]);
/// let mut buf = [0u8; 2];
///
/// source.seek_to(SeekFrom::Start(3)).unwrap();
/// assert_eq!(source.fill(&mut buf).unwrap(), 2);
/// assert_eq!(buf, [4, 5]);
/// assert_eq!(source.size().unwrap(), 5);
/// ```
pub trait ByteSource {
    /// Reads up to `buf.len()` bytes at the current position.
    ///
    /// # Returns
    ///
    /// The number of bytes read. Zero means the source is exhausted
    /// (or `buf` is empty).
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Moves the current position and returns the new absolute offset.
    fn seek_to(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// Returns the total length of the source in bytes.
    ///
    /// The current position is left unchanged.
    fn size(&mut self) -> io::Result<u64>;

    /// Reads until `buf` is full or the source is exhausted.
    ///
    /// Short reads are retried, as are reads interrupted by a signal.
    ///
    /// # Returns
    ///
    /// The number of bytes placed in `buf`, which is less than `buf.len()`
    /// only when the end of the source was reached.
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read_into(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<T: Read + Seek + ?Sized> ByteSource for T {
    #[inline]
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }

    #[inline]
    fn seek_to(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seek(pos)
    }

    fn size(&mut self) -> io::Result<u64> {
        let here = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        if here != end {
            self.seek(SeekFrom::Start(here))?;
        }
        Ok(end)
    }
}
