use std::io::SeekFrom;

use memchr::memmem::Finder;
use tracing::trace;

use crate::error::{ParseError, Result};
use crate::io::ByteSource;
use crate::types::DecodingResult;

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
pub const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// Capacity of the working window. The whole header has to fit in the first
/// load of it.
pub const JPEG_WINDOW_SIZE: usize = 64 * 1024;
const MIN_WINDOW_SIZE: usize = 2;

const MARKER_PREFIX: u8 = 0xFF;
const TEM_MARKER: u8 = 0x01;
const SOS_MARKER: u8 = 0xDA;
const EOI_MARKER: u8 = 0xD9;
const SURROUNDINGS: usize = 4;

/// Where the header walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderEnd {
    /// Offset of the first byte after the SOS marker.
    ScanStart(usize),
    /// EOI met before any scan (tables-only stream). Offset just past it.
    EndOfImage(usize),
}

#[inline]
pub fn has_signature(data: &[u8]) -> bool {
    data.len() >= JPEG_SOI.len() && data[..2] == JPEG_SOI
}

/// Markers that stand alone, with no length field behind them.
#[inline]
fn is_standalone(marker: u8) -> bool {
    matches!(marker, TEM_MARKER | 0xD0..=0xD7)
}

fn surroundings(header: &[u8], pos: usize) -> String {
    let start = pos.saturating_sub(SURROUNDINGS);
    let end = (pos + SURROUNDINGS).min(header.len());
    hex::encode(&header[start..end])
}

/// Walks the header segments of `header` and returns where the scan begins.
///
/// `header` is the first window loaded from the source, so every offset is
/// also an absolute file offset.
pub fn find_scan_start(header: &[u8]) -> std::result::Result<HeaderEnd, ParseError> {
    if !has_signature(header) {
        return Err(ParseError::NotJpeg);
    }

    let mut pos = JPEG_SOI.len();

    loop {
        if header.len() < pos + 2 {
            return Err(ParseError::Truncated {
                offset: pos,
                needed: 2,
                available: header.len().saturating_sub(pos),
            });
        }

        let marker = header[pos + 1];
        if header[pos] != MARKER_PREFIX || marker == 0x00 {
            return Err(ParseError::MalformedSegment {
                offset: pos,
                surroundings: surroundings(header, pos),
            });
        }

        match marker {
            // fill byte
            MARKER_PREFIX => {
                pos += 1;
                continue;
            }
            SOS_MARKER => return Ok(HeaderEnd::ScanStart(pos + 2)),
            EOI_MARKER => return Ok(HeaderEnd::EndOfImage(pos + 2)),
            m if is_standalone(m) => {
                trace!("standalone marker {m:02X} at {pos}");
                pos += 2;
                continue;
            }
            _ => {}
        }

        if header.len() < pos + 4 {
            return Err(ParseError::Truncated {
                offset: pos + 2,
                needed: 2,
                available: header.len().saturating_sub(pos + 2),
            });
        }

        let seg_len = u16::from_be_bytes([header[pos + 2], header[pos + 3]]) as usize;
        trace!("segment {marker:02X} at {pos}, length {seg_len}");

        // marker plus declared length
        let needed = 2 + seg_len;
        if header.len() < pos + needed {
            return Err(ParseError::Truncated {
                offset: pos,
                needed,
                available: header.len() - pos,
            });
        }
        pos += needed;
    }
}

/// Sliding window over the entropy-coded data.
///
/// `consumed` counts the bytes that fell out of the window in earlier loads,
/// so `consumed + i` is the absolute offset of `window[i]`.
struct ScanCursor {
    window: Vec<u8>,
    filled: usize,
    pos: usize,
    consumed: u64,
}

impl ScanCursor {
    fn load<S: ByteSource + ?Sized>(source: &mut S, capacity: usize) -> Result<Self> {
        let mut window = vec![0u8; capacity];
        let filled = source.fill(&mut window)?;
        Ok(Self {
            window,
            filled,
            pos: 0,
            consumed: 0,
        })
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        &self.window[..self.filled]
    }

    /// Searches every pair from `pos` to the last pair of the window.
    fn find_terminator(&self, finder: &Finder<'_>) -> Option<u64> {
        finder
            .find(&self.window[self.pos..self.filled])
            .map(|i| self.consumed + (self.pos + i) as u64 + JPEG_EOI.len() as u64)
    }

    /// Carries the last byte over to position 0 and refills the rest.
    ///
    /// Returns `false` once the source has nothing more to give.
    fn slide<S: ByteSource + ?Sized>(&mut self, source: &mut S) -> Result<bool> {
        if self.filled == 0 {
            return Ok(false);
        }

        self.window[0] = self.window[self.filled - 1];
        self.consumed += (self.filled - 1) as u64;

        let read = source.fill(&mut self.window[1..])?;
        if read == 0 {
            return Ok(false);
        }

        self.filled = read + 1;
        self.pos = 0;
        trace!("window refilled at {}, {} bytes", self.consumed, self.filled);
        Ok(true)
    }
}

/// Validates the leading `FF D8` at the start of `source`.
pub fn validate<S: ByteSource + ?Sized>(source: &mut S) -> Result<bool> {
    source.seek_to(SeekFrom::Start(0))?;
    let mut signature = [0u8; 2];
    let read = source.fill(&mut signature)?;
    Ok(read == signature.len() && has_signature(&signature))
}

pub fn locate_end<S: ByteSource + ?Sized>(source: &mut S) -> Result<DecodingResult> {
    locate_end_with_window(source, JPEG_WINDOW_SIZE)
}

/// Finds the offset just past the EOI marker, reading through a window of
/// `capacity` bytes. The header must fit in a single window.
pub fn locate_end_with_window<S: ByteSource + ?Sized>(
    source: &mut S,
    capacity: usize,
) -> Result<DecodingResult> {
    source.seek_to(SeekFrom::Start(0))?;
    let mut cursor = ScanCursor::load(source, capacity.max(MIN_WINDOW_SIZE))?;

    match find_scan_start(cursor.bytes())? {
        HeaderEnd::EndOfImage(end) => return Ok(DecodingResult::new(end as u64)),
        HeaderEnd::ScanStart(start) => cursor.pos = start,
    }

    let finder = Finder::new(&JPEG_EOI);
    loop {
        if let Some(end) = cursor.find_terminator(&finder) {
            return Ok(DecodingResult::new(end));
        }
        if !cursor.slide(source)? {
            return Err(ParseError::TerminatorNotFound.into());
        }
    }
}
