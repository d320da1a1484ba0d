use std::io::SeekFrom;

use tracing::trace;

use crate::error::{ParseError, Result};
use crate::io::ByteSource;
use crate::types::DecodingResult;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const IEND_CHUNK_TYPE: &[u8; 4] = b"IEND";

const CHUNK_HEADER_SIZE: usize = 8;
const CRC_SIZE: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub length: u32,
    pub chunk_type: [u8; 4],
}

impl ChunkHeader {
    #[inline]
    pub fn from_bytes(bytes: &[u8; CHUNK_HEADER_SIZE]) -> Self {
        Self {
            length: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            chunk_type: [bytes[4], bytes[5], bytes[6], bytes[7]],
        }
    }

    #[inline]
    pub fn is_iend(&self) -> bool {
        &self.chunk_type == IEND_CHUNK_TYPE
    }

    /// Header, data and CRC.
    #[inline]
    pub fn total_size(&self) -> u64 {
        CHUNK_HEADER_SIZE as u64 + u64::from(self.length) + CRC_SIZE
    }

    pub fn type_name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }
}

/// Absolute offset of the next chunk header.
struct ChunkCursor {
    offset: u64,
}

impl ChunkCursor {
    fn read_header<S: ByteSource + ?Sized>(&self, source: &mut S) -> Result<ChunkHeader> {
        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        match source.fill(&mut buf)? {
            0 => Err(ParseError::UnexpectedEof {
                offset: self.offset,
            }
            .into()),
            CHUNK_HEADER_SIZE => Ok(ChunkHeader::from_bytes(&buf)),
            read => Err(ParseError::ShortChunkHeader {
                offset: self.offset,
                read,
            }
            .into()),
        }
    }

    /// Skips data and CRC without reading them.
    fn skip<S: ByteSource + ?Sized>(&mut self, source: &mut S, header: &ChunkHeader) -> Result<()> {
        let skip = u64::from(header.length) + CRC_SIZE;
        self.offset = source.seek_to(SeekFrom::Current(skip as i64))?;
        Ok(())
    }
}

pub fn validate<S: ByteSource + ?Sized>(source: &mut S) -> Result<bool> {
    source.seek_to(SeekFrom::Start(0))?;
    let mut signature = [0u8; PNG_SIGNATURE.len()];
    let read = source.fill(&mut signature)?;
    Ok(read == signature.len() && signature == PNG_SIGNATURE)
}

/// Walks the chunk list and returns the offset just past the IEND CRC.
///
/// Chunk data is never read. A chunk whose declared length runs past the end
/// of the source is rejected instead of being seeked over.
pub fn locate_end<S: ByteSource + ?Sized>(source: &mut S) -> Result<DecodingResult> {
    let size = source.size()?;

    if !validate(source)? {
        return Err(ParseError::NotPng.into());
    }

    let mut cursor = ChunkCursor {
        offset: PNG_SIGNATURE.len() as u64,
    };

    loop {
        let header = cursor.read_header(source)?;
        trace!(
            "chunk {} at {}, length {}",
            header.type_name(),
            cursor.offset,
            header.length
        );

        if cursor.offset + header.total_size() > size {
            return Err(ParseError::ChunkOutOfBounds {
                chunk_type: header.type_name(),
                offset: cursor.offset,
                length: header.length,
            }
            .into());
        }

        cursor.skip(source, &header)?;

        if header.is_iend() {
            return Ok(DecodingResult::new(cursor.offset));
        }
    }
}
