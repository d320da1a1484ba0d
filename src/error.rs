use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Carries the extension, empty when the name has none.
    #[error("{}", unrecognized_message(.0))]
    UnrecognizedFormat(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural failures. The source was readable but its bytes do not follow
/// the format the file name promised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("not a JPEG file")]
    NotJpeg,

    #[error("malformed segment: no marker at offset {offset}, surroundings: {surroundings}")]
    MalformedSegment { offset: usize, surroundings: String },

    #[error("truncated header: {needed} bytes needed at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("end of image terminator not found")]
    TerminatorNotFound,

    #[error("not a PNG file")]
    NotPng,

    #[error("unexpected end of file at offset {offset}")]
    UnexpectedEof { offset: u64 },

    #[error("short chunk header at offset {offset}: got {read} of 8 bytes")]
    ShortChunkHeader { offset: u64, read: usize },

    #[error("chunk {chunk_type} at offset {offset} declares {length} bytes past the end of the file")]
    ChunkOutOfBounds {
        chunk_type: String,
        offset: u64,
        length: u32,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

fn unrecognized_message(ext: &str) -> String {
    if ext.is_empty() {
        "missing file extension".to_string()
    } else {
        format!("unrecognized extension '{ext}'")
    }
}

impl Error {
    #[must_use]
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}
