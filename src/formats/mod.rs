//! Supported formats and the extension registry that selects one.
//!
//! Resolution is purely syntactic: it looks at the file name and never at
//! the contents. Call [`Format::validate`] when the bytes have to agree.

pub mod jpeg;
pub mod png;

use std::path::Path;

use crate::error::{Error, Result};
use crate::io::ByteSource;
use crate::types::DecodingResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Jpeg,
    Png,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Jpeg, Format::Png];

    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
        }
    }

    /// Lower-cased extensions, without the dot, that select this format.
    #[must_use]
    pub const fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Jpeg => &["jpeg", "jpg", "jpe"],
            Self::Png => &["png"],
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    /// Case-insensitive; a single leading dot is ignored.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext).to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }

    /// Picks the format from the extension of `name`.
    ///
    /// A bare dotfile such as `.png` has no extension and is rejected.
    pub fn resolve(name: impl AsRef<Path>) -> Result<Self> {
        let ext = name
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy())
            .unwrap_or_default();

        Self::from_extension(&ext).ok_or_else(|| Error::UnrecognizedFormat(ext.into_owned()))
    }

    /// Checks the leading signature bytes.
    ///
    /// Rewinds `source` first. Returns `false` for a mismatch or a source
    /// shorter than the signature; errors only when reading fails.
    pub fn validate<S: ByteSource + ?Sized>(&self, source: &mut S) -> Result<bool> {
        match self {
            Self::Jpeg => jpeg::validate(source),
            Self::Png => png::validate(source),
        }
    }

    /// Locates the end of the image data, reading `source` from the start.
    pub fn parse<S: ByteSource + ?Sized>(&self, source: &mut S) -> Result<DecodingResult> {
        match self {
            Self::Jpeg => jpeg::locate_end(source),
            Self::Png => png::locate_end(source),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

pub fn resolve(name: impl AsRef<Path>) -> Result<Format> {
    Format::resolve(name)
}
