pub mod cli;
mod error;
pub mod formats;
pub mod io;
pub mod types;

pub use error::{Error, ParseError, Result};
pub use formats::{Format, resolve};
pub use io::ByteSource;
pub use types::{DecodingResult, Offset};
