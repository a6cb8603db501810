//! Error type shared by every decoder in the crate.
use crate::record::DataType;

/// Fatal conditions raised while decoding a `.dat` stream.
///
/// A clean end of stream at a record boundary is not an error; readers report
/// it as `Ok(None)`. Unknown record or tick tags are not errors either.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes were available than a fixed-width block requires.
    ///
    /// `offset` is the stream position of the block, or 0 when a detached
    /// buffer was handed to a slice decoder.
    #[error("truncated {context} at offset {offset}: needed {needed} bytes, got {got}")]
    TruncatedStream {
        context: &'static str,
        offset: u64,
        needed: usize,
        got: usize,
    },

    /// A fixed-width text field is not valid UTF-8.
    #[error("field `{field}` is not valid text")]
    StringDecode {
        field: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },

    /// The header declared a payload size that does not match the record layout.
    #[error("{data_type} payload declares {declared} bytes, layout requires {expected}")]
    PayloadSizeMismatch {
        data_type: DataType,
        declared: usize,
        expected: usize,
    },

    /// The underlying stream failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// True when the stream ended partway through a block.
    pub fn is_truncation(&self) -> bool {
        matches!(self, DecodeError::TruncatedStream { .. })
    }
}

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
