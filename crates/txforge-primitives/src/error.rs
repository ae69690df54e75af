/// Unified error type for primitives operations.
///
/// Covers errors from wire-format decoding, hashing, and hex conversion.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// A read ran past the end of the input buffer.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// A hash had the wrong length or an otherwise invalid encoding.
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
