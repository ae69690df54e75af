//! Transaction hash type.
//!
//! Provides `TxHash` — a 32-byte array displayed as byte-reversed hex,
//! matching Bitcoin's convention for transaction IDs (little-endian
//! internal, big-endian display).

use std::fmt;
use std::str::FromStr;

use crate::PrimitivesError;

/// Size of a transaction hash in bytes.
pub const HASH_SIZE: usize = 32;

/// A 32-byte transaction hash.
///
/// Stored in internal (little-endian) byte order; the string form is
/// byte-reversed, as transaction ids are conventionally displayed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct TxHash([u8; HASH_SIZE]);

impl TxHash {
    /// Create a hash from a raw 32-byte array in internal byte order.
    ///
    /// # Arguments
    /// * `bytes` - The 32 bytes in internal (little-endian) order.
    ///
    /// # Returns
    /// A new `TxHash`.
    pub fn new(bytes: [u8; HASH_SIZE]) -> Self {
        TxHash(bytes)
    }

    /// Create a hash from a byte slice in internal byte order.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(TxHash)` if the slice is 32 bytes, or an error otherwise.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != HASH_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            )));
        }
        let mut arr = [0u8; HASH_SIZE];
        arr.copy_from_slice(bytes);
        Ok(TxHash(arr))
    }

    /// Create a hash from a display-order (byte-reversed) hex string.
    ///
    /// # Arguments
    /// * `hex_str` - A 64-character hex string in display order.
    ///
    /// # Returns
    /// `Ok(TxHash)` on success, or an error for invalid input.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let decoded = hex::decode(hex_str)?;
        if decoded.len() != HASH_SIZE {
            return Err(PrimitivesError::InvalidHash(format!(
                "invalid hash hex length of {}, want {}",
                decoded.len(),
                HASH_SIZE
            )));
        }
        let mut arr = [0u8; HASH_SIZE];
        for (i, byte) in decoded.iter().rev().enumerate() {
            arr[i] = *byte;
        }
        Ok(TxHash(arr))
    }

    /// Return a reference to the internal bytes.
    ///
    /// # Returns
    /// The 32 hash bytes in internal order.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Render the hash as display-order hex.
    ///
    /// # Returns
    /// A 64-character hex string with bytes reversed from internal order.
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }
}

impl fmt::Display for TxHash {
    /// Display the hash as its byte-reversed hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for TxHash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxHash::from_hex(s)
    }
}

impl From<[u8; HASH_SIZE]> for TxHash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        TxHash(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hex round-trip reverses bytes on the way in and out.
    #[test]
    fn test_from_hex_roundtrip() {
        let display = "e2fa2ae1e9a45b72ff180c2a41a06eea293e1a046426bbc363b0ff141cc6c738";
        let hash = TxHash::from_hex(display).expect("should parse");
        assert_eq!(hash.to_hex(), display);
        // First internal byte is the last display byte.
        assert_eq!(hash.as_bytes()[0], 0x38);
    }

    /// Wrong-length hex is rejected.
    #[test]
    fn test_from_hex_wrong_length() {
        assert!(TxHash::from_hex("abcd").is_err());
    }

    /// Invalid hex characters are rejected.
    #[test]
    fn test_from_hex_invalid_chars() {
        let bad = "zz".repeat(32);
        assert!(TxHash::from_hex(&bad).is_err());
    }

    /// from_bytes requires exactly 32 bytes.
    #[test]
    fn test_from_bytes_length() {
        assert!(TxHash::from_bytes(&[0u8; 31]).is_err());
        assert!(TxHash::from_bytes(&[0u8; 32]).is_ok());
    }
}
