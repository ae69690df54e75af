//! Script chunk parsing and push-data encoding.
//!
//! A script chunk is either an opcode or a data push with its associated
//! bytes. This module decodes raw script bytes into structured chunks and
//! encodes push data with the minimal OP_PUSHDATA prefix.

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a Bitcoin script.
///
/// Each chunk is either a standalone opcode (like OP_DUP) or a data push
/// that carries the opcode byte and the pushed data bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes), this is the length.
    pub op: u8,
    /// The data payload, if this chunk is a push operation.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// Convert this chunk to its ASM string representation.
    ///
    /// Data push chunks are rendered as hex strings; non-push opcodes use
    /// their canonical OP_xxx name.
    ///
    /// # Returns
    /// A string suitable for inclusion in a space-separated ASM output.
    pub fn to_asm_string(&self) -> String {
        if self.op > OP_0 && self.op <= OP_PUSHDATA4 {
            if let Some(ref data) = self.data {
                return hex::encode(data);
            }
        }
        opcode_to_string(self.op).to_string()
    }
}

/// Decode raw script bytes into a vector of `ScriptChunk` values.
///
/// Handles direct pushes (OP_DATA_1..OP_DATA_75) and the extended
/// OP_PUSHDATA1/2/4 forms. Every other byte becomes a standalone opcode
/// chunk, so payloads after OP_RETURN remain visible as individual
/// chunks for plugin-id routing.
///
/// # Arguments
/// * `bytes` - The raw script bytes to decode.
///
/// # Returns
/// A vector of parsed chunks, or a `ScriptError` if the data is truncated.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let op = bytes[pos];

        match op {
            OP_PUSHDATA1 => {
                if bytes.len() < pos + 2 {
                    return Err(ScriptError::DataTooSmall);
                }
                let length = bytes[pos + 1] as usize;
                pos += 2;
                if bytes.len() < pos + length {
                    return Err(ScriptError::DataTooSmall);
                }
                chunks.push(ScriptChunk {
                    op,
                    data: Some(bytes[pos..pos + length].to_vec()),
                });
                pos += length;
            }
            OP_PUSHDATA2 => {
                if bytes.len() < pos + 3 {
                    return Err(ScriptError::DataTooSmall);
                }
                let length = u16::from_le_bytes([bytes[pos + 1], bytes[pos + 2]]) as usize;
                pos += 3;
                if bytes.len() < pos + length {
                    return Err(ScriptError::DataTooSmall);
                }
                chunks.push(ScriptChunk {
                    op,
                    data: Some(bytes[pos..pos + length].to_vec()),
                });
                pos += length;
            }
            OP_PUSHDATA4 => {
                if bytes.len() < pos + 5 {
                    return Err(ScriptError::DataTooSmall);
                }
                let length = u32::from_le_bytes([
                    bytes[pos + 1],
                    bytes[pos + 2],
                    bytes[pos + 3],
                    bytes[pos + 4],
                ]) as usize;
                pos += 5;
                if bytes.len() < pos + length {
                    return Err(ScriptError::DataTooSmall);
                }
                chunks.push(ScriptChunk {
                    op,
                    data: Some(bytes[pos..pos + length].to_vec()),
                });
                pos += length;
            }
            op if op >= OP_DATA_1 && op <= OP_DATA_75 => {
                let length = op as usize;
                pos += 1;
                if bytes.len() < pos + length {
                    return Err(ScriptError::DataTooSmall);
                }
                chunks.push(ScriptChunk {
                    op,
                    data: Some(bytes[pos..pos + length].to_vec()),
                });
                pos += length;
            }
            _ => {
                chunks.push(ScriptChunk { op, data: None });
                pos += 1;
            }
        }
    }

    Ok(chunks)
}

/// Build the minimal push prefix for a payload of the given length.
///
/// Chooses a direct push for 1-75 bytes, OP_PUSHDATA1 for up to 255,
/// OP_PUSHDATA2 for up to 65535, and OP_PUSHDATA4 beyond that.
///
/// # Arguments
/// * `length` - The payload byte length.
///
/// # Returns
/// The prefix bytes, or an error if the length exceeds u32 range.
pub fn push_data_prefix(length: usize) -> Result<Vec<u8>, ScriptError> {
    if length <= OP_DATA_75 as usize {
        Ok(vec![length as u8])
    } else if length <= 0xff {
        Ok(vec![OP_PUSHDATA1, length as u8])
    } else if length <= 0xffff {
        let mut prefix = vec![OP_PUSHDATA2];
        prefix.extend_from_slice(&(length as u16).to_le_bytes());
        Ok(prefix)
    } else if length <= 0xffff_ffff {
        let mut prefix = vec![OP_PUSHDATA4];
        prefix.extend_from_slice(&(length as u32).to_le_bytes());
        Ok(prefix)
    } else {
        Err(ScriptError::DataTooBig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct pushes decode into a single data chunk.
    #[test]
    fn test_decode_direct_push() {
        let chunks = decode_script(&[0x03, 0xaa, 0xbb, 0xcc]).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].op, 0x03);
        assert_eq!(chunks[0].data.as_deref(), Some(&[0xaa, 0xbb, 0xcc][..]));
    }

    /// OP_PUSHDATA1 decodes with its 1-byte length prefix.
    #[test]
    fn test_decode_pushdata1() {
        let mut script = vec![OP_PUSHDATA1, 76];
        script.extend(std::iter::repeat(0x11).take(76));
        let chunks = decode_script(&script).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data.as_ref().unwrap().len(), 76);
    }

    /// Truncated push data yields an error, not a partial chunk.
    #[test]
    fn test_decode_truncated_push() {
        assert!(decode_script(&[0x05, 0xaa]).is_err());
        assert!(decode_script(&[OP_PUSHDATA1]).is_err());
        assert!(decode_script(&[OP_PUSHDATA2, 0x10]).is_err());
    }

    /// Chunks after OP_RETURN stay individually addressable.
    #[test]
    fn test_decode_null_data_chunks() {
        let script = [OP_RETURN, 0x01, 0x42, 0x02, 0xde, 0xad];
        let chunks = decode_script(&script).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].op, OP_RETURN);
        assert_eq!(chunks[1].data.as_deref(), Some(&[0x42][..]));
        assert_eq!(chunks[2].data.as_deref(), Some(&[0xde, 0xad][..]));
    }

    /// The push prefix picks the minimal encoding for each size class.
    #[test]
    fn test_push_data_prefix_sizes() {
        assert_eq!(push_data_prefix(1).unwrap(), vec![0x01]);
        assert_eq!(push_data_prefix(75).unwrap(), vec![0x4b]);
        assert_eq!(push_data_prefix(76).unwrap(), vec![OP_PUSHDATA1, 76]);
        assert_eq!(push_data_prefix(255).unwrap(), vec![OP_PUSHDATA1, 255]);
        assert_eq!(push_data_prefix(256).unwrap(), vec![OP_PUSHDATA2, 0x00, 0x01]);
        assert_eq!(
            push_data_prefix(65536).unwrap(),
            vec![OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00]
        );
    }
}
