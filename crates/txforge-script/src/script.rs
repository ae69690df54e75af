/// Bitcoin Script type - a sequence of opcodes and data pushes.
///
/// Scripts are used in transaction inputs (unlocking) and outputs
/// (locking) to define spending conditions. The Script wraps a `Vec<u8>`
/// and provides methods for construction, classification across legacy
/// and witness families, serialization, and ASM output.

use std::fmt;

use crate::chunk::{decode_script, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::script_type::ScriptType;
use crate::ScriptError;

/// A Bitcoin script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    ///
    /// # Returns
    /// An empty `Script` instance.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string (e.g. "76a914...88ac").
    ///
    /// # Returns
    /// A `Script` wrapping the decoded bytes, or an error if the hex is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Script(bytes))
    }

    /// Create a script from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - Raw script bytes.
    ///
    /// # Returns
    /// A `Script` wrapping a copy of the given bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Build a P2PKH locking script for a 20-byte public key hash.
    ///
    /// Produces: `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`
    ///
    /// # Arguments
    /// * `key_hash` - The hash160 of the public key.
    ///
    /// # Returns
    /// The 25-byte locking script.
    pub fn p2pkh_lock(key_hash: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(25);
        bytes.push(OP_DUP);
        bytes.push(OP_HASH160);
        bytes.push(key_hash.len() as u8);
        bytes.extend_from_slice(key_hash);
        bytes.push(OP_EQUALVERIFY);
        bytes.push(OP_CHECKSIG);
        Script(bytes)
    }

    /// Build a P2SH locking script for a 20-byte script hash.
    ///
    /// Produces: `OP_HASH160 <hash> OP_EQUAL`
    ///
    /// # Arguments
    /// * `script_hash` - The hash160 of the redeem script.
    ///
    /// # Returns
    /// The 23-byte locking script.
    pub fn p2sh_lock(script_hash: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(23);
        bytes.push(OP_HASH160);
        bytes.push(script_hash.len() as u8);
        bytes.extend_from_slice(script_hash);
        bytes.push(OP_EQUAL);
        Script(bytes)
    }

    /// Build a witness locking script for a version and program.
    ///
    /// Version 0 emits OP_0; versions 1-16 emit OP_1..OP_16. The program
    /// is appended as a direct push (20-byte key hash, 32-byte script
    /// hash, or 32-byte taproot output key).
    ///
    /// # Arguments
    /// * `version` - The witness version (0-16).
    /// * `program` - The witness program bytes.
    ///
    /// # Returns
    /// The locking script, or an error for an out-of-range version.
    pub fn witness_lock(version: u8, program: &[u8]) -> Result<Self, ScriptError> {
        let version_op = match version {
            0 => OP_0,
            1..=16 => OP_1 + version - 1,
            _ => {
                return Err(ScriptError::InvalidScript(format!(
                    "witness version {} out of range",
                    version
                )))
            }
        };
        let mut bytes = Vec::with_capacity(2 + program.len());
        bytes.push(version_op);
        bytes.push(program.len() as u8);
        bytes.extend_from_slice(program);
        Ok(Script(bytes))
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Encode the script as a hex string.
    ///
    /// # Returns
    /// A lowercase hex representation of the script bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Convert the script to its ASM (human-readable assembly) representation.
    ///
    /// # Returns
    /// A space-separated ASM string. Returns empty string for empty/invalid scripts.
    pub fn to_asm(&self) -> String {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .map(ScriptChunk::to_asm_string)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }

    /// Return a reference to the underlying bytes.
    ///
    /// # Returns
    /// A byte slice of the script contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the script and return the underlying bytes.
    ///
    /// # Returns
    /// The script bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Return the length of the script in bytes.
    ///
    /// # Returns
    /// The number of bytes in the script.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the script is empty (zero bytes).
    ///
    /// # Returns
    /// `true` if the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // -----------------------------------------------------------------------
    // Script classification
    // -----------------------------------------------------------------------

    /// Check if this is a Pay-to-Public-Key-Hash (P2PKH) output script.
    ///
    /// Pattern: OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    ///
    /// # Returns
    /// `true` if the script matches the P2PKH pattern.
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// Check if this is a Pay-to-Script-Hash (P2SH) output script.
    ///
    /// Pattern: OP_HASH160 <20 bytes> OP_EQUAL
    ///
    /// # Returns
    /// `true` if the script matches the P2SH pattern.
    pub fn is_p2sh(&self) -> bool {
        let b = &self.0;
        b.len() == 23 && b[0] == OP_HASH160 && b[1] == OP_DATA_20 && b[22] == OP_EQUAL
    }

    /// Check if this is a native segwit v0 key-hash (P2WPKH) output script.
    ///
    /// Pattern: OP_0 <20 bytes>
    ///
    /// # Returns
    /// `true` if the script matches the P2WPKH pattern.
    pub fn is_p2wpkh(&self) -> bool {
        let b = &self.0;
        b.len() == 22 && b[0] == OP_0 && b[1] == OP_DATA_20
    }

    /// Check if this is a native segwit v0 script-hash (P2WSH) output script.
    ///
    /// Pattern: OP_0 <32 bytes>
    ///
    /// # Returns
    /// `true` if the script matches the P2WSH pattern.
    pub fn is_p2wsh(&self) -> bool {
        let b = &self.0;
        b.len() == 34 && b[0] == OP_0 && b[1] == OP_DATA_32
    }

    /// Check if this is a segwit v1 taproot (P2TR) output script.
    ///
    /// Pattern: OP_1 <32 bytes>
    ///
    /// # Returns
    /// `true` if the script matches the P2TR pattern.
    pub fn is_p2tr(&self) -> bool {
        let b = &self.0;
        b.len() == 34 && b[0] == OP_1 && b[1] == OP_DATA_32
    }

    /// Check if this is a Pay-to-Public-Key (P2PK) output script.
    ///
    /// Pattern: <pubkey> OP_CHECKSIG (pubkey is 33 or 65 bytes with a
    /// valid prefix byte).
    ///
    /// # Returns
    /// `true` if the script matches the P2PK pattern.
    pub fn is_p2pk(&self) -> bool {
        let parts = match self.chunks() {
            Ok(p) => p,
            Err(_) => return false,
        };
        if parts.len() == 2 && parts[1].op == OP_CHECKSIG {
            if let Some(ref pubkey) = parts[0].data {
                if !pubkey.is_empty() {
                    let version = pubkey[0];
                    if (version == 0x04 || version == 0x06 || version == 0x07)
                        && pubkey.len() == 65
                    {
                        return true;
                    } else if (version == 0x02 || version == 0x03) && pubkey.len() == 33 {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Check if this is a bare multisig output script.
    ///
    /// Pattern: OP_M <pubkey1> ... <pubkeyN> OP_N OP_CHECKMULTISIG
    ///
    /// # Returns
    /// `true` if the script matches the multisig output pattern.
    pub fn is_multisig(&self) -> bool {
        let parts = match self.chunks() {
            Ok(p) => p,
            Err(_) => return false,
        };
        if parts.len() < 4 {
            return false;
        }
        if !is_small_int_op(parts[0].op) {
            return false;
        }
        for chunk in &parts[1..parts.len() - 2] {
            match &chunk.data {
                Some(d) if !d.is_empty() => {}
                _ => return false,
            }
        }
        let second_last = &parts[parts.len() - 2];
        let last = &parts[parts.len() - 1];
        is_small_int_op(second_last.op) && last.op == OP_CHECKMULTISIG
    }

    /// Check if this is a data output script (OP_RETURN or OP_FALSE OP_RETURN).
    ///
    /// # Returns
    /// `true` if the script begins with OP_RETURN or OP_FALSE OP_RETURN.
    pub fn is_null_data(&self) -> bool {
        let b = &self.0;
        (!b.is_empty() && b[0] == OP_RETURN)
            || (b.len() > 1 && b[0] == OP_FALSE && b[1] == OP_RETURN)
    }

    /// Classify this script into a `ScriptType`.
    ///
    /// The fixed-length patterns are checked first, then the chunk-based
    /// ones; anything unrecognized is `Unknown`.
    ///
    /// # Returns
    /// The detected script type.
    pub fn script_type(&self) -> ScriptType {
        if self.is_p2pkh() {
            ScriptType::P2pkh
        } else if self.is_p2sh() {
            ScriptType::P2sh
        } else if self.is_p2wpkh() {
            ScriptType::P2wpkh
        } else if self.is_p2wsh() {
            ScriptType::P2wsh
        } else if self.is_p2tr() {
            ScriptType::P2tr
        } else if self.is_null_data() {
            ScriptType::NullData
        } else if self.is_p2pk() {
            ScriptType::P2pk
        } else if self.is_multisig() {
            ScriptType::P2multi
        } else {
            ScriptType::Unknown
        }
    }

    // -----------------------------------------------------------------------
    // Data extraction
    // -----------------------------------------------------------------------

    /// Extract the committed hash or witness program from a standard script.
    ///
    /// Returns the 20-byte key hash for P2PKH/P2WPKH, the 20-byte script
    /// hash for P2SH, and the 32-byte program for P2WSH/P2TR.
    ///
    /// # Returns
    /// The payload bytes, or `None` for types without one.
    pub fn standard_payload(&self) -> Option<Vec<u8>> {
        match self.script_type() {
            ScriptType::P2pkh => Some(self.0[3..23].to_vec()),
            ScriptType::P2sh => Some(self.0[2..22].to_vec()),
            ScriptType::P2wpkh => Some(self.0[2..22].to_vec()),
            ScriptType::P2wsh | ScriptType::P2tr => Some(self.0[2..34].to_vec()),
            _ => None,
        }
    }

    /// Parse the script into a vector of decoded chunks.
    ///
    /// # Returns
    /// A vector of `ScriptChunk` values, or an error if the script is malformed.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    // -----------------------------------------------------------------------
    // Mutation / building
    // -----------------------------------------------------------------------

    /// Append data bytes to the script with the proper PUSHDATA prefix.
    ///
    /// Chooses the minimal encoding: direct push for 1-75 bytes,
    /// OP_PUSHDATA1 for 76-255, OP_PUSHDATA2 for 256-65535, etc.
    ///
    /// # Arguments
    /// * `data` - The data bytes to push.
    ///
    /// # Returns
    /// `Ok(())` on success, or an error if the data is too large.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append raw opcodes to the script.
    ///
    /// Rejects push data opcodes (OP_DATA_1..OP_PUSHDATA4) to prevent
    /// misuse. Use `append_push_data` for those.
    ///
    /// # Arguments
    /// * `opcodes` - Slice of opcode bytes to append.
    ///
    /// # Returns
    /// `Ok(())` on success, or an error if a push data opcode is encountered.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        for &op in opcodes {
            if op >= OP_DATA_1 && op <= OP_PUSHDATA4 {
                return Err(ScriptError::InvalidOpcodeType(format!("0x{:02x}", op)));
            }
            self.0.push(op);
        }
        Ok(())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl fmt::Display for Script {
    /// Display the script as its hex encoding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    //! Tests for script construction and classification across the
    //! legacy, segwit v0, and taproot locking-script families.

    use super::*;

    const KEY_HASH: &str = "751e76e8199196d454941c45d1b3a323f1433bd6";

    // -----------------------------------------------------------------------
    // Locking script construction
    // -----------------------------------------------------------------------

    /// P2PKH lock produces the canonical 25-byte pattern.
    #[test]
    fn test_p2pkh_lock() {
        let hash = hex::decode(KEY_HASH).unwrap();
        let script = Script::p2pkh_lock(&hash);
        assert_eq!(
            script.to_hex(),
            format!("76a914{}88ac", KEY_HASH)
        );
        assert_eq!(script.script_type(), ScriptType::P2pkh);
    }

    /// P2SH lock produces the canonical 23-byte pattern.
    #[test]
    fn test_p2sh_lock() {
        let hash = hex::decode(KEY_HASH).unwrap();
        let script = Script::p2sh_lock(&hash);
        assert_eq!(script.to_hex(), format!("a914{}87", KEY_HASH));
        assert_eq!(script.script_type(), ScriptType::P2sh);
    }

    /// Witness v0 lock over a 20-byte program classifies as P2WPKH.
    #[test]
    fn test_witness_v0_keyhash_lock() {
        let hash = hex::decode(KEY_HASH).unwrap();
        let script = Script::witness_lock(0, &hash).unwrap();
        assert_eq!(script.to_hex(), format!("0014{}", KEY_HASH));
        assert_eq!(script.script_type(), ScriptType::P2wpkh);
    }

    /// Witness v1 lock over a 32-byte program classifies as P2TR.
    #[test]
    fn test_witness_v1_lock() {
        let program = [0xab; 32];
        let script = Script::witness_lock(1, &program).unwrap();
        assert_eq!(script.as_bytes()[0], OP_1);
        assert_eq!(script.script_type(), ScriptType::P2tr);
    }

    /// Witness versions above 16 are rejected.
    #[test]
    fn test_witness_version_out_of_range() {
        assert!(Script::witness_lock(17, &[0u8; 32]).is_err());
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// A 32-byte v0 program is P2WSH, not P2WPKH.
    #[test]
    fn test_p2wsh_classification() {
        let script = Script::witness_lock(0, &[0xcd; 32]).unwrap();
        assert_eq!(script.script_type(), ScriptType::P2wsh);
    }

    /// A compressed-key P2PK script classifies correctly.
    #[test]
    fn test_p2pk_classification() {
        let mut script = Script::new();
        let pubkey =
            hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
                .unwrap();
        script.append_push_data(&pubkey).unwrap();
        script.append_opcodes(&[OP_CHECKSIG]).unwrap();
        assert_eq!(script.script_type(), ScriptType::P2pk);
    }

    /// A 2-of-2 multisig script classifies as P2multi.
    #[test]
    fn test_multisig_classification() {
        let pubkey =
            hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
                .unwrap();
        let mut script = Script::new();
        script.append_opcodes(&[OP_1 + 1]).unwrap();
        script.append_push_data(&pubkey).unwrap();
        script.append_push_data(&pubkey).unwrap();
        script.append_opcodes(&[OP_1 + 1, OP_CHECKMULTISIG]).unwrap();
        assert_eq!(script.script_type(), ScriptType::P2multi);
    }

    /// OP_RETURN scripts classify as null data.
    #[test]
    fn test_null_data_classification() {
        let script = Script::from_bytes(&[OP_RETURN, 0x02, 0xde, 0xad]);
        assert_eq!(script.script_type(), ScriptType::NullData);
    }

    /// Garbage bytes classify as Unknown.
    #[test]
    fn test_unknown_classification() {
        let script = Script::from_bytes(&[0xff, 0xfe, 0xfd]);
        assert_eq!(script.script_type(), ScriptType::Unknown);
    }

    // -----------------------------------------------------------------------
    // Payload extraction
    // -----------------------------------------------------------------------

    /// Each standard family yields its committed hash or program.
    #[test]
    fn test_standard_payload() {
        let hash = hex::decode(KEY_HASH).unwrap();

        let p2pkh = Script::p2pkh_lock(&hash);
        assert_eq!(p2pkh.standard_payload().unwrap(), hash);

        let p2sh = Script::p2sh_lock(&hash);
        assert_eq!(p2sh.standard_payload().unwrap(), hash);

        let p2wpkh = Script::witness_lock(0, &hash).unwrap();
        assert_eq!(p2wpkh.standard_payload().unwrap(), hash);

        let program = vec![0xee; 32];
        let p2wsh = Script::witness_lock(0, &program).unwrap();
        assert_eq!(p2wsh.standard_payload().unwrap(), program);
    }

    /// Null-data scripts carry no standard payload.
    #[test]
    fn test_no_payload_for_null_data() {
        let script = Script::from_bytes(&[OP_RETURN, 0x01, 0xaa]);
        assert!(script.standard_payload().is_none());
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// append_opcodes rejects push-data opcodes.
    #[test]
    fn test_append_opcodes_rejects_push() {
        let mut script = Script::new();
        assert!(script.append_opcodes(&[0x14]).is_err());
        assert!(script.append_opcodes(&[OP_PUSHDATA1]).is_err());
    }

    /// ASM output renders opcodes by name and pushes as hex.
    #[test]
    fn test_to_asm() {
        let hash = hex::decode(KEY_HASH).unwrap();
        let script = Script::p2pkh_lock(&hash);
        assert_eq!(
            script.to_asm(),
            format!("OP_DUP OP_HASH160 {} OP_EQUALVERIFY OP_CHECKSIG", KEY_HASH)
        );
    }
}
