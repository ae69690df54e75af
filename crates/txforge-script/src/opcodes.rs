//! Script opcode constants.
//!
//! The subset of the Bitcoin opcode table used by the codec, the
//! standard locking-script patterns, and null-data outputs.

/// Push an empty byte array onto the stack.
pub const OP_0: u8 = 0x00;
/// Alias for OP_0.
pub const OP_FALSE: u8 = 0x00;

/// Direct push of 1 byte.
pub const OP_DATA_1: u8 = 0x01;
/// Direct push of 20 bytes (key/script hash).
pub const OP_DATA_20: u8 = 0x14;
/// Direct push of 32 bytes (witness program / taproot key).
pub const OP_DATA_32: u8 = 0x20;
/// Direct push of 33 bytes (compressed public key).
pub const OP_DATA_33: u8 = 0x21;
/// Direct push of 65 bytes (uncompressed public key).
pub const OP_DATA_65: u8 = 0x41;
/// Largest direct push (75 bytes).
pub const OP_DATA_75: u8 = 0x4b;

/// Push data with a 1-byte length prefix.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// Push data with a 2-byte length prefix.
pub const OP_PUSHDATA2: u8 = 0x4d;
/// Push data with a 4-byte length prefix.
pub const OP_PUSHDATA4: u8 = 0x4e;

/// Push the number 1 onto the stack. Also the segwit v1 program marker.
pub const OP_1: u8 = 0x51;
/// Push the number 16 onto the stack.
pub const OP_16: u8 = 0x60;

/// Mark the output as unspendable and carry a data payload.
pub const OP_RETURN: u8 = 0x6a;

/// Duplicate the top stack item.
pub const OP_DUP: u8 = 0x76;
/// Pop two items and push equality result.
pub const OP_EQUAL: u8 = 0x87;
/// Pop two items and fail unless equal.
pub const OP_EQUALVERIFY: u8 = 0x88;
/// Hash the top item with RIPEMD160(SHA256(x)).
pub const OP_HASH160: u8 = 0xa9;
/// Verify an ECDSA signature against a public key.
pub const OP_CHECKSIG: u8 = 0xac;
/// Verify m-of-n ECDSA signatures.
pub const OP_CHECKMULTISIG: u8 = 0xae;

/// Check if an opcode is a small-integer push (OP_0 or OP_1..OP_16).
///
/// # Arguments
/// * `op` - The opcode byte.
///
/// # Returns
/// `true` for OP_0 and OP_1 through OP_16.
pub fn is_small_int_op(op: u8) -> bool {
    op == OP_0 || (OP_1..=OP_16).contains(&op)
}

/// Map a recognized opcode to its canonical name.
///
/// Data pushes and unknown bytes map to a hex-style placeholder.
///
/// # Arguments
/// * `op` - The opcode byte.
///
/// # Returns
/// The canonical OP_xxx name, or "OP_UNKNOWN" for bytes outside the table.
pub fn opcode_to_string(op: u8) -> &'static str {
    match op {
        OP_0 => "OP_0",
        OP_PUSHDATA1 => "OP_PUSHDATA1",
        OP_PUSHDATA2 => "OP_PUSHDATA2",
        OP_PUSHDATA4 => "OP_PUSHDATA4",
        OP_1 => "OP_1",
        OP_16 => "OP_16",
        OP_RETURN => "OP_RETURN",
        OP_DUP => "OP_DUP",
        OP_EQUAL => "OP_EQUAL",
        OP_EQUALVERIFY => "OP_EQUALVERIFY",
        OP_HASH160 => "OP_HASH160",
        OP_CHECKSIG => "OP_CHECKSIG",
        OP_CHECKMULTISIG => "OP_CHECKMULTISIG",
        _ => "OP_UNKNOWN",
    }
}
