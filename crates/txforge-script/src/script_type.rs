//! Script type classification tags.
//!
//! Identifies the standard locking-script families the kit can pay to
//! and spend from, and carries the per-type locking-script sizes used
//! by the size and dust calculators.

/// The standard locking-script families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptType {
    /// Not a recognized standard script.
    Unknown,
    /// Pay-to-public-key-hash.
    P2pkh,
    /// Pay-to-public-key (bare key).
    P2pk,
    /// Bare multisig.
    P2multi,
    /// Pay-to-script-hash.
    P2sh,
    /// Pay-to-witness-script-hash (segwit v0, 32-byte program).
    P2wsh,
    /// Pay-to-witness-public-key-hash (segwit v0, 20-byte program).
    P2wpkh,
    /// P2WPKH nested in P2SH (wrapped segwit).
    P2wpkhSh,
    /// Pay-to-taproot (segwit v1, 32-byte program).
    P2tr,
    /// Unspendable data-carrier output (OP_RETURN).
    NullData,
}

impl ScriptType {
    /// Return the locking-script byte size for this type.
    ///
    /// # Returns
    /// The serialized script length, or 0 for types without a fixed size.
    pub fn size(&self) -> usize {
        match self {
            ScriptType::P2pk => 35,
            ScriptType::P2pkh => 25,
            ScriptType::P2sh => 23,
            ScriptType::P2wsh => 34,
            ScriptType::P2wpkh => 22,
            ScriptType::P2wpkhSh => 23,
            ScriptType::P2tr => 34,
            _ => 0,
        }
    }

    /// Check whether spending this type places data in the witness.
    ///
    /// # Returns
    /// `true` for native and wrapped segwit types.
    pub fn is_witness(&self) -> bool {
        matches!(
            self,
            ScriptType::P2wpkh | ScriptType::P2wpkhSh | ScriptType::P2wsh | ScriptType::P2tr
        )
    }

    /// Check whether this type is native segwit (bech32-addressed).
    ///
    /// # Returns
    /// `true` for P2WPKH, P2WSH, and P2TR.
    pub fn is_native_segwit(&self) -> bool {
        matches!(self, ScriptType::P2wpkh | ScriptType::P2wsh | ScriptType::P2tr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(ScriptType::P2pkh.size(), 25);
        assert_eq!(ScriptType::P2sh.size(), 23);
        assert_eq!(ScriptType::P2wpkh.size(), 22);
        assert_eq!(ScriptType::P2wsh.size(), 34);
        assert_eq!(ScriptType::P2tr.size(), 34);
        assert_eq!(ScriptType::NullData.size(), 0);
    }

    #[test]
    fn test_witness_flags() {
        assert!(ScriptType::P2wpkh.is_witness());
        assert!(ScriptType::P2wpkhSh.is_witness());
        assert!(!ScriptType::P2pkh.is_witness());
        assert!(ScriptType::P2wpkh.is_native_segwit());
        assert!(!ScriptType::P2wpkhSh.is_native_segwit());
    }
}
