//! Taproot (segwit v1) address converter.
//!
//! Decode-only: taproot destinations can be paid, but this kit does not
//! derive taproot outputs of its own, so the synthesis paths fail
//! explicitly instead of producing addresses it could not spend.

use bech32::{segwit, Hrp};
use txforge_script::ScriptType;

use crate::address::{Address, AddressConverter, SegWitAddress};
use crate::keys::PublicKey;
use crate::CoreError;

/// Converter for bech32m taproot addresses.
pub struct TaprootAddressConverter {
    prefix: String,
}

impl TaprootAddressConverter {
    /// Create a converter for a network's bech32 prefix.
    ///
    /// # Arguments
    /// * `prefix` - The human-readable prefix (e.g. "bc").
    ///
    /// # Returns
    /// A new `TaprootAddressConverter`.
    pub fn new(prefix: impl Into<String>) -> Self {
        TaprootAddressConverter {
            prefix: prefix.into(),
        }
    }
}

impl AddressConverter for TaprootAddressConverter {
    fn convert(&self, address: &str) -> Result<Address, CoreError> {
        let (hrp, version, program) =
            segwit::decode(address).map_err(|_| CoreError::UnknownAddressType)?;

        let expected = Hrp::parse(&self.prefix)
            .map_err(|e| CoreError::InvalidAddress(format!("bad bech32 prefix: {}", e)))?;
        if hrp != expected {
            return Err(CoreError::InvalidAddress(format!(
                "wrong bech32 prefix '{}' for '{}'",
                hrp, address
            )));
        }
        if version.to_u8() != 1 {
            return Err(CoreError::UnknownAddressType);
        }
        if program.len() != 32 {
            return Err(CoreError::InvalidAddress(format!(
                "taproot program must be 32 bytes, got {}",
                program.len()
            )));
        }

        Ok(Address::SegWit(SegWitAddress::new(
            1,
            program,
            address.to_string(),
        )?))
    }

    fn convert_key_hash(
        &self,
        _key_hash: &[u8],
        _script_type: ScriptType,
    ) -> Result<Address, CoreError> {
        Err(CoreError::UnknownAddressType)
    }

    fn convert_public_key(
        &self,
        _public_key: &PublicKey,
        _script_type: ScriptType,
    ) -> Result<Address, CoreError> {
        Err(CoreError::UnknownAddressType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> TaprootAddressConverter {
        TaprootAddressConverter::new("bc")
    }

    /// The BIP-350 v1 example decodes as P2TR.
    #[test]
    fn test_convert_taproot() {
        let address = converter()
            .convert("bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0")
            .expect("should decode");
        assert_eq!(address.script_type(), ScriptType::P2tr);
        assert_eq!(address.payload().len(), 32);
    }

    /// v0 addresses are left for the segwit converter.
    #[test]
    fn test_v0_declined() {
        let result = converter().convert("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
        assert!(matches!(result, Err(CoreError::UnknownAddressType)));
    }

    /// Construction paths fail explicitly.
    #[test]
    fn test_synthesis_fails() {
        let result = converter().convert_key_hash(&[0u8; 32], ScriptType::P2tr);
        assert!(matches!(result, Err(CoreError::UnknownAddressType)));
    }
}
