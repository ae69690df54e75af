//! Native segwit v0 address converter.
//!
//! Decodes bech32 addresses under the network's human-readable prefix:
//! a 20-byte program is P2WPKH, a 32-byte program is P2WSH. Witness
//! versions other than 0 are left for the taproot converter.

use bech32::{segwit, Fe32, Hrp};
use txforge_script::ScriptType;

use crate::address::{Address, AddressConverter, SegWitAddress};
use crate::keys::PublicKey;
use crate::CoreError;

/// Converter for bech32 segwit v0 addresses.
pub struct SegWitBech32AddressConverter {
    prefix: String,
}

impl SegWitBech32AddressConverter {
    /// Create a converter for a network's bech32 prefix.
    ///
    /// # Arguments
    /// * `prefix` - The human-readable prefix (e.g. "bc").
    ///
    /// # Returns
    /// A new `SegWitBech32AddressConverter`.
    pub fn new(prefix: impl Into<String>) -> Self {
        SegWitBech32AddressConverter {
            prefix: prefix.into(),
        }
    }

    fn hrp(&self) -> Result<Hrp, CoreError> {
        Hrp::parse(&self.prefix)
            .map_err(|e| CoreError::InvalidAddress(format!("bad bech32 prefix: {}", e)))
    }

    fn encode(&self, program: &[u8]) -> Result<Address, CoreError> {
        let string = segwit::encode(self.hrp()?, Fe32::Q, program)
            .map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
        Ok(Address::SegWit(SegWitAddress::new(
            0,
            program.to_vec(),
            string,
        )?))
    }
}

impl AddressConverter for SegWitBech32AddressConverter {
    fn convert(&self, address: &str) -> Result<Address, CoreError> {
        let (hrp, version, program) =
            segwit::decode(address).map_err(|_| CoreError::UnknownAddressType)?;

        if hrp != self.hrp()? {
            return Err(CoreError::InvalidAddress(format!(
                "wrong bech32 prefix '{}' for '{}'",
                hrp, address
            )));
        }
        if version.to_u8() != 0 {
            return Err(CoreError::UnknownAddressType);
        }

        Ok(Address::SegWit(SegWitAddress::new(
            0,
            program,
            address.to_string(),
        )?))
    }

    fn convert_key_hash(
        &self,
        key_hash: &[u8],
        script_type: ScriptType,
    ) -> Result<Address, CoreError> {
        match script_type {
            ScriptType::P2wpkh | ScriptType::P2wsh => self.encode(key_hash),
            _ => Err(CoreError::UnknownAddressType),
        }
    }

    fn convert_public_key(
        &self,
        public_key: &PublicKey,
        script_type: ScriptType,
    ) -> Result<Address, CoreError> {
        match script_type {
            ScriptType::P2wpkh => self.encode(&public_key.key_hash),
            _ => Err(CoreError::UnknownAddressType),
        }
    }
}
