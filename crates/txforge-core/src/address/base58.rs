//! Base58Check address converter.
//!
//! Handles the legacy families: P2PKH under the network's pub-key-hash
//! version byte and P2SH under the script-hash byte, with the
//! double-SHA256 checksum. Wrapped segwit (P2WPKH-in-P2SH) synthesizes
//! through the script-hash path.

use txforge_primitives::hash::sha256d;
use txforge_script::ScriptType;

use crate::address::{Address, AddressConverter, AddressKind, Base58Address};
use crate::keys::PublicKey;
use crate::CoreError;

/// Length of a Base58Check payload: version, 20-byte hash, 4-byte checksum.
const DECODED_LENGTH: usize = 25;

/// Converter for Base58Check addresses.
pub struct Base58AddressConverter {
    address_version: u8,
    address_script_version: u8,
}

impl Base58AddressConverter {
    /// Create a converter for a network's version bytes.
    ///
    /// # Arguments
    /// * `address_version` - P2PKH version byte.
    /// * `address_script_version` - P2SH version byte.
    ///
    /// # Returns
    /// A new `Base58AddressConverter`.
    pub fn new(address_version: u8, address_script_version: u8) -> Self {
        Base58AddressConverter {
            address_version,
            address_script_version,
        }
    }

    fn encode(&self, kind: AddressKind, hash: &[u8]) -> Address {
        let version = match kind {
            AddressKind::PubKeyHash => self.address_version,
            AddressKind::ScriptHash => self.address_script_version,
        };

        let mut payload = Vec::with_capacity(DECODED_LENGTH);
        payload.push(version);
        payload.extend_from_slice(hash);
        let checksum = sha256d(&payload);
        payload.extend_from_slice(&checksum[..4]);

        Address::Base58(Base58Address {
            kind,
            hash: hash.to_vec(),
            string: bs58::encode(&payload).into_string(),
        })
    }
}

impl AddressConverter for Base58AddressConverter {
    fn convert(&self, address: &str) -> Result<Address, CoreError> {
        let decoded = bs58::decode(address)
            .into_vec()
            .map_err(|_| CoreError::UnknownAddressType)?;

        if decoded.len() != DECODED_LENGTH {
            return Err(CoreError::InvalidAddress(format!(
                "invalid length {} for '{}'",
                decoded.len(),
                address
            )));
        }

        // Last 4 bytes must equal sha256d of the first 21.
        let checksum = sha256d(&decoded[..21]);
        if decoded[21..] != checksum[..4] {
            return Err(CoreError::InvalidAddress(format!(
                "checksum mismatch for '{}'",
                address
            )));
        }

        let kind = if decoded[0] == self.address_version {
            AddressKind::PubKeyHash
        } else if decoded[0] == self.address_script_version {
            AddressKind::ScriptHash
        } else {
            return Err(CoreError::InvalidAddress(format!(
                "wrong address version 0x{:02x} for '{}'",
                decoded[0], address
            )));
        };

        Ok(Address::Base58(Base58Address {
            kind,
            hash: decoded[1..21].to_vec(),
            string: address.to_string(),
        }))
    }

    fn convert_key_hash(
        &self,
        key_hash: &[u8],
        script_type: ScriptType,
    ) -> Result<Address, CoreError> {
        let kind = match script_type {
            ScriptType::P2pkh | ScriptType::P2pk => AddressKind::PubKeyHash,
            ScriptType::P2sh | ScriptType::P2wpkhSh => AddressKind::ScriptHash,
            _ => return Err(CoreError::UnknownAddressType),
        };
        Ok(self.encode(kind, key_hash))
    }

    fn convert_public_key(
        &self,
        public_key: &PublicKey,
        script_type: ScriptType,
    ) -> Result<Address, CoreError> {
        let hash = if script_type == ScriptType::P2wpkhSh {
            &public_key.script_hash_for_p2wpkh
        } else {
            &public_key.key_hash
        };
        self.convert_key_hash(hash, script_type)
    }
}
