//! Restore-scan key aggregation.
//!
//! The excluded sync layer asks for the API keys and bloom-filter
//! elements a wallet's public keys imply. Converters are registered per
//! derivation scheme; plugins contribute their own keys through the
//! plugin manager.

use std::sync::{Arc, RwLock};

use txforge_script::ScriptType;

use crate::address::AddressConverterChain;
use crate::keys::PublicKey;

/// Derives the restore-scan keys one address scheme implies.
pub trait RestoreKeyConverter: Send + Sync {
    /// Address strings an API restore should scan for this key.
    ///
    /// # Arguments
    /// * `public_key` - The wallet public key.
    fn keys_for_api_restore(&self, public_key: &PublicKey) -> Vec<String>;

    /// Raw elements a bloom filter should match for this key.
    ///
    /// # Arguments
    /// * `public_key` - The wallet public key.
    fn bloom_filter_elements(&self, public_key: &PublicKey) -> Vec<Vec<u8>>;
}

/// Aggregates every registered converter's keys.
pub struct RestoreKeyConverterChain {
    converters: RwLock<Vec<Box<dyn RestoreKeyConverter>>>,
}

impl RestoreKeyConverterChain {
    /// Create an empty chain.
    ///
    /// # Returns
    /// A new `RestoreKeyConverterChain`.
    pub fn new() -> Self {
        RestoreKeyConverterChain {
            converters: RwLock::new(Vec::new()),
        }
    }

    /// Register a converter.
    ///
    /// # Arguments
    /// * `converter` - The converter to add.
    pub fn add(&self, converter: Box<dyn RestoreKeyConverter>) {
        if let Ok(mut converters) = self.converters.write() {
            converters.push(converter);
        }
    }

    /// All converters' API restore keys for a public key, deduplicated.
    ///
    /// # Arguments
    /// * `public_key` - The wallet public key.
    ///
    /// # Returns
    /// The merged key list in registration order.
    pub fn keys_for_api_restore(&self, public_key: &PublicKey) -> Vec<String> {
        let mut keys = Vec::new();
        if let Ok(converters) = self.converters.read() {
            for converter in converters.iter() {
                for key in converter.keys_for_api_restore(public_key) {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
        }
        keys
    }

    /// All converters' bloom-filter elements for a public key.
    ///
    /// # Arguments
    /// * `public_key` - The wallet public key.
    ///
    /// # Returns
    /// The merged element list in registration order.
    pub fn bloom_filter_elements(&self, public_key: &PublicKey) -> Vec<Vec<u8>> {
        let mut elements = Vec::new();
        if let Ok(converters) = self.converters.read() {
            for converter in converters.iter() {
                for element in converter.bloom_filter_elements(public_key) {
                    if !elements.contains(&element) {
                        elements.push(element);
                    }
                }
            }
        }
        elements
    }
}

impl Default for RestoreKeyConverterChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Restore keys for legacy (BIP44) wallets: the P2PKH address plus the
/// raw key material for bloom matching.
pub struct Bip44RestoreKeyConverter {
    address_converter: Arc<AddressConverterChain>,
}

impl Bip44RestoreKeyConverter {
    /// Create a BIP44 restore converter.
    ///
    /// # Arguments
    /// * `address_converter` - The address chain.
    ///
    /// # Returns
    /// A new `Bip44RestoreKeyConverter`.
    pub fn new(address_converter: Arc<AddressConverterChain>) -> Self {
        Bip44RestoreKeyConverter { address_converter }
    }
}

impl RestoreKeyConverter for Bip44RestoreKeyConverter {
    fn keys_for_api_restore(&self, public_key: &PublicKey) -> Vec<String> {
        self.address_converter
            .convert_public_key(public_key, ScriptType::P2pkh)
            .map(|address| vec![address.string_value().to_string()])
            .unwrap_or_default()
    }

    fn bloom_filter_elements(&self, public_key: &PublicKey) -> Vec<Vec<u8>> {
        vec![public_key.key_hash.clone(), public_key.raw.clone()]
    }
}

/// Restore keys for wrapped-segwit (BIP49) wallets: the P2WPKH-in-P2SH
/// address plus its script hash.
pub struct Bip49RestoreKeyConverter {
    address_converter: Arc<AddressConverterChain>,
}

impl Bip49RestoreKeyConverter {
    /// Create a BIP49 restore converter.
    ///
    /// # Arguments
    /// * `address_converter` - The address chain.
    ///
    /// # Returns
    /// A new `Bip49RestoreKeyConverter`.
    pub fn new(address_converter: Arc<AddressConverterChain>) -> Self {
        Bip49RestoreKeyConverter { address_converter }
    }
}

impl RestoreKeyConverter for Bip49RestoreKeyConverter {
    fn keys_for_api_restore(&self, public_key: &PublicKey) -> Vec<String> {
        self.address_converter
            .convert_public_key(public_key, ScriptType::P2wpkhSh)
            .map(|address| vec![address.string_value().to_string()])
            .unwrap_or_default()
    }

    fn bloom_filter_elements(&self, public_key: &PublicKey) -> Vec<Vec<u8>> {
        vec![public_key.script_hash_for_p2wpkh.clone()]
    }
}

/// Restore keys for native-segwit (BIP84) wallets: the P2WPKH address
/// plus the key hash.
pub struct Bip84RestoreKeyConverter {
    address_converter: Arc<AddressConverterChain>,
}

impl Bip84RestoreKeyConverter {
    /// Create a BIP84 restore converter.
    ///
    /// # Arguments
    /// * `address_converter` - The address chain.
    ///
    /// # Returns
    /// A new `Bip84RestoreKeyConverter`.
    pub fn new(address_converter: Arc<AddressConverterChain>) -> Self {
        Bip84RestoreKeyConverter { address_converter }
    }
}

impl RestoreKeyConverter for Bip84RestoreKeyConverter {
    fn keys_for_api_restore(&self, public_key: &PublicKey) -> Vec<String> {
        self.address_converter
            .convert_public_key(public_key, ScriptType::P2wpkh)
            .map(|address| vec![address.string_value().to_string()])
            .unwrap_or_default()
    }

    fn bloom_filter_elements(&self, public_key: &PublicKey) -> Vec<Vec<u8>> {
        vec![public_key.key_hash.clone()]
    }
}
