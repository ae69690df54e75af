//! Address types and the converter chain.
//!
//! Addresses are polymorphic over the Base58Check family (P2PKH, P2SH)
//! and the segwit family (v0 bech32, v1 bech32m). The converter chain
//! tries registered converters in order, so newer address families can
//! be prepended without touching existing converters; registration
//! order is observable behavior.

mod base58;
mod segwit;
mod taproot;

pub use base58::Base58AddressConverter;
pub use segwit::SegWitBech32AddressConverter;
pub use taproot::TaprootAddressConverter;

use std::fmt;
use std::sync::RwLock;

use txforge_script::{Script, ScriptType};

use crate::keys::PublicKey;
use crate::CoreError;

/// What a Base58Check address commits to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressKind {
    /// A public key hash (P2PKH).
    PubKeyHash,
    /// A script hash (P2SH).
    ScriptHash,
}

/// A legacy Base58Check address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Base58Address {
    /// Whether the hash is a key hash or a script hash.
    pub kind: AddressKind,
    /// The committed 20-byte hash.
    pub hash: Vec<u8>,
    /// The Base58Check string form.
    pub string: String,
}

/// A segwit address (bech32 for v0, bech32m for v1+).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegWitAddress {
    /// The witness version.
    pub version: u8,
    /// The witness program.
    pub program: Vec<u8>,
    /// The bech32/bech32m string form.
    pub string: String,
    locking_script: Script,
}

impl SegWitAddress {
    /// Create a segwit address, validating the version and building the
    /// locking script.
    ///
    /// # Arguments
    /// * `version` - The witness version (0-16).
    /// * `program` - The witness program bytes.
    /// * `string` - The encoded address string.
    ///
    /// # Returns
    /// A new `SegWitAddress`, or an error for an invalid version.
    pub fn new(version: u8, program: Vec<u8>, string: String) -> Result<Self, CoreError> {
        let locking_script = Script::witness_lock(version, &program)?;
        Ok(SegWitAddress {
            version,
            program,
            string,
            locking_script,
        })
    }
}

/// A decoded address of any supported family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address {
    /// Legacy Base58Check address.
    Base58(Base58Address),
    /// Native segwit address.
    SegWit(SegWitAddress),
}

impl Address {
    /// The script type this address pays to.
    ///
    /// # Returns
    /// The classified `ScriptType`.
    pub fn script_type(&self) -> ScriptType {
        match self {
            Address::Base58(address) => match address.kind {
                AddressKind::PubKeyHash => ScriptType::P2pkh,
                AddressKind::ScriptHash => ScriptType::P2sh,
            },
            Address::SegWit(address) => match (address.version, address.program.len()) {
                (0, 20) => ScriptType::P2wpkh,
                (0, _) => ScriptType::P2wsh,
                _ => ScriptType::P2tr,
            },
        }
    }

    /// The committed hash or witness program.
    ///
    /// # Returns
    /// The payload bytes.
    pub fn payload(&self) -> &[u8] {
        match self {
            Address::Base58(address) => &address.hash,
            Address::SegWit(address) => &address.program,
        }
    }

    /// The human-readable string form.
    ///
    /// # Returns
    /// The address string.
    pub fn string_value(&self) -> &str {
        match self {
            Address::Base58(address) => &address.string,
            Address::SegWit(address) => &address.string,
        }
    }

    /// The locking script this address implies.
    ///
    /// # Returns
    /// The scriptPubKey paying to this address.
    pub fn locking_script(&self) -> Script {
        match self {
            Address::Base58(address) => match address.kind {
                AddressKind::PubKeyHash => Script::p2pkh_lock(&address.hash),
                AddressKind::ScriptHash => Script::p2sh_lock(&address.hash),
            },
            Address::SegWit(address) => address.locking_script.clone(),
        }
    }
}

impl fmt::Display for Address {
    /// Display the address as its string form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.string_value())
    }
}

/// One strategy in the address chain.
///
/// A converter decodes the strings of its family and synthesizes
/// addresses for the script types it owns; everything else fails with
/// `UnknownAddressType` so the chain can move on.
pub trait AddressConverter: Send + Sync {
    /// Decode and classify an address string.
    ///
    /// # Arguments
    /// * `address` - The address string.
    fn convert(&self, address: &str) -> Result<Address, CoreError>;

    /// Synthesize an address for a key or script hash.
    ///
    /// # Arguments
    /// * `key_hash` - The hash to commit.
    /// * `script_type` - The target script type.
    fn convert_key_hash(&self, key_hash: &[u8], script_type: ScriptType)
        -> Result<Address, CoreError>;

    /// Synthesize an address for a public key.
    ///
    /// # Arguments
    /// * `public_key` - The key to pay.
    /// * `script_type` - The target script type.
    fn convert_public_key(
        &self,
        public_key: &PublicKey,
        script_type: ScriptType,
    ) -> Result<Address, CoreError>;
}

/// Ordered chain of address converters.
///
/// Converters are consulted in registration order; `prepend` puts a
/// converter ahead of the existing ones. The first converter to accept
/// wins. If every converter declines, decoding fails with
/// `UnknownAddressType` (or the most specific decode error seen).
pub struct AddressConverterChain {
    converters: RwLock<Vec<Box<dyn AddressConverter>>>,
}

impl AddressConverterChain {
    /// Create an empty chain.
    ///
    /// # Returns
    /// A new `AddressConverterChain`.
    pub fn new() -> Self {
        AddressConverterChain {
            converters: RwLock::new(Vec::new()),
        }
    }

    /// Append a converter to the end of the chain.
    ///
    /// # Arguments
    /// * `converter` - The converter to register.
    pub fn add(&self, converter: Box<dyn AddressConverter>) {
        if let Ok(mut converters) = self.converters.write() {
            converters.push(converter);
        }
    }

    /// Put a converter ahead of the existing ones.
    ///
    /// # Arguments
    /// * `converter` - The converter to register first.
    pub fn prepend(&self, converter: Box<dyn AddressConverter>) {
        if let Ok(mut converters) = self.converters.write() {
            converters.insert(0, converter);
        }
    }

    fn try_each<F>(&self, attempt: F) -> Result<Address, CoreError>
    where
        F: Fn(&dyn AddressConverter) -> Result<Address, CoreError>,
    {
        let converters = self
            .converters
            .read()
            .map_err(|_| CoreError::UnknownAddressType)?;

        let mut decode_error: Option<CoreError> = None;
        for converter in converters.iter() {
            match attempt(converter.as_ref()) {
                Ok(address) => return Ok(address),
                Err(CoreError::UnknownAddressType) => {}
                Err(error) => {
                    if decode_error.is_none() {
                        decode_error = Some(error);
                    }
                }
            }
        }
        Err(decode_error.unwrap_or(CoreError::UnknownAddressType))
    }

    /// Decode an address string through the chain.
    ///
    /// # Arguments
    /// * `address` - The address string.
    ///
    /// # Returns
    /// The first successful decode, or the most specific error seen.
    pub fn convert(&self, address: &str) -> Result<Address, CoreError> {
        self.try_each(|converter| converter.convert(address))
    }

    /// Synthesize an address for a hash through the chain.
    ///
    /// # Arguments
    /// * `key_hash` - The hash to commit.
    /// * `script_type` - The target script type.
    pub fn convert_key_hash(
        &self,
        key_hash: &[u8],
        script_type: ScriptType,
    ) -> Result<Address, CoreError> {
        self.try_each(|converter| converter.convert_key_hash(key_hash, script_type))
    }

    /// Synthesize an address for a public key through the chain.
    ///
    /// # Arguments
    /// * `public_key` - The key to pay.
    /// * `script_type` - The target script type.
    pub fn convert_public_key(
        &self,
        public_key: &PublicKey,
        script_type: ScriptType,
    ) -> Result<Address, CoreError> {
        self.try_each(|converter| converter.convert_public_key(public_key, script_type))
    }
}

impl Default for AddressConverterChain {
    fn default() -> Self {
        Self::new()
    }
}
