//! Public keys and the external key source.
//!
//! The kit never derives or holds private keys. `PublicKey` carries the
//! derivation coordinates and the precomputed hashes the pipeline needs;
//! `PublicKeySource` is the narrow interface an external key manager
//! implements to hand keys in.

use std::sync::Arc;

use txforge_primitives::hash::hash160;
use txforge_script::Script;

use crate::CoreError;

/// A derived public key with precomputed hashes.
///
/// `key_hash` is hash160 of the raw key (P2PKH/P2WPKH payload);
/// `script_hash_for_p2wpkh` is hash160 of the wrapping witness script,
/// the payload of a P2WPKH-in-P2SH address. Immutable once created and
/// shared by reference between outputs and the signer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    /// BIP44 account index.
    pub account: u32,
    /// Address index within the chain.
    pub index: u32,
    /// `true` for the external (receive) chain, `false` for change.
    pub external: bool,
    /// Derivation path fragment, `account/chain/index`.
    pub path: String,
    /// The raw public key bytes (compressed or uncompressed).
    pub raw: Vec<u8>,
    /// hash160 of the raw key.
    pub key_hash: Vec<u8>,
    /// hash160 of the P2WPKH script wrapping `key_hash`.
    pub script_hash_for_p2wpkh: Vec<u8>,
}

impl PublicKey {
    /// Create a public key from derivation coordinates and raw bytes.
    ///
    /// Precomputes the key hash and the wrapped-segwit script hash.
    ///
    /// # Arguments
    /// * `account` - BIP44 account index.
    /// * `index` - Address index.
    /// * `external` - `true` for the receive chain, `false` for change.
    /// * `raw` - The raw public key bytes.
    ///
    /// # Returns
    /// A new `PublicKey`.
    pub fn new(account: u32, index: u32, external: bool, raw: Vec<u8>) -> Self {
        let key_hash = hash160(&raw).to_vec();
        let wpkh_script = Script::witness_lock(0, &key_hash)
            .map(Script::into_bytes)
            .unwrap_or_default();
        let script_hash_for_p2wpkh = hash160(&wpkh_script).to_vec();
        let path = format!("{}/{}/{}", account, if external { 1 } else { 0 }, index);

        PublicKey {
            account,
            index,
            external,
            path,
            raw,
            key_hash,
            script_hash_for_p2wpkh,
        }
    }
}

/// A signature-hash digest paired with the key that must sign it.
///
/// Returned by the external-signer flow so the caller knows which key
/// each digest belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashForSign {
    /// The 32-byte digest to sign.
    pub hash: [u8; 32],
    /// The public key whose private counterpart must produce the signature.
    pub public_key: PublicKey,
}

/// Read-only source of wallet public keys.
///
/// Implemented by the excluded key-management layer. The kit asks for
/// receive and change keys when synthesizing addresses; it never walks
/// gap limits or derives keys itself.
pub trait PublicKeySource: Send + Sync {
    /// Return the current change-chain public key.
    fn change_public_key(&self) -> Result<PublicKey, CoreError>;

    /// Return the current receive-chain public key.
    fn receive_public_key(&self) -> Result<PublicKey, CoreError>;

    /// Look up a public key by its derivation path fragment.
    ///
    /// # Arguments
    /// * `path` - The `account/chain/index` path.
    fn public_key_by_path(&self, path: &str) -> Result<PublicKey, CoreError>;
}

/// A key source backed by one fixed public key.
///
/// The degenerate variant used when the wallet tracks a single key:
/// every request returns the same key.
pub struct SinglePublicKeySource {
    public_key: PublicKey,
}

impl SinglePublicKeySource {
    /// Create a source around one raw public key.
    ///
    /// # Arguments
    /// * `raw` - The raw public key bytes.
    ///
    /// # Returns
    /// A new `SinglePublicKeySource`.
    pub fn new(raw: Vec<u8>) -> Self {
        SinglePublicKeySource {
            public_key: PublicKey::new(0, 0, true, raw),
        }
    }

    /// Wrap the source in an `Arc` for sharing with the kit.
    ///
    /// # Returns
    /// An `Arc<dyn PublicKeySource>`.
    pub fn shared(raw: Vec<u8>) -> Arc<dyn PublicKeySource> {
        Arc::new(Self::new(raw))
    }
}

impl PublicKeySource for SinglePublicKeySource {
    fn change_public_key(&self) -> Result<PublicKey, CoreError> {
        Ok(self.public_key.clone())
    }

    fn receive_public_key(&self) -> Result<PublicKey, CoreError> {
        Ok(self.public_key.clone())
    }

    fn public_key_by_path(&self, _path: &str) -> Result<PublicKey, CoreError> {
        Ok(self.public_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBKEY_HEX: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    /// Key hashes are precomputed at construction.
    #[test]
    fn test_public_key_hashes() {
        let raw = hex::decode(PUBKEY_HEX).unwrap();
        let key = PublicKey::new(0, 0, true, raw);
        assert_eq!(
            hex::encode(&key.key_hash),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
        // hash160 of 0014<key_hash>, the nested-segwit redeem script hash.
        assert_eq!(key.script_hash_for_p2wpkh.len(), 20);
        assert_ne!(key.script_hash_for_p2wpkh, key.key_hash);
    }

    /// The path encodes account, chain, and index.
    #[test]
    fn test_path_format() {
        let raw = hex::decode(PUBKEY_HEX).unwrap();
        let external = PublicKey::new(2, 7, true, raw.clone());
        assert_eq!(external.path, "2/1/7");
        let internal = PublicKey::new(2, 7, false, raw);
        assert_eq!(internal.path, "2/0/7");
    }

    /// The single-key source returns the same key for every request.
    #[test]
    fn test_single_source() {
        let raw = hex::decode(PUBKEY_HEX).unwrap();
        let source = SinglePublicKeySource::new(raw);
        let a = source.receive_public_key().unwrap();
        let b = source.change_public_key().unwrap();
        let c = source.public_key_by_path("0/0/5").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }
}
