//! Network parameters.
//!
//! Address version bytes, bech32 prefix, dust-relay fee rate, and the
//! sighash variant a chain requires. Injected at kit construction and
//! immutable thereafter; forked-coin networks set `SigHash::forked` so
//! even non-witness inputs use the value-committing digest.

/// The sighash configuration for a network.
///
/// `value` is the byte appended to every signature and committed in the
/// digest; `forked` forces the value-committing (BIP143-style) digest
/// for all inputs, as replay-protected forks require.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SigHash {
    /// The sighash type byte (e.g. 0x01 for ALL, 0x41 for ALL|FORKID).
    pub value: u8,
    /// Whether the network uses the forked digest for legacy inputs.
    pub forked: bool,
}

impl SigHash {
    /// Standard SIGHASH_ALL.
    pub const ALL: SigHash = SigHash {
        value: 0x01,
        forked: false,
    };

    /// SIGHASH_ALL | SIGHASH_FORKID, used by replay-protected forks.
    pub const ALL_FORKID: SigHash = SigHash {
        value: 0x41,
        forked: true,
    };
}

/// Immutable network parameters.
///
/// Supplies everything the address chain, dust calculator, and signer
/// need to know about the target chain.
#[derive(Clone, Debug)]
pub struct Network {
    /// Version byte for Base58Check P2PKH addresses.
    pub pub_key_hash: u8,
    /// Version byte for Base58Check P2SH addresses.
    pub script_hash: u8,
    /// Human-readable prefix for bech32 segwit addresses.
    pub bech32_prefix: String,
    /// Dust-relay fee rate in satoshis per kilobyte.
    pub dust_relay_tx_fee: u64,
    /// The sighash variant this network requires.
    pub sig_hash: SigHash,
    /// BIP44 coin type.
    pub coin_type: u32,
}

impl Network {
    /// Bitcoin mainnet parameters.
    ///
    /// # Returns
    /// A `Network` with mainnet version bytes, the `bc` prefix, and the
    /// standard 3000 sat/kB dust-relay rate.
    pub fn mainnet() -> Self {
        Network {
            pub_key_hash: 0x00,
            script_hash: 0x05,
            bech32_prefix: "bc".to_string(),
            dust_relay_tx_fee: 3000,
            sig_hash: SigHash::ALL,
            coin_type: 0,
        }
    }

    /// Bitcoin testnet parameters.
    ///
    /// # Returns
    /// A `Network` with testnet version bytes and the `tb` prefix.
    pub fn testnet() -> Self {
        Network {
            pub_key_hash: 0x6f,
            script_hash: 0xc4,
            bech32_prefix: "tb".to_string(),
            dust_relay_tx_fee: 3000,
            sig_hash: SigHash::ALL,
            coin_type: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_parameters() {
        let network = Network::mainnet();
        assert_eq!(network.pub_key_hash, 0x00);
        assert_eq!(network.script_hash, 0x05);
        assert_eq!(network.bech32_prefix, "bc");
        assert_eq!(network.sig_hash, SigHash::ALL);
        assert!(!network.sig_hash.forked);
    }

    #[test]
    fn test_forkid_sighash() {
        assert_eq!(SigHash::ALL_FORKID.value, 0x41);
        assert!(SigHash::ALL_FORKID.forked);
    }
}
