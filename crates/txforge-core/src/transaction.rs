//! Transaction model types.
//!
//! The mutable `Transaction` header, its `Input`s and `Output`s, and the
//! finalized `FullTransaction` whose constructor computes the
//! transaction id and stamps it into every child exactly once.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use txforge_primitives::hash::sha256d;
use txforge_primitives::TxHash;
use txforge_script::{Script, ScriptType};

use crate::keys::PublicKey;
use crate::serializer::TransactionSerializer;

/// Default sequence number indicating a finalized input.
pub const DEFAULT_SEQUENCE: u32 = 0xFFFF_FFFF;

/// A transaction header.
///
/// Carries the consensus fields (version, lock time), the local
/// timestamp, the segwit flag set during signing, and the derived
/// transaction id (double-SHA256 of the non-witness serialization,
/// zero until the transaction is finalized).
#[derive(Clone, Debug)]
pub struct Transaction {
    /// Transaction format version.
    pub version: i32,
    /// Lock time (block height or Unix timestamp when non-zero).
    pub lock_time: u32,
    /// Local creation time in Unix seconds.
    pub timestamp: u64,
    /// Set when any input carries witness data.
    pub seg_wit: bool,
    /// The transaction id in internal byte order; zero until computed.
    pub data_hash: TxHash,
}

impl Transaction {
    /// Create a header with the given version and lock time.
    ///
    /// The timestamp is taken from the system clock; the id stays zero
    /// until `FullTransaction::new` computes it.
    ///
    /// # Arguments
    /// * `version` - Transaction format version.
    /// * `lock_time` - Lock time field.
    ///
    /// # Returns
    /// A new `Transaction` header.
    pub fn new(version: i32, lock_time: u32) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Transaction {
            version,
            lock_time,
            timestamp,
            seg_wit: false,
            data_hash: TxHash::default(),
        }
    }
}

/// A transaction input referencing a previous output.
#[derive(Clone, Debug)]
pub struct Input {
    /// Transaction id of the output being spent, internal byte order.
    pub previous_output_tx_hash: TxHash,
    /// Index of the output within the previous transaction.
    pub previous_output_index: u32,
    /// The signature script (scriptSig). Empty until signed.
    pub signature_script: Script,
    /// Sequence number.
    pub sequence: u32,
    /// Witness stack items. Empty for non-witness inputs.
    pub witness_data: Vec<Vec<u8>>,
    /// Id of the owning transaction, stamped by `FullTransaction::new`.
    pub transaction_hash: TxHash,
}

impl Input {
    /// Create an input spending the given previous output.
    ///
    /// # Arguments
    /// * `previous_output_tx_hash` - Id of the transaction being spent.
    /// * `previous_output_index` - Output index within that transaction.
    /// * `signature_script` - Initial signature script (usually empty).
    /// * `sequence` - Sequence number.
    ///
    /// # Returns
    /// A new `Input` with no witness data.
    pub fn new(
        previous_output_tx_hash: TxHash,
        previous_output_index: u32,
        signature_script: Script,
        sequence: u32,
    ) -> Self {
        Input {
            previous_output_tx_hash,
            previous_output_index,
            signature_script,
            sequence,
            witness_data: Vec::new(),
            transaction_hash: TxHash::default(),
        }
    }
}

/// Builds a non-standard P2SH signature script from the signing data
/// items. Attached to an output when its redeem logic does not follow
/// the default push-encoding.
pub type SignatureScriptFunction = Arc<dyn Fn(&[Vec<u8>]) -> Vec<u8> + Send + Sync>;

/// A transaction output.
///
/// Carries the value and locking script plus the local annotations the
/// pipeline needs: script type tag, optional redeem script and key
/// hash, the owning public key path, the change flag, and the plugin
/// id/data pair for protocol outputs.
#[derive(Clone)]
pub struct Output {
    /// Value in satoshis.
    pub value: u64,
    /// The locking script (scriptPubKey).
    pub locking_script: Script,
    /// Index of this output within its transaction.
    pub index: u32,
    /// Id of the owning transaction, stamped by `FullTransaction::new`.
    pub transaction_hash: TxHash,
    /// Derivation path of the owning public key, when the output is ours.
    pub public_key_path: Option<String>,
    /// Locally derived change flag; not serialized.
    change_output: bool,
    /// The classified script type.
    pub script_type: ScriptType,
    /// Redeem script for P2SH, or witness script for P2WSH.
    pub redeem_script: Option<Script>,
    /// The committed key or script hash, when known.
    pub key_hash: Option<Vec<u8>>,
    /// The address string this output pays, when known.
    pub address: Option<String>,
    /// Owning plugin id for protocol outputs.
    pub plugin_id: Option<u8>,
    /// Serialized plugin payload for protocol outputs.
    pub plugin_data: Option<String>,
    /// Custom signature-script builder for non-standard redeem logic.
    pub signature_script_function: Option<SignatureScriptFunction>,
}

impl Output {
    /// Create an output with a value, locking script, and type tag.
    ///
    /// # Arguments
    /// * `value` - Value in satoshis.
    /// * `locking_script` - The locking script.
    /// * `script_type` - The classified script type.
    ///
    /// # Returns
    /// A new `Output` with no annotations set.
    pub fn new(value: u64, locking_script: Script, script_type: ScriptType) -> Self {
        Output {
            value,
            locking_script,
            index: 0,
            transaction_hash: TxHash::default(),
            public_key_path: None,
            change_output: false,
            script_type,
            redeem_script: None,
            key_hash: None,
            address: None,
            plugin_id: None,
            plugin_data: None,
            signature_script_function: None,
        }
    }

    /// Associate an owning public key with this output.
    ///
    /// Records the derivation path and derives the change flag from the
    /// key's chain (internal chain keys mark change outputs).
    ///
    /// # Arguments
    /// * `public_key` - The owning public key.
    pub fn set_public_key(&mut self, public_key: &PublicKey) {
        self.public_key_path = Some(public_key.path.clone());
        self.change_output = !public_key.external;
    }

    /// Whether this output returns change to the wallet.
    ///
    /// # Returns
    /// `true` if the owning key is on the internal chain.
    pub fn is_change(&self) -> bool {
        self.change_output
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("value", &self.value)
            .field("locking_script", &self.locking_script)
            .field("index", &self.index)
            .field("script_type", &self.script_type)
            .field("change", &self.change_output)
            .field("plugin_id", &self.plugin_id)
            .finish()
    }
}

/// A finalized transaction: header plus its inputs and outputs.
///
/// Construction is two-phase: the header, inputs, and outputs are built
/// first, then `new` computes the id over the non-witness serialization
/// and stamps it into the header and every child. After that the value
/// is treated as immutable.
#[derive(Clone, Debug)]
pub struct FullTransaction {
    /// The transaction header with its computed id.
    pub header: Transaction,
    /// Ordered inputs.
    pub inputs: Vec<Input>,
    /// Ordered outputs.
    pub outputs: Vec<Output>,
}

impl FullTransaction {
    /// Assemble a transaction and stamp its id into every child.
    ///
    /// The id is the double-SHA256 of the non-witness serialization
    /// regardless of segwit status.
    ///
    /// # Arguments
    /// * `header` - The transaction header.
    /// * `inputs` - The ordered inputs.
    /// * `outputs` - The ordered outputs.
    ///
    /// # Returns
    /// A finalized `FullTransaction`.
    pub fn new(mut header: Transaction, mut inputs: Vec<Input>, mut outputs: Vec<Output>) -> Self {
        let staged = FullTransaction {
            header: header.clone(),
            inputs: inputs.clone(),
            outputs: outputs.clone(),
        };
        let hash = TxHash::new(sha256d(&TransactionSerializer::serialize_without_witness(
            &staged,
        )));

        header.data_hash = hash;
        for input in &mut inputs {
            input.transaction_hash = hash;
        }
        for output in &mut outputs {
            output.transaction_hash = hash;
        }

        FullTransaction {
            header,
            inputs,
            outputs,
        }
    }
}
