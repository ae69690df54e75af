//! Top-level build entry points.

use std::sync::Arc;

use crate::builder::TransactionBuilder;
use crate::keys::HashForSign;
use crate::plugin::PluginDataMap;
use crate::serializer::TransactionSerializer;
use crate::sorter::TransactionDataSortType;
use crate::CoreError;

/// Produces raw signed transactions or the digests to sign externally.
pub struct TransactionCreator {
    transaction_builder: Arc<TransactionBuilder>,
}

impl TransactionCreator {
    /// Create a transaction creator.
    ///
    /// # Arguments
    /// * `transaction_builder` - The assembly pipeline.
    ///
    /// # Returns
    /// A new `TransactionCreator`.
    pub fn new(transaction_builder: Arc<TransactionBuilder>) -> Self {
        TransactionCreator {
            transaction_builder,
        }
    }

    /// Build and serialize a fully signed transaction.
    ///
    /// # Arguments
    /// * `to_address` - Destination address string.
    /// * `value` - Value to send in satoshis.
    /// * `fee_rate` - Fee rate in satoshis per virtual byte.
    /// * `sender_pay` - Whether the sender pays the fee on top.
    /// * `sort_type` - Input/output ordering.
    /// * `signatures` - One raw signature per input, in input order.
    /// * `change_script` - Optional raw change locking script.
    /// * `plugin_data` - Plugin payloads for this build.
    ///
    /// # Returns
    /// The canonical wire bytes of the signed transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn create_raw_transaction(
        &self,
        to_address: &str,
        value: u64,
        fee_rate: u64,
        sender_pay: bool,
        sort_type: TransactionDataSortType,
        signatures: &[Vec<u8>],
        change_script: Option<&[u8]>,
        plugin_data: &PluginDataMap,
    ) -> Result<Vec<u8>, CoreError> {
        let transaction = self.transaction_builder.build_transaction(
            to_address,
            value,
            fee_rate,
            sender_pay,
            sort_type,
            signatures,
            change_script,
            plugin_data,
        )?;

        Ok(TransactionSerializer::serialize(&transaction))
    }

    /// Build a draft and return the digests an external signer must
    /// sign, one per input in input order.
    ///
    /// # Arguments
    /// As `create_raw_transaction`, minus the signatures.
    ///
    /// # Returns
    /// The ordered (digest, public key) pairs.
    #[allow(clippy::too_many_arguments)]
    pub fn create_raw_hashes_to_sign(
        &self,
        to_address: &str,
        value: u64,
        fee_rate: u64,
        sender_pay: bool,
        sort_type: TransactionDataSortType,
        change_script: Option<&[u8]>,
        plugin_data: &PluginDataMap,
    ) -> Result<Vec<HashForSign>, CoreError> {
        self.transaction_builder.build_transaction_to_sign(
            to_address,
            value,
            fee_rate,
            sender_pay,
            sort_type,
            change_script,
            plugin_data,
        )
    }
}
