//! The four-stage transaction assembly pipeline.
//!
//! Stages always run in the same order: recipient, inputs, outputs,
//! signatures. Each stage mutates the draft through an exclusive
//! borrow; a draft that has not passed every stage is never serialized.

mod input_setter;
mod output_setter;
mod recipient_setter;

pub use input_setter::InputSetter;
pub use output_setter::OutputSetter;
pub use recipient_setter::RecipientSetter;

use std::sync::Arc;

use crate::keys::HashForSign;
use crate::mutable::MutableTransaction;
use crate::plugin::PluginDataMap;
use crate::signer::TransactionSigner;
use crate::sorter::TransactionDataSortType;
use crate::transaction::FullTransaction;
use crate::CoreError;

/// Drives the pipeline from a send request to a finalized transaction.
pub struct TransactionBuilder {
    recipient_setter: Arc<RecipientSetter>,
    input_setter: Arc<InputSetter>,
    output_setter: OutputSetter,
    signer: TransactionSigner,
}

impl TransactionBuilder {
    /// Create a builder over the four pipeline stages.
    ///
    /// # Arguments
    /// * `recipient_setter` - Stage one.
    /// * `input_setter` - Stage two.
    /// * `output_setter` - Stage three.
    /// * `signer` - Stage four.
    ///
    /// # Returns
    /// A new `TransactionBuilder`.
    pub fn new(
        recipient_setter: Arc<RecipientSetter>,
        input_setter: Arc<InputSetter>,
        output_setter: OutputSetter,
        signer: TransactionSigner,
    ) -> Self {
        TransactionBuilder {
            recipient_setter,
            input_setter,
            output_setter,
            signer,
        }
    }

    /// Build a fully signed transaction from detached signatures.
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
    /// The finalized transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn build_transaction(
        &self,
        to_address: &str,
        value: u64,
        fee_rate: u64,
        sender_pay: bool,
        sort_type: TransactionDataSortType,
        signatures: &[Vec<u8>],
        change_script: Option<&[u8]>,
        plugin_data: &PluginDataMap,
    ) -> Result<FullTransaction, CoreError> {
        let mut mutable_transaction = MutableTransaction::new();

        self.recipient_setter.set_recipient(
            &mut mutable_transaction,
            to_address,
            value,
            plugin_data,
            false,
        )?;
        self.input_setter.set_inputs(
            &mut mutable_transaction,
            fee_rate,
            sender_pay,
            sort_type,
            change_script,
        )?;
        self.output_setter
            .set_outputs(&mut mutable_transaction, sort_type);
        self.signer.sign(&mut mutable_transaction, signatures)?;

        Ok(mutable_transaction.build())
    }

    /// Build a draft and return the digests an external signer must sign.
    ///
    /// Runs the first three stages, then computes one signature hash per
    /// input instead of placing signatures.
    ///
    /// # Arguments
    /// As `build_transaction`, minus the signatures.
    ///
    /// # Returns
    /// The ordered (digest, public key) pairs.
    #[allow(clippy::too_many_arguments)]
    pub fn build_transaction_to_sign(
        &self,
        to_address: &str,
        value: u64,
        fee_rate: u64,
        sender_pay: bool,
        sort_type: TransactionDataSortType,
        change_script: Option<&[u8]>,
        plugin_data: &PluginDataMap,
    ) -> Result<Vec<HashForSign>, CoreError> {
        let mut mutable_transaction = MutableTransaction::new();

        self.recipient_setter.set_recipient(
            &mut mutable_transaction,
            to_address,
            value,
            plugin_data,
            false,
        )?;
        self.input_setter.set_inputs(
            &mut mutable_transaction,
            fee_rate,
            sender_pay,
            sort_type,
            change_script,
        )?;
        self.output_setter
            .set_outputs(&mut mutable_transaction, sort_type);

        self.signer.hashes_to_sign(&mutable_transaction)
    }
}
