//! Exact fee estimation through the real pipeline.
//!
//! An estimate runs the same recipient and input stages a real build
//! runs (against a synthetic change-key address when no destination is
//! given), so it reflects the exact output set — plugin-injected
//! outputs and dust folding included — rather than a formula.

use std::sync::Arc;

use txforge_script::ScriptType;

use crate::address::AddressConverterChain;
use crate::builder::{InputSetter, RecipientSetter};
use crate::keys::PublicKeySource;
use crate::mutable::MutableTransaction;
use crate::plugin::PluginDataMap;
use crate::sorter::TransactionDataSortType;
use crate::CoreError;

/// Computes the fee a send request would pay.
pub struct TransactionFeeCalculator {
    recipient_setter: Arc<RecipientSetter>,
    input_setter: Arc<InputSetter>,
    address_converter: Arc<AddressConverterChain>,
    public_key_source: Arc<dyn PublicKeySource>,
    change_script_type: ScriptType,
}

impl TransactionFeeCalculator {
    /// Create a fee calculator over the pipeline's first two stages.
    ///
    /// # Arguments
    /// * `recipient_setter` - Stage one.
    /// * `input_setter` - Stage two.
    /// * `address_converter` - Synthesizes the sample destination.
    /// * `public_key_source` - Supplies the sample destination key.
    /// * `change_script_type` - Script type of the sample destination.
    ///
    /// # Returns
    /// A new `TransactionFeeCalculator`.
    pub fn new(
        recipient_setter: Arc<RecipientSetter>,
        input_setter: Arc<InputSetter>,
        address_converter: Arc<AddressConverterChain>,
        public_key_source: Arc<dyn PublicKeySource>,
        change_script_type: ScriptType,
    ) -> Self {
        TransactionFeeCalculator {
            recipient_setter,
            input_setter,
            address_converter,
            public_key_source,
            change_script_type,
        }
    }

    fn sample_address(&self) -> Result<String, CoreError> {
        let public_key = self.public_key_source.change_public_key()?;
        Ok(self
            .address_converter
            .convert_public_key(&public_key, self.change_script_type)?
            .string_value()
            .to_string())
    }

    /// The exact fee for a send of `value`.
    ///
    /// Builds a throwaway draft with checks skipped and returns the
    /// difference between what the inputs supply and what the recipient
    /// and change outputs receive.
    ///
    /// # Arguments
    /// * `value` - The requested send value in satoshis.
    /// * `fee_rate` - Fee rate in satoshis per virtual byte.
    /// * `sender_pay` - Whether the sender pays the fee on top.
    /// * `to_address` - Destination, or `None` for a synthetic one.
    /// * `change_script` - Optional raw change locking script.
    /// * `plugin_data` - Plugin payloads for the build.
    ///
    /// # Returns
    /// The fee in satoshis.
    pub fn fee(
        &self,
        value: u64,
        fee_rate: u64,
        sender_pay: bool,
        to_address: Option<&str>,
        change_script: Option<&[u8]>,
        plugin_data: &PluginDataMap,
    ) -> Result<u64, CoreError> {
        let mut mutable_transaction = MutableTransaction::new();

        let destination = match to_address {
            Some(address) => address.to_string(),
            None => self.sample_address()?,
        };

        self.recipient_setter.set_recipient(
            &mut mutable_transaction,
            &destination,
            value,
            plugin_data,
            true,
        )?;
        self.input_setter.set_inputs(
            &mut mutable_transaction,
            fee_rate,
            sender_pay,
            TransactionDataSortType::None,
            change_script,
        )?;

        let inputs_total: u64 = mutable_transaction
            .inputs_to_sign
            .iter()
            .map(|input_to_sign| input_to_sign.previous_output.value)
            .sum();
        let outputs_total =
            mutable_transaction.recipient_value + mutable_transaction.change_value;

        Ok(inputs_total.abs_diff(outputs_total))
    }
}
