//! Stage three: finalize the output list.

use txforge_script::{opcodes, Script};

use crate::address::Address;
use crate::mutable::MutableTransaction;
use crate::sorter::{TransactionDataSortType, TransactionDataSorter};
use crate::transaction::Output;

/// Assembles the recipient, change, and data-carrier outputs, applies
/// the requested ordering, and assigns final output indexes.
pub struct OutputSetter;

impl OutputSetter {
    /// Create the output stage.
    ///
    /// # Returns
    /// A new `OutputSetter`.
    pub fn new() -> Self {
        OutputSetter
    }

    /// Build the draft's final output list.
    ///
    /// # Arguments
    /// * `mutable_transaction` - The draft with inputs and change set.
    /// * `sort_type` - Ordering applied to the outputs.
    pub fn set_outputs(
        &self,
        mutable_transaction: &mut MutableTransaction,
        sort_type: TransactionDataSortType,
    ) {
        let mut outputs = Vec::new();

        if let Some(address) = mutable_transaction.recipient_address.as_ref() {
            outputs.push(Self::output_for_address(
                address,
                mutable_transaction.recipient_value,
            ));
        }

        if let Some(address) = mutable_transaction.change_address.as_ref() {
            let mut output = Self::output_for_address(address, mutable_transaction.change_value);
            if let Some(public_key) = mutable_transaction.change_public_key.as_ref() {
                output.set_public_key(public_key);
            }
            outputs.push(output);
        } else if let Some(script) = mutable_transaction.change_script.as_ref() {
            let script_type = script.script_type();
            let mut output = Output::new(
                mutable_transaction.change_value,
                script.clone(),
                script_type,
            );
            output.key_hash = script.standard_payload();
            outputs.push(output);
        }

        if !mutable_transaction.plugin_data.is_empty() {
            outputs.push(Self::null_data_output(&mutable_transaction.plugin_data));
        }

        let sorter = TransactionDataSorter::new(sort_type);
        let mut outputs = sorter.sort_outputs(outputs);
        for (index, output) in outputs.iter_mut().enumerate() {
            output.index = index as u32;
        }
        mutable_transaction.outputs = outputs;
    }

    fn output_for_address(address: &Address, value: u64) -> Output {
        let mut output = Output::new(value, address.locking_script(), address.script_type());
        output.address = Some(address.string_value().to_string());
        output.key_hash = Some(address.payload().to_vec());
        output
    }

    /// One zero-value OP_RETURN output carrying every staged plugin
    /// payload, each led by a one-byte push of its plugin id.
    fn null_data_output(plugin_data: &[(u8, Vec<u8>)]) -> Output {
        let mut bytes = vec![opcodes::OP_RETURN];
        for (plugin_id, data) in plugin_data {
            bytes.push(0x01);
            bytes.push(*plugin_id);
            bytes.extend_from_slice(data);
        }
        let script = Script::from_bytes(&bytes);
        let mut output = Output::new(0, script, txforge_script::ScriptType::NullData);
        output.plugin_id = plugin_data.first().map(|(id, _)| *id);
        output
    }
}

impl Default for OutputSetter {
    fn default() -> Self {
        Self::new()
    }
}
