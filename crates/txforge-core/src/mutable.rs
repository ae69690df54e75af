//! The transaction draft threaded through the assembly pipeline.
//!
//! A `MutableTransaction` exists for the duration of one build call.
//! The four pipeline stages populate it in order; `build` consumes it
//! into a finalized `FullTransaction`. It is never shared between
//! calls and never serialized in a partial state.

use txforge_script::Script;

use crate::address::Address;
use crate::keys::PublicKey;
use crate::transaction::{FullTransaction, Input, Output, Transaction};

/// An input staged for signing, paired with the output it spends and
/// that output's public key.
#[derive(Clone, Debug)]
pub struct InputToSign {
    /// The input under construction.
    pub input: Input,
    /// The previous output being spent.
    pub previous_output: Output,
    /// The public key that owns the previous output.
    pub previous_output_public_key: PublicKey,
}

/// A one-build transaction draft.
pub struct MutableTransaction {
    /// The header under construction.
    pub transaction: Transaction,

    pub(crate) recipient_address: Option<Address>,
    /// Value the recipient output will carry.
    pub recipient_value: u64,

    pub(crate) change_address: Option<Address>,
    pub(crate) change_public_key: Option<PublicKey>,
    pub(crate) change_script: Option<Script>,
    /// Value the change output will carry; zero when no change is due.
    pub change_value: u64,

    pub(crate) plugin_data: Vec<(u8, Vec<u8>)>,
    pub(crate) outputs: Vec<Output>,

    /// Inputs staged for signing, in final transaction order.
    pub inputs_to_sign: Vec<InputToSign>,
}

impl MutableTransaction {
    /// Create an empty draft with a version-2 header.
    ///
    /// # Returns
    /// A new `MutableTransaction`.
    pub fn new() -> Self {
        MutableTransaction {
            transaction: Transaction::new(2, 0),
            recipient_address: None,
            recipient_value: 0,
            change_address: None,
            change_public_key: None,
            change_script: None,
            change_value: 0,
            plugin_data: Vec::new(),
            outputs: Vec::new(),
            inputs_to_sign: Vec::new(),
        }
    }

    /// The recipient address, once the recipient stage has run.
    ///
    /// # Returns
    /// The converted destination address, if set.
    pub fn recipient_address(&self) -> Option<&Address> {
        self.recipient_address.as_ref()
    }

    /// Append a plugin payload to the draft's data-carrier output.
    ///
    /// Payloads accumulate in registration order and are emitted as one
    /// null-data output tagged with each plugin's id.
    ///
    /// # Arguments
    /// * `plugin_id` - The owning plugin's one-byte id.
    /// * `data` - The serialized payload (already push-encoded).
    pub fn add_plugin_data(&mut self, plugin_id: u8, data: Vec<u8>) {
        self.plugin_data.push((plugin_id, data));
    }

    /// Serialized size of the pending data-carrier output script.
    ///
    /// One byte for OP_RETURN plus, per payload, a one-byte push of the
    /// plugin id, the id byte, and the payload bytes. Zero when no
    /// plugin data is staged.
    ///
    /// # Returns
    /// The script byte length the size calculator should account for.
    pub fn plugin_data_output_size(&self) -> usize {
        if self.plugin_data.is_empty() {
            return 0;
        }
        1 + self
            .plugin_data
            .iter()
            .map(|(_, data)| 2 + data.len())
            .sum::<usize>()
    }

    /// Append a staged input.
    ///
    /// # Arguments
    /// * `input_to_sign` - The input with its previous-output context.
    pub fn add_input_to_sign(&mut self, input_to_sign: InputToSign) {
        self.inputs_to_sign.push(input_to_sign);
    }

    /// The finalized output list, once the output stage has run.
    ///
    /// # Returns
    /// The ordered outputs.
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Consume the draft into a finalized transaction.
    ///
    /// Computes the transaction id and stamps it into every input and
    /// output.
    ///
    /// # Returns
    /// The immutable `FullTransaction`.
    pub fn build(self) -> FullTransaction {
        let inputs: Vec<Input> = self
            .inputs_to_sign
            .into_iter()
            .map(|input_to_sign| input_to_sign.input)
            .collect();
        FullTransaction::new(self.transaction, inputs, self.outputs)
    }
}

impl Default for MutableTransaction {
    fn default() -> Self {
        Self::new()
    }
}
