//! Stage two: select covering UTXOs and attach the change output.

use std::sync::Arc;

use txforge_script::{Script, ScriptType};

use crate::address::AddressConverterChain;
use crate::keys::PublicKeySource;
use crate::mutable::{InputToSign, MutableTransaction};
use crate::plugin::PluginManager;
use crate::selector::UnspentOutputSelectorChain;
use crate::sorter::{TransactionDataSortType, TransactionDataSorter};
use crate::transaction::{Input, DEFAULT_SEQUENCE};
use crate::unspent::UnspentOutput;
use crate::CoreError;

/// Asks the selector chain for covering outputs, stages one input per
/// selection in the requested order, and attaches the change output
/// when the selection calls for one.
pub struct InputSetter {
    unspent_output_selector: Arc<UnspentOutputSelectorChain>,
    public_key_source: Arc<dyn PublicKeySource>,
    address_converter: Arc<AddressConverterChain>,
    plugin_manager: Arc<PluginManager>,
    change_script_type: ScriptType,
}

impl InputSetter {
    /// Create the input stage.
    ///
    /// # Arguments
    /// * `unspent_output_selector` - The selector chain.
    /// * `public_key_source` - Supplies the change key.
    /// * `address_converter` - Synthesizes the change address.
    /// * `plugin_manager` - Applies input sequence overrides.
    /// * `change_script_type` - Script type for synthesized change.
    ///
    /// # Returns
    /// A new `InputSetter`.
    pub fn new(
        unspent_output_selector: Arc<UnspentOutputSelectorChain>,
        public_key_source: Arc<dyn PublicKeySource>,
        address_converter: Arc<AddressConverterChain>,
        plugin_manager: Arc<PluginManager>,
        change_script_type: ScriptType,
    ) -> Self {
        InputSetter {
            unspent_output_selector,
            public_key_source,
            address_converter,
            plugin_manager,
            change_script_type,
        }
    }

    /// Select and stage the inputs for the draft.
    ///
    /// # Arguments
    /// * `mutable_transaction` - The draft with its recipient set.
    /// * `fee_rate` - Fee rate in satoshis per virtual byte.
    /// * `sender_pay` - Whether the sender pays the fee on top.
    /// * `sort_type` - Ordering applied to the selected inputs.
    /// * `change_script` - Optional raw locking script for change; when
    ///   absent the change address is synthesized from the change key.
    ///
    /// # Returns
    /// `Ok(())`, or a selection/plugin error.
    pub fn set_inputs(
        &self,
        mutable_transaction: &mut MutableTransaction,
        fee_rate: u64,
        sender_pay: bool,
        sort_type: TransactionDataSortType,
        change_script: Option<&[u8]>,
    ) -> Result<(), CoreError> {
        let recipient_address = mutable_transaction
            .recipient_address
            .clone()
            .ok_or(CoreError::NoRecipientAddress)?;

        // A caller-supplied change script dictates the change type.
        let change_type = match change_script {
            Some(bytes) => {
                let script_type = Script::from_bytes(bytes).script_type();
                if script_type == ScriptType::Unknown {
                    self.change_script_type
                } else {
                    script_type
                }
            }
            None => self.change_script_type,
        };

        let selected = self.unspent_output_selector.select(
            mutable_transaction.recipient_value,
            fee_rate,
            recipient_address.script_type(),
            change_type,
            sender_pay,
            mutable_transaction.plugin_data_output_size(),
        )?;

        let sorter = TransactionDataSorter::new(sort_type);
        for unspent_output in sorter.sort_unspent_outputs(selected.unspent_outputs) {
            let input_to_sign = Self::input_to_sign(unspent_output);
            mutable_transaction.add_input_to_sign(input_to_sign);
        }

        mutable_transaction.recipient_value = selected.recipient_value;

        if let Some(change_value) = selected.change_value {
            match change_script {
                Some(bytes) => {
                    mutable_transaction.change_script = Some(Script::from_bytes(bytes));
                }
                None => {
                    let public_key = self.public_key_source.change_public_key()?;
                    let change_address = self
                        .address_converter
                        .convert_public_key(&public_key, self.change_script_type)?;
                    mutable_transaction.change_address = Some(change_address);
                    mutable_transaction.change_public_key = Some(public_key);
                }
            }
            mutable_transaction.change_value = change_value;
        }

        self.plugin_manager.process_inputs(mutable_transaction)
    }

    /// Stage an input for one selected output.
    ///
    /// The previous output's key hash is backfilled from its locking
    /// script or owning key so the witness script code can always be
    /// reconstructed.
    fn input_to_sign(unspent_output: UnspentOutput) -> InputToSign {
        let UnspentOutput {
            mut output,
            public_key,
            ..
        } = unspent_output;

        if output.key_hash.is_none() {
            // A wrapped-segwit locking script commits to the script
            // hash; the witness script code needs the key hash itself.
            output.key_hash = match output.script_type {
                ScriptType::P2wpkhSh => Some(public_key.key_hash.clone()),
                _ => output
                    .locking_script
                    .standard_payload()
                    .or_else(|| Some(public_key.key_hash.clone())),
            };
        }

        let input = Input::new(
            output.transaction_hash,
            output.index,
            Script::new(),
            DEFAULT_SEQUENCE,
        );

        InputToSign {
            input,
            previous_output: output,
            previous_output_public_key: public_key,
        }
    }
}
