//! Stage one: resolve and validate the destination.

use std::sync::Arc;

use crate::address::AddressConverterChain;
use crate::mutable::MutableTransaction;
use crate::plugin::{PluginDataMap, PluginManager};
use crate::sizer::DustCalculator;
use crate::CoreError;

/// Converts the destination address, stages the recipient value, and
/// runs the plugin checks a real send requires.
pub struct RecipientSetter {
    address_converter: Arc<AddressConverterChain>,
    plugin_manager: Arc<PluginManager>,
    dust_calculator: Arc<DustCalculator>,
}

impl RecipientSetter {
    /// Create the recipient stage.
    ///
    /// # Arguments
    /// * `address_converter` - The address chain.
    /// * `plugin_manager` - The plugin registry.
    /// * `dust_calculator` - Dust thresholds for the recipient check.
    ///
    /// # Returns
    /// A new `RecipientSetter`.
    pub fn new(
        address_converter: Arc<AddressConverterChain>,
        plugin_manager: Arc<PluginManager>,
        dust_calculator: Arc<DustCalculator>,
    ) -> Self {
        RecipientSetter {
            address_converter,
            plugin_manager,
            dust_calculator,
        }
    }

    /// Resolve the destination into the draft.
    ///
    /// Plugin outputs are always staged (they change the transaction
    /// size either way); the dust, spend-limit, and plugin address
    /// checks only run on real sends.
    ///
    /// # Arguments
    /// * `mutable_transaction` - The draft under construction.
    /// * `to_address` - Destination address string.
    /// * `value` - Value to send in satoshis.
    /// * `plugin_data` - Plugin payloads for this build.
    /// * `skip_checks` - Set during fee estimation.
    ///
    /// # Returns
    /// `Ok(())`, or an address/dust/limit/plugin error.
    pub fn set_recipient(
        &self,
        mutable_transaction: &mut MutableTransaction,
        to_address: &str,
        value: u64,
        plugin_data: &PluginDataMap,
        skip_checks: bool,
    ) -> Result<(), CoreError> {
        let address = self.address_converter.convert(to_address)?;
        let script_type = address.script_type();
        mutable_transaction.recipient_address = Some(address);
        mutable_transaction.recipient_value = value;

        self.plugin_manager
            .process_outputs(mutable_transaction, plugin_data, skip_checks)?;

        if skip_checks {
            return Ok(());
        }

        if let Some(address) = mutable_transaction.recipient_address.as_ref() {
            self.plugin_manager.validate(address, plugin_data)?;
        }
        if value < self.dust_calculator.dust(script_type) {
            return Err(CoreError::Dust);
        }
        if let Some(limit) = self.plugin_manager.max_spend_limit(plugin_data)? {
            if value > limit {
                return Err(CoreError::ExceedsMaxSpendLimit);
            }
        }
        Ok(())
    }
}
