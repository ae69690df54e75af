//! Plugin registry for third-party output types.
//!
//! Plugins extend the pipeline without modifying it: they validate
//! addresses, inject protocol outputs during assembly, gate which
//! outputs are spendable, override input sequence numbers, re-parse
//! their own null-data payloads, and contribute restore-scan keys.
//! The core depends only on the `Plugin` trait, never on concrete
//! plugin types.

use std::any::Any;
use std::collections::BTreeMap;
use std::slice::Iter;
use std::sync::{Arc, RwLock};

use txforge_script::{opcodes, ScriptChunk};

use crate::address::Address;
use crate::keys::PublicKey;
use crate::mutable::MutableTransaction;
use crate::transaction::{FullTransaction, Output};
use crate::unspent::UnspentOutput;
use crate::CoreError;

/// Opaque per-build payload handed to a plugin.
///
/// Concrete plugins downcast through `as_any` to their own data type.
pub trait PluginData: Send + Sync {
    /// The payload as `Any`, for downcasting by the owning plugin.
    fn as_any(&self) -> &dyn Any;
}

/// Plugin payloads for one build call, keyed by plugin id.
pub type PluginDataMap = BTreeMap<u8, Box<dyn PluginData>>;

/// Structured data a plugin parsed back out of a null-data output.
pub trait PluginOutputData: Send + Sync {
    /// The parsed data as `Any`, for downcasting by the caller.
    fn as_any(&self) -> &dyn Any;
}

/// A pipeline extension module.
///
/// Default implementations make every capability opt-in; a plugin
/// implements only the hooks its protocol needs.
pub trait Plugin: Send + Sync {
    /// The one-byte id identifying this plugin's outputs.
    fn id(&self) -> u8;

    /// The largest value this plugin allows a build to spend, if any.
    fn max_spend_limit(&self) -> Option<u64> {
        None
    }

    /// Apply extra acceptance rules to a recipient address.
    ///
    /// # Arguments
    /// * `address` - The converted recipient address.
    fn validate_address(&self, address: &Address) -> Result<(), CoreError> {
        let _ = address;
        Ok(())
    }

    /// Inject protocol outputs into the draft during output assembly.
    ///
    /// # Arguments
    /// * `mutable_transaction` - The draft under construction.
    /// * `plugin_data` - This plugin's payload for the build.
    /// * `skip_checks` - Set during fee estimation; validation may be
    ///   relaxed but injected outputs must still be staged.
    fn process_outputs(
        &self,
        mutable_transaction: &mut MutableTransaction,
        plugin_data: &dyn PluginData,
        skip_checks: bool,
    ) -> Result<(), CoreError>;

    /// Re-parse this plugin's chunks from a null-data output.
    ///
    /// The iterator is positioned just after this plugin's id chunk;
    /// the plugin consumes exactly the chunks it wrote.
    ///
    /// # Arguments
    /// * `transaction` - The transaction carrying the output.
    /// * `null_data_chunks` - Iterator over the remaining chunks.
    fn process_null_data(
        &self,
        transaction: &FullTransaction,
        null_data_chunks: &mut Iter<'_, ScriptChunk>,
    ) -> Result<(), CoreError> {
        let _ = (transaction, null_data_chunks);
        Ok(())
    }

    /// Whether an output owned by this plugin may be spent now.
    ///
    /// # Arguments
    /// * `unspent_output` - The candidate output.
    fn is_spendable(&self, unspent_output: &UnspentOutput) -> Result<bool, CoreError> {
        let _ = unspent_output;
        Ok(true)
    }

    /// The sequence number inputs spending this plugin's outputs need.
    ///
    /// # Arguments
    /// * `output` - The previous output owned by this plugin.
    fn input_sequence_number(&self, output: &Output) -> Result<u32, CoreError>;

    /// Parse a serialized plugin-data string into structured form.
    ///
    /// # Arguments
    /// * `data` - The serialized payload.
    /// * `transaction_timestamp` - Timestamp of the owning transaction.
    fn parse_plugin_data(
        &self,
        data: &str,
        transaction_timestamp: u64,
    ) -> Result<Box<dyn PluginOutputData>, CoreError>;

    /// Restore-scan keys this plugin's outputs imply for a public key.
    ///
    /// # Arguments
    /// * `public_key` - The wallet public key being scanned.
    fn keys_for_api_restore(&self, public_key: &PublicKey) -> Result<Vec<String>, CoreError> {
        let _ = public_key;
        Ok(Vec::new())
    }
}

/// Registry of plugins keyed by their one-byte id.
///
/// Configured at startup; all capability calls fan out to the
/// registered plugins. A plugin failure aborts the whole build.
pub struct PluginManager {
    plugins: RwLock<BTreeMap<u8, Arc<dyn Plugin>>>,
}

impl PluginManager {
    /// Create an empty registry.
    ///
    /// # Returns
    /// A new `PluginManager`.
    pub fn new() -> Self {
        PluginManager {
            plugins: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a plugin under its id.
    ///
    /// # Arguments
    /// * `plugin` - The plugin to register.
    pub fn add(&self, plugin: Arc<dyn Plugin>) {
        if let Ok(mut plugins) = self.plugins.write() {
            plugins.insert(plugin.id(), plugin);
        }
    }

    fn plugin(&self, id: u8) -> Result<Arc<dyn Plugin>, CoreError> {
        self.plugins
            .read()
            .ok()
            .and_then(|plugins| plugins.get(&id).cloned())
            .ok_or(CoreError::PluginNotFound(id))
    }

    /// Run every referenced plugin's address validation.
    ///
    /// # Arguments
    /// * `address` - The recipient address.
    /// * `plugin_data` - The build's plugin payloads.
    ///
    /// # Returns
    /// `Ok(())` when every plugin accepts, or the first failure.
    pub fn validate(&self, address: &Address, plugin_data: &PluginDataMap) -> Result<(), CoreError> {
        for id in plugin_data.keys() {
            self.plugin(*id)?.validate_address(address)?;
        }
        Ok(())
    }

    /// Aggregate the spend limit across referenced plugins.
    ///
    /// # Arguments
    /// * `plugin_data` - The build's plugin payloads.
    ///
    /// # Returns
    /// The minimum of all plugins' limits, or `None` when unrestricted.
    pub fn max_spend_limit(&self, plugin_data: &PluginDataMap) -> Result<Option<u64>, CoreError> {
        let mut limit: Option<u64> = None;
        for id in plugin_data.keys() {
            if let Some(plugin_limit) = self.plugin(*id)?.max_spend_limit() {
                limit = Some(limit.map_or(plugin_limit, |current| current.min(plugin_limit)));
            }
        }
        Ok(limit)
    }

    /// Let every referenced plugin stage its outputs into the draft.
    ///
    /// # Arguments
    /// * `mutable_transaction` - The draft under construction.
    /// * `plugin_data` - The build's plugin payloads.
    /// * `skip_checks` - Forwarded to the plugins.
    pub fn process_outputs(
        &self,
        mutable_transaction: &mut MutableTransaction,
        plugin_data: &PluginDataMap,
        skip_checks: bool,
    ) -> Result<(), CoreError> {
        for (id, data) in plugin_data {
            self.plugin(*id)?
                .process_outputs(mutable_transaction, data.as_ref(), skip_checks)?;
        }
        Ok(())
    }

    /// Apply plugin sequence overrides to the staged inputs.
    ///
    /// Inputs spending plugin-owned outputs get the sequence number
    /// their plugin dictates.
    ///
    /// # Arguments
    /// * `mutable_transaction` - The draft with staged inputs.
    pub fn process_inputs(
        &self,
        mutable_transaction: &mut MutableTransaction,
    ) -> Result<(), CoreError> {
        for input_to_sign in &mut mutable_transaction.inputs_to_sign {
            if let Some(id) = input_to_sign.previous_output.plugin_id {
                let sequence = self
                    .plugin(id)?
                    .input_sequence_number(&input_to_sign.previous_output)?;
                input_to_sign.input.sequence = sequence;
            }
        }
        Ok(())
    }

    /// Route a null-data output's chunks to the plugins that wrote them.
    ///
    /// Each payload is led by a one-byte push of its plugin id. An id no
    /// registered plugin claims ends parsing: the transaction is
    /// ordinary, not an error.
    ///
    /// # Arguments
    /// * `transaction` - The transaction carrying the output.
    /// * `null_data_output` - The data-carrier output to parse.
    pub fn process_null_data(
        &self,
        transaction: &FullTransaction,
        null_data_output: &Output,
    ) -> Result<(), CoreError> {
        let chunks = null_data_output.locking_script.chunks()?;
        let mut iterator = chunks.iter();

        // Skip the OP_RETURN (and optional leading OP_FALSE) marker.
        for chunk in iterator.by_ref() {
            if chunk.op == opcodes::OP_RETURN {
                break;
            }
        }

        while let Some(id_chunk) = iterator.next() {
            let id = match id_chunk.data.as_deref() {
                Some([id]) => *id,
                _ => break,
            };
            let plugin = match self.plugin(id) {
                Ok(plugin) => plugin,
                Err(_) => break,
            };
            plugin.process_null_data(transaction, &mut iterator)?;
        }
        Ok(())
    }

    /// Whether an output may enter the selectable pool.
    ///
    /// Plugin-less outputs are always spendable; outputs owned by an
    /// unregistered plugin never are.
    ///
    /// # Arguments
    /// * `unspent_output` - The candidate output.
    ///
    /// # Returns
    /// `true` if the output is currently spendable.
    pub fn is_spendable(&self, unspent_output: &UnspentOutput) -> bool {
        match unspent_output.output.plugin_id {
            None => true,
            Some(id) => self
                .plugin(id)
                .and_then(|plugin| plugin.is_spendable(unspent_output))
                .unwrap_or(false),
        }
    }

    /// Parse a plugin's serialized payload into structured form.
    ///
    /// # Arguments
    /// * `plugin_id` - The owning plugin.
    /// * `data` - The serialized payload string.
    /// * `transaction_timestamp` - Timestamp of the owning transaction.
    ///
    /// # Returns
    /// The parsed data, or `None` for unregistered plugins or parse
    /// failures.
    pub fn parse_plugin_data(
        &self,
        plugin_id: u8,
        data: &str,
        transaction_timestamp: u64,
    ) -> Option<Box<dyn PluginOutputData>> {
        self.plugin(plugin_id)
            .ok()?
            .parse_plugin_data(data, transaction_timestamp)
            .ok()
    }

    /// Aggregate restore-scan keys across all registered plugins.
    ///
    /// # Arguments
    /// * `public_key` - The wallet public key being scanned.
    ///
    /// # Returns
    /// Every registered plugin's keys, in id order.
    pub fn keys_for_api_restore(&self, public_key: &PublicKey) -> Vec<String> {
        let plugins: Vec<Arc<dyn Plugin>> = self
            .plugins
            .read()
            .map(|plugins| plugins.values().cloned().collect())
            .unwrap_or_default();
        plugins
            .iter()
            .flat_map(|plugin| plugin.keys_for_api_restore(public_key).unwrap_or_default())
            .collect()
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}
