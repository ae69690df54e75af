//! Spendable outputs and the caller-supplied UTXO pool.
//!
//! `UnspentOutput` is the unit the selector chain reasons about.
//! `UnspentOutputProvider` holds the pool behind an atomic snapshot
//! swap: a build in progress always sees a consistent set, and
//! replacing the pool never mutates it in place.

use std::sync::{Arc, RwLock};

use crate::keys::PublicKey;
use crate::plugin::PluginManager;
use crate::transaction::{Output, Transaction};

/// A spendable output with its owning key and transaction context.
#[derive(Clone, Debug)]
pub struct UnspentOutput {
    /// The unspent output itself.
    pub output: Output,
    /// The public key that can spend it.
    pub public_key: PublicKey,
    /// Header of the transaction that created it.
    pub transaction: Transaction,
    /// Confirmation height, when known.
    pub block_height: Option<u32>,
}

impl UnspentOutput {
    /// Create an unspent output.
    ///
    /// # Arguments
    /// * `output` - The output being tracked.
    /// * `public_key` - The key that owns it.
    /// * `transaction` - Header of the creating transaction.
    /// * `block_height` - Confirmation height, if confirmed.
    ///
    /// # Returns
    /// A new `UnspentOutput`.
    pub fn new(
        output: Output,
        public_key: PublicKey,
        transaction: Transaction,
        block_height: Option<u32>,
    ) -> Self {
        UnspentOutput {
            output,
            public_key,
            transaction,
            block_height,
        }
    }
}

/// The result of a successful selection round.
#[derive(Clone, Debug)]
pub struct SelectedUnspentOutputInfo {
    /// The selected outputs, in selection order.
    pub unspent_outputs: Vec<UnspentOutput>,
    /// The value the recipient output will carry.
    pub recipient_value: u64,
    /// The change value, when a change output is due.
    pub change_value: Option<u64>,
    /// The fee implied by this selection.
    pub fee: u64,
}

/// The installed spendable-UTXO pool.
///
/// Reads take an `Arc` snapshot; `set_spendable_utxos` swaps the whole
/// snapshot atomically. Outputs gated off by a plugin's `is_spendable`
/// never enter the selectable view.
pub struct UnspentOutputProvider {
    plugin_manager: Arc<PluginManager>,
    confirmed_utxo: RwLock<Arc<Vec<UnspentOutput>>>,
}

impl UnspentOutputProvider {
    /// Create an empty provider.
    ///
    /// # Arguments
    /// * `plugin_manager` - Registry consulted for spendability gating.
    ///
    /// # Returns
    /// A provider with an empty pool.
    pub fn new(plugin_manager: Arc<PluginManager>) -> Self {
        UnspentOutputProvider {
            plugin_manager,
            confirmed_utxo: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// The currently spendable outputs.
    ///
    /// Filters the installed snapshot through plugin gating; the
    /// returned vector is detached from the pool and stays stable for
    /// the duration of a build.
    ///
    /// # Returns
    /// The spendable outputs.
    pub fn spendable_utxo(&self) -> Vec<UnspentOutput> {
        let snapshot = self
            .confirmed_utxo
            .read()
            .map(|guard| Arc::clone(&guard))
            .unwrap_or_default();
        snapshot
            .iter()
            .filter(|utxo| self.plugin_manager.is_spendable(utxo))
            .cloned()
            .collect()
    }

    /// Replace the pool atomically.
    ///
    /// # Arguments
    /// * `utxos` - The new spendable set.
    pub fn set_spendable_utxos(&self, utxos: Vec<UnspentOutput>) {
        if let Ok(mut guard) = self.confirmed_utxo.write() {
            *guard = Arc::new(utxos);
        }
    }
}
