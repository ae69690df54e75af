//! UTXO selection strategies.
//!
//! Strategies are tried in chain order; the first to cover the target
//! wins. Selection and fee estimation are mutually recursive: the fee
//! depends on how many inputs are selected, so the general strategy
//! recomputes the fee after every added input until the covered value
//! converges. Ordering is deterministic (value ascending, then
//! display-order txid, then output index) so estimates and final builds
//! reproduce exactly.

use std::sync::{Arc, RwLock};

use tracing::debug;
use txforge_script::ScriptType;

use crate::sizer::{DustCalculator, TransactionSizeCalculator};
use crate::transaction::Output;
use crate::unspent::{SelectedUnspentOutputInfo, UnspentOutput, UnspentOutputProvider};
use crate::CoreError;

/// One selection strategy.
pub trait UnspentOutputSelector: Send + Sync {
    /// Choose outputs covering `value` plus the fee at `fee_rate`.
    ///
    /// # Arguments
    /// * `value` - The requested send value in satoshis.
    /// * `fee_rate` - Fee rate in satoshis per virtual byte.
    /// * `output_script_type` - The recipient output's script type.
    /// * `change_type` - The script type a change output would use.
    /// * `sender_pay` - `true` adds the fee on top of `value`; `false`
    ///   deducts it from the recipient.
    /// * `plugin_data_output_size` - Pending data-carrier script length.
    ///
    /// # Returns
    /// The selection, or an error when this strategy cannot satisfy it.
    fn select(
        &self,
        value: u64,
        fee_rate: u64,
        output_script_type: ScriptType,
        change_type: ScriptType,
        sender_pay: bool,
        plugin_data_output_size: usize,
    ) -> Result<SelectedUnspentOutputInfo, CoreError>;
}

/// Sort the pool into the documented deterministic order: value
/// ascending, then display-order txid, then output index.
fn deterministic_order(mut utxos: Vec<UnspentOutput>) -> Vec<UnspentOutput> {
    utxos.sort_by(|a, b| {
        a.output
            .value
            .cmp(&b.output.value)
            .then_with(|| {
                let mut a_hash = *a.output.transaction_hash.as_bytes();
                let mut b_hash = *b.output.transaction_hash.as_bytes();
                a_hash.reverse();
                b_hash.reverse();
                a_hash.cmp(&b_hash)
            })
            .then_with(|| a.output.index.cmp(&b.output.index))
    });
    utxos
}

// ---------------------------------------------------------------------------
// General accumulating selector
// ---------------------------------------------------------------------------

/// Greedy accumulation with converging fee estimation.
///
/// Walks the pool smallest-first, recomputing the fee for the current
/// input count after each addition, until the covered value reaches the
/// target plus fee. Leftover above the change-type dust threshold
/// becomes a change output; anything smaller folds into the fee.
pub struct AccumulatingSelector {
    calculator: Arc<TransactionSizeCalculator>,
    provider: Arc<UnspentOutputProvider>,
    dust_calculator: Arc<DustCalculator>,
}

impl AccumulatingSelector {
    /// Create the general selector.
    ///
    /// # Arguments
    /// * `calculator` - Size calculator for fee estimation.
    /// * `provider` - The spendable pool.
    /// * `dust_calculator` - Dust thresholds.
    ///
    /// # Returns
    /// A new `AccumulatingSelector`.
    pub fn new(
        calculator: Arc<TransactionSizeCalculator>,
        provider: Arc<UnspentOutputProvider>,
        dust_calculator: Arc<DustCalculator>,
    ) -> Self {
        AccumulatingSelector {
            calculator,
            provider,
            dust_calculator,
        }
    }

    fn fee_for(
        &self,
        selected: &[UnspentOutput],
        output_script_types: &[ScriptType],
        fee_rate: u64,
        plugin_data_output_size: usize,
    ) -> u64 {
        let previous_outputs: Vec<&Output> =
            selected.iter().map(|utxo| &utxo.output).collect();
        self.calculator
            .transaction_size(&previous_outputs, output_script_types, plugin_data_output_size)
            as u64
            * fee_rate
    }
}

impl UnspentOutputSelector for AccumulatingSelector {
    fn select(
        &self,
        value: u64,
        fee_rate: u64,
        output_script_type: ScriptType,
        change_type: ScriptType,
        sender_pay: bool,
        plugin_data_output_size: usize,
    ) -> Result<SelectedUnspentOutputInfo, CoreError> {
        if value == 0 {
            return Err(CoreError::WrongValue);
        }
        let pool = self.provider.spendable_utxo();
        if pool.is_empty() {
            return Err(CoreError::EmptyUnspentOutputs);
        }
        let sorted = deterministic_order(pool);

        let recipient_dust = self.dust_calculator.dust(output_script_type);
        let change_dust = self.dust_calculator.dust(change_type);

        let mut selected: Vec<UnspentOutput> = Vec::new();
        let mut total_value: u64 = 0;
        let mut fee: u64 = 0;
        let mut covered = false;

        for unspent_output in sorted {
            total_value += unspent_output.output.value;
            selected.push(unspent_output);

            fee = self.fee_for(
                &selected,
                &[output_script_type],
                fee_rate,
                plugin_data_output_size,
            );

            let sent_value = if sender_pay { value + fee } else { value };
            if total_value >= sent_value {
                let recipient_value = if sender_pay {
                    value
                } else {
                    value.saturating_sub(fee)
                };
                if recipient_value < recipient_dust {
                    return Err(CoreError::Dust);
                }
                covered = true;
                break;
            }
        }

        if !covered {
            return Err(CoreError::InsufficientFunds);
        }

        // Decide whether the leftover is worth a change output.
        let fee_with_change = self.fee_for(
            &selected,
            &[output_script_type, change_type],
            fee_rate,
            plugin_data_output_size,
        );
        let sent_with_change = if sender_pay {
            value + fee_with_change
        } else {
            value
        };

        if total_value > sent_with_change {
            let remainder = total_value - sent_with_change;
            let recipient_value = if sender_pay {
                value
            } else {
                value.saturating_sub(fee_with_change)
            };
            if remainder > change_dust && recipient_value >= recipient_dust {
                debug!(
                    inputs = selected.len(),
                    fee = fee_with_change,
                    change = remainder,
                    "selection converged with change"
                );
                return Ok(SelectedUnspentOutputInfo {
                    unspent_outputs: selected,
                    recipient_value,
                    change_value: Some(remainder),
                    fee: fee_with_change,
                });
            }
        }

        // No change output: everything beyond the recipient folds into
        // the fee.
        let recipient_value = if sender_pay {
            value
        } else {
            value.saturating_sub(fee)
        };
        debug!(
            inputs = selected.len(),
            fee = total_value - recipient_value,
            "selection converged without change"
        );
        Ok(SelectedUnspentOutputInfo {
            unspent_outputs: selected,
            recipient_value,
            change_value: None,
            fee: total_value - recipient_value,
        })
    }
}

// ---------------------------------------------------------------------------
// Single-output, no-change selector
// ---------------------------------------------------------------------------

/// Prefers one existing output that covers the target with leftover
/// below the change dust tolerance, avoiding an unnecessary change
/// output entirely.
pub struct SingleNoChangeSelector {
    calculator: Arc<TransactionSizeCalculator>,
    provider: Arc<UnspentOutputProvider>,
    dust_calculator: Arc<DustCalculator>,
}

impl SingleNoChangeSelector {
    /// Create the single-output selector.
    ///
    /// # Arguments
    /// * `calculator` - Size calculator for fee estimation.
    /// * `provider` - The spendable pool.
    /// * `dust_calculator` - Dust thresholds.
    ///
    /// # Returns
    /// A new `SingleNoChangeSelector`.
    pub fn new(
        calculator: Arc<TransactionSizeCalculator>,
        provider: Arc<UnspentOutputProvider>,
        dust_calculator: Arc<DustCalculator>,
    ) -> Self {
        SingleNoChangeSelector {
            calculator,
            provider,
            dust_calculator,
        }
    }
}

impl UnspentOutputSelector for SingleNoChangeSelector {
    fn select(
        &self,
        value: u64,
        fee_rate: u64,
        output_script_type: ScriptType,
        change_type: ScriptType,
        sender_pay: bool,
        plugin_data_output_size: usize,
    ) -> Result<SelectedUnspentOutputInfo, CoreError> {
        if value == 0 {
            return Err(CoreError::WrongValue);
        }
        let pool = self.provider.spendable_utxo();
        if pool.is_empty() {
            return Err(CoreError::EmptyUnspentOutputs);
        }

        let recipient_dust = self.dust_calculator.dust(output_script_type);
        let change_dust = self.dust_calculator.dust(change_type);

        for unspent_output in deterministic_order(pool) {
            let fee = self.calculator.transaction_size(
                &[&unspent_output.output],
                &[output_script_type],
                plugin_data_output_size,
            ) as u64
                * fee_rate;

            let recipient_value = if sender_pay {
                value
            } else {
                value.saturating_sub(fee)
            };
            let sent_value = if sender_pay { value + fee } else { value };
            let output_value = unspent_output.output.value;

            if output_value >= sent_value
                && recipient_value >= recipient_dust
                && output_value - sent_value < change_dust
            {
                debug!(fee = output_value - recipient_value, "single-output selection");
                return Ok(SelectedUnspentOutputInfo {
                    fee: output_value - recipient_value,
                    unspent_outputs: vec![unspent_output],
                    recipient_value,
                    change_value: None,
                });
            }
        }

        Err(CoreError::InsufficientFunds)
    }
}

// ---------------------------------------------------------------------------
// Selector chain
// ---------------------------------------------------------------------------

/// Ordered chain of selection strategies.
///
/// Strategies run in registration order; `prepend` puts a strategy
/// ahead of the existing ones. The chain fails only when every
/// strategy fails, surfacing the last strategy's error.
pub struct UnspentOutputSelectorChain {
    selectors: RwLock<Vec<Box<dyn UnspentOutputSelector>>>,
}

impl UnspentOutputSelectorChain {
    /// Create an empty chain.
    ///
    /// # Returns
    /// A new `UnspentOutputSelectorChain`.
    pub fn new() -> Self {
        UnspentOutputSelectorChain {
            selectors: RwLock::new(Vec::new()),
        }
    }

    /// Append a strategy to the end of the chain.
    ///
    /// # Arguments
    /// * `selector` - The strategy to register.
    pub fn add(&self, selector: Box<dyn UnspentOutputSelector>) {
        if let Ok(mut selectors) = self.selectors.write() {
            selectors.push(selector);
        }
    }

    /// Put a strategy ahead of the existing ones.
    ///
    /// # Arguments
    /// * `selector` - The strategy to register first.
    pub fn prepend(&self, selector: Box<dyn UnspentOutputSelector>) {
        if let Ok(mut selectors) = self.selectors.write() {
            selectors.insert(0, selector);
        }
    }

    /// Run the chain.
    ///
    /// # Arguments
    /// As `UnspentOutputSelector::select`.
    ///
    /// # Returns
    /// The first successful selection, or the last strategy's error.
    pub fn select(
        &self,
        value: u64,
        fee_rate: u64,
        output_script_type: ScriptType,
        change_type: ScriptType,
        sender_pay: bool,
        plugin_data_output_size: usize,
    ) -> Result<SelectedUnspentOutputInfo, CoreError> {
        let selectors = self
            .selectors
            .read()
            .map_err(|_| CoreError::InsufficientFunds)?;

        let mut last_error = CoreError::InsufficientFunds;
        for selector in selectors.iter() {
            match selector.select(
                value,
                fee_rate,
                output_script_type,
                change_type,
                sender_pay,
                plugin_data_output_size,
            ) {
                Ok(info) => return Ok(info),
                Err(error) => last_error = error,
            }
        }
        Err(last_error)
    }
}

impl Default for UnspentOutputSelectorChain {
    fn default() -> Self {
        Self::new()
    }
}
