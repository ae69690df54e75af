//! Transaction size and dust calculation.
//!
//! Sizes are computed in weight units so witness bytes get their
//! discount, then converted back to virtual bytes for fee-rate
//! multiplication. Dust is the Bitcoin Core policy formula: an output
//! is dust when its value is below the cost of creating and later
//! spending it at the dust-relay rate.

use std::sync::Arc;

use txforge_script::ScriptType;

use crate::transaction::Output;

/// Weight scale factor: one non-witness byte weighs four units.
const WITNESS_SCALE_FACTOR: usize = 4;

/// Serialized size of an empty transaction: version, input count,
/// output count, lock time.
const EMPTY_TX_SIZE: usize = 4 + 1 + 1 + 4;

/// Weight of the segwit marker and flag bytes.
const SEGWIT_DATA_WEIGHT: usize = 2;

/// Push-prefixed DER signature with sighash byte.
const SIGNATURE_LENGTH: usize = 72 + 1;
/// Push-prefixed compressed public key.
const PUB_KEY_LENGTH: usize = 33 + 1;
/// Push-prefixed P2WPKH redeem script inside a P2SH signature script.
const WRAPPED_PROGRAM_LENGTH: usize = 22 + 1;

/// Byte size of spending a non-witness output (outpoint, script length,
/// signature script, sequence).
const NON_WITNESS_SPEND_SIZE: usize = 32 + 4 + 1 + SIGNATURE_LENGTH + PUB_KEY_LENGTH + 4;
/// Virtual byte size of spending a witness output, with the witness
/// items discounted by the scale factor.
const WITNESS_SPEND_SIZE: usize =
    32 + 4 + 1 + (SIGNATURE_LENGTH + PUB_KEY_LENGTH) / WITNESS_SCALE_FACTOR + 4;

/// Computes serialized transaction sizes per script type.
pub struct TransactionSizeCalculator;

impl TransactionSizeCalculator {
    /// Create a size calculator.
    ///
    /// # Returns
    /// A new `TransactionSizeCalculator`.
    pub fn new() -> Self {
        TransactionSizeCalculator
    }

    /// Estimate the virtual size of a transaction in bytes.
    ///
    /// Inputs are sized from the previous outputs' script types; a
    /// witness input anywhere switches the whole transaction to segwit
    /// weighting. `plugin_data_output_size` accounts for a pending
    /// data-carrier output script of that length.
    ///
    /// # Arguments
    /// * `previous_outputs` - Outputs being spent.
    /// * `output_script_types` - Script types of the outputs to create.
    /// * `plugin_data_output_size` - Data-carrier script length, or 0.
    ///
    /// # Returns
    /// The estimated virtual size in bytes.
    pub fn transaction_size(
        &self,
        previous_outputs: &[&Output],
        output_script_types: &[ScriptType],
        plugin_data_output_size: usize,
    ) -> usize {
        let segwit = previous_outputs
            .iter()
            .any(|output| output.script_type.is_witness());

        let mut input_weight = 0;
        for previous_output in previous_outputs {
            input_weight += self.input_size(previous_output.script_type) * WITNESS_SCALE_FACTOR;
            if segwit {
                input_weight += self.witness_size(previous_output.script_type);
            }
        }

        let mut output_weight: usize = output_script_types
            .iter()
            .map(|script_type| self.output_size(*script_type))
            .sum::<usize>()
            * WITNESS_SCALE_FACTOR;
        if plugin_data_output_size > 0 {
            output_weight += (8 + 1 + plugin_data_output_size) * WITNESS_SCALE_FACTOR;
        }

        let tx_weight = if segwit {
            EMPTY_TX_SIZE * WITNESS_SCALE_FACTOR + SEGWIT_DATA_WEIGHT
        } else {
            EMPTY_TX_SIZE * WITNESS_SCALE_FACTOR
        };

        self.to_bytes(tx_weight + input_weight + output_weight)
    }

    /// Serialized size of one output of the given type.
    ///
    /// # Arguments
    /// * `script_type` - The output's script type.
    ///
    /// # Returns
    /// Value field, script length prefix, and script bytes.
    pub fn output_size(&self, script_type: ScriptType) -> usize {
        8 + 1 + script_type.size()
    }

    /// Non-witness serialized size of one input spending the given type.
    ///
    /// Witness types contribute an empty signature script here; their
    /// signing data is counted by `witness_size`.
    ///
    /// # Arguments
    /// * `script_type` - The previous output's script type.
    ///
    /// # Returns
    /// Outpoint, script length prefix, signature script, and sequence.
    pub fn input_size(&self, script_type: ScriptType) -> usize {
        let signature_script_length = match script_type {
            ScriptType::P2pkh => SIGNATURE_LENGTH + PUB_KEY_LENGTH,
            ScriptType::P2pk => SIGNATURE_LENGTH,
            ScriptType::P2wpkhSh => WRAPPED_PROGRAM_LENGTH,
            _ => 0,
        };
        32 + 4 + 1 + signature_script_length + 4
    }

    /// Witness weight contribution of one input.
    ///
    /// Witness types carry the stack count, signature, and public key;
    /// non-witness inputs in a segwit transaction still carry the
    /// one-byte empty stack marker.
    ///
    /// # Arguments
    /// * `script_type` - The previous output's script type.
    ///
    /// # Returns
    /// The witness weight in weight units.
    pub fn witness_size(&self, script_type: ScriptType) -> usize {
        if script_type.is_witness() {
            1 + SIGNATURE_LENGTH + PUB_KEY_LENGTH
        } else {
            1
        }
    }

    /// Convert a weight-unit total to virtual bytes, rounding up.
    ///
    /// # Arguments
    /// * `weight` - Accumulated weight units.
    ///
    /// # Returns
    /// The virtual byte size.
    pub fn to_bytes(&self, weight: usize) -> usize {
        weight / WITNESS_SCALE_FACTOR + usize::from(weight % WITNESS_SCALE_FACTOR != 0)
    }
}

impl Default for TransactionSizeCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the minimum economically spendable value per script type.
pub struct DustCalculator {
    dust_relay_tx_fee: u64,
    size_calculator: Arc<TransactionSizeCalculator>,
}

impl DustCalculator {
    /// Create a dust calculator.
    ///
    /// # Arguments
    /// * `dust_relay_tx_fee` - The network's dust-relay rate in sat/kB.
    /// * `size_calculator` - Shared size calculator.
    ///
    /// # Returns
    /// A new `DustCalculator`.
    pub fn new(dust_relay_tx_fee: u64, size_calculator: Arc<TransactionSizeCalculator>) -> Self {
        DustCalculator {
            dust_relay_tx_fee,
            size_calculator,
        }
    }

    /// The dust threshold for outputs of the given type.
    ///
    /// Sums the output's own size with the cost of spending it (148
    /// bytes for non-witness, 67 virtual bytes for witness types) and
    /// applies the dust-relay rate. Data-carrier outputs are
    /// unspendable and have no threshold.
    ///
    /// # Arguments
    /// * `script_type` - The output's script type.
    ///
    /// # Returns
    /// The minimum value in satoshis an output of this type may carry.
    pub fn dust(&self, script_type: ScriptType) -> u64 {
        if script_type == ScriptType::NullData {
            return 0;
        }

        let mut size = self.size_calculator.output_size(script_type);
        size += if script_type.is_witness() {
            WITNESS_SPEND_SIZE
        } else {
            NON_WITNESS_SPEND_SIZE
        };

        size as u64 * self.dust_relay_tx_fee / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txforge_script::Script;

    fn output_of(script_type: ScriptType) -> Output {
        Output::new(0, Script::new(), script_type)
    }

    // -----------------------------------------------------------------
    // Input / output sizes
    // -----------------------------------------------------------------

    /// The canonical per-type constants.
    #[test]
    fn test_component_sizes() {
        let calculator = TransactionSizeCalculator::new();
        assert_eq!(calculator.input_size(ScriptType::P2pkh), 148);
        assert_eq!(calculator.input_size(ScriptType::P2wpkh), 41);
        assert_eq!(calculator.input_size(ScriptType::P2wpkhSh), 64);
        assert_eq!(calculator.output_size(ScriptType::P2pkh), 34);
        assert_eq!(calculator.output_size(ScriptType::P2wpkh), 31);
        assert_eq!(calculator.output_size(ScriptType::P2sh), 32);
        assert_eq!(calculator.witness_size(ScriptType::P2wpkh), 108);
        assert_eq!(calculator.witness_size(ScriptType::P2pkh), 1);
    }

    /// One P2PKH input and two P2PKH outputs is the classic 226 vbytes.
    #[test]
    fn test_legacy_transaction_size() {
        let calculator = TransactionSizeCalculator::new();
        let previous = output_of(ScriptType::P2pkh);
        let size = calculator.transaction_size(
            &[&previous],
            &[ScriptType::P2pkh, ScriptType::P2pkh],
            0,
        );
        assert_eq!(size, 226);
    }

    /// A P2WPKH spend gets the witness discount.
    #[test]
    fn test_segwit_transaction_size() {
        let calculator = TransactionSizeCalculator::new();
        let previous = output_of(ScriptType::P2wpkh);
        let size = calculator.transaction_size(
            &[&previous],
            &[ScriptType::P2wpkh, ScriptType::P2wpkh],
            0,
        );
        // 10.5 base + 41 input + 27 witness + 62 outputs, rounded up.
        assert_eq!(size, 141);
    }

    /// Plugin data adds a value+script-length+script output.
    #[test]
    fn test_plugin_data_output_counted() {
        let calculator = TransactionSizeCalculator::new();
        let previous = output_of(ScriptType::P2pkh);
        let base = calculator.transaction_size(&[&previous], &[ScriptType::P2pkh], 0);
        let with_plugin = calculator.transaction_size(&[&previous], &[ScriptType::P2pkh], 20);
        assert_eq!(with_plugin, base + 8 + 1 + 20);
    }

    /// Rounding up only when the weight is not a multiple of four.
    #[test]
    fn test_to_bytes_rounding() {
        let calculator = TransactionSizeCalculator::new();
        assert_eq!(calculator.to_bytes(8), 2);
        assert_eq!(calculator.to_bytes(9), 3);
        assert_eq!(calculator.to_bytes(11), 3);
    }

    // -----------------------------------------------------------------
    // Dust
    // -----------------------------------------------------------------

    /// The Bitcoin Core thresholds at the default 3000 sat/kB rate.
    #[test]
    fn test_dust_thresholds() {
        let dust = DustCalculator::new(3000, Arc::new(TransactionSizeCalculator::new()));
        assert_eq!(dust.dust(ScriptType::P2pkh), 546);
        assert_eq!(dust.dust(ScriptType::P2wpkh), 294);
        assert_eq!(dust.dust(ScriptType::NullData), 0);
    }
}
