//! Input and output ordering strategies.
//!
//! `None` preserves selection order, `Shuffle` randomizes for privacy,
//! and `Bip69` applies the canonical deterministic ordering: inputs by
//! display-order previous txid then output index, outputs by value then
//! locking script.

use rand::seq::SliceRandom;

use crate::transaction::Output;
use crate::unspent::UnspentOutput;

/// The ordering applied to a transaction's inputs and outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionDataSortType {
    /// Keep selection order.
    None,
    /// Randomize order.
    Shuffle,
    /// Canonical lexicographic ordering.
    Bip69,
}

/// Applies a `TransactionDataSortType` to outputs and selected UTXOs.
pub struct TransactionDataSorter {
    sort_type: TransactionDataSortType,
}

impl TransactionDataSorter {
    /// Create a sorter for the given strategy.
    ///
    /// # Arguments
    /// * `sort_type` - The ordering to apply.
    ///
    /// # Returns
    /// A new `TransactionDataSorter`.
    pub fn new(sort_type: TransactionDataSortType) -> Self {
        TransactionDataSorter { sort_type }
    }

    /// Order a transaction's outputs.
    ///
    /// # Arguments
    /// * `outputs` - The outputs in assembly order.
    ///
    /// # Returns
    /// The reordered outputs.
    pub fn sort_outputs(&self, mut outputs: Vec<Output>) -> Vec<Output> {
        match self.sort_type {
            TransactionDataSortType::None => outputs,
            TransactionDataSortType::Shuffle => {
                outputs.shuffle(&mut rand::thread_rng());
                outputs
            }
            TransactionDataSortType::Bip69 => {
                outputs.sort_by(|a, b| {
                    a.value
                        .cmp(&b.value)
                        .then_with(|| a.locking_script.as_bytes().cmp(b.locking_script.as_bytes()))
                });
                outputs
            }
        }
    }

    /// Order the selected unspent outputs.
    ///
    /// # Arguments
    /// * `unspent_outputs` - The outputs in selection order.
    ///
    /// # Returns
    /// The reordered outputs.
    pub fn sort_unspent_outputs(&self, mut unspent_outputs: Vec<UnspentOutput>) -> Vec<UnspentOutput> {
        match self.sort_type {
            TransactionDataSortType::None => unspent_outputs,
            TransactionDataSortType::Shuffle => {
                unspent_outputs.shuffle(&mut rand::thread_rng());
                unspent_outputs
            }
            TransactionDataSortType::Bip69 => {
                unspent_outputs.sort_by(|a, b| {
                    let a_hash = display_order(a);
                    let b_hash = display_order(b);
                    a_hash
                        .cmp(&b_hash)
                        .then_with(|| a.output.index.cmp(&b.output.index))
                });
                unspent_outputs
            }
        }
    }
}

/// The previous txid in display (reversed) byte order, the order BIP69
/// compares in.
fn display_order(unspent: &UnspentOutput) -> [u8; 32] {
    let mut bytes = *unspent.output.transaction_hash.as_bytes();
    bytes.reverse();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use txforge_primitives::TxHash;
    use txforge_script::{Script, ScriptType};

    use crate::keys::PublicKey;
    use crate::transaction::Transaction;

    fn output(value: u64, script_byte: u8) -> Output {
        Output::new(
            value,
            Script::from_bytes(&[script_byte]),
            ScriptType::P2pkh,
        )
    }

    fn unspent(hash_byte: u8, index: u32) -> UnspentOutput {
        let mut out = output(1000, 0x51);
        out.index = index;
        out.transaction_hash = TxHash::new([hash_byte; 32]);
        UnspentOutput::new(
            out,
            PublicKey::new(0, 0, true, vec![0x02; 33]),
            Transaction::new(2, 0),
            None,
        )
    }

    /// BIP69 orders outputs by value, then script bytes.
    #[test]
    fn test_bip69_output_order() {
        let sorter = TransactionDataSorter::new(TransactionDataSortType::Bip69);
        let sorted = sorter.sort_outputs(vec![
            output(300, 0x02),
            output(100, 0x02),
            output(100, 0x01),
        ]);
        assert_eq!(sorted[0].value, 100);
        assert_eq!(sorted[0].locking_script.as_bytes(), &[0x01]);
        assert_eq!(sorted[1].value, 100);
        assert_eq!(sorted[2].value, 300);
    }

    /// BIP69 orders inputs by display txid, then output index.
    #[test]
    fn test_bip69_input_order() {
        let sorter = TransactionDataSorter::new(TransactionDataSortType::Bip69);
        let sorted =
            sorter.sort_unspent_outputs(vec![unspent(0x02, 1), unspent(0x01, 5), unspent(0x01, 2)]);
        assert_eq!(*sorted[0].output.transaction_hash.as_bytes(), [0x01; 32]);
        assert_eq!(sorted[0].output.index, 2);
        assert_eq!(sorted[1].output.index, 5);
        assert_eq!(*sorted[2].output.transaction_hash.as_bytes(), [0x02; 32]);
    }

    /// BIP69 is deterministic across repeated sorts.
    #[test]
    fn test_bip69_deterministic() {
        let sorter = TransactionDataSorter::new(TransactionDataSortType::Bip69);
        let items = vec![unspent(0x09, 0), unspent(0x03, 3), unspent(0x03, 1)];
        let first = sorter.sort_unspent_outputs(items.clone());
        let second = sorter.sort_unspent_outputs(items);
        let order =
            |v: &[UnspentOutput]| v.iter().map(|u| u.output.index).collect::<Vec<_>>();
        assert_eq!(order(&first), order(&second));
    }

    /// None preserves the given order.
    #[test]
    fn test_none_preserves_order() {
        let sorter = TransactionDataSorter::new(TransactionDataSortType::None);
        let sorted = sorter.sort_outputs(vec![output(300, 0x01), output(100, 0x02)]);
        assert_eq!(sorted[0].value, 300);
        assert_eq!(sorted[1].value, 100);
    }

    /// Shuffle keeps the same multiset of outputs.
    #[test]
    fn test_shuffle_preserves_contents() {
        let sorter = TransactionDataSorter::new(TransactionDataSortType::Shuffle);
        let sorted = sorter.sort_outputs(vec![output(1, 1), output(2, 2), output(3, 3)]);
        let mut values: Vec<u64> = sorted.iter().map(|o| o.value).collect();
        values.sort_unstable();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
