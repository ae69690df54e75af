use proptest::prelude::*;

use txforge_core::serializer::TransactionSerializer;
use txforge_core::transaction::{FullTransaction, Input, Output, Transaction};
use txforge_primitives::TxHash;
use txforge_script::{Script, ScriptType};

/// Strategy for a random input, optionally carrying a witness stack.
fn arb_input() -> impl Strategy<Value = Input> {
    (
        prop::array::uniform32(any::<u8>()),
        any::<u32>(),
        prop::collection::vec(any::<u8>(), 0..64),
        any::<u32>(),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..48), 0..3),
    )
        .prop_map(|(hash, index, script, sequence, witness)| {
            let mut input = Input::new(
                TxHash::new(hash),
                index,
                Script::from_bytes(&script),
                sequence,
            );
            input.witness_data = witness;
            input
        })
}

/// Strategy for a random output.
fn arb_output() -> impl Strategy<Value = Output> {
    (any::<u64>(), prop::collection::vec(any::<u8>(), 0..64)).prop_map(|(value, script)| {
        Output::new(value, Script::from_bytes(&script), ScriptType::Unknown)
    })
}

/// Strategy for a random finalized transaction. The segwit flag follows
/// the witness data so serialization is well-formed.
fn arb_transaction() -> impl Strategy<Value = FullTransaction> {
    (
        any::<i32>(),
        prop::collection::vec(arb_input(), 1..4),
        prop::collection::vec(arb_output(), 1..4),
        any::<u32>(),
    )
        .prop_map(|(version, inputs, outputs, lock_time)| {
            let mut header = Transaction::new(version, lock_time);
            header.seg_wit = inputs.iter().any(|input| !input.witness_data.is_empty());
            FullTransaction::new(header, inputs, outputs)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Deserializing a serialized transaction reproduces identical
    /// bytes and an identical transaction id.
    #[test]
    fn serialize_deserialize_roundtrip(tx in arb_transaction()) {
        let bytes = TransactionSerializer::serialize(&tx);
        let parsed = TransactionSerializer::deserialize(&bytes).unwrap();
        prop_assert_eq!(TransactionSerializer::serialize(&parsed), bytes);
        prop_assert_eq!(parsed.header.data_hash, tx.header.data_hash);
    }

    /// The id never depends on witness data.
    #[test]
    fn txid_is_witness_independent(tx in arb_transaction()) {
        let mut stripped_inputs = tx.inputs.clone();
        for input in &mut stripped_inputs {
            input.witness_data.clear();
        }
        let mut header = tx.header.clone();
        header.seg_wit = false;
        let stripped = FullTransaction::new(header, stripped_inputs, tx.outputs.clone());
        prop_assert_eq!(stripped.header.data_hash, tx.header.data_hash);
    }

    /// Trailing garbage after a transaction is rejected.
    #[test]
    fn trailing_bytes_rejected(tx in arb_transaction(), garbage in prop::collection::vec(any::<u8>(), 1..8)) {
        let mut bytes = TransactionSerializer::serialize(&tx);
        bytes.extend(garbage);
        prop_assert!(TransactionSerializer::deserialize(&bytes).is_err());
    }
}
