//! Canonical transaction serialization and signature preimages.
//!
//! Produces the wire bytes for finalized transactions (with and without
//! witness data), parses them back, and builds the two signature-hash
//! preimage layouts: the legacy form with other inputs' scripts emptied,
//! and the value-committing form (hashPrevouts / hashSequence /
//! hashOutputs) used for witness inputs and forked-sighash networks.
//!
//! The transaction id is always the double-SHA256 of the non-witness
//! serialization; segwit transactions keep a distinct witness id.

use txforge_primitives::hash::sha256d;
use txforge_primitives::{ByteReader, ByteWriter, TxHash, VarInt};
use txforge_script::{Script, ScriptType};

use crate::mutable::InputToSign;
use crate::transaction::{FullTransaction, Input, Output, Transaction};
use crate::CoreError;

/// Segwit serialization marker byte.
const SEGWIT_MARKER: u8 = 0x00;
/// Segwit serialization flag byte.
const SEGWIT_FLAG: u8 = 0x01;

/// Stateless transaction serializer.
pub struct TransactionSerializer;

impl TransactionSerializer {
    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Serialize a finalized transaction to wire bytes.
    ///
    /// Includes the segwit marker, flag, and per-input witness stacks
    /// when the header's segwit flag is set.
    ///
    /// # Arguments
    /// * `transaction` - The finalized transaction.
    ///
    /// # Returns
    /// The canonical wire bytes.
    pub fn serialize(transaction: &FullTransaction) -> Vec<u8> {
        Self::serialize_with_witness(transaction, true)
    }

    /// Serialize a transaction without witness data.
    ///
    /// This is the serialization the transaction id commits to,
    /// regardless of segwit status.
    ///
    /// # Arguments
    /// * `transaction` - The finalized transaction.
    ///
    /// # Returns
    /// The non-witness wire bytes.
    pub fn serialize_without_witness(transaction: &FullTransaction) -> Vec<u8> {
        Self::serialize_with_witness(transaction, false)
    }

    fn serialize_with_witness(transaction: &FullTransaction, with_witness: bool) -> Vec<u8> {
        let segwit = transaction.header.seg_wit && with_witness;
        let mut writer = ByteWriter::with_capacity(256);

        writer.write_i32_le(transaction.header.version);
        if segwit {
            writer.write_u8(SEGWIT_MARKER);
            writer.write_u8(SEGWIT_FLAG);
        }

        writer.write_varint(VarInt::from(transaction.inputs.len()));
        for input in &transaction.inputs {
            Self::write_input(&mut writer, input);
        }

        writer.write_varint(VarInt::from(transaction.outputs.len()));
        for output in &transaction.outputs {
            Self::write_output(&mut writer, output);
        }

        if segwit {
            for input in &transaction.inputs {
                writer.write_varint(VarInt::from(input.witness_data.len()));
                for item in &input.witness_data {
                    writer.write_var_bytes(item);
                }
            }
        }

        writer.write_u32_le(transaction.header.lock_time);
        writer.into_bytes()
    }

    fn write_input(writer: &mut ByteWriter, input: &Input) {
        writer.write_bytes(input.previous_output_tx_hash.as_bytes());
        writer.write_u32_le(input.previous_output_index);
        writer.write_var_bytes(input.signature_script.as_bytes());
        writer.write_u32_le(input.sequence);
    }

    fn write_output(writer: &mut ByteWriter, output: &Output) {
        writer.write_u64_le(output.value);
        writer.write_var_bytes(output.locking_script.as_bytes());
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from wire bytes.
    ///
    /// Accepts both legacy and segwit layouts and requires the slice to
    /// contain exactly one transaction. Output scripts are classified
    /// through the script codec on the way in.
    ///
    /// # Arguments
    /// * `bytes` - The raw transaction bytes.
    ///
    /// # Returns
    /// The parsed `FullTransaction`, or an error if the data is
    /// truncated, malformed, or has trailing bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<FullTransaction, CoreError> {
        let mut reader = ByteReader::new(bytes);

        let version = reader.read_i32_le()?;

        let segwit = reader.peek_u8(0)? == SEGWIT_MARKER;
        if segwit {
            reader.read_u8()?;
            let flag = reader.read_u8()?;
            if flag != SEGWIT_FLAG {
                return Err(CoreError::InvalidTransaction(format!(
                    "unexpected segwit flag 0x{:02x}",
                    flag
                )));
            }
        }

        let input_count = reader.read_varint()?.value() as usize;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(Self::read_input(&mut reader)?);
        }

        let output_count = reader.read_varint()?.value() as usize;
        let mut outputs = Vec::with_capacity(output_count);
        for index in 0..output_count {
            let mut output = Self::read_output(&mut reader)?;
            output.index = index as u32;
            outputs.push(output);
        }

        if segwit {
            for input in &mut inputs {
                let item_count = reader.read_varint()?.value() as usize;
                let mut witness = Vec::with_capacity(item_count);
                for _ in 0..item_count {
                    let len = reader.read_varint()?.value() as usize;
                    witness.push(reader.read_bytes(len)?.to_vec());
                }
                input.witness_data = witness;
            }
        }

        let lock_time = reader.read_u32_le()?;

        if reader.remaining() != 0 {
            return Err(CoreError::InvalidTransaction(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }

        let mut header = Transaction::new(version, lock_time);
        header.seg_wit = segwit;
        Ok(FullTransaction::new(header, inputs, outputs))
    }

    fn read_input(reader: &mut ByteReader) -> Result<Input, CoreError> {
        let hash = TxHash::from_bytes(reader.read_bytes(32)?)?;
        let index = reader.read_u32_le()?;
        let script_len = reader.read_varint()?.value() as usize;
        let script = Script::from_bytes(reader.read_bytes(script_len)?);
        let sequence = reader.read_u32_le()?;
        Ok(Input::new(hash, index, script, sequence))
    }

    fn read_output(reader: &mut ByteReader) -> Result<Output, CoreError> {
        let value = reader.read_u64_le()?;
        let script_len = reader.read_varint()?.value() as usize;
        let script = Script::from_bytes(reader.read_bytes(script_len)?);
        let script_type = script.script_type();
        let mut output = Output::new(value, script, script_type);
        output.key_hash = output.locking_script.standard_payload();
        Ok(output)
    }

    // -----------------------------------------------------------------
    // Signature preimages
    // -----------------------------------------------------------------

    /// Build the signature preimage for one input.
    ///
    /// With `forked` set, produces the value-committing layout (version,
    /// hashPrevouts, hashSequence, outpoint, scriptCode, value,
    /// sequence, hashOutputs, lock time); otherwise the legacy layout
    /// with all other inputs' scripts emptied. The 4-byte sighash type
    /// is appended by the caller.
    ///
    /// # Arguments
    /// * `transaction` - The draft header.
    /// * `inputs_to_sign` - All staged inputs with previous outputs.
    /// * `outputs` - The finalized output list.
    /// * `input_index` - Index of the input being signed.
    /// * `forked` - Use the value-committing digest layout.
    ///
    /// # Returns
    /// The preimage bytes, or an error when a required redeem script or
    /// key hash is missing.
    pub fn serialized_for_signature(
        transaction: &Transaction,
        inputs_to_sign: &[InputToSign],
        outputs: &[Output],
        input_index: usize,
        forked: bool,
    ) -> Result<Vec<u8>, CoreError> {
        if forked {
            Self::serialized_for_signature_witness(transaction, inputs_to_sign, outputs, input_index)
        } else {
            Self::serialized_for_signature_legacy(transaction, inputs_to_sign, outputs, input_index)
        }
    }

    fn serialized_for_signature_legacy(
        transaction: &Transaction,
        inputs_to_sign: &[InputToSign],
        outputs: &[Output],
        input_index: usize,
    ) -> Result<Vec<u8>, CoreError> {
        let mut writer = ByteWriter::with_capacity(256);
        writer.write_i32_le(transaction.version);

        writer.write_varint(VarInt::from(inputs_to_sign.len()));
        for (index, input_to_sign) in inputs_to_sign.iter().enumerate() {
            let input = &input_to_sign.input;
            writer.write_bytes(input.previous_output_tx_hash.as_bytes());
            writer.write_u32_le(input.previous_output_index);
            if index == input_index {
                let script_code = Self::legacy_script_code(&input_to_sign.previous_output)?;
                writer.write_var_bytes(&script_code);
            } else {
                writer.write_varint(VarInt(0));
            }
            writer.write_u32_le(input.sequence);
        }

        writer.write_varint(VarInt::from(outputs.len()));
        for output in outputs {
            Self::write_output(&mut writer, output);
        }

        writer.write_u32_le(transaction.lock_time);
        Ok(writer.into_bytes())
    }

    fn serialized_for_signature_witness(
        transaction: &Transaction,
        inputs_to_sign: &[InputToSign],
        outputs: &[Output],
        input_index: usize,
    ) -> Result<Vec<u8>, CoreError> {
        let input_to_sign = &inputs_to_sign[input_index];
        let input = &input_to_sign.input;
        let previous_output = &input_to_sign.previous_output;

        let mut prevouts = ByteWriter::with_capacity(inputs_to_sign.len() * 36);
        let mut sequences = ByteWriter::with_capacity(inputs_to_sign.len() * 4);
        for staged in inputs_to_sign {
            prevouts.write_bytes(staged.input.previous_output_tx_hash.as_bytes());
            prevouts.write_u32_le(staged.input.previous_output_index);
            sequences.write_u32_le(staged.input.sequence);
        }

        let mut outputs_writer = ByteWriter::new();
        for output in outputs {
            Self::write_output(&mut outputs_writer, output);
        }

        let script_code = Self::witness_script_code(previous_output)?;

        let mut writer = ByteWriter::with_capacity(256);
        writer.write_i32_le(transaction.version);
        writer.write_bytes(&sha256d(prevouts.as_bytes()));
        writer.write_bytes(&sha256d(sequences.as_bytes()));
        writer.write_bytes(input.previous_output_tx_hash.as_bytes());
        writer.write_u32_le(input.previous_output_index);
        writer.write_var_bytes(&script_code);
        writer.write_u64_le(previous_output.value);
        writer.write_u32_le(input.sequence);
        writer.write_bytes(&sha256d(outputs_writer.as_bytes()));
        writer.write_u32_le(transaction.lock_time);
        Ok(writer.into_bytes())
    }

    /// The scriptCode for the legacy digest: the redeem script for
    /// P2SH, the locking script otherwise.
    fn legacy_script_code(previous_output: &Output) -> Result<Vec<u8>, CoreError> {
        match previous_output.script_type {
            ScriptType::P2sh => previous_output
                .redeem_script
                .as_ref()
                .map(|script| script.as_bytes().to_vec())
                .ok_or(CoreError::NoRedeemScript),
            _ => Ok(previous_output.locking_script.as_bytes().to_vec()),
        }
    }

    /// The scriptCode for the value-committing digest: the P2PKH-style
    /// script over the key hash for key-hash witness programs, the
    /// redeem/witness script for script-hash types.
    fn witness_script_code(previous_output: &Output) -> Result<Vec<u8>, CoreError> {
        match previous_output.script_type {
            ScriptType::P2wpkh | ScriptType::P2wpkhSh => {
                let key_hash = previous_output
                    .key_hash
                    .as_ref()
                    .ok_or(CoreError::NoPreviousOutputKeyHash)?;
                Ok(Script::p2pkh_lock(key_hash).into_bytes())
            }
            ScriptType::P2sh | ScriptType::P2wsh => previous_output
                .redeem_script
                .as_ref()
                .map(|script| script.as_bytes().to_vec())
                .ok_or(CoreError::NoRedeemScript),
            _ => Ok(previous_output.locking_script.as_bytes().to_vec()),
        }
    }
}
