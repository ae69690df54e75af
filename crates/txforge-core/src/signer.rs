//! Signature hash computation and signature placement.
//!
//! `InputSigner` builds the digest and signing data for one input,
//! keyed by the previous output's script type; `TransactionSigner`
//! walks the staged inputs placing caller-supplied signatures into
//! signature scripts and witness stacks, or collects the digests for
//! an external signer.
//!
//! The digest variant is chosen per network, not per script type alone:
//! witness inputs always use the value-committing digest, and a forked
//! network forces it for legacy inputs too.

use txforge_primitives::hash::sha256d;
use txforge_script::{Script, ScriptType};

use crate::keys::HashForSign;
use crate::mutable::{InputToSign, MutableTransaction};
use crate::network::SigHash;
use crate::serializer::TransactionSerializer;
use crate::transaction::{Output, Transaction};
use crate::CoreError;

/// Script types this signer can place signatures for.
fn is_signable(script_type: ScriptType) -> bool {
    matches!(
        script_type,
        ScriptType::P2pkh
            | ScriptType::P2wpkh
            | ScriptType::P2wpkhSh
            | ScriptType::P2sh
            | ScriptType::P2wsh
    )
}

/// Computes per-input signature hashes and signing data.
pub struct InputSigner {
    sig_hash: SigHash,
}

impl InputSigner {
    /// Create an input signer for a network's sighash configuration.
    ///
    /// # Arguments
    /// * `sig_hash` - The network's sighash variant.
    ///
    /// # Returns
    /// A new `InputSigner`.
    pub fn new(sig_hash: SigHash) -> Self {
        InputSigner { sig_hash }
    }

    fn uses_witness_digest(&self, previous_output: &Output) -> bool {
        previous_output.script_type.is_witness() || self.sig_hash.forked
    }

    /// The ordered data items a signature script or witness is built
    /// from: the signature with the sighash byte appended, plus the
    /// public key for key-hash script types.
    ///
    /// # Arguments
    /// * `inputs_to_sign` - All staged inputs.
    /// * `index` - Index of the input being signed.
    /// * `input_signature` - The caller-supplied raw signature.
    ///
    /// # Returns
    /// The signing data items.
    pub fn sig_script_data(
        &self,
        inputs_to_sign: &[InputToSign],
        index: usize,
        input_signature: &[u8],
    ) -> Vec<Vec<u8>> {
        let input_to_sign = &inputs_to_sign[index];
        let mut signature = Vec::with_capacity(input_signature.len() + 1);
        signature.extend_from_slice(input_signature);
        signature.push(self.sig_hash.value);

        match input_to_sign.previous_output.script_type {
            ScriptType::P2pk | ScriptType::P2sh | ScriptType::P2wsh => vec![signature],
            _ => vec![
                signature,
                input_to_sign.previous_output_public_key.raw.clone(),
            ],
        }
    }

    /// The digest the input's signature must commit to.
    ///
    /// # Arguments
    /// * `transaction` - The draft header.
    /// * `inputs_to_sign` - All staged inputs.
    /// * `outputs` - The finalized outputs.
    /// * `index` - Index of the input being signed.
    ///
    /// # Returns
    /// The 32-byte double-SHA256 digest.
    pub fn sig_script_hash_to_sign(
        &self,
        transaction: &Transaction,
        inputs_to_sign: &[InputToSign],
        outputs: &[Output],
        index: usize,
    ) -> Result<[u8; 32], CoreError> {
        let forked = self.uses_witness_digest(&inputs_to_sign[index].previous_output);
        let mut serialized = TransactionSerializer::serialized_for_signature(
            transaction,
            inputs_to_sign,
            outputs,
            index,
            forked,
        )?;
        serialized.extend_from_slice(&(self.sig_hash.value as u32).to_le_bytes());
        Ok(sha256d(&serialized))
    }
}

/// Places signatures according to the previous output's script type.
pub struct TransactionSigner {
    input_signer: InputSigner,
}

impl TransactionSigner {
    /// Create a transaction signer.
    ///
    /// # Arguments
    /// * `input_signer` - The per-input digest and data builder.
    ///
    /// # Returns
    /// A new `TransactionSigner`.
    pub fn new(input_signer: InputSigner) -> Self {
        TransactionSigner { input_signer }
    }

    /// Place caller-supplied detached signatures into the draft.
    ///
    /// One raw signature per input, in input order. Witness inputs set
    /// the transaction's segwit flag; script-hash inputs without a
    /// redeem script fail.
    ///
    /// # Arguments
    /// * `mutable_transaction` - The draft with outputs finalized.
    /// * `signatures` - The detached signatures.
    ///
    /// # Returns
    /// `Ok(())`, or a script/placement error.
    pub fn sign(
        &self,
        mutable_transaction: &mut MutableTransaction,
        signatures: &[Vec<u8>],
    ) -> Result<(), CoreError> {
        if signatures.len() != mutable_transaction.inputs_to_sign.len() {
            return Err(CoreError::SignatureCountMismatch {
                expected: mutable_transaction.inputs_to_sign.len(),
                got: signatures.len(),
            });
        }

        for index in 0..mutable_transaction.inputs_to_sign.len() {
            let script_type =
                mutable_transaction.inputs_to_sign[index].previous_output.script_type;
            if !is_signable(script_type) {
                return Err(CoreError::NotSupportedScriptType);
            }

            let sig_script_data = self.input_signer.sig_script_data(
                &mutable_transaction.inputs_to_sign,
                index,
                &signatures[index],
            );

            let input_to_sign = &mut mutable_transaction.inputs_to_sign[index];
            match script_type {
                ScriptType::P2pkh => {
                    input_to_sign.input.signature_script = signature_script(&sig_script_data)?;
                }
                ScriptType::P2wpkh => {
                    mutable_transaction.transaction.seg_wit = true;
                    input_to_sign.input.witness_data = sig_script_data;
                }
                ScriptType::P2wpkhSh => {
                    mutable_transaction.transaction.seg_wit = true;
                    let key_hash = &input_to_sign.previous_output_public_key.key_hash;
                    let redeem_script = Script::witness_lock(0, key_hash)?;
                    input_to_sign.input.witness_data = sig_script_data;
                    let mut script = Script::new();
                    script.append_push_data(redeem_script.as_bytes())?;
                    input_to_sign.input.signature_script = script;
                }
                ScriptType::P2sh => {
                    let previous_output = &input_to_sign.previous_output;
                    let redeem_script = previous_output
                        .redeem_script
                        .clone()
                        .ok_or(CoreError::NoRedeemScript)?;

                    if let Some(function) = previous_output.signature_script_function.clone() {
                        input_to_sign.input.signature_script =
                            Script::from_bytes(&function(&sig_script_data));
                    } else {
                        let mut data = sig_script_data;
                        data.push(redeem_script.into_bytes());
                        input_to_sign.input.signature_script = signature_script(&data)?;
                    }
                }
                ScriptType::P2wsh => {
                    mutable_transaction.transaction.seg_wit = true;
                    let witness_script = input_to_sign
                        .previous_output
                        .redeem_script
                        .clone()
                        .ok_or(CoreError::NoRedeemScript)?;
                    input_to_sign.input.witness_data = vec![
                        Vec::new(),
                        sig_script_data[0].clone(),
                        witness_script.into_bytes(),
                    ];
                }
                _ => return Err(CoreError::NotSupportedScriptType),
            }
        }
        Ok(())
    }

    /// Collect the digests an external signer must sign.
    ///
    /// Places nothing; returns one (digest, public key) pair per input
    /// in input order.
    ///
    /// # Arguments
    /// * `mutable_transaction` - The draft with outputs finalized.
    ///
    /// # Returns
    /// The ordered digests, or a script error.
    pub fn hashes_to_sign(
        &self,
        mutable_transaction: &MutableTransaction,
    ) -> Result<Vec<HashForSign>, CoreError> {
        let mut hashes = Vec::with_capacity(mutable_transaction.inputs_to_sign.len());
        for (index, input_to_sign) in mutable_transaction.inputs_to_sign.iter().enumerate() {
            if !is_signable(input_to_sign.previous_output.script_type) {
                return Err(CoreError::NotSupportedScriptType);
            }
            let hash = self.input_signer.sig_script_hash_to_sign(
                &mutable_transaction.transaction,
                &mutable_transaction.inputs_to_sign,
                mutable_transaction.outputs(),
                index,
            )?;
            hashes.push(HashForSign {
                hash,
                public_key: input_to_sign.previous_output_public_key.clone(),
            });
        }
        Ok(hashes)
    }
}

/// Push-encode the signing data items into a signature script.
fn signature_script(data: &[Vec<u8>]) -> Result<Script, CoreError> {
    let mut script = Script::new();
    for item in data {
        script.append_push_data(item)?;
    }
    Ok(script)
}
