// Bitcoin wallet cryptographic primitives library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2019-2024 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2019-2024 LNP/BP Standards Association. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The wallet-facing surface over a bare [`Tx`]: building inputs/outputs,
//! hashing and digest accessors, fee/weight accounting, RBF opt-in, and
//! verification against a [`UtxoRegistry`] — all as an extension trait so
//! `bc_consensus::Tx` stays the one transaction type callers hold.

use bc_consensus::{
    Chain, ConsensusDecode, ConsensusDecodeError, ConsensusEncode, Outpoint, Sats, ScriptPubkey, SeqNo,
    SighashType, Tx, TxIn, TxOut, Txid, VBytes, VarIntArray, Weight, WeightUnits, Witness,
};
use bc_script::{classify, ScriptClass};

use crate::error::{Error, VerifyWarning};
use crate::sighash::{legacy_sighash, segwit_v0_sighash};
use crate::utxo::UtxoRegistry;
use crate::verifier::verify_transaction;

pub trait TxExt {
    fn add_input(&mut self, prev_output: Outpoint, sequence: SeqNo);

    fn add_output(&mut self, script_pubkey: impl Into<ScriptPubkey>, value: impl Into<Sats>);

    fn to_serialized(&self) -> Vec<u8>;

    fn from_serialized(bytes: impl AsRef<[u8]>) -> Result<Tx, ConsensusDecodeError>;

    fn get_hash(&self) -> Txid;

    /// Computes the signing digest for `index`, resolving its spent value
    /// and template from `utxos` and dispatching to the legacy or BIP143
    /// algorithm. `subscript` overrides the script hashed in place of the
    /// UTXO's own `scriptPubkey`, needed for P2SH/P2WSH inputs where the
    /// redeem or witness script — not the UTXO's `scriptPubkey` — is what
    /// gets signed over.
    fn get_digest(
        &self,
        utxos: &UtxoRegistry,
        index: usize,
        sighash_type: SighashType,
        subscript: Option<&[u8]>,
    ) -> Result<[u8; 32], Error>;

    fn verify(&self, utxos: &UtxoRegistry, block: Option<&Chain>) -> Result<Vec<VerifyWarning>, Error>;

    fn fee(&self, utxos: &UtxoRegistry) -> Result<Sats, Error>;

    fn fee_rate(&self, utxos: &UtxoRegistry) -> Result<f64, Error>;

    fn virtual_size(&self) -> VBytes;

    fn weight(&self) -> WeightUnits;

    /// Opts every input into replace-by-fee, per BIP125, by lowering each
    /// sequence number below the RBF threshold.
    fn set_rbf(&mut self);

    fn has_rbf(&self) -> bool;
}

impl TxExt for Tx {
    fn add_input(&mut self, prev_output: Outpoint, sequence: SeqNo) {
        let mut inputs: Vec<TxIn> = self.inputs().cloned().collect();
        inputs.push(TxIn {
            prev_output,
            sig_script: bc_consensus::SigScript::empty(),
            sequence,
            witness: Witness::new(),
        });
        self.inputs = VarIntArray::try_from(inputs).expect("u32 bound on a transaction's input count");
    }

    fn add_output(&mut self, script_pubkey: impl Into<ScriptPubkey>, value: impl Into<Sats>) {
        let mut outputs: Vec<TxOut> = self.outputs().cloned().collect();
        outputs.push(TxOut::new(script_pubkey, value));
        self.outputs = VarIntArray::try_from(outputs).expect("u32 bound on a transaction's output count");
    }

    fn to_serialized(&self) -> Vec<u8> { self.consensus_serialize() }

    fn from_serialized(bytes: impl AsRef<[u8]>) -> Result<Tx, ConsensusDecodeError> { Tx::consensus_deserialize(bytes) }

    fn get_hash(&self) -> Txid { self.txid() }

    fn get_digest(
        &self,
        utxos: &UtxoRegistry,
        index: usize,
        sighash_type: SighashType,
        subscript: Option<&[u8]>,
    ) -> Result<[u8; 32], Error> {
        let input = self
            .inputs
            .get(index)
            .ok_or_else(|| Error::Sign(index, "input index out of range".to_string()))?;
        let utxo = utxos.get(input.prev_output).ok_or(Error::Transaction(index, input.prev_output))?;
        let segwit = matches!(classify(&utxo.script_pubkey), ScriptClass::P2wpkh | ScriptClass::P2wsh);
        let owned_subscript;
        let subscript = match subscript {
            Some(script) => script,
            None => {
                owned_subscript = utxo.script_pubkey.as_script_bytes().as_slice().to_vec();
                &owned_subscript
            }
        };
        Ok(if segwit {
            segwit_v0_sighash(self, index, subscript, utxo.value, sighash_type)
        } else {
            legacy_sighash(self, index, subscript, sighash_type)
        })
    }

    fn verify(&self, utxos: &UtxoRegistry, block: Option<&Chain>) -> Result<Vec<VerifyWarning>, Error> {
        verify_transaction(self, utxos, block)
    }

    fn fee(&self, utxos: &UtxoRegistry) -> Result<Sats, Error> {
        let mut input_total = Sats::ZERO;
        for (index, input) in self.inputs().enumerate() {
            let utxo = utxos.get(input.prev_output).ok_or(Error::Transaction(index, input.prev_output))?;
            input_total.0 += utxo.value.0;
        }
        let mut output_total = Sats::ZERO;
        for output in self.outputs() {
            output_total.0 += output.value.0;
        }
        input_total
            .checked_sub(output_total)
            .ok_or(Error::Inflation(input_total, output_total))
    }

    fn fee_rate(&self, utxos: &UtxoRegistry) -> Result<f64, Error> {
        let fee = self.fee(utxos)?;
        let vsize = self.virtual_size().to_u32().max(1);
        Ok(fee.0 as f64 / vsize as f64)
    }

    fn virtual_size(&self) -> VBytes { self.vbytes() }

    fn weight(&self) -> WeightUnits { self.weight_units() }

    fn set_rbf(&mut self) {
        for input in self.inputs.iter_mut() {
            input.sequence = SeqNo::RBF;
        }
    }

    fn has_rbf(&self) -> bool { self.inputs().any(|input| input.sequence.is_rbf()) }
}

#[cfg(test)]
mod test {
    use bc_consensus::{LockTime, SigScript, TxIn, TxOut, TxVer, Txid, Vout};
    use bc_keys::PrivateKey;
    use bc_network::registry;

    use super::*;
    use crate::signer::sign_p2pkh;
    use crate::utxo::Utxo;

    fn key(byte: u8) -> PrivateKey { PrivateKey::from_slice(&registry().default_network(), &[byte; 32], true).unwrap() }

    fn empty_tx() -> Tx {
        Tx {
            version: TxVer::V2,
            inputs: vec![].try_into().unwrap(),
            outputs: vec![].try_into().unwrap(),
            lock_time: LockTime::Unset,
        }
    }

    #[test]
    fn add_input_and_output_grow_the_transaction() {
        let mut tx = empty_tx();
        let prev = Outpoint::new(Txid::from([0x60; 32]), Vout::from_u32(1));
        tx.add_input(prev, SeqNo::FINAL);
        tx.add_output(ScriptPubkey::p2pkh([0x44; 20]), 1_000u64);
        assert_eq!(tx.inputs().len(), 1);
        assert_eq!(tx.outputs().len(), 1);
        assert_eq!(tx.inputs[0].prev_output, prev);
    }

    #[test]
    fn serialization_roundtrips() {
        let mut tx = empty_tx();
        tx.add_output(ScriptPubkey::p2pkh([0x44; 20]), 1_000u64);
        let bytes = tx.to_serialized();
        let decoded = Tx::from_serialized(&bytes).unwrap();
        assert_eq!(decoded.get_hash(), tx.get_hash());
    }

    #[test]
    fn fee_is_input_minus_output_value() {
        let signer = key(0x61);
        let script_pubkey = ScriptPubkey::p2pkh(signer.public_key().pubkey_hash());
        let prev = Outpoint::new(Txid::from([0x62; 32]), Vout::from_u32(0));

        let mut tx = empty_tx();
        tx.inputs = vec![TxIn {
            prev_output: prev,
            sig_script: SigScript::empty(),
            sequence: SeqNo::FINAL,
            witness: Witness::new(),
        }]
        .try_into()
        .unwrap();
        tx.add_output(ScriptPubkey::p2pkh([0x45; 20]), 90_000u64);

        sign_p2pkh(&mut tx, 0, &script_pubkey, &signer, SighashType::all()).unwrap();

        let utxos = UtxoRegistry::new();
        utxos.insert(prev, Utxo::new(100_000u64, script_pubkey));

        assert_eq!(tx.fee(&utxos).unwrap(), Sats(10_000));
        tx.verify(&utxos, None).unwrap();
    }

    #[test]
    fn set_rbf_makes_every_input_opt_in() {
        let mut tx = empty_tx();
        tx.add_input(Outpoint::new(Txid::from([0x63; 32]), Vout::from_u32(0)), SeqNo::FINAL);
        assert!(!tx.has_rbf());
        tx.set_rbf();
        assert!(tx.has_rbf());
    }
}
