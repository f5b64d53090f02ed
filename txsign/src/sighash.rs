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

//! Sighash preimage construction: the pre-BIP143 ("legacy") algorithm and
//! BIP143's version-0 segwit algorithm, both driven from a [`Tx`] snapshot
//! rather than from any wallet state.

use bc_consensus::{ConsensusEncode, Sats, ScriptBytes, SeqNo, SighashFlag, SighashType, Tx};
use bc_hashes::{hash256, sha256};

use crate::utxo::Utxo;

/// The fixed 32-byte digest `0x00...01` consensus mandates when a
/// `SIGHASH_SINGLE` input has no corresponding output.
const SIGHASH_SINGLE_BUG_DIGEST: [u8; 32] = {
    let mut bytes = [0u8; 32];
    bytes[0] = 1;
    bytes
};

/// Pre-segwit sighash preimage for `input_index`, hashing `subscript` in
/// place of that input's signature script and applying the `ALL`/`NONE`/
/// `SINGLE`/`ANYONECANPAY` transformations before double-SHA256ing the
/// result.
///
/// The `SIGHASH_SINGLE`-with-no-matching-output rule is checked against the
/// transaction's actual output count before any pruning, independently of
/// whether `ANYONECANPAY` is also set.
pub fn legacy_sighash(tx: &Tx, input_index: usize, subscript: &[u8], sighash_type: SighashType) -> [u8; 32] {
    if sighash_type.flag == SighashFlag::Single && input_index >= tx.outputs.len() {
        return SIGHASH_SINGLE_BUG_DIGEST;
    }

    let mut tx = tx.clone();
    for input in tx.inputs.iter_mut() {
        input.sig_script = bc_consensus::SigScript::empty();
    }
    tx.inputs[input_index].sig_script = bc_consensus::SigScript::from_unsafe(subscript.to_vec());

    match sighash_type.flag {
        SighashFlag::All => {}
        SighashFlag::None => {
            tx.outputs = amplify::confinement::Confined::try_from(Vec::new())
                .expect("empty collection always satisfies a 0-lower-bound confinement");
            for (i, input) in tx.inputs.iter_mut().enumerate() {
                if i != input_index {
                    input.sequence = SeqNo::from_consensus_u32(0);
                }
            }
        }
        SighashFlag::Single => {
            let mut outputs: Vec<_> = tx.outputs[..=input_index].to_vec();
            for output in outputs.iter_mut().take(input_index) {
                output.value = Sats(u64::MAX);
                output.script_pubkey = bc_consensus::ScriptPubkey::new();
            }
            tx.outputs =
                amplify::confinement::Confined::try_from(outputs).expect("pruned to a smaller, still-valid length");
            for (i, input) in tx.inputs.iter_mut().enumerate() {
                if i != input_index {
                    input.sequence = SeqNo::from_consensus_u32(0);
                }
            }
        }
    }

    if sighash_type.anyone_can_pay {
        let signed_input = tx.inputs[input_index].clone();
        tx.inputs = amplify::confinement::Confined::try_from(vec![signed_input])
            .expect("a single-element vector always satisfies a 0-lower-bound confinement");
    }

    let mut buf = Vec::new();
    tx.version.consensus_encode(&mut buf).expect("in-memory writing can't fail");
    tx.inputs.consensus_encode(&mut buf).expect("in-memory writing can't fail");
    tx.outputs.consensus_encode(&mut buf).expect("in-memory writing can't fail");
    tx.lock_time.consensus_encode(&mut buf).expect("in-memory writing can't fail");
    buf.extend_from_slice(&sighash_type.to_consensus_u32().to_le_bytes());
    hash256(&buf)
}

/// BIP143 version-0 segwit sighash preimage: `nVersion || hashPrevouts ||
/// hashSequence || outpoint || scriptCode || value || nSequence ||
/// hashOutputs || nLocktime || sighash`.
pub fn segwit_v0_sighash(
    tx: &Tx,
    input_index: usize,
    script_code: &[u8],
    value: impl Into<Sats>,
    sighash_type: SighashType,
) -> [u8; 32] {
    let value = value.into();
    let input = &tx.inputs[input_index];

    let hash_prevouts = if sighash_type.anyone_can_pay {
        [0u8; 32]
    } else {
        let mut buf = Vec::new();
        for txin in tx.inputs() {
            txin.prev_output.consensus_encode(&mut buf).expect("in-memory writing can't fail");
        }
        hash256(&buf)
    };

    let hash_sequence = if sighash_type.anyone_can_pay || sighash_type.flag != SighashFlag::All {
        [0u8; 32]
    } else {
        let mut buf = Vec::new();
        for txin in tx.inputs() {
            txin.sequence.consensus_encode(&mut buf).expect("in-memory writing can't fail");
        }
        hash256(&buf)
    };

    let hash_outputs = match sighash_type.flag {
        SighashFlag::All => {
            let mut buf = Vec::new();
            for txout in tx.outputs() {
                txout.consensus_encode(&mut buf).expect("in-memory writing can't fail");
            }
            hash256(&buf)
        }
        SighashFlag::Single if input_index < tx.outputs.len() => {
            let mut buf = Vec::new();
            tx.outputs[input_index]
                .consensus_encode(&mut buf)
                .expect("in-memory writing can't fail");
            hash256(&buf)
        }
        SighashFlag::Single | SighashFlag::None => [0u8; 32],
    };

    let mut buf = Vec::new();
    tx.version.consensus_encode(&mut buf).expect("in-memory writing can't fail");
    buf.extend_from_slice(&hash_prevouts);
    buf.extend_from_slice(&hash_sequence);
    input.prev_output.consensus_encode(&mut buf).expect("in-memory writing can't fail");
    ScriptBytes::from_unsafe(script_code.to_vec())
        .consensus_encode(&mut buf)
        .expect("in-memory writing can't fail");
    value.consensus_encode(&mut buf).expect("in-memory writing can't fail");
    input.sequence.consensus_encode(&mut buf).expect("in-memory writing can't fail");
    buf.extend_from_slice(&hash_outputs);
    tx.lock_time.consensus_encode(&mut buf).expect("in-memory writing can't fail");
    buf.extend_from_slice(&sighash_type.to_consensus_u32().to_le_bytes());
    hash256(&buf)
}

/// BIP340 tagged hash: `SHA256(SHA256(tag) || SHA256(tag) || msg)`.
pub fn tagged_hash(tag: &[u8], msg: &[u8]) -> [u8; 32] {
    let tag_hash = sha256(tag);
    let mut engine = Vec::with_capacity(tag_hash.len() * 2 + msg.len());
    engine.extend_from_slice(&tag_hash);
    engine.extend_from_slice(&tag_hash);
    engine.extend_from_slice(msg);
    sha256(&engine)
}

/// BIP341 key-path sighash (the "Common Signature Message Extension", scoped
/// to a single-item, no-annex witness stack). `prevouts` must hold every
/// input's spent [`Utxo`] in transaction input order: the commitment covers
/// the whole set of inputs' outpoints/amounts/scriptPubkeys/sequences
/// regardless of which input is being signed. `hash_type` is the literal
/// byte carried by the signature (0x00 for a 64-byte signature's implied
/// default, otherwise its trailing 65th byte).
pub fn taproot_key_path_sighash(tx: &Tx, input_index: usize, prevouts: &[Utxo], hash_type: u8) -> [u8; 32] {
    let anyone_can_pay = hash_type & 0x80 != 0;
    let base_type = hash_type & 0x03;

    let mut buf = Vec::new();
    buf.push(0x00); // epoch
    buf.push(hash_type);
    buf.extend_from_slice(&tx.version.to_consensus_i32().to_le_bytes());
    buf.extend_from_slice(&tx.lock_time.to_consensus_u32().to_le_bytes());

    if !anyone_can_pay {
        let mut prevout_buf = Vec::new();
        let mut amount_buf = Vec::new();
        let mut spk_buf = Vec::new();
        let mut sequence_buf = Vec::new();
        for (txin, utxo) in tx.inputs().zip(prevouts) {
            txin.prev_output.consensus_encode(&mut prevout_buf).expect("in-memory writing can't fail");
            utxo.value.consensus_encode(&mut amount_buf).expect("in-memory writing can't fail");
            utxo.script_pubkey.consensus_encode(&mut spk_buf).expect("in-memory writing can't fail");
            txin.sequence.consensus_encode(&mut sequence_buf).expect("in-memory writing can't fail");
        }
        buf.extend_from_slice(&sha256(&prevout_buf));
        buf.extend_from_slice(&sha256(&amount_buf));
        buf.extend_from_slice(&sha256(&spk_buf));
        buf.extend_from_slice(&sha256(&sequence_buf));
    }

    if base_type != 2 && base_type != 3 {
        let mut output_buf = Vec::new();
        for txout in tx.outputs() {
            txout.consensus_encode(&mut output_buf).expect("in-memory writing can't fail");
        }
        buf.extend_from_slice(&sha256(&output_buf));
    }

    buf.push(0x00); // spend_type: key path, no annex

    if anyone_can_pay {
        let input = &tx.inputs[input_index];
        let utxo = &prevouts[input_index];
        input.prev_output.consensus_encode(&mut buf).expect("in-memory writing can't fail");
        utxo.value.consensus_encode(&mut buf).expect("in-memory writing can't fail");
        utxo.script_pubkey.consensus_encode(&mut buf).expect("in-memory writing can't fail");
        input.sequence.consensus_encode(&mut buf).expect("in-memory writing can't fail");
    } else {
        buf.extend_from_slice(&(input_index as u32).to_le_bytes());
    }

    if base_type == 3 {
        let mut single_buf = Vec::new();
        tx.outputs[input_index].consensus_encode(&mut single_buf).expect("in-memory writing can't fail");
        buf.extend_from_slice(&sha256(&single_buf));
    }

    tagged_hash(b"TapSighash", &buf)
}

#[cfg(test)]
mod test {
    use amplify::hex::FromHex;
    use bc_consensus::{ConsensusDecode, Tx};

    use super::*;

    fn sample_tx() -> Tx {
        let hex = "0100000001a15d57094aa7a21a28cb20b59aab8fc7d1149a3bdbcddba9c622e4f5f6a99ece01000000\
            6c493046022100f93bb0e7d8db7bd46e40132d1f8242026e045f03a0efe71bbb8e3f475e970d790221009337\
            cd7f1f929f00cc6ff01f03729b069a7c21b59b1736ddfee5db5946c5da8c0121033b9b137ee87d5a812d6f50\
            6efdd37f0affa7ffc310711c06c7f3e097c9447c52ffffffff0100e1f505000000001976a9140389035a9225\
            b3839e2bbf32d826a1e222031fd888ac00000000";
        let data = Vec::<u8>::from_hex(hex).unwrap();
        Tx::consensus_deserialize(data).unwrap()
    }

    #[test]
    fn sighash_single_out_of_range_is_the_fixed_bug_digest() {
        let tx = sample_tx();
        let digest = legacy_sighash(&tx, 5, &[], SighashType::single());
        assert_eq!(digest, SIGHASH_SINGLE_BUG_DIGEST);
    }

    #[test]
    fn sighash_all_is_deterministic() {
        let tx = sample_tx();
        let subscript = tx.outputs[0].script_pubkey.as_script_bytes().as_slice().to_vec();
        let a = legacy_sighash(&tx, 0, &subscript, SighashType::all());
        let b = legacy_sighash(&tx, 0, &subscript, SighashType::all());
        assert_eq!(a, b);
    }

    #[test]
    fn anyone_can_pay_and_plain_all_diverge() {
        let tx = sample_tx();
        let subscript = tx.outputs[0].script_pubkey.as_script_bytes().as_slice().to_vec();
        let all = legacy_sighash(&tx, 0, &subscript, SighashType::all());
        let acp = legacy_sighash(&tx, 0, &subscript, SighashType::all_anyone_can_pay());
        assert_ne!(all, acp);
    }
}
