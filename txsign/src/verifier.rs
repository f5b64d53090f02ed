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

//! Script-driven transaction verification: per-input UTXO resolution,
//! template dispatch (legacy / P2SH / native and wrapped segwit / taproot
//! key-path), amount conservation, and absolute/relative locktime
//! enforcement.

use bc_consensus::{Chain, OpCode, RelativeLockTime, Sats, ScriptPubkey, SeqNo, Tx, WitnessVer};
use bc_script::{classify, ScriptClass};
use bc_scriptexec::{run, ExecError, Stack};
use secp256k1::{schnorr, Message, XOnlyPublicKey, SECP256K1};

use crate::checker::TxChecker;
use crate::error::{Error, ScriptPhase, VerifyWarning};
use crate::sighash::taproot_key_path_sighash;
use crate::utxo::{Utxo, UtxoRegistry};

/// Verifies every input of `tx` against the UTXOs it spends, `block` being
/// the confirming block's chain position (used for absolute and relative
/// locktime enforcement). If `block` is `None` and the transaction's
/// absolute locktime is otherwise in effect, that check is skipped rather
/// than failed and reported back as a [`VerifyWarning`], since there is no
/// chain tip to evaluate it against.
pub fn verify_transaction(tx: &Tx, utxos: &UtxoRegistry, block: Option<&Chain>) -> Result<Vec<VerifyWarning>, Error> {
    let mut input_total = Sats::ZERO;
    let mut output_total = Sats::ZERO;
    for output in tx.outputs() {
        output_total.0 += output.value.0;
    }

    let mut prevouts = Vec::with_capacity(tx.inputs.len());
    for (index, input) in tx.inputs().enumerate() {
        let utxo = utxos.get(input.prev_output).ok_or(Error::Transaction(index, input.prev_output))?;
        input_total.0 += utxo.value.0;
        prevouts.push(utxo);
    }

    for index in 0..prevouts.len() {
        verify_input_script(tx, index, &prevouts)?;
        verify_relative_locktime(tx, index, &prevouts[index], block)?;
    }

    if input_total.0 < output_total.0 {
        return Err(Error::Inflation(input_total, output_total));
    }

    let mut warnings = Vec::new();
    // BIP65: a transaction's absolute locktime has no consensus meaning at
    // all unless at least one input's sequence leaves it enabled.
    if tx.inputs().any(|i| i.sequence.enables_locktime()) {
        match block {
            Some(block) => {
                let chain_tip = match tx.lock_time.to_timestamp() {
                    Some(_) => block.median_time_past(),
                    None => block.height(),
                };
                if tx.lock_time.is_satisfied_by(chain_tip) == Some(false) {
                    return Err(Error::Premature(tx.lock_time));
                }
            }
            None if !tx.lock_time.is_unset() => warnings.push(VerifyWarning::LocktimeUnchecked),
            None => {}
        }
    }

    Ok(warnings)
}

/// Enforces BIP68: only applies to version-2+ transactions, and only to
/// inputs whose sequence has relative locktime enabled. Requires both the
/// UTXO's own confirmation height/MTP and the spending transaction's
/// (`spending_block`) to measure elapsed blocks/time between them; skipped
/// (not failed) when either is unknown.
fn verify_relative_locktime(
    tx: &Tx,
    index: usize,
    utxo: &Utxo,
    spending_block: Option<&Chain>,
) -> Result<(), Error> {
    if tx.version.to_consensus_i32() < 2 {
        return Ok(());
    }
    let sequence = tx.inputs[index].sequence;
    if sequence.is_relative_disabled() {
        return Ok(());
    }
    let (Some(confirmed_at), Some(spending_block)) = (&utxo.block, spending_block) else {
        return Ok(());
    };
    let matured = match sequence.relative_lock_time() {
        RelativeLockTime::Disabled => true,
        RelativeLockTime::Blocks(n) => {
            spending_block.height().saturating_sub(confirmed_at.height()) >= n as u32
        }
        RelativeLockTime::Time512Sec(n) => {
            let elapsed = spending_block
                .median_time_past()
                .saturating_sub(confirmed_at.median_time_past());
            elapsed >= (n as u32).saturating_mul(512)
        }
    };
    if matured {
        Ok(())
    } else {
        Err(Error::Immature(index))
    }
}

fn verify_input_script(tx: &Tx, index: usize, prevouts: &[Utxo]) -> Result<(), Error> {
    let utxo = &prevouts[index];
    match classify(&utxo.script_pubkey) {
        ScriptClass::P2wpkh | ScriptClass::P2wsh | ScriptClass::P2tr => {
            verify_segwit(tx, index, prevouts, &utxo.script_pubkey)
        }
        ScriptClass::P2sh => verify_p2sh(tx, index, prevouts),
        _ => verify_legacy(tx, index, utxo),
    }
}

fn verify_legacy(tx: &Tx, index: usize, utxo: &Utxo) -> Result<(), Error> {
    let checker = TxChecker::legacy(tx, index);
    let sig_script = tx.inputs[index].sig_script.as_script_bytes().as_slice();
    let script_pubkey = utxo.script_pubkey.as_script_bytes().as_slice();

    let after_sig = run(sig_script, Stack::new(), &checker)
        .map_err(|e| Error::TransactionScript(index, ScriptPhase::LockingScript, e))?;
    let result = run(script_pubkey, after_sig.into_stack(), &checker)
        .map_err(|e| Error::TransactionScript(index, ScriptPhase::LockingScript, e))?;
    if !result.success() {
        return Err(Error::TransactionScript(
            index,
            ScriptPhase::LockingScript,
            ExecError::ScriptRuntime(script_pubkey.len(), "final stack item is falsy"),
        ));
    }
    Ok(())
}

fn verify_p2sh(tx: &Tx, index: usize, prevouts: &[Utxo]) -> Result<(), Error> {
    let utxo = &prevouts[index];
    let checker = TxChecker::legacy(tx, index);
    let sig_script = tx.inputs[index].sig_script.as_script_bytes().as_slice();
    let script_pubkey = utxo.script_pubkey.as_script_bytes().as_slice();

    assert_push_only(sig_script, index, ScriptPhase::LockingScript)?;
    let after_sig = run(sig_script, Stack::new(), &checker)
        .map_err(|e| Error::TransactionScript(index, ScriptPhase::LockingScript, e))?;
    let redeem_script = after_sig
        .stack()
        .top(0, sig_script.len())
        .map_err(|e| Error::TransactionScript(index, ScriptPhase::LockingScript, e))?
        .clone();

    let hash_check = run(script_pubkey, after_sig.into_stack(), &checker)
        .map_err(|e| Error::TransactionScript(index, ScriptPhase::LockingScript, e))?;
    if !hash_check.success() {
        return Err(Error::TransactionScript(
            index,
            ScriptPhase::LockingScript,
            ExecError::ScriptRuntime(script_pubkey.len(), "redeem script does not match its hash"),
        ));
    }

    let mut redeem_stack = hash_check.into_stack();
    redeem_stack
        .pop(0)
        .map_err(|e| Error::TransactionScript(index, ScriptPhase::RedeemScript, e))?;

    if let Some(program) = recognize_witness_program(&redeem_script) {
        return verify_segwit_program(tx, index, prevouts, &program, redeem_stack);
    }

    let redeem_result = run(&redeem_script, redeem_stack, &checker)
        .map_err(|e| Error::TransactionScript(index, ScriptPhase::RedeemScript, e))?;
    if !redeem_result.success() {
        return Err(Error::TransactionScript(
            index,
            ScriptPhase::RedeemScript,
            ExecError::ScriptRuntime(redeem_script.len(), "final stack item is falsy"),
        ));
    }
    Ok(())
}

fn verify_segwit(tx: &Tx, index: usize, prevouts: &[Utxo], script_pubkey: &ScriptPubkey) -> Result<(), Error> {
    if !tx.inputs[index].sig_script.as_script_bytes().as_slice().is_empty() {
        return Err(Error::TransactionScript(
            index,
            ScriptPhase::SegwitLockingScript,
            ExecError::ScriptSyntax(0, "native segwit input must carry an empty sigScript"),
        ));
    }
    let program = recognize_witness_program(script_pubkey.as_script_bytes().as_slice())
        .expect("caller only reaches here for scripts classify() recognized as segwit");
    let stack = Stack::with_items(tx.inputs[index].witness.elements().map(<[u8]>::to_vec).collect());
    verify_segwit_program(tx, index, prevouts, &program, stack)
}

/// A recognized witness program: its version and the program bytes
/// (20 bytes for a v0 P2WPKH hash, 32 for a v0 P2WSH hash or a v1 taproot
/// output key).
struct Program {
    version: WitnessVer,
    bytes: Vec<u8>,
}

/// Mirrors `bc_script`'s own `scriptPubkey`-to-witness-program recognition,
/// generalized to also run over an arbitrary P2SH redeem script's bytes.
fn recognize_witness_program(script: &[u8]) -> Option<Program> {
    let spk = ScriptPubkey::from_unsafe(script.to_vec());
    if !spk.is_witness_program() {
        return None;
    }
    let version = WitnessVer::from_op_code(OpCode::from_byte(script[0])).ok()?;
    Some(Program {
        version,
        bytes: script[2..].to_vec(),
    })
}

fn verify_segwit_program(
    tx: &Tx,
    index: usize,
    prevouts: &[Utxo],
    program: &Program,
    stack: Stack,
) -> Result<(), Error> {
    match program.version {
        WitnessVer::V0 => verify_segwit_v0_program(tx, index, &prevouts[index], program, stack),
        WitnessVer::V1 if program.bytes.len() == 32 => {
            verify_taproot_key_path(tx, index, prevouts, &program.bytes, stack)
        }
        _ => {
            // Versions other than 0 and 1, and malformed v1 programs, carry
            // no consensus meaning here; accepted as anyone-can-spend,
            // matching the reference client's policy for unknown witness
            // versions.
            Ok(())
        }
    }
}

fn verify_segwit_v0_program(
    tx: &Tx,
    index: usize,
    utxo: &Utxo,
    program: &Program,
    stack: Stack,
) -> Result<(), Error> {
    let checker = TxChecker::segwit_v0(tx, index, utxo.value);

    match program.bytes.len() {
        20 => {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&program.bytes);
            let script_code = ScriptPubkey::p2pkh(hash);
            let result = run(script_code.as_script_bytes().as_slice(), stack, &checker).map_err(|e| {
                Error::TransactionScript(index, ScriptPhase::SegwitLockingScript, e)
            })?;
            if !result.success() {
                return Err(Error::TransactionScript(
                    index,
                    ScriptPhase::SegwitLockingScript,
                    ExecError::ScriptRuntime(0, "p2wpkh signature check failed"),
                ));
            }
            Ok(())
        }
        32 => {
            let mut stack = stack;
            let witness_script = stack
                .pop(0)
                .map_err(|e| Error::TransactionScript(index, ScriptPhase::SegwitRedeemScript, e))?;
            let actual_hash = bc_hashes::sha256(&witness_script);
            if actual_hash[..] != program.bytes[..] {
                return Err(Error::TransactionScript(
                    index,
                    ScriptPhase::SegwitRedeemScript,
                    ExecError::ScriptRuntime(0, "witness script does not match its hash"),
                ));
            }
            let result = run(&witness_script, stack, &checker).map_err(|e| {
                Error::TransactionScript(index, ScriptPhase::SegwitRedeemScript, e)
            })?;
            if !result.success() {
                return Err(Error::TransactionScript(
                    index,
                    ScriptPhase::SegwitRedeemScript,
                    ExecError::ScriptRuntime(0, "final stack item is falsy"),
                ));
            }
            Ok(())
        }
        _ => Err(Error::TransactionScript(
            index,
            ScriptPhase::SegwitLockingScript,
            ExecError::ScriptSyntax(0, "unrecognized version-0 witness program length"),
        )),
    }
}

/// BIP341/BIP340 taproot key-path spend verification, scoped to the
/// single-item, no-annex witness stack (script-path spends, which carry a
/// control block and possibly an annex, are out of scope and rejected
/// rather than silently accepted).
fn verify_taproot_key_path(
    tx: &Tx,
    index: usize,
    prevouts: &[Utxo],
    output_key_bytes: &[u8],
    stack: Stack,
) -> Result<(), Error> {
    let items = stack.into_vec();
    let sig_bytes = match items.as_slice() {
        [sig] => sig,
        _ => {
            return Err(Error::TransactionScript(
                index,
                ScriptPhase::SegwitLockingScript,
                ExecError::ScriptSyntax(0, "taproot script-path and annex spends are not supported"),
            ))
        }
    };

    let hash_type = match sig_bytes.len() {
        64 => 0x00u8,
        65 => {
            let hash_type = sig_bytes[64];
            if hash_type == 0x00 || !is_valid_taproot_sighash_byte(hash_type) {
                return Err(Error::TransactionScript(
                    index,
                    ScriptPhase::SegwitLockingScript,
                    ExecError::ScriptSyntax(0, "invalid taproot sighash type byte"),
                ));
            }
            hash_type
        }
        _ => {
            return Err(Error::TransactionScript(
                index,
                ScriptPhase::SegwitLockingScript,
                ExecError::ScriptSyntax(0, "taproot key-path signature must be 64 or 65 bytes"),
            ))
        }
    };

    let sighash = taproot_key_path_sighash(tx, index, prevouts, hash_type);

    let output_key = XOnlyPublicKey::from_slice(output_key_bytes).map_err(|_| {
        Error::TransactionScript(
            index,
            ScriptPhase::SegwitLockingScript,
            ExecError::ScriptRuntime(0, "taproot output key is not a valid curve point"),
        )
    })?;
    let schnorr_sig = schnorr::Signature::from_slice(&sig_bytes[..64]).map_err(|_| {
        Error::TransactionScript(index, ScriptPhase::SegwitLockingScript, ExecError::ScriptRuntime(0, "malformed schnorr signature"))
    })?;
    let message = Message::from_digest(sighash);

    if SECP256K1.verify_schnorr(&schnorr_sig, &message, &output_key).is_err() {
        return Err(Error::TransactionScript(
            index,
            ScriptPhase::SegwitLockingScript,
            ExecError::ScriptRuntime(0, "taproot key-path signature check failed"),
        ));
    }
    Ok(())
}

fn is_valid_taproot_sighash_byte(b: u8) -> bool { matches!(b & 0x7f, 0x01 | 0x02 | 0x03) }

fn assert_push_only(script: &[u8], index: usize, phase: ScriptPhase) -> Result<(), Error> {
    let mut pos = 0;
    while pos < script.len() {
        let op = OpCode::from_byte(script[pos]);
        if !op.is_push() {
            return Err(Error::TransactionScript(
                index,
                phase,
                ExecError::ScriptSyntax(pos, "P2SH sigScript must be push-only"),
            ));
        }
        pos += push_len(script, pos);
    }
    Ok(())
}

fn push_len(script: &[u8], pos: usize) -> usize {
    match script[pos] {
        n @ 0x00..=0x4b => 1 + n as usize,
        0x4c => 2 + script.get(pos + 1).copied().unwrap_or(0) as usize,
        0x4d => 3 + script.get(pos + 1..pos + 3).map_or(0, |b| u16::from_le_bytes([b[0], b[1]]) as usize),
        0x4e => {
            5 + script.get(pos + 1..pos + 5).map_or(0, |b| {
                u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize
            })
        }
        _ => 1,
    }
}

#[cfg(test)]
mod test {
    use bc_consensus::{Outpoint, ScriptPubkey as Spk, SigScript, Tx, TxIn, TxOut, Txid, Vout};
    use bc_keys::PrivateKey;
    use bc_network::registry;
    use bc_scriptexec::SignatureChecker;

    use super::*;
    use crate::sighash::legacy_sighash;

    fn key(byte: u8) -> PrivateKey { PrivateKey::from_slice(&registry().default_network(), &[byte; 32], true).unwrap() }

    fn base_tx(sequence: SeqNo, lock_time: bc_consensus::LockTime) -> (Tx, PrivateKey, ScriptPubkey) {
        let signer = key(0x10);
        let prevout_script = Spk::p2pkh(signer.public_key().pubkey_hash());
        let tx = Tx {
            version: bc_consensus::TxVer::V2,
            inputs: vec![TxIn {
                prev_output: Outpoint::new(Txid::from([0x01; 32]), Vout::from_u32(0)),
                sig_script: SigScript::empty(),
                sequence,
                witness: default!(),
            }]
            .try_into()
            .unwrap(),
            outputs: vec![TxOut::new(Spk::p2pkh([0x22; 20]), 90_000u64)].try_into().unwrap(),
            lock_time,
        };
        (tx, signer, prevout_script)
    }

    fn sign_p2pkh_input(tx: &mut Tx, signer: &PrivateKey, prevout_script: &ScriptPubkey) {
        let digest = legacy_sighash(tx, 0, prevout_script.as_script_bytes().as_slice(), bc_consensus::SighashType::all());
        let sig = signer.sign_hash(digest);
        let sig_bytes = bc_consensus::LegacySig {
            sig,
            sighash_type: bc_consensus::SighashType::all(),
        }
        .to_vec();
        let mut sig_script = SigScript::empty();
        sig_script.push_slice(&sig_bytes);
        sig_script.push_slice(&signer.public_key().to_bytes());
        tx.inputs[0].sig_script = sig_script;
    }

    #[test]
    fn legacy_p2pkh_input_verifies() {
        let (mut tx, signer, prevout_script) = base_tx(SeqNo::FINAL, bc_consensus::LockTime::Unset);
        sign_p2pkh_input(&mut tx, &signer, &prevout_script);

        let utxos = UtxoRegistry::new();
        utxos.insert(tx.inputs[0].prev_output, Utxo::new(100_000u64, prevout_script));

        assert!(verify_transaction(&tx, &utxos, None).unwrap().is_empty());
    }

    #[test]
    fn missing_utxo_is_fatal() {
        let tx = Tx {
            version: bc_consensus::TxVer::V2,
            inputs: vec![TxIn {
                prev_output: Outpoint::new(Txid::from([0x02; 32]), Vout::from_u32(0)),
                sig_script: SigScript::empty(),
                sequence: SeqNo::FINAL,
                witness: default!(),
            }]
            .try_into()
            .unwrap(),
            outputs: vec![].try_into().unwrap(),
            lock_time: bc_consensus::LockTime::Unset,
        };
        let utxos = UtxoRegistry::new();
        assert!(matches!(verify_transaction(&tx, &utxos, None), Err(Error::Transaction(0, _))));
    }

    #[test]
    fn locktime_is_ignored_when_every_sequence_is_final() {
        let (mut tx, signer, prevout_script) =
            base_tx(SeqNo::FINAL, bc_consensus::LockTime::from_height(500));
        sign_p2pkh_input(&mut tx, &signer, &prevout_script);

        let utxos = UtxoRegistry::new();
        utxos.insert(tx.inputs[0].prev_output, Utxo::new(100_000u64, prevout_script));

        // every input is final, so the locktime is disabled outright: no
        // warning, and no block is needed to check it against.
        assert!(verify_transaction(&tx, &utxos, None).unwrap().is_empty());
    }

    #[test]
    fn locktime_without_a_block_warns_when_enabled() {
        let (mut tx, signer, prevout_script) = base_tx(
            SeqNo::from_consensus_u32(0xFFFF_FFFE),
            bc_consensus::LockTime::from_height(500),
        );
        sign_p2pkh_input(&mut tx, &signer, &prevout_script);

        let utxos = UtxoRegistry::new();
        utxos.insert(tx.inputs[0].prev_output, Utxo::new(100_000u64, prevout_script));

        let warnings = verify_transaction(&tx, &utxos, None).unwrap();
        assert_eq!(warnings, vec![VerifyWarning::LocktimeUnchecked]);
    }

    #[test]
    fn taproot_key_path_signature_check_fails_for_wrong_key() {
        let signer = key(0x30);
        let wrong_key = key(0x31);
        let output_key = wrong_key.public_key().x_only_bytes();
        let prevout_script = Spk::p2tr(output_key);

        let tx = Tx {
            version: bc_consensus::TxVer::V2,
            inputs: vec![TxIn {
                prev_output: Outpoint::new(Txid::from([0x03; 32]), Vout::from_u32(0)),
                sig_script: SigScript::empty(),
                sequence: SeqNo::FINAL,
                witness: default!(),
            }]
            .try_into()
            .unwrap(),
            outputs: vec![TxOut::new(Spk::p2pkh([0x22; 20]), 90_000u64)].try_into().unwrap(),
            lock_time: bc_consensus::LockTime::Unset,
        };

        let utxos = UtxoRegistry::new();
        utxos.insert(tx.inputs[0].prev_output, Utxo::new(100_000u64, prevout_script));

        // An empty witness stack is not a single signature item, so this is
        // rejected as an unsupported spend shape rather than silently
        // accepted; either way, it must not verify.
        assert!(verify_transaction(&tx, &utxos, None).is_err());
        let _ = signer; // kept for symmetry with a future real-signature test
    }
}
