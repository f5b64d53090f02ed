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

//! Per-template signature and witness assembly: P2PKH, native and
//! P2SH-nested P2WPKH outright, plus incremental splicing of threshold
//! multisig signatures for bare, P2SH and P2WSH templates.

use bc_consensus::opcodes::{OP_CHECKMULTISIG, OP_PUSHBYTES_33, OP_PUSHBYTES_65, OP_PUSHNUM_1, OP_PUSHNUM_16};
use bc_consensus::{LegacySig, OpCode, RedeemScript, Sats, ScriptPubkey, SigScript, SighashType, Tx, Witness, WitnessScript};
use bc_keys::PrivateKey;
use bc_scriptexec::SignatureChecker;

use crate::error::Error;
use crate::sighash::{legacy_sighash, segwit_v0_sighash};

fn finalize_ecdsa_sig(key: &PrivateKey, digest: [u8; 32], sighash_type: SighashType) -> Vec<u8> {
    let sig = key.sign_hash(digest);
    LegacySig { sig, sighash_type }.to_vec()
}

fn p2wpkh_witness(key: &PrivateKey, digest: [u8; 32], sighash_type: SighashType) -> Witness {
    let sig = finalize_ecdsa_sig(key, digest, sighash_type);
    Witness::from_consensus_stack([sig, key.public_key().to_bytes()])
}

/// Signs a P2PKH input, replacing its `sigScript` with `<sig> <pubkey>`.
pub fn sign_p2pkh(
    tx: &mut Tx,
    index: usize,
    script_pubkey: &ScriptPubkey,
    key: &PrivateKey,
    sighash_type: SighashType,
) -> Result<(), Error> {
    let digest = legacy_sighash(tx, index, script_pubkey.as_script_bytes().as_slice(), sighash_type);
    let sig = finalize_ecdsa_sig(key, digest, sighash_type);
    let mut sig_script = SigScript::empty();
    sig_script.push_slice(&sig);
    sig_script.push_slice(&key.public_key().to_bytes());
    tx.inputs[index].sig_script = sig_script;
    Ok(())
}

/// Signs a native P2WPKH input: witness `<sig> <pubkey>`, empty `sigScript`.
pub fn sign_p2wpkh(
    tx: &mut Tx,
    index: usize,
    value: impl Into<Sats>,
    key: &PrivateKey,
    sighash_type: SighashType,
) -> Result<(), Error> {
    let script_code = ScriptPubkey::p2pkh(key.public_key().pubkey_hash());
    let digest = segwit_v0_sighash(tx, index, script_code.as_script_bytes().as_slice(), value, sighash_type);
    tx.inputs[index].witness = p2wpkh_witness(key, digest, sighash_type);
    tx.inputs[index].sig_script = SigScript::empty();
    Ok(())
}

/// Signs a P2SH-nested P2WPKH input: same witness as [`sign_p2wpkh`], with
/// the `sigScript` carrying a single push of the `OP_0 <hash>` redeem script.
pub fn sign_nested_p2wpkh(
    tx: &mut Tx,
    index: usize,
    value: impl Into<Sats>,
    key: &PrivateKey,
    sighash_type: SighashType,
) -> Result<(), Error> {
    let wpkh_hash: [u8; 20] = key
        .public_key()
        .wpubkey_hash()
        .ok_or_else(|| Error::Sign(index, "uncompressed keys cannot be wrapped in segwit".to_string()))?
        .into();
    let script_code = ScriptPubkey::p2pkh(key.public_key().pubkey_hash());
    let digest = segwit_v0_sighash(tx, index, script_code.as_script_bytes().as_slice(), value, sighash_type);
    tx.inputs[index].witness = p2wpkh_witness(key, digest, sighash_type);

    let mut redeem_script = RedeemScript::new();
    redeem_script.push_opcode(OpCode::PushBytes0);
    redeem_script.push_slice(&wpkh_hash);
    let mut sig_script = SigScript::empty();
    sig_script.push_slice(redeem_script.as_script_bytes().as_slice());
    tx.inputs[index].sig_script = sig_script;
    Ok(())
}

/// A parsed `OP_m <pubkey>... OP_n OP_CHECKMULTISIG` template, in the
/// ascending pubkey order the script itself lists them.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MultisigTemplate {
    threshold: usize,
    pubkeys: Vec<Vec<u8>>,
}

impl MultisigTemplate {
    pub fn new(threshold: usize, pubkeys: Vec<Vec<u8>>) -> Self { MultisigTemplate { threshold, pubkeys } }

    /// Parses a bare, redeem, or witness script's bytes as a multisig
    /// template, mirroring `ScriptPubkey::is_p2ms`'s recognition.
    pub fn parse(script: &[u8]) -> Option<Self> {
        if script.len() < 3 || *script.last().unwrap() != OP_CHECKMULTISIG {
            return None;
        }
        let m = match script[0] {
            b @ OP_PUSHNUM_1..=OP_PUSHNUM_16 => (b - OP_PUSHNUM_1 + 1) as usize,
            _ => return None,
        };
        let mut pos = 1;
        let mut pubkeys = Vec::new();
        while pos < script.len() - 2 {
            match script[pos] {
                len @ (OP_PUSHBYTES_33 | OP_PUSHBYTES_65) => {
                    let len = len as usize;
                    if pos + 1 + len > script.len() - 2 {
                        return None;
                    }
                    pubkeys.push(script[pos + 1..pos + 1 + len].to_vec());
                    pos += 1 + len;
                }
                _ => return None,
            }
        }
        let n = match script[script.len() - 2] {
            b @ OP_PUSHNUM_1..=OP_PUSHNUM_16 => (b - OP_PUSHNUM_1 + 1) as usize,
            _ => return None,
        };
        if m > n || n != pubkeys.len() {
            return None;
        }
        Some(MultisigTemplate { threshold: m, pubkeys })
    }

    pub fn threshold(&self) -> usize { self.threshold }

    pub fn pubkeys(&self) -> &[Vec<u8>] { &self.pubkeys }

    pub fn to_script_bytes(&self) -> Vec<u8> {
        let mut script = RedeemScript::new();
        script.push_opcode(OpCode::from_byte(OP_PUSHNUM_1 + self.threshold as u8 - 1));
        for pubkey in &self.pubkeys {
            script.push_slice(pubkey);
        }
        script.push_opcode(OpCode::from_byte(OP_PUSHNUM_1 + self.pubkeys.len() as u8 - 1));
        script.push_opcode(OpCode::CheckMultisig);
        script.as_script_bytes().as_slice().to_vec()
    }
}

fn signature_matches_pubkey(sig_bytes: &[u8], pubkey: &[u8], subscript: &[u8], checker: &dyn SignatureChecker) -> bool {
    if sig_bytes.is_empty() {
        return false;
    }
    let Ok(sig) = LegacySig::from_bytes(sig_bytes) else {
        return false;
    };
    let digest = checker.digest(sig.sighash_type, subscript);
    checker.verify_signature(digest, pubkey, &sig.sig)
}

/// Incrementally assembled multisig signatures, one slot per pubkey in the
/// template's order. `OP_CHECKMULTISIG` matches signatures against an
/// ascending, non-repeating subsequence of pubkeys, so slots are kept in the
/// same order the redeem/witness script lists its keys, and finalization
/// emits only the occupied ones.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PartialMultisig {
    template: MultisigTemplate,
    sigs: Vec<Option<Vec<u8>>>,
}

impl PartialMultisig {
    pub fn new(template: MultisigTemplate) -> Self {
        let sigs = vec![None; template.pubkeys.len()];
        PartialMultisig { template, sigs }
    }

    /// Rebuilds partial-signing state from an existing push sequence (e.g.
    /// one produced by a previous, not yet complete, call to this same
    /// function), matching each non-empty push against the template's
    /// pubkeys so a co-signer can add to it without disturbing the others.
    pub fn from_pushes(
        template: MultisigTemplate,
        pushes: &[Vec<u8>],
        subscript: &[u8],
        checker: &dyn SignatureChecker,
    ) -> Self {
        let mut sigs = vec![None; template.pubkeys.len()];
        for push in pushes {
            if let Some(slot) = template
                .pubkeys
                .iter()
                .position(|pubkey| signature_matches_pubkey(push, pubkey, subscript, checker))
            {
                sigs[slot] = Some(push.clone());
            }
        }
        PartialMultisig { template, sigs }
    }

    /// Adds `key`'s signature over `digest`, in the slot matching its public
    /// key in the template.
    pub fn add_signature(&mut self, index: usize, key: &PrivateKey, digest: [u8; 32], sighash_type: SighashType) -> Result<(), Error> {
        let pubkey = key.public_key().to_bytes();
        let slot = self
            .template
            .pubkeys
            .iter()
            .position(|candidate| candidate == &pubkey)
            .ok_or_else(|| Error::Sign(index, "signing key is not part of the multisig template".to_string()))?;
        self.sigs[slot] = Some(finalize_ecdsa_sig(key, digest, sighash_type));
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.sigs.iter().filter(|sig| sig.is_some()).count() >= self.template.threshold
    }

    /// The stack items `OP_CHECKMULTISIG` expects: the historical dummy
    /// element followed by the first `threshold` collected signatures, in
    /// ascending pubkey order.
    pub fn into_pushes(self) -> Vec<Vec<u8>> {
        let mut pushes = vec![Vec::new()];
        pushes.extend(self.sigs.into_iter().flatten().take(self.template.threshold));
        pushes
    }
}

/// Parses a push-only script's items back into a `Vec<Vec<u8>>`, treating
/// `OP_0` as an empty placeholder push, for re-loading a partially-signed
/// `sigScript` into a [`PartialMultisig`].
pub fn read_pushes(script: &[u8]) -> Vec<Vec<u8>> {
    let mut pushes = Vec::new();
    let mut pos = 0;
    while pos < script.len() {
        match script[pos] {
            0x00 => {
                pushes.push(Vec::new());
                pos += 1;
            }
            n @ 0x01..=0x4b => {
                let len = n as usize;
                pushes.push(script[pos + 1..pos + 1 + len].to_vec());
                pos += 1 + len;
            }
            0x4c => {
                let len = script.get(pos + 1).copied().unwrap_or(0) as usize;
                pushes.push(script[pos + 2..pos + 2 + len].to_vec());
                pos += 2 + len;
            }
            0x4d => {
                let len = script
                    .get(pos + 1..pos + 3)
                    .map_or(0, |b| u16::from_le_bytes([b[0], b[1]]) as usize);
                pushes.push(script[pos + 3..pos + 3 + len].to_vec());
                pos += 3 + len;
            }
            _ => break,
        }
    }
    pushes
}

/// Finalizes a bare (`P2MS`) multisig input's `sigScript`.
pub fn finalize_bare_multisig(tx: &mut Tx, index: usize, partial: PartialMultisig) -> Result<(), Error> {
    if !partial.is_complete() {
        return Err(Error::Sign(index, "multisig threshold not yet met".to_string()));
    }
    let mut sig_script = SigScript::empty();
    for push in partial.into_pushes() {
        sig_script.push_slice(&push);
    }
    tx.inputs[index].sig_script = sig_script;
    Ok(())
}

/// Finalizes a P2SH multisig input's `sigScript`, appending the redeem
/// script after the signatures.
pub fn finalize_p2sh_multisig(
    tx: &mut Tx,
    index: usize,
    redeem_script: &RedeemScript,
    partial: PartialMultisig,
) -> Result<(), Error> {
    if !partial.is_complete() {
        return Err(Error::Sign(index, "multisig threshold not yet met".to_string()));
    }
    let mut sig_script = SigScript::empty();
    for push in partial.into_pushes() {
        sig_script.push_slice(&push);
    }
    sig_script.push_slice(redeem_script.as_script_bytes().as_slice());
    tx.inputs[index].sig_script = sig_script;
    Ok(())
}

/// Finalizes a P2WSH multisig input's witness, appending the witness script
/// after the signatures, with an empty `sigScript`.
pub fn finalize_p2wsh_multisig(
    tx: &mut Tx,
    index: usize,
    witness_script: &WitnessScript,
    partial: PartialMultisig,
) -> Result<(), Error> {
    if !partial.is_complete() {
        return Err(Error::Sign(index, "multisig threshold not yet met".to_string()));
    }
    let mut stack = partial.into_pushes();
    stack.push(witness_script.as_script_bytes().as_slice().to_vec());
    tx.inputs[index].witness = Witness::from_consensus_stack(stack);
    tx.inputs[index].sig_script = SigScript::empty();
    Ok(())
}

#[cfg(test)]
mod test {
    use bc_consensus::{LockTime, Outpoint, SeqNo, Tx, TxIn, TxOut, TxVer, Txid, Vout};
    use bc_network::registry;

    use super::*;
    use crate::checker::TxChecker;
    use crate::verifier::verify_transaction;
    use crate::utxo::{Utxo, UtxoRegistry};

    fn key(byte: u8) -> PrivateKey { PrivateKey::from_slice(&registry().default_network(), &[byte; 32], true).unwrap() }

    fn unsigned_tx(prev: Outpoint) -> Tx {
        Tx {
            version: TxVer::V2,
            inputs: vec![TxIn {
                prev_output: prev,
                sig_script: SigScript::empty(),
                sequence: SeqNo::FINAL,
                witness: default!(),
            }]
            .try_into()
            .unwrap(),
            outputs: vec![TxOut::new(ScriptPubkey::p2pkh([0x33; 20]), 40_000u64)]
                .try_into()
                .unwrap(),
            lock_time: LockTime::Unset,
        }
    }

    #[test]
    fn p2pkh_roundtrips_through_verifier() {
        let signer = key(0x20);
        let script_pubkey = ScriptPubkey::p2pkh(signer.public_key().pubkey_hash());
        let prev = Outpoint::new(Txid::from([0x09; 32]), Vout::from_u32(0));
        let mut tx = unsigned_tx(prev);

        sign_p2pkh(&mut tx, 0, &script_pubkey, &signer, SighashType::all()).unwrap();

        let utxos = UtxoRegistry::new();
        utxos.insert(prev, Utxo::new(50_000u64, script_pubkey));
        verify_transaction(&tx, &utxos, None).unwrap();
    }

    #[test]
    fn p2wpkh_roundtrips_through_verifier() {
        let signer = key(0x21);
        let script_pubkey = ScriptPubkey::p2wpkh(signer.public_key().wpubkey_hash().unwrap());
        let prev = Outpoint::new(Txid::from([0x0a; 32]), Vout::from_u32(0));
        let mut tx = unsigned_tx(prev);

        sign_p2wpkh(&mut tx, 0, 50_000u64, &signer, SighashType::all()).unwrap();

        let utxos = UtxoRegistry::new();
        utxos.insert(prev, Utxo::new(50_000u64, script_pubkey));
        verify_transaction(&tx, &utxos, None).unwrap();
    }

    #[test]
    fn nested_p2wpkh_roundtrips_through_verifier() {
        let signer = key(0x22);
        let wpkh_hash = signer.public_key().wpubkey_hash().unwrap();
        let redeem_script_bytes = ScriptPubkey::p2wpkh(wpkh_hash).as_script_bytes().as_slice().to_vec();
        let script_pubkey = ScriptPubkey::p2sh(bc_hashes::hash160(&redeem_script_bytes));
        let prev = Outpoint::new(Txid::from([0x0b; 32]), Vout::from_u32(0));
        let mut tx = unsigned_tx(prev);

        sign_nested_p2wpkh(&mut tx, 0, 50_000u64, &signer, SighashType::all()).unwrap();

        let utxos = UtxoRegistry::new();
        utxos.insert(prev, Utxo::new(50_000u64, script_pubkey));
        verify_transaction(&tx, &utxos, None).unwrap();
    }

    #[test]
    fn two_of_three_bare_multisig_roundtrips_through_verifier() {
        let a = key(0x30);
        let b = key(0x31);
        let c = key(0x32);
        let template = MultisigTemplate::new(2, vec![
            a.public_key().to_bytes(),
            b.public_key().to_bytes(),
            c.public_key().to_bytes(),
        ]);
        let script_bytes = template.to_script_bytes();
        let script_pubkey = ScriptPubkey::from_unsafe(script_bytes.clone());
        let prev = Outpoint::new(Txid::from([0x0c; 32]), Vout::from_u32(0));
        let mut tx = unsigned_tx(prev);

        let digest = legacy_sighash(&tx, 0, &script_bytes, SighashType::all());
        let mut partial = PartialMultisig::new(template.clone());
        partial.add_signature(0, &a, digest, SighashType::all()).unwrap();
        partial.add_signature(0, &c, digest, SighashType::all()).unwrap();
        assert!(partial.is_complete());
        finalize_bare_multisig(&mut tx, 0, partial).unwrap();

        let utxos = UtxoRegistry::new();
        utxos.insert(prev, Utxo::new(50_000u64, script_pubkey));
        verify_transaction(&tx, &utxos, None).unwrap();
    }

    #[test]
    fn signing_with_a_foreign_key_is_rejected() {
        let a = key(0x40);
        let outsider = key(0x41);
        let template = MultisigTemplate::new(1, vec![a.public_key().to_bytes()]);
        let mut partial = PartialMultisig::new(template);
        let result = partial.add_signature(0, &outsider, [0u8; 32], SighashType::all());
        assert!(matches!(result, Err(Error::Sign(0, _))));
    }

    #[test]
    fn from_pushes_recovers_existing_signature_slot() {
        let a = key(0x50);
        let b = key(0x51);
        let template = MultisigTemplate::new(2, vec![a.public_key().to_bytes(), b.public_key().to_bytes()]);
        let script_bytes = template.to_script_bytes();
        let prev = Outpoint::new(Txid::from([0x0d; 32]), Vout::from_u32(0));
        let tx = unsigned_tx(prev);

        let digest = legacy_sighash(&tx, 0, &script_bytes, SighashType::all());
        let mut partial = PartialMultisig::new(template.clone());
        partial.add_signature(0, &a, digest, SighashType::all()).unwrap();
        let pushes = partial.into_pushes();

        let checker = TxChecker::legacy(&tx, 0);
        let reloaded = PartialMultisig::from_pushes(template, &pushes, &script_bytes, &checker);
        assert!(!reloaded.is_complete());
    }
}
