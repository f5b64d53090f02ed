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

use bc_consensus::{LockTime, Sats, SeqNo, SighashType, Tx};
use bc_scriptexec::SignatureChecker;
use secp256k1::{Message, SECP256K1};

use crate::sighash::{legacy_sighash, segwit_v0_sighash};

/// The [`SignatureChecker`] implementation that plugs `scriptexec`'s
/// interpreter into a concrete transaction, input index and spent value,
/// dispatching each `CHECKSIG`/`CHECKMULTISIG` digest to the legacy or
/// BIP143 algorithm depending on [`TxChecker::segwit`].
pub struct TxChecker<'tx> {
    tx: &'tx Tx,
    input_index: usize,
    value: Sats,
    segwit: bool,
}

impl<'tx> TxChecker<'tx> {
    /// A checker for a legacy (pre-segwit) input.
    pub fn legacy(tx: &'tx Tx, input_index: usize) -> Self {
        TxChecker {
            tx,
            input_index,
            value: Sats::ZERO,
            segwit: false,
        }
    }

    /// A checker for a segwit v0 input spending a UTXO worth `value`, as
    /// BIP143's sighash binds the spent amount into the digest.
    pub fn segwit_v0(tx: &'tx Tx, input_index: usize, value: impl Into<Sats>) -> Self {
        TxChecker {
            tx,
            input_index,
            value: value.into(),
            segwit: true,
        }
    }
}

impl SignatureChecker for TxChecker<'_> {
    fn digest(&self, sighash_type: SighashType, subscript: &[u8]) -> [u8; 32] {
        if self.segwit {
            segwit_v0_sighash(self.tx, self.input_index, subscript, self.value, sighash_type)
        } else {
            legacy_sighash(self.tx, self.input_index, subscript, sighash_type)
        }
    }

    fn verify_signature(&self, digest: [u8; 32], pubkey: &[u8], sig: &secp256k1::ecdsa::Signature) -> bool {
        let Ok(pk) = secp256k1::PublicKey::from_slice(pubkey) else {
            return false;
        };
        let msg = Message::from_digest(digest);
        SECP256K1.verify_ecdsa(&msg, sig, &pk).is_ok()
    }

    fn tx_locktime(&self) -> LockTime { self.tx.lock_time }

    fn input_sequence(&self) -> SeqNo { self.tx.inputs[self.input_index].sequence }

    fn tx_version(&self) -> i32 { self.tx.version.to_consensus_i32() }
}

#[cfg(test)]
mod test {
    use bc_consensus::{Outpoint, SigScript, Tx, TxVer, Txid, TxIn, TxOut, Vout};
    use bc_keys::PrivateKey;
    use bc_network::registry;

    use super::*;

    fn single_input_tx() -> Tx {
        Tx {
            version: TxVer::V2,
            inputs: vec![TxIn {
                prev_output: Outpoint::new(Txid::from([0x55; 32]), Vout::from_u32(0)),
                sig_script: SigScript::empty(),
                sequence: SeqNo::FINAL,
                witness: default!(),
            }]
            .try_into()
            .unwrap(),
            outputs: vec![TxOut::new(bc_consensus::ScriptPubkey::p2pkh([0x11; 20]), 50_000u64)]
                .try_into()
                .unwrap(),
            lock_time: LockTime::Unset,
        }
    }

    #[test]
    fn signature_produced_by_digest_verifies() {
        let tx = single_input_tx();
        let checker = TxChecker::legacy(&tx, 0);
        let key = PrivateKey::from_slice(&registry().default_network(), &[0x9a; 32], true).unwrap();
        let pubkey = key.public_key();
        let subscript = bc_consensus::ScriptPubkey::p2pkh(pubkey.pubkey_hash());
        let digest = checker.digest(SighashType::all(), subscript.as_script_bytes().as_slice());
        let sig = key.sign_hash(digest);
        assert!(checker.verify_signature(digest, &pubkey.to_bytes(), &sig));
    }

    #[test]
    fn wrong_pubkey_does_not_verify() {
        let tx = single_input_tx();
        let checker = TxChecker::legacy(&tx, 0);
        let net = registry().default_network();
        let key = PrivateKey::from_slice(&net, &[0x9a; 32], true).unwrap();
        let other = PrivateKey::from_slice(&net, &[0x9b; 32], true).unwrap();
        let subscript = bc_consensus::ScriptPubkey::p2pkh(key.public_key().pubkey_hash());
        let digest = checker.digest(SighashType::all(), subscript.as_script_bytes().as_slice());
        let sig = key.sign_hash(digest);
        assert!(!checker.verify_signature(digest, &other.public_key().to_bytes(), &sig));
    }
}
