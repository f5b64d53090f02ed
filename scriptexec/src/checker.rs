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

use bc_consensus::{LockTime, SeqNo, SighashType};

/// The injection seam between the script runner and the transaction it is
/// validating. Implemented by the caller (typically `txsign`) so that this
/// crate never has to depend on transaction types directly, breaking what
/// would otherwise be a cyclic dependency between script execution and
/// transaction digesting.
pub trait SignatureChecker {
    /// Computes the 32-byte sighash preimage digest for `sighash_type` over
    /// `subscript` (the `scriptCode`, i.e. the relevant portion of the
    /// locking/redeem script), bound to whichever input is currently being
    /// verified.
    fn digest(&self, sighash_type: SighashType, subscript: &[u8]) -> [u8; 32];

    /// Verifies a raw ECDSA signature over `digest` against `pubkey`'s
    /// 33/65-byte serialization. Kept separate from [`Self::digest`] so a
    /// checker backed only by a public key (no network/private-key context)
    /// can still verify `CHECKSIG`.
    fn verify_signature(&self, digest: [u8; 32], pubkey: &[u8], sig: &secp256k1::ecdsa::Signature) -> bool;

    /// The transaction's `nLockTime`, consulted by `OP_CHECKLOCKTIMEVERIFY`.
    fn tx_locktime(&self) -> LockTime;

    /// The currently-executing input's `nSequence`. `OP_CHECKLOCKTIMEVERIFY`
    /// fails when this is [`SeqNo::FINAL`]; `OP_CHECKSEQUENCEVERIFY` reads
    /// its relative-locktime encoding directly.
    fn input_sequence(&self) -> SeqNo;

    /// The transaction's version, since BIP68 relative locktime only applies
    /// when it is `>= 2`.
    fn tx_version(&self) -> i32;
}

/// A checker that rejects every signature and carries no locktime context,
/// usable when a script is known not to exercise `CHECKSIG`/`CLTV`/`CSV`
/// (e.g. classifying push-only signature scripts).
pub struct NullChecker;

impl SignatureChecker for NullChecker {
    fn digest(&self, _sighash_type: SighashType, _subscript: &[u8]) -> [u8; 32] { [0u8; 32] }

    fn verify_signature(&self, _digest: [u8; 32], _pubkey: &[u8], _sig: &secp256k1::ecdsa::Signature) -> bool {
        false
    }

    fn tx_locktime(&self) -> LockTime { LockTime::Unset }

    fn input_sequence(&self) -> SeqNo { SeqNo::FINAL }

    fn tx_version(&self) -> i32 { 2 }
}
